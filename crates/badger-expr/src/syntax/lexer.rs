use crate::error::{ErrorCode, SyntaxError};
use crate::syntax::token::{Token, TokenKind, keyword_or_ident};

pub struct Lexer<'a> {
    text: &'a str,
    source: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { text: source, source: source.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<SyntaxError>> {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, self.line, self.column));
                break;
            }

            match self.next_token() {
                Ok(tok) => tokens.push(tok),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() { Ok(tokens) } else { Err(errors) }
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        let line = self.line;
        let col = self.column;
        let start = self.pos;
        let ch = self.advance();

        let kind = match ch {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'~' => TokenKind::Tilde,
            b'?' => TokenKind::Question,
            b':' => TokenKind::Colon,
            b',' => TokenKind::Comma,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,

            b'=' => {
                if self.peek() == b'=' && self.peek_next() == b'=' {
                    self.advance(); self.advance(); TokenKind::EqEqEq
                } else if self.peek() == b'=' {
                    self.advance(); TokenKind::EqEq
                } else {
                    return Err(SyntaxError::new(ErrorCode::L001, line, col,
                        "unexpected `=`, comparison is written `==`"));
                }
            }
            b'!' => {
                if self.peek() == b'=' && self.peek_next() == b'=' {
                    self.advance(); self.advance(); TokenKind::BangEqEq
                } else if self.peek() == b'=' {
                    self.advance(); TokenKind::BangEq
                } else {
                    TokenKind::Bang
                }
            }
            b'<' => {
                if self.peek() == b'<' { self.advance(); TokenKind::LtLt }
                else if self.peek() == b'=' { self.advance(); TokenKind::LtEq }
                else { TokenKind::Lt }
            }
            b'>' => {
                if self.peek() == b'>' { self.advance(); TokenKind::GtGt }
                else if self.peek() == b'=' { self.advance(); TokenKind::GtEq }
                else { TokenKind::Gt }
            }
            b'&' => {
                if self.peek() == b'&' { self.advance(); TokenKind::AmpAmp }
                else { TokenKind::Amp }
            }
            b'|' => {
                if self.peek() == b'|' { self.advance(); TokenKind::PipePipe }
                else { TokenKind::Pipe }
            }
            b'^' => {
                if self.peek() == b'^' { self.advance(); TokenKind::CaretCaret }
                else { TokenKind::Caret }
            }

            b'#' => {
                let digits = self.read_word();
                if digits.is_empty() {
                    return Err(SyntaxError::new(ErrorCode::L005, line, col, "expected color digits after `#`"));
                }
                TokenKind::HexColor(digits)
            }
            b'$' => {
                if !is_ident_start(self.peek()) {
                    return Err(SyntaxError::new(ErrorCode::L001, line, col, "expected variable name after `$`"));
                }
                let first = self.advance();
                TokenKind::Var(self.read_ident(first))
            }
            b'"' | b'\'' => TokenKind::Str(self.read_string(ch, line, col)?),
            b'0'..=b'9' => self.read_number(start, line, col)?,
            c if is_ident_start(c) => keyword_or_ident(self.read_ident(c)),

            _ => {
                let other = self.text[start..].chars().next().unwrap_or('\u{FFFD}');
                // Skip the rest of a multi-byte character.
                while !self.is_at_end() && is_continuation(self.peek()) { self.advance(); }
                return Err(SyntaxError::new(ErrorCode::L001, line, col,
                    format!("unexpected character `{other}`")));
            }
        };

        Ok(Token::new(kind, line, col))
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn advance(&mut self) -> u8 {
        let ch = self.source[self.pos];
        self.pos += 1;
        if ch == b'\n' { self.line += 1; self.column = 1; }
        else if !is_continuation(ch) { self.column += 1; }
        ch
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_next(&self) -> u8 {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.source.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => { self.advance(); }
                _ => break,
            }
        }
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    fn read_word(&mut self) -> String {
        let start = self.pos;
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == b'_') {
            self.advance();
        }
        self.text[start..self.pos].to_string()
    }

    fn read_ident(&mut self, first: u8) -> String {
        let mut s = String::new();
        s.push(first as char);
        s.push_str(&self.read_word());
        s
    }

    fn read_string(&mut self, quote: u8, start_line: usize, start_col: usize) -> Result<String, SyntaxError> {
        let mut buf: Vec<u8> = Vec::new();
        let mut error: Option<SyntaxError> = None;
        loop {
            if self.is_at_end() || self.peek() == b'\n' {
                return Err(SyntaxError::new(ErrorCode::L002, start_line, start_col,
                    "unterminated string literal"));
            }
            let ch = self.advance();
            if ch == quote { break; }
            if ch != b'\\' {
                buf.push(ch);
                continue;
            }

            let esc_line = self.line;
            let esc_col = self.column;
            if self.is_at_end() { continue; }
            let escaped = match self.advance() {
                b'\'' => Some('\''),
                b'"'  => Some('"'),
                b'\\' => Some('\\'),
                b'n'  => Some('\n'),
                b'r'  => Some('\r'),
                b'b'  => Some('\u{8}'),
                b't'  => Some('\t'),
                b'u'  => self.read_unicode_escape(),
                _     => None,
            };
            match escaped {
                Some(c) => buf.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes()),
                // Keep consuming so the rest of the string does not cascade
                // into further errors; report the first bad escape.
                None => if error.is_none() {
                    error = Some(SyntaxError::new(ErrorCode::L003, esc_line, esc_col, "invalid escape sequence"));
                },
            }
        }
        if let Some(e) = error { return Err(e); }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Four hex digits after `\u`. Consumes only the digits it accepts.
    fn read_unicode_escape(&mut self) -> Option<char> {
        let mut code = 0u32;
        for _ in 0..4 {
            let d = (self.peek() as char).to_digit(16)?;
            self.advance();
            code = code * 16 + d;
        }
        char::from_u32(code)
    }

    /// Integer, float (`1.5`, `1e3`, `1.5e-2`), or a number with an attached
    /// unit (`5px`, `50%`, `10par%`).
    fn read_number(&mut self, start: usize, line: usize, col: usize) -> Result<TokenKind, SyntaxError> {
        let mut is_float = false;
        while self.peek().is_ascii_digit() { self.advance(); }

        // Only a `.` followed by a digit belongs to the number.
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            is_float = true;
            self.advance();
            while self.peek().is_ascii_digit() { self.advance(); }
        }

        if matches!(self.peek(), b'e' | b'E') {
            let signed = matches!(self.peek_next(), b'+' | b'-');
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_ascii_digit() {
                is_float = true;
                self.advance();
                if signed { self.advance(); }
                while self.peek().is_ascii_digit() { self.advance(); }
            }
        }

        let text = self.text;
        let text = &text[start..self.pos];
        let malformed = || SyntaxError::new(ErrorCode::L004, line, col, format!("malformed number '{text}'"));

        if is_ident_start(self.peek()) {
            let value: f64 = text.parse().map_err(|_| malformed())?;
            let mut unit = self.read_word();
            if self.percent_follows() {
                self.advance();
                unit.push('%');
            }
            return Ok(TokenKind::Dimension(value, unit));
        }
        if self.percent_follows() {
            let value: f64 = text.parse().map_err(|_| malformed())?;
            self.advance();
            return Ok(TokenKind::Dimension(value, "%".into()));
        }

        if is_float {
            text.parse().map(TokenKind::Float).map_err(|_| malformed())
        } else {
            text.parse().map(TokenKind::Int).map_err(|_| malformed())
        }
    }

    /// A `%` glued to a number is a percentage unless an operand follows it
    /// directly, as in `7%2`.
    fn percent_follows(&self) -> bool {
        self.peek() == b'%' && !starts_operand(self.peek_next())
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

fn starts_operand(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'(' | b'#' | b'\'' | b'"')
}

// ─── Tests ───────────────────────────────────────────────────────────────────
