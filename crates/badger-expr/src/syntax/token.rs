#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(u64),
    Float(f64),
    /// A number immediately followed by a unit, e.g. `5px`, `50%`, `10par%`.
    /// The unit is kept verbatim and validated during code generation.
    Dimension(f64, String),
    Str(String),
    HexColor(String), // digits only, without the leading `#`
    Var(String),      // `$name`, without the `$`
    Ident(String),

    // Keywords
    Null,
    Bool(bool),
    Nan,
    Inf,
    And,
    Or,
    Xor,
    Not,
    If,
    Then,
    Else,
    As,

    // Operators
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    Lt,         // <
    LtEq,       // <=
    Gt,         // >
    GtEq,       // >=
    EqEq,       // ==
    BangEq,     // !=
    EqEqEq,     // ===
    BangEqEq,   // !==
    LtLt,       // <<
    GtGt,       // >>
    Amp,        // &
    Pipe,       // |
    Caret,      // ^
    AmpAmp,     // &&
    PipePipe,   // ||
    CaretCaret, // ^^
    Bang,       // !
    Tilde,      // ~
    Question,   // ?

    // Punctuation
    Colon,      // :
    Comma,      // ,
    LParen,     // (
    RParen,     // )

    Eof,
}

impl TokenKind {
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::Int(_) | Self::Float(_) | Self::Dimension(..) | Self::Str(_) | Self::HexColor(_)
            | Self::Null | Self::Bool(_) | Self::Nan | Self::Inf
        )
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::Bool(_) | Self::Nan | Self::Inf | Self::And | Self::Or | Self::Xor
            | Self::Not | Self::If | Self::Then | Self::Else | Self::As
        )
    }

    /// Source text of fixed tokens, for error messages.
    pub fn describe(&self) -> String {
        let s = match self {
            Self::Int(v)          => return v.to_string(),
            Self::Float(v)        => return v.to_string(),
            Self::Dimension(v, u) => return format!("{v}{u}"),
            Self::Str(s)          => return format!("{s:?}"),
            Self::HexColor(s)     => return format!("#{s}"),
            Self::Var(s)          => return format!("${s}"),
            Self::Ident(s)        => return format!("`{s}`"),
            Self::Null       => "null",
            Self::Bool(true) => "true",
            Self::Bool(false) => "false",
            Self::Nan        => "nan",
            Self::Inf        => "inf",
            Self::And        => "and",
            Self::Or         => "or",
            Self::Xor        => "xor",
            Self::Not        => "not",
            Self::If         => "if",
            Self::Then       => "then",
            Self::Else       => "else",
            Self::As         => "as",
            Self::Plus       => "+",
            Self::Minus      => "-",
            Self::Star       => "*",
            Self::Slash      => "/",
            Self::Percent    => "%",
            Self::Lt         => "<",
            Self::LtEq       => "<=",
            Self::Gt         => ">",
            Self::GtEq       => ">=",
            Self::EqEq       => "==",
            Self::BangEq     => "!=",
            Self::EqEqEq     => "===",
            Self::BangEqEq   => "!==",
            Self::LtLt       => "<<",
            Self::GtGt       => ">>",
            Self::Amp        => "&",
            Self::Pipe       => "|",
            Self::Caret      => "^",
            Self::AmpAmp     => "&&",
            Self::PipePipe   => "||",
            Self::CaretCaret => "^^",
            Self::Bang       => "!",
            Self::Tilde      => "~",
            Self::Question   => "?",
            Self::Colon      => ":",
            Self::Comma      => ",",
            Self::LParen     => "(",
            Self::RParen     => ")",
            Self::Eof        => "end of input",
        };
        if matches!(self, Self::Eof) { s.to_string() } else { format!("`{s}`") }
    }
}

/// Maps an identifier string to its keyword token, or returns `Ident`.
pub fn keyword_or_ident(s: String) -> TokenKind {
    match s.as_str() {
        "null"  => TokenKind::Null,
        "true"  => TokenKind::Bool(true),
        "false" => TokenKind::Bool(false),
        "nan"   => TokenKind::Nan,
        "inf"   => TokenKind::Inf,
        "and"   => TokenKind::And,
        "or"    => TokenKind::Or,
        "xor"   => TokenKind::Xor,
        "not"   => TokenKind::Not,
        "if"    => TokenKind::If,
        "then"  => TokenKind::Then,
        "else"  => TokenKind::Else,
        "as"    => TokenKind::As,
        _       => TokenKind::Ident(s),
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}
