use std::fmt;

/// An 8-bit RGBA color. Every constructor clamps its channels to `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

fn clamp_i(v: i64) -> u8 { v.clamp(0, 255) as u8 }

fn clamp_f(v: f32) -> u8 { clamp_i((v * 255.0) as i64) }

impl Color {
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };

    pub fn new(r: i64, g: i64, b: i64, a: i64) -> Self {
        Self { r: clamp_i(r), g: clamp_i(g), b: clamp_i(b), a: clamp_i(a) }
    }

    pub fn rgb(r: i64, g: i64, b: i64) -> Self { Self::new(r, g, b, 255) }

    /// Channels in `0.0..=1.0`.
    pub fn from_unit(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r: clamp_f(r), g: clamp_f(g), b: clamp_f(b), a: clamp_f(a) }
    }

    pub fn from_argb(argb: u32) -> Self {
        let [a, r, g, b] = argb.to_be_bytes();
        Self { r, g, b, a }
    }

    pub fn from_rgb(rgb: u32) -> Self {
        Self { a: 255, ..Self::from_argb(rgb) }
    }

    pub fn argb(&self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }

    pub fn packed_rgb(&self) -> u32 {
        self.argb() & 0x00FF_FFFF
    }

    pub fn with_alpha(self, a: i64) -> Self {
        Self { a: clamp_i(a), ..self }
    }

    pub fn is_fully_transparent(&self) -> bool { self.a == 0 }
    pub fn is_fully_opaque(&self) -> bool { self.a == 255 }

    /// Parses `#RGB`, `#ARGB`, `#RRGGBB` or `#AARRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let nibbles: Vec<u8> = digits.bytes().map(hexit).collect();
        let short = |i: usize| nibbles[i] << 4 | nibbles[i];
        let long = |i: usize| nibbles[i] << 4 | nibbles[i + 1];
        let (a, r, g, b) = match nibbles.len() {
            3 => (255, short(0), short(1), short(2)),
            4 => (short(0), short(1), short(2), short(3)),
            6 => (255, long(0), long(2), long(4)),
            8 => (long(0), long(2), long(4), long(6)),
            _ => return None,
        };
        Some(Self { r, g, b, a })
    }
}

fn hexit(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _           => b - b'A' + 10,
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fully_opaque() {
            write!(f, "#{:06X}", self.packed_rgb())
        } else {
            write!(f, "#{:08X}", self.argb())
        }
    }
}
