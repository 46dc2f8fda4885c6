//! Lengths with units.
//!
//! A [`Length`] is not a single number. It is the sum of an absolute pixel
//! part, a physical part (kept in inches), and two percentages that only
//! resolve once the parent and self sizes are known at render time.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::format_double;

pub const INCHES_PER_MILLIMETRE: f64 = 5.0 / 127.0;
pub const INCHES_PER_CENTIMETRE: f64 = 50.0 / 127.0;
pub const INCHES_PER_METRE: f64 = 5000.0 / 127.0;
pub const INCHES_PER_FOOT: f64 = 12.0;
pub const INCHES_PER_YARD: f64 = 36.0;
pub const INCHES_PER_PICA: f64 = 1.0 / 6.0;
pub const INCHES_PER_POINT: f64 = 1.0 / 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Length {
    pub pixels: f64,
    /// Every physical unit folds into inches; `pixels = inches * dpi`.
    pub inches: f64,
    /// `pixels = parent_perc / 100 * parent_size`
    pub parent_perc: f64,
    /// `pixels = self_perc / 100 * self_size`
    pub self_perc: f64,
}

impl Length {
    pub const ZERO: Length = Length::new(0.0, 0.0, 0.0, 0.0);
    pub const ONE_PIXEL: Length = Length::new(1.0, 0.0, 0.0, 0.0);

    pub const fn new(pixels: f64, inches: f64, parent_perc: f64, self_perc: f64) -> Self {
        Self { pixels, inches, parent_perc, self_perc }
    }

    pub fn pixels(v: f64) -> Self { Self::new(v, 0.0, 0.0, 0.0) }
    pub fn inches(v: f64) -> Self { Self::new(0.0, v, 0.0, 0.0) }
    pub fn feet(v: f64) -> Self { Self::inches(v * INCHES_PER_FOOT) }
    pub fn yards(v: f64) -> Self { Self::inches(v * INCHES_PER_YARD) }
    pub fn millimetres(v: f64) -> Self { Self::inches(v * INCHES_PER_MILLIMETRE) }
    pub fn centimetres(v: f64) -> Self { Self::inches(v * INCHES_PER_CENTIMETRE) }
    pub fn metres(v: f64) -> Self { Self::inches(v * INCHES_PER_METRE) }
    pub fn points(v: f64) -> Self { Self::inches(v * INCHES_PER_POINT) }
    pub fn pica(v: f64) -> Self { Self::inches(v * INCHES_PER_PICA) }
    pub fn parent_perc(v: f64) -> Self { Self::new(0.0, 0.0, v, 0.0) }
    pub fn self_perc(v: f64) -> Self { Self::new(0.0, 0.0, 0.0, v) }

    pub fn to_pixels(&self, dpi: f64, parent_size: f64, self_size: f64) -> f64 {
        self.pixels
            + self.inches * dpi
            + self.parent_perc / 100.0 * parent_size
            + self.self_perc / 100.0 * self_size
    }

    pub fn to_inches(&self, dpi: f64, parent_size: f64, self_size: f64) -> f64 {
        self.pixels / dpi
            + self.inches
            + self.parent_perc / 100.0 * parent_size / dpi
            + self.self_perc / 100.0 * self_size / dpi
    }

    pub fn is_zero(&self) -> bool {
        self.pixels == 0.0 && self.inches == 0.0 && self.parent_perc == 0.0 && self.self_perc == 0.0
    }

    pub(crate) fn bits(&self) -> [u64; 4] {
        [self.pixels.to_bits(), self.inches.to_bits(), self.parent_perc.to_bits(), self.self_perc.to_bits()]
    }
}

impl Add for Length {
    type Output = Length;
    fn add(self, o: Length) -> Length {
        Length::new(self.pixels + o.pixels, self.inches + o.inches,
            self.parent_perc + o.parent_perc, self.self_perc + o.self_perc)
    }
}

impl Sub for Length {
    type Output = Length;
    fn sub(self, o: Length) -> Length {
        Length::new(self.pixels - o.pixels, self.inches - o.inches,
            self.parent_perc - o.parent_perc, self.self_perc - o.self_perc)
    }
}

impl Neg for Length {
    type Output = Length;
    fn neg(self) -> Length {
        Length::new(-self.pixels, -self.inches, -self.parent_perc, -self.self_perc)
    }
}

impl Mul<f64> for Length {
    type Output = Length;
    fn mul(self, s: f64) -> Length {
        Length::new(self.pixels * s, self.inches * s, self.parent_perc * s, self.self_perc * s)
    }
}

impl Div<f64> for Length {
    type Output = Length;
    fn div(self, s: f64) -> Length {
        Length::new(self.pixels / s, self.inches / s, self.parent_perc / s, self.self_perc / s)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0 px");
        }
        let parts = [
            (self.pixels, "px"),
            (self.inches, "in"),
            (self.parent_perc, "par"),
            (self.self_perc, "self"),
        ];
        let mut first = true;
        for (v, unit) in parts {
            if v == 0.0 { continue; }
            match (first, v < 0.0) {
                (true, true)   => f.write_str("- ")?,
                (true, false)  => {}
                (false, true)  => f.write_str(" - ")?,
                (false, false) => f.write_str(" + ")?,
            }
            write!(f, "{}{unit}", format_double(v.abs()))?;
            first = false;
        }
        Ok(())
    }
}
