// color.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Parse operator text the way an HTML number input is coerced:
/// surrounding whitespace is ignored and an empty field counts as zero.
/// Accepts `Infinity` and `0x`/`0o`/`0b` integers, rejects the other
/// spellings `f64::from_str` allows (`inf`, `nan`, ...).
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => 10,
    };
    if radix != 10 {
        let digits = &s[2..];
        if digits.is_empty() {
            return None;
        }
        return digits.chars().try_fold(0.0f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
        });
    }

    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
    {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Coerce a form value into a color channel. Garbage becomes 0.
pub fn clamp255(s: &str) -> u8 {
    match parse_number(s) {
        None => 0,
        Some(n) => (n + 0.5).floor().clamp(0.0, 255.0) as u8,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub fn from_form(form: &RgbForm) -> Self {
        Rgb {
            r: clamp255(&form.r),
            g: clamp255(&form.g),
            b: clamp255(&form.b),
        }
    }
}

// css color, used for the preview swatches
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Raw text of the three channel inputs as posted by the browser.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RgbForm {
    #[serde(default)]
    pub r: String,
    #[serde(default)]
    pub g: String,
    #[serde(default)]
    pub b: String,
}


// EOF
