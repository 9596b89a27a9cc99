//! Brand color conversion.
//!
//! Clinics configure a primary color as a hex code (`#007bff`). The form theme expects the color
//! as a space-separated HSL triple (`211 100% 50%`) so it can be dropped straight into a CSS
//! custom property such as `--primary`.

use crate::{FormsError, FormsResult};

/// A hue/saturation/lightness triple rounded to whole units.
///
/// `Display` renders the CSS custom-property form: `"{hue} {saturation}% {lightness}%"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayColor {
    /// Hue in whole degrees, `0..360`.
    pub hue: u16,
    /// Saturation in whole percent, `0..=100`.
    pub saturation: u8,
    /// Lightness in whole percent, `0..=100`.
    pub lightness: u8,
}

impl std::fmt::Display for DisplayColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}% {}%", self.hue, self.saturation, self.lightness)
    }
}

/// Convert a 6-digit hex color, with or without a leading `#`, into a [`DisplayColor`].
///
/// # Errors
///
/// Returns [`FormsError::InvalidColor`] unless the input (after removing one leading `#`) is
/// exactly six ASCII hex digits.
pub fn to_display_color(hex: &str) -> FormsResult<DisplayColor> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FormsError::InvalidColor(format!(
            "expected 6 hex digits, got {hex:?}"
        )));
    }

    let channel = |range: std::ops::Range<usize>| -> FormsResult<f64> {
        u8::from_str_radix(&digits[range], 16)
            .map(|v| f64::from(v) / 255.0)
            .map_err(|e| FormsError::InvalidColor(e.to_string()))
    };
    let r = channel(0..2)?;
    let g = channel(2..4)?;
    let b = channel(4..6)?;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    let (h, s) = if max == min {
        (0.0, 0.0)
    } else {
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h / 6.0, s)
    };

    // Channels are in [0, 1] so the products below stay within their target ranges; the
    // modulo folds a hue that rounds up to 360 back onto 0.
    Ok(DisplayColor {
        hue: ((h * 360.0).round() as u16) % 360,
        saturation: (s * 100.0).round() as u8,
        lightness: (l * 100.0).round() as u8,
    })
}
