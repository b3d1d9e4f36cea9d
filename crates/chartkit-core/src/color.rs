//! Color representation, CSS color parsing and brightness metrics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RGBA color with values in the range [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component [0.0, 1.0]
    pub r: f32,
    /// Green component [0.0, 1.0]
    pub g: f32,
    /// Blue component [0.0, 1.0]
    pub b: f32,
    /// Alpha component [0.0, 1.0]
    pub a: f32,
}

impl Color {
    /// Create a new color, clamping values to [0.0, 1.0].
    #[must_use]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Create an opaque color from RGB values.
    #[must_use]
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Create a color from 8-bit channels.
    #[must_use]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Parse a hex color string (`#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`).
    ///
    /// The leading `#` is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid hex color.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(ColorParseError::InvalidHex);
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| ColorParseError::InvalidHex);
        // Short forms repeat each digit: "f80" == "ff8800".
        let short = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);

        match hex.len() {
            3 => Ok(Self::from_rgba8(short(0)?, short(1)?, short(2)?, 255)),
            4 => Ok(Self::from_rgba8(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Ok(Self::from_rgba8(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Ok(Self::from_rgba8(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => Err(ColorParseError::InvalidLength),
        }
    }

    /// Parse any CSS color: hex forms, `rgb()`/`rgba()`, `hsl()`, named
    /// colors and the `transparent` keyword.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a recognizable CSS color.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let input = input.trim();
        if input.starts_with('#') {
            return Self::from_hex(input);
        }
        let parsed: csscolorparser::Color = input
            .parse()
            .map_err(|_| ColorParseError::Unrecognized(input.to_string()))?;
        let [r, g, b, a] = parsed.to_rgba8();
        Ok(Self::from_rgba8(r, g, b, a))
    }

    /// Convert to hex string (RGB only).
    #[must_use]
    pub fn to_hex(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Channels as 8-bit values.
    #[must_use]
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            (self.a * 255.0).round() as u8,
        ]
    }

    /// CSS `rgba()` string suitable for a canvas fill or stroke style.
    #[must_use]
    pub fn to_css(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r},{g},{b},{:.3})", self.a)
    }

    /// Perceived brightness on the 0–255 scale: `0.299r + 0.587g + 0.114b`.
    ///
    /// Computed on the 8-bit channels with integer weights, so colors parsed
    /// from CSS land exactly on their nominal value.
    #[must_use]
    pub fn brightness(&self) -> f64 {
        let [r, g, b, _] = self.to_rgba8();
        let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
        f64::from(weighted) / 1000.0
    }

    /// Whether the color is fully transparent.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// Calculate relative luminance per WCAG 2.1.
    ///
    /// See: <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>
    #[must_use]
    pub fn relative_luminance(&self) -> f32 {
        let r = Self::linearize(self.r);
        let g = Self::linearize(self.g);
        let b = Self::linearize(self.b);

        0.0722f32.mul_add(b, 0.2126f32.mul_add(r, 0.7152 * g))
    }

    /// Calculate contrast ratio between two colors per WCAG 2.1.
    ///
    /// Returns a value between 1.0 (no contrast) and 21.0 (maximum contrast).
    #[must_use]
    pub fn contrast_ratio(&self, other: &Self) -> f32 {
        let l1 = self.relative_luminance();
        let l2 = other.relative_luminance();

        let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };

        (lighter + 0.05) / (darker + 0.05)
    }

    /// Pick whichever of `a` and `b` reads better on top of this color.
    #[must_use]
    pub fn best_contrast(&self, a: Self, b: Self) -> Self {
        if self.contrast_ratio(&a) >= self.contrast_ratio(&b) {
            a
        } else {
            b
        }
    }

    /// Linear interpolation between two colors.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            (other.r - self.r).mul_add(t, self.r),
            (other.g - self.g).mul_add(t, self.g),
            (other.b - self.b).mul_add(t, self.b),
            (other.a - self.a).mul_add(t, self.a),
        )
    }

    /// Same color with a different alpha.
    #[must_use]
    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self::new(self.r, self.g, self.b, alpha)
    }

    /// Same color with its alpha multiplied by `factor`.
    #[must_use]
    pub fn fade(&self, factor: f64) -> Self {
        self.with_alpha(self.a * factor as f32)
    }

    /// Linearize sRGB component for luminance calculation.
    fn linearize(c: f32) -> f32 {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    /// Black color
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    /// White color
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    /// Transparent color
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl std::str::FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Error type for color parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    /// Invalid hex characters
    #[error("invalid hex characters")]
    InvalidHex,
    /// Invalid string length
    #[error("invalid hex string length (expected 3, 4, 6 or 8)")]
    InvalidLength,
    /// Not a CSS color
    #[error("unrecognized color: {0}")]
    Unrecognized(String),
}
