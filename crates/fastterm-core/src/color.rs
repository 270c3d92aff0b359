//! ARGB color representation and compositing math.
//!
//! Colors are stored as four `u8` channels (alpha, red, green, blue). All
//! compositing is done per channel and truncated back into the `0..=255`
//! range. Alpha blending uses integer math so it is exact for every coverage.
//!
//! # Examples
//!
//! ```
//! use fastterm_core::color::Color;
//!
//! let backdrop = Color::WHITE;
//! let tint = Color::argb(128, 255, 0, 0);
//!
//! // Half-transparent red over white lands halfway between the two.
//! let blended = Color::alpha_blend(backdrop, tint);
//! assert_eq!(blended, Color::argb(255, 255, 127, 127));
//! ```

use crate::error::ColorParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A color with an alpha channel, each component in `0..=255`.
///
/// An alpha of `0` is fully transparent and `255` fully opaque.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Alpha component (0 = transparent, 255 = opaque).
    pub a: u8,
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
}

// ============================================================================
// Common color constants
// ============================================================================

impl Color {
    /// Fully transparent black. This is the "unset" color of an empty cell.
    pub const TRANSPARENT: Self = Self::argb(0, 0, 0, 0);

    /// Opaque black (#000000).
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Opaque white (#FFFFFF).
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque red (#FF0000).
    pub const RED: Self = Self::rgb(255, 0, 0);

    /// Opaque green (#00FF00).
    pub const GREEN: Self = Self::rgb(0, 255, 0);

    /// Opaque blue (#0000FF).
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Opaque yellow (#FFFF00).
    pub const YELLOW: Self = Self::rgb(255, 255, 0);

    /// Opaque cyan (#00FFFF).
    pub const CYAN: Self = Self::rgb(0, 255, 255);

    /// Opaque magenta (#FF00FF).
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);

    /// Opaque gray (#808080).
    pub const GRAY: Self = Self::rgb(128, 128, 128);
}

// ============================================================================
// Constructors
// ============================================================================

impl Color {
    /// Creates a color from alpha, red, green and blue components.
    #[inline]
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Creates a fully opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(255, r, g, b)
    }

    /// Returns the same color with a different alpha.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Returns a fully opaque version of this color.
    #[inline]
    pub const fn opaque(self) -> Self {
        self.with_alpha(255)
    }

    /// Returns whether the alpha channel is 255.
    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }
}

// ============================================================================
// Compositing
// ============================================================================

/// Interpolates a single channel and truncates the result into a byte.
#[inline]
fn lerp_channel(start: u8, end: u8, t: f32) -> u8 {
    let start = start as f32;
    let value = start + (end as f32 - start) * t;
    (value as i32).clamp(0, 255) as u8
}

/// Interpolates a single channel by `coverage / 255` in exact integer math.
///
/// The interpolated value is never negative, so integer division truncates
/// exactly like the float path would without its rounding noise.
#[inline]
fn lerp_channel_coverage(start: u8, end: u8, coverage: u8) -> u8 {
    let start = start as i32;
    let value = (start * 255 + (end as i32 - start) * coverage as i32) / 255;
    value.clamp(0, 255) as u8
}

impl Color {
    /// Linearly interpolates every channel from `start` toward `end`.
    ///
    /// `t <= 0.0` returns `start` and `t >= 1.0` returns `end` unchanged.
    /// In between each channel is interpolated and truncated toward zero.
    pub fn interpolate(start: Self, end: Self, t: f32) -> Self {
        if t <= 0.0 {
            return start;
        }
        if t >= 1.0 {
            return end;
        }
        Self {
            a: lerp_channel(start.a, end.a, t),
            r: lerp_channel(start.r, end.r, t),
            g: lerp_channel(start.g, end.g, t),
            b: lerp_channel(start.b, end.b, t),
        }
    }

    /// Blends `append` over `base` using the append color's alpha as coverage.
    ///
    /// A transparent append leaves `base` untouched, an opaque append replaces
    /// it. Anything in between moves every channel of `base` (alpha included)
    /// toward the opaque version of `append` by `append.a / 255` in integer
    /// math. [`Color::interpolate`] with `t = append.a / 255.0` truncates float
    /// rounding noise, so its channels can come out one lower than these.
    pub fn alpha_blend(base: Self, append: Self) -> Self {
        match append.a {
            0 => base,
            255 => append,
            coverage => Self {
                a: lerp_channel_coverage(base.a, 255, coverage),
                r: lerp_channel_coverage(base.r, append.r, coverage),
                g: lerp_channel_coverage(base.g, append.g, coverage),
                b: lerp_channel_coverage(base.b, append.b, coverage),
            },
        }
    }

    /// Multiplies two colors channel by channel, normalised to `0..=255`.
    ///
    /// Useful for shading: multiplying by white is the identity and by
    /// transparent black erases the color.
    pub fn multiply(left: Self, right: Self) -> Self {
        let mul = |l: u8, r: u8| ((l as f32 * r as f32 / 255.0).round() as i32).clamp(0, 255) as u8;
        Self {
            a: mul(left.a, right.a),
            r: mul(left.r, right.r),
            g: mul(left.g, right.g),
            b: mul(left.b, right.b),
        }
    }

    /// Scales the color channels by this color's own alpha and forces it opaque.
    ///
    /// This is how a translucent color looks over a black backdrop, which is
    /// what terminals without real transparency effectively show.
    pub fn premultiplied_opaque(self) -> Self {
        let scale = |c: u8| (c as u32 * self.a as u32 / 255) as u8;
        Self::rgb(scale(self.r), scale(self.g), scale(self.b))
    }
}

// ============================================================================
// Hex parsing and formatting
// ============================================================================

impl Color {
    /// Parses a hex color string.
    ///
    /// Accepts `#RGB`, `#RGBA`, `#RRGGBB` and `#RRGGBBAA`, with or without the
    /// leading `#`. Forms without an alpha component are opaque.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.is_empty() {
            return Err(ColorParseError::EmptyInput);
        }

        let digit = |c: u8| -> Result<u8, ColorParseError> {
            (c as char)
                .to_digit(16)
                .map(|d| d as u8)
                .ok_or(ColorParseError::InvalidHexChar)
        };
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 | 4 => {
                let mut channels = [255u8; 4];
                for (slot, &c) in channels.iter_mut().zip(bytes) {
                    let d = digit(c)?;
                    *slot = d << 4 | d;
                }
                Ok(Self::argb(channels[3], channels[0], channels[1], channels[2]))
            }
            6 | 8 => {
                let mut channels = [255u8; 4];
                for (slot, pair) in channels.iter_mut().zip(bytes.chunks(2)) {
                    *slot = digit(pair[0])? << 4 | digit(pair[1])?;
                }
                Ok(Self::argb(channels[3], channels[0], channels[1], channels[2]))
            }
            len => Err(ColorParseError::InvalidLength(len)),
        }
    }

    /// Formats the color as `#RRGGBB`, or `#RRGGBBAA` when it is not opaque.
    pub fn to_hex(self) -> String {
        if self.is_opaque() {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::rgb(r, g, b)
    }
}

impl From<(u8, u8, u8, u8)> for Color {
    /// Converts an `(a, r, g, b)` tuple.
    fn from((a, r, g, b): (u8, u8, u8, u8)) -> Self {
        Self::argb(a, r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    mod blend_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_transparent_append_is_identity() {
            let base = Color::argb(200, 10, 20, 30);
            assert_eq!(Color::alpha_blend(base, Color::TRANSPARENT), base);
            assert_eq!(Color::alpha_blend(base, Color::argb(0, 255, 255, 255)), base);
        }

        #[test]
        fn test_opaque_append_replaces() {
            let base = Color::argb(10, 1, 2, 3);
            let append = Color::rgb(9, 8, 7);
            assert_eq!(Color::alpha_blend(base, append), append);
        }

        #[test]
        fn test_half_coverage_over_white() {
            let blended = Color::alpha_blend(Color::WHITE, Color::argb(128, 0, 0, 255));
            assert_eq!(blended, Color::argb(255, 127, 127, 255));
        }

        #[test]
        fn test_blend_raises_alpha_toward_opaque() {
            let blended = Color::alpha_blend(Color::TRANSPARENT, Color::argb(128, 255, 0, 0));
            assert_eq!(blended.a, 128);
            assert_eq!(blended.r, 128);
        }

        #[test]
        fn test_blend_is_monotonic_in_coverage() {
            let base = Color::BLACK;
            let mut previous = 0u8;
            for alpha in 1..=255u8 {
                let red = Color::alpha_blend(base, Color::argb(alpha, 255, 0, 0)).r;
                assert!(red >= previous, "coverage {alpha} went backwards");
                previous = red;
            }
            assert_eq!(previous, 255);
        }

        #[test]
        fn test_blend_is_interpolate_up_to_rounding() {
            let blend = |base: u8, end: u8, coverage: u8| {
                Color::alpha_blend(Color::rgb(base, 0, 0), Color::argb(coverage, end, 0, 0)).r
            };
            let lerp = |base: u8, end: u8, coverage: u8| {
                let t = f32::from(coverage) / 255.0;
                Color::interpolate(Color::rgb(base, 0, 0), Color::rgb(end, 0, 0), t).r
            };

            assert_eq!(blend(25, 0, 153), 10);
            assert_eq!(lerp(25, 0, 153), 9);

            for base in (0..=255u8).step_by(5) {
                for end in (0..=255u8).step_by(5) {
                    for coverage in 1..=254u8 {
                        let exact = blend(base, end, coverage);
                        let float = lerp(base, end, coverage);
                        assert!(
                            exact == float || exact == float + 1,
                            "{base} -> {end} at {coverage}: {exact} vs {float}"
                        );
                    }
                }
            }
        }
    }

    mod interpolate_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_interpolate_endpoints() {
            let a = Color::argb(0, 0, 0, 0);
            let b = Color::argb(255, 100, 200, 50);
            assert_eq!(Color::interpolate(a, b, -1.0), a);
            assert_eq!(Color::interpolate(a, b, 0.0), a);
            assert_eq!(Color::interpolate(a, b, 1.0), b);
            assert_eq!(Color::interpolate(a, b, 7.5), b);
        }

        #[test]
        fn test_interpolate_truncates() {
            let c = Color::interpolate(Color::argb(0, 0, 0, 0), Color::argb(255, 3, 255, 1), 0.5);
            assert_eq!(c, Color::argb(127, 1, 127, 0));
        }

        #[test]
        fn test_interpolate_downward() {
            let c = Color::interpolate(Color::WHITE, Color::BLACK, 0.25);
            assert_eq!(c, Color::argb(255, 191, 191, 191));
        }
    }

    #[test]
    fn test_multiply() {
        assert_eq!(Color::multiply(Color::CYAN, Color::WHITE), Color::CYAN);
        assert_eq!(Color::multiply(Color::CYAN, Color::TRANSPARENT), Color::TRANSPARENT);
        assert_eq!(
            Color::multiply(Color::rgb(255, 128, 0), Color::GRAY),
            Color::argb(255, 128, 64, 0)
        );
    }

    #[test]
    fn test_premultiplied_opaque() {
        assert_eq!(Color::TRANSPARENT.premultiplied_opaque(), Color::BLACK);
        assert_eq!(Color::RED.premultiplied_opaque(), Color::RED);
        assert_eq!(
            Color::argb(128, 255, 100, 0).premultiplied_opaque(),
            Color::rgb(128, 50, 0)
        );
    }

    mod hex_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_from_hex_6digit() {
            assert_eq!(Color::from_hex("#FF8000").unwrap(), Color::rgb(255, 128, 0));
        }

        #[test]
        fn test_from_hex_8digit() {
            assert_eq!(
                Color::from_hex("#FF800080").unwrap(),
                Color::argb(128, 255, 128, 0)
            );
        }

        #[test]
        fn test_from_hex_short_forms() {
            assert_eq!(Color::from_hex("F80").unwrap(), Color::rgb(255, 136, 0));
            assert_eq!(Color::from_hex("#F808").unwrap(), Color::argb(136, 255, 136, 0));
        }

        #[test]
        fn test_from_hex_errors() {
            assert_eq!(Color::from_hex(""), Err(ColorParseError::EmptyInput));
            assert_eq!(Color::from_hex("#12345"), Err(ColorParseError::InvalidLength(5)));
            assert_eq!(Color::from_hex("#GGGGGG"), Err(ColorParseError::InvalidHexChar));
        }

        #[test]
        fn test_to_hex() {
            assert_eq!(Color::rgb(255, 128, 0).to_hex(), "#FF8000");
            assert_eq!(Color::argb(128, 255, 128, 0).to_string(), "#FF800080");
            let parsed: Color = Color::argb(1, 2, 3, 4).to_hex().parse().unwrap();
            assert_eq!(parsed, Color::argb(1, 2, 3, 4));
        }
    }
}
