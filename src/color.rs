//! Color types and palettes.
//!
//! Provides RGBA and HSLA color representations, CSS/hex conversion and the
//! discrete palettes used for colour and fill scales.

use crate::error::{Error, Result};

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::new(255, 0, 0, 255);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0, 0, 255, 255);
    /// Panel grey of the default theme.
    pub const GREY92: Self = Self::rgb(235, 235, 235);
    /// Dark grey used for default marks.
    pub const GREY20: Self = Self::rgb(51, 51, 51);
    /// Mid grey used for axis text.
    pub const GREY30: Self = Self::rgb(77, 77, 77);
    /// Light grey used for strips and grid lines.
    pub const GREY85: Self = Self::rgb(217, 217, 217);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create a color with modified alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Create a color with alpha given as a fraction in `[0, 1]`.
    #[must_use]
    pub fn with_opacity(self, opacity: f32) -> Self {
        self.with_alpha((f32::from(self.a) * opacity.clamp(0.0, 1.0)).round() as u8)
    }

    /// Convert to array representation.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Create from array representation.
    #[must_use]
    pub const fn from_array(arr: [u8; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] for anything else.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let byte = |i: usize| {
            digits
                .get(i..i + 2)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| Error::InvalidColor(hex.to_string()))
        };
        match digits.len() {
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(Error::InvalidColor(hex.to_string())),
        }
    }

    /// CSS color string: `rgb(..)` when opaque, `rgba(..)` otherwise.
    #[must_use]
    pub fn to_css(self) -> String {
        if self.a == 255 {
            format!("rgb({},{},{})", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({},{},{},{:.3})",
                self.r,
                self.g,
                self.b,
                f32::from(self.a) / 255.0
            )
        }
    }

    /// Linear interpolation between two colors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv_t = 1.0 - t;

        Self::new(
            (f32::from(self.r) * inv_t + f32::from(other.r) * t) as u8,
            (f32::from(self.g) * inv_t + f32::from(other.g) * t) as u8,
            (f32::from(self.b) * inv_t + f32::from(other.b) * t) as u8,
            (f32::from(self.a) * inv_t + f32::from(other.a) * t) as u8,
        )
    }
}

/// HSLA color with floating-point components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsla {
    /// Hue (0.0-360.0 degrees).
    pub h: f32,
    /// Saturation (0.0-1.0).
    pub s: f32,
    /// Lightness (0.0-1.0).
    pub l: f32,
    /// Alpha (0.0-1.0).
    pub a: f32,
}

impl Hsla {
    /// Create a new HSLA color.
    #[must_use]
    pub const fn new(h: f32, s: f32, l: f32, a: f32) -> Self {
        Self { h, s, l, a }
    }

    /// Create an opaque HSL color (alpha = 1.0).
    #[must_use]
    pub const fn hsl(h: f32, s: f32, l: f32) -> Self {
        Self::new(h, s, l, 1.0)
    }

    /// Convert to RGBA.
    #[must_use]
    pub fn to_rgba(self) -> Rgba {
        let h = self.h.rem_euclid(360.0) / 360.0;
        let s = self.s;
        let l = self.l;

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;

            (
                hue_to_rgb(p, q, h + 1.0 / 3.0),
                hue_to_rgb(p, q, h),
                hue_to_rgb(p, q, h - 1.0 / 3.0),
            )
        };

        Rgba::new(
            (r * 255.0) as u8,
            (g * 255.0) as u8,
            (b * 255.0) as u8,
            (self.a * 255.0) as u8,
        )
    }
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

impl From<Hsla> for Rgba {
    fn from(hsla: Hsla) -> Self {
        hsla.to_rgba()
    }
}

const VIRIDIS: [Rgba; 5] = [
    Rgba::rgb(68, 1, 84),
    Rgba::rgb(59, 82, 139),
    Rgba::rgb(33, 145, 140),
    Rgba::rgb(94, 201, 98),
    Rgba::rgb(253, 231, 37),
];

const SET2: [Rgba; 8] = [
    Rgba::rgb(102, 194, 165),
    Rgba::rgb(252, 141, 98),
    Rgba::rgb(141, 160, 203),
    Rgba::rgb(231, 138, 195),
    Rgba::rgb(166, 216, 84),
    Rgba::rgb(255, 217, 47),
    Rgba::rgb(229, 196, 148),
    Rgba::rgb(179, 179, 179),
];

/// Discrete palette for colour and fill scales.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Palette {
    /// Evenly spaced hues at fixed saturation and lightness.
    #[default]
    Hue,
    /// Samples of the viridis map.
    Viridis,
    /// The eight-colour qualitative "Set2" palette, cycled.
    Set2,
    /// Explicit colours, cycled.
    Manual(Vec<Rgba>),
}

impl Palette {
    /// Palette by name: `hue`, `viridis` or `set2`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "hue" => Some(Palette::Hue),
            "viridis" => Some(Palette::Viridis),
            "set2" => Some(Palette::Set2),
            _ => None,
        }
    }

    /// `n` colours, one per level.
    #[must_use]
    pub fn colors(&self, n: usize) -> Vec<Rgba> {
        match self {
            Palette::Hue => (0..n)
                .map(|i| {
                    let h = 15.0 + 360.0 * i as f32 / n.max(1) as f32;
                    Hsla::hsl(h, 0.65, 0.6).to_rgba()
                })
                .collect(),
            Palette::Viridis => (0..n)
                .map(|i| {
                    let t = if n <= 1 { 0.0 } else { i as f32 / (n - 1) as f32 };
                    gradient(&VIRIDIS, t)
                })
                .collect(),
            Palette::Set2 => SET2.iter().copied().cycle().take(n).collect(),
            Palette::Manual(colors) if colors.is_empty() => vec![Rgba::GREY20; n],
            Palette::Manual(colors) => colors.iter().copied().cycle().take(n).collect(),
        }
    }
}

/// Interpolate along evenly spaced color stops, `t` in `[0, 1]`.
#[must_use]
pub fn gradient(stops: &[Rgba], t: f32) -> Rgba {
    match stops {
        [] => Rgba::GREY20,
        [only] => *only,
        _ => {
            let t = t.clamp(0.0, 1.0);
            let segments = stops.len() - 1;
            let segment = ((t * segments as f32).floor() as usize).min(segments - 1);
            let local = t * segments as f32 - segment as f32;
            stops[segment].lerp(stops[segment + 1], local)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_lerp() {
        let mid = Rgba::BLACK.lerp(Rgba::WHITE, 0.5);
        assert_eq!(mid, Rgba::rgb(127, 127, 127));
        assert_eq!(Rgba::BLACK.lerp(Rgba::WHITE, -0.5), Rgba::BLACK);
        assert_eq!(Rgba::BLACK.lerp(Rgba::WHITE, 1.5), Rgba::WHITE);
    }

    #[test]
    fn test_hsla_to_rgba() {
        let red = Hsla::hsl(0.0, 1.0, 0.5).to_rgba();
        assert_eq!((red.r, red.g, red.b), (255, 0, 0));

        let gray = Hsla::hsl(0.0, 0.0, 0.5).to_rgba();
        assert_eq!((gray.r, gray.g, gray.b), (127, 127, 127));

        let cyan = Hsla::hsl(180.0, 1.0, 0.5).to_rgba();
        assert_eq!(cyan.r, 0);
        assert!(cyan.g >= 254 && cyan.b >= 254);
    }

    #[test]
    fn test_hue_wraps_past_360() {
        assert_eq!(Hsla::hsl(375.0, 0.65, 0.6).to_rgba(), Hsla::hsl(15.0, 0.65, 0.6).to_rgba());
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgba::from_hex("#ff8000").unwrap(), Rgba::rgb(255, 128, 0));
        assert_eq!(Rgba::from_hex("00000080").unwrap(), Rgba::new(0, 0, 0, 128));
        assert!(matches!(Rgba::from_hex("#ff80"), Err(Error::InvalidColor(_))));
        assert!(matches!(Rgba::from_hex("#gg0000"), Err(Error::InvalidColor(_))));
    }

    #[test]
    fn test_to_css() {
        assert_eq!(Rgba::RED.to_css(), "rgb(255,0,0)");
        let css = Rgba::new(255, 0, 0, 128).to_css();
        assert!(css.starts_with("rgba("));
        assert!(css.contains("0.502"));
    }

    #[test]
    fn test_with_opacity() {
        assert_eq!(Rgba::RED.with_opacity(0.5).a, 128);
        assert_eq!(Rgba::RED.with_opacity(2.0).a, 255);
    }

    #[test]
    fn test_hue_palette_distinct() {
        let colors = Palette::Hue.colors(3);
        assert_eq!(colors.len(), 3);
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
    }

    #[test]
    fn test_viridis_endpoints() {
        let colors = Palette::Viridis.colors(2);
        assert_eq!(colors[0], VIRIDIS[0]);
        assert_eq!(colors[1], VIRIDIS[4]);
    }

    #[test]
    fn test_manual_palette_cycles() {
        let p = Palette::Manual(vec![Rgba::RED, Rgba::BLUE]);
        assert_eq!(p.colors(3), vec![Rgba::RED, Rgba::BLUE, Rgba::RED]);
    }

    #[test]
    fn test_palette_from_name() {
        assert_eq!(Palette::from_name("set2"), Some(Palette::Set2));
        assert_eq!(Palette::from_name("rainbow"), None);
    }
}
