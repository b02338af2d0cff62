#![forbid(unsafe_code)]

//! Background colors for screens.

/// A straight (non-premultiplied) RGBA color.
///
/// Deserializes from either channels (`{ r, g, b, a }`, alpha defaulting to
/// opaque) or a hex string accepted by [`Rgba::from_hex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RgbaRepr"))]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black. This is the global default background.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Create a color from all four channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        // from_str_radix alone would accept a sign.
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Same color with alpha multiplied by `opacity` (clamped to [0, 1]).
    #[must_use]
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (f64::from(self.a) * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    #[inline]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RgbaRepr {
    Hex(String),
    Channels {
        r: u8,
        g: u8,
        b: u8,
        #[serde(default = "opaque")]
        a: u8,
    },
}

#[cfg(feature = "serde")]
const fn opaque() -> u8 {
    255
}

#[cfg(feature = "serde")]
impl TryFrom<RgbaRepr> for Rgba {
    type Error = String;

    fn try_from(repr: RgbaRepr) -> Result<Self, Self::Error> {
        match repr {
            RgbaRepr::Hex(hex) => {
                Self::from_hex(&hex).ok_or_else(|| format!("invalid hex color {hex:?}"))
            }
            RgbaRepr::Channels { r, g, b, a } => Ok(Self::new(r, g, b, a)),
        }
    }
}
