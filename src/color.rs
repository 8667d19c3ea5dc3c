use std::fmt;

use log::warn;
use thiserror::Error;

/// Glow stop used when a swatch has no usable channels.
pub const FALLBACK_GLOW: Rgba = Rgba::new(255, 255, 255, 0.4);
/// Flare stop used when a swatch has no usable channels.
pub const FALLBACK_FLARE: Rgba = Rgba::new(255, 255, 255, 0.3);
/// Fill used for palette entries that failed to parse.
pub const FALLBACK_FILL: Rgba = Rgba::new(255, 255, 255, 0.9);

pub const DEFAULT_PALETTE: [&str; 6] = [
    "rgba(255, 255, 255, 0.9)",  // pure white
    "rgba(235, 244, 255, 0.85)", // bluish white
    "rgba(200, 220, 255, 0.8)",  // light blue
    "rgba(200, 200, 255, 0.8)",  // very light purple
    "rgba(255, 240, 230, 0.8)",  // warm white
    "rgba(220, 240, 255, 0.85)", // ice blue
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("expected rgb(...) or rgba(...), got {0:?}")]
    Notation(String),
    #[error("expected 3 or 4 channels, got {0}")]
    ChannelCount(usize),
    #[error("invalid color channel {0:?}")]
    Channel(String),
    #[error("invalid alpha {0:?}")]
    Alpha(String),
}

/// An sRGB color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        let body = trimmed
            .strip_prefix("rgba(")
            .or_else(|| trimmed.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ColorError::Notation(input.to_string()))?;

        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(ColorError::ChannelCount(parts.len()));
        }

        let channel = |raw: &str| -> Result<u8, ColorError> {
            if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ColorError::Channel(raw.to_string()));
            }
            raw.parse::<u8>()
                .map_err(|_| ColorError::Channel(raw.to_string()))
        };

        let alpha = match parts.get(3) {
            Some(raw) => {
                let value = raw
                    .parse::<f32>()
                    .map_err(|_| ColorError::Alpha(raw.to_string()))?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(ColorError::Alpha(raw.to_string()));
                }
                value
            }
            None => 1.0,
        };

        Ok(Self::new(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            alpha,
        ))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Normalised channels for upload, alpha clamped into `[0, 1]`.
    pub fn to_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a.clamp(0.0, 1.0),
        ]
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// A palette entry: the fill color plus the channels its halo and flare
/// are derived from. `halo` is `None` when the source string was unusable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swatch {
    pub fill: Rgba,
    pub halo: Option<[u8; 3]>,
}

impl Swatch {
    pub const NEUTRAL: Swatch = Swatch {
        fill: FALLBACK_FILL,
        halo: None,
    };

    pub fn from_css(input: &str) -> Self {
        match Rgba::parse(input) {
            Ok(color) => Self {
                fill: color,
                halo: Some([color.r, color.g, color.b]),
            },
            Err(err) => {
                warn!("palette entry {input:?} unusable ({err}), using neutral white");
                Self::NEUTRAL
            }
        }
    }

    /// Inner stop of the glow gradient.
    pub fn glow_stop(&self, twinkle_factor: f32) -> Rgba {
        match self.halo {
            Some([r, g, b]) => Rgba::new(r, g, b, 0.4 * twinkle_factor),
            None => FALLBACK_GLOW,
        }
    }

    /// Start stop of the flare gradient.
    pub fn flare_stop(&self) -> Rgba {
        match self.halo {
            Some([r, g, b]) => Rgba::new(r, g, b, 0.3),
            None => FALLBACK_FLARE,
        }
    }
}

/// Derives the glow color straight from a color string, falling back to
/// translucent white when the channels can't be extracted.
pub fn glow_color(input: &str, twinkle_factor: f32) -> Rgba {
    Swatch::from_css(input).glow_stop(twinkle_factor)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    swatches: Vec<Swatch>,
}

impl Palette {
    /// Builds a palette from color strings. An empty list yields the default palette.
    pub fn from_css<S: AsRef<str>>(entries: &[S]) -> Self {
        if entries.is_empty() {
            return Self::default();
        }
        Self {
            swatches: entries.iter().map(|e| Swatch::from_css(e.as_ref())).collect(),
        }
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_css(&DEFAULT_PALETTE)
    }
}
