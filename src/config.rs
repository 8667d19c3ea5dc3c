use log::{debug, warn};

use crate::color::Palette;

pub const DEFAULT_STAR_COUNT: usize = 200;
pub const DEFAULT_SPEED: f32 = 0.05;
pub const DEFAULT_GLOW_INTENSITY: f32 = 2.5;
/// Upper bound on stars. Each star draws at most three shapes, and the
/// instance buffer must fit the downlevel 256 MiB buffer limit.
pub const MAX_STAR_COUNT: usize = 1_000_000;
/// Glow multiplier used by the minimal variant.
pub const MINIMAL_GLOW_MULTIPLIER: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Twinkle, scaled glow, lens flare and background wash.
    Enhanced,
    /// Plain discs with a fixed glow and a hard clear.
    Minimal,
}

/// Sanitised renderer configuration. Every field is safe to use as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct StarFieldConfig {
    pub star_count: usize,
    pub speed: f32,
    pub glow_intensity: f32,
    /// Accepted for compatibility with the page markup; nothing consumes it yet.
    pub shooting_star_frequency: Option<f32>,
    pub variant: Variant,
    pub palette: Palette,
    pub seed: Option<u64>,
}

impl Default for StarFieldConfig {
    fn default() -> Self {
        Self {
            star_count: DEFAULT_STAR_COUNT,
            speed: DEFAULT_SPEED,
            glow_intensity: DEFAULT_GLOW_INTENSITY,
            shooting_star_frequency: None,
            variant: Variant::Enhanced,
            palette: Palette::default(),
            seed: None,
        }
    }
}

impl StarFieldConfig {
    /// Negative counts render nothing rather than failing.
    pub fn with_star_count(mut self, count: i64) -> Self {
        if count < 0 {
            warn!("star count {count} is negative, rendering no stars");
        }
        let count = usize::try_from(count.max(0)).unwrap_or(usize::MAX);
        if count > MAX_STAR_COUNT {
            warn!("star count {count} exceeds {MAX_STAR_COUNT}, clamping");
        }
        self.star_count = count.min(MAX_STAR_COUNT);
        self
    }

    /// Non-positive or non-finite speeds freeze the field.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = non_negative(speed, "speed");
        self
    }

    pub fn with_glow_intensity(mut self, glow: f32) -> Self {
        self.glow_intensity = non_negative(glow, "glow intensity");
        self
    }

    pub fn with_shooting_star_frequency(mut self, frequency: f32) -> Self {
        let clamped = if frequency.is_finite() {
            frequency.clamp(0.0, 1.0)
        } else {
            0.0
        };
        debug!("shooting star frequency {clamped} accepted, no streak layer is drawn");
        self.shooting_star_frequency = Some(clamped);
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_palette<S: AsRef<str>>(mut self, entries: &[S]) -> Self {
        self.palette = Palette::from_css(entries);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn twinkles(&self) -> bool {
        self.variant == Variant::Enhanced
    }
}

fn non_negative(value: f32, what: &str) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        if value != 0.0 {
            warn!("{what} {value} is not a positive number, using 0");
        }
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_usage() {
        let config = StarFieldConfig::default();
        assert_eq!(config.star_count, 200);
        assert_eq!(config.speed, 0.05);
        assert_eq!(config.glow_intensity, 2.5);
        assert_eq!(config.variant, Variant::Enhanced);
        assert_eq!(config.palette.len(), 6);
    }

    #[test]
    fn degenerate_values_are_clamped() {
        let config = StarFieldConfig::default()
            .with_star_count(-5)
            .with_speed(-1.0)
            .with_glow_intensity(f32::NAN)
            .with_shooting_star_frequency(4.0);
        assert_eq!(config.star_count, 0);
        assert_eq!(config.speed, 0.0);
        assert_eq!(config.glow_intensity, 0.0);
        assert_eq!(config.shooting_star_frequency, Some(1.0));
    }

    #[test]
    fn huge_star_counts_are_capped() {
        let config = StarFieldConfig::default().with_star_count(i64::MAX);
        assert_eq!(config.star_count, MAX_STAR_COUNT);
        let config = StarFieldConfig::default().with_star_count(MAX_STAR_COUNT as i64 - 1);
        assert_eq!(config.star_count, MAX_STAR_COUNT - 1);
        // three shapes per star plus the wash, rounded up to a power of two
        let shapes = (MAX_STAR_COUNT * 3 + 1).next_power_of_two();
        assert!(shapes * 64 <= 256 << 20);
    }

    #[test]
    fn minimal_variant_disables_twinkle() {
        let config = StarFieldConfig::default().with_variant(Variant::Minimal);
        assert!(!config.twinkles());
    }
}
