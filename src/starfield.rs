use std::f32::consts::TAU;
use std::time::Duration;

use glam::Vec2;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::canvas::Canvas;
use crate::color::{Rgba, Swatch};
use crate::config::{StarFieldConfig, Variant, MAX_STAR_COUNT, MINIMAL_GLOW_MULTIPLIER};
use crate::types::{Star, Viewport};

pub const MIN_BASE_SIZE: f32 = 0.5;
pub const MAX_BASE_SIZE: f32 = 2.5;
pub const MIN_TWINKLE_SPEED: f32 = 0.01;
pub const MAX_TWINKLE_SPEED: f32 = 0.04;
/// Stars at or below this radius get no halo.
pub const GLOW_THRESHOLD: f32 = 0.8;
/// Stars must exceed this radius to be considered for a flare.
pub const FLARE_THRESHOLD: f32 = 1.2;
pub const FLARE_CHANCE: f32 = 0.3;
/// Depth units per elapsed millisecond, per unit of speed.
pub const DEPTH_PER_MS: f32 = 0.05;
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

const BACKGROUND_TOP: Rgba = Rgba::new(5, 5, 10, 0.3);
const BACKGROUND_BOTTOM: Rgba = Rgba::new(10, 15, 35, 0.1);

/// Multiplier applied to `speed` for one frame. Falls back to a fixed step
/// when no time has elapsed or the delta is unknown.
pub fn depth_step(elapsed: Option<Duration>) -> f32 {
    let millis = elapsed
        .map(|e| e.min(MAX_FRAME_DELTA).as_secs_f32() * 1000.0)
        .unwrap_or(0.0);
    let step = millis * DEPTH_PER_MS;
    if step > 0.0 {
        step
    } else {
        1.0
    }
}

/// Brightness modulation in `[0.4, 1.0]`.
pub fn twinkle_factor(phase: f32) -> f32 {
    0.7 + (phase * TAU).sin() * 0.3
}

pub fn projected_radius(base_size: f32, depth: f32, width: f32) -> f32 {
    base_size * (1.0 - depth / width)
}

impl Star {
    pub fn radius(&self, width: f32, twinkle_factor: f32) -> f32 {
        projected_radius(self.base_size, self.depth, width) * twinkle_factor
    }

    /// Moves the star toward the viewer. Returns true when it arrived and
    /// was sent back to the far plane.
    pub fn advance<R: Rng>(&mut self, distance: f32, bounds: Vec2, twinkle: bool, rng: &mut R) -> bool {
        self.depth -= distance;

        if twinkle {
            self.twinkle += self.twinkle_speed;
            if self.twinkle >= 1.0 {
                self.twinkle = 0.0;
            }
        }

        if self.depth <= 0.0 {
            self.depth = bounds.x;
            self.position = random_position(bounds, rng);
            return true;
        }
        false
    }
}

fn random_position<R: Rng>(bounds: Vec2, rng: &mut R) -> Vec2 {
    Vec2::new(rng.gen_range(0.0..bounds.x), rng.gen_range(0.0..bounds.y))
}

/// The particle model: a fixed-size collection of stars flying toward the
/// viewer across a surface of the given size.
pub struct StarField<R = StdRng> {
    config: StarFieldConfig,
    bounds: Vec2,
    stars: Vec<Star>,
    rng: R,
}

impl StarField<StdRng> {
    pub fn new(config: StarFieldConfig, viewport: Viewport) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, viewport, rng)
    }
}

impl<R: Rng> StarField<R> {
    pub fn with_rng(config: StarFieldConfig, viewport: Viewport, rng: R) -> Self {
        let mut field = Self {
            config,
            bounds: Vec2::ONE,
            stars: Vec::new(),
            rng,
        };
        field.reseed(viewport);
        field
    }

    pub fn config(&self) -> &StarFieldConfig {
        &self.config
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    /// Discards every star and seeds a fresh collection sized to `viewport`.
    pub fn reseed(&mut self, viewport: Viewport) {
        self.bounds = viewport.clamped().size();
        self.stars.clear();
        // fields are public, so a hand-built config may skip the builder clamp
        let count = self.config.star_count.min(MAX_STAR_COUNT);
        self.stars.reserve(count);

        let bounds = self.bounds;
        let palette = self.config.palette.swatches();
        for _ in 0..count {
            let swatch = if palette.is_empty() {
                Swatch::NEUTRAL
            } else {
                palette[self.rng.gen_range(0..palette.len())]
            };
            self.stars.push(Star {
                position: random_position(bounds, &mut self.rng),
                depth: self.rng.gen_range(0.0..=bounds.x),
                base_size: self.rng.gen_range(MIN_BASE_SIZE..MAX_BASE_SIZE),
                swatch,
                twinkle: self.rng.gen_range(0.0..1.0),
                twinkle_speed: self.rng.gen_range(MIN_TWINKLE_SPEED..MAX_TWINKLE_SPEED),
            });
        }
        debug!(
            "seeded {} stars over {}x{}",
            self.stars.len(),
            bounds.x,
            bounds.y
        );
    }

    /// Advances every star by one frame without drawing. Returns how many
    /// stars were sent back to the far plane.
    pub fn step(&mut self, elapsed: Option<Duration>) -> usize {
        let distance = self.config.speed * depth_step(elapsed);
        let twinkle = self.config.twinkles();
        let bounds = self.bounds;
        let mut arrived = 0;
        for star in &mut self.stars {
            if star.advance(distance, bounds, twinkle, &mut self.rng) {
                arrived += 1;
            }
        }
        arrived
    }

    /// Advances every star by one frame and paints the result.
    pub fn frame<C: Canvas>(&mut self, elapsed: Option<Duration>, canvas: &mut C) {
        let Self {
            config,
            bounds,
            stars,
            rng,
        } = self;
        let bounds = *bounds;
        let enhanced = config.variant == Variant::Enhanced;
        let distance = config.speed * depth_step(elapsed);

        canvas.clear(bounds.x, bounds.y);
        if enhanced {
            canvas.fill_vertical_gradient(BACKGROUND_TOP, BACKGROUND_BOTTOM);
        }

        for star in stars.iter_mut() {
            star.advance(distance, bounds, enhanced, rng);

            let wave = (star.twinkle * TAU).sin();
            let factor = if enhanced { twinkle_factor(star.twinkle) } else { 1.0 };
            let radius = star.radius(bounds.x, factor);
            let center = star.position;

            canvas.fill_disc(center, radius, star.swatch.fill);

            if radius > GLOW_THRESHOLD {
                let outer = if enhanced {
                    radius * config.glow_intensity * (1.0 + wave * 0.3)
                } else {
                    radius * MINIMAL_GLOW_MULTIPLIER
                };
                let stop = star.swatch.glow_stop(factor);
                canvas.fill_radial_glow(center, radius * 0.5, outer, stop, stop.with_alpha(0.0));
            }

            if enhanced && radius > FLARE_THRESHOLD && rng.gen::<f32>() > 1.0 - FLARE_CHANCE {
                let length = radius * 10.0 * factor;
                let angle = rng.gen_range(0.0..TAU);
                let end = center + Vec2::from_angle(angle) * length;
                let stop = star.swatch.flare_stop();
                canvas.stroke_flare(center, end, radius * 0.5, stop, stop.with_alpha(0.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::ShapeBatch;
    use crate::types::ShapeKind;

    fn field(config: StarFieldConfig, width: u32, height: u32) -> StarField<StdRng> {
        StarField::with_rng(config, Viewport::new(width, height), StdRng::seed_from_u64(42))
    }

    fn assert_in_bounds(field: &StarField<StdRng>) {
        let bounds = field.bounds();
        for star in field.stars() {
            assert!(star.position.x >= 0.0 && star.position.x < bounds.x, "{star:?}");
            assert!(star.position.y >= 0.0 && star.position.y < bounds.y, "{star:?}");
            assert!(star.depth >= 0.0 && star.depth <= bounds.x, "{star:?}");
        }
    }

    #[test]
    fn seeds_exactly_star_count() {
        let field = field(StarFieldConfig::default().with_star_count(250), 800, 600);
        assert_eq!(field.stars().len(), 250);
        assert_in_bounds(&field);
        for star in field.stars() {
            assert!(star.base_size >= MIN_BASE_SIZE && star.base_size < MAX_BASE_SIZE);
            assert!(star.twinkle >= 0.0 && star.twinkle < 1.0);
        }
    }

    #[test]
    fn shrinking_resize_reseeds_inside_new_bounds() {
        let mut field = field(StarFieldConfig::default().with_star_count(120), 800, 600);
        field.reseed(Viewport::new(400, 300));
        assert_eq!(field.stars().len(), 120);
        assert_eq!(field.bounds(), Vec2::new(400.0, 300.0));
        assert_in_bounds(&field);
    }

    #[test]
    fn oversized_hand_built_count_is_capped() {
        let config = StarFieldConfig {
            star_count: usize::MAX,
            ..StarFieldConfig::default()
        };
        let field = field(config, 2, 2);
        assert_eq!(field.stars().len(), MAX_STAR_COUNT);
    }

    #[test]
    fn zero_sized_viewport_is_clamped() {
        let field = field(StarFieldConfig::default().with_star_count(10), 0, 0);
        assert_eq!(field.bounds(), Vec2::ONE);
        assert_in_bounds(&field);
    }

    #[test]
    fn depth_cycles_back_to_the_far_plane() {
        let speed = 0.5;
        let config = StarFieldConfig::default()
            .with_star_count(1)
            .with_speed(speed)
            .with_variant(Variant::Minimal);
        let mut field = field(config, 100, 100);
        let limit = (100.0_f32 / speed).ceil() as usize;

        let mut frames = 0;
        while field.step(None) == 0 {
            frames += 1;
            assert!(frames <= limit, "no reset within {limit} frames");
        }
        assert_eq!(field.stars()[0].depth, 100.0);
    }

    #[test]
    fn every_star_resets_within_one_hundred_unit_frames() {
        let config = StarFieldConfig::default().with_star_count(3).with_speed(1.0);
        let mut field = field(config, 100, 100);
        let mut reset = [false; 3];
        let mut previous: Vec<f32> = field.stars().iter().map(|s| s.depth).collect();

        for _ in 0..100 {
            field.step(None);
            for (i, star) in field.stars().iter().enumerate() {
                if star.depth > previous[i] || star.depth == 100.0 {
                    reset[i] = true;
                }
                previous[i] = star.depth;
            }
        }
        assert_eq!(reset, [true; 3]);
    }

    #[test]
    fn reset_keeps_size_and_color() {
        let config = StarFieldConfig::default().with_star_count(5).with_speed(1.0);
        let mut field = field(config, 50, 50);
        let before: Vec<(f32, Swatch)> =
            field.stars().iter().map(|s| (s.base_size, s.swatch)).collect();
        for _ in 0..120 {
            field.step(None);
        }
        let after: Vec<(f32, Swatch)> =
            field.stars().iter().map(|s| (s.base_size, s.swatch)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn radius_grows_as_star_approaches() {
        let width = 800.0;
        let mut last = -1.0;
        for step in (0..=80).rev() {
            let depth = step as f32 * 10.0;
            let radius = projected_radius(1.5, depth, width) * 1.1;
            assert!(radius > last, "radius {radius} at depth {depth}");
            last = radius;
        }
        assert_eq!(projected_radius(1.5, width, width), 0.0);
        assert_eq!(projected_radius(1.5, 0.0, width), 1.5);
    }

    #[test]
    fn twinkle_factor_stays_in_range() {
        for i in 0..100 {
            let factor = twinkle_factor(i as f32 / 100.0);
            assert!((0.4 - 1e-5..=1.0 + 1e-5).contains(&factor), "{factor}");
        }
        assert!((twinkle_factor(0.25) - 1.0).abs() < 1e-5);
        assert!((twinkle_factor(0.75) - 0.4).abs() < 1e-5);
    }

    #[test]
    fn twinkle_wraps_to_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut star = field(StarFieldConfig::default().with_star_count(1), 10, 10).stars()[0];
        star.depth = 10.0;
        star.twinkle = 0.99;
        star.twinkle_speed = 0.02;
        star.advance(0.0, Vec2::splat(10.0), true, &mut rng);
        assert_eq!(star.twinkle, 0.0);
    }

    #[test]
    fn zero_speed_holds_depth() {
        let config = StarFieldConfig::default().with_star_count(20).with_speed(-3.0);
        let mut field = field(config, 300, 200);
        let before: Vec<f32> = field.stars().iter().map(|s| s.depth).collect();
        for _ in 0..50 {
            assert_eq!(field.step(Some(Duration::from_millis(16))), 0);
        }
        let after: Vec<f32> = field.stars().iter().map(|s| s.depth).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn time_delta_scales_motion() {
        assert_eq!(depth_step(None), 1.0);
        assert_eq!(depth_step(Some(Duration::ZERO)), 1.0);
        assert!((depth_step(Some(Duration::from_millis(20))) - 1.0).abs() < 1e-5);
        assert!((depth_step(Some(Duration::from_secs(10))) - 12.5).abs() < 1e-4);
    }

    #[test]
    fn bounds_hold_across_many_frames() {
        let config = StarFieldConfig::default().with_star_count(200).with_speed(3.0);
        let mut field = field(config, 640, 480);
        let mut batch = ShapeBatch::new();
        for i in 0..500 {
            field.frame(Some(Duration::from_millis(i % 40)), &mut batch);
            assert_in_bounds(&field);
        }
        assert_eq!(field.stars().len(), 200);
    }

    #[test]
    fn empty_field_draws_only_the_background() {
        let mut field = field(StarFieldConfig::default().with_star_count(0), 320, 240);
        let mut batch = ShapeBatch::new();
        field.frame(None, &mut batch);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.count(ShapeKind::Background), 1);
        assert_eq!(batch.size(), Vec2::new(320.0, 240.0));
    }

    #[test]
    fn glow_only_surrounds_visible_stars() {
        let config = StarFieldConfig::default().with_star_count(300);
        let mut field = field(config, 200, 200);
        let mut batch = ShapeBatch::new();
        field.frame(Some(Duration::from_millis(16)), &mut batch);

        for glow in batch.instances().iter().filter(|i| i.kind() == Some(ShapeKind::Glow)) {
            // inner radius is half the star radius
            assert!(glow.radii[0] * 2.0 > GLOW_THRESHOLD);
            assert_eq!(glow.color_b[3], 0.0);
        }
        for flare in batch.instances().iter().filter(|i| i.kind() == Some(ShapeKind::Flare)) {
            assert!(flare.radii[0] * 2.0 > FLARE_THRESHOLD);
        }
        assert!(batch.count(ShapeKind::Glow) <= batch.count(ShapeKind::Disc));
    }

    #[test]
    fn minimal_variant_skips_wash_and_flares() {
        let config = StarFieldConfig::default()
            .with_star_count(300)
            .with_variant(Variant::Minimal);
        let mut field = field(config, 200, 200);
        let mut batch = ShapeBatch::new();
        for _ in 0..20 {
            field.frame(None, &mut batch);
            assert_eq!(batch.count(ShapeKind::Background), 0);
            assert_eq!(batch.count(ShapeKind::Flare), 0);
        }
        let twinkles: Vec<f32> = field.stars().iter().map(|s| s.twinkle).collect();
        field.step(None);
        let after: Vec<f32> = field.stars().iter().map(|s| s.twinkle).collect();
        assert_eq!(twinkles, after);
    }

    #[test]
    fn seeded_fields_are_reproducible() {
        let config = StarFieldConfig::default().with_star_count(16).with_seed(9);
        let a = StarField::new(config.clone(), Viewport::new(100, 100));
        let b = StarField::new(config, Viewport::new(100, 100));
        assert_eq!(a.stars(), b.stars());
    }
}
