//! Drawing primitives the star field paints with, and the batch that turns
//! them into GPU instances.

use glam::Vec2;

use crate::color::Rgba;
use crate::types::{ShapeInstance, ShapeKind};

/// Immediate-mode 2D drawing surface, in device pixels with the origin at
/// the top-left corner.
pub trait Canvas {
    /// Drops everything drawn so far and sets the frame size.
    fn clear(&mut self, width: f32, height: f32);

    /// Composites a top-to-bottom gradient over the whole frame.
    fn fill_vertical_gradient(&mut self, top: Rgba, bottom: Rgba);

    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Rgba);

    /// Radial gradient between `inner` and `outer`, transparent past `outer`.
    fn fill_radial_glow(&mut self, center: Vec2, inner: f32, outer: f32, from: Rgba, to: Rgba);

    /// Line segment whose color fades from `from` at `start` to `to` at `end`.
    fn stroke_flare(&mut self, start: Vec2, end: Vec2, width: f32, from: Rgba, to: Rgba);
}

/// Records a frame as a list of shape instances ready for upload.
#[derive(Debug, Default, Clone)]
pub struct ShapeBatch {
    size: Vec2,
    instances: Vec<ShapeInstance>,
}

impl ShapeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn instances(&self) -> &[ShapeInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn count(&self, kind: ShapeKind) -> usize {
        self.instances
            .iter()
            .filter(|i| i.kind() == Some(kind))
            .count()
    }

    fn push(&mut self, kind: ShapeKind, start: Vec2, end: Vec2, radii: [f32; 2], a: Rgba, b: Rgba) {
        self.instances.push(ShapeInstance {
            start: start.to_array(),
            end: end.to_array(),
            color_a: a.to_array(),
            color_b: b.to_array(),
            radii,
            kind: kind as u32,
            _padding: 0,
        });
    }
}

impl Canvas for ShapeBatch {
    fn clear(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
        self.instances.clear();
    }

    fn fill_vertical_gradient(&mut self, top: Rgba, bottom: Rgba) {
        self.push(ShapeKind::Background, Vec2::ZERO, self.size, [0.0, 0.0], top, bottom);
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
        if radius <= 0.0 || !radius.is_finite() {
            return;
        }
        self.push(ShapeKind::Disc, center, center, [radius, 0.0], color, color);
    }

    fn fill_radial_glow(&mut self, center: Vec2, inner: f32, outer: f32, from: Rgba, to: Rgba) {
        if outer <= 0.0 || !outer.is_finite() {
            return;
        }
        let inner = inner.clamp(0.0, outer);
        self.push(ShapeKind::Glow, center, center, [inner, outer], from, to);
    }

    fn stroke_flare(&mut self, start: Vec2, end: Vec2, width: f32, from: Rgba, to: Rgba) {
        if width <= 0.0 || start.distance_squared(end) <= f32::EPSILON {
            return;
        }
        self.push(ShapeKind::Flare, start, end, [width, 0.0], from, to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba = Rgba::new(255, 255, 255, 1.0);

    #[test]
    fn clear_resets_instances_and_size() {
        let mut batch = ShapeBatch::new();
        batch.clear(10.0, 20.0);
        batch.fill_disc(Vec2::new(1.0, 1.0), 2.0, WHITE);
        assert_eq!(batch.len(), 1);
        batch.clear(30.0, 40.0);
        assert!(batch.is_empty());
        assert_eq!(batch.size(), Vec2::new(30.0, 40.0));
    }

    #[test]
    fn degenerate_shapes_are_skipped() {
        let mut batch = ShapeBatch::new();
        batch.clear(10.0, 10.0);
        batch.fill_disc(Vec2::ZERO, 0.0, WHITE);
        batch.fill_radial_glow(Vec2::ZERO, 0.0, f32::NAN, WHITE, WHITE);
        batch.stroke_flare(Vec2::ONE, Vec2::ONE, 1.0, WHITE, WHITE);
        assert!(batch.is_empty());
    }

    #[test]
    fn glow_inner_radius_is_clamped_to_outer() {
        let mut batch = ShapeBatch::new();
        batch.clear(10.0, 10.0);
        batch.fill_radial_glow(Vec2::ZERO, 5.0, 3.0, WHITE, Rgba::TRANSPARENT);
        let glow = batch.instances()[0];
        assert_eq!(glow.kind(), Some(ShapeKind::Glow));
        assert_eq!(glow.radii, [3.0, 3.0]);
        assert_eq!(glow.color_b[3], 0.0);
    }

    #[test]
    fn background_spans_the_frame() {
        let mut batch = ShapeBatch::new();
        batch.clear(800.0, 600.0);
        batch.fill_vertical_gradient(WHITE, Rgba::TRANSPARENT);
        assert_eq!(batch.count(ShapeKind::Background), 1);
        assert_eq!(batch.instances()[0].end, [800.0, 600.0]);
    }
}
