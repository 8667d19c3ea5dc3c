use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::color::Swatch;

// Unit quad corner, expanded per shape in the vertex shader
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub corner: [f32; 2],
}

impl Vertex {
    pub const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex { corner: [-1.0, -1.0] },
    Vertex { corner: [ 1.0, -1.0] },
    Vertex { corner: [ 1.0,  1.0] },
    Vertex { corner: [-1.0,  1.0] },
];
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub resolution: [f32; 2],
    pub _padding: [f32; 2],
}

/// Discriminant read by the shader; keep in sync with `star.wgsl`.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Background = 0,
    Disc = 1,
    Glow = 2,
    Flare = 3,
}

// GPU-side instance data for one shape
//   Background: color_a top, color_b bottom
//   Disc:       start = center, radii.x = radius
//   Glow:       start = center, radii = (inner, outer), color_a -> color_b outward
//   Flare:      start -> end, radii.x = line width, color_a -> color_b along the line
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ShapeInstance {
    pub start: [f32; 2],
    pub end: [f32; 2],
    pub color_a: [f32; 4],
    pub color_b: [f32; 4],
    pub radii: [f32; 2],
    pub kind: u32,
    pub _padding: u32,
}

impl ShapeInstance {
    pub const ATTRIBS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        1 => Float32x2, // start
        2 => Float32x2, // end
        3 => Float32x4, // color_a
        4 => Float32x4, // color_b
        5 => Float32x2, // radii
        6 => Uint32,    // kind
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShapeInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    pub fn kind(&self) -> Option<ShapeKind> {
        match self.kind {
            0 => Some(ShapeKind::Background),
            1 => Some(ShapeKind::Disc),
            2 => Some(ShapeKind::Glow),
            3 => Some(ShapeKind::Flare),
            _ => None,
        }
    }
}

// CPU-side star state
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Star {
    pub position: Vec2,
    pub depth: f32,
    pub base_size: f32,
    pub swatch: Swatch,
    pub twinkle: f32,
    pub twinkle_speed: f32,
}

/// Viewport size in physical pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Minimised windows report zero sizes; the field needs at least one pixel.
    pub fn clamped(self) -> Self {
        Self::new(self.width.max(1), self.height.max(1))
    }

    pub fn size(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}
