pub mod app;
pub mod canvas;
pub mod color;
pub mod config;
pub mod gpu;
pub mod input;
pub mod lifecycle;
pub mod renderer;
pub mod starfield;
pub mod types;

pub use canvas::{Canvas, ShapeBatch};
pub use config::{StarFieldConfig, Variant};
pub use lifecycle::{DrawSurface, FrameHandle, Host, ListenerId, StarFieldComponent};
pub use starfield::StarField;
pub use types::Viewport;
