//! wgpu swapchain the star field presents onto.

use std::sync::Arc;

use log::{error, info, warn};
use thiserror::Error;
use winit::window::Window;

use crate::canvas::ShapeBatch;
use crate::lifecycle::DrawSurface;
use crate::renderer::StarRenderer;
use crate::types::Viewport;

/// Reasons a drawing surface could not be acquired.
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("failed to create surface: {0}")]
    Create(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface is not supported by the adapter")]
    Unsupported,
}

pub struct GpuSurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: StarRenderer,
}

impl GpuSurface {
    pub async fn new(window: Arc<Window>) -> Result<Self, SurfaceError> {
        let size = window.inner_size();
        let viewport = Viewport::new(size.width, size.height).clamped();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Star Field Device"),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await?;

        let mut config = surface
            .get_default_config(&adapter, viewport.width, viewport.height)
            .ok_or(SurfaceError::Unsupported)?;

        // Palette colors are sRGB values and blend the way a 2D canvas does,
        // so prefer a non-sRGB target and skip the implicit conversion.
        let caps = surface.get_capabilities(&adapter);
        if let Some(format) = caps.formats.iter().copied().find(|f| !f.is_srgb()) {
            config.format = format;
        }
        surface.configure(&device, &config);

        info!(
            "🖥️  surface ready on {} ({:?}, {}x{})",
            adapter.get_info().name,
            config.format,
            config.width,
            config.height
        );

        let renderer = StarRenderer::new(&device, config.format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            renderer,
        })
    }

    fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

impl DrawSurface for GpuSurface {
    fn resize(&mut self, viewport: Viewport) {
        let viewport = viewport.clamped();
        if viewport.width == self.config.width && viewport.height == self.config.height {
            return;
        }
        self.config.width = viewport.width;
        self.config.height = viewport.height;
        self.reconfigure();
    }

    fn present(&mut self, batch: &ShapeBatch) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost or outdated, reconfiguring");
                self.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("timed out acquiring surface texture, skipping frame");
                return;
            }
            Err(err) => {
                error!("failed to acquire surface texture: {err}");
                return;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Star Field Encoder"),
            });

        self.renderer
            .render(&self.device, &self.queue, &mut encoder, &view, batch);

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}
