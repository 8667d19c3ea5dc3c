use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::error::EventLoopError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::StarFieldConfig;
use crate::gpu::GpuSurface;
use crate::input::{InputHandler, WindowAction};
use crate::lifecycle::{FrameHandle, Host, ListenerId, StarFieldComponent};
use crate::types::Viewport;

/// A winit window acting as the component's host. Frame requests map to
/// `request_redraw`; winit coalesces them into a single `RedrawRequested`.
pub struct WindowHost {
    window: Arc<Window>,
    started: Instant,
    next_id: u64,
    pending_frames: HashSet<FrameHandle>,
    resize_listeners: HashSet<ListenerId>,
}

impl WindowHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            started: Instant::now(),
            next_id: 0,
            pending_frames: HashSet::new(),
            resize_listeners: HashSet::new(),
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Frames that were requested and not cancelled since the last redraw.
    pub fn take_due_frames(&mut self) -> Vec<FrameHandle> {
        self.pending_frames.drain().collect()
    }

    pub fn has_resize_listeners(&self) -> bool {
        !self.resize_listeners.is_empty()
    }
}

impl Host for WindowHost {
    fn viewport(&self) -> Viewport {
        let size = self.window.inner_size();
        Viewport::new(size.width, size.height)
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id());
        self.pending_frames.insert(handle);
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending_frames.remove(&handle);
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id());
        self.resize_listeners.insert(id);
        id
    }

    fn remove_resize_listener(&mut self, id: ListenerId) {
        self.resize_listeners.remove(&id);
    }
}

pub struct StarFieldApp {
    host: Option<WindowHost>,
    component: StarFieldComponent<GpuSurface>,
}

impl StarFieldApp {
    pub fn new(config: StarFieldConfig) -> Self {
        Self {
            host: None,
            component: StarFieldComponent::new(config),
        }
    }

    fn teardown(&mut self) {
        if let Some(host) = self.host.as_mut() {
            self.component.unmount(host);
        }
    }
}

impl ApplicationHandler for StarFieldApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.host.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("Starfield")
            .with_inner_size(LogicalSize::new(1280.0, 800.0));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let surface = match pollster::block_on(GpuSurface::new(window.clone())) {
            Ok(surface) => Some(surface),
            Err(err) => {
                warn!("drawing surface unavailable: {err}");
                None
            }
        };

        let host = self.host.insert(WindowHost::new(window));
        self.component.mount(host, surface);
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        // The surface must not outlive the native window on mobile targets
        self.teardown();
        self.host = None;
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(host) = self.host.as_mut() else {
            return;
        };

        match InputHandler::classify(&event) {
            WindowAction::Close => {
                info!("window closed, stopping 🛑");
                self.component.unmount(host);
                event_loop.exit();
            }
            WindowAction::Resize => {
                if host.has_resize_listeners() {
                    self.component.on_resize(host);
                }
            }
            WindowAction::Redraw => {
                let due = host.take_due_frames();
                if due.is_empty() {
                    self.component.on_expose();
                }
                for handle in due {
                    self.component.on_frame(host, handle);
                }
            }
            WindowAction::Ignore => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

pub fn run(config: StarFieldConfig) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = StarFieldApp::new(config);
    event_loop.run_app(&mut app)
}
