//! Mount / frame / resize / unmount plumbing between a host environment and
//! the star field.
//!
//! The host owns the event loop. It hands out a [`FrameHandle`] for every
//! frame it schedules and a [`ListenerId`] for every resize subscription;
//! the component gives both back on unmount. A frame callback is only
//! honoured if its handle is the one currently pending, so a callback that
//! was already queued when the component unmounted draws nothing.

use std::time::Duration;

use log::{debug, info, warn};

use crate::canvas::ShapeBatch;
use crate::config::StarFieldConfig;
use crate::starfield::StarField;
use crate::types::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// What the component needs from its environment.
pub trait Host {
    fn viewport(&self) -> Viewport;

    /// Monotonic time since some fixed origin.
    fn now(&self) -> Duration;

    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);

    fn add_resize_listener(&mut self) -> ListenerId;

    fn remove_resize_listener(&mut self, id: ListenerId);
}

/// Something a finished frame can be presented on.
pub trait DrawSurface {
    fn resize(&mut self, viewport: Viewport);

    /// Shows the batch. Failures are the surface's to report; they never
    /// reach the frame loop.
    fn present(&mut self, batch: &ShapeBatch);
}

struct Mounted<S> {
    field: StarField,
    surface: S,
    batch: ShapeBatch,
    resize_listener: ListenerId,
    pending_frame: Option<FrameHandle>,
    last_frame: Option<Duration>,
}

enum State<S> {
    Unmounted,
    /// Mounted without a usable surface: nothing is registered or drawn.
    Inert,
    Mounted(Box<Mounted<S>>),
}

/// The star field background as a mountable component.
pub struct StarFieldComponent<S> {
    config: StarFieldConfig,
    state: State<S>,
}

impl<S: DrawSurface> StarFieldComponent<S> {
    pub fn new(config: StarFieldConfig) -> Self {
        Self {
            config,
            state: State::Unmounted,
        }
    }

    /// Sizes the surface, seeds the field, subscribes to resizes and
    /// schedules the first frame. A missing surface leaves the component
    /// inert. Mounting twice tears the previous mount down first.
    pub fn mount<H: Host>(&mut self, host: &mut H, surface: Option<S>) {
        self.unmount(host);

        let Some(mut surface) = surface else {
            warn!("no drawing surface available, star field disabled");
            self.state = State::Inert;
            return;
        };

        let viewport = host.viewport();
        surface.resize(viewport);
        let field = StarField::new(self.config.clone(), viewport);
        let resize_listener = host.add_resize_listener();
        let pending_frame = Some(host.request_frame());

        info!(
            "✨ star field mounted at {}x{} with {} stars",
            viewport.width,
            viewport.height,
            field.stars().len()
        );

        self.state = State::Mounted(Box::new(Mounted {
            field,
            surface,
            batch: ShapeBatch::new(),
            resize_listener,
            pending_frame,
            last_frame: None,
        }));
    }

    /// Releases the resize listener and the pending frame. Safe to call in
    /// any state, any number of times.
    pub fn unmount<H: Host>(&mut self, host: &mut H) {
        match std::mem::replace(&mut self.state, State::Unmounted) {
            State::Mounted(mounted) => {
                host.remove_resize_listener(mounted.resize_listener);
                if let Some(handle) = mounted.pending_frame {
                    host.cancel_frame(handle);
                }
                info!("star field unmounted");
            }
            State::Inert => debug!("inert star field unmounted"),
            State::Unmounted => {}
        }
    }

    /// Resize notification from the host: resize the surface and re-seed.
    pub fn on_resize<H: Host>(&mut self, host: &mut H) {
        if let State::Mounted(mounted) = &mut self.state {
            let viewport = host.viewport();
            mounted.surface.resize(viewport);
            mounted.field.reseed(viewport);
        }
    }

    /// Frame callback from the host. Draws one frame and schedules the next
    /// if `handle` is the frame this component is waiting on.
    pub fn on_frame<H: Host>(&mut self, host: &mut H, handle: FrameHandle) -> bool {
        let State::Mounted(mounted) = &mut self.state else {
            return false;
        };
        if mounted.pending_frame != Some(handle) {
            debug!("ignoring stale frame {:?}", handle);
            return false;
        }

        let now = host.now();
        let elapsed = mounted.last_frame.map(|last| now.saturating_sub(last));
        mounted.last_frame = Some(now);

        mounted.field.frame(elapsed, &mut mounted.batch);
        mounted.surface.present(&mounted.batch);
        mounted.pending_frame = Some(host.request_frame());
        true
    }

    /// Redraw the host asked for on its own (expose, un-minimise). Shows
    /// the last frame again without advancing the field.
    pub fn on_expose(&mut self) -> bool {
        let State::Mounted(mounted) = &mut self.state else {
            return false;
        };
        if mounted.last_frame.is_none() {
            return false;
        }
        mounted.surface.present(&mounted.batch);
        true
    }

    pub fn is_mounted(&self) -> bool {
        !matches!(self.state, State::Unmounted)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, State::Mounted(_))
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        match &self.state {
            State::Mounted(mounted) => mounted.pending_frame,
            _ => None,
        }
    }

    pub fn field(&self) -> Option<&StarField> {
        match &self.state {
            State::Mounted(mounted) => Some(&mounted.field),
            _ => None,
        }
    }

    pub fn surface(&self) -> Option<&S> {
        match &self.state {
            State::Mounted(mounted) => Some(&mounted.surface),
            _ => None,
        }
    }
}
