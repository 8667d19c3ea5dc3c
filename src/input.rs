use winit::event::WindowEvent;

/// What a window event means for the star field. Only passive window
/// events are consumed; keyboard and pointer input is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    Close,
    Resize,
    Redraw,
    Ignore,
}

pub struct InputHandler;

impl InputHandler {
    pub fn classify(event: &WindowEvent) -> WindowAction {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => WindowAction::Close,
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => WindowAction::Resize,
            WindowEvent::RedrawRequested => WindowAction::Redraw,
            _ => WindowAction::Ignore,
        }
    }
}
