use winit::event::WindowEvent;

use crate::render::WindowRenderer;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by `window::Runtime`.
pub trait App {
    /// Called once the window and renderer exist, before the first frame.
    ///
    /// Create textures, shaders and framebuffers here. An error aborts the
    /// runtime and is returned from `Runtime::run`.
    fn on_start(&mut self, renderer: &mut WindowRenderer<'_>) -> anyhow::Result<()> {
        let _ = renderer;
        Ok(())
    }

    /// Called for every window event, after input has seen it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per frame between `begin_frame` and `end_frame`.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called once before the renderer is torn down.
    fn on_exit(&mut self, renderer: &mut WindowRenderer<'_>) {
        let _ = renderer;
    }
}
