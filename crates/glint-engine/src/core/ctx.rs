use glam::Vec2;
use winit::dpi::PhysicalPosition;
use winit::window::{CursorIcon, Window, WindowId};

use crate::input::InputState;
use crate::render::WindowRenderer;
use crate::time::FrameClock;

/// Per-window handles and window-level operations.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Drawable size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    /// Moves the OS cursor to `pos`, given in framebuffer pixels (y-up).
    ///
    /// Platforms that cannot warp the cursor log and ignore the request.
    pub fn set_mouse_position(&self, pos: Vec2) {
        let height = self.window.inner_size().height as f32;
        let target = PhysicalPosition::new(pos.x as f64, (height - pos.y) as f64);
        if let Err(err) = self.window.set_cursor_position(target) {
            log::debug!("cannot move cursor: {err}");
        }
    }

    pub fn set_cursor_visible(&self, visible: bool) {
        self.window.set_cursor_visible(visible);
    }

    /// Sets the mouse cursor shape for this window.
    pub fn set_cursor(&self, cursor: CursorIcon) {
        self.window.set_cursor(cursor);
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Input has already been polled and the renderer's frame has begun; the
/// runtime flushes, presents and paces after the callback returns.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by the renderer's backend
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub renderer: &'a mut WindowRenderer<'w>,
    pub input: &'a InputState,
    pub clock: &'a mut FrameClock,
}

impl FrameCtx<'_, '_> {
    /// Seconds the previous frame took, pacing included.
    pub fn dt(&self) -> f32 {
        self.clock.delta_time()
    }

    /// Seconds since the clock started or was last set.
    pub fn time(&self) -> f64 {
        self.clock.elapsed()
    }
}
