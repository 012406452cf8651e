//! Application contract driven by [`crate::window::Runtime`].
//!
//! An [`App`] sees the renderer at start-up and shutdown, raw window events,
//! and a [`FrameCtx`] bundling renderer, input and clock once per frame.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};