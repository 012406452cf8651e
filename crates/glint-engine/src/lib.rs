//! Glint engine crate.
//!
//! Immediate-mode 2D/3D drawing on winit + wgpu: a window runtime, polled
//! input, frame pacing and a batched renderer with stencil clipping.

pub mod core;
pub mod device;
pub mod input;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;
