//! wgpu implementation of the graphics backend.

mod backend;
mod pipeline;
mod record;
mod resources;

pub use backend::WgpuBackend;
