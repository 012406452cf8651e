//! wgpu context for the window surface.
//!
//! [`Gpu`] owns the device, queue and configured surface together with a
//! depth/stencil attachment kept at the surface size. The render backend
//! borrows it to acquire a [`GpuFrame`] per presented frame.

mod depth;
mod gpu;
mod init;
mod surface;

pub use depth::{DepthStencilTarget, DEPTH_STENCIL_FORMAT};
pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
