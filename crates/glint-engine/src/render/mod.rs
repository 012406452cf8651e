//! Immediate-mode rendering.
//!
//! `Renderer` owns a fixed-capacity geometry batch and a `GraphicsBackend`.
//! Drawing primitives append to the batch; any state change flushes it to the
//! backend first, so geometry always draws under the state it was issued with.
//!
//! Convention:
//! - coordinates are framebuffer pixels, y-up, origin bottom-left
//! - the layout rect anchors the default 2D coordinate system

mod backend;
mod builders;
mod error;
mod gpu;
mod mesh;
mod primitives;
pub mod projection;
mod recording;
mod renderer;
mod stencil;
mod vertex;

pub use backend::{
    BackendInfo, BlendMode, ClearRequest, CompareFn, DepthState, FrameStatus, FramebufferId,
    GraphicsBackend, Image, MatrixSlot, ScissorRect, ShaderId, ShaderSource, StencilOp,
    StencilState, TextureFilter, TextureId, TextureSettings, TextureWrap,
};
pub use builders::{LineStrip, Polygon};
pub use error::{BackendError, GeometryError};
pub use gpu::WgpuBackend;
pub use mesh::{MeshOutput, MeshSink, DEFAULT_MAX_INDICES, DEFAULT_MAX_VERTICES};
pub use primitives::{edge_count, CapType};
pub use recording::{Command, RecordingBackend};
pub use renderer::{Renderer, RendererConfig};
pub use vertex::{vertex, vertex_uv, Vertex};

/// Renderer bound to a window through wgpu.
pub type WindowRenderer<'w> = Renderer<WgpuBackend<'w>>;
