use thiserror::Error;

use super::backend::{FramebufferId, ShaderId, TextureId};

/// Rejected geometry input.
///
/// Returned by primitives whose inputs leave the result undefined (zero-length
/// directions, zero subdivisions). Nothing is appended to the batch when a
/// primitive fails.
#[derive(Debug, Error, Copy, Clone, PartialEq)]
pub enum GeometryError {
    #[error("line from ({x}, {y}) has zero length")]
    DegenerateLine { x: f32, y: f32 },

    #[error("outline vertex {index} coincides with the shape centroid")]
    DegenerateOutline { index: usize },

    #[error("edge count must be at least 1")]
    InvalidEdgeCount,
}

/// Backend resource failure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureId),

    #[error("unknown shader {0:?}")]
    UnknownShader(ShaderId),

    #[error("shader `{label}` failed to compile: {message}")]
    ShaderCompilation { label: String, message: String },

    #[error("unknown framebuffer {0:?}")]
    UnknownFramebuffer(FramebufferId),

    #[error("image {width}x{height} with {channels} channels needs {expected} bytes, got {actual}")]
    InvalidImage {
        width: u32,
        height: u32,
        channels: u8,
        expected: usize,
        actual: usize,
    },

    #[error("zero-sized {0}")]
    ZeroSize(&'static str),
}
