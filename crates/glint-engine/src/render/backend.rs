//! Graphics backend contract.
//!
//! The renderer drives a GL-style state machine: state is set, then geometry is
//! drawn under that state. Backends translate the calls into whatever the GPU
//! API needs (`WgpuBackend`) or simply record them (`RecordingBackend`).

use glam::Mat4;

use crate::paint::Color;

use super::error::BackendError;
use super::mesh::MeshSink;
use super::vertex::Vertex;

// ── resource ids ──────────────────────────────────────────────────────────

/// Handle to a backend texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Handle to a backend shader program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Handle to an offscreen render target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub u32);

// ── resource descriptions ─────────────────────────────────────────────────

/// Shader program source.
///
/// Custom WGSL must expose `vs_main`/`fs_main` and the same bindings as the
/// built-in shader: group 0 binding 0 is the uniform block
/// (`transform`, `view`, `projection`, `color`), group 1 holds the texture
/// (binding 0) and its sampler (binding 1). Vertex input is
/// `@location(0) position: vec3<f32>`, `@location(1) uv: vec2<f32>`.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderSource {
    /// The renderer's built-in textured, tinted shader.
    Internal,
    Wgsl { label: String, source: String },
}

/// Raw 8-bit image, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// 1 (grey), 2 (grey + alpha), 3 (RGB) or 4 (RGBA).
    pub channels: u8,
    pub data: Vec<u8>,
}

impl Image {
    pub fn rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, channels: 4, data }
    }

    /// Checks dimensions and data length.
    pub fn validate(&self) -> Result<(), BackendError> {
        if self.width == 0 || self.height == 0 {
            return Err(BackendError::ZeroSize("image"));
        }
        let expected = self.width as usize * self.height as usize * self.channels as usize;
        if !(1..=4).contains(&self.channels) || self.data.len() != expected {
            return Err(BackendError::InvalidImage {
                width: self.width,
                height: self.height,
                channels: self.channels,
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Expands the pixel data to tightly packed RGBA8.
    pub fn to_rgba8(&self) -> Result<Vec<u8>, BackendError> {
        self.validate()?;
        let rgba = match self.channels {
            4 => self.data.clone(),
            3 => self.data.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], 0xFF]).collect(),
            2 => self.data.chunks_exact(2).flat_map(|p| [p[0], p[0], p[0], p[1]]).collect(),
            _ => self.data.iter().flat_map(|&g| [g, g, g, 0xFF]).collect(),
        };
        Ok(rgba)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TextureWrap {
    #[default]
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

/// Sampling parameters applied to a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct TextureSettings {
    pub filter: TextureFilter,
    pub wrap: TextureWrap,
}

// ── pipeline state ────────────────────────────────────────────────────────

/// Shader matrix uniform slots.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MatrixSlot {
    Transform,
    View,
    Projection,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum CompareFn {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    #[default]
    Always,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum StencilOp {
    #[default]
    Keep,
    Zero,
    Replace,
    Invert,
    IncrementClamp,
    DecrementClamp,
}

/// Stencil test configuration, GL style.
///
/// A fragment passes when `compare(reference & read_mask, stored & read_mask)`
/// holds. Only bits in `write_mask` are modified by the ops.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StencilState {
    pub enabled: bool,
    pub compare: CompareFn,
    pub reference: u8,
    pub read_mask: u8,
    pub write_mask: u8,
    pub fail_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub pass_op: StencilOp,
}

impl Default for StencilState {
    fn default() -> Self {
        Self {
            enabled: false,
            compare: CompareFn::Always,
            reference: 0,
            read_mask: 0xFF,
            write_mask: 0xFF,
            fail_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DepthState {
    pub test: bool,
    pub write: bool,
    pub compare: CompareFn,
}

impl Default for DepthState {
    fn default() -> Self {
        Self { test: false, write: true, compare: CompareFn::Less }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Source replaces destination.
    #[default]
    Replace,
    /// `src * src.a + dst * (1 - src.a)` on straight-alpha colors.
    Alpha,
}

/// Scissor rectangle in target pixels, origin bottom-left.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ScissorRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Which buffers of the bound target to clear, and to what.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ClearRequest {
    pub color: Option<Color>,
    pub depth: Option<f32>,
    pub stencil: Option<u8>,
}

/// Outcome of presenting a frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// The frame was dropped; rendering may resume next frame.
    Skipped,
    /// The presentation surface is unusable.
    Fatal,
}

/// Static backend description, logged at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    pub name: String,
    pub vendor: String,
    pub api: String,
}

// ── contract ──────────────────────────────────────────────────────────────

/// GPU state machine driven by `Renderer`.
///
/// State setters take effect for every later `draw` until changed. `draw`
/// receives a self-contained indexed triangle list.
pub trait GraphicsBackend {
    fn describe(&self) -> BackendInfo;

    // Resources.
    fn create_shader(&mut self, source: &ShaderSource) -> Result<ShaderId, BackendError>;
    fn destroy_shader(&mut self, id: ShaderId);

    fn create_texture(
        &mut self,
        image: &Image,
        settings: TextureSettings,
    ) -> Result<TextureId, BackendError>;
    fn apply_texture_settings(
        &mut self,
        id: TextureId,
        settings: TextureSettings,
    ) -> Result<(), BackendError>;
    fn texture_size(&self, id: TextureId) -> Option<(u32, u32)>;
    fn destroy_texture(&mut self, id: TextureId);

    /// Creates an offscreen color + depth/stencil target.
    fn create_framebuffer(&mut self, width: u32, height: u32)
    -> Result<FramebufferId, BackendError>;
    /// Texture holding the framebuffer's color attachment.
    fn framebuffer_texture(&self, id: FramebufferId) -> Option<TextureId>;
    fn destroy_framebuffer(&mut self, id: FramebufferId);

    // State.
    fn use_shader(&mut self, id: ShaderId);
    fn set_matrix(&mut self, slot: MatrixSlot, matrix: Mat4);
    fn set_color(&mut self, color: Color);
    fn bind_texture(&mut self, id: TextureId);
    /// `None` targets the window surface.
    fn bind_framebuffer(&mut self, id: Option<FramebufferId>);
    fn set_viewport(&mut self, width: u32, height: u32);
    fn set_scissor(&mut self, rect: Option<ScissorRect>);
    fn set_stencil(&mut self, state: StencilState);
    fn set_color_writes(&mut self, enabled: bool);
    fn set_depth(&mut self, state: DepthState);
    fn set_cull(&mut self, enabled: bool);
    fn set_blend(&mut self, mode: BlendMode);

    // Commands.
    fn clear(&mut self, request: ClearRequest);
    fn draw(&mut self, vertices: &[Vertex], indices: &[u32]);

    /// Informs the backend of a new window surface size.
    fn resize_surface(&mut self, width: u32, height: u32);
    fn begin_frame(&mut self);
    fn end_frame(&mut self) -> FrameStatus;
}

impl<B: GraphicsBackend + ?Sized> MeshSink for B {
    fn submit(&mut self, vertices: &[Vertex], indices: &[u32]) {
        self.draw(vertices, indices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_expands_to_rgba() {
        let grey = Image { width: 2, height: 1, channels: 1, data: vec![10, 20] };
        assert_eq!(grey.to_rgba8().unwrap(), vec![10, 10, 10, 255, 20, 20, 20, 255]);

        let rgb = Image { width: 1, height: 1, channels: 3, data: vec![1, 2, 3] };
        assert_eq!(rgb.to_rgba8().unwrap(), vec![1, 2, 3, 255]);
    }

    #[test]
    fn image_rejects_short_data() {
        let img = Image::rgba(2, 2, vec![0; 15]);
        assert!(matches!(
            img.validate(),
            Err(BackendError::InvalidImage { expected: 16, actual: 15, .. })
        ));
        assert_eq!(Image::rgba(0, 2, vec![]).validate(), Err(BackendError::ZeroSize("image")));
    }
}
