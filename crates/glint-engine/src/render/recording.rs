//! Headless backend that records every call.
//!
//! Drives the renderer without a GPU: tests and tools inspect the command log
//! to check state ordering and emitted geometry.

use std::collections::HashMap;

use glam::Mat4;

use crate::paint::Color;

use super::backend::{
    BackendInfo, BlendMode, ClearRequest, DepthState, FrameStatus, FramebufferId,
    GraphicsBackend, Image, MatrixSlot, ScissorRect, ShaderId, ShaderSource, StencilState,
    TextureId, TextureSettings,
};
use super::error::BackendError;
use super::vertex::Vertex;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateShader(ShaderId),
    DestroyShader(ShaderId),
    CreateTexture { id: TextureId, width: u32, height: u32, settings: TextureSettings },
    ApplyTextureSettings(TextureId, TextureSettings),
    DestroyTexture(TextureId),
    CreateFramebuffer { id: FramebufferId, texture: TextureId, width: u32, height: u32 },
    DestroyFramebuffer(FramebufferId),
    UseShader(ShaderId),
    SetMatrix(MatrixSlot, Mat4),
    SetColor(Color),
    BindTexture(TextureId),
    BindFramebuffer(Option<FramebufferId>),
    SetViewport { width: u32, height: u32 },
    SetScissor(Option<ScissorRect>),
    SetStencil(StencilState),
    SetColorWrites(bool),
    SetDepth(DepthState),
    SetCull(bool),
    SetBlend(BlendMode),
    Clear(ClearRequest),
    Draw { vertices: Vec<Vertex>, indices: Vec<u32> },
    ResizeSurface { width: u32, height: u32 },
    BeginFrame,
    EndFrame,
}

#[derive(Debug, Clone)]
struct FramebufferEntry {
    texture: TextureId,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<Command>,
    next_id: u32,
    shaders: Vec<ShaderId>,
    textures: HashMap<TextureId, (u32, u32)>,
    framebuffers: HashMap<FramebufferId, FramebufferEntry>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drains the log, keeping resource tables.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn draw_calls(&self) -> impl Iterator<Item = (&[Vertex], &[u32])> {
        self.commands.iter().filter_map(|c| match c {
            Command::Draw { vertices, indices } => Some((vertices.as_slice(), indices.as_slice())),
            _ => None,
        })
    }

    pub fn draw_count(&self) -> usize {
        self.draw_calls().count()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl GraphicsBackend for RecordingBackend {
    fn describe(&self) -> BackendInfo {
        BackendInfo {
            name: "recording".into(),
            vendor: "glint".into(),
            api: "none".into(),
        }
    }

    fn create_shader(&mut self, _source: &ShaderSource) -> Result<ShaderId, BackendError> {
        let id = ShaderId(self.alloc());
        self.shaders.push(id);
        self.commands.push(Command::CreateShader(id));
        Ok(id)
    }

    fn destroy_shader(&mut self, id: ShaderId) {
        self.shaders.retain(|s| *s != id);
        self.commands.push(Command::DestroyShader(id));
    }

    fn create_texture(
        &mut self,
        image: &Image,
        settings: TextureSettings,
    ) -> Result<TextureId, BackendError> {
        image.validate()?;
        let id = TextureId(self.alloc());
        self.textures.insert(id, (image.width, image.height));
        self.commands.push(Command::CreateTexture {
            id,
            width: image.width,
            height: image.height,
            settings,
        });
        Ok(id)
    }

    fn apply_texture_settings(
        &mut self,
        id: TextureId,
        settings: TextureSettings,
    ) -> Result<(), BackendError> {
        if !self.textures.contains_key(&id) {
            return Err(BackendError::UnknownTexture(id));
        }
        self.commands.push(Command::ApplyTextureSettings(id, settings));
        Ok(())
    }

    fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&id).copied()
    }

    fn destroy_texture(&mut self, id: TextureId) {
        self.textures.remove(&id);
        self.commands.push(Command::DestroyTexture(id));
    }

    fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<FramebufferId, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::ZeroSize("framebuffer"));
        }
        let texture = TextureId(self.alloc());
        self.textures.insert(texture, (width, height));
        let id = FramebufferId(self.alloc());
        self.framebuffers.insert(id, FramebufferEntry { texture });
        self.commands.push(Command::CreateFramebuffer { id, texture, width, height });
        Ok(id)
    }

    fn framebuffer_texture(&self, id: FramebufferId) -> Option<TextureId> {
        self.framebuffers.get(&id).map(|fb| fb.texture)
    }

    fn destroy_framebuffer(&mut self, id: FramebufferId) {
        if let Some(fb) = self.framebuffers.remove(&id) {
            self.textures.remove(&fb.texture);
        }
        self.commands.push(Command::DestroyFramebuffer(id));
    }

    fn use_shader(&mut self, id: ShaderId) {
        self.commands.push(Command::UseShader(id));
    }

    fn set_matrix(&mut self, slot: MatrixSlot, matrix: Mat4) {
        self.commands.push(Command::SetMatrix(slot, matrix));
    }

    fn set_color(&mut self, color: Color) {
        self.commands.push(Command::SetColor(color));
    }

    fn bind_texture(&mut self, id: TextureId) {
        self.commands.push(Command::BindTexture(id));
    }

    fn bind_framebuffer(&mut self, id: Option<FramebufferId>) {
        self.commands.push(Command::BindFramebuffer(id));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.commands.push(Command::SetViewport { width, height });
    }

    fn set_scissor(&mut self, rect: Option<ScissorRect>) {
        self.commands.push(Command::SetScissor(rect));
    }

    fn set_stencil(&mut self, state: StencilState) {
        self.commands.push(Command::SetStencil(state));
    }

    fn set_color_writes(&mut self, enabled: bool) {
        self.commands.push(Command::SetColorWrites(enabled));
    }

    fn set_depth(&mut self, state: DepthState) {
        self.commands.push(Command::SetDepth(state));
    }

    fn set_cull(&mut self, enabled: bool) {
        self.commands.push(Command::SetCull(enabled));
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.commands.push(Command::SetBlend(mode));
    }

    fn clear(&mut self, request: ClearRequest) {
        self.commands.push(Command::Clear(request));
    }

    fn draw(&mut self, vertices: &[Vertex], indices: &[u32]) {
        self.commands.push(Command::Draw {
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
        });
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        self.commands.push(Command::ResizeSurface { width, height });
    }

    fn begin_frame(&mut self) {
        self.commands.push(Command::BeginFrame);
    }

    fn end_frame(&mut self) -> FrameStatus {
        self.commands.push(Command::EndFrame);
        FrameStatus::Presented
    }
}
