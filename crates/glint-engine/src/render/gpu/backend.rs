use glam::Mat4;
use winit::dpi::PhysicalSize;

use crate::device::{DepthStencilTarget, Gpu, GpuFrame, SurfaceErrorAction};
use crate::paint::Color;
use crate::render::backend::{
    BackendInfo, BlendMode, ClearRequest, DepthState, FrameStatus, FramebufferId,
    GraphicsBackend, Image, MatrixSlot, ScissorRect, ShaderId, ShaderSource, StencilState,
    TextureId, TextureSettings,
};
use crate::render::error::BackendError;
use crate::render::vertex::Vertex;

use super::pipeline::{PipelineCache, PipelineKey, Uniforms};
use super::record::{scissor_rect, viewport_rect, DrawCall, Pass, Recording};
use super::resources::{FramebufferEntry, Slab, TextureEntry};

/// State every later draw is recorded under.
#[derive(Debug, Copy, Clone)]
struct DrawState {
    shader: Option<ShaderId>,
    texture: Option<TextureId>,
    target: Option<FramebufferId>,
    transform: Mat4,
    view: Mat4,
    projection: Mat4,
    color: Color,
    viewport: (u32, u32),
    scissor: Option<ScissorRect>,
    stencil: StencilState,
    color_writes: bool,
    depth: DepthState,
    cull: bool,
    blend: BlendMode,
}

impl DrawState {
    fn new(viewport: (u32, u32)) -> Self {
        Self {
            shader: None,
            texture: None,
            target: None,
            transform: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            color: Color::WHITE,
            viewport,
            scissor: None,
            stencil: StencilState::default(),
            color_writes: true,
            depth: DepthState::default(),
            cull: false,
            blend: BlendMode::default(),
        }
    }
}

/// Growable GPU copies of a frame's vertex, index and uniform data.
struct FrameBuffers {
    vertex: Option<wgpu::Buffer>,
    index: Option<wgpu::Buffer>,
    uniform: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl FrameBuffers {
    const MIN_SIZE: u64 = 64 * 1024;

    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let (uniform, uniform_bind_group) = Self::uniform_buffer(device, layout, Self::MIN_SIZE);
        Self { vertex: None, index: None, uniform, uniform_bind_group }
    }

    fn uniform_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        size: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("glint uniform buffer"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glint uniform bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: Some(Uniforms::min_binding_size()),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn grown_size(required: u64) -> u64 {
        required.next_power_of_two().max(Self::MIN_SIZE)
    }

    fn ensure(
        buffer: &mut Option<wgpu::Buffer>,
        device: &wgpu::Device,
        required: u64,
        usage: wgpu::BufferUsages,
        label: &str,
    ) {
        if buffer.as_ref().is_some_and(|b| b.size() >= required) {
            return;
        }
        *buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: Self::grown_size(required),
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
    }

    /// Uploads the recorded data, growing buffers as needed.
    fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        rec: &Recording,
    ) {
        let vertices: &[u8] = bytemuck::cast_slice(&rec.vertices);
        let indices: &[u8] = bytemuck::cast_slice(&rec.indices);

        if !vertices.is_empty() {
            let usage = wgpu::BufferUsages::VERTEX;
            Self::ensure(&mut self.vertex, device, vertices.len() as u64, usage, "glint vertex buffer");
            if let Some(buffer) = &self.vertex {
                queue.write_buffer(buffer, 0, vertices);
            }
        }

        if !indices.is_empty() {
            let usage = wgpu::BufferUsages::INDEX;
            Self::ensure(&mut self.index, device, indices.len() as u64, usage, "glint index buffer");
            if let Some(buffer) = &self.index {
                queue.write_buffer(buffer, 0, indices);
            }
        }

        if !rec.uniforms.is_empty() {
            let required = rec.uniforms.len() as u64;
            if self.uniform.size() < required {
                let (buffer, bind_group) = Self::uniform_buffer(device, layout, Self::grown_size(required));
                self.uniform = buffer;
                self.uniform_bind_group = bind_group;
            }
            // Uniform blocks are 16-byte sized, so the length stays 4-byte aligned.
            queue.write_buffer(&self.uniform, 0, &rec.uniforms);
        }
    }
}

/// `GraphicsBackend` on wgpu.
///
/// State calls only update a shadow copy; every `draw` is recorded with a
/// snapshot of it. `end_frame` acquires the surface, uploads the frame's
/// geometry and uniforms in one go, then replays the recording as render
/// passes (one per target switch, or per clear issued after drawing).
pub struct WgpuBackend<'w> {
    gpu: Gpu<'w>,

    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    uniform_alignment: u32,

    pipelines: PipelineCache,
    buffers: FrameBuffers,

    shaders: Slab<wgpu::ShaderModule>,
    textures: Slab<TextureEntry>,
    framebuffers: Slab<FramebufferEntry>,

    state: DrawState,
    recording: Recording,
}

impl<'w> WgpuBackend<'w> {
    pub fn new(gpu: Gpu<'w>) -> Self {
        let device = gpu.device();

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glint uniform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: Some(Uniforms::min_binding_size()),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glint texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let uniform_alignment = device.limits().min_uniform_buffer_offset_alignment;
        let pipelines =
            PipelineCache::new(device, &uniform_layout, &texture_layout, gpu.surface_format());
        let buffers = FrameBuffers::new(device, &uniform_layout);

        let size = gpu.size();
        Self {
            gpu,
            uniform_layout,
            texture_layout,
            uniform_alignment,
            pipelines,
            buffers,
            shaders: Slab::default(),
            textures: Slab::default(),
            framebuffers: Slab::default(),
            state: DrawState::new((size.width, size.height)),
            recording: Recording::default(),
        }
    }

    pub fn gpu(&self) -> &Gpu<'w> {
        &self.gpu
    }

    /// Builds every pipeline the recording needs.
    fn ensure_pipelines(&mut self, rec: &Recording) {
        for draw in rec.passes.iter().flat_map(|p| &p.draws) {
            let Some(module) = self.shaders.get(draw.key.shader.0) else { continue };
            self.pipelines.ensure(self.gpu.device(), draw.key, module);
        }
    }

    fn target_views<'a>(
        &'a self,
        target: Option<FramebufferId>,
        surface_view: &'a wgpu::TextureView,
    ) -> Option<(&'a wgpu::TextureView, &'a wgpu::TextureView, (u32, u32), Option<u32>)> {
        match target {
            None => {
                let size = self.gpu.size();
                Some((surface_view, self.gpu.depth_view(), (size.width, size.height), None))
            }
            Some(id) => {
                let fb = self.framebuffers.get(id.0)?;
                let color = self.textures.get(fb.texture)?;
                Some((color.view(), fb.depth.view(), color.size(), Some(fb.texture)))
            }
        }
    }

    /// Replays the recording into the frame's encoder.
    fn encode(&self, rec: &Recording, frame: &mut GpuFrame) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&self.buffers.vertex, &self.buffers.index)
        else {
            // Clears only.
            for pass in &rec.passes {
                self.encode_pass(pass, frame, None);
            }
            return;
        };

        for pass in &rec.passes {
            self.encode_pass(pass, frame, Some((vertex_buffer, index_buffer)));
        }
    }

    fn encode_pass(
        &self,
        pass: &Pass,
        frame: &mut GpuFrame,
        buffers: Option<(&wgpu::Buffer, &wgpu::Buffer)>,
    ) {
        let Some((color_view, depth_view, target_size, target_texture)) =
            self.target_views(pass.target, &frame.view)
        else {
            log::debug!("skipping pass for destroyed framebuffer {:?}", pass.target);
            return;
        };

        let load = |clear: Option<f32>| clear.map_or(wgpu::LoadOp::Load, wgpu::LoadOp::Clear);
        let color_load = pass.clear.color.map_or(wgpu::LoadOp::Load, |c| {
            wgpu::LoadOp::Clear(wgpu::Color {
                r: c.r as f64,
                g: c.g as f64,
                b: c.b as f64,
                a: c.a as f64,
            })
        });
        let stencil_load = pass
            .clear
            .stencil
            .map_or(wgpu::LoadOp::Load, |s| wgpu::LoadOp::Clear(s as u32));

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("glint pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: load(pass.clear.depth),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: stencil_load,
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some((vertex_buffer, index_buffer)) = buffers else { return };
        if pass.draws.is_empty() {
            return;
        }

        rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
        rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        for draw in &pass.draws {
            self.encode_draw(&mut rpass, draw, target_size, target_texture);
        }
    }

    fn encode_draw(
        &self,
        rpass: &mut wgpu::RenderPass<'_>,
        draw: &DrawCall,
        target_size: (u32, u32),
        target_texture: Option<u32>,
    ) {
        if target_texture == Some(draw.texture.0) {
            log::debug!("skipping draw sampling its own render target {:?}", draw.texture);
            return;
        }
        let Some(pipeline) = self.pipelines.get(&draw.key) else {
            log::debug!("skipping draw with destroyed shader {:?}", draw.key.shader);
            return;
        };
        let Some(texture) = self.textures.get(draw.texture.0) else {
            log::debug!("skipping draw with destroyed texture {:?}", draw.texture);
            return;
        };
        let Some([vx, vy, vw, vh]) = viewport_rect(draw.viewport, target_size) else { return };
        let Some([sx, sy, sw, sh]) = scissor_rect(draw.scissor, target_size) else { return };

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &self.buffers.uniform_bind_group, &[draw.uniform_offset]);
        rpass.set_bind_group(1, texture.bind_group(), &[]);
        rpass.set_viewport(vx, vy, vw, vh, 0.0, 1.0);
        rpass.set_scissor_rect(sx, sy, sw, sh);
        rpass.set_stencil_reference(draw.stencil_reference as u32);
        rpass.draw_indexed(draw.indices.clone(), draw.base_vertex, 0..1);
    }
}

impl GraphicsBackend for WgpuBackend<'_> {
    fn describe(&self) -> BackendInfo {
        let info = self.gpu.adapter_info();
        BackendInfo {
            name: info.name,
            vendor: format!("{:#06x} ({})", info.vendor, info.driver),
            api: format!("wgpu/{:?}", info.backend),
        }
    }

    // ── resources ─────────────────────────────────────────────────────────

    fn create_shader(&mut self, source: &ShaderSource) -> Result<ShaderId, BackendError> {
        let (label, code) = match source {
            ShaderSource::Internal => ("glint internal shader", include_str!("shader.wgsl")),
            ShaderSource::Wgsl { label, source } => (label.as_str(), source.as_str()),
        };

        let module = self.gpu.device().create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(code.into()),
        });

        let info = pollster::block_on(module.get_compilation_info());
        for message in &info.messages {
            match message.message_type {
                wgpu::CompilationMessageType::Error => {
                    return Err(BackendError::ShaderCompilation {
                        label: label.to_owned(),
                        message: message.message.clone(),
                    });
                }
                _ => log::warn!("shader `{label}`: {}", message.message),
            }
        }

        let id = ShaderId(self.shaders.insert(module));
        log::debug!("shader `{label}` created as {id:?}");
        Ok(id)
    }

    fn destroy_shader(&mut self, id: ShaderId) {
        self.shaders.remove(id.0);
        self.pipelines.evict_shader(id);
        if self.state.shader == Some(id) {
            self.state.shader = None;
        }
    }

    fn create_texture(
        &mut self,
        image: &Image,
        settings: TextureSettings,
    ) -> Result<TextureId, BackendError> {
        let entry = TextureEntry::from_image(
            self.gpu.device(),
            self.gpu.queue(),
            &self.texture_layout,
            image,
            settings,
        )?;
        Ok(TextureId(self.textures.insert(entry)))
    }

    fn apply_texture_settings(
        &mut self,
        id: TextureId,
        settings: TextureSettings,
    ) -> Result<(), BackendError> {
        let entry = self.textures.get_mut(id.0).ok_or(BackendError::UnknownTexture(id))?;
        entry.apply_settings(self.gpu.device(), &self.texture_layout, settings);
        Ok(())
    }

    fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(id.0).map(TextureEntry::size)
    }

    fn destroy_texture(&mut self, id: TextureId) {
        self.textures.remove(id.0);
    }

    fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<FramebufferId, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::ZeroSize("framebuffer"));
        }

        let device = self.gpu.device();
        let color = TextureEntry::render_target(
            device,
            &self.texture_layout,
            self.gpu.surface_format(),
            width,
            height,
        );
        let depth = DepthStencilTarget::new(device, width, height, "glint framebuffer depth");

        let texture = self.textures.insert(color);
        let id = FramebufferId(self.framebuffers.insert(FramebufferEntry { texture, depth }));
        log::debug!("framebuffer {id:?} created ({width}x{height})");
        Ok(id)
    }

    fn framebuffer_texture(&self, id: FramebufferId) -> Option<TextureId> {
        self.framebuffers.get(id.0).map(|fb| TextureId(fb.texture))
    }

    fn destroy_framebuffer(&mut self, id: FramebufferId) {
        if let Some(fb) = self.framebuffers.remove(id.0) {
            self.textures.remove(fb.texture);
        }
    }

    // ── state ─────────────────────────────────────────────────────────────

    fn use_shader(&mut self, id: ShaderId) {
        self.state.shader = Some(id);
    }

    fn set_matrix(&mut self, slot: MatrixSlot, matrix: Mat4) {
        match slot {
            MatrixSlot::Transform => self.state.transform = matrix,
            MatrixSlot::View => self.state.view = matrix,
            MatrixSlot::Projection => self.state.projection = matrix,
        }
    }

    fn set_color(&mut self, color: Color) {
        self.state.color = color;
    }

    fn bind_texture(&mut self, id: TextureId) {
        self.state.texture = Some(id);
    }

    fn bind_framebuffer(&mut self, id: Option<FramebufferId>) {
        self.state.target = id;
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.state.viewport = (width, height);
    }

    fn set_scissor(&mut self, rect: Option<ScissorRect>) {
        self.state.scissor = rect;
    }

    fn set_stencil(&mut self, state: StencilState) {
        self.state.stencil = state;
    }

    fn set_color_writes(&mut self, enabled: bool) {
        self.state.color_writes = enabled;
    }

    fn set_depth(&mut self, state: DepthState) {
        self.state.depth = state;
    }

    fn set_cull(&mut self, enabled: bool) {
        self.state.cull = enabled;
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    // ── commands ──────────────────────────────────────────────────────────

    fn clear(&mut self, request: ClearRequest) {
        self.recording.clear(self.state.target, request);
    }

    fn draw(&mut self, vertices: &[Vertex], indices: &[u32]) {
        if vertices.is_empty() || indices.is_empty() {
            return;
        }
        let (Some(shader), Some(texture)) = (self.state.shader, self.state.texture) else {
            log::warn!("draw without a bound shader and texture ignored");
            return;
        };

        let s = self.state;
        let key = PipelineKey::new(shader, s.blend, s.depth, s.stencil, s.color_writes, s.cull);
        let uniforms = Uniforms::new(s.transform, s.view, s.projection, s.color);

        let uniform_offset = self.recording.push_uniforms(uniforms, self.uniform_alignment);
        let (base_vertex, indices) = self.recording.push_geometry(vertices, indices);

        self.recording.pass_for(s.target).draws.push(DrawCall {
            key,
            stencil_reference: s.stencil.reference,
            texture,
            uniform_offset,
            viewport: s.viewport,
            scissor: s.scissor,
            indices,
            base_vertex,
        });
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        self.gpu.resize(PhysicalSize::new(width, height));
    }

    fn begin_frame(&mut self) {
        if !self.recording.is_empty() {
            log::trace!("{} passes recorded before the frame began", self.recording.passes.len());
        }
    }

    fn end_frame(&mut self) -> FrameStatus {
        let rec = std::mem::take(&mut self.recording);

        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return FrameStatus::Skipped;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => FrameStatus::Fatal,
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        FrameStatus::Skipped
                    }
                };
            }
        };

        self.buffers.upload(self.gpu.device(), self.gpu.queue(), &self.uniform_layout, &rec);
        self.ensure_pipelines(&rec);
        self.encode(&rec, &mut frame);
        self.gpu.submit(frame);

        log::trace!(
            "frame presented: {} passes, {} vertices, {} pipelines cached",
            rec.passes.len(),
            rec.vertices.len(),
            self.pipelines.len()
        );
        FrameStatus::Presented
    }
}
