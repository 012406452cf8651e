use glam::{Mat4, Quat, Vec3};

use crate::coords::Rect;
use crate::paint::Color;

use super::backend::{
    BlendMode, ClearRequest, CompareFn, DepthState, FrameStatus, FramebufferId, GraphicsBackend,
    Image, MatrixSlot, ScissorRect, ShaderId, ShaderSource, StencilState, TextureFilter,
    TextureId, TextureSettings,
};
use super::error::BackendError;
use super::mesh::{DEFAULT_MAX_INDICES, DEFAULT_MAX_VERTICES, MeshOutput};
use super::projection::{self, FramebufferSize};

/// Renderer construction parameters.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Batch capacity in vertices.
    pub max_vertices: usize,
    /// Batch capacity in indices.
    pub max_indices: usize,
    /// Upper bound for adaptive circle tessellation (`edge_count`).
    pub max_circle_edges: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_vertices: DEFAULT_MAX_VERTICES,
            max_indices: DEFAULT_MAX_INDICES,
            max_circle_edges: 512,
        }
    }
}

/// Immediate-mode renderer.
///
/// Owns the geometry batch and the backend together, so every state change
/// can flush geometry queued under the previous state before applying the new
/// one. Setters are no-ops when the value does not change.
///
/// Coordinates: framebuffer pixels, y-up, origin bottom-left. The default
/// coordinate system maps world `(0, 0)` to the layout rect origin.
pub struct Renderer<B: GraphicsBackend> {
    pub(super) backend: B,
    pub(super) mesh: MeshOutput,
    config: RendererConfig,

    internal_shader: ShaderId,
    white_texture: TextureId,
    released: bool,

    shader: ShaderId,
    texture: TextureId,
    framebuffer: Option<FramebufferId>,

    transform: Mat4,
    view: Mat4,
    projection: Mat4,
    color: Color,

    window_size: (u32, u32),
    framebuffer_size: (u32, u32),
    layout: Rect,

    pub(super) stencil: StencilState,
    pub(super) clear_stencil: u8,
    pub(super) color_writes: bool,
    depth: DepthState,
    cull: bool,
    scissor: Option<ScissorRect>,
}

impl<B: GraphicsBackend> Renderer<B> {
    /// Creates the renderer and puts the backend into its initial state.
    ///
    /// Initial state: built-in shader, alpha blending, stencil test
    /// `Equal 0`, depth test on, culling off, 1x1 white texture bound, full
    /// window layout.
    pub fn new(
        mut backend: B,
        config: RendererConfig,
        window_width: u32,
        window_height: u32,
    ) -> Result<Self, BackendError> {
        let internal_shader = backend.create_shader(&ShaderSource::Internal)?;
        let white_texture = backend.create_texture(
            &Image::rgba(1, 1, vec![0xFF; 4]),
            TextureSettings { filter: TextureFilter::Nearest, ..Default::default() },
        )?;

        let info = backend.describe();
        log::info!(
            "render context initialized: {} / {} ({})",
            info.vendor,
            info.name,
            info.api
        );

        let stencil = StencilState {
            enabled: true,
            compare: CompareFn::Equal,
            reference: 0,
            read_mask: 0xFF,
            ..StencilState::default()
        };
        let depth = DepthState { test: true, ..DepthState::default() };

        let mut renderer = Self {
            mesh: MeshOutput::new(config.max_vertices, config.max_indices),
            backend,
            config,
            internal_shader,
            white_texture,
            released: false,
            shader: internal_shader,
            texture: white_texture,
            framebuffer: None,
            transform: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            color: Color::WHITE,
            window_size: (window_width, window_height),
            framebuffer_size: (window_width, window_height),
            layout: Rect::new(0.0, 0.0, window_width as f32, window_height as f32),
            stencil,
            clear_stencil: 0,
            color_writes: true,
            depth,
            cull: false,
            scissor: None,
        };

        renderer.push_shader();
        renderer.backend.set_color(renderer.color);
        renderer.backend.set_blend(BlendMode::Alpha);
        renderer.backend.set_stencil(stencil);
        renderer.backend.set_depth(depth);
        renderer.backend.set_color_writes(true);
        renderer.backend.set_cull(false);
        renderer.bind_texture_directly(None);
        renderer.use_framebuffer_directly(None);

        Ok(renderer)
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable backend access. Batched geometry is flushed first.
    pub fn backend_mut(&mut self) -> &mut B {
        self.flush();
        &mut self.backend
    }

    /// Submits batched geometry under the current state.
    pub fn flush(&mut self) {
        self.mesh.flush(&mut self.backend);
    }

    /// Number of batch flushes that reached the backend so far.
    pub fn flush_count(&self) -> u64 {
        self.mesh.generation()
    }

    // ── frame lifecycle ──────────────────────────────────────────────────

    /// Resets per-frame state: identity transform, white texture, default
    /// target and full-framebuffer layout.
    pub fn begin_frame(&mut self) {
        self.backend.begin_frame();

        self.set_transform(Mat4::IDENTITY);
        self.bind_texture_directly(None);
        self.use_framebuffer_directly(None);
        self.set_layout_rect(self.default_layout_rect(), false);
    }

    /// Flushes, returns to the default target and presents.
    pub fn end_frame(&mut self) -> FrameStatus {
        self.flush();
        self.use_framebuffer(None);
        self.backend.end_frame()
    }

    /// Releases the built-in shader and white texture.
    ///
    /// Called automatically on drop; calling it twice is harmless.
    pub fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.flush();
        self.backend.destroy_shader(self.internal_shader);
        self.backend.destroy_texture(self.white_texture);
        self.released = true;
        log::debug!("renderer resources released");
    }

    // ── transform / view / projection ────────────────────────────────────

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn draw_color(&self) -> Color {
        self.color
    }

    pub fn set_transform(&mut self, m: Mat4) {
        if m == self.transform {
            return;
        }
        self.flush();
        self.transform = m;
        self.backend.set_matrix(MatrixSlot::Transform, m);
    }

    pub fn set_view(&mut self, m: Mat4) {
        if m == self.view {
            return;
        }
        self.flush();
        self.view = m;
        self.backend.set_matrix(MatrixSlot::View, m);
    }

    pub fn set_projection(&mut self, m: Mat4) {
        if m == self.projection {
            return;
        }
        self.flush();
        self.projection = m;
        self.backend.set_matrix(MatrixSlot::Projection, m);
    }

    pub fn set_draw_color(&mut self, color: Color) {
        if color == self.color {
            return;
        }
        self.flush();
        self.color = color;
        self.backend.set_color(color);
    }

    /// Pixel-space 2D coordinates with world `(0, 0)` at framebuffer pixel `(x, y)`.
    ///
    /// Also switches the depth test to `LessEqual` so coplanar 2D geometry
    /// draws in submission order.
    pub fn set_view_projection_cartesian_2d(&mut self, x: f32, y: f32, sx: f32, sy: f32) {
        self.flush();

        let (view, projection) = projection::cartesian_2d(x, y, sx, sy, self.fb_size());
        self.set_view(view);
        self.set_projection(projection);
        self.set_depth(DepthState { compare: CompareFn::LessEqual, ..self.depth });
    }

    pub fn set_view_look_at(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        self.set_view(projection::look_at(position, target, up));
    }

    pub fn set_view_orientation(&mut self, position: Vec3, rotation: Quat) {
        self.set_view(projection::orientation(position, rotation));
    }

    /// Perspective projection centred on the layout rect (X mirrored).
    pub fn set_projection_perspective(&mut self, fovy: f32, aspect: f32, near: f32, far: f32) {
        let m = projection::perspective(fovy, aspect, near, far, self.layout, self.fb_size());
        self.set_projection(m);
    }

    /// Orthographic projection centred on the layout rect (X mirrored).
    pub fn set_projection_orthographic(&mut self, width: f32, height: f32, near: f32, far: f32) {
        let m = projection::orthographic(width, height, near, far, self.layout, self.fb_size());
        self.set_projection(m);
    }

    // ── shaders and textures ─────────────────────────────────────────────

    pub fn shader(&self) -> ShaderId {
        self.shader
    }

    pub fn internal_shader(&self) -> ShaderId {
        self.internal_shader
    }

    /// Selects `shader`, or the built-in one for `None`.
    ///
    /// The current transform, view and projection are re-pushed to it.
    pub fn set_shader(&mut self, shader: Option<ShaderId>) {
        let shader = shader.unwrap_or(self.internal_shader);
        if shader == self.shader {
            return;
        }
        self.flush();
        self.shader = shader;
        self.push_shader();
    }

    pub fn create_shader(&mut self, source: &ShaderSource) -> Result<ShaderId, BackendError> {
        self.backend.create_shader(source)
    }

    /// Destroys a custom shader, falling back to the built-in one if it is active.
    pub fn destroy_shader(&mut self, shader: ShaderId) {
        if shader == self.internal_shader {
            log::warn!("refusing to destroy the built-in shader");
            return;
        }
        if shader == self.shader {
            self.set_shader(None);
        }
        self.backend.destroy_shader(shader);
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn white_texture(&self) -> TextureId {
        self.white_texture
    }

    /// Binds `texture`, or the 1x1 white texture for `None`.
    pub fn set_texture(&mut self, texture: Option<TextureId>) {
        if texture.unwrap_or(self.white_texture) == self.texture {
            return;
        }
        self.flush();
        self.bind_texture_directly(texture);
    }

    pub fn create_texture(
        &mut self,
        image: &Image,
        settings: TextureSettings,
    ) -> Result<TextureId, BackendError> {
        self.backend.create_texture(image, settings)
    }

    pub fn apply_texture_settings(
        &mut self,
        texture: TextureId,
        settings: TextureSettings,
    ) -> Result<(), BackendError> {
        self.flush();
        self.backend.apply_texture_settings(texture, settings)
    }

    pub fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.backend.texture_size(texture)
    }

    /// Destroys a texture, rebinding the white texture if it is bound.
    pub fn destroy_texture(&mut self, texture: TextureId) {
        if texture == self.white_texture {
            log::warn!("refusing to destroy the white fallback texture");
            return;
        }
        if texture == self.texture {
            self.set_texture(None);
        }
        self.backend.destroy_texture(texture);
    }

    // ── render target & layout ───────────────────────────────────────────

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.framebuffer_size
    }

    pub fn framebuffer(&self) -> Option<FramebufferId> {
        self.framebuffer
    }

    pub fn layout_rect(&self) -> Rect {
        self.layout
    }

    /// `{0, 0, framebuffer width, framebuffer height}`.
    pub fn default_layout_rect(&self) -> Rect {
        let (w, h) = self.framebuffer_size;
        Rect::new(0.0, 0.0, w as f32, h as f32)
    }

    /// Layout rect width.
    pub fn vw(&self) -> f32 {
        self.layout.width()
    }

    /// Layout rect height.
    pub fn vh(&self) -> f32 {
        self.layout.height()
    }

    /// Makes `rect` the active layout, clipping to it when `clip` is set.
    ///
    /// Always resets the view/projection to Cartesian 2D anchored at the rect
    /// origin.
    pub fn set_layout_rect(&mut self, rect: Rect, clip: bool) {
        self.flush();
        self.layout = rect;

        let scissor = clip.then(|| ScissorRect {
            x: rect.x0 as i32,
            y: rect.y0 as i32,
            width: rect.width().max(0.0) as u32,
            height: rect.height().max(0.0) as u32,
        });
        if scissor != self.scissor {
            self.scissor = scissor;
            self.backend.set_scissor(scissor);
        }

        self.set_view_projection_cartesian_2d(rect.x0, rect.y0, 1.0, 1.0);
    }

    /// Targets `framebuffer`, or the window for `None`.
    ///
    /// The logical framebuffer size follows the target and the layout resets
    /// to cover it.
    pub fn use_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        if framebuffer == self.framebuffer {
            return;
        }
        self.flush();
        self.use_framebuffer_directly(framebuffer);
    }

    pub fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<FramebufferId, BackendError> {
        self.backend.create_framebuffer(width, height)
    }

    /// Color texture of `framebuffer`, usable with `set_texture`.
    pub fn framebuffer_texture(&self, framebuffer: FramebufferId) -> Option<TextureId> {
        self.backend.framebuffer_texture(framebuffer)
    }

    /// Destroys a framebuffer, returning to the window target if it is bound.
    pub fn destroy_framebuffer(&mut self, framebuffer: FramebufferId) {
        if Some(framebuffer) == self.framebuffer {
            self.use_framebuffer(None);
        }
        if let Some(texture) = self.backend.framebuffer_texture(framebuffer) {
            if texture == self.texture {
                self.set_texture(None);
            }
        }
        self.backend.destroy_framebuffer(framebuffer);
    }

    /// Handles a window resize (physical pixels).
    pub fn on_window_resize(&mut self, width: u32, height: u32) {
        self.flush();
        self.window_size = (width, height);
        self.backend.resize_surface(width, height);

        if self.framebuffer.is_none() {
            self.on_framebuffer_resize(width, height);
        }
    }

    // ── fixed-function state ─────────────────────────────────────────────

    pub fn set_backface_culling(&mut self, enabled: bool) {
        if enabled == self.cull {
            return;
        }
        self.flush();
        self.cull = enabled;
        self.backend.set_cull(enabled);
    }

    pub fn backface_culling(&self) -> bool {
        self.cull
    }

    pub fn depth_state(&self) -> DepthState {
        self.depth
    }

    pub fn set_depth(&mut self, depth: DepthState) {
        if depth == self.depth {
            return;
        }
        self.flush();
        self.depth = depth;
        self.backend.set_depth(depth);
    }

    pub fn stencil_state(&self) -> StencilState {
        self.stencil
    }

    /// Clears color, depth and stencil of the current target.
    ///
    /// The stencil write mask is set to 1 first; stencil clears to the value
    /// chosen by the last `start_stencilling` (0 initially).
    pub fn clear_screen(&mut self, color: Color) {
        self.flush();
        self.set_stencil(StencilState { write_mask: 1, ..self.stencil });
        self.backend.clear(ClearRequest {
            color: Some(color),
            depth: Some(1.0),
            stencil: Some(self.clear_stencil),
        });
    }

    // ── internals ────────────────────────────────────────────────────────

    pub(super) fn set_stencil(&mut self, stencil: StencilState) {
        if stencil == self.stencil {
            return;
        }
        self.flush();
        self.stencil = stencil;
        self.backend.set_stencil(stencil);
    }

    pub(super) fn set_color_writes(&mut self, enabled: bool) {
        if enabled == self.color_writes {
            return;
        }
        self.flush();
        self.color_writes = enabled;
        self.backend.set_color_writes(enabled);
    }

    pub(super) fn max_circle_edges(&self) -> u32 {
        self.config.max_circle_edges
    }

    fn fb_size(&self) -> FramebufferSize {
        FramebufferSize::new(self.framebuffer_size.0, self.framebuffer_size.1)
    }

    fn push_shader(&mut self) {
        self.backend.use_shader(self.shader);
        self.backend.set_matrix(MatrixSlot::Transform, self.transform);
        self.backend.set_matrix(MatrixSlot::View, self.view);
        self.backend.set_matrix(MatrixSlot::Projection, self.projection);
    }

    fn bind_texture_directly(&mut self, texture: Option<TextureId>) {
        let texture = texture.unwrap_or(self.white_texture);
        self.texture = texture;
        self.backend.bind_texture(texture);
    }

    fn use_framebuffer_directly(&mut self, framebuffer: Option<FramebufferId>) {
        self.framebuffer = framebuffer;
        self.backend.bind_framebuffer(framebuffer);

        let size = framebuffer
            .and_then(|fb| self.backend.framebuffer_texture(fb))
            .and_then(|tex| self.backend.texture_size(tex));

        let (w, h) = match (framebuffer, size) {
            (Some(fb), None) => {
                log::warn!("framebuffer {fb:?} has no backing texture; using window size");
                self.window_size
            }
            (Some(_), Some(size)) => size,
            (None, _) => self.window_size,
        };
        self.on_framebuffer_resize(w, h);
    }

    fn on_framebuffer_resize(&mut self, width: u32, height: u32) {
        self.framebuffer_size = (width, height);
        self.set_layout_rect(self.default_layout_rect(), false);
        self.backend.set_viewport(width, height);
    }
}

impl<B: GraphicsBackend> Drop for Renderer<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec4};

    use super::*;
    use crate::render::recording::{Command, RecordingBackend};

    fn renderer() -> Renderer<RecordingBackend> {
        let mut r = Renderer::new(RecordingBackend::new(), RendererConfig::default(), 800, 600)
            .expect("recording backend never fails");
        r.backend_mut().take_commands();
        r
    }

    #[test]
    fn init_sets_up_fixed_function_state() {
        let r = Renderer::new(RecordingBackend::new(), RendererConfig::default(), 800, 600)
            .unwrap();
        let cmds = r.backend().commands();

        assert!(cmds.contains(&Command::SetBlend(BlendMode::Alpha)));
        assert!(cmds.contains(&Command::SetCull(false)));
        assert!(cmds.iter().any(|c| matches!(
            c,
            Command::SetStencil(s) if s.enabled && s.compare == CompareFn::Equal && s.reference == 0 && s.read_mask == 0xFF
        )));
        assert!(cmds.iter().any(|c| matches!(
            c,
            Command::CreateTexture { width: 1, height: 1, settings, .. }
                if settings.filter == TextureFilter::Nearest
        )));
        assert_eq!(r.texture(), r.white_texture());
        assert_eq!(r.shader(), r.internal_shader());
        assert!(r.depth_state().test);
    }

    #[test]
    fn same_texture_twice_flushes_once() {
        let mut r = renderer();
        let tex = r.create_texture(&Image::rgba(2, 2, vec![0; 16]), Default::default()).unwrap();

        r.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        r.set_texture(Some(tex));
        r.set_texture(Some(tex));

        let cmds = r.backend().commands();
        assert_eq!(r.backend().draw_count(), 1);
        let binds = cmds.iter().filter(|c| **c == Command::BindTexture(tex)).count();
        assert_eq!(binds, 1);
    }

    #[test]
    fn setters_flush_before_pushing_state() {
        let mut r = renderer();
        r.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        r.set_draw_color(Color::BLACK);

        let cmds = r.backend().commands();
        let draw = cmds.iter().position(|c| matches!(c, Command::Draw { .. })).unwrap();
        let color = cmds.iter().position(|c| *c == Command::SetColor(Color::BLACK)).unwrap();
        assert!(draw < color);
    }

    #[test]
    fn unchanged_transform_is_a_no_op() {
        let mut r = renderer();
        r.set_transform(Mat4::IDENTITY);
        assert!(r.backend().commands().is_empty());
    }

    #[test]
    fn shader_switch_repushes_view_into_view_slot() {
        let mut r = renderer();
        let custom = r
            .create_shader(&ShaderSource::Wgsl { label: "custom".into(), source: String::new() })
            .unwrap();
        let view = r.view();
        let transform = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        r.set_transform(transform);
        r.backend_mut().take_commands();

        r.set_shader(Some(custom));

        let cmds = r.backend().commands();
        assert_eq!(cmds[0], Command::UseShader(custom));
        assert!(cmds.contains(&Command::SetMatrix(MatrixSlot::Transform, transform)));
        assert!(cmds.contains(&Command::SetMatrix(MatrixSlot::View, view)));

        r.backend_mut().take_commands();
        r.set_shader(None);
        assert_eq!(r.backend().commands()[0], Command::UseShader(r.internal_shader()));
    }

    #[test]
    fn clipped_layout_scissors_and_anchors_origin() {
        let mut r = renderer();
        r.set_layout_rect(Rect::new(100.0, 50.0, 300.0, 250.0), true);

        assert!(r.backend().commands().contains(&Command::SetScissor(Some(ScissorRect {
            x: 100,
            y: 50,
            width: 200,
            height: 200,
        }))));

        let clip = r.projection() * r.view() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        // Pixel (100, 50) in an 800x600 framebuffer.
        assert!((clip.x - (100.0 / 400.0 - 1.0)).abs() < 1e-5);
        assert!((clip.y - (50.0 / 300.0 - 1.0)).abs() < 1e-5);
        assert_eq!(r.depth_state().compare, CompareFn::LessEqual);
        assert_eq!(r.vw(), 200.0);
        assert_eq!(r.vh(), 200.0);
    }

    #[test]
    fn full_layout_maps_origin_to_corner() {
        let mut r = renderer();
        r.set_layout_rect(Rect::new(0.0, 0.0, 800.0, 600.0), true);
        let clip = r.projection() * r.view() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(Vec2::new(clip.x, clip.y).abs_diff_eq(Vec2::new(-1.0, -1.0), 1e-6));
    }

    #[test]
    fn framebuffer_switch_resizes_layout() {
        let mut r = renderer();
        let fb = r.create_framebuffer(128, 64).unwrap();

        r.use_framebuffer(Some(fb));
        assert_eq!(r.framebuffer_size(), (128, 64));
        assert_eq!(r.layout_rect(), Rect::new(0.0, 0.0, 128.0, 64.0));
        assert!(r.backend().commands().contains(&Command::SetViewport { width: 128, height: 64 }));

        r.backend_mut().take_commands();
        r.use_framebuffer(Some(fb));
        assert!(r.backend().commands().is_empty());

        r.use_framebuffer(None);
        assert_eq!(r.framebuffer_size(), (800, 600));
    }

    #[test]
    fn window_resize_while_offscreen_keeps_target_size() {
        let mut r = renderer();
        let fb = r.create_framebuffer(32, 32).unwrap();
        r.use_framebuffer(Some(fb));
        r.on_window_resize(1024, 768);
        assert_eq!(r.framebuffer_size(), (32, 32));

        r.use_framebuffer(None);
        assert_eq!(r.framebuffer_size(), (1024, 768));
    }

    #[test]
    fn end_frame_flushes_then_presents() {
        let mut r = renderer();
        r.begin_frame();
        r.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(r.end_frame(), FrameStatus::Presented);

        let cmds = r.backend().commands();
        assert_eq!(cmds.first(), Some(&Command::BeginFrame));
        assert_eq!(cmds.last(), Some(&Command::EndFrame));
        assert_eq!(r.backend().draw_count(), 1);
    }

    #[test]
    fn begin_frame_resets_transform_and_texture() {
        let mut r = renderer();
        let tex = r.create_texture(&Image::rgba(1, 1, vec![0; 4]), Default::default()).unwrap();
        r.set_texture(Some(tex));
        r.set_transform(Mat4::from_scale(Vec3::splat(2.0)));

        r.begin_frame();
        assert_eq!(r.transform(), Mat4::IDENTITY);
        assert_eq!(r.texture(), r.white_texture());
        assert_eq!(r.layout_rect(), r.default_layout_rect());
    }

    #[test]
    fn clear_screen_flushes_and_opens_stencil_bit() {
        let mut r = renderer();
        r.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        r.clear_screen(Color::BLACK);

        let cmds = r.backend().commands();
        let draw = cmds.iter().position(|c| matches!(c, Command::Draw { .. })).unwrap();
        let clear = cmds.iter().position(|c| matches!(c, Command::Clear(_))).unwrap();
        assert!(draw < clear);
        assert_eq!(r.stencil_state().write_mask, 1);
        assert_eq!(
            cmds[clear],
            Command::Clear(ClearRequest {
                color: Some(Color::BLACK),
                depth: Some(1.0),
                stencil: Some(0),
            })
        );
    }

    #[test]
    fn shutdown_releases_builtins_once() {
        let mut r = renderer();
        r.shutdown();
        r.shutdown();
        assert_eq!(r.backend().live_shaders(), 0);
        assert_eq!(r.backend().live_textures(), 0);
    }
}
