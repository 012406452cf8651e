//! Render pipeline cache keyed by the fixed-function state of a draw.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::paint::Color;
use crate::render::backend::{
    BlendMode, CompareFn, DepthState, ShaderId, StencilOp, StencilState, TextureFilter,
    TextureSettings, TextureWrap,
};
use crate::render::vertex::Vertex;

use crate::device::DEPTH_STENCIL_FORMAT;

// ── uniforms ──────────────────────────────────────────────────────────────

/// Per-draw uniform block, mirrored by `Uniforms` in the WGSL interface.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(super) struct Uniforms {
    pub transform: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl Uniforms {
    pub(super) fn new(transform: Mat4, view: Mat4, projection: Mat4, color: Color) -> Self {
        Self {
            transform: transform.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            color: [color.r, color.g, color.b, color.a],
        }
    }

    pub(super) fn min_binding_size() -> std::num::NonZeroU64 {
        std::num::NonZeroU64::new(std::mem::size_of::<Self>() as u64).unwrap_or(std::num::NonZeroU64::MIN)
    }
}

// ── vertex layout ─────────────────────────────────────────────────────────

const VERTEX_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    1 => Float32x2  // uv
];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

// ── state conversion ──────────────────────────────────────────────────────

pub(super) fn compare_fn(f: CompareFn) -> wgpu::CompareFunction {
    match f {
        CompareFn::Never => wgpu::CompareFunction::Never,
        CompareFn::Less => wgpu::CompareFunction::Less,
        CompareFn::Equal => wgpu::CompareFunction::Equal,
        CompareFn::LessEqual => wgpu::CompareFunction::LessEqual,
        CompareFn::Greater => wgpu::CompareFunction::Greater,
        CompareFn::NotEqual => wgpu::CompareFunction::NotEqual,
        CompareFn::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
        CompareFn::Always => wgpu::CompareFunction::Always,
    }
}

pub(super) fn stencil_op(op: StencilOp) -> wgpu::StencilOperation {
    match op {
        StencilOp::Keep => wgpu::StencilOperation::Keep,
        StencilOp::Zero => wgpu::StencilOperation::Zero,
        StencilOp::Replace => wgpu::StencilOperation::Replace,
        StencilOp::Invert => wgpu::StencilOperation::Invert,
        StencilOp::IncrementClamp => wgpu::StencilOperation::IncrementClamp,
        StencilOp::DecrementClamp => wgpu::StencilOperation::DecrementClamp,
    }
}

pub(super) fn blend_state(mode: BlendMode) -> Option<wgpu::BlendState> {
    let alpha = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    match mode {
        BlendMode::Replace => None,
        BlendMode::Alpha => Some(wgpu::BlendState { color: alpha, alpha }),
    }
}

pub(super) fn depth_stencil_state(depth: DepthState, stencil: StencilState) -> wgpu::DepthStencilState {
    // Disabled depth testing also disables depth writes.
    let (depth_compare, depth_write_enabled) = if depth.test {
        (compare_fn(depth.compare), depth.write)
    } else {
        (wgpu::CompareFunction::Always, false)
    };

    let stencil = if stencil.enabled {
        let face = wgpu::StencilFaceState {
            compare: compare_fn(stencil.compare),
            fail_op: stencil_op(stencil.fail_op),
            depth_fail_op: stencil_op(stencil.depth_fail_op),
            pass_op: stencil_op(stencil.pass_op),
        };
        wgpu::StencilState {
            front: face,
            back: face,
            read_mask: stencil.read_mask as u32,
            write_mask: stencil.write_mask as u32,
        }
    } else {
        wgpu::StencilState::default()
    };

    wgpu::DepthStencilState {
        format: DEPTH_STENCIL_FORMAT,
        depth_write_enabled,
        depth_compare,
        stencil,
        bias: wgpu::DepthBiasState::default(),
    }
}

pub(super) fn sampler_descriptor(settings: TextureSettings) -> wgpu::SamplerDescriptor<'static> {
    let filter = match settings.filter {
        TextureFilter::Nearest => wgpu::FilterMode::Nearest,
        TextureFilter::Linear => wgpu::FilterMode::Linear,
    };
    let address = match settings.wrap {
        TextureWrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        TextureWrap::Repeat => wgpu::AddressMode::Repeat,
        TextureWrap::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
    };

    wgpu::SamplerDescriptor {
        label: Some("glint sampler"),
        address_mode_u: address,
        address_mode_v: address,
        address_mode_w: address,
        mag_filter: filter,
        min_filter: filter,
        ..Default::default()
    }
}

// ── cache ─────────────────────────────────────────────────────────────────

/// Everything a draw needs baked into its pipeline.
///
/// The stencil reference is dynamic pass state and is excluded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(super) struct PipelineKey {
    pub shader: ShaderId,
    pub blend: BlendMode,
    pub depth: DepthState,
    pub stencil: StencilState,
    pub color_writes: bool,
    pub cull: bool,
}

impl PipelineKey {
    pub(super) fn new(
        shader: ShaderId,
        blend: BlendMode,
        depth: DepthState,
        stencil: StencilState,
        color_writes: bool,
        cull: bool,
    ) -> Self {
        let stencil = if stencil.enabled {
            StencilState { reference: 0, ..stencil }
        } else {
            StencilState::default()
        };
        Self { shader, blend, depth, stencil, color_writes, cull }
    }
}

pub(super) struct PipelineCache {
    layout: wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub(super) fn new(
        device: &wgpu::Device,
        uniform_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("glint pipeline layout"),
            bind_group_layouts: &[uniform_layout, texture_layout],
            immediate_size: 0,
        });
        Self { layout, format, pipelines: HashMap::new() }
    }

    pub(super) fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    pub(super) fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Builds the pipeline for `key` unless it is cached.
    pub(super) fn ensure(&mut self, device: &wgpu::Device, key: PipelineKey, module: &wgpu::ShaderModule) {
        if self.pipelines.contains_key(&key) {
            return;
        }

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("glint pipeline"),
            layout: Some(&self.layout),

            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: blend_state(key.blend),
                    write_mask: if key.color_writes {
                        wgpu::ColorWrites::ALL
                    } else {
                        wgpu::ColorWrites::empty()
                    },
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: key.cull.then_some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(depth_stencil_state(key.depth, key.stencil)),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        log::debug!("pipeline created ({} cached): {key:?}", self.pipelines.len() + 1);
        self.pipelines.insert(key, pipeline);
    }

    /// Drops every pipeline built from `shader`.
    pub(super) fn evict_shader(&mut self, shader: ShaderId) {
        self.pipelines.retain(|key, _| key.shader != shader);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_match_wgsl_layout() {
        // 3 x mat4x4<f32> + vec4<f32>
        assert_eq!(std::mem::size_of::<Uniforms>(), 208);
        assert_eq!(Uniforms::min_binding_size().get(), 208);
    }

    #[test]
    fn key_ignores_stencil_reference() {
        let stencil = StencilState { enabled: true, compare: CompareFn::Always, ..Default::default() };
        let a = PipelineKey::new(ShaderId(1), BlendMode::Alpha, DepthState::default(), stencil, true, false);
        let b = PipelineKey::new(
            ShaderId(1),
            BlendMode::Alpha,
            DepthState::default(),
            StencilState { reference: 1, ..stencil },
            true,
            false,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn key_collapses_disabled_stencil() {
        let disabled = StencilState { write_mask: 1, compare: CompareFn::Equal, ..Default::default() };
        let key = PipelineKey::new(ShaderId(1), BlendMode::Alpha, DepthState::default(), disabled, true, false);
        assert_eq!(key.stencil, StencilState::default());
    }

    #[test]
    fn disabled_depth_test_never_writes() {
        let state = depth_stencil_state(
            DepthState { test: false, write: true, compare: CompareFn::Less },
            StencilState::default(),
        );
        assert!(!state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Always);
    }

    #[test]
    fn enabled_stencil_keeps_masks() {
        let state = depth_stencil_state(
            DepthState::default(),
            StencilState {
                enabled: true,
                compare: CompareFn::NotEqual,
                reference: 1,
                read_mask: 1,
                write_mask: 0,
                ..Default::default()
            },
        );
        assert_eq!(state.stencil.read_mask, 1);
        assert_eq!(state.stencil.write_mask, 0);
        assert_eq!(state.stencil.front.compare, wgpu::CompareFunction::NotEqual);
    }

    #[test]
    fn replace_blend_has_no_blend_state() {
        assert!(blend_state(BlendMode::Replace).is_none());
        let alpha = blend_state(BlendMode::Alpha).unwrap();
        assert_eq!(alpha.color.src_factor, wgpu::BlendFactor::SrcAlpha);
    }
}
