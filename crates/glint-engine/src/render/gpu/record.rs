//! CPU-side frame recording.
//!
//! Draws are snapshotted with the state they were issued under and grouped
//! into passes by render target. Nothing touches the GPU until the frame is
//! encoded.

use std::ops::Range;

use crate::render::backend::{ClearRequest, FramebufferId, ScissorRect, TextureId};
use crate::render::vertex::Vertex;

use super::pipeline::{PipelineKey, Uniforms};

#[derive(Debug, Clone, PartialEq)]
pub(super) struct DrawCall {
    pub key: PipelineKey,
    pub stencil_reference: u8,
    pub texture: TextureId,
    pub uniform_offset: u32,
    pub viewport: (u32, u32),
    pub scissor: Option<ScissorRect>,
    pub indices: Range<u32>,
    pub base_vertex: i32,
}

/// Draws sharing one render target, preceded by optional clears.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Pass {
    /// `None` is the window surface.
    pub target: Option<FramebufferId>,
    pub clear: ClearRequest,
    pub draws: Vec<DrawCall>,
}

impl Pass {
    fn new(target: Option<FramebufferId>) -> Self {
        Self { target, clear: ClearRequest::default(), draws: Vec::new() }
    }
}

#[derive(Debug, Default)]
pub(super) struct Recording {
    pub passes: Vec<Pass>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub uniforms: Vec<u8>,
    last_uniforms: Option<(Uniforms, u32)>,
}

impl Recording {
    pub(super) fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Pass receiving draws for `target`, opened if the target changed.
    pub(super) fn pass_for(&mut self, target: Option<FramebufferId>) -> &mut Pass {
        let reuse = self.passes.last().is_some_and(|p| p.target == target);
        if !reuse {
            self.passes.push(Pass::new(target));
        }
        let last = self.passes.len() - 1;
        &mut self.passes[last]
    }

    /// Records a clear of `target`.
    ///
    /// Folds into the open pass's load operations while it has no draws;
    /// otherwise opens a new pass.
    pub(super) fn clear(&mut self, target: Option<FramebufferId>, request: ClearRequest) {
        let foldable = self
            .passes
            .last()
            .is_some_and(|p| p.target == target && p.draws.is_empty());
        if !foldable {
            self.passes.push(Pass::new(target));
        }
        let last = self.passes.len() - 1;
        let clear = &mut self.passes[last].clear;
        clear.color = request.color.or(clear.color);
        clear.depth = request.depth.or(clear.depth);
        clear.stencil = request.stencil.or(clear.stencil);
    }

    /// Appends a uniform block at an `align`-aligned offset and returns the
    /// offset. Consecutive identical blocks share one slot.
    pub(super) fn push_uniforms(&mut self, uniforms: Uniforms, align: u32) -> u32 {
        if let Some((last, offset)) = self.last_uniforms {
            if last == uniforms {
                return offset;
            }
        }

        let align = align.max(1) as usize;
        let offset = self.uniforms.len().div_ceil(align) * align;
        self.uniforms.resize(offset, 0);
        self.uniforms.extend_from_slice(bytemuck::bytes_of(&uniforms));

        let offset = offset as u32;
        self.last_uniforms = Some((uniforms, offset));
        offset
    }

    /// Appends a mesh; returns its base vertex and index range.
    pub(super) fn push_geometry(&mut self, vertices: &[Vertex], indices: &[u32]) -> (i32, Range<u32>) {
        let base_vertex = self.vertices.len() as i32;
        let first = self.indices.len() as u32;

        self.vertices.extend_from_slice(vertices);
        self.indices.extend_from_slice(indices);

        (base_vertex, first..self.indices.len() as u32)
    }
}

// ── target-space rectangles ───────────────────────────────────────────────

/// Viewport anchored at the bottom-left of a `target`-sized attachment, as
/// `(x, y, w, h)` with a top-left origin. `None` when empty.
pub(super) fn viewport_rect(viewport: (u32, u32), target: (u32, u32)) -> Option<[f32; 4]> {
    let w = viewport.0.min(target.0);
    let h = viewport.1.min(target.1);
    if w == 0 || h == 0 {
        return None;
    }
    Some([0.0, (target.1 - h) as f32, w as f32, h as f32])
}

/// Converts a bottom-left-origin scissor to a clamped top-left-origin
/// `(x, y, w, h)`. `None` scissor covers the whole target; an empty
/// intersection yields `None` and the draw is skipped.
pub(super) fn scissor_rect(scissor: Option<ScissorRect>, target: (u32, u32)) -> Option<[u32; 4]> {
    let (tw, th) = (target.0 as i64, target.1 as i64);
    let Some(r) = scissor else {
        return (tw > 0 && th > 0).then_some([0, 0, target.0, target.1]);
    };

    let x0 = (r.x as i64).clamp(0, tw);
    let x1 = (r.x as i64 + r.width as i64).clamp(0, tw);
    let y0 = (r.y as i64).clamp(0, th);
    let y1 = (r.y as i64 + r.height as i64).clamp(0, th);

    let (w, h) = (x1 - x0, y1 - y0);
    if w <= 0 || h <= 0 {
        return None;
    }
    Some([x0 as u32, (th - y1) as u32, w as u32, h as u32])
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;
    use crate::paint::Color;
    use crate::render::backend::{BlendMode, DepthState, ShaderId, StencilState};
    use crate::render::vertex::vertex;

    fn key() -> PipelineKey {
        PipelineKey::new(
            ShaderId(1),
            BlendMode::Alpha,
            DepthState::default(),
            StencilState::default(),
            true,
            false,
        )
    }

    fn uniforms(color: Color) -> Uniforms {
        Uniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY, color)
    }

    #[test]
    fn passes_split_on_target_change() {
        let mut rec = Recording::default();
        rec.pass_for(None);
        rec.pass_for(None);
        rec.pass_for(Some(FramebufferId(3)));
        rec.pass_for(None);
        let targets: Vec<_> = rec.passes.iter().map(|p| p.target).collect();
        assert_eq!(targets, vec![None, Some(FramebufferId(3)), None]);
    }

    #[test]
    fn clears_fold_until_something_is_drawn() {
        let mut rec = Recording::default();
        rec.clear(None, ClearRequest { color: Some(Color::BLACK), ..Default::default() });
        rec.clear(None, ClearRequest { stencil: Some(1), ..Default::default() });
        assert_eq!(rec.passes.len(), 1);
        assert_eq!(
            rec.passes[0].clear,
            ClearRequest { color: Some(Color::BLACK), depth: None, stencil: Some(1) }
        );

        let (base_vertex, indices) = rec.push_geometry(&[vertex(0.0, 0.0)], &[0]);
        rec.pass_for(None).draws.push(DrawCall {
            key: key(),
            stencil_reference: 0,
            texture: TextureId(1),
            uniform_offset: 0,
            viewport: (1, 1),
            scissor: None,
            indices,
            base_vertex,
        });
        rec.clear(None, ClearRequest { stencil: Some(0), ..Default::default() });
        assert_eq!(rec.passes.len(), 2);
        assert_eq!(rec.passes[1].clear.stencil, Some(0));
        assert_eq!(rec.passes[1].clear.color, None);
    }

    #[test]
    fn uniform_slots_are_aligned_and_deduplicated() {
        let mut rec = Recording::default();
        assert_eq!(rec.push_uniforms(uniforms(Color::WHITE), 256), 0);
        assert_eq!(rec.push_uniforms(uniforms(Color::WHITE), 256), 0);
        assert_eq!(rec.push_uniforms(uniforms(Color::BLACK), 256), 256);
        assert_eq!(rec.uniforms.len(), 256 + std::mem::size_of::<Uniforms>());
    }

    #[test]
    fn geometry_is_rebased_per_draw() {
        let mut rec = Recording::default();
        let quad = [vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(1.0, 1.0), vertex(0.0, 1.0)];
        let (b0, r0) = rec.push_geometry(&quad, &[0, 1, 2, 2, 3, 0]);
        let (b1, r1) = rec.push_geometry(&quad[..3], &[0, 1, 2]);
        assert_eq!((b0, r0), (0, 0..6));
        assert_eq!((b1, r1), (4, 6..9));
    }

    #[test]
    fn viewport_is_anchored_bottom_left() {
        assert_eq!(viewport_rect((800, 600), (800, 600)), Some([0.0, 0.0, 800.0, 600.0]));
        assert_eq!(viewport_rect((400, 300), (800, 600)), Some([0.0, 300.0, 400.0, 300.0]));
        assert_eq!(viewport_rect((1000, 1000), (800, 600)), Some([0.0, 0.0, 800.0, 600.0]));
        assert_eq!(viewport_rect((0, 10), (800, 600)), None);
    }

    #[test]
    fn scissor_flips_and_clamps() {
        let full = scissor_rect(None, (800, 600));
        assert_eq!(full, Some([0, 0, 800, 600]));

        let bottom_left = ScissorRect { x: 0, y: 0, width: 100, height: 50 };
        assert_eq!(scissor_rect(Some(bottom_left), (800, 600)), Some([0, 550, 100, 50]));

        let overhanging = ScissorRect { x: -10, y: 580, width: 50, height: 50 };
        assert_eq!(scissor_rect(Some(overhanging), (800, 600)), Some([0, 0, 40, 20]));

        let outside = ScissorRect { x: 900, y: 0, width: 10, height: 10 };
        assert_eq!(scissor_rect(Some(outside), (800, 600)), None);
    }
}
