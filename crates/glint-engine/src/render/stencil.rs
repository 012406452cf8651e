//! Stencil-based clipping.
//!
//! Usage is a strict sequence: `start_stencilling` (paint the mask), draw the
//! mask shapes, `start_using_stencil` (draw clipped content), then
//! `lift_stencil`. Nothing enforces the order.
//!
//! With `inverse = false` the painted shapes are excluded: clipped draws pass
//! only outside them. With `inverse = true` clipped draws pass only inside.

use super::backend::{ClearRequest, CompareFn, GraphicsBackend, StencilOp, StencilState};
use super::renderer::Renderer;

impl<B: GraphicsBackend> Renderer<B> {
    /// Clears the stencil buffer and starts painting the mask.
    ///
    /// With `can_draw = false` the mask shapes do not reach the color buffer.
    pub fn start_stencilling(&mut self, can_draw: bool, inverse: bool) {
        self.flush();

        if !can_draw {
            self.set_color_writes(false);
        }

        self.clear_stencil = u8::from(inverse);
        self.set_stencil(StencilState { write_mask: 1, ..self.stencil });
        self.backend.clear(ClearRequest {
            stencil: Some(self.clear_stencil),
            ..ClearRequest::default()
        });

        let (reference, read_mask) = if inverse { (0, 0) } else { (1, 1) };
        self.set_stencil(StencilState {
            enabled: true,
            compare: CompareFn::Always,
            reference,
            read_mask,
            write_mask: 1,
            fail_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            pass_op: StencilOp::Replace,
        });
    }

    /// Stops painting; later draws are tested against the mask.
    pub fn start_using_stencil(&mut self) {
        self.flush();

        self.set_color_writes(true);
        self.set_stencil(StencilState {
            compare: CompareFn::NotEqual,
            reference: 1,
            read_mask: 1,
            write_mask: 0,
            ..self.stencil
        });
    }

    /// Disables the stencil test.
    pub fn lift_stencil(&mut self) {
        self.flush();
        self.set_stencil(StencilState { enabled: false, ..self.stencil });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::render::recording::{Command, RecordingBackend};
    use crate::render::renderer::RendererConfig;

    fn renderer() -> Renderer<RecordingBackend> {
        let mut r = Renderer::new(RecordingBackend::new(), RendererConfig::default(), 100, 100)
            .unwrap();
        r.backend_mut().take_commands();
        r
    }

    #[test]
    fn stencilling_paints_ones_over_a_zero_clear() {
        let mut r = renderer();
        r.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0));
        r.start_stencilling(false, false);

        let cmds = r.backend().commands();
        assert!(matches!(cmds[0], Command::Draw { .. }));
        assert!(cmds.contains(&Command::SetColorWrites(false)));
        assert!(cmds.contains(&Command::Clear(ClearRequest {
            stencil: Some(0),
            ..Default::default()
        })));

        let s = r.stencil_state();
        assert!(s.enabled);
        assert_eq!(s.compare, CompareFn::Always);
        assert_eq!((s.reference, s.read_mask, s.write_mask), (1, 1, 1));
        assert_eq!(s.pass_op, StencilOp::Replace);
        assert_eq!(s.fail_op, StencilOp::Keep);
    }

    #[test]
    fn inverse_stencilling_clears_to_one() {
        let mut r = renderer();
        r.start_stencilling(true, true);

        let cmds = r.backend().commands();
        assert!(!cmds.contains(&Command::SetColorWrites(false)));
        assert!(cmds.contains(&Command::Clear(ClearRequest {
            stencil: Some(1),
            ..Default::default()
        })));
        let s = r.stencil_state();
        assert_eq!((s.reference, s.read_mask), (0, 0));
    }

    #[test]
    fn using_stencil_tests_not_equal_one_without_writing() {
        let mut r = renderer();
        r.start_stencilling(false, false);
        r.start_using_stencil();

        let s = r.stencil_state();
        assert!(s.enabled);
        assert_eq!(s.compare, CompareFn::NotEqual);
        assert_eq!((s.reference, s.read_mask, s.write_mask), (1, 1, 0));
        assert_eq!(r.backend().commands().last(), Some(&Command::SetStencil(s)));
        assert!(r.backend().commands().contains(&Command::SetColorWrites(true)));
    }

    #[test]
    fn lift_disables_the_test() {
        let mut r = renderer();
        r.start_stencilling(true, false);
        r.start_using_stencil();
        r.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0));
        r.lift_stencil();

        assert!(!r.stencil_state().enabled);
        let cmds = r.backend().commands();
        let draw = cmds.iter().rposition(|c| matches!(c, Command::Draw { .. })).unwrap();
        assert_eq!(cmds[draw + 1], Command::SetStencil(r.stencil_state()));
    }
}
