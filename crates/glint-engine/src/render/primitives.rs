//! Immediate-mode drawing primitives.
//!
//! Angles are in radians, `0` pointing up (+Y) and increasing clockwise:
//! a point at angle `a` on a circle of radius `r` is `(r sin a, r cos a)`.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

use crate::coords::Rect;

use super::backend::GraphicsBackend;
use super::builders::{LineStrip, Polygon};
use super::error::GeometryError;
use super::renderer::Renderer;
use super::vertex::{Vertex, vertex, vertex_uv};

/// Line endpoint style.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum CapType {
    #[default]
    None,
    /// Half circle of diameter equal to the line thickness.
    Circle,
}

/// Edge count for an arc of `angle` radians at `radius`.
///
/// Roughly one edge per unit of arc length, clamped to `1..=max_edges`.
pub fn edge_count(radius: f32, angle: f32, max_edges: u32) -> u32 {
    let delta_angle = 1.0 / radius;
    let edges = (angle / delta_angle) as i64 + 1;
    edges.clamp(1, i64::from(max_edges.max(1))) as u32
}

fn point_on_arc(center: Vec2, radius: f32, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    center + radius * Vec2::new(sin, cos)
}

fn outline_vertices<const N: usize>(
    vertices: [Vertex; N],
    thickness: f32,
) -> Result<[(Vertex, Vertex); N], GeometryError> {
    let mean = vertices.iter().map(|v| v.position).sum::<glam::Vec3>() / N as f32;

    let mut pairs = [(Vertex::default(), Vertex::default()); N];
    for (index, (v, pair)) in vertices.iter().zip(pairs.iter_mut()).enumerate() {
        let dir = (v.position - mean)
            .try_normalize()
            .ok_or(GeometryError::DegenerateOutline { index })?;
        *pair = (*v, v.with_position(v.position + dir * thickness));
    }
    Ok(pairs)
}

impl<B: GraphicsBackend> Renderer<B> {
    // ── triangles and quads ──────────────────────────────────────────────

    pub fn draw_triangle(&mut self, v1: Vertex, v2: Vertex, v3: Vertex) {
        self.mesh.flush_if_not_enough_room(3, 3, &mut self.backend);

        let a = self.mesh.add_vertex(v1);
        let b = self.mesh.add_vertex(v2);
        let c = self.mesh.add_vertex(v3);
        self.mesh.make_triangle(a, b, c);
    }

    /// Triangles `(v1, v2, v3)` and `(v3, v4, v1)`.
    pub fn draw_quad(&mut self, v1: Vertex, v2: Vertex, v3: Vertex, v4: Vertex) {
        self.mesh.flush_if_not_enough_room(4, 6, &mut self.backend);

        let a = self.mesh.add_vertex(v1);
        let b = self.mesh.add_vertex(v2);
        let c = self.mesh.add_vertex(v3);
        let d = self.mesh.add_vertex(v4);
        self.mesh.make_quad(a, b, c, d);
    }

    /// Ribbon around a triangle, pushing each corner `thickness` away from
    /// the centroid. Corners are not mitered.
    pub fn draw_triangle_outline(
        &mut self,
        v1: Vertex,
        v2: Vertex,
        v3: Vertex,
        thickness: f32,
    ) -> Result<(), GeometryError> {
        let pairs = outline_vertices([v1, v2, v3], thickness)?;
        self.draw_closed_ribbon(&pairs);
        Ok(())
    }

    /// Quad counterpart of `draw_triangle_outline`.
    pub fn draw_quad_outline(
        &mut self,
        v1: Vertex,
        v2: Vertex,
        v3: Vertex,
        v4: Vertex,
        thickness: f32,
    ) -> Result<(), GeometryError> {
        let pairs = outline_vertices([v1, v2, v3, v4], thickness)?;
        self.draw_closed_ribbon(&pairs);
        Ok(())
    }

    fn draw_closed_ribbon(&mut self, pairs: &[(Vertex, Vertex)]) {
        let mut strip = LineStrip::start(&mut self.mesh, &mut self.backend);
        for &(inner, outer) in pairs.iter().chain(pairs.first()) {
            strip.extend(inner, outer);
        }
    }

    // ── rects ────────────────────────────────────────────────────────────

    /// Quad with uv `(0, 0)` at `(x0, y0)` and `(1, 1)` at `(x1, y1)`.
    pub fn draw_rect(&mut self, rect: Rect) {
        self.draw_quad(
            vertex_uv(rect.x0, rect.y0, 0.0, 0.0),
            vertex_uv(rect.x0, rect.y1, 0.0, 1.0),
            vertex_uv(rect.x1, rect.y1, 1.0, 1.0),
            vertex_uv(rect.x1, rect.y0, 1.0, 0.0),
        );
    }

    /// Border of `thickness` outside `rect`, as four overlapping bars.
    pub fn draw_rect_outline(&mut self, rect: Rect, thickness: f32) {
        let Rect { x0, y0, x1, y1 } = rect;
        let t = thickness;

        self.draw_rect(Rect::new(x0 - t, y0 - t, x1, y0));
        self.draw_rect(Rect::new(x0, y1, x1 + t, y1 + t));
        self.draw_rect(Rect::new(x0 - t, y0, x0, y1 + t));
        self.draw_rect(Rect::new(x1, y0 - t, x1 + t, y1));
    }

    // ── arcs and circles ─────────────────────────────────────────────────

    /// `edge_count` bounded by the configured maximum.
    pub fn edge_count(&self, radius: f32, angle: f32) -> u32 {
        edge_count(radius, angle, self.max_circle_edges())
    }

    /// Filled pie slice from `start` to `end` as a fan around `center`.
    pub fn draw_arc(
        &mut self,
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        edges: u32,
    ) -> Result<(), GeometryError> {
        if edges == 0 {
            return Err(GeometryError::InvalidEdgeCount);
        }

        let delta = (end - start) / edges as f32;
        let mut fan = Polygon::start(&mut self.mesh, &mut self.backend);
        fan.extend(vertex(center.x, center.y));

        for i in 0..=edges {
            let p = point_on_arc(center, radius, end - i as f32 * delta);
            fan.extend(vertex(p.x, p.y));
        }
        Ok(())
    }

    /// Band between `radius` and `radius + thickness` from `start` to `end`.
    pub fn draw_arc_outline(
        &mut self,
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        edges: u32,
        thickness: f32,
    ) -> Result<(), GeometryError> {
        if edges == 0 {
            return Err(GeometryError::InvalidEdgeCount);
        }

        let delta = (end - start) / edges as f32;
        let mut strip = LineStrip::start(&mut self.mesh, &mut self.backend);

        for i in 0..=edges {
            let angle = start + i as f32 * delta;
            let inner = point_on_arc(center, radius, angle);
            let outer = point_on_arc(center, radius + thickness, angle);
            strip.extend(vertex(inner.x, inner.y), vertex(outer.x, outer.y));
        }
        Ok(())
    }

    pub fn draw_circle(&mut self, center: Vec2, radius: f32, edges: u32) -> Result<(), GeometryError> {
        self.draw_arc(center, radius, 0.0, TAU, edges)
    }

    pub fn draw_circle_outline(
        &mut self,
        center: Vec2,
        radius: f32,
        edges: u32,
        thickness: f32,
    ) -> Result<(), GeometryError> {
        self.draw_arc_outline(center, radius, 0.0, TAU, edges, thickness)
    }

    // ── lines ────────────────────────────────────────────────────────────

    /// Segment of width `thickness`, optionally with round caps.
    pub fn draw_line(
        &mut self,
        p0: Vec2,
        p1: Vec2,
        thickness: f32,
        cap: CapType,
    ) -> Result<(), GeometryError> {
        let (dir, start_angle) = line_frame(p0, p1)?;
        let half = thickness / 2.0;
        let perp = half * dir.perp();

        let a = p0 + perp;
        let b = p0 - perp;
        let c = p1 - perp;
        let d = p1 + perp;
        self.draw_quad(vertex(a.x, a.y), vertex(b.x, b.y), vertex(c.x, c.y), vertex(d.x, d.y));

        if cap == CapType::Circle {
            let edges = self.edge_count(half, PI);
            self.draw_arc(p0, half, start_angle, start_angle + PI, edges)?;
            self.draw_arc(p1, half, start_angle + PI, start_angle + 2.0 * PI, edges)?;
        }
        Ok(())
    }

    /// Outline of width `outline` around the line `draw_line` would produce.
    ///
    /// Round caps get a matching arc band; other caps a single-segment band.
    pub fn draw_line_outline(
        &mut self,
        p0: Vec2,
        p1: Vec2,
        thickness: f32,
        cap: CapType,
        outline: f32,
    ) -> Result<(), GeometryError> {
        let (dir, start_angle) = line_frame(p0, p1)?;
        let half = thickness / 2.0;
        let inner = half * dir.perp();
        let outer = (half + outline) * dir.perp();

        for side in [1.0, -1.0] {
            // uv carries the offset from the centre line.
            let (inner, outer) = (side * inner, side * outer);
            self.draw_quad(
                vertex_uv(p0.x + inner.x, p0.y + inner.y, inner.x, inner.y),
                vertex_uv(p0.x + outer.x, p0.y + outer.y, outer.x, outer.y),
                vertex_uv(p1.x + outer.x, p1.y + outer.y, outer.x, outer.y),
                vertex_uv(p1.x + inner.x, p1.y + inner.y, inner.x, inner.y),
            );
        }

        let edges = match cap {
            CapType::Circle => self.edge_count(half, PI),
            CapType::None => 1,
        };
        self.draw_arc_outline(p0, half, start_angle, start_angle + PI, edges, outline)?;
        self.draw_arc_outline(p1, half, start_angle + PI, start_angle + 2.0 * PI, edges, outline)?;
        Ok(())
    }
}

/// Unit direction of `p0 -> p1` and the cap start angle.
fn line_frame(p0: Vec2, p1: Vec2) -> Result<(Vec2, f32), GeometryError> {
    let delta = p1 - p0;
    let dir = delta
        .try_normalize()
        .ok_or(GeometryError::DegenerateLine { x: p0.x, y: p0.y })?;
    Ok((dir, delta.x.atan2(delta.y) + PI / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::RecordingBackend;
    use crate::render::renderer::RendererConfig;

    fn renderer_with(config: RendererConfig) -> Renderer<RecordingBackend> {
        let mut r = Renderer::new(RecordingBackend::new(), config, 200, 200).unwrap();
        r.backend_mut().take_commands();
        r
    }

    fn renderer() -> Renderer<RecordingBackend> {
        renderer_with(RendererConfig::default())
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn edge_count_matches_reference_values() {
        assert_eq!(edge_count(10.0, TAU, 512), 63);
        assert_eq!(edge_count(1000.0, TAU, 512), 512);
        assert_eq!(edge_count(0.0, PI, 512), 1);
    }

    #[test]
    fn edge_count_is_monotone_and_bounded() {
        let mut prev = 0;
        for step in 0..200 {
            let n = edge_count(7.5, step as f32 * 0.05, 40);
            assert!(n >= prev && n <= 40);
            prev = n;
        }
        let mut prev = 0;
        for r in 1..300 {
            let n = edge_count(r as f32, 1.0, 100);
            assert!(n >= prev && n <= 100);
            prev = n;
        }
    }

    #[test]
    fn quads_never_overflow_the_batch() {
        let mut r = renderer_with(RendererConfig {
            max_vertices: 10,
            max_indices: 15,
            ..RendererConfig::default()
        });
        for i in 0..7 {
            let x = i as f32;
            r.draw_quad(vertex(x, 0.0), vertex(x, 1.0), vertex(x + 1.0, 1.0), vertex(x + 1.0, 0.0));
            assert!(r.mesh.vertices().len() <= 10);
            assert!(r.mesh.indices().len() <= 15);
        }
        r.flush();
        let draws: Vec<_> = r.backend().draw_calls().collect();
        assert_eq!(draws.iter().map(|(v, _)| v.len()).sum::<usize>(), 28);
        assert!(draws.iter().all(|(v, i)| v.len() <= 10 && i.len() <= 15));
    }

    #[test]
    fn rect_has_unit_uv_corners() {
        let mut r = renderer();
        r.draw_rect(Rect::new(10.0, 20.0, 30.0, 50.0));
        let uvs: Vec<Vec2> = r.mesh.vertices().iter().map(|v| v.uv).collect();
        assert_eq!(uvs, vec![Vec2::ZERO, Vec2::Y, Vec2::ONE, Vec2::X]);
        assert_eq!(r.mesh.indices(), &[0, 1, 2, 2, 3, 0]);
    }

    #[test]
    fn rect_outline_is_four_bars() {
        let mut r = renderer();
        r.draw_rect_outline(Rect::new(0.0, 0.0, 10.0, 10.0), 2.0);
        let v = r.mesh.vertices();
        assert_eq!(v.len(), 16);
        // Bottom bar spans the lower-left corner.
        assert_eq!(v[0].position.truncate(), Vec2::new(-2.0, -2.0));
        assert_eq!(v[2].position.truncate(), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn degenerate_outline_is_rejected_without_output() {
        let mut r = renderer();
        let p = vertex(1.0, 1.0);
        let err = r.draw_triangle_outline(p, p, p, 1.0).unwrap_err();
        assert_eq!(err, GeometryError::DegenerateOutline { index: 0 });
        assert!(r.mesh.is_empty());
    }

    #[test]
    fn triangle_outline_closes_the_ribbon() {
        let mut r = renderer();
        r.draw_triangle_outline(vertex(0.0, 0.0), vertex(10.0, 0.0), vertex(5.0, 8.0), 1.0)
            .unwrap();
        // Four pairs (first repeated), three quads.
        assert_eq!(r.mesh.vertices().len(), 8);
        assert_eq!(r.mesh.indices().len(), 18);
        let first_outer = r.mesh.vertices()[1].position;
        let mean = glam::Vec3::new(5.0, 8.0 / 3.0, 0.0);
        assert!(((first_outer - mean).length() - (mean.length() + 1.0)).abs() < 1e-4);
    }

    #[test]
    fn circle_fan_starts_at_the_top() {
        let mut r = renderer();
        r.draw_circle(Vec2::new(50.0, 50.0), 10.0, 4).unwrap();
        let v = r.mesh.vertices();
        assert_eq!(v.len(), 6);
        assert_eq!(r.mesh.indices().len(), 12);
        assert!(close(v[0].position.truncate(), Vec2::new(50.0, 50.0)));
        assert!(close(v[1].position.truncate(), Vec2::new(50.0, 60.0)));
        // Stepping backwards from 2π: the next point is at 3π/2, on the left.
        assert!(close(v[2].position.truncate(), Vec2::new(40.0, 50.0)));
    }

    #[test]
    fn arc_outline_samples_both_radii() {
        let mut r = renderer();
        r.draw_arc_outline(Vec2::ZERO, 5.0, 0.0, PI / 2.0, 2, 1.0).unwrap();
        let v = r.mesh.vertices();
        assert_eq!(v.len(), 6);
        assert!(close(v[0].position.truncate(), Vec2::new(0.0, 5.0)));
        assert!(close(v[1].position.truncate(), Vec2::new(0.0, 6.0)));
        assert!(close(v[4].position.truncate(), Vec2::new(5.0, 0.0)));
    }

    #[test]
    fn zero_edges_are_rejected() {
        let mut r = renderer();
        assert_eq!(r.draw_circle(Vec2::ZERO, 3.0, 0), Err(GeometryError::InvalidEdgeCount));
        assert_eq!(
            r.draw_circle_outline(Vec2::ZERO, 3.0, 0, 1.0),
            Err(GeometryError::InvalidEdgeCount)
        );
    }

    #[test]
    fn zero_length_line_is_rejected() {
        let mut r = renderer();
        let p = Vec2::new(3.0, 4.0);
        assert_eq!(
            r.draw_line(p, p, 2.0, CapType::Circle),
            Err(GeometryError::DegenerateLine { x: 3.0, y: 4.0 })
        );
        assert_eq!(
            r.draw_line_outline(p, p, 2.0, CapType::None, 1.0),
            Err(GeometryError::DegenerateLine { x: 3.0, y: 4.0 })
        );
        assert!(r.mesh.is_empty());
    }

    #[test]
    fn horizontal_line_is_thickness_wide() {
        let mut r = renderer();
        r.draw_line(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 4.0, CapType::None).unwrap();
        let v = r.mesh.vertices();
        assert_eq!(v.len(), 4);
        assert!(close(v[0].position.truncate(), Vec2::new(0.0, 2.0)));
        assert!(close(v[1].position.truncate(), Vec2::new(0.0, -2.0)));
        assert!(close(v[2].position.truncate(), Vec2::new(10.0, -2.0)));
    }

    #[test]
    fn round_caps_add_two_fans() {
        let mut r = renderer();
        r.draw_line(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 4.0, CapType::Circle).unwrap();
        let edges = r.edge_count(2.0, PI) as usize;
        // Quad + two fans of (center + edges + 1) vertices.
        assert_eq!(r.mesh.vertices().len(), 4 + 2 * (edges + 2));

        // The start cap bulges away from the line, to the left of p0.
        let cap = &r.mesh.vertices()[5..5 + edges + 1];
        assert!(cap.iter().all(|v| v.position.x <= 1e-4));
    }

    #[test]
    fn line_outline_with_flat_caps() {
        let mut r = renderer();
        r.draw_line_outline(Vec2::ZERO, Vec2::new(0.0, 10.0), 2.0, CapType::None, 1.0).unwrap();
        // Two side quads plus two single-segment bands of two pairs each.
        assert_eq!(r.mesh.vertices().len(), 8 + 4 + 4);
    }
}
