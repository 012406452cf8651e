//! Incremental strip and fan builders over a `MeshOutput`.
//!
//! Both builders survive mid-build flushes: when the batch is flushed to make
//! room, the vertices still referenced by the next primitive are re-added to
//! the fresh batch.

use super::mesh::{MeshOutput, MeshSink};
use super::vertex::Vertex;

#[derive(Debug, Copy, Clone)]
struct Placed {
    vertex: Vertex,
    index: u32,
}

impl Placed {
    fn add(mesh: &mut MeshOutput, vertex: Vertex) -> Self {
        Self { vertex, index: mesh.add_vertex(vertex) }
    }
}

// ── line strip ────────────────────────────────────────────────────────────

/// Ribbon of quads built from successive (inner, outer) vertex pairs.
///
/// Each `extend` after the first joins the previous pair and the new pair with
/// one quad.
pub struct LineStrip<'a, S: MeshSink> {
    mesh: &'a mut MeshOutput,
    sink: &'a mut S,
    last: Option<(Placed, Placed)>,
    generation: u64,
}

impl<'a, S: MeshSink> LineStrip<'a, S> {
    pub fn start(mesh: &'a mut MeshOutput, sink: &'a mut S) -> Self {
        let generation = mesh.generation();
        Self { mesh, sink, last: None, generation }
    }

    pub fn extend(&mut self, inner: Vertex, outer: Vertex) {
        // Room for a carried pair, the new pair and one quad.
        self.mesh.flush_if_not_enough_room(4, 6, &mut *self.sink);

        let prev = match self.last {
            Some((pi, po)) if self.mesh.generation() != self.generation => Some((
                Placed::add(self.mesh, pi.vertex),
                Placed::add(self.mesh, po.vertex),
            )),
            other => other,
        };

        let inner = Placed::add(self.mesh, inner);
        let outer = Placed::add(self.mesh, outer);

        if let Some((pi, po)) = prev {
            self.mesh.make_quad(pi.index, po.index, outer.index, inner.index);
        }

        self.last = Some((inner, outer));
        self.generation = self.mesh.generation();
    }
}

// ── polygon fan ───────────────────────────────────────────────────────────

/// Triangle fan anchored at the first vertex.
///
/// The third and later vertices each emit one triangle (first, previous, new).
pub struct Polygon<'a, S: MeshSink> {
    mesh: &'a mut MeshOutput,
    sink: &'a mut S,
    first: Option<Placed>,
    last: Option<Placed>,
    generation: u64,
}

impl<'a, S: MeshSink> Polygon<'a, S> {
    pub fn start(mesh: &'a mut MeshOutput, sink: &'a mut S) -> Self {
        let generation = mesh.generation();
        Self { mesh, sink, first: None, last: None, generation }
    }

    pub fn extend(&mut self, v: Vertex) {
        // Room for the carried anchor and previous vertex, the new one and a triangle.
        self.mesh.flush_if_not_enough_room(3, 3, &mut *self.sink);

        if self.mesh.generation() != self.generation {
            self.first = self.first.map(|p| Placed::add(self.mesh, p.vertex));
            self.last = self.last.map(|p| Placed::add(self.mesh, p.vertex));
        }

        let placed = Placed::add(self.mesh, v);

        match (self.first, self.last) {
            (None, _) => self.first = Some(placed),
            (Some(_), None) => self.last = Some(placed),
            (Some(first), Some(prev)) => {
                self.mesh.make_triangle(first.index, prev.index, placed.index);
                self.last = Some(placed);
            }
        }

        self.generation = self.mesh.generation();
    }
}
