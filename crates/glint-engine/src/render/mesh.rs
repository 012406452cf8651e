use super::vertex::Vertex;

/// Default batch capacity in vertices.
pub const DEFAULT_MAX_VERTICES: usize = 2000;

/// Default batch capacity in indices.
pub const DEFAULT_MAX_INDICES: usize = 6000;

/// Smallest capacity that still fits one quad plus a carried strip pair.
pub const MIN_VERTICES: usize = 6;
pub const MIN_INDICES: usize = 6;

/// Receives flushed geometry.
///
/// Every `GraphicsBackend` is a sink; tests use plain collectors.
pub trait MeshSink {
    fn submit(&mut self, vertices: &[Vertex], indices: &[u32]);
}

/// Fixed-capacity vertex/index batch.
///
/// Geometry accumulates until a caller flushes it into a `MeshSink`. Writers
/// reserve room with `flush_if_not_enough_room` before appending, so the
/// buffers never grow past their capacity.
#[derive(Debug)]
pub struct MeshOutput {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    max_vertices: usize,
    max_indices: usize,
    generation: u64,
}

impl MeshOutput {
    pub fn new(max_vertices: usize, max_indices: usize) -> Self {
        let max_vertices = max_vertices.max(MIN_VERTICES);
        let max_indices = max_indices.max(MIN_INDICES);
        Self {
            vertices: Vec::with_capacity(max_vertices),
            indices: Vec::with_capacity(max_indices),
            max_vertices,
            max_indices,
            generation: 0,
        }
    }

    pub fn max_vertices(&self) -> usize {
        self.max_vertices
    }

    pub fn max_indices(&self) -> usize {
        self.max_indices
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Incremented every time buffered geometry is handed to a sink.
    ///
    /// Indices obtained before a generation change are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_room(&self, vertices: usize, indices: usize) -> bool {
        self.vertices.len() + vertices <= self.max_vertices
            && self.indices.len() + indices <= self.max_indices
    }

    /// Appends a vertex and returns its index in the batch.
    pub fn add_vertex(&mut self, v: Vertex) -> u32 {
        debug_assert!(self.vertices.len() < self.max_vertices, "mesh batch overflow");
        let index = self.vertices.len() as u32;
        self.vertices.push(v);
        index
    }

    pub fn make_triangle(&mut self, a: u32, b: u32, c: u32) {
        debug_assert!(self.indices.len() + 3 <= self.max_indices, "mesh batch overflow");
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Two triangles: (a, b, c) and (c, d, a).
    pub fn make_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        debug_assert!(self.indices.len() + 6 <= self.max_indices, "mesh batch overflow");
        self.indices.extend_from_slice(&[a, b, c, c, d, a]);
    }

    /// Flushes when fewer than the requested slots remain. Returns whether a flush happened.
    pub fn flush_if_not_enough_room(
        &mut self,
        vertices: usize,
        indices: usize,
        sink: &mut impl MeshSink,
    ) -> bool {
        if self.has_room(vertices, indices) {
            return false;
        }
        self.flush(sink);
        true
    }

    /// Hands buffered geometry to `sink` and clears the batch.
    ///
    /// An empty batch is not forwarded.
    pub fn flush(&mut self, sink: &mut impl MeshSink) {
        if self.vertices.is_empty() {
            return;
        }
        if !self.indices.is_empty() {
            sink.submit(&self.vertices, &self.indices);
        }
        self.vertices.clear();
        self.indices.clear();
        self.generation += 1;
    }
}

impl Default for MeshOutput {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VERTICES, DEFAULT_MAX_INDICES)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::render::vertex::vertex;

    /// Collects every flushed batch.
    #[derive(Default)]
    pub(crate) struct Collector {
        pub batches: Vec<(Vec<Vertex>, Vec<u32>)>,
    }

    impl MeshSink for Collector {
        fn submit(&mut self, vertices: &[Vertex], indices: &[u32]) {
            self.batches.push((vertices.to_vec(), indices.to_vec()));
        }
    }

    #[test]
    fn quad_indices_share_the_diagonal() {
        let mut mesh = MeshOutput::default();
        let ids: Vec<u32> = (0..4).map(|i| mesh.add_vertex(vertex(i as f32, 0.0))).collect();
        mesh.make_quad(ids[0], ids[1], ids[2], ids[3]);
        assert_eq!(mesh.indices(), &[0, 1, 2, 2, 3, 0]);
    }

    #[test]
    fn empty_flush_is_silent() {
        let mut mesh = MeshOutput::default();
        let mut sink = Collector::default();
        mesh.flush(&mut sink);
        assert!(sink.batches.is_empty());
        assert_eq!(mesh.generation(), 0);
    }

    #[test]
    fn flushes_only_when_out_of_room() {
        let mut mesh = MeshOutput::new(8, 12);
        let mut sink = Collector::default();

        for _ in 0..3 {
            mesh.flush_if_not_enough_room(4, 6, &mut sink);
            let base = mesh.add_vertex(vertex(0.0, 0.0));
            for _ in 0..3 {
                mesh.add_vertex(vertex(1.0, 1.0));
            }
            mesh.make_quad(base, base + 1, base + 2, base + 3);
            assert!(mesh.vertices().len() <= mesh.max_vertices());
            assert!(mesh.indices().len() <= mesh.max_indices());
        }

        assert_eq!(sink.batches.len(), 1);
        assert_eq!(sink.batches[0].0.len(), 8);
        assert_eq!(sink.batches[0].1.len(), 12);
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.generation(), 1);
    }

    #[test]
    fn capacity_has_a_floor() {
        let mesh = MeshOutput::new(1, 1);
        assert_eq!(mesh.max_vertices(), MIN_VERTICES);
        assert_eq!(mesh.max_indices(), MIN_INDICES);
    }
}
