use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Batched vertex: position plus texture coordinate.
///
/// `repr(C)` so the batch can be uploaded to the GPU as raw bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    #[inline]
    pub const fn new(position: Vec3, uv: Vec2) -> Self {
        Self { position, uv }
    }

    /// Same vertex with its position moved, uv untouched.
    #[inline]
    pub fn with_position(self, position: Vec3) -> Self {
        Self { position, ..self }
    }
}

/// 2D vertex on the z = 0 plane whose uv equals its position.
#[inline]
pub fn vertex(x: f32, y: f32) -> Vertex {
    Vertex::new(Vec3::new(x, y, 0.0), Vec2::new(x, y))
}

/// 2D vertex on the z = 0 plane with an explicit uv.
#[inline]
pub fn vertex_uv(x: f32, y: f32, u: f32, v: f32) -> Vertex {
    Vertex::new(Vec3::new(x, y, 0.0), Vec2::new(u, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_copies_position_into_uv() {
        let v = vertex(3.0, -2.0);
        assert_eq!(v.position, Vec3::new(3.0, -2.0, 0.0));
        assert_eq!(v.uv, Vec2::new(3.0, -2.0));
    }

    #[test]
    fn layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
        let v = vertex_uv(1.0, 2.0, 0.25, 0.75);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&v));
        assert_eq!(floats, &[1.0, 2.0, 0.0, 0.25, 0.75]);
    }
}
