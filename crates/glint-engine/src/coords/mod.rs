//! Coordinate and geometry types shared across the renderer and input.
//!
//! Canonical CPU space:
//! - Framebuffer pixels
//! - Origin bottom-left
//! - +X right, +Y up
//!
//! Vectors and matrices come from `glam` and are re-exported here so callers
//! do not need a direct dependency.

mod rect;

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use rect::Rect;
