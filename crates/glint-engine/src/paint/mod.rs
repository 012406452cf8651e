//! Paint model shared between callers and the renderer.
//!
//! The immediate pipeline has a single uniform draw color; textures supply
//! everything else.

pub mod color;

pub use color::Color;
