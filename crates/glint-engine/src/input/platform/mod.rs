//! Platform event adapters.

pub mod winit;
