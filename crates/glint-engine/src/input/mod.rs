//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code translates platform events into `InputEvent`s (see
//! `platform::winit`) and calls `InputState::begin_frame` once per frame.

mod frame;
pub mod platform;
mod state;
mod types;

pub use frame::{EventQueue, InputFrame};
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState, MouseButton, MouseButtonState};
