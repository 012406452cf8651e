//! Time subsystem.
//!
//! Frame timing and pacing without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per render loop
//! - call `end_frame()` once per presented frame to obtain `FrameTime`

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
