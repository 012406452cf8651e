use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame ended, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken when the frame ended (after any pacing sleep).
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,

    /// Pacing sleep requested for this frame, if any.
    pub slept: Option<Duration>,
}

/// Frame clock with optional frame-rate capping.
///
/// `end_frame` measures the wall-clock delta since the previous `end_frame`.
/// With a non-zero target frame rate, a frame that finishes early sleeps for
/// the rest of its budget and the delta is measured again after waking. The
/// sleep is best effort: whatever delta results is accepted as-is.
#[derive(Debug, Clone)]
pub struct FrameClock {
    epoch: Instant,
    last: Instant,
    frame_index: u64,
    target_fps: u32,
    dt: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            epoch: now,
            last: now,
            frame_index: 0,
            target_fps: 0,
            dt: 0.0,
        }
    }

    /// Creates a clock capped at `fps` frames per second (`0` = uncapped).
    pub fn with_target_fps(fps: u32) -> Self {
        Self { target_fps: fps, ..Self::new() }
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps;
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Delta of the most recently completed frame, in seconds.
    pub fn delta_time(&self) -> f32 {
        self.dt
    }

    /// Seconds since the clock was created or last set.
    pub fn elapsed(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Rebases the clock so that `elapsed()` reads `seconds` now.
    ///
    /// Negative or non-finite values are treated as zero.
    pub fn set_time(&mut self, seconds: f64) {
        let offset = if seconds.is_finite() && seconds > 0.0 {
            Duration::from_secs_f64(seconds)
        } else {
            Duration::ZERO
        };
        let now = Instant::now();
        self.epoch = now.checked_sub(offset).unwrap_or(now);
    }

    /// Resets the delta baseline.
    ///
    /// Useful after resuming from suspension so the next delta does not span
    /// the pause.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Ends the current frame, pacing it if a target frame rate is set.
    pub fn end_frame(&mut self) -> FrameTime {
        let mut now = Instant::now();
        let mut dt = now.saturating_duration_since(self.last);
        let mut slept = None;

        if self.target_fps > 0 {
            let budget = Duration::from_secs_f64(1.0 / self.target_fps as f64);
            if let Some(remaining) = budget.checked_sub(dt).filter(|d| !d.is_zero()) {
                std::thread::sleep(remaining);
                slept = Some(remaining);
                now = Instant::now();
                dt = now.saturating_duration_since(self.last);
            }
        }

        self.last = now;
        self.dt = dt.as_secs_f32();

        let ft = FrameTime {
            dt: self.dt,
            now,
            frame_index: self.frame_index,
            slept,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
