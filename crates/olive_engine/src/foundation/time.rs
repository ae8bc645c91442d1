//! Time management utilities

use std::time::Instant;

/// Per-tick timing handed to every update and draw call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameContext {
    /// Seconds elapsed since the previous tick
    pub delta_time: f32,

    /// Seconds elapsed since the host loop started
    pub total_time: f32,
}

impl FrameContext {
    /// Create a frame context
    pub const fn new(delta_time: f32, total_time: f32) -> Self {
        Self { delta_time, total_time }
    }
}

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update from the wall clock (once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(elapsed);
    }

    /// Advance by a fixed step, ignoring the wall clock
    pub fn advance(&mut self, delta_time: f32) {
        self.delta_time = delta_time;
        self.total_time += delta_time;
        self.frame_count += 1;
    }

    /// Timing for the tick that was just advanced
    pub fn frame_context(&self) -> FrameContext {
        FrameContext::new(self.delta_time, self.total_time)
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_advance_accumulates() {
        let mut timer = Timer::new();
        timer.advance(0.25);
        timer.advance(0.5);

        let frame = timer.frame_context();
        assert_relative_eq!(frame.delta_time, 0.5);
        assert_relative_eq!(frame.total_time, 0.75);
        assert_eq!(timer.frame_count(), 2);
        assert_relative_eq!(timer.average_fps(), 2.0 / 0.75);
    }
}
