//! Time management for the simulation loop.

use std::time::{Duration, Instant};

/// Frame timing with a fixed-timestep accumulator.
///
/// The driver calls [`Time::update`] once per outer iteration and drains
/// [`Time::should_fixed_update`] to run zero or more fixed simulation ticks,
/// keeping the physics cadence at the fixed rate regardless of frame pacing.
#[derive(Debug)]
pub struct Time {
    start_time: Instant,
    last_frame: Instant,
    delta: Duration,
    elapsed: Duration,
    frame_count: u64,
    /// Fixed timestep for the simulation (default 60 Hz).
    fixed_timestep: Duration,
    accumulator: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            fixed_timestep: Duration::from_secs_f64(1.0 / 60.0),
            accumulator: Duration::ZERO,
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.elapsed = now - self.start_time;
        self.frame_count += 1;
        self.accumulator += self.delta;
    }

    /// Delta time of the last frame in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Total elapsed time since start, in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Frames seen since start.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The fixed timestep in seconds.
    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep.as_secs_f32()
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            true
        } else {
            false
        }
    }

    /// Set the fixed timestep rate in Hz.
    pub fn set_fixed_rate(&mut self, hz: f64) {
        self.fixed_timestep = Duration::from_secs_f64(1.0 / hz);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_drains_in_fixed_steps() {
        let mut time = Time::new();
        time.set_fixed_rate(60.0);
        // Simulate a frame worth three full steps plus a remainder landing
        // in the accumulator.
        time.accumulator = time.fixed_timestep * 3 + Duration::from_micros(100);
        let mut ticks = 0;
        while time.should_fixed_update() {
            ticks += 1;
        }
        assert_eq!(ticks, 3);
        assert!(time.accumulator < time.fixed_timestep);
    }
}
