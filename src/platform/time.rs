//! Frame timing
//!
//! Variable frame time is folded into an accumulator and paid out in fixed
//! physics steps, capped per frame to prevent a spiral of death.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Longest frame the accumulator will accept (seconds)
pub const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct FrameClock {
    step_dt: f32,
    max_substeps: u32,
    accumulator: f32,
    /// Unscaled seconds since the clock started
    elapsed: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS)
    }
}

impl FrameClock {
    pub fn new(step_dt: f32, max_substeps: u32) -> Self {
        Self {
            step_dt,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn step_dt(&self) -> f32 {
        self.step_dt
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Fold in a frame; returns how many fixed steps to run now
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let dt = frame_dt.clamp(0.0, MAX_FRAME_DT);
        self.elapsed += dt as f64;
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= self.step_dt && substeps < self.max_substeps {
            self.accumulator -= self.step_dt;
            substeps += 1;
        }
        if substeps == self.max_substeps {
            // Drop the backlog instead of carrying it into the next frame
            self.accumulator = self.accumulator.min(self.step_dt);
        }
        substeps
    }

    /// Fraction of a step left in the accumulator (for interpolation)
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step_dt
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_steps_paid_out() {
        let mut clock = FrameClock::new(1.0 / 64.0, 8);
        assert_eq!(clock.advance(2.5 / 64.0), 2);
        assert!((clock.alpha() - 0.5).abs() < 1e-3);
        assert_eq!(clock.advance(0.5 / 64.0), 1);
    }

    #[test]
    fn test_substep_cap() {
        let mut clock = FrameClock::new(0.001, 4);
        assert_eq!(clock.advance(0.1), 4);
        assert!(clock.alpha() <= 1.0 + 1e-6);
    }

    #[test]
    fn test_long_frame_clamped() {
        let mut clock = FrameClock::new(1.0 / 64.0, 100);
        assert_eq!(clock.advance(5.0), 6);
        assert!((clock.elapsed() - 0.1).abs() < 1e-6);
    }
}
