//! Game-over detection
//!
//! A run ends when some settled body stays above the threshold line for
//! `delay` seconds without interruption. Any tick with no body above the
//! line resets the clock.

use super::body::Body;

/// Monitor phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonitorPhase {
    /// Nothing above the line
    Clear,
    /// Something above the line for `elapsed` seconds
    Breached { elapsed: f32 },
    /// Triggered (terminal until reset)
    Tripped,
}

#[derive(Debug, Clone)]
pub struct GameOverMonitor {
    /// Threshold line (world Y)
    line_y: f32,
    /// Seconds a breach must last
    delay: f32,
    phase: MonitorPhase,
}

impl GameOverMonitor {
    pub fn new(line_y: f32, delay: f32) -> Self {
        Self {
            line_y,
            delay: delay.max(0.0),
            phase: MonitorPhase::Clear,
        }
    }

    pub fn phase(&self) -> MonitorPhase {
        self.phase
    }

    pub fn line_y(&self) -> f32 {
        self.line_y
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Seconds the current breach has lasted
    pub fn elapsed(&self) -> f32 {
        match self.phase {
            MonitorPhase::Clear => 0.0,
            MonitorPhase::Breached { elapsed } => elapsed,
            MonitorPhase::Tripped => self.delay,
        }
    }

    pub fn is_tripped(&self) -> bool {
        self.phase == MonitorPhase::Tripped
    }

    /// Whether any live, released body sits above the line
    pub fn is_breached<'a>(&self, bodies: impl IntoIterator<Item = &'a Body>) -> bool {
        bodies
            .into_iter()
            .any(|b| b.is_settled() && b.pos.y > self.line_y)
    }

    /// Advance by `dt`; returns true only on the tick the monitor trips
    pub fn tick<'a>(&mut self, bodies: impl IntoIterator<Item = &'a Body>, dt: f32) -> bool {
        if self.is_tripped() {
            return false;
        }

        if !self.is_breached(bodies) {
            self.phase = MonitorPhase::Clear;
            return false;
        }

        let elapsed = self.elapsed() + dt;
        if elapsed >= self.delay {
            log::info!("Threshold breached for {:.2}s, game over", elapsed);
            self.phase = MonitorPhase::Tripped;
            true
        } else {
            self.phase = MonitorPhase::Breached { elapsed };
            false
        }
    }

    pub fn reset(&mut self) {
        self.phase = MonitorPhase::Clear;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodyId;
    use glam::Vec2;

    fn body_at(y: f32) -> Body {
        Body::settled(BodyId(1), 0, 0.2, Vec2::new(0.0, y))
    }

    #[test]
    fn test_short_breach_never_trips() {
        let mut monitor = GameOverMonitor::new(4.0, 2.0);
        let above = [body_at(4.5)];
        let below = [body_at(1.0)];

        for _ in 0..15 {
            assert!(!monitor.tick(&above, 0.1));
        }
        assert!(monitor.elapsed() > 1.0);
        assert!(!monitor.tick(&below, 0.1));
        assert_eq!(monitor.phase(), MonitorPhase::Clear);

        // Another short excursion starts from zero
        for _ in 0..15 {
            assert!(!monitor.tick(&above, 0.1));
        }
        assert!(!monitor.is_tripped());
    }

    #[test]
    fn test_sustained_breach_trips_once() {
        let mut monitor = GameOverMonitor::new(4.0, 2.0);
        let above = [body_at(4.5)];
        let mut trips = 0;
        for _ in 0..40 {
            if monitor.tick(&above, 0.1) {
                trips += 1;
            }
        }
        assert_eq!(trips, 1);
        assert!(monitor.is_tripped());
    }

    #[test]
    fn test_trips_at_exact_delay() {
        let mut monitor = GameOverMonitor::new(4.0, 1.0);
        let above = [body_at(5.0)];
        assert!(!monitor.tick(&above, 0.5));
        assert!(monitor.tick(&above, 0.5));
    }

    #[test]
    fn test_aiming_and_merged_bodies_ignored() {
        let mut monitor = GameOverMonitor::new(4.0, 0.1);
        let aiming = Body::aiming(BodyId(1), 0, 0.2, Vec2::new(0.0, 4.5));
        let mut merged = body_at(4.5);
        merged.has_merged = true;
        assert!(!monitor.tick([&aiming, &merged], 1.0));
        assert_eq!(monitor.phase(), MonitorPhase::Clear);
    }

    #[test]
    fn test_reset_clears_trip() {
        let mut monitor = GameOverMonitor::new(4.0, 0.0);
        assert!(monitor.tick(&[body_at(4.5)], 0.016));
        monitor.reset();
        assert_eq!(monitor.phase(), MonitorPhase::Clear);
        assert!(monitor.tick(&[body_at(4.5)], 0.016));
    }
}
