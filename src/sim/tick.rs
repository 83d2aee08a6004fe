//! Frame tick
//!
//! Drives a session from variable frame time: one `update` per frame, then
//! as many fixed physics steps as the frame clock pays out.

use super::physics::PhysicsProvider;
use super::session::GameSession;
use crate::platform::input::{PointerSample, ScreenMapping};
use crate::platform::time::{FrameClock, MAX_FRAME_DT};

/// Input commands for a single frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer X in world units (None when no pointer is present)
    pub pointer_x: Option<f32>,
    /// Pointer went down this frame
    pub pointer_pressed: bool,
    /// Pointer went up this frame (drops the held body)
    pub pointer_released: bool,
    /// Pointer is over a UI element
    pub pointer_over_ui: bool,
    /// Pause toggle
    pub toggle_pause: bool,
    /// Draw a new tier ladder (before the first drop only)
    pub reroll: bool,
    /// Start a new run
    pub restart: bool,
    /// Fire the max-merge celebration (debug/testing)
    pub debug_max_merge: bool,
}

impl FrameInput {
    /// Pointer part of the input from a raw sample
    pub fn from_pointer(sample: &PointerSample, mapping: &ScreenMapping) -> Self {
        Self {
            pointer_x: sample.screen_pos.map(|p| mapping.screen_to_world(p).x),
            pointer_pressed: sample.pressed,
            pointer_released: sample.released,
            pointer_over_ui: sample.over_ui,
            ..Default::default()
        }
    }

    /// Clear one-shot commands after they've been processed
    pub fn clear_one_shots(&mut self) {
        self.pointer_pressed = false;
        self.pointer_released = false;
        self.toggle_pause = false;
        self.reroll = false;
        self.restart = false;
        self.debug_max_merge = false;
    }
}

/// Advance a session by one frame; returns the physics steps taken
pub fn tick<P: PhysicsProvider>(
    session: &mut GameSession<P>,
    clock: &mut FrameClock,
    input: &FrameInput,
    frame_dt: f32,
) -> u32 {
    let dt = frame_dt.clamp(0.0, MAX_FRAME_DT);
    session.update(input, dt);

    let steps = clock.advance(dt);
    for _ in 0..steps {
        session.fixed_step(clock.step_dt());
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::catalog::TierPool;
    use crate::sim::physics::BoxPhysics;
    use crate::tuning::GameTuning;
    use glam::Vec2;

    fn session() -> GameSession<BoxPhysics> {
        let tuning = GameTuning::default();
        let physics = BoxPhysics::from_tuning(&tuning);
        GameSession::new(tuning, TierPool::builtin(), physics, Box::new(MemoryStore::new()), 3)
    }

    #[test]
    fn test_from_pointer_maps_x() {
        let mapping = ScreenMapping::new(Vec2::new(800.0, 1000.0), 10.0, Vec2::ZERO);
        let sample = PointerSample {
            screen_pos: Some(Vec2::new(600.0, 100.0)),
            pressed: true,
            released: false,
            over_ui: false,
        };
        let input = FrameInput::from_pointer(&sample, &mapping);
        assert!((input.pointer_x.unwrap() - 2.0).abs() < 1e-5);
        assert!(input.pointer_pressed);
        assert!(!input.restart);
    }

    #[test]
    fn test_clear_one_shots_keeps_pointer() {
        let mut input = FrameInput {
            pointer_x: Some(1.0),
            pointer_released: true,
            restart: true,
            ..Default::default()
        };
        input.clear_one_shots();
        assert_eq!(input.pointer_x, Some(1.0));
        assert!(!input.pointer_released);
        assert!(!input.restart);
    }

    #[test]
    fn test_dropped_body_falls_to_floor() {
        let mut s = session();
        let mut clock = FrameClock::default();
        let mut input = FrameInput {
            pointer_x: Some(-1.0),
            pointer_pressed: true,
            pointer_released: true,
            ..Default::default()
        };
        tick(&mut s, &mut clock, &input, 1.0 / 60.0);
        input.clear_one_shots();

        let dropped = s.bodies().find(|b| b.is_dropped).map(|b| b.id).unwrap();
        for _ in 0..240 {
            tick(&mut s, &mut clock, &input, 1.0 / 60.0);
        }
        let body = s.body(dropped).unwrap();
        let floor = s.container().floor_y();
        assert!((body.pos.y - (floor + body.radius)).abs() < 0.05, "y = {}", body.pos.y);
        assert!(!s.is_game_over());
    }

    #[test]
    fn test_long_frame_clamped() {
        let mut s = session();
        let mut clock = FrameClock::new(1.0 / 64.0, 8);
        let steps = tick(&mut s, &mut clock, &FrameInput::default(), 10.0);
        assert_eq!(steps, 6);
    }
}
