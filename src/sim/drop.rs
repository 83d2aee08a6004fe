//! Drop cycle: aim, release, cool down, respawn
//!
//! Pointer policy is release-to-drop: a press on the playfield arms the
//! drop, moving the pointer aims, and releasing lets go. A press that starts
//! over UI never drops, even if released over the playfield.

use glam::Vec2;

use super::body::BodyId;
use crate::tuning::GameTuning;

/// Where the drop cycle is
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropPhase {
    /// No body held and no cooldown running
    Idle,
    /// Holding a kinematic body that follows the pointer
    Aiming(BodyId),
    /// A body was just released; counting down to the next spawn
    Cooldown { remaining: f32 },
}

#[derive(Debug, Clone)]
pub struct DropController {
    phase: DropPhase,
    /// Tier of the body that spawns next (preview)
    next_tier: usize,
    /// Current lane position (world X)
    lane_x: f32,
    min_x: f32,
    max_x: f32,
    drop_y: f32,
    cooldown: f32,
    /// Paused or game over
    frozen: bool,
    /// Press began on the playfield while aiming
    armed: bool,
}

impl DropController {
    pub fn new(tuning: &GameTuning) -> Self {
        let (min_x, max_x) = (tuning.drop_min_x, tuning.drop_max_x);
        Self {
            phase: DropPhase::Idle,
            next_tier: 0,
            lane_x: ((min_x + max_x) / 2.0).clamp(min_x, max_x),
            min_x,
            max_x,
            drop_y: tuning.drop_y,
            cooldown: tuning.drop_cooldown,
            frozen: false,
            armed: false,
        }
    }

    pub fn phase(&self) -> DropPhase {
        self.phase
    }

    pub fn aiming(&self) -> Option<BodyId> {
        match self.phase {
            DropPhase::Aiming(id) => Some(id),
            _ => None,
        }
    }

    pub fn next_tier(&self) -> usize {
        self.next_tier
    }

    pub fn set_next_tier(&mut self, tier: usize) {
        self.next_tier = tier;
    }

    pub fn lane_x(&self) -> f32 {
        self.lane_x
    }

    /// Where a held body sits (and where the lane marker is drawn)
    pub fn rest_position(&self) -> Vec2 {
        Vec2::new(self.lane_x, self.drop_y)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
        if frozen {
            self.armed = false;
        }
    }

    /// Idle with nothing pending: a spawn may happen now
    pub fn is_ready(&self) -> bool {
        self.phase == DropPhase::Idle
    }

    /// Start holding a freshly spawned body
    pub fn begin_aiming(&mut self, id: BodyId) {
        self.phase = DropPhase::Aiming(id);
        self.armed = false;
    }

    /// Move the lane toward a pointer X; returns the held body and its new spot
    pub fn on_pointer_move(&mut self, world_x: f32, over_ui: bool) -> Option<(BodyId, Vec2)> {
        if self.frozen || over_ui {
            return None;
        }
        let id = self.aiming()?;
        self.lane_x = world_x.clamp(self.min_x, self.max_x);
        Some((id, self.rest_position()))
    }

    /// Pointer went down; arms the drop when over the playfield
    pub fn on_pointer_press(&mut self, over_ui: bool) -> bool {
        self.armed = !self.frozen && !over_ui && self.aiming().is_some();
        self.armed
    }

    /// Pointer went up; returns the body to release, starting the cooldown
    pub fn on_pointer_release(&mut self, over_ui: bool) -> Option<BodyId> {
        let armed = std::mem::take(&mut self.armed);
        if self.frozen || over_ui || !armed {
            return None;
        }
        let id = self.aiming()?;
        self.phase = DropPhase::Cooldown {
            remaining: self.cooldown,
        };
        Some(id)
    }

    /// Advance the cooldown; true when it just expired and a spawn is due
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.frozen {
            return false;
        }
        if let DropPhase::Cooldown { remaining } = self.phase {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.phase = DropPhase::Idle;
                return true;
            }
            self.phase = DropPhase::Cooldown { remaining };
        }
        false
    }

    /// Forget the held body and any pending spawn
    pub fn cancel(&mut self) {
        self.phase = DropPhase::Idle;
        self.armed = false;
    }

    /// Back to a cooldown-ready, unfrozen state
    pub fn reset(&mut self) {
        self.cancel();
        self.frozen = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> DropController {
        DropController::new(&GameTuning::default())
    }

    fn aiming_controller() -> DropController {
        let mut drop = controller();
        drop.begin_aiming(BodyId(1));
        drop
    }

    #[test]
    fn test_pointer_clamped_to_lane() {
        let mut drop = aiming_controller();
        let (id, pos) = drop.on_pointer_move(10.0, false).unwrap();
        assert_eq!(id, BodyId(1));
        assert_eq!(pos, Vec2::new(2.2, 4.5));
        let (_, pos) = drop.on_pointer_move(-10.0, false).unwrap();
        assert_eq!(pos.x, -2.2);
    }

    #[test]
    fn test_move_ignored_without_body_or_over_ui() {
        let mut drop = controller();
        assert!(drop.on_pointer_move(1.0, false).is_none());
        let mut drop = aiming_controller();
        assert!(drop.on_pointer_move(1.0, true).is_none());
        assert_eq!(drop.lane_x(), 0.0);
    }

    #[test]
    fn test_press_release_drops_and_cools_down() {
        let mut drop = aiming_controller();
        assert!(drop.on_pointer_press(false));
        assert_eq!(drop.on_pointer_release(false), Some(BodyId(1)));
        assert!(matches!(drop.phase(), DropPhase::Cooldown { .. }));

        // Nothing to drop during cooldown
        assert!(!drop.on_pointer_press(false));
        assert!(drop.on_pointer_release(false).is_none());

        assert!(!drop.tick(0.3));
        assert!(drop.tick(0.3));
        assert!(drop.is_ready());
    }

    #[test]
    fn test_release_without_press_ignored() {
        let mut drop = aiming_controller();
        assert!(drop.on_pointer_release(false).is_none());
        assert_eq!(drop.aiming(), Some(BodyId(1)));
    }

    #[test]
    fn test_press_over_ui_never_drops() {
        let mut drop = aiming_controller();
        assert!(!drop.on_pointer_press(true));
        assert!(drop.on_pointer_release(false).is_none());
    }

    #[test]
    fn test_frozen_rejects_input_and_holds_cooldown() {
        let mut drop = aiming_controller();
        drop.set_frozen(true);
        assert!(drop.on_pointer_move(1.0, false).is_none());
        assert!(!drop.on_pointer_press(false));

        drop.set_frozen(false);
        drop.on_pointer_press(false);
        drop.on_pointer_release(false);
        drop.set_frozen(true);
        assert!(!drop.tick(5.0));
        drop.set_frozen(false);
        assert!(drop.tick(0.5));
    }

    #[test]
    fn test_cancel_discards_pending_spawn() {
        let mut drop = aiming_controller();
        drop.on_pointer_press(false);
        drop.on_pointer_release(false);
        drop.cancel();
        assert!(!drop.tick(1.0));
        assert!(drop.is_ready());
    }
}
