//! Bodies: the droppable, mergeable game pieces

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MASS_PER_TIER;

/// Stable body identity (creation sequence number)
///
/// The ordering is total and survives across ticks, which is what merge
/// deduplication relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// How the physics provider drives a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyMode {
    /// Position dictated by the game (aiming)
    Kinematic,
    /// Fully simulated (dropped)
    Dynamic,
}

/// A single game piece at a given tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    tier: usize,
    pub radius: f32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub mode: BodyMode,
    /// Released into physics
    pub is_dropped: bool,
    /// Consumed by a merge this step (tombstone)
    pub has_merged: bool,
}

impl Body {
    /// A new body held kinematically for aiming
    pub fn aiming(id: BodyId, tier: usize, radius: f32, pos: Vec2) -> Self {
        Self {
            id,
            tier,
            radius,
            pos,
            vel: Vec2::ZERO,
            mode: BodyMode::Kinematic,
            is_dropped: false,
            has_merged: false,
        }
    }

    /// A body created already dropped and at rest (merge product)
    pub fn settled(id: BodyId, tier: usize, radius: f32, pos: Vec2) -> Self {
        Self {
            mode: BodyMode::Dynamic,
            is_dropped: true,
            ..Self::aiming(id, tier, radius, pos)
        }
    }

    pub fn tier(&self) -> usize {
        self.tier
    }

    /// Heavier at higher tiers
    pub fn mass(&self) -> f32 {
        1.0 + self.tier as f32 * MASS_PER_TIER
    }

    /// Switch mode; going kinematic zeroes velocity
    pub fn set_kinematic(&mut self, kinematic: bool) {
        if kinematic {
            self.mode = BodyMode::Kinematic;
            self.vel = Vec2::ZERO;
        } else {
            self.mode = BodyMode::Dynamic;
        }
    }

    /// Release into physics
    pub fn drop_now(&mut self) {
        self.is_dropped = true;
        self.set_kinematic(false);
    }

    /// Alive, released and simulated
    pub fn is_settled(&self) -> bool {
        self.is_dropped && !self.has_merged
    }

    /// Can take part in a merge
    ///
    /// Same predicate as [`Body::is_settled`]; a held body never merges.
    pub fn is_mergeable(&self) -> bool {
        self.is_settled()
    }

    /// Clamp velocity magnitude; returns the clamped velocity if it changed
    ///
    /// Only applies to dropped dynamic bodies.
    pub fn clamp_velocity(&mut self, max_speed: f32) -> Option<Vec2> {
        if !self.is_dropped || self.mode == BodyMode::Kinematic {
            return None;
        }
        if self.vel.length_squared() > max_speed * max_speed {
            self.vel = self.vel.clamp_length_max(max_speed);
            Some(self.vel)
        } else {
            None
        }
    }
}
