//! Merge resolution
//!
//! Contact callbacks arrive from both participants of a touching pair. Only
//! the side whose id is lower proceeds, so each pair merges exactly once per
//! step regardless of callback order. Consumed bodies are tombstoned with
//! `has_merged` and removed by the caller at the end of the step.

use std::collections::BTreeMap;

use glam::Vec2;

use super::body::{Body, BodyId};
use super::catalog::TierCatalog;
use super::container::Container;
use super::physics::ContactPair;
use crate::midpoint;

/// What a merge produced
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// Two bodies fused into one of the next tier
    TierUp {
        consumed: [BodyId; 2],
        /// Tier of the replacement body
        tier: usize,
        /// Spawn position, already clamped inside the container
        position: Vec2,
        radius: f32,
        score: u64,
    },
    /// Two max-tier bodies vanished in a celebration
    MaxMerge {
        consumed: [BodyId; 2],
        position: Vec2,
        bonus: u64,
    },
}

impl MergeOutcome {
    pub fn consumed(&self) -> [BodyId; 2] {
        match self {
            MergeOutcome::TierUp { consumed, .. } | MergeOutcome::MaxMerge { consumed, .. } => *consumed,
        }
    }

    pub fn points(&self) -> u64 {
        match self {
            MergeOutcome::TierUp { score, .. } => *score,
            MergeOutcome::MaxMerge { bonus, .. } => *bonus,
        }
    }
}

/// Decides whether touching bodies fuse
#[derive(Debug, Clone, Default)]
pub struct MergeResolver {
    merges: u64,
    max_merges: u64,
}

impl MergeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tier-up merges resolved so far
    pub fn merge_count(&self) -> u64 {
        self.merges
    }

    /// Max-tier celebrations resolved so far
    pub fn max_merge_count(&self) -> u64 {
        self.max_merges
    }

    pub fn reset(&mut self) {
        self.merges = 0;
        self.max_merges = 0;
    }

    /// Guard chain for a contact seen from `body`
    ///
    /// Both released, neither consumed, same tier, and `body` holds the
    /// lower id.
    pub fn accepts(body: &Body, other: &Body) -> bool {
        body.id != other.id
            && body.is_mergeable()
            && other.is_mergeable()
            && body.tier() == other.tier()
            && body.id < other.id
    }

    /// Handle one contact callback
    ///
    /// Returns `None` for every rejected contact; that is the normal case,
    /// not an error. On acceptance both bodies are tombstoned before the
    /// outcome is returned.
    pub fn on_collision(
        &mut self,
        bodies: &mut BTreeMap<BodyId, Body>,
        contact: ContactPair,
        catalog: &TierCatalog,
        container: &Container,
    ) -> Option<MergeOutcome> {
        let body = bodies.get(&contact.body)?;
        let other = bodies.get(&contact.other)?;
        if !Self::accepts(body, other) {
            return None;
        }

        let tier = body.tier();
        let center = midpoint(body.pos, other.pos);
        let consumed = [body.id, other.id];

        let outcome = if catalog.is_max_tier(tier) {
            MergeOutcome::MaxMerge {
                consumed,
                position: center,
                bonus: catalog.max_merge_bonus(),
            }
        } else {
            let next = catalog.next(tier)?;
            MergeOutcome::TierUp {
                consumed,
                tier: next.index,
                position: container.clamp_inside(center, next.radius),
                radius: next.radius,
                score: next.score,
            }
        };

        for id in consumed {
            if let Some(b) = bodies.get_mut(&id) {
                b.has_merged = true;
            }
        }

        match outcome {
            MergeOutcome::TierUp { tier: new_tier, .. } => {
                self.merges += 1;
                log::debug!("Merged {:?} + {:?}: tier {} -> {}", consumed[0], consumed[1], tier, new_tier);
            }
            MergeOutcome::MaxMerge { .. } => {
                self.max_merges += 1;
                log::info!("Max merge at tier {}", tier);
            }
        }

        Some(outcome)
    }
}
