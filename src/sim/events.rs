//! Notifications for the presentation, audio and UI layers
//!
//! The simulation never calls out to those layers; it queues events and the
//! host drains them once per frame.

use glam::Vec2;

/// Something the outside world may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Current score changed
    ScoreChanged { score: u64 },
    /// High score raised (already persisted)
    HighScoreChanged { score: u64 },
    /// The tier shown in the next-preview changed
    NextTierChanged { tier: usize },
    /// Run ended
    GameOver { score: u64 },
    /// Two max-tier bodies merged (or the debug trigger fired)
    MaxMerge { position: Vec2 },
    /// A new tier ladder was drawn
    TiersSelected,
    /// A body was released into the container
    Dropped { tier: usize },
    /// Two bodies fused into `tier` at `position`
    Merged { tier: usize, position: Vec2, radius: f32 },
}

/// Ordered event buffer
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        log::trace!("event: {:?}", event);
        self.events.push(event);
    }

    /// Take every queued event in emission order
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Look without consuming
    pub fn pending(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
