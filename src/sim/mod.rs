//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by body ID)
//! - No rendering, audio or UI dependencies (events go out through a queue)

pub mod body;
pub mod catalog;
pub mod collision;
pub mod container;
pub mod drop;
pub mod events;
pub mod merge;
pub mod monitor;
pub mod physics;
pub mod session;
pub mod state;
pub mod tick;

pub use body::{Body, BodyId, BodyMode};
pub use catalog::{Tier, TierCatalog, TierDefinition, TierPool};
pub use collision::{CollisionResult, circle_circle_collision};
pub use container::Container;
pub use drop::{DropController, DropPhase};
pub use events::{EventQueue, GameEvent};
pub use merge::{MergeOutcome, MergeResolver};
pub use monitor::{GameOverMonitor, MonitorPhase};
pub use physics::{BoxPhysics, BoxPhysicsParams, ContactPair, PhysicsProvider};
pub use session::GameSession;
pub use state::{RunPhase, RunState, ScoreUpdate};
pub use tick::{FrameInput, tick};
