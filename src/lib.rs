//! Merge Drop - simulation core for a drop-and-merge physics puzzle
//!
//! Core modules:
//! - `sim`: Gameplay simulation (tiers, bodies, merges, drop cycle, game over)
//! - `platform`: Pointer mapping and frame timing
//! - `persistence`: Key-value preference storage
//! - `leaderboard`: Ranked-score store client with rate limiting
//! - `settings`: Player preferences
//! - `tuning`: Data-driven game balance

pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use leaderboard::{LeaderboardClient, LeaderboardEntry, LocalBoard, RankedScoreStore};
pub use persistence::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use settings::Settings;
pub use sim::{FrameInput, GameEvent, GameSession};
pub use tuning::GameTuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed physics timestep (50 Hz)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Highest tier that can ever be handed out as a fresh drop
    pub const MAX_DROP_TIER_CAP: usize = 4;
    /// Extra mass per tier (bigger bodies are heavier)
    pub const MASS_PER_TIER: f32 = 0.3;

    /// Key-value store keys
    pub const HIGH_SCORE_KEY: &str = "HighScore";
    pub const LAST_NICKNAME_KEY: &str = "LastNickname";
    pub const SFX_VOLUME_KEY: &str = "SFXVolume";
    pub const VOICE_VOLUME_KEY: &str = "VoiceVolume";
    pub const BGM_VOLUME_KEY: &str = "BGMVolume";
    pub const LEADERBOARD_KEY: &str = "LocalLeaderboard";
}

/// Midpoint of two positions
#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) * 0.5
}

/// Linear interpolation between two scalars
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
