//! Data-driven game balance
//!
//! Every knob has a default matching the shipped game, so a tuning file only
//! needs to name the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::StoreError;

/// How the shuffled pool is turned into a tier ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LadderOrder {
    /// Ladder follows the shuffle order
    #[default]
    Shuffled,
    /// Selected entries keep their relative pool order
    Pool,
}

/// Tier catalog parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogParams {
    /// Number of tiers drawn from the pool per run
    pub level_count: usize,
    /// Radius of tier 0
    pub min_radius: f32,
    /// Radius of the max tier
    pub max_radius: f32,
    /// Score of tier 0
    pub base_score: u64,
    /// Score added per tier
    pub score_per_level: u64,
    /// Awarded when two max-tier bodies merge
    pub max_merge_bonus: u64,
    pub ladder_order: LadderOrder,
}

impl Default for CatalogParams {
    fn default() -> Self {
        Self {
            level_count: 11,
            min_radius: 0.2,
            max_radius: 0.8,
            base_score: 10,
            score_per_level: 10,
            max_merge_bonus: 500,
            ladder_order: LadderOrder::Shuffled,
        }
    }
}

/// Complete gameplay tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTuning {
    // === Drop cycle ===
    /// Seconds between a drop and the next spawn
    pub drop_cooldown: f32,
    /// Drop lane bounds (world X)
    pub drop_min_x: f32,
    pub drop_max_x: f32,
    /// Height of the drop lane (world Y)
    pub drop_y: f32,

    // === Game over ===
    /// Threshold line (world Y)
    pub game_over_line_y: f32,
    /// Seconds a breach must be sustained
    pub game_over_delay: f32,

    // === Container ===
    pub container_width: f32,
    pub container_height: f32,
    /// Container center (world X, Y)
    pub container_center: (f32, f32),

    // === Physics ===
    /// Post-drop velocity clamp
    pub max_velocity: f32,
    /// Downward acceleration used by the bundled physics provider
    pub gravity: f32,

    // === Catalog ===
    pub catalog: CatalogParams,

    // === Leaderboard ===
    /// Client-side cooldown between fetches (seconds)
    pub fetch_cooldown: f32,
    /// Number of rows requested per fetch
    pub fetch_limit: usize,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            drop_cooldown: 0.5,
            drop_min_x: -2.2,
            drop_max_x: 2.2,
            drop_y: 4.5,

            game_over_line_y: 4.0,
            game_over_delay: 2.0,

            container_width: 5.0,
            container_height: 7.5,
            container_center: (0.0, 0.0),

            max_velocity: 12.0,
            gravity: -9.81,

            catalog: CatalogParams::default(),

            fetch_cooldown: 15.0,
            fetch_limit: 20,
        }
    }
}

impl GameTuning {
    /// Parse tuning from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let tuning: Self = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from a file, falling back to defaults when missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(err) => {
                log::warn!("Using default tuning ({}): {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Repair values that would break the simulation
    pub fn sanitized(mut self) -> Self {
        if self.drop_min_x > self.drop_max_x {
            std::mem::swap(&mut self.drop_min_x, &mut self.drop_max_x);
        }
        if self.catalog.min_radius > self.catalog.max_radius {
            std::mem::swap(&mut self.catalog.min_radius, &mut self.catalog.max_radius);
        }
        self.drop_cooldown = self.drop_cooldown.max(0.0);
        self.game_over_delay = self.game_over_delay.max(0.0);
        self.max_velocity = self.max_velocity.abs();
        self.fetch_cooldown = self.fetch_cooldown.max(0.0);
        self.catalog.level_count = self.catalog.level_count.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_game() {
        let tuning = GameTuning::default();
        assert_eq!(tuning.drop_cooldown, 0.5);
        assert_eq!(tuning.game_over_delay, 2.0);
        assert_eq!(tuning.catalog.level_count, 11);
        assert_eq!(tuning.catalog.max_merge_bonus, 500);
        assert_eq!(tuning.fetch_cooldown, 15.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning =
            GameTuning::from_json(r#"{ "drop_cooldown": 1.25, "catalog": { "level_count": 6 } }"#)
                .unwrap();
        assert_eq!(tuning.drop_cooldown, 1.25);
        assert_eq!(tuning.catalog.level_count, 6);
        assert_eq!(tuning.catalog.base_score, 10);
        assert_eq!(tuning.drop_y, 4.5);
    }

    #[test]
    fn test_sanitize_swaps_inverted_lane() {
        let tuning = GameTuning::from_json(r#"{ "drop_min_x": 3.0, "drop_max_x": -1.0 }"#).unwrap();
        assert_eq!(tuning.drop_min_x, -1.0);
        assert_eq!(tuning.drop_max_x, 3.0);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(GameTuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_ladder_order_round_trip_name() {
        let tuning = GameTuning::from_json(r#"{ "catalog": { "ladder_order": "Pool" } }"#).unwrap();
        assert_eq!(tuning.catalog.ladder_order, LadderOrder::Pool);
    }
}
