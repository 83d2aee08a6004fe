//! Tier catalog: the merge ladder drawn for each run
//!
//! A run plays with `level_count` tiers picked at random from a larger pool.
//! Size and score are derived from the tier index, not stored per entry:
//! radius follows a quadratic ease so late tiers grow faster, score grows
//! linearly.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_DROP_TIER_CAP;
use crate::lerp;
use crate::persistence::StoreError;
use crate::tuning::{CatalogParams, LadderOrder};

/// One entry of the content pool
///
/// Asset handles are opaque to the simulation; the presentation layer
/// resolves them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDefinition {
    /// Display name
    pub name: String,
    /// Sprite handle
    #[serde(default)]
    pub sprite: Option<String>,
    /// Merge sound handle
    #[serde(default)]
    pub merge_sound: Option<String>,
    /// Voice clip handle
    #[serde(default)]
    pub voice_clip: Option<String>,
    /// Merge effect tint (linear RGB)
    #[serde(default = "white")]
    pub effect_color: [f32; 3],
}

fn white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl TierDefinition {
    pub fn new(name: impl Into<String>, effect_color: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            sprite: None,
            merge_sound: None,
            voice_clip: None,
            effect_color,
        }
    }
}

/// The full content pool runs draw from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierPool {
    pub entries: Vec<TierDefinition>,
}

const BUILTIN_POOL: [(&str, [f32; 3]); 28] = [
    ("Slime", [0.0, 1.0, 0.0]),
    ("Goblin", [0.0, 1.0, 1.0]),
    ("Skeleton", [0.0, 0.0, 1.0]),
    ("Orc", [1.0, 0.0, 1.0]),
    ("Minotaur", [1.0, 0.0, 0.0]),
    ("Dragon", [1.0, 0.5, 0.0]),
    ("Phoenix", [1.0, 0.92, 0.016]),
    ("Unicorn", [0.5, 0.0, 1.0]),
    ("Titan", [1.0, 1.0, 1.0]),
    ("Valkyrie", [1.0, 0.84, 0.0]),
    ("God", [1.0, 1.0, 0.8]),
    ("Fairy", [0.8, 0.5, 1.0]),
    ("Vampire", [0.6, 0.0, 0.0]),
    ("Werewolf", [0.4, 0.3, 0.2]),
    ("Golem", [0.5, 0.5, 0.5]),
    ("Elf", [0.3, 0.8, 0.3]),
    ("Dwarf", [0.7, 0.5, 0.3]),
    ("Mermaid", [0.2, 0.6, 0.9]),
    ("Demon", [0.5, 0.0, 0.2]),
    ("Angel", [1.0, 1.0, 0.6]),
    ("Sphinx", [0.9, 0.8, 0.2]),
    ("Griffin", [0.8, 0.6, 0.2]),
    ("Hydra", [0.2, 0.5, 0.2]),
    ("Kraken", [0.1, 0.3, 0.6]),
    ("Yeti", [0.9, 0.9, 1.0]),
    ("Chimera", [0.7, 0.2, 0.3]),
    ("Basilisk", [0.4, 0.6, 0.1]),
    ("Leviathan", [0.1, 0.2, 0.4]),
];

impl TierPool {
    pub fn new(entries: Vec<TierDefinition>) -> Self {
        Self { entries }
    }

    /// The 28-character pool the game ships with
    pub fn builtin() -> Self {
        let entries = BUILTIN_POOL
            .iter()
            .map(|(name, color)| {
                let mut def = TierDefinition::new(*name, *color);
                def.sprite = Some(format!("characters/{}", name.to_lowercase()));
                def
            })
            .collect();
        Self { entries }
    }

    /// Parse a pool from a JSON array of definitions
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let entries: Vec<TierDefinition> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pick `count` entries by Fisher-Yates permutation of the whole pool
///
/// Reshuffles on every call. `count` larger than the pool is clamped.
pub fn select_random_subset<T: Clone, R: Rng + ?Sized>(
    pool: &[T],
    count: usize,
    order: LadderOrder,
    rng: &mut R,
) -> Vec<T> {
    let count = count.min(pool.len());
    let mut indices: Vec<usize> = (0..pool.len()).collect();
    indices.shuffle(rng);
    indices.truncate(count);
    if order == LadderOrder::Pool {
        indices.sort_unstable();
    }
    indices.into_iter().map(|i| pool[i].clone()).collect()
}

/// A rung on the ladder of the current run
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub index: usize,
    pub definition: TierDefinition,
    pub radius: f32,
    pub score: u64,
}

/// The tier ladder for the current run
#[derive(Debug, Clone)]
pub struct TierCatalog {
    pool: TierPool,
    params: CatalogParams,
    ladder: Vec<Tier>,
}

impl TierCatalog {
    /// Build a catalog and draw the first ladder
    pub fn new<R: Rng + ?Sized>(pool: TierPool, params: CatalogParams, rng: &mut R) -> Self {
        if params.level_count > pool.len() {
            log::warn!(
                "level_count {} exceeds pool size {}, clamping",
                params.level_count,
                pool.len()
            );
        }
        let mut catalog = Self {
            pool,
            params,
            ladder: Vec::new(),
        };
        catalog.select_random_subset(rng);
        catalog
    }

    /// Redraw the ladder from the pool (reroll)
    pub fn select_random_subset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let picked = select_random_subset(
            &self.pool.entries,
            self.params.level_count,
            self.params.ladder_order,
            rng,
        );
        let max_tier = picked.len().saturating_sub(1);
        self.ladder = picked
            .into_iter()
            .enumerate()
            .map(|(index, definition)| Tier {
                index,
                radius: radius_for(&self.params, index, max_tier),
                score: score_for(&self.params, index),
                definition,
            })
            .collect();
        log::info!(
            "Selected {} tiers: {}",
            self.ladder.len(),
            self.ladder
                .iter()
                .map(|t| t.definition.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    pub fn params(&self) -> &CatalogParams {
        &self.params
    }

    pub fn pool(&self) -> &TierPool {
        &self.pool
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.ladder
    }

    pub fn len(&self) -> usize {
        self.ladder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ladder.is_empty()
    }

    /// Highest tier index of the current ladder
    pub fn max_tier(&self) -> usize {
        self.ladder.len().saturating_sub(1)
    }

    /// Highest tier handed out as a fresh drop
    pub fn max_drop_level(&self) -> usize {
        MAX_DROP_TIER_CAP.min(self.max_tier())
    }

    pub fn get(&self, tier: usize) -> Option<&Tier> {
        self.ladder.get(tier)
    }

    /// The tier a merge at `tier` produces
    pub fn next(&self, tier: usize) -> Option<&Tier> {
        self.get(tier.checked_add(1)?)
    }

    pub fn is_max_tier(&self, tier: usize) -> bool {
        !self.ladder.is_empty() && tier == self.max_tier()
    }

    pub fn radius(&self, tier: usize) -> Option<f32> {
        self.get(tier).map(|t| t.radius)
    }

    pub fn score(&self, tier: usize) -> Option<u64> {
        self.get(tier).map(|t| t.score)
    }

    pub fn max_merge_bonus(&self) -> u64 {
        self.params.max_merge_bonus
    }

    /// Uniform pick in `[0, max_drop_level]`
    pub fn random_drop_tier<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.random_range(0..=self.max_drop_level())
    }
}

/// Quadratic ease between min and max radius
fn radius_for(params: &CatalogParams, tier: usize, max_tier: usize) -> f32 {
    let t = if max_tier == 0 {
        0.0
    } else {
        tier as f32 / max_tier as f32
    };
    lerp(params.min_radius, params.max_radius, t * t)
}

fn score_for(params: &CatalogParams, tier: usize) -> u64 {
    params.base_score + params.score_per_level * tier as u64
}
