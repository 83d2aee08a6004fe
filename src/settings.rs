//! Player settings and preferences
//!
//! Persisted through the key-value store, separately from run state.

use serde::{Deserialize, Serialize};

use crate::consts::{BGM_VOLUME_KEY, LAST_NICKNAME_KEY, SFX_VOLUME_KEY, VOICE_VOLUME_KEY};
use crate::persistence::KeyValueStore;

/// Name used when a player submits without typing one
pub const ANONYMOUS_NICKNAME: &str = "Anonymous";

/// Maximum nickname length (characters)
pub const MAX_NICKNAME_LEN: usize = 16;

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    // === Audio ===
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Character voice volume (0.0 - 1.0)
    pub voice_volume: f32,
    /// Background music volume (0.0 - 1.0)
    pub bgm_volume: f32,

    // === Leaderboard ===
    /// Last nickname used for a score submission
    pub last_nickname: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sfx_volume: 1.0,
            voice_volume: 1.0,
            bgm_volume: 0.5,
            last_nickname: String::new(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults per key
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();
        let settings = Self {
            sfx_volume: store.get_float(SFX_VOLUME_KEY, defaults.sfx_volume).clamp(0.0, 1.0),
            voice_volume: store
                .get_float(VOICE_VOLUME_KEY, defaults.voice_volume)
                .clamp(0.0, 1.0),
            bgm_volume: store.get_float(BGM_VOLUME_KEY, defaults.bgm_volume).clamp(0.0, 1.0),
            last_nickname: store.get_string(LAST_NICKNAME_KEY, &defaults.last_nickname),
        };
        log::info!("Loaded settings");
        settings
    }

    /// Write every setting and flush
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        store.set_float(SFX_VOLUME_KEY, self.sfx_volume);
        store.set_float(VOICE_VOLUME_KEY, self.voice_volume);
        store.set_float(BGM_VOLUME_KEY, self.bgm_volume);
        store.set_string(LAST_NICKNAME_KEY, &self.last_nickname);
        store.save();
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_voice_volume(&mut self, volume: f32) {
        self.voice_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_bgm_volume(&mut self, volume: f32) {
        self.bgm_volume = volume.clamp(0.0, 1.0);
    }

    /// Remember a nickname, returning the name that will actually be used
    pub fn remember_nickname(&mut self, raw: &str) -> String {
        let nickname = normalize_nickname(raw);
        self.last_nickname = nickname.clone();
        nickname
    }
}

/// Trim a nickname; blank becomes anonymous, overlong is cut
pub fn normalize_nickname(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        ANONYMOUS_NICKNAME.to_string()
    } else {
        trimmed.chars().take(MAX_NICKNAME_LEN).collect()
    }
}
