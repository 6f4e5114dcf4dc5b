use std::path::Path;

use anyhow::Result;
use cadence_types::KeyBindings;
use serde::{Deserialize, Serialize};

use crate::params::SessionParams;

/// Scene-wide recovery challenge parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct RecoveryConfig {
    /// Target-key presses needed to finish the challenge.
    pub required_successes: u32,
    /// Real-time pause between the last press and resuming the scene.
    pub reaction_delay_us: i64,
    /// Global time scale while the scene is suspended.
    pub slow_time_scale: f64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            required_successes: 3,
            reaction_delay_us: 300_000,
            slow_time_scale: 0.2,
        }
    }
}

impl RecoveryConfig {
    pub fn validate(&mut self) {
        self.required_successes = self.required_successes.clamp(1, 100);
        self.reaction_delay_us = self.reaction_delay_us.clamp(0, 10_000_000);
        if !self.slow_time_scale.is_finite() {
            self.slow_time_scale = RecoveryConfig::default().slow_time_scale;
        }
        // slowed, never halted
        self.slow_time_scale = self.slow_time_scale.clamp(0.01, 1.0);
    }
}

/// Engine configuration (cadence.json).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct EngineConfig {
    pub session: SessionParams,
    pub bindings: KeyBindings,
    pub recovery: RecoveryConfig,
    /// Request a scene-wide recovery whenever a session misses.
    pub scene_recovery_on_miss: bool,
    /// Key prefix for persisted modifiers and pending effects.
    pub modifier_prefix: String,
    /// Seed for the autoplay RNG. `None` seeds from entropy.
    pub autoplay_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session: SessionParams::default(),
            bindings: KeyBindings::default(),
            recovery: RecoveryConfig::default(),
            scene_recovery_on_miss: false,
            modifier_prefix: "player1".to_string(),
            autoplay_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&mut self) {
        self.session.validate();
        self.recovery.validate();
        if self.modifier_prefix.is_empty() {
            self.modifier_prefix = "player1".to_string();
        }
    }

    /// Read config from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let mut config: EngineConfig = serde_json::from_str(&data)?;
        config.validate();
        Ok(config)
    }

    /// Write config to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
