//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives here so a run can be
//! rebalanced from a JSON file without recompiling. Missing fields fall back
//! to the defaults in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors from loading or validating a tuning file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// How the camera relates to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CameraMode {
    /// Camera pinned at the origin, player clamped inside the viewport
    Fixed,
    /// Camera keeps the player centered, world is unbounded
    #[default]
    Follow,
}

/// Where new enemies appear relative to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpawnPattern {
    /// Circle enclosing the viewport
    #[default]
    Ring,
    /// Just past a random viewport edge
    Edges,
}

/// Game balance knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub camera_mode: CameraMode,
    pub spawn_pattern: SpawnPattern,
    pub view_width: f32,
    pub view_height: f32,

    // === Player ===
    pub player_radius: f32,
    pub player_speed: f32,
    pub player_max_hp: u32,
    pub contact_damage: u32,
    pub damage_cooldown_ticks: u32,
    /// Max HP gained per health upgrade
    pub max_health_step: u32,

    // === Enemies ===
    /// Hard cap on pursuit speed (px/s)
    pub enemy_max_speed: f32,
    /// Speed added per point of score (px/s)
    pub enemy_speed_ramp: f32,
    /// Alpha lost per tick while vanishing
    pub vanish_fade_per_tick: f32,

    // === Spawning ===
    pub spawn_interval_ticks: u32,
    pub spawn_interval_min_ticks: u32,
    /// Interval ticks shaved off per elapsed second
    pub spawn_time_ramp: f32,
    /// Interval ticks shaved off per point of score
    pub spawn_score_ramp: f32,
    /// Seconds of play per extra enemy in a spawn group
    pub spawn_group_growth_secs: f32,
    pub spawn_group_max: u32,
    pub max_enemies: usize,
    /// Distance beyond the viewport where enemies appear
    pub spawn_margin: f32,

    // === Drops & progression ===
    pub exp_drop_chance: f64,
    pub gold_drop_chance: f64,
    pub pickup_range: f32,
    pub first_level_exp: u32,
    /// Multiplier applied to the level threshold after each level-up
    pub exp_growth: f32,
    /// Score values that each open the upgrade menu once (empty = off)
    pub score_thresholds: Vec<u64>,

    // === Bullets ===
    /// Distance outside the viewport before a bullet is culled
    pub bullet_cull_margin: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            camera_mode: CameraMode::Follow,
            spawn_pattern: SpawnPattern::Ring,
            view_width: VIEW_WIDTH,
            view_height: VIEW_HEIGHT,

            player_radius: PLAYER_RADIUS,
            player_speed: PLAYER_SPEED,
            player_max_hp: PLAYER_MAX_HP,
            contact_damage: CONTACT_DAMAGE,
            damage_cooldown_ticks: DAMAGE_COOLDOWN_TICKS,
            max_health_step: 5,

            enemy_max_speed: 240.0,
            enemy_speed_ramp: 0.5,
            vanish_fade_per_tick: 0.05,

            spawn_interval_ticks: 90,
            spawn_interval_min_ticks: 15,
            spawn_time_ramp: 0.5,
            spawn_score_ramp: 0.25,
            spawn_group_growth_secs: 30.0,
            spawn_group_max: 6,
            max_enemies: 150,
            spawn_margin: 40.0,

            exp_drop_chance: 1.0,
            gold_drop_chance: 0.3,
            pickup_range: 40.0,
            first_level_exp: FIRST_LEVEL_EXP,
            exp_growth: 1.5,
            score_thresholds: Vec::new(),

            bullet_cull_margin: 64.0,
        }
    }
}

/// Score milestones of the score-driven variant
pub const CLASSIC_SCORE_THRESHOLDS: [u64; 6] = [10, 50, 100, 200, 500, 1000];

impl Tuning {
    /// Defaults plus an upgrade menu at each classic score milestone
    pub fn score_driven() -> Self {
        Self {
            score_thresholds: CLASSIC_SCORE_THRESHOLDS.to_vec(),
            ..Self::default()
        }
    }

    /// Parse and validate tuning from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file on disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.view_width <= 0.0 || self.view_height <= 0.0 {
            return invalid("viewport must have positive size");
        }
        if self.player_radius <= 0.0 || self.player_speed < 0.0 {
            return invalid("player radius must be positive and speed non-negative");
        }
        if self.player_max_hp == 0 {
            return invalid("player_max_hp must be at least 1");
        }
        if self.first_level_exp == 0 {
            return invalid("first_level_exp must be at least 1");
        }
        if self.exp_growth < 1.0 {
            return invalid("exp_growth below 1.0 would shrink level thresholds");
        }
        if !(0.0..=1.0).contains(&self.exp_drop_chance)
            || !(0.0..=1.0).contains(&self.gold_drop_chance)
        {
            return invalid("drop chances must be within [0, 1]");
        }
        if self.vanish_fade_per_tick <= 0.0 {
            return invalid("vanish_fade_per_tick must be positive");
        }
        if self.spawn_interval_min_ticks == 0
            || self.spawn_interval_min_ticks > self.spawn_interval_ticks
        {
            return invalid("spawn interval floor must be in 1..=spawn_interval_ticks");
        }
        if self.spawn_group_max == 0 {
            return invalid("spawn_group_max must be at least 1");
        }
        if self.score_thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return invalid("score_thresholds must be strictly ascending");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "player_speed": 120.0, "camera_mode": "Fixed" }"#)
            .expect("valid tuning");
        assert_eq!(tuning.player_speed, 120.0);
        assert_eq!(tuning.camera_mode, CameraMode::Fixed);
        assert_eq!(tuning.player_max_hp, PLAYER_MAX_HP);
    }

    #[test]
    fn test_rejects_shrinking_exp_growth() {
        let err = Tuning::from_json(r#"{ "exp_growth": 0.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_unsorted_thresholds() {
        let err = Tuning::from_json(r#"{ "score_thresholds": [50, 10] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_score_driven_preset() {
        let tuning = Tuning::score_driven();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.score_thresholds.first(), Some(&10));
        assert!(Tuning::default().score_thresholds.is_empty());
    }

    #[test]
    fn test_malformed_json() {
        let err = Tuning::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
