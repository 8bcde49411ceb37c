//! Tunable encounter parameters
//!
//! Every constant of the duel lives here so encounters can be rebalanced
//! from a JSON file without touching the sequencer.

use crate::core::Stance;
use crate::game::timing::TimingBands;
use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stats for one combatant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatantConfig {
    pub max_hp: i32,
    pub base_attack: f32,
}

/// Real-time waits of the sequencer, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// After the readiness signal, before the first player turn
    pub settle: f32,
    /// After a player stance change
    pub stance_change: f32,
    /// After the minigame result is shown
    pub timing_reveal: f32,
    /// After each resolved hit (both sides)
    pub post_hit: f32,
    /// After a whole player attack
    pub attack_follow_through: f32,
    /// Between the end of the player turn and the enemy turn
    pub turn_handoff: f32,
    /// Between the two halves of Pattern3
    pub pattern_gap: f32,
    /// After an enemy stance change
    pub enemy_stance_change: f32,
    /// After the whole enemy turn
    pub enemy_follow_through: f32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig {
            settle: 1.0,
            stance_change: 1.0,
            timing_reveal: 0.4,
            post_hit: 1.0,
            attack_follow_through: 1.0,
            turn_handoff: 1.0,
            pattern_gap: 1.0,
            enemy_stance_change: 0.25,
            enemy_follow_through: 1.0,
        }
    }
}

impl PacingConfig {
    /// No pauses at all; handy for headless simulation
    pub fn instant() -> Self {
        PacingConfig {
            settle: 0.0,
            stance_change: 0.0,
            timing_reveal: 0.0,
            post_hit: 0.0,
            attack_follow_through: 0.0,
            turn_handoff: 0.0,
            pattern_gap: 0.0,
            enemy_stance_change: 0.0,
            enemy_follow_through: 0.0,
        }
    }

    fn all(&self) -> [(&'static str, f32); 9] {
        [
            ("settle", self.settle),
            ("stance_change", self.stance_change),
            ("timing_reveal", self.timing_reveal),
            ("post_hit", self.post_hit),
            ("attack_follow_through", self.attack_follow_through),
            ("turn_handoff", self.turn_handoff),
            ("pattern_gap", self.pattern_gap),
            ("enemy_stance_change", self.enemy_stance_change),
            ("enemy_follow_through", self.enemy_follow_through),
        ]
    }
}

/// Enemy behaviour weights. Pattern3 gets whatever the first two leave over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub pattern1_weight: f32,
    pub pattern2_weight: f32,
    pub stance_change_chance: f32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            pattern1_weight: 0.45,
            pattern2_weight: 0.45,
            stance_change_chance: 0.05,
        }
    }
}

/// Complete encounter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// Level the encounter belongs to (drives scene keys)
    pub level: u32,
    pub player: CombatantConfig,
    pub enemy: CombatantConfig,
    /// Stance the enemy starts each encounter in
    pub enemy_stance: Stance,
    /// Enemy parry chance against a Perfect hit
    pub base_enemy_parry: f32,
    pub timing_bands: TimingBands,
    /// Length of each enemy telegraph
    pub telegraph_window: f32,
    pub parry_base_duration: f32,
    pub parry_cooldown: f32,
    pub pacing: PacingConfig,
    pub policy: PolicyConfig,
}

impl Default for DuelConfig {
    fn default() -> Self {
        DuelConfig {
            level: 1,
            player: CombatantConfig {
                max_hp: 100,
                base_attack: 10.0,
            },
            enemy: CombatantConfig {
                max_hp: 100,
                base_attack: 8.0,
            },
            enemy_stance: Stance::None,
            base_enemy_parry: 0.10,
            timing_bands: TimingBands::default(),
            telegraph_window: 0.75,
            parry_base_duration: 0.2,
            parry_cooldown: 0.3,
            pacing: PacingConfig::default(),
            policy: PolicyConfig::default(),
        }
    }
}

impl DuelConfig {
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_player(mut self, max_hp: i32, base_attack: f32) -> Self {
        self.player = CombatantConfig {
            max_hp,
            base_attack,
        };
        self
    }

    pub fn with_enemy(mut self, max_hp: i32, base_attack: f32) -> Self {
        self.enemy = CombatantConfig {
            max_hp,
            base_attack,
        };
        self
    }

    pub fn with_enemy_stance(mut self, stance: Stance) -> Self {
        self.enemy_stance = stance;
        self
    }

    pub fn with_base_enemy_parry(mut self, chance: f32) -> Self {
        self.base_enemy_parry = chance;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timing_bands(mut self, bands: TimingBands) -> Self {
        self.timing_bands = bands;
        self
    }

    /// Parse a (possibly partial) JSON configuration; missing fields keep defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DuelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check that the configuration describes a playable encounter
    pub fn validate(&self) -> Result<()> {
        if self.player.max_hp <= 0 || self.enemy.max_hp <= 0 {
            return Err(DuelError::InvalidConfig(
                "max_hp must be positive".to_string(),
            ));
        }
        if self.player.base_attack < 0.0 || self.enemy.base_attack < 0.0 {
            return Err(DuelError::InvalidConfig(
                "base_attack must not be negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.base_enemy_parry) {
            return Err(DuelError::InvalidConfig(format!(
                "base_enemy_parry {} outside [0, 1]",
                self.base_enemy_parry
            )));
        }
        self.timing_bands.validate()?;

        let windows = [
            ("telegraph_window", self.telegraph_window),
            ("parry_base_duration", self.parry_base_duration),
            ("parry_cooldown", self.parry_cooldown),
        ];
        for (name, value) in windows.into_iter().chain(self.pacing.all()) {
            if !value.is_finite() || value < 0.0 {
                return Err(DuelError::InvalidConfig(format!(
                    "{name} must be a non-negative duration, got {value}"
                )));
            }
        }
        if self.telegraph_window <= 0.0 {
            return Err(DuelError::InvalidConfig(
                "telegraph_window must be positive".to_string(),
            ));
        }

        let p = &self.policy;
        for (name, value) in [
            ("pattern1_weight", p.pattern1_weight),
            ("pattern2_weight", p.pattern2_weight),
            ("stance_change_chance", p.stance_change_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DuelError::InvalidConfig(format!(
                    "{name} {value} outside [0, 1]"
                )));
            }
        }
        if p.pattern1_weight + p.pattern2_weight > 1.0 {
            return Err(DuelError::InvalidConfig(format!(
                "pattern1_weight + pattern2_weight = {} exceeds 1",
                p.pattern1_weight + p.pattern2_weight
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DuelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.player.max_hp, 100);
        assert_eq!(config.enemy.base_attack, 8.0);
        assert_eq!(config.telegraph_window, 0.75);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DuelConfig::from_json_str(r#"{ "level": 4, "base_enemy_parry": 0.2 }"#)
            .unwrap();
        assert_eq!(config.level, 4);
        assert_eq!(config.base_enemy_parry, 0.2);
        assert_eq!(config.pacing, PacingConfig::default());
        assert_eq!(config.policy.pattern1_weight, 0.45);
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = DuelConfig::default().with_enemy(0, 8.0);
        assert!(matches!(config.validate(), Err(DuelError::InvalidConfig(_))));

        let mut config = DuelConfig::default();
        config.pacing.post_hit = -1.0;
        assert!(config.validate().is_err());

        let mut config = DuelConfig::default();
        config.policy.pattern1_weight = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pattern_weights_leave_room_for_pattern3() {
        let mut config = DuelConfig::default();
        config.policy.pattern1_weight = 0.6;
        config.policy.pattern2_weight = 0.6;
        assert!(matches!(config.validate(), Err(DuelError::InvalidConfig(_))));

        // Weights that use up everything simply make Pattern3 unreachable
        config.policy.pattern1_weight = 0.5;
        config.policy.pattern2_weight = 0.5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let err = DuelConfig::from_json_str("{ level: ").unwrap_err();
        assert!(matches!(err, DuelError::SerializationError(_)));
    }
}
