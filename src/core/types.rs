//! Strongly-typed duel vocabulary
//!
//! Stances, attack kinds, enemy patterns and timing grades. Every numeric rule
//! that depends only on one of these values lives next to the type.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Which combatant an event concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "Player"),
            Side::Enemy => write!(f, "Enemy"),
        }
    }
}

/// Elemental stance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Stance {
    /// No stance yet (initial enemy state)
    #[default]
    None,
    Stone,
    Wind,
    Flame,
}

impl Stance {
    /// Stances a combatant can actively switch into
    pub const CHOOSABLE: [Stance; 3] = [Stance::Stone, Stance::Wind, Stance::Flame];

    /// Multiplier on outgoing basic damage. `None` is neutral.
    pub fn damage_multiplier(self) -> f32 {
        match self {
            Stance::Stone => 0.7,
            Stance::Wind => 1.0,
            Stance::Flame => 1.3,
            Stance::None => 1.0,
        }
    }

    /// Multiplier on the active parry duration
    pub fn parry_duration_multiplier(self) -> f32 {
        match self {
            Stance::Stone => 1.25,
            Stance::Wind => 0.75,
            Stance::Flame => 1.0,
            Stance::None => 1.0,
        }
    }

    pub fn is_choosable(self) -> bool {
        self != Stance::None
    }

    /// Choosable stances other than `self` (two, or three when `self` is None)
    pub fn alternatives(self) -> SmallVec<[Stance; 3]> {
        Stance::CHOOSABLE
            .iter()
            .copied()
            .filter(|s| *s != self)
            .collect()
    }

    /// Special attack unlocked by this stance
    pub fn special(self) -> Option<AttackType> {
        match self {
            Stance::Stone => Some(AttackType::StoneSpecial),
            Stance::Wind => Some(AttackType::WindSpecial),
            Stance::Flame => Some(AttackType::FlameSpecial),
            Stance::None => None,
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stance::None => "None",
            Stance::Stone => "Stone",
            Stance::Wind => "Wind",
            Stance::Flame => "Flame",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Stance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Stance::None),
            "stone" => Ok(Stance::Stone),
            "wind" => Ok(Stance::Wind),
            "flame" => Ok(Stance::Flame),
            _ => Err(format!(
                "invalid stance '{s}' (expected: none, stone, wind, flame)"
            )),
        }
    }
}

/// Kind of player attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackType {
    Basic,
    Enhance,
    StoneSpecial,
    WindSpecial,
    FlameSpecial,
}

impl AttackType {
    pub const ALL: [AttackType; 5] = [
        AttackType::Basic,
        AttackType::Enhance,
        AttackType::StoneSpecial,
        AttackType::WindSpecial,
        AttackType::FlameSpecial,
    ];

    pub fn hit_count(self) -> u8 {
        match self {
            AttackType::Basic => 1,
            AttackType::Enhance => 2,
            AttackType::StoneSpecial => 2,
            AttackType::WindSpecial => 1,
            AttackType::FlameSpecial => 4,
        }
    }

    pub fn is_special(self) -> bool {
        matches!(
            self,
            AttackType::StoneSpecial | AttackType::WindSpecial | AttackType::FlameSpecial
        )
    }

    /// Focus paid when the attack is selected
    pub fn focus_cost(self) -> u8 {
        match self {
            AttackType::Basic => 0,
            AttackType::Enhance => 3,
            _ => 6,
        }
    }
}

impl fmt::Display for AttackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttackType::Basic => "Basic",
            AttackType::Enhance => "Enhance",
            AttackType::StoneSpecial => "Stone Special",
            AttackType::WindSpecial => "Wind Special",
            AttackType::FlameSpecial => "Flame Special",
        };
        write!(f, "{name}")
    }
}

/// A single enemy strike: which animation set it belongs to and its index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyStrike {
    /// Animation set (1 or 2)
    pub pattern_id: u8,
    /// 1-based hit index within the set
    pub hit: u8,
}

impl EnemyStrike {
    pub const fn new(pattern_id: u8, hit: u8) -> Self {
        EnemyStrike { pattern_id, hit }
    }
}

/// Enemy attack pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyPattern {
    Pattern1,
    Pattern2,
    /// Pattern2's hits, a pause, then Pattern1's hits
    Pattern3,
}

impl EnemyPattern {
    /// Strikes in order of delivery
    pub fn strikes(self) -> SmallVec<[EnemyStrike; 4]> {
        const P1: [EnemyStrike; 2] = [EnemyStrike::new(1, 1), EnemyStrike::new(1, 2)];
        const P2: [EnemyStrike; 2] = [EnemyStrike::new(2, 1), EnemyStrike::new(2, 2)];
        let mut strikes = SmallVec::new();
        match self {
            EnemyPattern::Pattern1 => strikes.extend_from_slice(&P1),
            EnemyPattern::Pattern2 => strikes.extend_from_slice(&P2),
            EnemyPattern::Pattern3 => {
                strikes.extend_from_slice(&P2);
                strikes.extend_from_slice(&P1);
            }
        }
        strikes
    }

    pub fn hit_count(self) -> usize {
        self.strikes().len()
    }
}

/// Grade produced by the timing minigame for one hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimingResult {
    Perfect,
    SmallMiss,
    MediumMiss,
    Failed,
}

impl TimingResult {
    /// Added to the enemy's base parry chance
    pub fn parry_bonus(self) -> f32 {
        match self {
            TimingResult::Perfect => 0.0,
            TimingResult::SmallMiss => 0.25,
            TimingResult::MediumMiss => 0.50,
            TimingResult::Failed => 1.0,
        }
    }
}

impl fmt::Display for TimingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimingResult::Perfect => "Perfect",
            TimingResult::SmallMiss => "Small Miss",
            TimingResult::MediumMiss => "Medium Miss",
            TimingResult::Failed => "Failed",
        };
        write!(f, "{name}")
    }
}

/// Scene identifier handed to the transition collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneKey(String);

impl SceneKey {
    pub fn new(s: impl Into<String>) -> Self {
        SceneKey(s.into())
    }

    /// Key for a numbered level
    pub fn level(level: u32) -> Self {
        SceneKey(format!("Level_{level}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
