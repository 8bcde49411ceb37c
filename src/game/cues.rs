//! Animation cue table
//!
//! Maps combat moments to opaque cue identifiers understood by the
//! presentation layer. The sequencer only ever looks cues up here.

use crate::core::{AttackType, EnemyStrike, Side, Stance};
use rustc_hash::FxHashMap;

/// Whether a cue belongs to the wind-up or the strike itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CuePhase {
    Telegraph,
    Attack,
}

/// Non-attack reactions shared by both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reaction {
    Hit,
    Parried,
    Pierced,
    Countered,
    Death,
}

#[derive(Debug, Clone)]
pub struct CueTable {
    player: FxHashMap<(AttackType, u8, CuePhase), String>,
    enemy: FxHashMap<(u8, u8, CuePhase), String>,
}

impl CueTable {
    pub fn new() -> Self {
        CueTable {
            player: FxHashMap::default(),
            enemy: FxHashMap::default(),
        }
    }

    pub fn insert_player(&mut self, attack: AttackType, hit: u8, phase: CuePhase, cue: impl Into<String>) {
        self.player.insert((attack, hit, phase), cue.into());
    }

    pub fn insert_enemy(&mut self, pattern_id: u8, hit: u8, phase: CuePhase, cue: impl Into<String>) {
        self.enemy.insert((pattern_id, hit, phase), cue.into());
    }

    /// Cue for a player hit; unknown hits fall back to the attack's first cue
    pub fn player_cue(&self, attack: AttackType, hit: u8, phase: CuePhase) -> Option<&str> {
        self.player
            .get(&(attack, hit, phase))
            .or_else(|| self.player.get(&(attack, 1, phase)))
            .map(String::as_str)
    }

    pub fn enemy_cue(&self, strike: EnemyStrike, phase: CuePhase) -> Option<&str> {
        self.enemy
            .get(&(strike.pattern_id, strike.hit, phase))
            .map(String::as_str)
    }

    pub fn idle_cue(stance: Stance) -> &'static str {
        match stance {
            Stance::Stone => "StoneIdle",
            Stance::Wind => "WindIdle",
            Stance::Flame => "FlameIdle",
            Stance::None => "IdleNoStance",
        }
    }

    pub fn stance_change_cue(stance: Stance) -> &'static str {
        match stance {
            Stance::Stone => "StoneStance",
            Stance::Wind => "WindStance",
            Stance::Flame => "FlameStance",
            Stance::None => "IdleNoStance",
        }
    }

    /// Effect played on the enemy after a stance special
    pub fn special_effect_cue(stance: Stance) -> Option<&'static str> {
        match stance {
            Stance::Stone => Some("StoneEffect"),
            Stance::Wind => Some("WindEffect"),
            Stance::Flame => Some("FlameEffect"),
            Stance::None => None,
        }
    }

    pub fn reaction_cue(reaction: Reaction) -> &'static str {
        match reaction {
            Reaction::Hit | Reaction::Pierced => "Hit",
            Reaction::Parried => "Parry",
            Reaction::Countered => "Counter",
            Reaction::Death => "Death",
        }
    }

    /// Floating text and sound for a reaction on `side`; death has neither
    pub fn reaction_feedback(side: Side, reaction: Reaction) -> Option<(&'static str, &'static str)> {
        let feedback = match (side, reaction) {
            (_, Reaction::Death) => return None,
            (_, Reaction::Hit) => ("Hit!", "Hit"),
            (_, Reaction::Countered) => ("Counter!", "Counter"),
            (Side::Player, Reaction::Parried) => ("Parried!", "Parry"),
            (Side::Enemy, Reaction::Parried) => ("Parried", "Parry"),
            (Side::Player, Reaction::Pierced) => ("Pierced!", "Counter"),
            (Side::Enemy, Reaction::Pierced) => ("Pierced!", "Pierced"),
        };
        Some(feedback)
    }
}

impl Default for CueTable {
    fn default() -> Self {
        let mut table = CueTable::new();

        let player_cues: [(AttackType, &str, u8); 5] = [
            (AttackType::Basic, "BasicAttack", 1),
            (AttackType::Enhance, "EnhanceAttack", 2),
            (AttackType::StoneSpecial, "StoneSpecial", 2),
            (AttackType::WindSpecial, "WindSpecial", 1),
            (AttackType::FlameSpecial, "FlameSpecial", 4),
        ];
        for (attack, stem, hits) in player_cues {
            for hit in 1..=hits {
                table.insert_player(attack, hit, CuePhase::Telegraph, format!("{stem}Telegraph_{hit}"));
                table.insert_player(attack, hit, CuePhase::Attack, format!("{stem}_{hit}"));
            }
        }

        for pattern_id in 1..=2u8 {
            for hit in 1..=2u8 {
                table.insert_enemy(
                    pattern_id,
                    hit,
                    CuePhase::Telegraph,
                    format!("EnemyTelegraph{pattern_id}_{hit}"),
                );
                table.insert_enemy(
                    pattern_id,
                    hit,
                    CuePhase::Attack,
                    format!("EnemyAttack{pattern_id}_{hit}"),
                );
            }
        }

        table
    }
}
