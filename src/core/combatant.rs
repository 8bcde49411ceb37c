//! Combatant state: hit points, stance, Focus and the player's parry timer

use crate::core::rules;
use crate::core::{Side, Stance};
use serde::{Deserialize, Serialize};

/// State shared by both duelists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub side: Side,
    max_hp: i32,
    hp: i32,
    pub base_attack: f32,
    stance: Stance,
    /// True until the combatant successfully defends a hit of the current
    /// incoming attack sequence
    went_undefended: bool,
}

impl Combatant {
    pub fn new(side: Side, max_hp: i32, base_attack: f32, stance: Stance) -> Self {
        let max_hp = max_hp.max(1);
        Combatant {
            side,
            max_hp,
            hp: max_hp,
            base_attack,
            stance,
            went_undefended: true,
        }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    pub fn stance(&self) -> Stance {
        self.stance
    }

    pub fn set_stance(&mut self, stance: Stance) {
        self.stance = stance;
    }

    /// Apply damage, saturating at 0. Returns the HP actually removed.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0);
        let before = self.hp;
        self.hp = (self.hp - amount).clamp(0, self.max_hp);
        before - self.hp
    }

    /// Unparried hit damage in the current stance
    pub fn basic_damage(&self) -> i32 {
        rules::basic_damage(self.base_attack, self.stance)
    }

    /// Damage dealt through a parry (non-zero only in Flame)
    pub fn pierce_damage(&self) -> i32 {
        rules::pierce_damage(self.base_attack, self.stance)
    }

    /// Start tracking a new incoming attack sequence
    pub fn begin_defense(&mut self) {
        self.went_undefended = true;
    }

    /// Record a successful defense against the current sequence
    pub fn mark_defended(&mut self) {
        self.went_undefended = false;
    }

    pub fn went_undefended(&self) -> bool {
        self.went_undefended
    }

    /// Back to full health with the given stance
    pub fn restore(&mut self, stance: Stance) {
        self.hp = self.max_hp;
        self.stance = stance;
        self.went_undefended = true;
    }
}

/// Player Focus, always within `0..=Focus::MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Focus(u8);

impl Focus {
    pub const MAX: u8 = 6;

    pub fn new(value: u8) -> Self {
        Focus(value.min(Self::MAX))
    }

    pub fn full() -> Self {
        Focus(Self::MAX)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn can_afford(self, cost: u8) -> bool {
        self.0 >= cost
    }

    /// Pay `cost`; refuses (and leaves Focus untouched) when unaffordable
    pub fn spend(&mut self, cost: u8) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.0 -= cost;
        true
    }

    pub fn gain(&mut self) {
        self.0 = (self.0 + 1).min(Self::MAX);
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

impl Default for Focus {
    fn default() -> Self {
        Focus::full()
    }
}

/// Phase of the player's parry timer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParryPhase {
    /// A parry may be started
    Ready,
    /// Parry is up
    Active { remaining: f32 },
    /// Parry has ended, a new one is locked out
    Cooldown { remaining: f32 },
}

/// Player parry sub-state machine.
///
/// Runs in the background of the sequencer: `advance` is called once per tick
/// before the sequencer reads `is_parrying`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParryState {
    phase: ParryPhase,
    base_duration: f32,
    cooldown: f32,
}

impl ParryState {
    pub fn new(base_duration: f32, cooldown: f32) -> Self {
        ParryState {
            phase: ParryPhase::Ready,
            base_duration,
            cooldown,
        }
    }

    pub fn phase(&self) -> ParryPhase {
        self.phase
    }

    pub fn is_parrying(&self) -> bool {
        matches!(self.phase, ParryPhase::Active { .. })
    }

    pub fn can_parry(&self) -> bool {
        matches!(self.phase, ParryPhase::Ready)
    }

    /// Active window length for a stance
    pub fn duration_for(&self, stance: Stance) -> f32 {
        self.base_duration * stance.parry_duration_multiplier()
    }

    /// Raise the parry. Rejected while a previous parry or its cooldown runs.
    pub fn try_start(&mut self, stance: Stance) -> bool {
        if !self.can_parry() {
            return false;
        }
        self.phase = ParryPhase::Active {
            remaining: self.duration_for(stance),
        };
        true
    }

    /// Advance the background timer by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        match self.phase {
            ParryPhase::Ready => {}
            ParryPhase::Active { remaining } => {
                let left = remaining - dt;
                if left > 0.0 {
                    self.phase = ParryPhase::Active { remaining: left };
                } else {
                    // Overshoot eats into the cooldown
                    let cooldown_left = self.cooldown + left;
                    self.phase = if cooldown_left > 0.0 {
                        ParryPhase::Cooldown {
                            remaining: cooldown_left,
                        }
                    } else {
                        ParryPhase::Ready
                    };
                }
            }
            ParryPhase::Cooldown { remaining } => {
                let left = remaining - dt;
                self.phase = if left > 0.0 {
                    ParryPhase::Cooldown { remaining: left }
                } else {
                    ParryPhase::Ready
                };
            }
        }
    }

    /// Drop the active parry at the end of a hit.
    ///
    /// The re-arm instant is unchanged: the rest of the active window is
    /// folded into the cooldown.
    pub fn force_reset(&mut self) {
        if let ParryPhase::Active { remaining } = self.phase {
            self.phase = ParryPhase::Cooldown {
                remaining: remaining + self.cooldown,
            };
        }
    }

    /// Cancel everything and return to the safe default
    pub fn cancel(&mut self) {
        self.phase = ParryPhase::Ready;
    }
}

/// The player: shared combatant state plus Focus and parry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerCombatant {
    pub body: Combatant,
    pub focus: Focus,
    pub parry: ParryState,
}

impl PlayerCombatant {
    pub fn new(max_hp: i32, base_attack: f32, parry: ParryState) -> Self {
        PlayerCombatant {
            body: Combatant::new(Side::Player, max_hp, base_attack, Stance::Flame),
            focus: Focus::full(),
            parry,
        }
    }

    /// Switch stance; always drains Focus to 0
    pub fn change_stance(&mut self, stance: Stance) {
        self.body.set_stance(stance);
        self.focus.reset();
    }

    pub fn try_start_parry(&mut self) -> bool {
        let stance = self.body.stance();
        self.parry.try_start(stance)
    }

    /// Player Wind auto-counter damage against the enemy
    pub fn wind_counter_damage(&self, enemy_base_attack: f32) -> i32 {
        rules::round_damage(enemy_base_attack * rules::PLAYER_COUNTER_FACTOR)
    }

    pub fn restore(&mut self) {
        self.body.restore(Stance::Flame);
        self.focus = Focus::full();
        self.parry.cancel();
    }
}

/// The enemy: shared combatant state plus its innate parry chance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyCombatant {
    pub body: Combatant,
    pub base_parry: f32,
    initial_stance: Stance,
}

impl EnemyCombatant {
    pub fn new(max_hp: i32, base_attack: f32, base_parry: f32, stance: Stance) -> Self {
        EnemyCombatant {
            body: Combatant::new(Side::Enemy, max_hp, base_attack, stance),
            base_parry,
            initial_stance: stance,
        }
    }

    /// Enemy Wind auto-counter damage against the player
    pub fn wind_counter_damage(&self) -> i32 {
        rules::round_damage(self.body.base_attack * rules::ENEMY_COUNTER_FACTOR)
    }

    pub fn restore(&mut self) {
        self.body.restore(self.initial_stance);
    }
}
