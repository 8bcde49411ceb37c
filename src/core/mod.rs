//! Core duel types and combatants

pub mod combatant;
pub mod rules;
pub mod types;

pub use combatant::{Combatant, EnemyCombatant, Focus, ParryPhase, ParryState, PlayerCombatant};
pub use types::{AttackType, EnemyPattern, EnemyStrike, SceneKey, Side, Stance, TimingResult};
