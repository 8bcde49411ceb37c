//! Player controller trait and duel view
//!
//! This module defines the interface between the turn sequencer and whatever
//! drives the player's side (AI, script, or a human front end). The driver
//! asks the controller for a turn action while the sequencer is waiting for
//! one, and asks whether to press the key while a minigame or telegraph is
//! open. Controllers only ever see a read-only view.

use crate::core::{EnemyCombatant, PlayerCombatant, Stance};
use crate::game::actions::PlayerAction;
use crate::game::collaborators::Collaborators;
use crate::game::logger::DuelLogger;
use crate::game::sequencer::{Outcome, SequencerState, TurnSequencer};

pub use crate::game::sequencer::KeyPrompt;

/// Read-only view of the encounter for controllers
pub struct DuelView<'a> {
    player: &'a PlayerCombatant,
    enemy: &'a EnemyCombatant,
    state: SequencerState,
    turn_number: u32,
    logger: &'a DuelLogger,
}

impl<'a> DuelView<'a> {
    pub fn new<C: Collaborators>(sequencer: &'a TurnSequencer<C>) -> Self {
        DuelView {
            player: sequencer.player(),
            enemy: sequencer.enemy(),
            state: sequencer.state(),
            turn_number: sequencer.turn_number(),
            logger: sequencer.logger(),
        }
    }

    pub fn player_hp(&self) -> i32 {
        self.player.body.hp()
    }

    pub fn player_max_hp(&self) -> i32 {
        self.player.body.max_hp()
    }

    pub fn player_focus(&self) -> u8 {
        self.player.focus.value()
    }

    pub fn player_stance(&self) -> Stance {
        self.player.body.stance()
    }

    pub fn enemy_hp(&self) -> i32 {
        self.enemy.body.hp()
    }

    pub fn enemy_max_hp(&self) -> i32 {
        self.enemy.body.max_hp()
    }

    pub fn enemy_stance(&self) -> Stance {
        self.enemy.body.stance()
    }

    /// Whether a parry press would be accepted right now
    pub fn can_parry(&self) -> bool {
        self.player.parry.can_parry()
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Logger for controller decision output
    pub fn logger(&self) -> &DuelLogger {
        self.logger
    }
}

/// Player controller trait
///
/// Implement this trait to create AI players or connect to UI.
pub trait PlayerController {
    /// Short name used in logs and summaries
    fn name(&self) -> &str;

    /// Choose the turn action from the legal options.
    ///
    /// Returning `None` (or an action the sequencer rejects) leaves the
    /// sequencer waiting; the driver asks again on the next tick.
    fn choose_action(
        &mut self,
        view: &DuelView,
        available_actions: &[PlayerAction],
    ) -> Option<PlayerAction>;

    /// Decide whether the key goes down this tick
    fn press_key(&mut self, view: &DuelView, prompt: KeyPrompt) -> bool;

    /// Called once when the encounter ends
    fn on_encounter_end(&mut self, _view: &DuelView, _outcome: Option<Outcome>) {}
}
