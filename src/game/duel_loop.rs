//! Duel loop
//!
//! Drives a [`TurnSequencer`] at a fixed tick rate, asking a
//! [`PlayerController`] for turn actions and key presses, until the
//! encounter is decided or the tick limit is hit.

use crate::error::DuelError;
use crate::game::collaborators::Collaborators;
use crate::game::controller::{DuelView, PlayerController};
use crate::game::logger::VerbosityLevel;
use crate::game::sequencer::{Outcome, SequencerState, TickInput, TurnSequencer};
use crate::Result;
use serde::{Deserialize, Serialize};

/// 60 ticks per simulated second
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Result of a driven encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelResult {
    /// Decided outcome (None if the loop stopped first)
    pub outcome: Option<Outcome>,
    pub end_reason: DuelEndReason,
    /// Player turns started
    pub turns: u32,
    pub ticks: u64,
    /// Simulated seconds
    pub elapsed: f64,
    pub player_hp: i32,
    pub enemy_hp: i32,
}

/// Reason the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelEndReason {
    /// Enemy reduced to 0 HP
    PlayerVictory,
    /// Player reduced to 0 HP
    PlayerDefeat,
    /// Encounter was cancelled from outside
    Cancelled,
    /// Maximum tick count reached
    TickLimit,
}

/// Fixed-step driver for one encounter
pub struct DuelLoop<'a, C: Collaborators> {
    pub sequencer: &'a mut TurnSequencer<C>,
    dt: f32,
    /// Maximum ticks before giving up
    max_ticks: u64,
}

impl<'a, C: Collaborators> DuelLoop<'a, C> {
    pub fn new(sequencer: &'a mut TurnSequencer<C>) -> Self {
        DuelLoop {
            sequencer,
            dt: DEFAULT_DT,
            // One simulated hour
            max_ticks: 216_000,
        }
    }

    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Run the encounter to completion.
    ///
    /// Sends the readiness signal if nobody has yet. Rejected controller
    /// choices are logged and asked for again on the next tick.
    pub fn run_encounter(&mut self, controller: &mut dyn PlayerController) -> Result<DuelResult> {
        if self.sequencer.state() == SequencerState::AwaitingReady {
            self.sequencer.signal_ready();
        }

        let mut hit_limit = false;
        while !self.sequencer.state().is_finished() {
            if self.sequencer.ticks() >= self.max_ticks {
                hit_limit = true;
                break;
            }

            if self.sequencer.state() == SequencerState::AwaitingChoice {
                self.ask_for_action(controller)?;
            }

            let pressed = match self.sequencer.key_prompt() {
                Some(prompt) => {
                    let view = DuelView::new(&*self.sequencer);
                    controller.press_key(&view, prompt)
                }
                None => false,
            };
            self.sequencer.tick(self.dt, TickInput { key_pressed: pressed });
        }

        let outcome = self.sequencer.outcome();
        {
            let view = DuelView::new(&*self.sequencer);
            controller.on_encounter_end(&view, outcome);
        }

        let end_reason = match (outcome, hit_limit) {
            (Some(Outcome::Victory), _) => DuelEndReason::PlayerVictory,
            (Some(Outcome::Defeat), _) => DuelEndReason::PlayerDefeat,
            (None, true) => DuelEndReason::TickLimit,
            (None, false) => DuelEndReason::Cancelled,
        };
        if hit_limit {
            self.sequencer.logger().log(
                VerbosityLevel::Minimal,
                Some("terminal"),
                &format!("Tick limit ({}) reached", self.max_ticks),
            );
        }

        Ok(DuelResult {
            outcome,
            end_reason,
            turns: self.sequencer.turn_number(),
            ticks: self.sequencer.ticks(),
            elapsed: self.sequencer.elapsed(),
            player_hp: self.sequencer.player().body.hp(),
            enemy_hp: self.sequencer.enemy().body.hp(),
        })
    }

    fn ask_for_action(&mut self, controller: &mut dyn PlayerController) -> Result<()> {
        let available = self.sequencer.available_actions();
        let choice = {
            let view = DuelView::new(&*self.sequencer);
            controller.choose_action(&view, &available)
        };
        let Some(action) = choice else {
            return Ok(());
        };
        match self.sequencer.submit(action) {
            Ok(()) => Ok(()),
            Err(DuelError::ActionRejected { action, reason }) => {
                self.sequencer.logger().log(
                    VerbosityLevel::Normal,
                    Some("choice"),
                    &format!("{} rejected: {action} ({reason})", controller.name()),
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
