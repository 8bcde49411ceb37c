//! Skilled controller
//!
//! Plays the duel the way a practised player would: spends Focus on the
//! stance special as soon as it is affordable, enhances when it can, presses
//! the minigame key on the target instant and raises the parry just before
//! each enemy strike lands.

use crate::core::Stance;
use crate::game::actions::PlayerAction;
use crate::game::controller::{DuelView, KeyPrompt, PlayerController};
use crate::game::duel_loop::DEFAULT_DT;

#[derive(Debug, Clone, Copy)]
pub struct SkilledController {
    /// Tick length the driver runs at
    dt: f32,
    /// Added to the minigame press time (positive = late)
    timing_offset: f32,
    /// Preferred stance; switched to once if the player starts elsewhere
    preferred: Option<Stance>,
}

impl SkilledController {
    pub fn new() -> Self {
        SkilledController {
            dt: DEFAULT_DT,
            timing_offset: 0.0,
            preferred: None,
        }
    }

    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    /// Deliberately miss the minigame target by `offset` seconds
    pub fn with_timing_offset(mut self, offset: f32) -> Self {
        self.timing_offset = offset;
        self
    }

    pub fn with_preferred_stance(mut self, stance: Stance) -> Self {
        self.preferred = Some(stance);
        self
    }
}

impl Default for SkilledController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerController for SkilledController {
    fn name(&self) -> &str {
        "skilled"
    }

    fn choose_action(
        &mut self,
        view: &DuelView,
        available_actions: &[PlayerAction],
    ) -> Option<PlayerAction> {
        let mut choice = None;
        if let Some(stance) = self.preferred.take() {
            let switch = PlayerAction::ChooseStance(stance);
            if available_actions.contains(&switch) {
                choice = Some(switch);
            }
        }
        let choice = choice.or_else(|| {
            [
                PlayerAction::Special,
                PlayerAction::EnhanceAttack,
                PlayerAction::BasicAttack,
            ]
            .into_iter()
            .find(|a| available_actions.contains(a))
        })?;

        view.logger().controller_choice(
            "SKILLED",
            &format!(
                "chose {choice} at {} HP / {} focus",
                view.player_hp(),
                view.player_focus()
            ),
        );
        Some(choice)
    }

    fn press_key(&mut self, _view: &DuelView, prompt: KeyPrompt) -> bool {
        match prompt {
            KeyPrompt::Timing {
                elapsed, target, ..
            } => elapsed + self.dt >= target + self.timing_offset,
            KeyPrompt::Parry {
                elapsed,
                window,
                parry_duration,
                can_parry,
            } => {
                // Centre the parry on the impact tick
                can_parry && elapsed + self.dt >= window - parry_duration / 2.0
            }
        }
    }
}
