//! Random controller for testing and baseline play
//!
//! Picks uniformly among legal actions and presses the key at a random
//! point of each minigame or telegraph.

use crate::game::actions::PlayerAction;
use crate::game::controller::{DuelView, KeyPrompt, PlayerController};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// A controller that makes random choices
pub struct RandomController {
    rng: ChaCha12Rng,
    /// Press time drawn for the prompt currently open
    planned_press: Option<f32>,
}

impl RandomController {
    pub fn new() -> Self {
        RandomController {
            rng: ChaCha12Rng::from_entropy(),
            planned_press: None,
        }
    }

    /// Create a random controller with a seeded RNG (for deterministic testing)
    pub fn with_seed(seed: u64) -> Self {
        RandomController {
            rng: ChaCha12Rng::seed_from_u64(seed),
            planned_press: None,
        }
    }
}

impl Default for RandomController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerController for RandomController {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_action(
        &mut self,
        view: &DuelView,
        available_actions: &[PlayerAction],
    ) -> Option<PlayerAction> {
        if available_actions.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..available_actions.len());
        let action = available_actions[index];
        view.logger()
            .controller_choice("RANDOM", &format!("chose {action}"));
        Some(action)
    }

    fn press_key(&mut self, _view: &DuelView, prompt: KeyPrompt) -> bool {
        let (elapsed, window) = match prompt {
            KeyPrompt::Timing { elapsed, window, .. } => (elapsed, window),
            KeyPrompt::Parry {
                elapsed, window, ..
            } => (elapsed, window),
        };
        // A fresh prompt starts at zero elapsed
        if elapsed == 0.0 || self.planned_press.is_none() {
            self.planned_press = Some(self.rng.gen_range(0.0..window.max(f32::EPSILON)));
        }
        match self.planned_press {
            Some(at) if elapsed >= at => {
                // Spent until the next prompt opens
                self.planned_press = Some(f32::INFINITY);
                true
            }
            _ => false,
        }
    }
}
