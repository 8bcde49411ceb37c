//! Zero controller for testing and automation
//!
//! Always takes the first legal action and never touches the key, so every
//! minigame fails and every enemy strike lands. Useful as a worst-case
//! baseline and for checking that encounters always terminate.

use crate::game::actions::PlayerAction;
use crate::game::controller::{DuelView, KeyPrompt, PlayerController};

/// A controller that always chooses the first available action (index 0)
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroController;

impl ZeroController {
    pub fn new() -> Self {
        ZeroController
    }
}

impl PlayerController for ZeroController {
    fn name(&self) -> &str {
        "zero"
    }

    fn choose_action(
        &mut self,
        _view: &DuelView,
        available_actions: &[PlayerAction],
    ) -> Option<PlayerAction> {
        available_actions.first().copied()
    }

    fn press_key(&mut self, _view: &DuelView, _prompt: KeyPrompt) -> bool {
        false
    }
}
