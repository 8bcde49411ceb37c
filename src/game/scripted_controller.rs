//! Scripted player controller for deterministic testing
//!
//! Follows a predetermined list of turn actions and key press times. Once a
//! list is exhausted the controller falls back to a basic attack and stops
//! pressing the key. The script is serializable so scenarios can live in
//! JSON files next to their configs.

use crate::game::actions::PlayerAction;
use crate::game::controller::{DuelView, KeyPrompt, PlayerController};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Actions and press times for one encounter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelScript {
    /// Turn actions in order
    pub actions: Vec<PlayerAction>,
    /// Seconds into each minigame window to press (`None` lets it fail)
    pub timing_presses: Vec<Option<f32>>,
    /// Seconds into each enemy telegraph to raise the parry
    pub parry_presses: Vec<Option<f32>>,
}

impl DuelScript {
    pub fn new(actions: Vec<PlayerAction>) -> Self {
        DuelScript {
            actions,
            ..Default::default()
        }
    }

    pub fn with_timing_presses(mut self, presses: Vec<Option<f32>>) -> Self {
        self.timing_presses = presses;
        self
    }

    pub fn with_parry_presses(mut self, presses: Vec<Option<f32>>) -> Self {
        self.parry_presses = presses;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

/// Press time for the prompt currently open
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum PendingPress {
    At(f32),
    Never,
    Done,
}

/// A controller that follows a [`DuelScript`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedController {
    script: DuelScript,
    /// Position in each list
    pub action_index: usize,
    pub timing_index: usize,
    pub parry_index: usize,
    pending: PendingPress,
}

impl ScriptedController {
    pub fn new(script: DuelScript) -> Self {
        ScriptedController {
            script,
            action_index: 0,
            timing_index: 0,
            parry_index: 0,
            pending: PendingPress::Never,
        }
    }

    /// Controller that only plays the given actions and never presses
    pub fn from_actions(actions: Vec<PlayerAction>) -> Self {
        Self::new(DuelScript::new(actions))
    }

    pub fn is_exhausted(&self) -> bool {
        self.action_index >= self.script.actions.len()
    }

    fn next_press(list: &[Option<f32>], index: &mut usize) -> PendingPress {
        let press = list.get(*index).copied().flatten();
        *index += 1;
        match press {
            Some(at) => PendingPress::At(at),
            None => PendingPress::Never,
        }
    }
}

impl PlayerController for ScriptedController {
    fn name(&self) -> &str {
        "scripted"
    }

    fn choose_action(
        &mut self,
        view: &DuelView,
        available_actions: &[PlayerAction],
    ) -> Option<PlayerAction> {
        let Some(&scripted) = self.script.actions.get(self.action_index) else {
            view.logger()
                .controller_choice("SCRIPT", "script exhausted, defaulting to basic attack");
            return Some(PlayerAction::BasicAttack);
        };
        self.action_index += 1;

        if !available_actions.contains(&scripted) {
            view.logger().controller_choice(
                "SCRIPT",
                &format!("step {} ({scripted}) not legal, defaulting to basic attack", self.action_index),
            );
            return Some(PlayerAction::BasicAttack);
        }
        view.logger().controller_choice(
            "SCRIPT",
            &format!("step {}: {scripted}", self.action_index),
        );
        Some(scripted)
    }

    fn press_key(&mut self, _view: &DuelView, prompt: KeyPrompt) -> bool {
        let elapsed = match prompt {
            KeyPrompt::Timing { elapsed, .. } | KeyPrompt::Parry { elapsed, .. } => elapsed,
        };
        if elapsed == 0.0 {
            self.pending = match prompt {
                KeyPrompt::Timing { .. } => {
                    Self::next_press(&self.script.timing_presses, &mut self.timing_index)
                }
                KeyPrompt::Parry { .. } => {
                    Self::next_press(&self.script.parry_presses, &mut self.parry_index)
                }
            };
        }
        match self.pending {
            // Pressing on the tick that carries elapsed past the scripted time
            PendingPress::At(at) if elapsed + crate::game::duel_loop::DEFAULT_DT >= at => {
                self.pending = PendingPress::Done;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuelConfig;
    use crate::core::Stance;
    use crate::game::collaborators::NullCollaborators;
    use crate::game::sequencer::TurnSequencer;

    fn view_fixture() -> TurnSequencer<NullCollaborators> {
        TurnSequencer::new(DuelConfig::default(), NullCollaborators, 0).unwrap()
    }

    #[test]
    fn test_follows_script_then_defaults() {
        let seq = view_fixture();
        let view = DuelView::new(&seq);
        let mut controller = ScriptedController::from_actions(vec![
            PlayerAction::ChooseStance(Stance::Wind),
            PlayerAction::EnhanceAttack,
        ]);
        let all = [
            PlayerAction::BasicAttack,
            PlayerAction::EnhanceAttack,
            PlayerAction::ChooseStance(Stance::Wind),
        ];

        assert_eq!(
            controller.choose_action(&view, &all),
            Some(PlayerAction::ChooseStance(Stance::Wind))
        );
        assert_eq!(
            controller.choose_action(&view, &all),
            Some(PlayerAction::EnhanceAttack)
        );
        assert!(controller.is_exhausted());
        assert_eq!(
            controller.choose_action(&view, &all),
            Some(PlayerAction::BasicAttack)
        );
    }

    #[test]
    fn test_illegal_step_falls_back() {
        let seq = view_fixture();
        let view = DuelView::new(&seq);
        let mut controller = ScriptedController::from_actions(vec![PlayerAction::Special]);
        assert_eq!(
            controller.choose_action(&view, &[PlayerAction::BasicAttack]),
            Some(PlayerAction::BasicAttack)
        );
    }

    #[test]
    fn test_scripted_press_times() {
        let seq = view_fixture();
        let view = DuelView::new(&seq);
        let script = DuelScript::default().with_timing_presses(vec![Some(0.5), None]);
        let mut controller = ScriptedController::new(script);

        let prompt = |elapsed| KeyPrompt::Timing {
            elapsed,
            target: 1.0,
            window: 1.35,
        };
        assert!(!controller.press_key(&view, prompt(0.0)));
        assert!(!controller.press_key(&view, prompt(0.3)));
        assert!(controller.press_key(&view, prompt(0.49)));
        assert!(!controller.press_key(&view, prompt(0.6)));

        // Second window is scripted as a miss
        assert!(!controller.press_key(&view, prompt(0.0)));
        assert!(!controller.press_key(&view, prompt(1.0)));
    }

    #[test]
    fn test_script_from_json() {
        let json = r#"{
            "actions": [{"ChooseStance": "Stone"}, "BasicAttack"],
            "timing_presses": [1.0],
            "parry_presses": [0.6, null]
        }"#;
        let script = DuelScript::from_json_str(json).unwrap();
        assert_eq!(script.actions.len(), 2);
        assert_eq!(script.actions[0], PlayerAction::ChooseStance(Stance::Stone));
        assert_eq!(script.timing_presses, vec![Some(1.0)]);
        assert_eq!(script.parry_presses, vec![Some(0.6), None]);
    }
}
