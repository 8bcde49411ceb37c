//! Outbound collaborator interfaces
//!
//! The sequencer never reaches for global managers. Everything it tells the
//! outside world goes through the traits in this module, injected at
//! construction. All calls are fire-and-forget: nothing returned from a
//! collaborator feeds back into combat.

use crate::core::{SceneKey, Side, Stance};
use serde::Serialize;

/// Audio, camera, floating text and animation cues
pub trait Presentation {
    fn play_sfx(&mut self, _name: &str) {}

    fn shake_camera(&mut self, _intensity: f32, _duration: f32) {}

    fn spawn_floating_text(&mut self, _side: Side, _text: &str) {}

    /// Play an animation cue on one combatant
    fn play_cue(&mut self, _side: Side, _cue: &str) {}

    /// Toggle the enemy telegraph warning
    fn show_warning(&mut self, _visible: bool) {}

    /// Stance-themed effect after a special attack
    fn play_special_effect(&mut self, _cue: &str) {}
}

/// HP / Focus bars and the action panel
pub trait CombatUi {
    fn start_ui(&mut self) {}

    fn update_hp(&mut self, _side: Side, _current: i32, _max: i32) {}

    fn update_focus(&mut self, _value: u8) {}

    fn show_actions(&mut self, _visible: bool) {}

    fn refresh_action_buttons(&mut self, _stance: Stance, _focus: u8) {}
}

/// Scene loading once the encounter is decided
pub trait SceneTransition {
    fn close_scene(&mut self, key: &SceneKey);
}

/// Everything the sequencer needs from the outside world
pub trait Collaborators: Presentation + CombatUi + SceneTransition {}

impl<T: Presentation + CombatUi + SceneTransition> Collaborators for T {}

/// Collaborators that ignore every call
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCollaborators;

impl Presentation for NullCollaborators {}
impl CombatUi for NullCollaborators {}
impl SceneTransition for NullCollaborators {
    fn close_scene(&mut self, _key: &SceneKey) {}
}

/// One outbound call, as captured by [`RecordingCollaborators`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CollaboratorEvent {
    Sfx(String),
    CameraShake { intensity: f32, duration: f32 },
    FloatingText { side: Side, text: String },
    Cue { side: Side, cue: String },
    Warning(bool),
    SpecialEffect(String),
    StartUi,
    Hp { side: Side, current: i32, max: i32 },
    Focus(u8),
    ShowActions(bool),
    RefreshButtons { stance: Stance, focus: u8 },
    CloseScene(SceneKey),
}

/// Collaborators that record every call in order
#[derive(Debug, Clone, Default)]
pub struct RecordingCollaborators {
    pub events: Vec<CollaboratorEvent>,
}

impl RecordingCollaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn closed_scenes(&self) -> Vec<&SceneKey> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CollaboratorEvent::CloseScene(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn floating_texts(&self, side: Side) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CollaboratorEvent::FloatingText { side: s, text } if *s == side => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect()
    }

    pub fn sfx(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CollaboratorEvent::Sfx(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn cues(&self, side: Side) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CollaboratorEvent::Cue { side: s, cue } if *s == side => Some(cue.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&CollaboratorEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Presentation for RecordingCollaborators {
    fn play_sfx(&mut self, name: &str) {
        self.events.push(CollaboratorEvent::Sfx(name.to_string()));
    }

    fn shake_camera(&mut self, intensity: f32, duration: f32) {
        self.events.push(CollaboratorEvent::CameraShake {
            intensity,
            duration,
        });
    }

    fn spawn_floating_text(&mut self, side: Side, text: &str) {
        self.events.push(CollaboratorEvent::FloatingText {
            side,
            text: text.to_string(),
        });
    }

    fn play_cue(&mut self, side: Side, cue: &str) {
        self.events.push(CollaboratorEvent::Cue {
            side,
            cue: cue.to_string(),
        });
    }

    fn show_warning(&mut self, visible: bool) {
        self.events.push(CollaboratorEvent::Warning(visible));
    }

    fn play_special_effect(&mut self, cue: &str) {
        self.events
            .push(CollaboratorEvent::SpecialEffect(cue.to_string()));
    }
}

impl CombatUi for RecordingCollaborators {
    fn start_ui(&mut self) {
        self.events.push(CollaboratorEvent::StartUi);
    }

    fn update_hp(&mut self, side: Side, current: i32, max: i32) {
        self.events.push(CollaboratorEvent::Hp { side, current, max });
    }

    fn update_focus(&mut self, value: u8) {
        self.events.push(CollaboratorEvent::Focus(value));
    }

    fn show_actions(&mut self, visible: bool) {
        self.events.push(CollaboratorEvent::ShowActions(visible));
    }

    fn refresh_action_buttons(&mut self, stance: Stance, focus: u8) {
        self.events
            .push(CollaboratorEvent::RefreshButtons { stance, focus });
    }
}

impl SceneTransition for RecordingCollaborators {
    fn close_scene(&mut self, key: &SceneKey) {
        self.events.push(CollaboratorEvent::CloseScene(key.clone()));
    }
}
