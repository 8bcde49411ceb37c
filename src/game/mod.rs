//! Duel turn sequencing, collaborators and controllers

pub mod actions;
pub mod collaborators;
pub mod controller;
pub mod cues;
pub mod duel_loop;
pub mod enemy_policy;
pub mod logger;
pub mod random_controller;
pub mod scripted_controller;
pub mod sequencer;
pub mod skilled_controller;
pub mod timing;
pub mod zero_controller;

pub use actions::{available_actions, PlayerAction};
pub use collaborators::{
    CollaboratorEvent, Collaborators, CombatUi, NullCollaborators, Presentation,
    RecordingCollaborators, SceneTransition,
};
pub use controller::{DuelView, KeyPrompt, PlayerController};
pub use cues::{CuePhase, CueTable, Reaction};
pub use duel_loop::{DuelEndReason, DuelLoop, DuelResult, DEFAULT_DT};
pub use enemy_policy::EnemyDecisionPolicy;
pub use logger::{DuelLogger, LogEntry, OutputFormat, OutputMode, VerbosityLevel};
pub use random_controller::RandomController;
pub use scripted_controller::{DuelScript, ScriptedController};
pub use sequencer::{Outcome, SequencerState, TickInput, TurnSequencer};
pub use skilled_controller::SkilledController;
pub use timing::{TimingBands, TimingEngine, TARGET_TIME};
pub use zero_controller::ZeroController;
