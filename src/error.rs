//! Error types for the duel engine

use crate::game::PlayerAction;
use thiserror::Error;

/// Why an action was refused at the intake boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Not enough Focus to pay for the action
    InsufficientFocus { needed: u8, have: u8 },
    /// Specials need an active stance
    NoStance,
    /// The player is already in the requested stance
    SameStance,
    /// `Stance::None` can never be chosen
    StanceNotChoosable,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::InsufficientFocus { needed, have } => {
                write!(f, "needs {needed} focus, have {have}")
            }
            RejectReason::NoStance => write!(f, "no stance is active"),
            RejectReason::SameStance => write!(f, "already in that stance"),
            RejectReason::StanceNotChoosable => write!(f, "stance cannot be chosen"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DuelError {
    #[error("Action {action:?} rejected: {reason}")]
    ActionRejected {
        action: PlayerAction,
        reason: RejectReason,
    },

    #[error("The sequencer is not waiting for a player choice")]
    NotAwaitingChoice,

    #[error("The encounter is already over")]
    EncounterOver,

    #[error("The encounter has not started yet")]
    NotStarted,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DuelError>;
