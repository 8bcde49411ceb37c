//! Player action intake and resource gating

use crate::core::{AttackType, Focus, Stance};
use crate::error::RejectReason;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// A choice the player makes at the start of their turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Switch stance; consumes the turn and drains Focus
    ChooseStance(Stance),
    BasicAttack,
    /// Two-hit attack for 3 Focus
    EnhanceAttack,
    /// Stance special for 6 Focus
    Special,
}

impl PlayerAction {
    /// Attack this action resolves to in `stance`, if it attacks at all
    pub fn attack_type(self, stance: Stance) -> Option<AttackType> {
        match self {
            PlayerAction::ChooseStance(_) => None,
            PlayerAction::BasicAttack => Some(AttackType::Basic),
            PlayerAction::EnhanceAttack => Some(AttackType::Enhance),
            PlayerAction::Special => stance.special(),
        }
    }

    /// Check the action's preconditions against the player's resources
    pub fn validate(self, stance: Stance, focus: Focus) -> Result<(), RejectReason> {
        match self {
            PlayerAction::ChooseStance(target) => {
                if !target.is_choosable() {
                    Err(RejectReason::StanceNotChoosable)
                } else if target == stance {
                    Err(RejectReason::SameStance)
                } else {
                    Ok(())
                }
            }
            PlayerAction::BasicAttack => Ok(()),
            PlayerAction::EnhanceAttack => require_focus(focus, AttackType::Enhance.focus_cost()),
            PlayerAction::Special => {
                require_focus(focus, Focus::MAX)?;
                if stance.special().is_none() {
                    return Err(RejectReason::NoStance);
                }
                Ok(())
            }
        }
    }

    /// Short lowercase name used in logs and scripts
    pub fn label(self) -> String {
        match self {
            PlayerAction::ChooseStance(s) => format!("stance:{}", s.to_string().to_lowercase()),
            PlayerAction::BasicAttack => "basic".to_string(),
            PlayerAction::EnhanceAttack => "enhance".to_string(),
            PlayerAction::Special => "special".to_string(),
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::ChooseStance(s) => write!(f, "Change stance to {s}"),
            PlayerAction::BasicAttack => write!(f, "Basic attack"),
            PlayerAction::EnhanceAttack => write!(f, "Enhance attack"),
            PlayerAction::Special => write!(f, "Special"),
        }
    }
}

impl std::str::FromStr for PlayerAction {
    type Err = String;

    /// Parses `basic`, `enhance`, `special` and `stance:<name>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "basic" => Ok(PlayerAction::BasicAttack),
            "enhance" => Ok(PlayerAction::EnhanceAttack),
            "special" => Ok(PlayerAction::Special),
            other => match other.strip_prefix("stance:") {
                Some(name) => Ok(PlayerAction::ChooseStance(name.parse()?)),
                None => Err(format!(
                    "invalid action '{s}' (expected: basic, enhance, special, stance:<name>)"
                )),
            },
        }
    }
}

fn require_focus(focus: Focus, needed: u8) -> Result<(), RejectReason> {
    if focus.can_afford(needed) {
        Ok(())
    } else {
        Err(RejectReason::InsufficientFocus {
            needed,
            have: focus.value(),
        })
    }
}

/// Every action legal for the given resources, attacks first
pub fn available_actions(stance: Stance, focus: Focus) -> SmallVec<[PlayerAction; 6]> {
    let candidates = [
        PlayerAction::BasicAttack,
        PlayerAction::EnhanceAttack,
        PlayerAction::Special,
        PlayerAction::ChooseStance(Stance::Stone),
        PlayerAction::ChooseStance(Stance::Wind),
        PlayerAction::ChooseStance(Stance::Flame),
    ];
    candidates
        .into_iter()
        .filter(|a| a.validate(stance, focus).is_ok())
        .collect()
}
