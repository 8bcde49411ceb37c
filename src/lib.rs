//! Stance Duel - tick-driven turn-based duel engine
//!
//! A player and an enemy trade turns. The player picks stances and attacks,
//! lands hits through a timing minigame, and parries enemy strikes inside a
//! telegraph window. The [`game::TurnSequencer`] runs the whole encounter as
//! an explicit state machine advanced one tick at a time.

pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod gauntlet;

pub use error::{DuelError, RejectReason, Result};
