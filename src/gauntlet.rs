//! Gauntlet mode: run many seeded encounters in parallel and collect statistics
//!
//! Each encounter gets its own sequencer, controller and seed derived from
//! the gauntlet seed, so a gauntlet is reproducible regardless of how rayon
//! schedules the work.

use crate::config::DuelConfig;
use crate::game::{
    DuelEndReason, DuelLoop, DuelResult, NullCollaborators, PlayerController, RandomController,
    SkilledController, TurnSequencer, VerbosityLevel, ZeroController,
};
use crate::Result;
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;

/// Controller type for gauntlet encounters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerType {
    Zero,
    Random,
    Skilled,
}

impl ControllerType {
    pub fn build(self, seed: u64) -> Box<dyn PlayerController + Send> {
        match self {
            ControllerType::Zero => Box::new(ZeroController::new()),
            ControllerType::Random => Box::new(RandomController::with_seed(seed)),
            ControllerType::Skilled => Box::new(SkilledController::new()),
        }
    }
}

/// Seed for encounter `index` of a gauntlet
pub fn encounter_seed(gauntlet_seed: u64, index: usize) -> u64 {
    gauntlet_seed.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn controller_seed(encounter_seed: u64) -> u64 {
    encounter_seed.wrapping_add(0x1234_5678_9ABC_DEF0)
}

/// Aggregated gauntlet statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GauntletReport {
    pub encounters: usize,
    pub victories: usize,
    pub defeats: usize,
    pub tick_limits: usize,
    pub cancelled: usize,
    pub total_turns: u64,
    pub total_ticks: u64,
    /// Player HP summed over victories
    pub victory_hp_remaining: i64,
    pub wall_time_ms: f64,
}

impl GauntletReport {
    fn record(&mut self, result: &DuelResult) {
        self.encounters += 1;
        self.total_turns += u64::from(result.turns);
        self.total_ticks += result.ticks;
        match result.end_reason {
            DuelEndReason::PlayerVictory => {
                self.victories += 1;
                self.victory_hp_remaining += i64::from(result.player_hp);
            }
            DuelEndReason::PlayerDefeat => self.defeats += 1,
            DuelEndReason::TickLimit => self.tick_limits += 1,
            DuelEndReason::Cancelled => self.cancelled += 1,
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.encounters == 0 {
            0.0
        } else {
            self.victories as f64 / self.encounters as f64
        }
    }

    pub fn average_turns(&self) -> f64 {
        if self.encounters == 0 {
            0.0
        } else {
            self.total_turns as f64 / self.encounters as f64
        }
    }

    pub fn average_victory_hp(&self) -> f64 {
        if self.victories == 0 {
            0.0
        } else {
            self.victory_hp_remaining as f64 / self.victories as f64
        }
    }

    pub fn print_summary(&self) {
        println!("=== Gauntlet Results ===");
        println!("Encounters:   {}", self.encounters);
        println!(
            "Victories:    {} ({:.1}%)",
            self.victories,
            self.win_rate() * 100.0
        );
        println!("Defeats:      {}", self.defeats);
        if self.tick_limits > 0 {
            println!("Tick limits:  {}", self.tick_limits);
        }
        if self.cancelled > 0 {
            println!("Cancelled:    {}", self.cancelled);
        }
        println!("Avg turns:    {:.2}", self.average_turns());
        println!("Avg HP left:  {:.1} (victories)", self.average_victory_hp());
        println!("Wall time:    {:.2}ms", self.wall_time_ms);
    }
}

/// Run one silent encounter
pub fn run_single(
    config: &DuelConfig,
    controller_type: ControllerType,
    seed: u64,
) -> Result<DuelResult> {
    let mut sequencer = TurnSequencer::new(config.clone(), NullCollaborators, seed)?
        .with_verbosity(VerbosityLevel::Silent);
    let mut controller = controller_type.build(controller_seed(seed));
    DuelLoop::new(&mut sequencer).run_encounter(controller.as_mut())
}

/// Run `encounters` encounters in parallel and aggregate the results
pub fn run_gauntlet(
    config: &DuelConfig,
    controller_type: ControllerType,
    encounters: usize,
    seed: u64,
) -> Result<GauntletReport> {
    config.validate()?;
    let start = Instant::now();

    let results: Vec<Result<DuelResult>> = (0..encounters)
        .into_par_iter()
        .map(|index| run_single(config, controller_type, encounter_seed(seed, index)))
        .collect();

    let mut report = GauntletReport::default();
    for result in results {
        report.record(&result?);
    }
    report.wall_time_ms = start.elapsed().as_secs_f64() * 1000.0;
    Ok(report)
}
