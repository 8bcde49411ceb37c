//! End-to-end encounter tests
//!
//! Full encounters through `DuelLoop` with each controller, checking the
//! invariants that must hold over every collaborator call.

use stance_duel::{
    config::{DuelConfig, PacingConfig},
    core::{Focus, Side, Stance},
    game::{
        CollaboratorEvent, DuelEndReason, DuelLoop, DuelScript, Outcome, PlayerAction,
        RandomController, RecordingCollaborators, ScriptedController, SkilledController,
        TurnSequencer, ZeroController,
    },
    gauntlet::{run_gauntlet, ControllerType},
};

fn recorded_run(
    config: DuelConfig,
    seed: u64,
    controller: &mut dyn stance_duel::game::PlayerController,
) -> (stance_duel::game::DuelResult, RecordingCollaborators) {
    let mut seq = TurnSequencer::new(config, RecordingCollaborators::new(), seed).unwrap();
    seq.logger_mut().enable_capture();
    let result = DuelLoop::new(&mut seq).run_encounter(controller).unwrap();
    (result, seq.into_collaborators())
}

fn fast() -> DuelConfig {
    DuelConfig::default().with_pacing(PacingConfig::instant())
}

/// Invariants every finished encounter must satisfy
fn check_invariants(events: &[CollaboratorEvent]) {
    let mut warning_on = false;
    let mut closes = 0;
    for (i, event) in events.iter().enumerate() {
        match event {
            CollaboratorEvent::Hp { current, max, .. } => {
                assert!(*current >= 0 && current <= max, "hp out of range at {i}: {event:?}");
            }
            CollaboratorEvent::Focus(value) => {
                assert!(*value <= Focus::MAX, "focus out of range at {i}");
            }
            CollaboratorEvent::Warning(on) => {
                assert_ne!(*on, warning_on, "warning toggled twice to {on} at {i}");
                warning_on = *on;
            }
            CollaboratorEvent::CloseScene(_) => {
                closes += 1;
                assert_eq!(i, events.len() - 1, "close_scene must be the last call");
            }
            _ => {}
        }
    }
    assert!(!warning_on, "warning left visible");
    assert!(closes <= 1);
}

#[test]
fn test_skilled_controller_beats_default_enemy() {
    let mut controller = SkilledController::new();
    let (result, events) = recorded_run(fast(), 42, &mut controller);

    assert_eq!(result.outcome, Some(Outcome::Victory));
    assert_eq!(result.end_reason, DuelEndReason::PlayerVictory);
    assert_eq!(result.enemy_hp, 0);
    assert!(result.player_hp > 0);
    check_invariants(&events.events);
    assert_eq!(events.closed_scenes().len(), 1);
    assert_eq!(events.closed_scenes()[0].as_str(), "Level_2");
}

#[test]
fn test_zero_controller_loses() {
    let mut controller = ZeroController::new();
    let (result, events) = recorded_run(fast(), 42, &mut controller);

    assert_eq!(result.outcome, Some(Outcome::Defeat));
    assert_eq!(result.player_hp, 0);
    check_invariants(&events.events);
    assert_eq!(events.closed_scenes()[0].as_str(), "Level_1");
}

#[test]
fn test_random_controllers_respect_invariants() {
    for seed in 0..12u64 {
        let mut controller = RandomController::with_seed(seed * 31 + 7);
        let (result, events) = recorded_run(fast(), seed, &mut controller);
        assert!(result.outcome.is_some(), "seed {seed} did not finish");
        check_invariants(&events.events);
        assert_eq!(events.closed_scenes().len(), 1, "seed {seed}");
    }
}

#[test]
fn test_paced_encounter_takes_simulated_time() {
    let mut controller = SkilledController::new();
    let (result, events) = recorded_run(DuelConfig::default(), 7, &mut controller);
    assert!(result.outcome.is_some());
    // Settle alone is one second; a whole encounter spans many turns
    assert!(result.elapsed > 10.0, "elapsed {}", result.elapsed);
    check_invariants(&events.events);
}

#[test]
fn test_scripted_stance_dance() {
    let script = DuelScript::new(vec![
        PlayerAction::ChooseStance(Stance::Wind),
        PlayerAction::BasicAttack,
        PlayerAction::ChooseStance(Stance::Stone),
    ])
    .with_timing_presses(vec![Some(1.0)]);
    let mut controller = ScriptedController::new(script);
    let mut seq = TurnSequencer::new(fast(), RecordingCollaborators::new(), 3).unwrap();
    seq.logger_mut().enable_capture();

    let result = DuelLoop::new(&mut seq)
        .with_max_ticks(20_000)
        .run_encounter(&mut controller)
        .unwrap();
    assert!(result.outcome.is_some() || result.end_reason == DuelEndReason::TickLimit);

    let stance_cues: Vec<&str> = seq
        .collaborators()
        .cues(Side::Player)
        .into_iter()
        .filter(|c| c.ends_with("Stance"))
        .collect();
    assert_eq!(&stance_cues[..2], &["WindStance", "StoneStance"]);
    assert!(seq.logger().logs().in_category("choice").count() >= 3);
}

#[test]
fn test_refresh_buttons_every_turn() {
    let mut controller = SkilledController::new();
    let (result, events) = recorded_run(fast(), 11, &mut controller);
    let refreshes = events.count(|e| matches!(e, CollaboratorEvent::RefreshButtons { .. }));
    let shown = events.count(|e| *e == CollaboratorEvent::ShowActions(true));
    assert_eq!(shown as u32, result.turns);
    assert!(refreshes >= shown);
}

#[test]
fn test_reaction_feedback_pairs() {
    let mut controller = RandomController::with_seed(5);
    let (_, events) = recorded_run(fast(), 5, &mut controller);

    // Every floating text comes with a sound and a camera shake
    let texts = events.count(|e| matches!(e, CollaboratorEvent::FloatingText { .. }));
    let sfx = events.sfx().len();
    let shakes = events.count(|e| {
        matches!(e, CollaboratorEvent::CameraShake { intensity, duration }
            if *intensity == 0.1 && *duration == 0.2)
    });
    assert!(texts > 0);
    assert_eq!(texts, sfx);
    assert_eq!(texts, shakes);
}

#[test]
fn test_gauntlet_skilled_beats_zero() {
    let skilled = run_gauntlet(&fast(), ControllerType::Skilled, 16, 1).unwrap();
    let zero = run_gauntlet(&fast(), ControllerType::Zero, 16, 1).unwrap();
    assert!(skilled.win_rate() > zero.win_rate());
    assert_eq!(zero.victories, 0);
}
