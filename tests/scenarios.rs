//! Combat scenarios
//!
//! Encounters driven tick by tick through the public sequencer API, with
//! configs chosen so every roll and pattern is forced.

use stance_duel::{
    config::{DuelConfig, PacingConfig, PolicyConfig},
    core::{rules, EnemyPattern, SceneKey, Side, Stance, TimingResult},
    game::{
        CollaboratorEvent, EnemyDecisionPolicy, KeyPrompt, Outcome, PlayerAction,
        RecordingCollaborators, SequencerState, TickInput, TurnSequencer,
    },
    DuelError, RejectReason,
};

const DT: f32 = 1.0 / 60.0;

fn forced_config() -> DuelConfig {
    DuelConfig::default()
        .with_pacing(PacingConfig::instant())
        .with_policy(PolicyConfig {
            pattern1_weight: 1.0,
            pattern2_weight: 0.0,
            stance_change_chance: 0.0,
        })
        .with_base_enemy_parry(0.0)
}

fn start(config: DuelConfig, seed: u64) -> TurnSequencer<RecordingCollaborators> {
    let mut seq = TurnSequencer::new(config, RecordingCollaborators::new(), seed).unwrap();
    seq.logger_mut().enable_capture();
    seq.signal_ready();
    wait_for_choice(&mut seq);
    seq
}

fn wait_for_choice(seq: &mut TurnSequencer<RecordingCollaborators>) {
    run_until_choice(seq, on_target);
}

fn run_until_choice(
    seq: &mut TurnSequencer<RecordingCollaborators>,
    press: fn(&TurnSequencer<RecordingCollaborators>) -> bool,
) {
    for _ in 0..100_000 {
        if seq.state() == SequencerState::AwaitingChoice || seq.state().is_finished() {
            return;
        }
        let key_pressed = press(seq);
        seq.tick(DT, TickInput { key_pressed });
    }
    panic!("stuck in {:?}", seq.state());
}

/// Press the minigame key on the target instant, never parry
fn on_target(seq: &TurnSequencer<RecordingCollaborators>) -> bool {
    matches!(
        seq.key_prompt(),
        Some(KeyPrompt::Timing { elapsed, target, .. }) if elapsed + DT >= target
    )
}

/// Raise the parry so it straddles the impact tick
fn late_parry(seq: &TurnSequencer<RecordingCollaborators>) -> bool {
    matches!(
        seq.key_prompt(),
        Some(KeyPrompt::Parry { elapsed, window, parry_duration, can_parry })
            if can_parry && elapsed + DT >= window - parry_duration / 2.0
    )
}

#[test]
fn test_perfect_hit_rolls_against_base_parry() {
    // Perfect adds nothing to the enemy's base chance
    let chance = rules::enemy_parry_chance(0.10, TimingResult::Perfect);
    assert_eq!(chance, 0.10);

    let config = forced_config().with_base_enemy_parry(0.10);
    let mut seq = start(config, 5);
    seq.choose_stance(Stance::Wind).unwrap();
    wait_for_choice(&mut seq);
    let enemy_before = seq.enemy().body.hp();

    seq.choose_basic_attack().unwrap();
    while seq.player_attack().is_some() {
        let press = on_target(&seq);
        seq.tick(DT, TickInput { key_pressed: press });
    }
    assert_eq!(seq.timing().last_result(), Some(TimingResult::Perfect));

    #[cfg(feature = "verbose-logging")]
    {
        let logs = seq.logger().logs();
        assert!(logs
            .in_category("hit")
            .any(|e| e.message.contains("parry chance 0.10")));
    }

    // Wind deals exactly base damage when the hit lands, nothing when parried
    let dealt = enemy_before - seq.enemy().body.hp();
    assert!(dealt == 10 || dealt == 0, "dealt {dealt}");
}

#[test]
fn test_pattern_weights_draw_half_is_pattern2() {
    let policy = EnemyDecisionPolicy::new(&PolicyConfig::default());
    assert_eq!(policy.pattern_for_draw(0.50), EnemyPattern::Pattern2);
}

#[test]
fn test_special_costs_six_focus() {
    let mut seq = start(forced_config(), 1);
    // Enhance leaves 3, two unparried hits bring it to 5
    seq.choose_enhance_attack().unwrap();
    wait_for_choice(&mut seq);
    assert_eq!(seq.player().focus.value(), 5);

    let err = seq.choose_special().unwrap_err();
    assert!(matches!(
        err,
        DuelError::ActionRejected {
            action: PlayerAction::Special,
            reason: RejectReason::InsufficientFocus { needed: 6, have: 5 },
        }
    ));
    assert_eq!(seq.state(), SequencerState::AwaitingChoice);

    // One more basic hit makes it affordable, and it drains everything
    seq.choose_basic_attack().unwrap();
    wait_for_choice(&mut seq);
    assert_eq!(seq.player().focus.value(), 6);
    seq.choose_special().unwrap();
    assert_eq!(seq.player().focus.value(), 0);
}

#[test]
fn test_enemy_reaches_exactly_zero() {
    // Flame basic hits for 13; two of them are exactly lethal
    let config = forced_config().with_enemy(26, 8.0).with_level(4);
    let mut seq = start(config, 9);
    seq.choose_enhance_attack().unwrap();
    wait_for_choice(&mut seq);

    assert_eq!(seq.enemy().body.hp(), 0);
    assert_eq!(seq.outcome(), Some(Outcome::Victory));
    assert_eq!(seq.collaborators().closed_scenes(), vec![&SceneKey::new("Level_5")]);

    // Further ticks and choices change nothing
    for _ in 0..600 {
        seq.tick(DT, TickInput::PRESS);
    }
    assert!(matches!(seq.choose_basic_attack(), Err(DuelError::EncounterOver)));
    let closes = seq
        .collaborators()
        .count(|e| matches!(e, CollaboratorEvent::CloseScene(_)));
    assert_eq!(closes, 1);
    assert_eq!(seq.logger().logs().in_category("terminal").count(), 1);
}

#[test]
fn test_lethal_first_hit_skips_the_rest() {
    let config = forced_config().with_enemy(13, 8.0);
    let mut seq = start(config, 9);
    seq.choose_enhance_attack().unwrap();
    wait_for_choice(&mut seq);

    assert_eq!(seq.outcome(), Some(Outcome::Victory));
    let cues = seq.collaborators().cues(Side::Player);
    assert!(cues.contains(&"EnhanceAttack_1"));
    assert!(!cues.contains(&"EnhanceAttack_2"));
    assert!(seq.collaborators().cues(Side::Enemy).contains(&"Death"));
}

#[test]
fn test_loss_retries_current_level() {
    let config = forced_config().with_player(16, 10.0).with_level(7);
    let mut seq = start(config, 2);
    seq.choose_stance(Stance::Stone).unwrap();
    wait_for_choice(&mut seq);

    assert_eq!(seq.outcome(), Some(Outcome::Defeat));
    assert_eq!(seq.collaborators().closed_scenes(), vec![&SceneKey::level(7)]);
    assert!(seq.collaborators().cues(Side::Player).contains(&"Death"));
}

#[test]
fn test_failed_minigame_guarantees_parry() {
    let mut seq = start(forced_config(), 3);
    seq.choose_stance(Stance::Wind).unwrap();
    wait_for_choice(&mut seq);
    let enemy_before = seq.enemy().body.hp();

    // Never press: every hit fails the minigame and is parried
    seq.choose_basic_attack().unwrap();
    while seq.player_attack().is_some() {
        seq.tick(DT, TickInput::IDLE);
    }
    assert_eq!(seq.timing().last_result(), Some(TimingResult::Failed));
    // Wind does not pierce
    assert_eq!(seq.enemy().body.hp(), enemy_before);
    assert_eq!(seq.player().focus.value(), 0);
}

#[test]
fn test_stance_change_zeroes_focus_and_refreshes_ui() {
    let mut seq = start(forced_config(), 4);
    assert_eq!(seq.player().focus.value(), 6);
    seq.choose_stance(Stance::Stone).unwrap();

    assert_eq!(seq.player().focus.value(), 0);
    assert_eq!(seq.player().body.stance(), Stance::Stone);
    let events = &seq.collaborators().events;
    assert!(events.contains(&CollaboratorEvent::Focus(0)));
    assert!(events.contains(&CollaboratorEvent::ShowActions(false)));
}

#[test]
fn test_same_stance_is_a_noop() {
    let mut seq = start(forced_config(), 4);
    let before = seq.collaborators().events.len();
    let err = seq.choose_stance(Stance::Flame).unwrap_err();
    assert!(matches!(
        err,
        DuelError::ActionRejected {
            reason: RejectReason::SameStance,
            ..
        }
    ));
    assert_eq!(seq.collaborators().events.len(), before);
    assert_eq!(seq.player().focus.value(), 6);
}

#[test]
fn test_enemy_stance_change_replaces_attack() {
    let mut config = forced_config();
    config.policy.stance_change_chance = 1.0;
    let mut seq = start(config, 8);
    seq.choose_stance(Stance::Wind).unwrap();
    wait_for_choice(&mut seq);

    // No strike was made; the enemy just moved off its empty stance
    assert_eq!(seq.player().body.hp(), 100);
    assert!(seq.enemy().body.stance().is_choosable());
    assert!(!seq
        .collaborators()
        .events
        .contains(&CollaboratorEvent::Warning(true)));
}

#[test]
fn test_enemy_wind_counters_unparried_attack() {
    let config = forced_config().with_enemy_stance(Stance::Wind);
    let mut seq = start(config, 6);
    assert_eq!(seq.enemy().body.stance(), Stance::Wind);

    // Flame basic lands for 13; the enemy never parried, so it counters
    seq.choose_basic_attack().unwrap();
    while seq.player_attack().is_some() {
        let press = on_target(&seq);
        seq.tick(DT, TickInput { key_pressed: press });
    }
    assert_eq!(seq.enemy().body.hp(), 87);
    assert_eq!(seq.player().body.hp(), 100 - rules::round_damage(8.0 * 1.2));
    assert_eq!(seq.player().body.hp(), 90);
    assert!(seq
        .collaborators()
        .floating_texts(Side::Player)
        .contains(&"Counter!"));
}

#[test]
fn test_enemy_flame_pierces_parried_strikes() {
    let config = forced_config().with_enemy_stance(Stance::Flame);
    let mut seq = start(config, 6);
    seq.choose_stance(Stance::Wind).unwrap();
    assert_eq!(seq.player().focus.value(), 0);

    // Both Pattern1 strikes are parried; each still pierces for 2
    run_until_choice(&mut seq, late_parry);
    assert_eq!(seq.player().body.hp(), 96);
    assert_eq!(seq.player().focus.value(), 2);
    assert_eq!(
        seq.collaborators().floating_texts(Side::Player),
        vec!["Pierced!", "Pierced!"]
    );
    // A pierced player answers with the counter sound
    assert_eq!(seq.collaborators().sfx(), vec!["Counter", "Counter"]);
    // A parried sequence earns no Wind counter
    assert_eq!(seq.enemy().body.hp(), 100);
}

#[test]
fn test_enemy_stone_suppresses_player_counter() {
    let config = forced_config().with_enemy_stance(Stance::Stone);
    let mut seq = start(config, 6);
    seq.choose_stance(Stance::Wind).unwrap();

    // Never parry: the player is undefended and in Wind, but Stone blocks it
    run_until_choice(&mut seq, |_| false);
    assert_eq!(seq.player().body.hp(), 100 - 2 * rules::basic_damage(8.0, Stance::Stone));
    assert_eq!(seq.player().body.hp(), 88);
    assert_eq!(seq.enemy().body.hp(), 100);
    assert!(!seq
        .collaborators()
        .floating_texts(Side::Enemy)
        .contains(&"Counter!"));
}

#[test]
fn test_player_stone_suppresses_enemy_counter() {
    let config = forced_config().with_enemy_stance(Stance::Wind);
    let mut seq = start(config, 6);
    seq.choose_stance(Stance::Stone).unwrap();
    wait_for_choice(&mut seq);
    let player_before = seq.player().body.hp();

    seq.choose_basic_attack().unwrap();
    while seq.player_attack().is_some() {
        let press = on_target(&seq);
        seq.tick(DT, TickInput { key_pressed: press });
    }
    assert_eq!(seq.enemy().body.hp(), 100 - rules::basic_damage(10.0, Stance::Stone));
    assert_eq!(seq.player().body.hp(), player_before);
    assert!(!seq
        .collaborators()
        .floating_texts(Side::Player)
        .contains(&"Counter!"));
}
