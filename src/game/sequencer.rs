//! Turn sequencer
//!
//! Drives the duel as an explicit state machine. Every wait of the encounter
//! (player choice, telegraphs, minigame windows, pacing pauses) is a named
//! [`SequencerState`] advanced by [`TurnSequencer::tick`]; player choices
//! arrive through [`TurnSequencer::submit`].
//!
//! ```text
//! AwaitingReady → Settle → AwaitingChoice ─┬─ StanceShift ───────────────┐
//!                                          └─ TimingWindow → TimingReveal │
//!                                             → PlayerRecover (per hit)   │
//!                                             → PlayerFollowThrough ──────┤
//!                                                                TurnHandoff
//!   ┌─ EnemyStanceShift ──────────────────────────────────────────────┐   │
//!   └─ Telegraph → EnemyRecover (per hit, PatternGap in Pattern3)      │ ←─┘
//!      → EnemyFollowThrough ───────────────────────→ AwaitingChoice ←──┘
//! ```
//!
//! Within a tick the player's parry timer advances before the sequencer
//! reads it.

/// Combat event logging that compiles away without the `verbose-logging`
/// feature, so hot simulation loops pay no `format!` cost.
macro_rules! log_event {
    ($self:expr, $level:expr, $category:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $self.logger.log($level, Some($category), &format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$self;
        }
    };
}

use crate::config::DuelConfig;
use crate::core::rules;
use crate::core::{
    AttackType, EnemyCombatant, EnemyPattern, EnemyStrike, ParryState, PlayerCombatant,
    SceneKey, Side, Stance, TimingResult,
};
use crate::error::DuelError;
use crate::game::actions::{available_actions, PlayerAction};
use crate::game::collaborators::Collaborators;
use crate::game::cues::{CuePhase, CueTable, Reaction};
use crate::game::enemy_policy::EnemyDecisionPolicy;
use crate::game::logger::{DuelLogger, VerbosityLevel};
use crate::game::timing::{TimingEngine, TARGET_TIME};
use crate::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Camera shake used by every combat reaction
const REACTION_SHAKE: (f32, f32) = (0.1, 0.2);

/// Input sampled once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickInput {
    /// The timing/parry key went down this tick
    pub key_pressed: bool,
}

impl TickInput {
    pub const IDLE: TickInput = TickInput { key_pressed: false };
    pub const PRESS: TickInput = TickInput { key_pressed: true };
}

/// How the encounter ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Enemy reduced to 0 HP
    Victory,
    /// Player reduced to 0 HP
    Defeat,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Victory => write!(f, "Victory"),
            Outcome::Defeat => write!(f, "Defeat"),
        }
    }
}

/// Where the sequencer is suspended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SequencerState {
    /// Waiting for the external readiness signal
    AwaitingReady,
    Settle { remaining: f32 },
    /// Player turn: waiting for an action
    AwaitingChoice,
    /// Player changed stance; the turn is spent
    StanceShift { remaining: f32 },
    /// Timing minigame open for the current player hit
    TimingWindow,
    /// Minigame result shown before the hit lands
    TimingReveal { result: TimingResult, remaining: f32 },
    PlayerRecover { remaining: f32 },
    PlayerFollowThrough { remaining: f32 },
    /// Pause between the player's turn and the enemy's
    TurnHandoff { remaining: f32 },
    EnemyStanceShift { remaining: f32 },
    /// Enemy wind-up; the parry key is live
    Telegraph { elapsed: f32 },
    EnemyRecover { remaining: f32 },
    /// Pause between the two halves of Pattern3
    PatternGap { remaining: f32 },
    EnemyFollowThrough { remaining: f32 },
    Terminal(Outcome),
    /// Encounter abandoned before it was decided
    Cancelled,
}

impl SequencerState {
    /// No further ticks will change anything
    pub fn is_finished(&self) -> bool {
        matches!(self, SequencerState::Terminal(_) | SequencerState::Cancelled)
    }

    /// Whose turn this state belongs to
    pub fn turn_side(&self) -> Option<Side> {
        match self {
            SequencerState::AwaitingChoice
            | SequencerState::StanceShift { .. }
            | SequencerState::TimingWindow
            | SequencerState::TimingReveal { .. }
            | SequencerState::PlayerRecover { .. }
            | SequencerState::PlayerFollowThrough { .. }
            | SequencerState::TurnHandoff { .. } => Some(Side::Player),
            SequencerState::EnemyStanceShift { .. }
            | SequencerState::Telegraph { .. }
            | SequencerState::EnemyRecover { .. }
            | SequencerState::PatternGap { .. }
            | SequencerState::EnemyFollowThrough { .. } => Some(Side::Enemy),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SequencerState::AwaitingReady => "AwaitingReady",
            SequencerState::Settle { .. } => "Settle",
            SequencerState::AwaitingChoice => "AwaitingChoice",
            SequencerState::StanceShift { .. } => "StanceShift",
            SequencerState::TimingWindow => "TimingWindow",
            SequencerState::TimingReveal { .. } => "TimingReveal",
            SequencerState::PlayerRecover { .. } => "PlayerRecover",
            SequencerState::PlayerFollowThrough { .. } => "PlayerFollowThrough",
            SequencerState::TurnHandoff { .. } => "TurnHandoff",
            SequencerState::EnemyStanceShift { .. } => "EnemyStanceShift",
            SequencerState::Telegraph { .. } => "Telegraph",
            SequencerState::EnemyRecover { .. } => "EnemyRecover",
            SequencerState::PatternGap { .. } => "PatternGap",
            SequencerState::EnemyFollowThrough { .. } => "EnemyFollowThrough",
            SequencerState::Terminal(_) => "Terminal",
            SequencerState::Cancelled => "Cancelled",
        }
    }
}

/// What the key means right now, for controllers deciding when to press
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyPrompt {
    /// Minigame open: press as close to `target` as possible
    Timing {
        elapsed: f32,
        target: f32,
        window: f32,
    },
    /// Enemy telegraph: the hit lands when `elapsed` reaches `window`
    Parry {
        elapsed: f32,
        window: f32,
        parry_duration: f32,
        can_parry: bool,
    },
}

/// Player attack in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAttackPlan {
    pub attack: AttackType,
    /// 1-based index of the hit being resolved
    pub hit: u8,
}

impl PlayerAttackPlan {
    /// Specials never earn Focus
    pub fn earns_focus(&self) -> bool {
        !self.attack.is_special()
    }
}

/// Enemy attack in flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyAttackPlan {
    pub pattern: EnemyPattern,
    pub strikes: SmallVec<[EnemyStrike; 4]>,
    /// Index into `strikes` of the strike being resolved
    pub index: usize,
}

impl EnemyAttackPlan {
    fn new(pattern: EnemyPattern) -> Self {
        EnemyAttackPlan {
            pattern,
            strikes: pattern.strikes(),
            index: 0,
        }
    }

    pub fn current(&self) -> Option<EnemyStrike> {
        self.strikes.get(self.index).copied()
    }
}

/// Count a wait down; `Some(left)` while it is still running
fn count_down(remaining: f32, dt: f32) -> Option<f32> {
    let left = remaining - dt;
    if left > 0.0 {
        Some(left)
    } else {
        None
    }
}

/// The duel state machine
pub struct TurnSequencer<C: Collaborators> {
    config: DuelConfig,
    player: PlayerCombatant,
    enemy: EnemyCombatant,
    timing: TimingEngine,
    policy: EnemyDecisionPolicy,
    cues: CueTable,
    rng: ChaCha12Rng,
    collaborators: C,
    logger: DuelLogger,
    state: SequencerState,
    player_attack: Option<PlayerAttackPlan>,
    enemy_attack: Option<EnemyAttackPlan>,
    warning_visible: bool,
    turn_number: u32,
    ticks: u64,
    elapsed: f64,
}

impl<C: Collaborators> TurnSequencer<C> {
    /// Create a sequencer for one encounter. The RNG is seeded for
    /// reproducible rolls.
    pub fn new(config: DuelConfig, collaborators: C, seed: u64) -> Result<Self> {
        config.validate()?;
        let parry = ParryState::new(config.parry_base_duration, config.parry_cooldown);
        Ok(TurnSequencer {
            player: PlayerCombatant::new(config.player.max_hp, config.player.base_attack, parry),
            enemy: EnemyCombatant::new(
                config.enemy.max_hp,
                config.enemy.base_attack,
                config.base_enemy_parry,
                config.enemy_stance,
            ),
            timing: TimingEngine::new(),
            policy: EnemyDecisionPolicy::new(&config.policy),
            cues: CueTable::default(),
            rng: ChaCha12Rng::seed_from_u64(seed),
            collaborators,
            logger: DuelLogger::new(),
            state: SequencerState::AwaitingReady,
            player_attack: None,
            enemy_attack: None,
            warning_visible: false,
            turn_number: 0,
            ticks: 0,
            elapsed: 0.0,
            config,
        })
    }

    pub fn with_cues(mut self, cues: CueTable) -> Self {
        self.cues = cues;
        self
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.logger.set_verbosity(verbosity);
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            SequencerState::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn player(&self) -> &PlayerCombatant {
        &self.player
    }

    pub fn enemy(&self) -> &EnemyCombatant {
        &self.enemy
    }

    pub fn config(&self) -> &DuelConfig {
        &self.config
    }

    pub fn timing(&self) -> &TimingEngine {
        &self.timing
    }

    pub fn player_attack(&self) -> Option<&PlayerAttackPlan> {
        self.player_attack.as_ref()
    }

    pub fn enemy_attack(&self) -> Option<&EnemyAttackPlan> {
        self.enemy_attack.as_ref()
    }

    /// Player turns started so far
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds since the first tick
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn collaborators(&self) -> &C {
        &self.collaborators
    }

    pub fn collaborators_mut(&mut self) -> &mut C {
        &mut self.collaborators
    }

    pub fn into_collaborators(self) -> C {
        self.collaborators
    }

    pub fn logger(&self) -> &DuelLogger {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut DuelLogger {
        &mut self.logger
    }

    /// Actions the player may submit right now
    pub fn available_actions(&self) -> SmallVec<[PlayerAction; 6]> {
        if self.state != SequencerState::AwaitingChoice {
            return SmallVec::new();
        }
        available_actions(self.player.body.stance(), self.player.focus)
    }

    /// What pressing the key would do this tick, if anything
    pub fn key_prompt(&self) -> Option<KeyPrompt> {
        match self.state {
            SequencerState::TimingWindow => Some(KeyPrompt::Timing {
                elapsed: self.timing.elapsed().unwrap_or(0.0),
                target: TARGET_TIME,
                window: self.config.timing_bands.window(),
            }),
            SequencerState::Telegraph { elapsed } => Some(KeyPrompt::Parry {
                elapsed,
                window: self.config.telegraph_window,
                parry_duration: self.player.parry.duration_for(self.player.body.stance()),
                can_parry: self.player.parry.can_parry(),
            }),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // External events
    // ------------------------------------------------------------------

    /// Camera framing is complete; start the settle delay
    pub fn signal_ready(&mut self) {
        if self.state == SequencerState::AwaitingReady {
            log_event!(self, VerbosityLevel::Verbose, "turn", "Ready signal received");
            self.state = SequencerState::Settle {
                remaining: self.config.pacing.settle,
            };
        }
    }

    pub fn choose_stance(&mut self, stance: Stance) -> Result<()> {
        self.submit(PlayerAction::ChooseStance(stance))
    }

    pub fn choose_basic_attack(&mut self) -> Result<()> {
        self.submit(PlayerAction::BasicAttack)
    }

    pub fn choose_enhance_attack(&mut self) -> Result<()> {
        self.submit(PlayerAction::EnhanceAttack)
    }

    pub fn choose_special(&mut self) -> Result<()> {
        self.submit(PlayerAction::Special)
    }

    /// Submit the player's turn action.
    ///
    /// Only legal while [`SequencerState::AwaitingChoice`]; gated actions are
    /// rejected without touching any state.
    pub fn submit(&mut self, action: PlayerAction) -> Result<()> {
        match self.state {
            SequencerState::AwaitingChoice => {}
            SequencerState::Terminal(_) | SequencerState::Cancelled => {
                return Err(DuelError::EncounterOver)
            }
            SequencerState::AwaitingReady | SequencerState::Settle { .. } => {
                return Err(DuelError::NotStarted)
            }
            _ => return Err(DuelError::NotAwaitingChoice),
        }

        let stance = self.player.body.stance();
        action
            .validate(stance, self.player.focus)
            .map_err(|reason| DuelError::ActionRejected { action, reason })?;

        self.collaborators.show_actions(false);
        log_event!(self, VerbosityLevel::Normal, "choice", "Player chose: {}", action);

        match action {
            PlayerAction::ChooseStance(new_stance) => {
                self.player.change_stance(new_stance);
                self.collaborators
                    .play_cue(Side::Player, CueTable::stance_change_cue(new_stance));
                self.collaborators.update_focus(self.player.focus.value());
                self.collaborators.refresh_action_buttons(new_stance, self.player.focus.value());
                log_event!(self, VerbosityLevel::Normal, "stance", "Player stance -> {} (focus 0)", new_stance);
                self.state = SequencerState::StanceShift {
                    remaining: self.config.pacing.stance_change,
                };
            }
            PlayerAction::BasicAttack | PlayerAction::EnhanceAttack | PlayerAction::Special => {
                // Validation guarantees both the attack type and the Focus
                let Some(attack) = action.attack_type(stance) else {
                    return Err(DuelError::ActionRejected {
                        action,
                        reason: crate::error::RejectReason::NoStance,
                    });
                };
                if attack.focus_cost() > 0 {
                    self.player.focus.spend(attack.focus_cost());
                    self.collaborators.update_focus(self.player.focus.value());
                }
                self.begin_player_attack(attack);
            }
        }
        Ok(())
    }

    /// Advance the encounter by one tick of `dt` seconds
    pub fn tick(&mut self, dt: f32, input: TickInput) -> SequencerState {
        if self.state.is_finished() {
            return self.state;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.ticks += 1;
        self.elapsed += f64::from(dt);

        // Background timer first: the sequencer reads settled flags
        self.player.parry.advance(dt);

        match self.state {
            SequencerState::AwaitingReady
            | SequencerState::AwaitingChoice
            | SequencerState::Terminal(_)
            | SequencerState::Cancelled => {}

            SequencerState::Settle { remaining } => match count_down(remaining, dt) {
                Some(left) => self.state = SequencerState::Settle { remaining: left },
                None => {
                    self.start_encounter_ui();
                    self.begin_player_turn();
                }
            },

            SequencerState::StanceShift { remaining } => match count_down(remaining, dt) {
                Some(left) => self.state = SequencerState::StanceShift { remaining: left },
                None => self.end_player_turn(),
            },

            SequencerState::TimingWindow => {
                if let Some(result) = self.timing.tick(dt, input.key_pressed) {
                    log_event!(self, VerbosityLevel::Verbose, "hit", "Timing: {}", result);
                    self.state = SequencerState::TimingReveal {
                        result,
                        remaining: self.config.pacing.timing_reveal,
                    };
                }
            }

            SequencerState::TimingReveal { result, remaining } => {
                match count_down(remaining, dt) {
                    Some(left) => {
                        self.state = SequencerState::TimingReveal {
                            result,
                            remaining: left,
                        }
                    }
                    None => self.resolve_player_hit(result),
                }
            }

            SequencerState::PlayerRecover { remaining } => match count_down(remaining, dt) {
                Some(left) => self.state = SequencerState::PlayerRecover { remaining: left },
                None => self.after_player_hit(),
            },

            SequencerState::PlayerFollowThrough { remaining } => {
                match count_down(remaining, dt) {
                    Some(left) => {
                        self.state = SequencerState::PlayerFollowThrough { remaining: left }
                    }
                    None => self.end_player_turn(),
                }
            }

            SequencerState::TurnHandoff { remaining } => match count_down(remaining, dt) {
                Some(left) => self.state = SequencerState::TurnHandoff { remaining: left },
                None => self.begin_enemy_turn(),
            },

            SequencerState::EnemyStanceShift { remaining } => match count_down(remaining, dt) {
                Some(left) => self.state = SequencerState::EnemyStanceShift { remaining: left },
                None => {
                    self.play_idle(Side::Enemy);
                    self.begin_player_turn();
                }
            },

            SequencerState::Telegraph { elapsed } => {
                if input.key_pressed {
                    self.try_parry();
                }
                let elapsed = elapsed + dt;
                if elapsed >= self.config.telegraph_window {
                    self.resolve_enemy_strike();
                } else {
                    self.state = SequencerState::Telegraph { elapsed };
                }
            }

            SequencerState::EnemyRecover { remaining } => match count_down(remaining, dt) {
                Some(left) => self.state = SequencerState::EnemyRecover { remaining: left },
                None => self.after_enemy_strike(),
            },

            SequencerState::PatternGap { remaining } => match count_down(remaining, dt) {
                Some(left) => self.state = SequencerState::PatternGap { remaining: left },
                None => self.start_enemy_strike(),
            },

            SequencerState::EnemyFollowThrough { remaining } => {
                match count_down(remaining, dt) {
                    Some(left) => {
                        self.state = SequencerState::EnemyFollowThrough { remaining: left }
                    }
                    None => self.begin_player_turn(),
                }
            }
        }

        self.state
    }

    /// Abandon the encounter: drop every pending wait and put shared flags
    /// back to their safe defaults. A decided encounter stays decided.
    pub fn cancel(&mut self) {
        if matches!(self.state, SequencerState::Terminal(_)) {
            return;
        }
        self.timing.cancel();
        self.player.parry.cancel();
        self.player.body.begin_defense();
        self.enemy.body.begin_defense();
        self.player_attack = None;
        self.enemy_attack = None;
        if self.warning_visible {
            self.set_warning(false);
        }
        if self.state == SequencerState::AwaitingChoice {
            self.collaborators.show_actions(false);
        }
        log_event!(self, VerbosityLevel::Normal, "terminal", "Encounter cancelled in {}", self.state.name());
        self.state = SequencerState::Cancelled;
    }

    /// Start the encounter over with fresh combatants, keeping RNG state
    pub fn restart(&mut self) {
        self.cancel();
        self.player.restore();
        self.enemy.restore();
        self.player_attack = None;
        self.enemy_attack = None;
        self.turn_number = 0;
        self.ticks = 0;
        self.elapsed = 0.0;
        self.state = SequencerState::AwaitingReady;
    }

    // ------------------------------------------------------------------
    // Player turn
    // ------------------------------------------------------------------

    fn start_encounter_ui(&mut self) {
        self.collaborators.start_ui();
        self.publish_hp(Side::Player);
        self.publish_hp(Side::Enemy);
        self.collaborators.update_focus(self.player.focus.value());
        self.play_idle(Side::Player);
        self.play_idle(Side::Enemy);
    }

    fn begin_player_turn(&mut self) {
        self.turn_number += 1;
        log_event!(
            self,
            VerbosityLevel::Normal,
            "turn",
            "=== Turn {} === Player {} HP, {} focus, {} | Enemy {} HP, {}",
            self.turn_number,
            self.player.body.hp(),
            self.player.focus.value(),
            self.player.body.stance(),
            self.enemy.body.hp(),
            self.enemy.body.stance()
        );
        self.play_idle(Side::Player);
        self.state = SequencerState::AwaitingChoice;
        self.collaborators
            .refresh_action_buttons(self.player.body.stance(), self.player.focus.value());
        self.collaborators.show_actions(true);
    }

    fn begin_player_attack(&mut self, attack: AttackType) {
        self.enemy.body.begin_defense();
        self.player_attack = Some(PlayerAttackPlan { attack, hit: 1 });
        self.start_player_hit();
    }

    fn start_player_hit(&mut self) {
        let Some(plan) = self.player_attack else {
            return self.end_player_turn();
        };
        if let Some(cue) = self.cues.player_cue(plan.attack, plan.hit, CuePhase::Telegraph) {
            self.collaborators.play_cue(Side::Player, cue);
        }
        self.timing.start(self.config.timing_bands);
        self.state = SequencerState::TimingWindow;
    }

    fn resolve_player_hit(&mut self, result: TimingResult) {
        let Some(plan) = self.player_attack else {
            return self.end_player_turn();
        };
        let chance = rules::enemy_parry_chance(self.enemy.base_parry, result);
        let roll: f32 = self.rng.gen();
        let parried = roll < chance;
        log_event!(
            self,
            VerbosityLevel::Verbose,
            "hit",
            "{} hit {}/{}: {} -> enemy parry chance {:.2}, roll {:.3}",
            plan.attack,
            plan.hit,
            plan.attack.hit_count(),
            result,
            chance,
            roll
        );

        if let Some(cue) = self.cues.player_cue(plan.attack, plan.hit, CuePhase::Attack) {
            self.collaborators.play_cue(Side::Player, cue);
        }

        if parried {
            let pierce = self.player.body.pierce_damage();
            if pierce > 0 {
                self.apply_damage(Side::Enemy, pierce);
                self.react(Side::Enemy, Reaction::Pierced);
                log_event!(self, VerbosityLevel::Normal, "parry", "Enemy parries, Flame pierces for {}", pierce);
            } else {
                self.react(Side::Enemy, Reaction::Parried);
                log_event!(self, VerbosityLevel::Normal, "parry", "Enemy parries");
            }
            self.enemy.body.mark_defended();
        } else {
            let damage = self.player.body.basic_damage();
            self.apply_damage(Side::Enemy, damage);
            if plan.earns_focus() {
                self.player.focus.gain();
                self.collaborators.update_focus(self.player.focus.value());
            }
            self.react(Side::Enemy, Reaction::Hit);
            log_event!(
                self,
                VerbosityLevel::Normal,
                "hit",
                "Player hits for {} (enemy {} HP)",
                damage,
                self.enemy.body.hp()
            );
        }

        if self.enemy.body.is_defeated() {
            return self.enter_terminal(Outcome::Victory);
        }
        self.state = SequencerState::PlayerRecover {
            remaining: self.config.pacing.post_hit,
        };
    }

    fn after_player_hit(&mut self) {
        self.play_idle(Side::Enemy);
        self.play_idle(Side::Player);
        let Some(plan) = self.player_attack.as_mut() else {
            return self.end_player_turn();
        };
        if plan.hit < plan.attack.hit_count() {
            plan.hit += 1;
            self.start_player_hit();
        } else {
            self.finish_player_attack();
        }
    }

    fn finish_player_attack(&mut self) {
        let attack = self.player_attack.take().map(|p| p.attack);

        if rules::wind_counter_applies(
            self.enemy.body.went_undefended(),
            self.enemy.body.stance(),
            self.player.body.stance(),
        ) {
            let counter = self.enemy.wind_counter_damage();
            self.apply_damage(Side::Player, counter);
            self.react(Side::Player, Reaction::Countered);
            log_event!(self, VerbosityLevel::Normal, "counter", "Enemy Wind counter for {}", counter);
            if self.player.body.is_defeated() {
                return self.enter_terminal(Outcome::Defeat);
            }
        }

        if attack.is_some_and(AttackType::is_special) {
            if let Some(cue) = CueTable::special_effect_cue(self.player.body.stance()) {
                self.collaborators.play_special_effect(cue);
            }
        }

        self.state = SequencerState::PlayerFollowThrough {
            remaining: self.config.pacing.attack_follow_through,
        };
    }

    fn end_player_turn(&mut self) {
        self.player_attack = None;
        self.play_idle(Side::Player);
        self.state = SequencerState::TurnHandoff {
            remaining: self.config.pacing.turn_handoff,
        };
    }

    // ------------------------------------------------------------------
    // Enemy turn
    // ------------------------------------------------------------------

    fn begin_enemy_turn(&mut self) {
        let current = self.enemy.body.stance();
        if let Some(new_stance) = self.policy.try_change_stance(current, &mut self.rng) {
            self.enemy.body.set_stance(new_stance);
            self.collaborators
                .play_cue(Side::Enemy, CueTable::stance_change_cue(new_stance));
            log_event!(self, VerbosityLevel::Normal, "stance", "Enemy stance {} -> {}", current, new_stance);
            self.state = SequencerState::EnemyStanceShift {
                remaining: self.config.pacing.enemy_stance_change,
            };
            return;
        }

        self.player.body.begin_defense();
        let pattern = self.policy.decide_pattern(&mut self.rng);
        log_event!(self, VerbosityLevel::Normal, "turn", "Enemy attacks with {:?}", pattern);
        self.enemy_attack = Some(EnemyAttackPlan::new(pattern));
        self.start_enemy_strike();
    }

    fn start_enemy_strike(&mut self) {
        let Some(strike) = self.enemy_attack.as_ref().and_then(EnemyAttackPlan::current) else {
            return self.finish_enemy_attack();
        };
        self.set_warning(true);
        if let Some(cue) = self.cues.enemy_cue(strike, CuePhase::Telegraph) {
            self.collaborators.play_cue(Side::Enemy, cue);
        }
        self.state = SequencerState::Telegraph { elapsed: 0.0 };
    }

    fn try_parry(&mut self) {
        if self.player.try_start_parry() {
            self.collaborators.play_cue(Side::Player, "StartParry");
            log_event!(
                self,
                VerbosityLevel::Verbose,
                "parry",
                "Parry raised for {:.2}s",
                self.player.parry.duration_for(self.player.body.stance())
            );
        } else {
            log_event!(self, VerbosityLevel::Verbose, "parry", "Parry press ignored (cooldown)");
        }
    }

    fn resolve_enemy_strike(&mut self) {
        self.set_warning(false);
        if let Some(strike) = self.enemy_attack.as_ref().and_then(EnemyAttackPlan::current) {
            if let Some(cue) = self.cues.enemy_cue(strike, CuePhase::Attack) {
                self.collaborators.play_cue(Side::Enemy, cue);
            }
        }

        if self.player.parry.is_parrying() {
            let pierce = self.enemy.body.pierce_damage();
            if pierce > 0 {
                self.apply_damage(Side::Player, pierce);
                self.react(Side::Player, Reaction::Pierced);
                log_event!(self, VerbosityLevel::Normal, "parry", "Player parries, Flame pierces for {}", pierce);
            } else {
                self.react(Side::Player, Reaction::Parried);
                log_event!(self, VerbosityLevel::Normal, "parry", "Player parries");
            }
            self.player.focus.gain();
            self.collaborators.update_focus(self.player.focus.value());
            self.player.body.mark_defended();
        } else {
            let damage = self.enemy.body.basic_damage();
            self.apply_damage(Side::Player, damage);
            self.react(Side::Player, Reaction::Hit);
            log_event!(
                self,
                VerbosityLevel::Normal,
                "hit",
                "Enemy hits for {} (player {} HP)",
                damage,
                self.player.body.hp()
            );
        }

        if self.player.body.is_defeated() {
            return self.enter_terminal(Outcome::Defeat);
        }
        self.state = SequencerState::EnemyRecover {
            remaining: self.config.pacing.post_hit,
        };
    }

    fn after_enemy_strike(&mut self) {
        self.player.parry.force_reset();
        self.play_idle(Side::Enemy);
        self.play_idle(Side::Player);

        let Some(plan) = self.enemy_attack.as_mut() else {
            return self.finish_enemy_attack();
        };
        plan.index += 1;
        let pattern = plan.pattern;
        let index = plan.index;
        let total = plan.strikes.len();

        if index >= total {
            return self.finish_enemy_attack();
        }
        // Pattern3 pauses where Pattern2's hits give way to Pattern1's
        let gap_at = EnemyPattern::Pattern2.hit_count();
        if pattern == EnemyPattern::Pattern3 && index == gap_at {
            self.state = SequencerState::PatternGap {
                remaining: self.config.pacing.pattern_gap,
            };
        } else {
            self.start_enemy_strike();
        }
    }

    fn finish_enemy_attack(&mut self) {
        self.enemy_attack = None;
        self.play_idle(Side::Enemy);

        if rules::wind_counter_applies(
            self.player.body.went_undefended(),
            self.player.body.stance(),
            self.enemy.body.stance(),
        ) {
            let counter = self.player.wind_counter_damage(self.enemy.body.base_attack);
            self.apply_damage(Side::Enemy, counter);
            self.react(Side::Enemy, Reaction::Countered);
            log_event!(self, VerbosityLevel::Normal, "counter", "Player Wind counter for {}", counter);
            if self.enemy.body.is_defeated() {
                return self.enter_terminal(Outcome::Victory);
            }
        }

        self.player.parry.force_reset();
        self.state = SequencerState::EnemyFollowThrough {
            remaining: self.config.pacing.enemy_follow_through,
        };
    }

    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    fn apply_damage(&mut self, side: Side, amount: i32) -> i32 {
        let applied = match side {
            Side::Player => self.player.body.take_damage(amount),
            Side::Enemy => self.enemy.body.take_damage(amount),
        };
        self.publish_hp(side);
        applied
    }

    fn publish_hp(&mut self, side: Side) {
        let body = match side {
            Side::Player => &self.player.body,
            Side::Enemy => &self.enemy.body,
        };
        let (current, max) = (body.hp(), body.max_hp());
        self.collaborators.update_hp(side, current, max);
    }

    fn play_idle(&mut self, side: Side) {
        let stance = match side {
            Side::Player => {
                // An active parry pose is not interrupted
                if self.player.parry.is_parrying() {
                    return;
                }
                self.player.body.stance()
            }
            Side::Enemy => self.enemy.body.stance(),
        };
        self.collaborators.play_cue(side, CueTable::idle_cue(stance));
    }

    /// Feedback on `side` for something that happened to it
    fn react(&mut self, side: Side, reaction: Reaction) {
        self.collaborators.play_cue(side, CueTable::reaction_cue(reaction));
        let Some((text, sfx)) = CueTable::reaction_feedback(side, reaction) else {
            return;
        };
        self.collaborators.spawn_floating_text(side, text);
        self.collaborators.play_sfx(sfx);
        let (intensity, duration) = REACTION_SHAKE;
        self.collaborators.shake_camera(intensity, duration);
    }

    fn set_warning(&mut self, visible: bool) {
        if self.warning_visible != visible {
            self.warning_visible = visible;
            self.collaborators.show_warning(visible);
        }
    }

    fn enter_terminal(&mut self, outcome: Outcome) {
        if self.state.is_finished() {
            return;
        }
        self.timing.cancel();
        self.player.parry.cancel();
        self.player_attack = None;
        self.enemy_attack = None;
        if self.warning_visible {
            self.set_warning(false);
        }

        let (loser, key) = match outcome {
            Outcome::Victory => (Side::Enemy, SceneKey::level(self.config.level + 1)),
            Outcome::Defeat => (Side::Player, SceneKey::level(self.config.level)),
        };
        self.react(loser, Reaction::Death);
        self.state = SequencerState::Terminal(outcome);

        // Outcome lines are not gated by the verbose-logging feature
        self.logger.log(
            VerbosityLevel::Minimal,
            Some("terminal"),
            &format!(
                "{} on turn {} (player {} HP, enemy {} HP) -> {}",
                outcome,
                self.turn_number,
                self.player.body.hp(),
                self.enemy.body.hp(),
                key
            ),
        );
        self.collaborators.close_scene(&key);
    }
}

impl<C: Collaborators + fmt::Debug> fmt::Debug for TurnSequencer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnSequencer")
            .field("state", &self.state)
            .field("turn_number", &self.turn_number)
            .field("player_hp", &self.player.body.hp())
            .field("enemy_hp", &self.enemy.body.hp())
            .field("collaborators", &self.collaborators)
            .finish()
    }
}
