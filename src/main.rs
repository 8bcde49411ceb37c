//! Stance Duel - Main Binary
//!
//! Runs single encounters with a chosen controller, or parallel gauntlets
//! for balance statistics.

use clap::{Parser, Subcommand, ValueEnum};
use stance_duel::{
    config::{DuelConfig, PacingConfig},
    game::{
        DuelLoop, DuelScript, OutputFormat, OutputMode, PlayerAction, PlayerController,
        RandomController, RecordingCollaborators, ScriptedController, SkilledController,
        TurnSequencer, VerbosityLevel, ZeroController,
    },
    gauntlet::{self, ControllerType as GauntletController},
    DuelError, Result,
};
use std::path::PathBuf;

/// Controller type for the player side
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ControllerType {
    /// Always takes the first legal action, never presses the key
    Zero,
    /// Random actions and random key timing
    Random,
    /// Specials first, presses on target, parries on impact
    Skilled,
    /// Follows --script or --actions
    Scripted,
}

/// Verbosity level for combat output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Stance Duel - tick-driven turn-based duel engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one encounter
    Duel {
        /// Player controller type
        #[arg(long, value_enum, default_value = "skilled")]
        controller: ControllerType,

        /// JSON script for the scripted controller
        #[arg(long, value_name = "SCRIPT_FILE")]
        script: Option<PathBuf>,

        /// Comma separated actions for the scripted controller (e.g. "stance:wind,basic")
        #[arg(long, value_name = "ACTIONS")]
        actions: Option<String>,

        /// JSON duel configuration
        #[arg(long, value_name = "CONFIG_FILE")]
        config: Option<PathBuf>,

        /// Override the level number
        #[arg(long)]
        level: Option<u32>,

        /// Set random seed for deterministic runs
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Skip every pacing pause
        #[arg(long)]
        instant: bool,

        /// Maximum ticks before giving up
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Verbosity level for combat output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,

        /// Log line format
        #[arg(long, value_enum, default_value = "text")]
        log_format: LogFormat,

        /// Print the result summary as JSON
        #[arg(long)]
        json: bool,

        /// Print every collaborator call as a JSON line after the encounter
        #[arg(long)]
        dump_events: bool,

        /// Buffer the combat log and print only its last N lines at the end
        #[arg(long, value_name = "N")]
        log_tail: Option<usize>,
    },

    /// Run many encounters in parallel and report statistics
    Gauntlet {
        /// Number of encounters
        #[arg(long, default_value_t = 1000)]
        encounters: usize,

        /// Player controller type (scripted is not supported here)
        #[arg(long, value_enum, default_value = "skilled")]
        controller: ControllerType,

        /// JSON duel configuration
        #[arg(long, value_name = "CONFIG_FILE")]
        config: Option<PathBuf>,

        /// Gauntlet seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Keep the pacing pauses (slower, same outcomes)
        #[arg(long)]
        paced: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Duel {
            controller,
            script,
            actions,
            config,
            level,
            seed,
            instant,
            max_ticks,
            verbosity,
            log_format,
            json,
            dump_events,
            log_tail,
        } => {
            let options = DuelOptions {
                controller,
                script,
                actions,
                config,
                level,
                seed,
                instant,
                max_ticks,
                verbosity: verbosity.into(),
                log_format,
                json,
                dump_events,
                log_tail,
            };
            run_duel(options)?
        }
        Commands::Gauntlet {
            encounters,
            controller,
            config,
            seed,
            paced,
            json,
        } => run_gauntlet(encounters, controller, config, seed, paced, json)?,
    }

    Ok(())
}

struct DuelOptions {
    controller: ControllerType,
    script: Option<PathBuf>,
    actions: Option<String>,
    config: Option<PathBuf>,
    level: Option<u32>,
    seed: u64,
    instant: bool,
    max_ticks: Option<u64>,
    verbosity: VerbosityLevel,
    log_format: LogFormat,
    json: bool,
    dump_events: bool,
    log_tail: Option<usize>,
}

fn load_config(path: Option<&PathBuf>) -> Result<DuelConfig> {
    match path {
        Some(path) => DuelConfig::from_json_file(path),
        None => Ok(DuelConfig::default()),
    }
}

fn parse_actions(list: &str) -> Result<Vec<PlayerAction>> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<PlayerAction>().map_err(DuelError::InvalidConfig))
        .collect()
}

fn build_controller(options: &DuelOptions) -> Result<Box<dyn PlayerController>> {
    let controller_seed = options.seed.wrapping_add(0x1234_5678_9ABC_DEF0);
    Ok(match options.controller {
        ControllerType::Zero => Box::new(ZeroController::new()),
        ControllerType::Random => Box::new(RandomController::with_seed(controller_seed)),
        ControllerType::Skilled => Box::new(SkilledController::new()),
        ControllerType::Scripted => {
            let script = match (&options.script, &options.actions) {
                (Some(path), _) => DuelScript::from_json_file(path)?,
                (None, Some(list)) => DuelScript::new(parse_actions(list)?),
                (None, None) => {
                    return Err(DuelError::InvalidConfig(
                        "--controller scripted requires --script or --actions".to_string(),
                    ))
                }
            };
            Box::new(ScriptedController::new(script))
        }
    })
}

fn run_duel(options: DuelOptions) -> Result<()> {
    let mut config = load_config(options.config.as_ref())?;
    if let Some(level) = options.level {
        config.level = level;
    }
    if options.instant {
        config.pacing = PacingConfig::instant();
    }

    let mut controller = build_controller(&options)?;
    let mut sequencer = TurnSequencer::new(config, RecordingCollaborators::new(), options.seed)?
        .with_verbosity(options.verbosity);
    if matches!(options.log_format, LogFormat::Json) {
        sequencer.logger_mut().set_output_format(OutputFormat::Json);
    }
    if options.json || options.log_tail.is_some() {
        // Keep stdout clean for the summary
        sequencer.logger_mut().set_output_mode(OutputMode::Memory);
    }

    if !options.json {
        println!("=== Stance Duel - Level {} ===", sequencer.config().level);
        println!("Controller: {}  Seed: {}\n", controller.name(), options.seed);
    }

    let mut duel_loop = DuelLoop::new(&mut sequencer);
    if let Some(max_ticks) = options.max_ticks {
        duel_loop = duel_loop.with_max_ticks(max_ticks);
    }
    let result = duel_loop.run_encounter(controller.as_mut())?;
    if let (Some(tail), false) = (options.log_tail, options.json) {
        sequencer.logger_mut().flush_tail(tail);
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("\n=== Encounter Over ===");
        println!("Result: {:?}", result.end_reason);
        println!("Turns: {}", result.turns);
        println!(
            "Simulated time: {:.2}s ({} ticks)",
            result.elapsed, result.ticks
        );
        println!("Player HP: {}  Enemy HP: {}", result.player_hp, result.enemy_hp);
    }

    if options.dump_events {
        for event in &sequencer.collaborators().events {
            println!("{}", serde_json::to_string(event)?);
        }
    }
    Ok(())
}

fn run_gauntlet(
    encounters: usize,
    controller: ControllerType,
    config_path: Option<PathBuf>,
    seed: u64,
    paced: bool,
    json: bool,
) -> Result<()> {
    let controller = match controller {
        ControllerType::Zero => GauntletController::Zero,
        ControllerType::Random => GauntletController::Random,
        ControllerType::Skilled => GauntletController::Skilled,
        ControllerType::Scripted => {
            return Err(DuelError::InvalidConfig(
                "the scripted controller cannot run a gauntlet".to_string(),
            ))
        }
    };
    let mut config = load_config(config_path.as_ref())?;
    if !paced {
        config.pacing = PacingConfig::instant();
    }

    if !json {
        println!("=== Stance Duel - Gauntlet Mode ===\n");
        println!("Running {encounters} encounters with {controller:?} (seed {seed})\n");
    }
    let report = gauntlet::run_gauntlet(&config, controller, encounters, seed)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_summary();
    }
    Ok(())
}
