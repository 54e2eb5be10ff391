//! # Burrow Headless Runner
//!
//! Plays a game with the built-in auto player and prints where it ended up.
//! Useful for soak-testing generation and the turn loop without a front end.

use burrow::{AutoPlayer, BurrowResult, GameConfig, GameState, TurnOutcome};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

/// Command line arguments for the headless runner.
#[derive(Parser, Debug)]
#[command(name = "burrow")]
#[command(about = "Headless runner for the Burrow roguelike simulation")]
#[command(version)]
struct Args {
    /// Random seed for world generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Explore the open world instead of the dungeon
    #[arg(long)]
    overworld: bool,

    /// Number of commands the auto player issues
    #[arg(short, long, default_value_t = 500)]
    turns: u32,

    /// Resume from this save file instead of starting fresh
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write the final state to this save file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    if let Err(err) = run(&args) {
        error!("{}", err);
        std::process::exit(1);
    }
}

fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .format_target(false)
            .init();
    }
}

fn run(args: &Args) -> BurrowResult<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("Starting Burrow v{} with seed {}", burrow::VERSION, seed);

    let resumed = args.load.as_deref().and_then(GameState::load_or_none);
    let mut state = match resumed {
        Some(state) => state,
        None => {
            let config = if args.overworld {
                GameConfig::overworld(seed)
            } else {
                GameConfig::dungeon(seed)
            };
            GameState::new(&config)?
        }
    };

    let mut auto = AutoPlayer::new(seed);
    let mut taken = 0u32;
    for _ in 0..args.turns {
        let command = auto.next_command(&state);
        match state.play_turn(command, &mut auto)? {
            TurnOutcome::Taken => taken += 1,
            TurnOutcome::NotTaken => {}
            TurnOutcome::GameOver => break,
        }
    }
    info!("{} of {} commands took a turn", taken, args.turns);

    println!("{}", state.summary()?);
    println!("{:?}", state.statistics);
    for message in state.log.recent(10) {
        println!("  {}", message.text);
    }

    if let Some(path) = &args.save {
        state.save_to_path(path)?;
    }
    Ok(())
}
