//! Ledgehop main entry point.
//!
//! A small 2D platformer with a level editor, driven headlessly:
//! - **bevy_ecs** stores map objects and runs the movement schedule
//! - **serde_json** reads levels and input scripts
//! - **configparser** reads `config.ini`
//!
//! # Main Loop
//!
//! 1. Load `config.ini` (defaults are kept when it is missing)
//! 2. Load the level, or start from an empty one
//! 3. Enter the start state
//! 4. Each tick, feed the scripted raw input for that tick to the game,
//!    update it with the fixed timestep and draw into a log target
//! 5. Stop when the game quits or the tick limit is reached
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --script assets/scripts/demo.json
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use ledgehop::events::input::RawInput;
use ledgehop::game::{Game, GameError};
use ledgehop::level::{LevelFile, load_level_from_path};
use ledgehop::resources::gameconfig::GameConfig;
use ledgehop::resources::gamestate::GameStates;
use ledgehop::resources::rendertarget::LogTarget;

/// Ledgehop 2D platformer
#[derive(Parser)]
#[command(version, about = "A small 2D platformer with a level editor.")]
struct Cli {
    /// Configuration file (default: config.ini).
    #[arg(long, value_name = "PATH", default_value = "config.ini")]
    config: PathBuf,

    /// Level to play or edit. Overrides the level path of the configuration.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,

    /// JSON input script: a list of `{ "tick": n, "events": [...] }` frames.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,

    /// Maximum number of ticks to run.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// State to start in (main_menu, cutscene, running, editor, ...).
    #[arg(long, default_value = "main_menu")]
    start: String,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("cannot read input script {path:?}: {source}")]
    ScriptIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid input script: {0}")]
    ScriptJson(#[from] serde_json::Error),
    #[error("unknown start state '{0}'")]
    UnknownState(String),
    #[error(transparent)]
    Game(#[from] GameError),
}

#[derive(Debug, Deserialize)]
struct ScriptFrame {
    tick: u64,
    #[serde(default)]
    events: Vec<RawInput>,
}

/// Raw input of a script, grouped by tick.
fn load_script(path: &Path) -> Result<BTreeMap<u64, Vec<RawInput>>, AppError> {
    let text = fs::read_to_string(path).map_err(|source| AppError::ScriptIo {
        path: path.to_path_buf(),
        source,
    })?;
    let frames: Vec<ScriptFrame> = serde_json::from_str(&text)?;
    let mut by_tick: BTreeMap<u64, Vec<RawInput>> = BTreeMap::new();
    for frame in frames {
        by_tick.entry(frame.tick).or_default().extend(frame.events);
    }
    Ok(by_tick)
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = GameConfig::with_path(&cli.config);
    if let Err(err) = config.load_from_file() {
        warn!("{}; using defaults", err);
    }
    if let Some(level) = cli.level {
        config.level_path = level;
    }

    let level = match load_level_from_path(&config.level_path) {
        Ok(level) => level,
        Err(err) => {
            warn!("{}; starting from an empty level", err);
            LevelFile::empty("untitled")
        }
    };

    let script = match &cli.script {
        Some(path) => load_script(path)?,
        None => BTreeMap::new(),
    };

    let start = GameStates::from_name(&cli.start).ok_or_else(|| AppError::UnknownState(cli.start.clone()))?;
    let dt = config.fixed_dt;
    let mut game = Game::new(config, level);
    let mut target = LogTarget::default();
    game.start(start)?;

    let idle = Vec::new();
    while game.is_running() && game.ticks() < cli.ticks {
        let frame = script.get(&game.ticks()).unwrap_or(&idle);
        game.tick(dt, frame)?;
        game.draw(&mut target);
    }

    let session = game.session();
    info!(
        "Stopped in {:?} after {} ticks: score {}, lives {}, deaths {}, won {}",
        game.state(),
        game.ticks(),
        session.score,
        session.lives,
        session.deaths,
        session.won
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
