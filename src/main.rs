use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use worm_arena::game::GameMode;
use worm_arena::modes::{PlayMode, TrainConfig, TrainMode};
use worm_arena::settings::Settings;

#[derive(Parser)]
#[command(name = "worm_arena")]
#[command(version, about = "Multiplayer worm arena with scripted and Q-learning agents")]
struct Cli {
    /// What drives the lead worm
    #[arg(long, value_enum, default_value = "player")]
    mode: Mode,

    /// JSON settings file; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width in cells
    #[arg(long)]
    columns: Option<usize>,

    /// Grid height in cells
    #[arg(long)]
    rows: Option<usize>,

    /// Number of scripted opponents
    #[arg(long)]
    bots: Option<usize>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Where the Q-table is loaded from and saved to
    #[arg(long)]
    q_table: Option<PathBuf>,

    /// Episodes to run in train mode
    #[arg(long, default_value = "10000")]
    episodes: usize,

    /// Write logs to this file (terminal modes only log when set)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Steer the lead worm with the keyboard
    Player,
    /// Watch a scripted lead play against the bots
    Ai,
    /// Watch a learning lead play against the bots
    QLearning,
    /// Watch a learning lead play alone on a small arena
    QLearningSolo,
    /// Train the learning worm headless
    Train,
}

impl Mode {
    fn game_mode(self) -> Option<GameMode> {
        match self {
            Mode::Player => Some(GameMode::Player),
            Mode::Ai => Some(GameMode::Ai),
            Mode::QLearning => Some(GameMode::QLearning),
            Mode::QLearningSolo => Some(GameMode::QLearningSolo),
            Mode::Train => None,
        }
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match (&cli.log_file, cli.mode) {
        (Some(path), _) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {:?}", path))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        // The terminal belongs to the renderer
        (None, Mode::Train) => {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        }
        (None, _) => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(columns) = cli.columns {
        settings.game.columns = columns;
    }
    if let Some(rows) = cli.rows {
        settings.game.rows = rows;
    }
    if let Some(bots) = cli.bots {
        settings.game.num_bots = bots;
    }
    if cli.seed.is_some() {
        settings.game.seed = cli.seed;
    }
    if let Some(path) = cli.q_table {
        settings.learning.q_table_path = path;
    }

    match cli.mode.game_mode() {
        Some(mode) => {
            let mut play_mode = PlayMode::new(&settings.game, &settings.learning, mode)?;
            play_mode.run().await?;
        }
        None => {
            let mut train_config = TrainConfig::new(cli.episodes);
            train_config.game_config = settings.game;
            train_config.learning_config = settings.learning;
            let mut train_mode = TrainMode::new(train_config)?;
            train_mode.run()?;
        }
    }

    Ok(())
}
