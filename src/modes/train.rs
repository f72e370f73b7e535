//! Headless training mode for the Q-learning worm
//!
//! Runs the solo arena as fast as possible: one episode is one life of the
//! learning worm. Progress is logged through `tracing`, the table is
//! checkpointed periodically and saved once more at the end.
//!
//! # Example
//!
//! ```rust,no_run
//! use worm_arena::modes::{TrainConfig, TrainMode};
//!
//! let mut train_mode = TrainMode::new(TrainConfig::new(10_000))?;
//! train_mode.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::game::{GameConfig, GameMode, Session};
use crate::metrics::TrainingStats;
use crate::rl::{QLearningConfig, QLearningPilot, save_q_table};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of episodes to train
    pub num_episodes: usize,

    /// Save a checkpoint every N episodes
    pub checkpoint_frequency: usize,

    /// Log training progress every N episodes
    pub log_frequency: usize,

    /// Episodes longer than this are cut off, so a worm circling forever
    /// cannot stall training
    pub max_episode_ticks: u64,

    /// Arena settings; the solo arena overrides size, pellets and bots
    pub game_config: GameConfig,

    /// Learning hyperparameters and table location
    pub learning_config: QLearningConfig,
}

impl TrainConfig {
    pub fn new(num_episodes: usize) -> Self {
        Self {
            num_episodes,
            checkpoint_frequency: 1000,
            log_frequency: 100,
            max_episode_ticks: 10_000,
            game_config: GameConfig::default(),
            learning_config: QLearningConfig::default(),
        }
    }
}

/// Result of one training episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub reward: f64,
    pub ticks: usize,
    pub score: u32,
}

pub struct TrainMode {
    session: Session,

    stats: TrainingStats,

    config: TrainConfig,

    /// Episodes finished so far
    episodes_done: usize,
}

impl TrainMode {
    pub fn new(config: TrainConfig) -> Result<Self> {
        let mut session = Session::new(
            &config.game_config,
            &config.learning_config,
            GameMode::QLearningSolo,
        )
        .context("Failed to start training session")?;
        // Checkpoints replace per-death saves
        session.set_save_on_death(false);

        Ok(Self {
            session,
            stats: TrainingStats::new(100),
            config,
            episodes_done: 0,
        })
    }

    /// Train for the configured number of episodes
    pub fn run(&mut self) -> Result<()> {
        self.log_header();

        for _ in 0..self.config.num_episodes {
            let summary = self.run_episode()?;
            self.stats
                .record_episode(summary.reward, summary.ticks, summary.score);
            if let Some(pilot) = self.pilot() {
                self.stats
                    .record_learning(pilot.epsilon(), pilot.q_table_size());
            }

            let episode = self.episodes_done;
            if self.config.log_frequency > 0 && episode % self.config.log_frequency == 0 {
                info!(
                    "[Episode {}/{}] {}",
                    episode,
                    self.config.num_episodes,
                    self.stats.format_summary()
                );
            }

            if self.config.checkpoint_frequency > 0
                && episode % self.config.checkpoint_frequency == 0
            {
                self.save_checkpoint()?;
            }
        }

        self.session
            .save_learning_table()
            .context("Failed to save final Q-table")?;

        info!(
            path = ?self.config.learning_config.q_table_path,
            summary = %self.stats.format_summary(),
            "training complete"
        );
        Ok(())
    }

    /// Play one life of the learning worm, then restart the arena
    pub fn run_episode(&mut self) -> Result<EpisodeSummary> {
        let mut reward = 0.0;
        let mut ticks = 0;

        while ticks < self.config.max_episode_ticks {
            let report = self.session.tick();
            ticks += 1;
            if let Some(pilot) = self.pilot() {
                reward += pilot.last_reward();
            }
            if report.lead_died {
                break;
            }
        }

        let summary = EpisodeSummary {
            reward,
            ticks: ticks as usize,
            score: self.session.lead_snake().score(),
        };

        self.session
            .restart()
            .context("Failed to restart training arena")?;
        self.episodes_done += 1;
        Ok(summary)
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn pilot(&self) -> Option<&QLearningPilot> {
        self.session.learning()
    }

    /// Path of the checkpoint written after `episode`
    pub fn checkpoint_path(&self, episode: usize) -> PathBuf {
        self.config
            .learning_config
            .q_table_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(format!("checkpoint_ep{}.json", episode))
    }

    fn save_checkpoint(&self) -> Result<()> {
        let Some(pilot) = self.pilot() else {
            return Ok(());
        };
        let checkpoint_path = self.checkpoint_path(self.episodes_done);
        save_q_table(pilot.table(), pilot.epsilon(), &checkpoint_path)
            .with_context(|| format!("Failed to save checkpoint to {:?}", checkpoint_path))?;

        info!(path = ?checkpoint_path, "checkpoint saved");
        Ok(())
    }

    fn log_header(&self) {
        let learning = &self.config.learning_config;
        let arena = self.session.config();
        info!(
            episodes = self.config.num_episodes,
            grid = %format!("{}x{}", arena.columns, arena.rows),
            pellets = arena.initial_pellet_count,
            learning_rate = learning.learning_rate,
            discount = learning.discount,
            epsilon = self.pilot().map(QLearningPilot::epsilon),
            epsilon_decay = learning.epsilon_decay,
            min_epsilon = learning.min_epsilon,
            checkpoint_frequency = self.config.checkpoint_frequency,
            log_frequency = self.config.log_frequency,
            q_table = ?learning.q_table_path,
            "Q-learning training"
        );
    }
}
