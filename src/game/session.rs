//! Tick driver shared by every front end
//!
//! A `Session` owns the world and the roster. The lead worm sits at index 0
//! and its controller depends on the `GameMode`; scripted opponents follow.
//! Each `tick` steps every living worm once, in roster order.

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use std::collections::VecDeque;
use tracing::{info, warn};

use super::action::Direction;
use super::config::GameConfig;
use super::error::GameError;
use super::world::World;
use super::worm::{Snake, StepOutcome, Worm};
use crate::agents::{Controller, HumanPilot, ScriptedPilot};
use crate::rl::{QLearningConfig, QLearningPilot};

/// Games remembered for the rolling average score
pub const SCORE_HISTORY_LEN: usize = 100;

/// Who controls the lead worm, and whether opponents join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Keyboard-controlled lead against scripted bots
    Player,
    /// Scripted lead against scripted bots
    Ai,
    /// Learning lead against scripted bots
    QLearning,
    /// Learning lead alone on the small arena, restarting after each death
    QLearningSolo,
}

impl GameMode {
    pub fn uses_learning(&self) -> bool {
        matches!(self, GameMode::QLearning | GameMode::QLearningSolo)
    }

    pub fn is_solo(&self) -> bool {
        matches!(self, GameMode::QLearningSolo)
    }

    /// Arena this mode plays on
    ///
    /// Solo learning swaps in the small grid and pellet count but keeps the
    /// catalog, pacing and seed.
    pub fn arena_config(&self, config: &GameConfig) -> GameConfig {
        if !self.is_solo() {
            return config.clone();
        }
        let small = GameConfig::small();
        GameConfig {
            columns: small.columns,
            rows: small.rows,
            initial_pellet_count: small.initial_pellet_count,
            num_bots: 0,
            ..config.clone()
        }
    }
}

/// Summary of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The lead worm died during this tick
    pub lead_died: bool,
    /// Worms that died during this tick, lead included
    pub deaths: usize,
}

pub struct Session {
    mode: GameMode,
    config: GameConfig,
    world: World,
    worms: Vec<Worm>,
    game_number: u32,
    score_history: VecDeque<u32>,
    ticks: u64,
    save_on_death: bool,
}

impl Session {
    /// Build the roster for `mode` and start the first game
    pub fn new(
        game_config: &GameConfig,
        learning_config: &QLearningConfig,
        mode: GameMode,
    ) -> Result<Self, GameError> {
        let config = mode.arena_config(game_config);
        config.validate()?;
        if mode.uses_learning() {
            learning_config.validate()?;
        }

        let mut seeds = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut next_rng = || SmallRng::seed_from_u64(seeds.next_u64());

        let world = World::new(&config, next_rng());

        let lead = match mode {
            GameMode::Player => Controller::Human(HumanPilot::new()),
            GameMode::Ai => Controller::Scripted(ScriptedPilot::new(next_rng())),
            GameMode::QLearning | GameMode::QLearningSolo => Controller::Learning(Box::new(
                QLearningPilot::new(learning_config.clone(), next_rng()),
            )),
        };

        let mut worms = vec![Worm::new(lead)];
        for _ in 0..config.num_bots {
            worms.push(Worm::new(Controller::Scripted(ScriptedPilot::new(next_rng()))));
        }

        let mut session = Self {
            mode,
            config,
            world,
            worms,
            game_number: 0,
            score_history: VecDeque::with_capacity(SCORE_HISTORY_LEN),
            ticks: 0,
            save_on_death: true,
        };
        session.restart()?;
        Ok(session)
    }

    /// Start a new game
    ///
    /// Counts the finished game if the lead is dead, gives every worm a new
    /// life on distinct cells and refills the pellet field around them.
    pub fn restart(&mut self) -> Result<(), GameError> {
        if !self.lead_snake().is_alive() {
            self.game_number += 1;
            if self.mode.uses_learning() {
                if self.score_history.len() >= SCORE_HISTORY_LEN {
                    self.score_history.pop_front();
                }
                self.score_history.push_back(self.lead_snake().score());
            }
        }

        // Leftovers of the last game must not crowd out the start cells
        self.world.clear_pellets();
        let mut occupied = Vec::with_capacity(self.worms.len());
        for worm in &mut self.worms {
            worm.reset(&mut self.world, &occupied)?;
            occupied.extend_from_slice(worm.snake().cells());
        }
        self.world.reset(&occupied)?;
        self.ticks = 0;

        info!(
            mode = ?self.mode,
            game = self.game_number,
            worms = self.worms.len(),
            pellets = self.world.pellets().len(),
            epsilon = self.learning().map(QLearningPilot::epsilon),
            states = self.learning().map(QLearningPilot::q_table_size),
            "game started"
        );
        Ok(())
    }

    /// Advance every living worm by one cell
    ///
    /// Does nothing once the lead is dead. Worms later in the roster see the
    /// bodies of worms that already moved this tick.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if !self.lead_snake().is_alive() {
            return report;
        }

        for index in 0..self.worms.len() {
            let (before, rest) = self.worms.split_at_mut(index);
            let Some((worm, after)) = rest.split_first_mut() else {
                break;
            };
            if !worm.snake().is_alive() {
                continue;
            }

            let rivals: Vec<&Snake> = before.iter().chain(after.iter()).map(Worm::snake).collect();
            if let StepOutcome::Died(_) = worm.step(&mut self.world, &rivals) {
                report.deaths += 1;
                report.lead_died |= index == 0;
            }
        }
        self.ticks += 1;

        if report.lead_died {
            info!(
                game = self.game_number,
                score = self.lead_snake().score(),
                length = self.lead_snake().len(),
                ticks = self.ticks,
                "lead worm died"
            );
            if self.save_on_death {
                if let Err(err) = self.save_learning_table() {
                    warn!(error = %format!("{err:#}"), "failed to save Q-table");
                }
            }
        }

        report
    }

    /// Forward a key direction to a keyboard-controlled lead
    pub fn steer(&mut self, direction: Direction) {
        if let Some(pilot) = self.worms[0].controller_mut().as_human_mut() {
            pilot.steer(direction);
        }
    }

    /// Save the learning lead's table; `Ok(false)` when there is none
    pub fn save_learning_table(&self) -> Result<bool> {
        match self.learning() {
            Some(pilot) => {
                pilot.save_q_table()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Persist what must survive the process
    pub fn shutdown(&self) -> Result<()> {
        if self.save_learning_table()? {
            info!(path = ?self.learning().map(|p| p.config().q_table_path.clone()), "saved Q-table on exit");
        }
        Ok(())
    }

    /// Whether a lead death triggers a table save
    pub fn set_save_on_death(&mut self, save_on_death: bool) {
        self.save_on_death = save_on_death;
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn worms(&self) -> &[Worm] {
        &self.worms
    }

    pub fn lead(&self) -> &Worm {
        &self.worms[0]
    }

    pub fn lead_snake(&self) -> &Snake {
        self.worms[0].snake()
    }

    pub fn learning(&self) -> Option<&QLearningPilot> {
        self.worms[0].controller().as_learning()
    }

    pub fn game_number(&self) -> u32 {
        self.game_number
    }

    /// Ticks played in the current game
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn alive_count(&self) -> usize {
        self.worms.iter().filter(|w| w.snake().is_alive()).count()
    }

    pub fn score_history(&self) -> &VecDeque<u32> {
        &self.score_history
    }

    /// Mean lead score over the remembered games, 0 when there are none
    pub fn average_score(&self) -> f64 {
        if self.score_history.is_empty() {
            return 0.0;
        }
        self.score_history.iter().map(|&s| s as f64).sum::<f64>() / self.score_history.len() as f64
    }
}
