//! Epsilon-greedy tabular Q-learning policy
//!
//! Every tick the pilot discretizes what the worm sees, picks a direction
//! (random with probability ε, otherwise the best known one), and once the
//! move has been resolved it scores the outcome and applies a one-step
//! temporal-difference update to the state/action it chose.

use anyhow::Result;
use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use super::config::QLearningConfig;
use super::observation::{DiscreteState, discretize};
use super::persistence::{load_q_table, save_q_table};
use super::q_table::QTable;
use crate::agents::Policy;
use crate::game::{Direction, Snake, StepOutcome, World};

/// Worm policy backed by a learned Q-table
pub struct QLearningPilot {
    config: QLearningConfig,
    table: QTable,
    epsilon: f64,
    rng: SmallRng,
    last_state: Option<DiscreteState>,
    last_action: Option<Direction>,
    last_score: u32,
    /// Distance to the nearest pellet measured before the pending move
    distance_before: Option<u32>,
    last_reward: f64,
}

impl QLearningPilot {
    /// Create a pilot, loading the table and ε from `config.q_table_path`
    ///
    /// A missing or unreadable file yields an empty table and the configured
    /// ε; it is never an error.
    pub fn new(config: QLearningConfig, rng: SmallRng) -> Self {
        let (table, epsilon) = match load_q_table(&config.q_table_path) {
            Ok(Some((table, epsilon))) => {
                info!(
                    path = ?config.q_table_path,
                    states = table.len(),
                    epsilon,
                    "loaded Q-table"
                );
                (table, epsilon)
            }
            Ok(None) => (QTable::new(), config.epsilon),
            Err(err) => {
                warn!(
                    path = ?config.q_table_path,
                    error = %format!("{err:#}"),
                    "ignoring unreadable Q-table, starting empty"
                );
                (QTable::new(), config.epsilon)
            }
        };
        Self::with_table(config, table, epsilon, rng)
    }

    /// Create a pilot from an in-memory table without touching the disk
    pub fn with_table(config: QLearningConfig, table: QTable, epsilon: f64, rng: SmallRng) -> Self {
        Self {
            config,
            table,
            epsilon,
            rng,
            last_state: None,
            last_action: None,
            last_score: 0,
            distance_before: None,
            last_reward: 0.0,
        }
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Number of states visited so far
    pub fn q_table_size(&self) -> usize {
        self.table.len()
    }

    /// Reward computed for the most recent move
    pub fn last_reward(&self) -> f64 {
        self.last_reward
    }

    pub fn last_state(&self) -> Option<DiscreteState> {
        self.last_state
    }

    pub fn last_action(&self) -> Option<Direction> {
        self.last_action
    }

    /// Write the table and current ε to the configured path
    pub fn save_q_table(&self) -> Result<()> {
        save_q_table(&self.table, self.epsilon, &self.config.q_table_path)?;
        debug!(
            path = ?self.config.q_table_path,
            states = self.table.len(),
            epsilon = self.epsilon,
            "saved Q-table"
        );
        Ok(())
    }

    pub fn get_state(&self, snake: &Snake, world: &World, rivals: &[&Snake]) -> DiscreteState {
        discretize(snake, world, rivals, self.config.vision_radius)
    }

    /// Actions open to the worm; the reversal is dropped once it has a neck
    pub fn candidate_actions(snake: &Snake) -> Vec<Direction> {
        let reverse = snake.direction().opposite();
        Direction::ALL
            .into_iter()
            .filter(|&direction| snake.len() <= 1 || direction != reverse)
            .collect()
    }

    /// Scalar reward for the move that was just resolved
    ///
    /// Death overrides everything. Otherwise food or a small time penalty,
    /// plus a bonus or penalty depending on whether the nearest pellet got
    /// strictly closer.
    pub fn get_reward(&mut self, snake: &Snake, world: &World) -> f64 {
        if !snake.is_alive() {
            self.last_score = snake.score();
            return self.config.death_reward;
        }

        let mut reward = if snake.score() > self.last_score {
            self.config.food_reward
        } else {
            self.config.step_reward
        };
        self.last_score = snake.score();

        let distance_after = nearest_distance(snake, world);
        if let (Some(before), Some(after)) = (self.distance_before, distance_after) {
            reward += if after < before {
                self.config.approach_bonus
            } else {
                self.config.retreat_penalty
            };
        }

        reward
    }

    /// Apply the update rule to the last state/action pair
    ///
    /// Does nothing before the first decision of a life.
    pub fn update_q_table(&mut self, reward: f64, next_state: DiscreteState) {
        let (Some(state), Some(action)) = (self.last_state, self.last_action) else {
            return;
        };
        self.table.update(
            state,
            action,
            reward,
            next_state,
            self.config.learning_rate,
            self.config.discount,
        );
    }

    /// Shrink ε toward its floor
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.min_epsilon);
    }
}

fn nearest_distance(snake: &Snake, world: &World) -> Option<u32> {
    let head = snake.head();
    world
        .nearest_pellet(head, None)
        .map(|pellet| head.manhattan(pellet.position))
}

impl Policy for QLearningPilot {
    fn choose_direction(&mut self, snake: &Snake, world: &World, rivals: &[&Snake]) -> Direction {
        let state = self.get_state(snake, world, rivals);
        let candidates = Self::candidate_actions(snake);

        let explored = if self.rng.gen_bool(self.epsilon) {
            candidates.choose(&mut self.rng).copied()
        } else {
            None
        };
        let action = match explored {
            Some(action) => {
                self.table.values_mut(state);
                action
            }
            None => self
                .table
                .best_action(state, &candidates)
                .unwrap_or(snake.direction()),
        };

        self.distance_before = nearest_distance(snake, world);
        self.last_state = Some(state);
        self.last_action = Some(action);
        action
    }

    fn observe(&mut self, snake: &Snake, world: &World, rivals: &[&Snake], outcome: StepOutcome) {
        if outcome == StepOutcome::Idle {
            return;
        }
        let reward = self.get_reward(snake, world);
        let next_state = self.get_state(snake, world, rivals);
        self.update_q_table(reward, next_state);
        self.last_reward = reward;
    }

    fn on_reset(&mut self) {
        self.decay_epsilon();
        self.last_state = None;
        self.last_action = None;
        self.last_score = 0;
        self.distance_before = None;
        self.last_reward = 0.0;
    }
}
