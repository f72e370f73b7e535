//! Q-learning hyperparameter configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::game::GameError;

/// Configuration for the tabular Q-learning agent
///
/// Holds the temporal-difference hyperparameters, the exploration schedule,
/// the reward shaping constants and where the learned table lives on disk.
///
/// # Example
///
/// ```rust
/// use worm_arena::rl::QLearningConfig;
///
/// let config = QLearningConfig {
///     learning_rate: 0.2,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Step size α of the update rule
    ///
    /// Default: 0.1
    pub learning_rate: f64,

    /// Discount factor γ for the bootstrapped next-state value
    ///
    /// Default: 0.9
    pub discount: f64,

    /// Exploration rate used when no saved table exists
    ///
    /// Default: 1.0
    pub epsilon: f64,

    /// Factor applied to ε on every new life
    ///
    /// Default: 0.995
    pub epsilon_decay: f64,

    /// Floor for ε
    ///
    /// Default: 0.01
    pub min_epsilon: f64,

    /// Manhattan radius within which pellets are visible to the state
    ///
    /// Default: 15
    pub vision_radius: u32,

    /// Reward for dying, replaces every other component
    pub death_reward: f64,

    /// Reward for a tick in which the score went up
    pub food_reward: f64,

    /// Reward for a tick without food
    pub step_reward: f64,

    /// Added when the nearest pellet got strictly closer
    pub approach_bonus: f64,

    /// Added when the nearest pellet did not get closer
    pub retreat_penalty: f64,

    /// File the table and ε are saved to and loaded from
    pub q_table_path: PathBuf,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.9,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            min_epsilon: 0.01,
            vision_radius: 15,
            death_reward: -100.0,
            food_reward: 10.0,
            step_reward: -0.1,
            approach_bonus: 1.0,
            retreat_penalty: -1.5,
            q_table_path: PathBuf::from("q_table.json"),
        }
    }
}

impl QLearningConfig {
    /// Create a configuration with default hyperparameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that all hyperparameters are in valid ranges
    pub fn validate(&self) -> Result<(), GameError> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(GameError::InvalidConfig(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }

        if !(self.discount >= 0.0 && self.discount <= 1.0) {
            return Err(GameError::InvalidConfig(format!(
                "discount must be in [0, 1], got {}",
                self.discount
            )));
        }

        for (name, value) in [
            ("epsilon", self.epsilon),
            ("epsilon_decay", self.epsilon_decay),
            ("min_epsilon", self.min_epsilon),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GameError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }

        if self.min_epsilon > self.epsilon {
            return Err(GameError::InvalidConfig(format!(
                "min_epsilon ({}) cannot exceed epsilon ({})",
                self.min_epsilon, self.epsilon
            )));
        }

        Ok(())
    }
}
