//! Tabular reinforcement learning for the lead worm
//!
//! Provides:
//! - State discretization (food direction + four danger codes)
//! - A lazily populated Q-table with the one-step TD update
//! - An epsilon-greedy policy with decaying exploration
//! - JSON persistence of the table and exploration rate

pub mod agent;
pub mod config;
pub mod observation;
pub mod persistence;
pub mod q_table;

pub use agent::QLearningPilot;
pub use config::QLearningConfig;
pub use observation::{Danger, DiscreteState, discretize};
pub use persistence::{load_q_table, save_q_table};
pub use q_table::{ActionValues, QTable};
