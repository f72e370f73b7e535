//! Core simulation for the worm arena
//!
//! This module contains the grid, the pellet economy, the movement and
//! collision rules, and the session driver that ticks every worm. It has no
//! I/O or rendering dependencies.

pub mod action;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod world;
pub mod worm;

// Re-export commonly used types
pub use action::Direction;
pub use config::GameConfig;
pub use error::GameError;
pub use session::{GameMode, Session, TickReport};
pub use state::{CollisionType, Pellet, PelletKind, Position};
pub use world::World;
pub use worm::{Color, Snake, StepOutcome, Worm};
