//! Worm Arena - a grid-based multiplayer worm game with learning agents
//!
//! This library provides:
//! - Core game logic: world, worms, pellets and the tick driver (game module)
//! - Worm policies: keyboard, scripted heuristic (agents module)
//! - Tabular Q-learning with JSON persistence (rl module)
//! - TUI rendering and input (render, input modules)
//! - Interactive play and headless training (modes module)

pub mod agents;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
pub mod settings;
