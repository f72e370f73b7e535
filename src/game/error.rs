use thiserror::Error;

/// Errors raised by the simulation core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Every cell is taken by a worm or a pellet
    #[error("no free cell left on the {columns}x{rows} grid")]
    WorldFull { columns: usize, rows: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
