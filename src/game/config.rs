use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::GameError;
use super::state::PelletKind;

/// Configuration for the arena
///
/// Loaded once at startup and treated as immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of grid columns
    pub columns: usize,
    /// Number of grid rows
    pub rows: usize,
    /// Pellets placed on every world reset
    pub initial_pellet_count: usize,
    /// Ordered pellet catalog, indexed by `Pellet::type_index`
    pub pellet_types: Vec<PelletKind>,
    /// Scripted opponents added next to the lead worm
    pub num_bots: usize,
    /// Wall-clock time between two ticks
    pub move_interval_ms: u64,
    /// Seed for every random stream; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            columns: 200,
            rows: 200,
            initial_pellet_count: 200,
            pellet_types: vec![
                PelletKind::new(1, 1),
                PelletKind::new(2, 2),
                PelletKind::new(3, 3),
            ],
            num_bots: 5,
            move_interval_ms: 50,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            ..Default::default()
        }
    }

    /// The small arena used for solo learning sessions
    pub fn small() -> Self {
        Self {
            initial_pellet_count: 20,
            ..Self::new(30, 30)
        }
    }

    pub fn move_interval(&self) -> Duration {
        Duration::from_millis(self.move_interval_ms)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(GameError::InvalidConfig(format!(
                "grid must be non-empty, got {}x{}",
                self.columns, self.rows
            )));
        }

        if i32::try_from(self.columns).is_err() || i32::try_from(self.rows).is_err() {
            return Err(GameError::InvalidConfig(format!(
                "grid {}x{} is too large",
                self.columns, self.rows
            )));
        }

        if self.pellet_types.is_empty() {
            return Err(GameError::InvalidConfig(
                "pellet catalog must contain at least one kind".to_string(),
            ));
        }

        // Every worm needs a start cell next to the initial pellets
        let worms = self.num_bots.saturating_add(1);
        if self.initial_pellet_count.saturating_add(worms) > self.columns * self.rows {
            return Err(GameError::InvalidConfig(format!(
                "{} pellets and {} worms cannot fit on a {}x{} grid",
                self.initial_pellet_count, worms, self.columns, self.rows
            )));
        }

        if self.move_interval_ms == 0 {
            return Err(GameError::InvalidConfig(
                "move_interval_ms must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.columns, 200);
        assert_eq!(config.rows, 200);
        assert_eq!(config.initial_pellet_count, 200);
        assert_eq!(config.pellet_types.len(), 3);
        assert_eq!(config.pellet_types[2], PelletKind::new(3, 3));
        assert_eq!(config.num_bots, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_small_config() {
        let config = GameConfig::small();
        assert_eq!(config.columns, 30);
        assert_eq!(config.rows, 30);
        assert_eq!(config.initial_pellet_count, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_overfull_grid() {
        let mut config = GameConfig::new(3, 3);
        config.initial_pellet_count = 9;
        assert!(matches!(
            config.validate(),
            Err(GameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validation_counts_worm_start_cells() {
        let mut config = GameConfig::new(3, 3);
        config.num_bots = 0;
        config.initial_pellet_count = 8;
        assert!(config.validate().is_ok());

        config.num_bots = 1;
        assert!(matches!(
            config.validate(),
            Err(GameError::InvalidConfig(_))
        ));

        config.initial_pellet_count = 7;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_catalog() {
        let mut config = GameConfig::small();
        config.pellet_types.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"columns": 12, "num_bots": 0}"#).unwrap();
        assert_eq!(config.columns, 12);
        assert_eq!(config.rows, 200);
        assert_eq!(config.num_bots, 0);
        assert_eq!(config.move_interval(), Duration::from_millis(50));
    }
}
