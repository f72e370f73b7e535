//! Startup configuration loaded from an optional JSON file
//!
//! ```json
//! {
//!   "game": { "columns": 60, "rows": 40, "num_bots": 3, "seed": 7 },
//!   "learning": { "epsilon": 0.3, "q_table_path": "models/q_table.json" }
//! }
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::game::GameConfig;
use crate::rl::QLearningConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub game: GameConfig,
    pub learning: QLearningConfig,
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings from {:?}", path))
    }

    /// Defaults, or the contents of `path` when given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_without_file_uses_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.game.columns, 200);
        assert_eq!(settings.learning.discount, 0.9);
    }

    #[test]
    fn test_partial_file_overrides_selected_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"game": {"columns": 60, "seed": 7}, "learning": {"epsilon": 0.3}}"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.game.columns, 60);
        assert_eq!(settings.game.rows, 200);
        assert_eq!(settings.game.seed, Some(7));
        assert_eq!(settings.learning.epsilon, 0.3);
        assert_eq!(settings.learning.learning_rate, 0.1);
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(Settings::load(Some(&path)).is_err());
        assert!(Settings::load(Some(&temp_dir.path().join("missing.json"))).is_err());
    }
}
