//! Saving and loading learned Q-tables
//!
//! A table is stored as pretty-printed JSON together with the exploration
//! rate it was saved with:
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "epsilon": 0.42,
//!   "entries": [
//!     { "state": [0, 1, 0, 0, 0, 0], "values": { "up": 0.0, "down": 0.0, "right": 3.5, "left": 0.0 } }
//!   ]
//! }
//! ```
//!
//! The state array is the food direction (x, y) followed by the danger codes
//! for up, down, right and left.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::observation::DiscreteState;
use super::q_table::{ActionValues, QTable};
use crate::game::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct ActionValuesRecord {
    up: f64,
    down: f64,
    right: f64,
    left: f64,
}

impl From<&ActionValues> for ActionValuesRecord {
    fn from(values: &ActionValues) -> Self {
        Self {
            up: values[Direction::Up.index()],
            down: values[Direction::Down.index()],
            right: values[Direction::Right.index()],
            left: values[Direction::Left.index()],
        }
    }
}

impl From<ActionValuesRecord> for ActionValues {
    fn from(record: ActionValuesRecord) -> Self {
        let mut values = [0.0; 4];
        values[Direction::Up.index()] = record.up;
        values[Direction::Down.index()] = record.down;
        values[Direction::Right.index()] = record.right;
        values[Direction::Left.index()] = record.left;
        values
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    state: [i8; 6],
    values: ActionValuesRecord,
}

/// On-disk form of a learned table
#[derive(Debug, Serialize, Deserialize)]
struct QTableFile {
    /// Crate version that wrote the file
    version: String,
    epsilon: f64,
    entries: Vec<EntryRecord>,
}

/// Save a table and its exploration rate to `path`
///
/// Creates parent directories if they don't exist. Entries are written in
/// state order so the same table always produces the same file.
pub fn save_q_table(table: &QTable, epsilon: f64, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let mut entries: Vec<EntryRecord> = table
        .iter()
        .map(|(state, values)| EntryRecord {
            state: state.codes(),
            values: values.into(),
        })
        .collect();
    entries.sort_by_key(|entry| entry.state);

    let file = QTableFile {
        version: env!("CARGO_PKG_VERSION").to_string(),
        epsilon,
        entries,
    };

    let json = serde_json::to_string_pretty(&file).context("Failed to serialize Q-table")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write Q-table to {:?}", path))?;

    Ok(())
}

/// Load a table saved with [`save_q_table`]
///
/// Returns `Ok(None)` when the file does not exist, and an error when it
/// exists but cannot be read or parsed.
pub fn load_q_table(path: &Path) -> Result<Option<(QTable, f64)>> {
    if !path.exists() {
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read Q-table from {:?}", path))?;
    let file: QTableFile = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse Q-table from {:?}", path))?;

    if !(0.0..=1.0).contains(&file.epsilon) {
        bail!("Saved epsilon {} is outside [0, 1]", file.epsilon);
    }

    let mut table = QTable::new();
    for entry in file.entries {
        let state = DiscreteState::from_codes(entry.state)
            .with_context(|| format!("Invalid state key {:?}", entry.state))?;
        *table.values_mut(state) = entry.values.into();
    }

    Ok(Some((table, file.epsilon)))
}
