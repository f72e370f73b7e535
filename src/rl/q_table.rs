use std::collections::HashMap;

use super::observation::DiscreteState;
use crate::game::Direction;

/// Learned value of each action in one state, indexed by `Direction::index`
pub type ActionValues = [f64; 4];

/// Tabular action-value function
///
/// States are created lazily with every action valued at zero, so a state
/// present in the table always covers all four actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    entries: HashMap<DiscreteState, ActionValues>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of visited states
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, state: &DiscreteState) -> Option<&ActionValues> {
        self.entries.get(state)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DiscreteState, &ActionValues)> {
        self.entries.iter()
    }

    /// Values for `state`, created as zeros on first visit
    pub fn values_mut(&mut self, state: DiscreteState) -> &mut ActionValues {
        self.entries.entry(state).or_insert([0.0; 4])
    }

    pub fn value(&self, state: &DiscreteState, action: Direction) -> f64 {
        self.entries
            .get(state)
            .map_or(0.0, |values| values[action.index()])
    }

    pub fn set(&mut self, state: DiscreteState, action: Direction, value: f64) {
        self.values_mut(state)[action.index()] = value;
    }

    /// Highest value over all four actions of `state`
    pub fn max_value(&mut self, state: DiscreteState) -> f64 {
        self.values_mut(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Best action among `candidates`
    ///
    /// Ties go to the candidate listed first, so callers pass candidates in
    /// canonical order. Returns `None` for an empty candidate list.
    pub fn best_action(&mut self, state: DiscreteState, candidates: &[Direction]) -> Option<Direction> {
        let values = self.values_mut(state);
        let mut best: Option<(Direction, f64)> = None;
        for &candidate in candidates {
            let value = values[candidate.index()];
            if best.is_none_or(|(_, v)| value > v) {
                best = Some((candidate, value));
            }
        }
        best.map(|(direction, _)| direction)
    }

    /// One-step Q-learning update
    ///
    /// `Q[s,a] += α · (reward + γ · max_a' Q[s',a'] − Q[s,a])`. Returns the new
    /// `Q[s,a]`.
    pub fn update(
        &mut self,
        state: DiscreteState,
        action: Direction,
        reward: f64,
        next_state: DiscreteState,
        learning_rate: f64,
        discount: f64,
    ) -> f64 {
        let next_max = self.max_value(next_state);
        let slot = &mut self.values_mut(state)[action.index()];
        *slot += learning_rate * (reward + discount * next_max - *slot);
        *slot
    }
}
