//! The Q-table of one hub.

use std::collections::BTreeMap;

use crate::{Action, StateKey};

/// `state → action → value`.  Unvisited pairs read as `0.0`.
///
/// Ordered maps keep iteration (and therefore the persisted artifact)
/// identical across runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QTable {
    values: BTreeMap<StateKey, BTreeMap<Action, f64>>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, state: &StateKey, action: Action) -> f64 {
        self.values
            .get(state)
            .and_then(|row| row.get(&action))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn set(&mut self, state: StateKey, action: Action, value: f64) {
        self.values.entry(state).or_default().insert(action, value);
    }

    /// Stored values for `state`, if it was ever updated.
    pub fn row(&self, state: &StateKey) -> Option<&BTreeMap<Action, f64>> {
        self.values.get(state)
    }

    /// Highest value among `actions`; `None` when `actions` is empty.
    pub fn max_value(&self, state: &StateKey, actions: &[Action]) -> Option<f64> {
        actions
            .iter()
            .map(|&a| self.get(state, a))
            .reduce(f64::max)
    }

    /// First action in `actions` holding the highest value.
    pub fn best_action(&self, state: &StateKey, actions: &[Action]) -> Option<Action> {
        let mut best: Option<(Action, f64)> = None;
        for &a in actions {
            let q = self.get(state, a);
            match best {
                Some((_, bq)) if q <= bq => {}
                _ => best = Some((a, q)),
            }
        }
        best.map(|(a, _)| a)
    }

    /// Number of stored `(state, action)` values.
    pub fn len(&self) -> usize {
        self.values.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn state_count(&self) -> usize {
        self.values.len()
    }

    /// Every stored value in `(state, action)` order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, Action, f64)> + '_ {
        self.values
            .iter()
            .flat_map(|(s, row)| row.iter().map(move |(&a, &v)| (s, a, v)))
    }
}
