//! `QAgent` and the per-hub collection used at simulation time.

use std::collections::BTreeMap;

use hd_core::{AgentRng, NodeId};
use hd_graph::RoutingGraph;

use crate::{Action, QTable, StateKey, available_actions};

// ── QAgent ────────────────────────────────────────────────────────────────────

/// The routing policy owned by one hub.
#[derive(Clone, Debug, PartialEq)]
pub struct QAgent {
    pub hub: NodeId,
    pub table: QTable,
}

impl QAgent {
    pub fn new(hub: NodeId) -> Self {
        Self { hub, table: QTable::new() }
    }

    /// Highest-valued action; ties go to the first in `actions`.
    pub fn select_greedy(&self, state: &StateKey, actions: &[Action]) -> Option<Action> {
        self.table.best_action(state, actions)
    }

    /// Boltzmann exploration: draw an action with probability proportional
    /// to `exp(Q / temperature)`.
    ///
    /// Values are shifted by their maximum before exponentiation, so the
    /// best action always has weight 1 and no weight overflows.
    pub fn select_softmax(
        &self,
        state: &StateKey,
        actions: &[Action],
        temperature: f64,
        rng: &mut AgentRng,
    ) -> Option<Action> {
        match actions {
            [] => return None,
            [only] => return Some(*only),
            _ => {}
        }
        let qs: Vec<f64> = actions.iter().map(|&a| self.table.get(state, a)).collect();
        let max = qs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let t = temperature.max(f64::MIN_POSITIVE);
        let weights: Vec<f64> = qs.iter().map(|q| ((q - max) / t).exp()).collect();
        let total: f64 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return self.select_greedy(state, actions);
        }

        let mut r = rng.random::<f64>() * total;
        for (&a, &w) in actions.iter().zip(&weights) {
            if r < w {
                return Some(a);
            }
            r -= w;
        }
        actions.last().copied()
    }

    /// Temporal-difference update:
    ///
    /// ```text
    /// Q(s,a) ← Q(s,a) + α · (reward + γ · next_max − Q(s,a))
    /// ```
    ///
    /// `next_max = None` marks a terminal transition (no bootstrap term).
    /// Returns the new value, or `None` without touching the table when the
    /// result is not finite.
    pub fn td_update(
        &mut self,
        state: &StateKey,
        action: Action,
        reward: f64,
        next_max: Option<f64>,
        alpha: f64,
        gamma: f64,
    ) -> Option<f64> {
        let q = self.table.get(state, action);
        let target = match next_max {
            Some(v) => reward + gamma * v,
            None => reward,
        };
        let updated = q + alpha * (target - q);
        if !updated.is_finite() {
            return None;
        }
        self.table.set(*state, action, updated);
        Some(updated)
    }
}

// ── AgentSet ──────────────────────────────────────────────────────────────────

/// Trained agents keyed by hub.  Read-only once training is done.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AgentSet {
    agents: BTreeMap<NodeId, QAgent>,
}

impl AgentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the agent for `agent.hub`.
    pub fn insert(&mut self, agent: QAgent) {
        self.agents.insert(agent.hub, agent);
    }

    pub fn get(&self, hub: NodeId) -> Option<&QAgent> {
        self.agents.get(&hub)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QAgent> + '_ {
        self.agents.values()
    }

    /// Value of `(state, action)` at `hub`; `0.0` if the hub has no agent.
    pub fn value(&self, hub: NodeId, state: &StateKey, action: Action) -> f64 {
        self.get(hub).map_or(0.0, |a| a.table.get(state, action))
    }

    /// Bootstrap value `max_a Q(state, a)` at `hub`.
    pub fn max_value(&self, hub: NodeId, state: &StateKey, actions: &[Action]) -> Option<f64> {
        match self.get(hub) {
            Some(agent) => agent.table.max_value(state, actions),
            None => (!actions.is_empty()).then_some(0.0),
        }
    }

    /// Greedy action at `hub`; a hub without an agent takes the first action.
    pub fn greedy_action(&self, hub: NodeId, state: &StateKey, actions: &[Action]) -> Option<Action> {
        match self.get(hub) {
            Some(agent) => agent.select_greedy(state, actions),
            None => actions.first().copied(),
        }
    }

    /// Routing decision for an order bound for location node `dest` that
    /// currently sits at `hub`.  `None` when the hub offers no action.
    pub fn decide(&self, graph: &RoutingGraph, hub: NodeId, dest: NodeId) -> Option<Action> {
        let state = StateKey::for_order(graph, hub, dest)?;
        let actions = available_actions(graph, hub, dest);
        self.greedy_action(hub, &state, &actions)
    }
}

impl FromIterator<QAgent> for AgentSet {
    fn from_iter<I: IntoIterator<Item = QAgent>>(iter: I) -> Self {
        let mut set = AgentSet::new();
        for agent in iter {
            set.insert(agent);
        }
        set
    }
}
