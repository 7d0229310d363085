//! Episodic training of every hub's agent.
//!
//! # Episode (for the agent of hub H)
//!
//! 1. Draw a destination from the [`DemandModel`]; the order starts at H.
//! 2. At H, choose by softmax over H's live table and update H's value for
//!    the chosen action with the TD rule.  At any other hub, follow the
//!    round's snapshot greedily without updating anything.
//! 3. Rewards: a move costs its edge length (`-km`); delivering earns
//!    `delivery_reward - last_mile_km` and ends the episode.  Moving into a
//!    hub with no way forward, or spending the last step of the budget on a
//!    move, adds `failure_penalty` and ends the episode.
//!
//! The bootstrap term of H's update reads the next hub's values from the
//! snapshot (or H's live table if the order returns to H).

use tracing::{debug, info};

use hd_core::{AgentRng, NodeId};
use hd_graph::RoutingGraph;

use crate::{
    Action, AgentError, AgentResult, AgentSet, DemandModel, QAgent, StateKey, TrainingConfig,
    TrainingStats, available_actions,
};

/// Trained agents plus the returns recorded while training them.
#[derive(Clone, Debug)]
pub struct TrainingOutcome {
    pub agents: AgentSet,
    pub stats: TrainingStats,
}

/// Trains agents over one routing graph and demand model.
pub struct Trainer<'a> {
    graph: &'a RoutingGraph,
    demand: &'a dyn DemandModel,
    config: TrainingConfig,
    warm_start: AgentSet,
}

/// Everything one hub mutates during training.  Owned by exactly one worker.
struct Worker {
    agent: QAgent,
    rng: AgentRng,
    returns: Vec<f64>,
}

impl<'a> Trainer<'a> {
    /// Validates `config` before any work starts.
    pub fn new(
        graph: &'a RoutingGraph,
        demand: &'a dyn DemandModel,
        config: TrainingConfig,
    ) -> AgentResult<Self> {
        config.validate()?;
        Ok(Self { graph, demand, config, warm_start: AgentSet::new() })
    }

    /// Start from previously trained tables instead of all-zero ones.
    pub fn warm_start(mut self, agents: AgentSet) -> Self {
        self.warm_start = agents;
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train the agent of every hub in the graph.
    pub fn train_all(&self) -> AgentResult<TrainingOutcome> {
        let hubs: Vec<NodeId> = self.graph.hub_nodes().collect();
        self.train_hubs(&hubs)
    }

    /// Train only `hub`; all other hubs act from the warm-start tables.
    pub fn train_agent(&self, hub: NodeId) -> AgentResult<TrainingOutcome> {
        if !self.graph.contains(hub) || !self.graph.is_hub(hub) {
            return Err(AgentError::UnknownHub(hub));
        }
        self.train_hubs(&[hub])
    }

    fn train_hubs(&self, hubs: &[NodeId]) -> AgentResult<TrainingOutcome> {
        let cfg = &self.config;
        info!(
            hubs = hubs.len(),
            episodes = cfg.episodes,
            rounds = cfg.rounds(),
            "training started"
        );

        let mut workers: Vec<Worker> = hubs
            .iter()
            .map(|&hub| Worker {
                agent: self.warm_start.get(hub).cloned().unwrap_or_else(|| QAgent::new(hub)),
                rng: AgentRng::new(cfg.seed, hub),
                returns: Vec::with_capacity(cfg.episodes),
            })
            .collect();

        let mut snapshot = self.warm_start.clone();
        for round in 0..cfg.rounds() {
            let first = round * cfg.sync_interval;
            let last = (first + cfg.sync_interval).min(cfg.episodes);

            let results = self.run_round(&mut workers, first..last, &snapshot);
            // Report the lowest-numbered hub's failure, whatever the thread timing.
            for r in results {
                r?;
            }

            for w in &workers {
                snapshot.insert(w.agent.clone());
            }
            debug!(round, episodes = last, "training round complete");
        }

        let stats = TrainingStats {
            returns: workers.iter().map(|w| (w.agent.hub, w.returns.clone())).collect(),
        };
        let agents: AgentSet = workers.into_iter().map(|w| w.agent).collect();
        info!(
            agents = agents.len(),
            mean_return = stats.mean_return().unwrap_or(0.0),
            "training finished"
        );
        Ok(TrainingOutcome { agents, stats })
    }

    /// Run one round's episodes for every worker.
    ///
    /// With the `parallel` feature each worker runs on Rayon's pool; the
    /// snapshot is shared read-only.
    fn run_round(
        &self,
        workers: &mut [Worker],
        episodes: std::ops::Range<usize>,
        snapshot: &AgentSet,
    ) -> Vec<AgentResult<()>> {
        #[cfg(not(feature = "parallel"))]
        {
            workers
                .iter_mut()
                .map(|w| self.run_episodes(w, episodes.clone(), snapshot))
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            workers
                .par_iter_mut()
                .map(|w| self.run_episodes(w, episodes.clone(), snapshot))
                .collect()
        }
    }

    fn run_episodes(
        &self,
        worker: &mut Worker,
        episodes: std::ops::Range<usize>,
        snapshot: &AgentSet,
    ) -> AgentResult<()> {
        for episode in episodes {
            let ret = self.run_episode(worker, episode, snapshot)?;
            worker.returns.push(ret);
        }
        Ok(())
    }

    fn run_episode(&self, w: &mut Worker, episode: usize, snapshot: &AgentSet) -> AgentResult<f64> {
        let cfg = &self.config;
        let graph = self.graph;
        let home = w.agent.hub;

        let Some(dest) = self.demand.sample(&mut w.rng) else {
            return Ok(0.0);
        };
        let temperature = cfg.temperature.at(episode);

        let mut at = home;
        let mut total = 0.0;
        for step in 0..cfg.max_steps {
            let Some(state) = StateKey::for_order(graph, at, dest) else {
                return Ok(total + cfg.failure_penalty);
            };
            let actions = available_actions(graph, at, dest);
            let own = at == home;
            let choice = if own {
                w.agent.select_softmax(&state, &actions, temperature, &mut w.rng)
            } else {
                snapshot.greedy_action(at, &state, &actions)
            };
            let Some(action) = choice else {
                return Ok(total + cfg.failure_penalty);
            };

            // (reward, next hub with its state and actions) for this transition.
            let (reward, next) = match action {
                Action::DeliverDirect => (cfg.delivery_reward - self.leg_km(at, dest), None),
                Action::MoveTo(to) => {
                    let hop = -self.leg_km(at, to);
                    let next_state = StateKey::for_order(graph, to, dest);
                    let next_actions = available_actions(graph, to, dest);
                    let out_of_steps = step + 1 == cfg.max_steps;
                    match next_state {
                        Some(s) if !next_actions.is_empty() && !out_of_steps => {
                            (hop, Some((to, s, next_actions)))
                        }
                        _ => (hop + cfg.failure_penalty, None),
                    }
                }
            };
            total += reward;

            if own {
                let next_max = next.as_ref().and_then(|(to, s, acts)| {
                    if *to == home {
                        w.agent.table.max_value(s, acts)
                    } else {
                        snapshot.max_value(*to, s, acts)
                    }
                });
                w.agent
                    .td_update(&state, action, reward, next_max, cfg.alpha, cfg.gamma)
                    .ok_or(AgentError::Divergence { hub: home, episode })?;
            }

            match next {
                Some((to, _, _)) => at = to,
                None => return Ok(total),
            }
        }
        Ok(total)
    }

    /// Road length of the leg `from → to`: the graph edge if there is one,
    /// otherwise the direct distance.
    fn leg_km(&self, from: NodeId, to: NodeId) -> f64 {
        match self.graph.edge_between(from, to) {
            Some(e) => self.graph.length_km(e),
            None => self.graph.direct_km(from, to),
        }
    }
}
