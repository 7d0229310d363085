//! Fluent builder for constructing a [`Simulator`].

use std::sync::Arc;

use hd_graph::RoutingGraph;

use crate::{CancelToken, RoutingPolicy, SimConfig, SimResult, Simulator};

/// Fluent builder for [`Simulator`].
///
/// # Required inputs
///
/// - [`SimConfig`]: horizon, order count, ride-share parameters, seed
/// - the routing graph, shared through an `Arc` so several simulators (one
///   per policy) can reuse it
///
/// # Optional inputs
///
/// | Method            | Default                      |
/// |-------------------|------------------------------|
/// | `.policy(p)`      | `RoutingPolicy::ShortestPath` |
/// | `.cancel_token(t)`| a fresh, never-set token     |
pub struct SimBuilder {
    config: SimConfig,
    graph: Arc<RoutingGraph>,
    policy: Option<RoutingPolicy>,
    cancel: Option<CancelToken>,
}

impl SimBuilder {
    pub fn new(config: SimConfig, graph: Arc<RoutingGraph>) -> Self {
        Self { config, graph, policy: None, cancel: None }
    }

    pub fn policy(mut self, policy: RoutingPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Abort runs when `token` is cancelled.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Validate the configuration and return a ready-to-run [`Simulator`].
    pub fn build(self) -> SimResult<Simulator> {
        self.config.validate()?;
        Ok(Simulator {
            config: self.config,
            graph: self.graph,
            policy: self.policy.unwrap_or(RoutingPolicy::ShortestPath),
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}
