//! Per-episode training returns.

use std::collections::BTreeMap;

use serde::Serialize;

use hd_core::NodeId;

/// Total reward of every episode, per hub, in episode order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TrainingStats {
    pub returns: BTreeMap<NodeId, Vec<f64>>,
}

impl TrainingStats {
    pub fn hub_returns(&self, hub: NodeId) -> &[f64] {
        self.returns.get(&hub).map_or(&[], Vec::as_slice)
    }

    /// Mean return over every recorded episode of every hub.
    pub fn mean_return(&self) -> Option<f64> {
        let (sum, n) = self
            .returns
            .values()
            .flatten()
            .fold((0.0_f64, 0usize), |(s, n), r| (s + r, n + 1));
        (n > 0).then(|| sum / n as f64)
    }

    /// Mean return per window of `window` consecutive episodes, pooled
    /// across hubs.  The last window may be shorter.
    pub fn window_means(&self, window: usize) -> Vec<f64> {
        let window = window.max(1);
        let longest = self.returns.values().map(Vec::len).max().unwrap_or(0);
        (0..longest.div_ceil(window))
            .map(|w| {
                let range = w * window..((w + 1) * window).min(longest);
                let (sum, n) = self
                    .returns
                    .values()
                    .flat_map(|r| r.get(range.clone()).unwrap_or(&[]))
                    .fold((0.0_f64, 0usize), |(s, n), r| (s + r, n + 1));
                if n == 0 { 0.0 } else { sum / n as f64 }
            })
            .collect()
    }
}
