//! Training hyper-parameters.

use serde::{Deserialize, Serialize};

use crate::{AgentError, AgentResult};

/// Softmax temperature as a function of the episode index:
/// `max(floor, init · decay^episode)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureSchedule {
    /// Default: 1.0.
    pub init: f64,
    /// Default: 0.01.
    pub floor: f64,
    /// Per-episode multiplier in `(0, 1]`.  Default: 0.995.
    pub decay: f64,
}

impl Default for TemperatureSchedule {
    fn default() -> Self {
        Self { init: 1.0, floor: 0.01, decay: 0.995 }
    }
}

impl TemperatureSchedule {
    /// Temperature for `episode`; never increases with the episode index.
    pub fn at(&self, episode: usize) -> f64 {
        (self.init * self.decay.powf(episode as f64)).max(self.floor)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Learning rate α in `(0, 1]`.  Default: 0.1.
    pub alpha: f64,
    /// Discount γ in `[0, 1]`.  Default: 0.9.
    pub gamma: f64,
    /// Episodes per hub.  Default: 500.
    pub episodes: usize,
    pub temperature: TemperatureSchedule,
    /// Hop budget per episode; running out is a failure.  Default: 16.
    pub max_steps: usize,
    /// Reward for completing a delivery, before the last-mile cost.
    /// Default: 100.0.
    pub delivery_reward: f64,
    /// Reward for a failed episode (dead end or budget exhausted).
    /// Default: -100.0.
    pub failure_penalty: f64,
    /// Episodes per synchronisation round.  Default: 50.
    pub sync_interval: usize,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            episodes: 500,
            temperature: TemperatureSchedule::default(),
            max_steps: 16,
            delivery_reward: 100.0,
            failure_penalty: -100.0,
            sync_interval: 50,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> AgentResult<()> {
        let bad = |msg: String| Err(AgentError::Config(msg));

        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return bad(format!("alpha must be in (0, 1], got {}", self.alpha));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return bad(format!("gamma must be in [0, 1], got {}", self.gamma));
        }
        if self.max_steps == 0 {
            return bad("max_steps must be at least 1".into());
        }
        if self.sync_interval == 0 {
            return bad("sync_interval must be at least 1".into());
        }
        if !self.delivery_reward.is_finite() || !self.failure_penalty.is_finite() {
            return bad("rewards must be finite".into());
        }
        let t = &self.temperature;
        if !(t.init.is_finite() && t.floor.is_finite() && t.floor > 0.0 && t.init >= t.floor) {
            return bad(format!(
                "temperature needs 0 < floor <= init, got floor {} init {}",
                t.floor, t.init
            ));
        }
        if !(t.decay > 0.0 && t.decay <= 1.0) {
            return bad(format!("temperature decay must be in (0, 1], got {}", t.decay));
        }
        Ok(())
    }

    /// Number of synchronisation rounds needed to cover `episodes`.
    pub fn rounds(&self) -> usize {
        self.episodes.div_ceil(self.sync_interval.max(1))
    }
}
