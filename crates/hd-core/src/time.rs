//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter where one
//! tick is one simulated second.  Using an integer as the canonical time unit
//! means event ordering is exact (no floating-point drift) and comparisons
//! are O(1).
//!
//! There is no process-wide clock: every simulation run owns its own
//! [`SimClock`], created fresh (or [`reset`](SimClock::reset)) per run.

use std::fmt;

use crate::{CoreError, CoreResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation time in seconds since the start of the run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `secs` seconds after `self`, saturating at `u64::MAX`.
    #[inline]
    pub fn offset(self, secs: u64) -> Tick {
        Tick(self.0.saturating_add(secs))
    }

    /// Seconds elapsed from `earlier` to `self` (zero if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        self.offset(rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.since(rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Logical clock driving one simulation run's event queue.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// The time of the event currently being processed.
    pub current: Tick,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.current
    }

    /// Move the clock forward to `t`.
    ///
    /// Staying at the same tick is allowed (several events share a
    /// timestamp); moving backwards is an error.
    pub fn advance_to(&mut self, t: Tick) -> CoreResult<()> {
        if t < self.current {
            return Err(CoreError::ClockRewind { now: self.current, requested: t });
        }
        self.current = t;
        Ok(())
    }

    /// Return the clock to tick 0 for a new run.
    pub fn reset(&mut self) {
        self.current = Tick::ZERO;
    }

    /// Break elapsed time into (day, hour, minute) components from run start.
    /// Useful for human-readable logging without a datetime library.
    pub fn elapsed_dhm(&self) -> (u64, u32, u32) {
        let total_secs = self.current.0;
        let days = total_secs / 86_400;
        let hours = ((total_secs % 86_400) / 3_600) as u32;
        let minutes = ((total_secs % 3_600) / 60) as u32;
        (days, hours, minutes)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (d, h, m) = self.elapsed_dhm();
        write!(f, "{} (day {} {:02}:{:02})", self.current, d, h, m)
    }
}
