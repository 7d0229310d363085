//! `EventQueue` — future events keyed by tick.
//!
//! `BTreeMap<Tick, VecDeque<Event>>`: O(log T) push and pop where T is the
//! number of distinct future ticks.  Events sharing a tick come out in
//! insertion order, and every event carries its global insertion sequence
//! number, so the processing order is total and reproducible.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use hd_core::{OrderId, Tick};

/// Index of a ride-share group within one run.
pub type GroupId = u32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EventKind {
    OrderArrival(OrderId),
    HopDecision(OrderId),
    RideShareWindowClose(GroupId),
    DeliveryComplete(OrderId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Event {
    pub seq: u64,
    pub at: Tick,
    pub kind: EventKind,
}

#[derive(Default)]
pub struct EventQueue {
    inner: BTreeMap<Tick, VecDeque<Event>>,
    next_seq: u64,
    total: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` at `at`; returns the event's sequence number.
    pub fn push(&mut self, at: Tick, kind: EventKind) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.inner.entry(at).or_default().push_back(Event { seq, at, kind });
        self.total += 1;
        seq
    }

    /// Remove and return the earliest event.
    pub fn pop(&mut self) -> Option<Event> {
        let mut entry = self.inner.first_entry()?;
        let event = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        if event.is_some() {
            self.total -= 1;
        }
        event
    }

    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
