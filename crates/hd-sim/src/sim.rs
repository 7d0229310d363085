//! The `Simulator` and its event loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use hd_agent::Action;
use hd_core::{NodeId, OrderId, Role, SimClock, SimRng, Tick};
use hd_graph::RoutingGraph;

use crate::rideshare::delivery_tour;
use crate::{
    ArrivalProcess, CancelToken, DeliveryOrder, EventKind, EventQueue, GroupId, NextHopCache,
    OrderRequest, OrderStatus, RideShareGroup, RoutingPolicy, SimConfig, SimError, SimMetrics,
    SimObserver, SimResult,
};

// ── Simulator ─────────────────────────────────────────────────────────────────

/// One configured delivery simulation.
///
/// Holds only immutable inputs; every [`run`](Self::run) builds fresh
/// run-scoped state (clock, event queue, orders, groups), so repeated runs
/// are independent and identical.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulator {
    pub(crate) config: SimConfig,
    pub(crate) graph: Arc<RoutingGraph>,
    pub(crate) policy: RoutingPolicy,
    pub(crate) cancel: CancelToken,
}

impl Simulator {
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn graph(&self) -> &RoutingGraph {
        &self.graph
    }

    pub fn policy(&self) -> &RoutingPolicy {
        &self.policy
    }

    /// Draw `total_deliveries` orders from the configured arrival process.
    ///
    /// Producers and consumers are picked uniformly among the graph's
    /// producer and consumer locations.  The result is sorted by creation
    /// time (stable, so draw order breaks ties).
    pub fn generate_orders(&self) -> SimResult<Vec<OrderRequest>> {
        let cfg = &self.config;
        if cfg.total_deliveries == 0 {
            return Ok(Vec::new());
        }
        let producers = self.graph.location_nodes_with_role(Role::Producer);
        let consumers = self.graph.location_nodes_with_role(Role::Consumer);
        if producers.is_empty() || consumers.is_empty() {
            return Err(SimError::Config(format!(
                "cannot generate orders: {} producers, {} consumers",
                producers.len(),
                consumers.len()
            )));
        }

        let mut rng = SimRng::new(cfg.seed);
        let window = cfg.arrival_window_secs();
        let mean_gap = window as f64 / cfg.total_deliveries as f64;
        let mut clock = 0.0_f64;

        let mut orders = Vec::with_capacity(cfg.total_deliveries);
        for _ in 0..cfg.total_deliveries {
            let created = match cfg.arrival {
                ArrivalProcess::Uniform => rng.gen_range(0..=window),
                ArrivalProcess::Poisson => {
                    clock += rng.exp_gap(mean_gap);
                    (clock.floor() as u64).min(window)
                }
            };
            // `choose` on a non-empty slice always yields an element.
            let (Some(&producer), Some(&consumer)) = (rng.choose(&producers), rng.choose(&consumers))
            else {
                continue;
            };
            orders.push(OrderRequest { producer, consumer, created: Tick(created) });
        }
        orders.sort_by_key(|o| o.created);
        Ok(orders)
    }

    /// Generate orders and simulate them.
    pub fn run<O: SimObserver>(&self, observer: &mut O) -> SimResult<SimMetrics> {
        let orders = self.generate_orders()?;
        self.run_with_orders(orders, observer)
    }

    /// Simulate an externally supplied order set.
    ///
    /// Requests are validated up front: both ends must be location nodes
    /// and, unless the policy is `Direct`, the producer must have a hotspot.
    pub fn run_with_orders<O: SimObserver>(
        &self,
        mut requests: Vec<OrderRequest>,
        observer: &mut O,
    ) -> SimResult<SimMetrics> {
        for (index, r) in requests.iter().enumerate() {
            self.check_request(index, r)?;
        }
        requests.sort_by_key(|r| r.created);

        info!(
            orders = requests.len(),
            policy = self.policy.label(),
            ride_sharing = self.config.ride_sharing,
            "simulation started"
        );
        let metrics = Run::new(self, requests).execute(observer)?;
        info!(
            delivered = metrics.delivered,
            failed = metrics.failed,
            distance_km = metrics.total_distance_km,
            groups = metrics.ride_share_groups,
            "simulation finished"
        );
        Ok(metrics)
    }

    fn check_request(&self, index: usize, r: &OrderRequest) -> SimResult<()> {
        let invalid = |reason: String| Err(SimError::InvalidOrder { index, reason });
        for (what, node) in [("producer", r.producer), ("consumer", r.consumer)] {
            if !self.graph.contains(node) || self.graph.is_hub(node) {
                return invalid(format!("{what} {node} is not a location node"));
            }
        }
        if self.policy.uses_hubs() && self.graph.region_of(r.producer).is_none() {
            return invalid(format!("producer {} has no hotspot", r.producer));
        }
        Ok(())
    }
}

// ── Run-scoped state ──────────────────────────────────────────────────────────

struct Run<'s> {
    sim: &'s Simulator,
    clock: SimClock,
    queue: EventQueue,
    orders: Vec<DeliveryOrder>,
    groups: Vec<RideShareGroup>,
    /// Open groups per hub, oldest first.
    open_groups: BTreeMap<NodeId, Vec<GroupId>>,
    next_hops: NextHopCache,
    /// Orders that reached a terminal state during the current event.
    finished: Vec<OrderId>,
    total_distance_km: f64,
    /// Groups that departed with two or more members.
    shared_groups: usize,
}

impl<'s> Run<'s> {
    fn new(sim: &'s Simulator, requests: Vec<OrderRequest>) -> Self {
        let mut queue = EventQueue::new();
        let orders: Vec<DeliveryOrder> = requests
            .into_iter()
            .enumerate()
            .map(|(i, r)| DeliveryOrder::new(OrderId::from_index(i), r))
            .collect();
        for o in &orders {
            queue.push(o.created, EventKind::OrderArrival(o.id));
        }
        Self {
            sim,
            clock: SimClock::new(),
            queue,
            orders,
            groups: Vec::new(),
            open_groups: BTreeMap::new(),
            next_hops: NextHopCache::new(),
            finished: Vec::new(),
            total_distance_km: 0.0,
            shared_groups: 0,
        }
    }

    fn execute<O: SimObserver>(mut self, observer: &mut O) -> SimResult<SimMetrics> {
        let horizon = Tick(self.sim.config.simulation_time_secs);

        while let Some(event) = self.queue.pop() {
            if event.at > horizon {
                break;
            }
            if self.sim.cancel.is_cancelled() {
                debug!(at = %event.at, "simulation cancelled");
                return Err(SimError::Cancelled);
            }
            self.clock.advance_to(event.at)?;
            observer.on_event(&event);

            let now = event.at;
            match event.kind {
                EventKind::OrderArrival(id) => self.on_arrival(id, now),
                EventKind::HopDecision(id) => self.on_hop_decision(id, now),
                EventKind::RideShareWindowClose(g) => self.close_group(g, now),
                EventKind::DeliveryComplete(id) => self.on_delivered(id, now),
            }
            for id in self.finished.drain(..) {
                observer.on_order_terminal(&self.orders[id.index()]);
            }
        }

        // Out of time: whatever is still moving has failed.
        for o in &mut self.orders {
            if !o.status.is_terminal() {
                o.status = OrderStatus::Failed;
                observer.on_order_terminal(o);
            }
        }

        let metrics = SimMetrics::from_orders(&self.orders, self.total_distance_km, self.shared_groups);
        observer.on_sim_end(self.clock.now(), &metrics);
        Ok(metrics)
    }

    // ── Event handlers ────────────────────────────────────────────────────

    fn on_arrival(&mut self, id: OrderId, now: Tick) {
        let sim = self.sim;
        let graph = &*sim.graph;
        let (producer, consumer) = {
            let o = &mut self.orders[id.index()];
            o.status = OrderStatus::InTransit;
            (o.producer, o.consumer)
        };

        if !sim.policy.uses_hubs() {
            let (km, secs) = leg(graph, producer, consumer);
            self.total_distance_km += km;
            let o = &mut self.orders[id.index()];
            o.distance_km += km;
            o.hops = 1;
            o.position = consumer;
            self.queue.push(now.offset(secs), EventKind::DeliveryComplete(id));
            return;
        }

        let Some((hotspot, _)) = graph.region_of(producer) else {
            self.fail(id);
            return;
        };
        let (km, secs) = leg(graph, producer, hotspot);
        self.total_distance_km += km;
        let o = &mut self.orders[id.index()];
        o.distance_km += km;
        o.position = hotspot;
        self.queue.push(now.offset(secs), EventKind::HopDecision(id));
    }

    fn on_hop_decision(&mut self, id: OrderId, now: Tick) {
        let sim = self.sim;
        let cfg = &sim.config;
        let graph = &*sim.graph;
        let (hub, dest, hops) = {
            let o = &self.orders[id.index()];
            (o.position, o.consumer, o.hops)
        };
        if hops >= cfg.max_hops {
            self.fail(id);
            return;
        }
        let Some(action) = sim.policy.decide(graph, hub, dest, &mut self.next_hops) else {
            self.fail(id);
            return;
        };

        if !cfg.ride_sharing {
            self.depart(hub, action, vec![(id, dest)], now);
            return;
        }

        // Waiting must never cost an order its delivery: it may only wait
        // until the last departure that still reaches `dest` by the horizon.
        let latest = self.latest_departure(hub, dest, hops).filter(|&t| t > now);
        let Some(latest) = latest else {
            self.depart(hub, action, vec![(id, dest)], now);
            return;
        };

        let joinable = self.open_groups.get(&hub).and_then(|gs| {
            gs.iter().copied().find(|&g| {
                let group = &self.groups[g as usize];
                group.closes <= latest
                    && group.accepts(
                        graph,
                        action,
                        dest,
                        cfg.ride_share_threshold_km,
                        cfg.max_group_size,
                    )
            })
        });
        let g = match joinable {
            Some(g) => g,
            None => {
                let g = self.groups.len() as GroupId;
                let window = cfg.ride_share_window_secs.min(latest.0 - now.0);
                self.groups.push(RideShareGroup::new(g, hub, action, now, window));
                self.open_groups.entry(hub).or_default().push(g);
                let closes = self.groups[g as usize].closes;
                self.queue.push(closes, EventKind::RideShareWindowClose(g));
                g
            }
        };
        self.groups[g as usize].members.push((id, dest));
        if self.groups[g as usize].len() >= cfg.max_group_size {
            self.close_group(g, now);
        }
    }

    fn on_delivered(&mut self, id: OrderId, now: Tick) {
        let o = &mut self.orders[id.index()];
        if o.status.is_terminal() {
            return;
        }
        o.status = OrderStatus::Delivered;
        o.position = o.consumer;
        o.completed = Some(now);
        self.finished.push(id);
    }

    // ── Groups and legs ───────────────────────────────────────────────────

    /// Dispatch an open group.  No-op if it already departed.
    fn close_group(&mut self, g: GroupId, now: Tick) {
        let group = &mut self.groups[g as usize];
        if !group.open {
            return;
        }
        group.open = false;
        let (hub, action) = (group.hub, group.action);
        let members = std::mem::take(&mut group.members);
        if let Some(open) = self.open_groups.get_mut(&hub) {
            open.retain(|&x| x != g);
        }
        if members.len() > 1 {
            self.shared_groups += 1;
        }
        self.depart(hub, action, members, now);
    }

    /// Drive the next leg for `members`, all at `hub` taking `action`.
    fn depart(&mut self, hub: NodeId, action: Action, members: Vec<(OrderId, NodeId)>, now: Tick) {
        let sim = self.sim;
        let graph = &*sim.graph;
        let k = members.len();
        if k == 0 {
            return;
        }

        match action {
            Action::MoveTo(next) => {
                let (km, secs) = leg(graph, hub, next);
                self.total_distance_km += km;
                for &(id, _) in &members {
                    let o = &mut self.orders[id.index()];
                    o.distance_km += km / k as f64;
                    o.hops += 1;
                    o.position = next;
                    o.shared |= k > 1;
                    self.queue.push(now.offset(secs), EventKind::HopDecision(id));
                }
            }
            Action::DeliverDirect => {
                let solo: Vec<(f64, u64)> = members.iter().map(|&(_, d)| leg(graph, hub, d)).collect();
                let solo_km: f64 = solo.iter().map(|&(km, _)| km).sum();
                let dests: Vec<NodeId> = members.iter().map(|&(_, d)| d).collect();
                let (tour_km, stops) = delivery_tour(graph, hub, &dests);
                let horizon = Tick(sim.config.simulation_time_secs);
                let in_time = stops.iter().all(|&(_, secs)| now.offset(secs) <= horizon);

                if k > 1 && tour_km <= solo_km && in_time {
                    self.total_distance_km += tour_km;
                    for (i, secs) in stops {
                        let id = members[i].0;
                        let o = &mut self.orders[id.index()];
                        o.distance_km += tour_km / k as f64;
                        o.hops += 1;
                        o.shared = true;
                        self.queue.push(now.offset(secs), EventKind::DeliveryComplete(id));
                    }
                } else {
                    // Sharing would cost distance or a delivery: go separately.
                    for (&(id, _), &(km, secs)) in members.iter().zip(&solo) {
                        self.total_distance_km += km;
                        let o = &mut self.orders[id.index()];
                        o.distance_km += km;
                        o.hops += 1;
                        self.queue.push(now.offset(secs), EventKind::DeliveryComplete(id));
                    }
                }
            }
        }
    }

    /// Latest tick at which an order at `hub` can leave and still be
    /// delivered by the horizon, following the policy hop by hop.
    ///
    /// `None` when the order cannot make it even leaving now: no action, hop
    /// budget exhausted, or the remaining path is longer than the horizon.
    fn latest_departure(&mut self, hub: NodeId, dest: NodeId, hops: u32) -> Option<Tick> {
        let sim = self.sim;
        let graph = &*sim.graph;
        let (mut at, mut hops, mut secs) = (hub, hops, 0u64);
        loop {
            if hops >= sim.config.max_hops {
                return None;
            }
            match sim.policy.decide(graph, at, dest, &mut self.next_hops)? {
                Action::MoveTo(next) => {
                    secs = secs.saturating_add(leg(graph, at, next).1);
                    at = next;
                    hops += 1;
                }
                Action::DeliverDirect => {
                    secs = secs.saturating_add(leg(graph, at, dest).1);
                    break;
                }
            }
        }
        sim.config.simulation_time_secs.checked_sub(secs).map(Tick)
    }

    fn fail(&mut self, id: OrderId) {
        let o = &mut self.orders[id.index()];
        if o.status.is_terminal() {
            return;
        }
        o.status = OrderStatus::Failed;
        self.finished.push(id);
    }
}

/// Road length and travel time of one leg: the graph edge when there is one,
/// otherwise the direct road distance.
fn leg(graph: &RoutingGraph, from: NodeId, to: NodeId) -> (f64, u64) {
    match graph.edge_between(from, to) {
        Some(e) => (graph.length_km(e), graph.travel_secs(e)),
        None => {
            let km = graph.direct_km(from, to);
            (km, graph.secs_for_km(km))
        }
    }
}
