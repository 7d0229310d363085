//! Unit tests for hd-agent.

#[cfg(test)]
mod helpers {
    use hd_core::{GeoPoint, HotspotId, Location, LocationId, NodeId, Role, SuperspotId};
    use hd_graph::{GraphConfig, RoutingGraph, RoutingGraphBuilder};
    use hd_network::{Hierarchy, Hotspot, Superspot};

    /// Nodes of [`dead_end_graph`].
    pub struct DeadEnd {
        pub graph: RoutingGraph,
        pub hub: NodeId,
        pub dead_end: NodeId,
        pub reachable: NodeId,
        pub unreachable: NodeId,
    }

    /// One superspot with three hotspots:
    ///
    /// ```text
    /// C ── H ──▶ D        X ── U
    /// ```
    ///
    /// H serves consumer C and has a one-way edge to D, which leads nowhere.
    /// Consumer U sits under the isolated hotspot X.
    pub fn dead_end_graph() -> DeadEnd {
        let mut b = RoutingGraphBuilder::new(GraphConfig::default());
        let s = b.add_superspot(GeoPoint::new(40.000, -83.000));
        let h = b.add_hotspot(GeoPoint::new(40.000, -83.000), s);
        let d = b.add_hotspot(GeoPoint::new(40.010, -83.000), s);
        let x = b.add_hotspot(GeoPoint::new(40.020, -83.000), s);
        let c = b.add_location(LocationId(0), GeoPoint::new(40.001, -83.000), Role::Consumer, h);
        let u = b.add_location(LocationId(1), GeoPoint::new(40.021, -83.000), Role::Consumer, x);
        b.add_link(c, h);
        b.add_link(u, x);
        b.add_directed_edge(h, d, 1.1, 132);
        DeadEnd { graph: b.build(), hub: h, dead_end: d, reachable: c, unreachable: u }
    }

    /// Two regions ~22 km apart, two hotspots each, one producer and one
    /// consumer per hotspot.  Hub nodes: hotspots 8..=11, superspots 12, 13.
    pub fn two_regions() -> RoutingGraph {
        let hub_lat = [40.00, 40.02, 40.20, 40.22];
        let mut locations = Vec::new();
        let mut assignment = Vec::new();
        let mut hotspots = Vec::new();
        for (h, &lat) in hub_lat.iter().enumerate() {
            let mut members = Vec::new();
            for k in 0..2u32 {
                let id = h as u32 * 2 + k;
                let role = if k == 0 { Role::Producer } else { Role::Consumer };
                let dlat = if k == 0 { -0.001 } else { 0.001 };
                locations.push(Location::new(LocationId(id), lat + dlat, -83.0, role));
                assignment.push(HotspotId(h as u32));
                members.push(LocationId(id));
            }
            hotspots.push(Hotspot {
                id: HotspotId(h as u32),
                centroid: GeoPoint::new(lat, -83.0),
                members,
                superspot: SuperspotId((h / 2) as u32),
            });
        }
        let superspots = vec![
            Superspot {
                id: SuperspotId(0),
                centroid: GeoPoint::new(40.01, -83.0),
                children: vec![HotspotId(0), HotspotId(1)],
            },
            Superspot {
                id: SuperspotId(1),
                centroid: GeoPoint::new(40.21, -83.0),
                children: vec![HotspotId(2), HotspotId(3)],
            },
        ];
        let h = Hierarchy { locations, assignment, hotspots, superspots, skipped_records: 0 };
        RoutingGraph::from_hierarchy(&h, &GraphConfig::default()).unwrap()
    }
}

// ── States and actions ────────────────────────────────────────────────────────

#[cfg(test)]
mod state {
    use hd_core::NodeId;

    use crate::{Action, Region, StateKey, available_actions};

    use super::helpers::two_regions;

    #[test]
    fn region_narrows_inside_destination_superspot() {
        let g = two_regions();
        // Consumer 5 lives under H2 (node 10) in S1 (node 13).
        let dest = NodeId(5);
        assert_eq!(
            StateKey::for_order(&g, NodeId(8), dest).unwrap().dest,
            Region::Superspot(NodeId(13))
        );
        assert_eq!(
            StateKey::for_order(&g, NodeId(13), dest).unwrap().dest,
            Region::Hotspot(NodeId(10))
        );
        assert_eq!(
            StateKey::for_order(&g, NodeId(11), dest).unwrap().dest,
            Region::Hotspot(NodeId(10))
        );
    }

    #[test]
    fn non_location_destination_has_no_state() {
        let g = two_regions();
        assert!(StateKey::for_order(&g, NodeId(8), NodeId(9)).is_none());
    }

    #[test]
    fn deliver_direct_only_at_destination_hotspot() {
        let g = two_regions();
        let dest = NodeId(1); // consumer under H0 (node 8)
        assert_eq!(
            available_actions(&g, NodeId(8), dest),
            vec![Action::DeliverDirect, Action::MoveTo(NodeId(9)), Action::MoveTo(NodeId(12))]
        );
        assert_eq!(
            available_actions(&g, NodeId(9), dest),
            vec![Action::MoveTo(NodeId(8)), Action::MoveTo(NodeId(12))]
        );
    }

    #[test]
    fn action_order_puts_delivery_first() {
        assert!(Action::DeliverDirect < Action::MoveTo(NodeId(0)));
        assert!(Action::MoveTo(NodeId(1)) < Action::MoveTo(NodeId(2)));
    }
}

// ── Q-table and agent ─────────────────────────────────────────────────────────

#[cfg(test)]
mod agent {
    use hd_core::{AgentRng, NodeId};

    use crate::{Action, QAgent, QTable, Region, StateKey};

    fn key() -> StateKey {
        StateKey { hub: NodeId(3), dest: Region::Superspot(NodeId(9)) }
    }

    const A: Action = Action::DeliverDirect;
    const B: Action = Action::MoveTo(NodeId(4));
    const C: Action = Action::MoveTo(NodeId(5));

    #[test]
    fn unvisited_values_are_zero() {
        let t = QTable::new();
        assert_eq!(t.get(&key(), A), 0.0);
        assert_eq!(t.max_value(&key(), &[A, B]), Some(0.0));
        assert_eq!(t.max_value(&key(), &[]), None);
        assert!(t.is_empty());
    }

    #[test]
    fn best_action_ties_go_first() {
        let mut t = QTable::new();
        assert_eq!(t.best_action(&key(), &[A, B, C]), Some(A));
        t.set(key(), B, 2.0);
        t.set(key(), C, 2.0);
        assert_eq!(t.best_action(&key(), &[A, B, C]), Some(B));
        assert_eq!(t.len(), 2);
        assert_eq!(t.state_count(), 1);
    }

    #[test]
    fn td_update_rule() {
        let mut agent = QAgent::new(NodeId(3));
        let v = agent.td_update(&key(), B, 1.0, Some(2.0), 0.5, 0.9).unwrap();
        assert!((v - 1.4).abs() < 1e-12);
        // Terminal: no bootstrap term.
        let v = agent.td_update(&key(), B, 3.0, None, 0.5, 0.9).unwrap();
        assert!((v - 2.2).abs() < 1e-12);
        assert_eq!(agent.table.get(&key(), B), v);
    }

    #[test]
    fn non_finite_update_is_refused() {
        let mut agent = QAgent::new(NodeId(3));
        agent.table.set(key(), A, 1.0);
        assert!(agent.td_update(&key(), A, f64::MAX, Some(f64::MAX), 1.0, 0.9).is_none());
        assert_eq!(agent.table.get(&key(), A), 1.0);
    }

    #[test]
    fn cold_softmax_is_greedy() {
        let mut agent = QAgent::new(NodeId(3));
        agent.table.set(key(), C, 5.0);
        let mut rng = AgentRng::new(7, NodeId(3));
        for _ in 0..200 {
            assert_eq!(agent.select_softmax(&key(), &[A, B, C], 0.01, &mut rng), Some(C));
        }
    }

    #[test]
    fn hot_softmax_explores() {
        let mut agent = QAgent::new(NodeId(3));
        agent.table.set(key(), C, 0.5);
        let mut rng = AgentRng::new(7, NodeId(3));
        let mut seen = [0usize; 3];
        for _ in 0..3_000 {
            match agent.select_softmax(&key(), &[A, B, C], 10.0, &mut rng) {
                Some(Action::DeliverDirect) => seen[0] += 1,
                Some(Action::MoveTo(NodeId(4))) => seen[1] += 1,
                Some(_) => seen[2] += 1,
                None => unreachable!(),
            }
        }
        assert!(seen.iter().all(|&n| n > 800), "{seen:?}");
    }

    #[test]
    fn softmax_edge_cases() {
        let agent = QAgent::new(NodeId(3));
        let mut rng = AgentRng::new(7, NodeId(3));
        assert_eq!(agent.select_softmax(&key(), &[], 1.0, &mut rng), None);
        assert_eq!(agent.select_softmax(&key(), &[B], 1.0, &mut rng), Some(B));
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use crate::{TemperatureSchedule, TrainingConfig};

    #[test]
    fn defaults_are_valid() {
        assert!(TrainingConfig::default().validate().is_ok());
    }

    #[test]
    fn bad_parameters_rejected() {
        let base = TrainingConfig::default();
        for cfg in [
            TrainingConfig { alpha: 0.0, ..base.clone() },
            TrainingConfig { alpha: 1.5, ..base.clone() },
            TrainingConfig { gamma: 1.1, ..base.clone() },
            TrainingConfig { max_steps: 0, ..base.clone() },
            TrainingConfig { sync_interval: 0, ..base.clone() },
            TrainingConfig { delivery_reward: f64::INFINITY, ..base.clone() },
            TrainingConfig {
                temperature: TemperatureSchedule { floor: 0.0, ..TemperatureSchedule::default() },
                ..base.clone()
            },
        ] {
            assert!(cfg.validate().is_err(), "{cfg:?}");
        }
    }

    #[test]
    fn temperature_anneals_to_floor() {
        let t = TemperatureSchedule::default();
        assert_eq!(t.at(0), 1.0);
        let mut prev = t.at(0);
        for e in 1..2_000 {
            let cur = t.at(e);
            assert!(cur <= prev);
            prev = cur;
        }
        assert_eq!(t.at(10_000), 0.01);
    }

    #[test]
    fn rounds_cover_all_episodes() {
        let cfg = TrainingConfig { episodes: 101, sync_interval: 50, ..TrainingConfig::default() };
        assert_eq!(cfg.rounds(), 3);
    }
}

// ── Demand models ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod demand {
    use hd_core::{AgentRng, NodeId};

    use crate::{DemandModel, UniformConsumers, WeightedConsumers};

    use super::helpers::two_regions;

    #[test]
    fn uniform_from_graph_lists_consumers() {
        let g = two_regions();
        let d = UniformConsumers::from_graph(&g);
        assert_eq!(d.nodes(), &[NodeId(1), NodeId(3), NodeId(5), NodeId(7)]);
        let mut rng = AgentRng::new(1, NodeId(0));
        for _ in 0..50 {
            assert!(d.nodes().contains(&d.sample(&mut rng).unwrap()));
        }
    }

    #[test]
    fn empty_uniform_samples_nothing() {
        let mut rng = AgentRng::new(1, NodeId(0));
        assert_eq!(UniformConsumers::new(vec![]).sample(&mut rng), None);
    }

    #[test]
    fn zero_weight_never_drawn() {
        let d = WeightedConsumers::new(vec![(NodeId(1), 0.0), (NodeId(2), 3.0), (NodeId(3), 1.0)])
            .unwrap();
        let mut rng = AgentRng::new(1, NodeId(0));
        let mut twos = 0;
        for _ in 0..1_000 {
            let n = d.sample(&mut rng).unwrap();
            assert_ne!(n, NodeId(1));
            if n == NodeId(2) {
                twos += 1;
            }
        }
        assert!(twos > 650 && twos < 850, "{twos}");
    }

    #[test]
    fn invalid_weights_rejected() {
        assert!(WeightedConsumers::new(vec![(NodeId(1), -1.0)]).is_err());
        assert!(WeightedConsumers::new(vec![(NodeId(1), 0.0)]).is_err());
        assert!(WeightedConsumers::new(vec![(NodeId(1), f64::NAN)]).is_err());
    }
}

// ── Trainer ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod trainer {
    use hd_core::NodeId;

    use crate::{
        Action, AgentError, AgentSet, QAgent, StateKey, Trainer, TrainingConfig,
        UniformConsumers,
    };

    use super::helpers::{dead_end_graph, two_regions};

    #[test]
    fn reachable_action_beats_dead_end() {
        let s = dead_end_graph();
        let demand = UniformConsumers::new(vec![s.reachable, s.unreachable]);
        let cfg = TrainingConfig { alpha: 0.1, gamma: 0.9, episodes: 100, ..TrainingConfig::default() };
        let out = Trainer::new(&s.graph, &demand, cfg).unwrap().train_agent(s.hub).unwrap();

        let agent = out.agents.get(s.hub).unwrap();
        let to_c = StateKey::for_order(&s.graph, s.hub, s.reachable).unwrap();
        let to_u = StateKey::for_order(&s.graph, s.hub, s.unreachable).unwrap();
        let deliver = agent.table.get(&to_c, Action::DeliverDirect);
        let detour = agent.table.get(&to_c, Action::MoveTo(s.dead_end));
        let doomed = agent.table.get(&to_u, Action::MoveTo(s.dead_end));

        assert!(deliver > 0.0);
        assert!(deliver > detour);
        assert!(deliver > doomed);
        assert!(doomed < 0.0);
        assert_eq!(out.stats.hub_returns(s.hub).len(), 100);
    }

    #[test]
    fn unknown_hub_rejected() {
        let s = dead_end_graph();
        let demand = UniformConsumers::new(vec![s.reachable]);
        let t = Trainer::new(&s.graph, &demand, TrainingConfig::default()).unwrap();
        assert!(matches!(t.train_agent(s.reachable), Err(AgentError::UnknownHub(_))));
        assert!(matches!(t.train_agent(NodeId(99)), Err(AgentError::UnknownHub(_))));
    }

    #[test]
    fn invalid_config_rejected_before_training() {
        let s = dead_end_graph();
        let demand = UniformConsumers::new(vec![s.reachable]);
        let cfg = TrainingConfig { gamma: -0.1, ..TrainingConfig::default() };
        assert!(matches!(Trainer::new(&s.graph, &demand, cfg), Err(AgentError::Config(_))));
    }

    #[test]
    fn training_is_deterministic() {
        let g = two_regions();
        let demand = UniformConsumers::from_graph(&g);
        let cfg = TrainingConfig { episodes: 120, sync_interval: 30, ..TrainingConfig::default() };
        let a = Trainer::new(&g, &demand, cfg.clone()).unwrap().train_all().unwrap();
        let b = Trainer::new(&g, &demand, cfg).unwrap().train_all().unwrap();
        assert_eq!(a.agents, b.agents);
        assert_eq!(a.stats, b.stats);
        assert_eq!(a.agents.len(), 6);
    }

    #[test]
    fn returns_do_not_decrease_over_training() {
        let g = two_regions();
        let demand = UniformConsumers::from_graph(&g);
        let (mut first, mut last) = (0.0, 0.0);
        for seed in [1, 2, 3] {
            let cfg = TrainingConfig {
                episodes: 300,
                sync_interval: 25,
                seed,
                ..TrainingConfig::default()
            };
            let out = Trainer::new(&g, &demand, cfg).unwrap().train_all().unwrap();
            let means = out.stats.window_means(25);
            assert_eq!(means.len(), 12);
            first += means[0];
            last += means[11];
        }
        assert!(last >= first, "first window {first}, last window {last}");
    }

    #[test]
    fn trained_policy_delivers_across_regions() {
        let g = two_regions();
        let demand = UniformConsumers::from_graph(&g);
        let cfg = TrainingConfig { episodes: 400, sync_interval: 20, ..TrainingConfig::default() };
        let out = Trainer::new(&g, &demand, cfg).unwrap().train_all().unwrap();

        // Follow the greedy policy from H0 (node 8) to consumer 7 under H3.
        let dest = NodeId(7);
        let mut at = NodeId(8);
        let mut delivered = false;
        for _ in 0..16 {
            match out.agents.decide(&g, at, dest) {
                Some(Action::DeliverDirect) => {
                    delivered = true;
                    break;
                }
                Some(Action::MoveTo(n)) => at = n,
                None => break,
            }
        }
        assert!(delivered);
        assert_eq!(at, NodeId(11));
    }

    #[test]
    fn divergence_halts_training() {
        let s = dead_end_graph();
        // X's only action is to deliver; a huge negative start value plus a
        // huge reward overflows the TD target.
        let x = NodeId(3);
        let state = StateKey::for_order(&s.graph, x, s.unreachable).unwrap();
        let mut warm = QAgent::new(x);
        warm.table.set(state, Action::DeliverDirect, -1e308);
        let demand = UniformConsumers::new(vec![s.unreachable]);
        let cfg = TrainingConfig { delivery_reward: 1e308, ..TrainingConfig::default() };
        let t = Trainer::new(&s.graph, &demand, cfg)
            .unwrap()
            .warm_start(AgentSet::from_iter([warm]));
        assert!(matches!(
            t.train_agent(x),
            Err(AgentError::Divergence { hub, episode: 0 }) if hub == x
        ));
    }

    #[test]
    fn zero_episodes_yields_empty_tables() {
        let g = two_regions();
        let demand = UniformConsumers::from_graph(&g);
        let cfg = TrainingConfig { episodes: 0, ..TrainingConfig::default() };
        let out = Trainer::new(&g, &demand, cfg).unwrap().train_all().unwrap();
        assert_eq!(out.agents.len(), 6);
        assert!(out.agents.iter().all(|a| a.table.is_empty()));
        assert!(out.stats.mean_return().is_none());
    }
}

// ── Model artifact ────────────────────────────────────────────────────────────

#[cfg(test)]
mod artifact {
    use hd_core::NodeId;

    use crate::{
        Action, AgentError, ModelArtifact, QEntry, Region, StateKey, Trainer, TrainingConfig,
        UniformConsumers,
    };

    use super::helpers::two_regions;

    #[test]
    fn json_round_trip_preserves_agents() {
        let g = two_regions();
        let demand = UniformConsumers::from_graph(&g);
        let cfg = TrainingConfig { episodes: 60, sync_interval: 20, ..TrainingConfig::default() };
        let out = Trainer::new(&g, &demand, cfg.clone()).unwrap().train_all().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        ModelArtifact::from_agents(&out.agents, &cfg).save_json(&path).unwrap();

        let loaded = ModelArtifact::load_json(&path).unwrap();
        assert_eq!(loaded.training, cfg);
        assert_eq!(loaded.to_agents().unwrap(), out.agents);
    }

    #[test]
    fn foreign_state_rejected() {
        let mut art = ModelArtifact::from_agents(&Default::default(), &TrainingConfig::default());
        art.hubs.push(crate::HubModel {
            hub: NodeId(8),
            entries: vec![QEntry {
                state: StateKey { hub: NodeId(9), dest: Region::Superspot(NodeId(13)) },
                action: Action::MoveTo(NodeId(12)),
                value: 1.0,
            }],
        });
        assert!(matches!(art.to_agents(), Err(AgentError::Artifact(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ModelArtifact::load_json(&dir.path().join("absent.json")),
            Err(AgentError::Io(_))
        ));
    }
}
