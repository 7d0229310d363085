//! `hd-sim` — discrete-event delivery simulator.
//!
//! # Event loop
//!
//! ```text
//! while let Some(event) = queue.pop():          // (tick, insertion seq) order
//!   stop if event.at > simulation_time_secs
//!   abort if the CancelToken is set
//!   ① OrderArrival          — drive the first mile to the producer's hotspot
//!                              (Direct policy: drive straight to the consumer)
//!   ② HopDecision           — ask the routing policy at the current hub;
//!                              with ride-sharing, join or open a group
//!   ③ RideShareWindowClose  — the group departs together
//!   ④ DeliveryComplete      — the order is delivered
//! orders still in flight at the horizon fail
//! ```
//!
//! Each call to [`Simulator::run`] owns its clock, queue and orders, so
//! nothing leaks from one run into the next.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use hd_sim::{NoopObserver, RoutingPolicy, SimBuilder, SimConfig};
//!
//! let sim = SimBuilder::new(SimConfig::default(), graph)
//!     .policy(RoutingPolicy::Learned(agents))
//!     .build()?;
//! let metrics = sim.run(&mut NoopObserver)?;
//! println!("success rate {:.3}", metrics.success_rate);
//! ```

pub mod builder;
pub mod cancel;
pub mod config;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod order;
pub mod policy;
pub mod queue;
pub mod rideshare;
pub mod sim;


pub use builder::SimBuilder;
pub use cancel::CancelToken;
pub use config::{ArrivalProcess, SimConfig};
pub use error::{SimError, SimResult};
pub use metrics::SimMetrics;
pub use observer::{NoopObserver, SimObserver};
pub use order::{DeliveryOrder, OrderRequest, OrderStatus};
pub use policy::{NextHopCache, RoutingPolicy};
pub use queue::{Event, EventKind, EventQueue, GroupId};
pub use rideshare::RideShareGroup;
pub use sim::Simulator;
