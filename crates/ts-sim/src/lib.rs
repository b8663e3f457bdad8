//! `ts-sim`: simulation controller for the traffic-signal twin.
//!
//! # Tick
//!
//! One tick is one simulated second:
//!
//! ```text
//! on_tick:
//!   ① Clock    : advance by one second.
//!   ② Arrivals : each intersection rolls one arrival per unblocked approach
//!                (parallel with the `parallel` feature).
//!   ③ Timers   : drain phase timers due this tick from the PhaseScheduler;
//!                each live one advances its intersection's phase and queues
//!                the next timer.  Stale timers are discarded.
//!   ④ Snapshot : aggregate per-intersection state and the congestion level.
//! ```
//!
//! Incident commands run between ticks and re-evaluate the affected
//! intersection at once, swapping its queued timer.
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`sim`]         | `Simulation`: commands, tick routine, queries         |
//! | [`builder`]     | `SimBuilder`                                          |
//! | [`ticker`]      | `Ticker`: wall-clock driver on a background thread    |
//! | [`scheduler`]   | `PhaseScheduler`: pending timers by due tick          |
//! | [`snapshot`]    | `SimSnapshot`, `CongestionLevel`                      |
//! | [`observer`]    | `SimObserver` trait, `NoopObserver`                   |
//! | [`error`]       | `SimError`, `SimResult<T>`                            |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the arrival step on Rayon's thread pool.          |
//! | `fx-hash`  | FxHash for the intersection-id lookup table.           |
//! | `serde`    | Serialize/Deserialize on snapshots and config.         |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ts_core::{Approach, SimConfig};
//! use ts_incident::IncidentKind;
//! use ts_sim::{NoopObserver, Simulation};
//!
//! let sim = Simulation::new(SimConfig::default())?;
//! sim.start();
//! sim.run_ticks(30, &mut NoopObserver)?;
//! sim.trigger_incident(&"B".into(), Approach::N, IncidentKind::Accident)?;
//! println!("{}", sim.snapshot().congestion_summary());
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod scheduler;
pub mod sim;
pub mod snapshot;
pub mod ticker;

mod sync;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use scheduler::{PhaseScheduler, ScheduledPhase};
pub use sim::Simulation;
pub use snapshot::{CongestionLevel, SimSnapshot};
pub use ticker::Ticker;
