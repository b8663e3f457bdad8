//! `ts-core`: foundational types for the traffic-signal twin.
//!
//! This crate is a dependency of every other `ts-*` crate.  It intentionally
//! has no `ts-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `IntersectionId`, `IncidentId`                        |
//! | [`approach`]    | `Approach`, `Direction`, `PerApproach<T>`             |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`config`]      | `SimConfig`, `ArbitrationPolicy`                      |
//! | [`rng`]         | `IntersectionRng` (per-intersection arrivals)         |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required to load `SimConfig` from TOML.                    |

pub mod approach;
pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use approach::{Approach, Direction, PerApproach};
pub use config::{ArbitrationPolicy, SimConfig};
pub use error::{CoreError, CoreResult};
pub use ids::{IncidentId, IntersectionId};
pub use rng::IntersectionRng;
pub use time::{SimClock, Tick};
