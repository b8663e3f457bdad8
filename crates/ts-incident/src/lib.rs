//! `ts-incident`: accidents and road closures that block approaches.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`incident`]    | `IncidentKind`, `Incident`, `IncidentRequest`             |
//! | [`registry`]    | `IncidentRegistry`, `BlockTarget` trait                   |
//! | [`error`]       | `IncidentError`, `IncidentResult<T>`                      |
//!
//! The registry is the only writer of an intersection's `blocked` flags.  It
//! does not know how intersections are stored or locked: it drives them
//! through the [`BlockTarget`] trait, which the simulation implements.

pub mod error;
pub mod incident;
pub mod registry;


pub use error::{IncidentError, IncidentResult};
pub use incident::{Incident, IncidentKind, IncidentRequest};
pub use registry::{BlockTarget, IncidentRegistry};
