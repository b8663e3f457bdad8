//! `ts-signal`: the per-intersection signal controller.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`phase`]       | `Phase`, `LightState`, `Demand`, `arbitrate`, transitions |
//! | [`controller`]  | `IntersectionController`, `ControllerParams`, `PhaseTimer`|
//! | [`snapshot`]    | `IntersectionSnapshot`, `IntersectionStatus`              |
//!
//! # Control loop (summary)
//!
//! ```text
//! every tick      generate_arrivals()   unblocked approaches, p per approach
//! timer expiry    fire(timer, now)      next_transition → enter → arm
//! block change    set_blocked(..)       cancel → reevaluate_transition → arm
//! ```
//!
//! The controller never schedules anything itself: every method that arms a
//! timer returns the [`PhaseTimer`] and the caller decides where to queue it.

pub mod controller;
pub mod phase;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use controller::{ControllerParams, IntersectionController, PhaseTimer};
pub use phase::{
    Demand, LightColor, LightState, Phase, PhaseTiming, Transition, arbitrate, next_transition,
    reevaluate_transition,
};
pub use snapshot::{IntersectionSnapshot, IntersectionStatus};
