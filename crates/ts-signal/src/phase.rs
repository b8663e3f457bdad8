//! Signal phases, light indications, and the pure transition function.
//!
//! Nothing in this module holds state.  [`next_transition`] maps
//! `(phase, demand, last_served)` to the phase to enter and how long to hold
//! it; the controller applies the result and the scheduler arms the timer.
//!
//! ```text
//!   NsGreen ──yellow──▶ NsYellow ──pause──▶ AllRed ◀──pause── EwYellow ◀──yellow── EwGreen
//!      ▲                                     │  ▲                                     ▲
//!      └──────────────── green ──────────────┤  └─ 2×pause (no demand)               │
//!                                            └──────────────── green ────────────────┘
//! ```

use std::fmt;

use ts_core::{ArbitrationPolicy, Direction, SimConfig};

// ── Light indications ─────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LightColor {
    Red,
    Yellow,
    Green,
}

impl fmt::Display for LightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightColor::Red => f.write_str("red"),
            LightColor::Yellow => f.write_str("yellow"),
            LightColor::Green => f.write_str("green"),
        }
    }
}

/// The pair of signal heads at an intersection.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightState {
    pub ns: LightColor,
    pub ew: LightColor,
}

impl LightState {
    pub const ALL_RED: LightState = LightState { ns: LightColor::Red, ew: LightColor::Red };

    /// At most one head shows a non-red indication.
    #[inline]
    pub fn is_conflict_free(&self) -> bool {
        self.ns == LightColor::Red || self.ew == LightColor::Red
    }
}

// ── Phase ─────────────────────────────────────────────────────────────────────

/// Signal controller state.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Phase {
    NsGreen,
    NsYellow,
    EwGreen,
    EwYellow,
    #[default]
    AllRed,
}

impl Phase {
    #[inline]
    pub fn green(direction: Direction) -> Phase {
        match direction {
            Direction::NorthSouth => Phase::NsGreen,
            Direction::EastWest => Phase::EwGreen,
        }
    }

    #[inline]
    pub fn yellow(direction: Direction) -> Phase {
        match direction {
            Direction::NorthSouth => Phase::NsYellow,
            Direction::EastWest => Phase::EwYellow,
        }
    }

    /// The direction showing a non-red indication, if any.
    #[inline]
    pub fn direction(self) -> Option<Direction> {
        match self {
            Phase::NsGreen | Phase::NsYellow => Some(Direction::NorthSouth),
            Phase::EwGreen | Phase::EwYellow => Some(Direction::EastWest),
            Phase::AllRed => None,
        }
    }

    #[inline]
    pub fn is_green(self) -> bool {
        matches!(self, Phase::NsGreen | Phase::EwGreen)
    }

    /// The light indications implied by this phase.
    pub fn light_state(self) -> LightState {
        use LightColor::*;
        match self {
            Phase::NsGreen => LightState { ns: Green, ew: Red },
            Phase::NsYellow => LightState { ns: Yellow, ew: Red },
            Phase::EwGreen => LightState { ns: Red, ew: Green },
            Phase::EwYellow => LightState { ns: Red, ew: Yellow },
            Phase::AllRed => LightState::ALL_RED,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::NsGreen => "NS_GREEN",
            Phase::NsYellow => "NS_YELLOW",
            Phase::EwGreen => "EW_GREEN",
            Phase::EwYellow => "EW_YELLOW",
            Phase::AllRed => "ALL_RED",
        };
        f.write_str(s)
    }
}

// ── Demand and arbitration ────────────────────────────────────────────────────

/// Which directions have at least one unblocked approach with a queue.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Demand {
    pub ns: bool,
    pub ew: bool,
}

impl Demand {
    #[inline]
    pub fn has(self, direction: Direction) -> bool {
        match direction {
            Direction::NorthSouth => self.ns,
            Direction::EastWest => self.ew,
        }
    }
}

/// Pick the direction to turn green from all-red, or `None` to stay all-red.
pub fn arbitrate(
    demand:      Demand,
    last_served: Option<Direction>,
    policy:      ArbitrationPolicy,
) -> Option<Direction> {
    match (demand.ns, demand.ew) {
        (false, false) => None,
        (true, false) => Some(Direction::NorthSouth),
        (false, true) => Some(Direction::EastWest),
        (true, true) => Some(match policy {
            ArbitrationPolicy::Alternate => last_served
                .map(Direction::opposite)
                .unwrap_or(Direction::NorthSouth),
            ArbitrationPolicy::PreferLast => match last_served {
                Some(Direction::EastWest) => Direction::EastWest,
                _ => Direction::NorthSouth,
            },
        }),
    }
}

// ── Timing and transitions ────────────────────────────────────────────────────

/// Phase hold durations in seconds (= ticks).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PhaseTiming {
    pub green_secs:   u64,
    pub yellow_secs:  u64,
    pub all_red_secs: u64,
}

impl PhaseTiming {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            green_secs:   config.base_green_secs,
            yellow_secs:  config.yellow_secs,
            all_red_secs: config.all_red_pause_secs,
        }
    }

    /// All-red hold when neither direction has demand.
    #[inline]
    pub fn idle_secs(&self) -> u64 {
        self.all_red_secs.saturating_mul(2)
    }
}

impl Default for PhaseTiming {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

/// The phase to enter and how long to hold it once entered.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Transition {
    pub phase:     Phase,
    pub hold_secs: u64,
}

/// Duration-triggered edge out of `phase`.
///
/// Green and yellow edges are unconditional; all-red consults [`arbitrate`].
pub fn next_transition(
    phase:       Phase,
    demand:      Demand,
    last_served: Option<Direction>,
    policy:      ArbitrationPolicy,
    timing:      PhaseTiming,
) -> Transition {
    match phase {
        Phase::NsGreen => Transition {
            phase:     Phase::NsYellow,
            hold_secs: timing.yellow_secs,
        },
        Phase::EwGreen => Transition {
            phase:     Phase::EwYellow,
            hold_secs: timing.yellow_secs,
        },
        Phase::NsYellow | Phase::EwYellow => Transition {
            phase:     Phase::AllRed,
            hold_secs: timing.all_red_secs,
        },
        Phase::AllRed => match arbitrate(demand, last_served, policy) {
            Some(direction) => Transition {
                phase:     Phase::green(direction),
                hold_secs: timing.green_secs,
            },
            None => Transition {
                phase:     Phase::AllRed,
                hold_secs: timing.idle_secs(),
            },
        },
    }
}

/// Immediate re-evaluation after the blocking state of an approach changed.
///
/// A green whose direction still has demand keeps the green and restarts its
/// hold; every other phase takes its normal edge without waiting out the
/// remaining time.
pub fn reevaluate_transition(
    phase:       Phase,
    demand:      Demand,
    last_served: Option<Direction>,
    policy:      ArbitrationPolicy,
    timing:      PhaseTiming,
) -> Transition {
    match phase.direction() {
        Some(direction) if phase.is_green() && demand.has(direction) => Transition {
            phase,
            hold_secs: timing.green_secs,
        },
        _ => next_transition(phase, demand, last_served, policy, timing),
    }
}
