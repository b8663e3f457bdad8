//! Approaches, signal directions, and fixed-size per-approach storage.
//!
//! Every intersection has exactly four approaches.  `PerApproach<T>` stores
//! one value per approach in a `[T; 4]` so queue lengths and block flags are
//! indexed by `Approach` with no hashing and no missing-key case.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::CoreError;

// ── Approach ──────────────────────────────────────────────────────────────────

/// One of the four compass-direction traffic streams entering an intersection.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Approach {
    N,
    S,
    E,
    W,
}

impl Approach {
    /// All approaches in storage order.
    pub const ALL: [Approach; 4] = [Approach::N, Approach::S, Approach::E, Approach::W];

    /// The signal direction that serves this approach.
    #[inline]
    pub fn direction(self) -> Direction {
        match self {
            Approach::N | Approach::S => Direction::NorthSouth,
            Approach::E | Approach::W => Direction::EastWest,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Approach::N => "N",
            Approach::S => "S",
            Approach::E => "E",
            Approach::W => "W",
        };
        f.write_str(s)
    }
}

impl FromStr for Approach {
    type Err = CoreError;

    /// Accepts `N`/`S`/`E`/`W` or the full compass word, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Approach::N),
            "s" | "south" => Ok(Approach::S),
            "e" | "east" => Ok(Approach::E),
            "w" | "west" => Ok(Approach::W),
            _ => Err(CoreError::InvalidApproach(s.to_owned())),
        }
    }
}

// ── Direction ─────────────────────────────────────────────────────────────────

/// A pair of opposing approaches that share a signal head.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    NorthSouth,
    EastWest,
}

impl Direction {
    /// The two approaches served by this direction.
    #[inline]
    pub fn approaches(self) -> [Approach; 2] {
        match self {
            Direction::NorthSouth => [Approach::N, Approach::S],
            Direction::EastWest => [Approach::E, Approach::W],
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::NorthSouth => Direction::EastWest,
            Direction::EastWest => Direction::NorthSouth,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::NorthSouth => f.write_str("NS"),
            Direction::EastWest => f.write_str("EW"),
        }
    }
}

// ── PerApproach ───────────────────────────────────────────────────────────────

/// One `T` per approach, indexed by [`Approach`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerApproach<T>([T; 4]);

impl<T> PerApproach<T> {
    pub fn new(n: T, s: T, e: T, w: T) -> Self {
        Self([n, s, e, w])
    }

    /// Iterate `(approach, &value)` pairs in N, S, E, W order.
    pub fn iter(&self) -> impl Iterator<Item = (Approach, &T)> {
        Approach::ALL.into_iter().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn map<U>(&self, mut f: impl FnMut(Approach, &T) -> U) -> PerApproach<U> {
        PerApproach([
            f(Approach::N, &self.0[0]),
            f(Approach::S, &self.0[1]),
            f(Approach::E, &self.0[2]),
            f(Approach::W, &self.0[3]),
        ])
    }
}

impl<T: Copy> PerApproach<T> {
    /// Every approach set to `value`.
    pub fn splat(value: T) -> Self {
        Self([value; 4])
    }
}

impl<T> Index<Approach> for PerApproach<T> {
    type Output = T;

    #[inline]
    fn index(&self, approach: Approach) -> &T {
        &self.0[approach.slot()]
    }
}

impl<T> IndexMut<Approach> for PerApproach<T> {
    #[inline]
    fn index_mut(&mut self, approach: Approach) -> &mut T {
        &mut self.0[approach.slot()]
    }
}
