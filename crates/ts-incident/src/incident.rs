//! Incident records and the string boundary that produces them.

use std::fmt;
use std::str::FromStr;

use ts_core::{Approach, IncidentId, IntersectionId, Tick};

use crate::IncidentError;

/// What happened.  Both kinds fully block the approach.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IncidentKind {
    Accident,
    RoadClosure,
}

impl IncidentKind {
    fn summary(self) -> &'static str {
        match self {
            IncidentKind::Accident => "Accident reported.",
            IncidentKind::RoadClosure => "Road closure initiated.",
        }
    }
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncidentKind::Accident => f.write_str("accident"),
            IncidentKind::RoadClosure => f.write_str("road_closure"),
        }
    }
}

impl FromStr for IncidentKind {
    type Err = IncidentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "accident" => Ok(IncidentKind::Accident),
            "road_closure" | "closure" => Ok(IncidentKind::RoadClosure),
            _ => Err(IncidentError::InvalidKind(s.to_owned())),
        }
    }
}

/// An active incident held by the registry.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Incident {
    pub id:           IncidentId,
    pub intersection: IntersectionId,
    pub approach:     Approach,
    pub kind:         IncidentKind,
    pub description:  String,
    /// Simulation tick at which the incident was raised.
    pub raised_at:    Tick,
}

impl Incident {
    pub(crate) fn describe(intersection: &IntersectionId, approach: Approach, kind: IncidentKind) -> String {
        format!(
            "Event on {approach} of Intersection {intersection}: {}",
            kind.summary()
        )
    }
}

/// A parsed `intersection:approach:kind` triple, e.g. `B:E:road_closure`.
///
/// Parsing is where malformed approaches and kinds are rejected; nothing
/// past this point handles untyped input.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IncidentRequest {
    pub intersection: IntersectionId,
    pub approach:     Approach,
    pub kind:         IncidentKind,
}

impl FromStr for IncidentRequest {
    type Err = IncidentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(id), Some(approach), Some(kind), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(IncidentError::InvalidRequest(s.to_owned()));
        };
        let id = id.trim();
        if id.is_empty() {
            return Err(IncidentError::InvalidRequest(s.to_owned()));
        }
        Ok(Self {
            intersection: IntersectionId::from(id),
            approach:     approach.parse()?,
            kind:         kind.parse()?,
        })
    }
}
