//! Read-only view of one intersection, handed to observers.

use std::fmt;

use ts_core::{IntersectionId, PerApproach};

use crate::{LightState, Phase};

/// Summary status as a dashboard would show it.  An incident outranks
/// congestion.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IntersectionStatus {
    Normal,
    Congested,
    Incident,
}

impl fmt::Display for IntersectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntersectionStatus::Normal => f.write_str("Normal"),
            IntersectionStatus::Congested => f.write_str("Congested"),
            IntersectionStatus::Incident => f.write_str("Incident"),
        }
    }
}

/// A consistent copy of an intersection's state, taken under its lock.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntersectionSnapshot {
    pub id:             IntersectionId,
    pub vehicle_counts: PerApproach<u32>,
    pub phase:          Phase,
    pub light_state:    LightState,
    pub blocked:        PerApproach<bool>,
    pub congested:      bool,
    pub status:         IntersectionStatus,
}

impl IntersectionSnapshot {
    /// Total vehicles queued on all approaches.
    pub fn total_queued(&self) -> u32 {
        self.vehicle_counts.values().sum()
    }
}
