//! Whole-simulation snapshot and the global congestion rating.

use std::collections::BTreeMap;
use std::fmt;

use ts_core::IntersectionId;
use ts_signal::IntersectionSnapshot;

/// Network-wide congestion, rated by the fraction of congested intersections.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CongestionLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl CongestionLevel {
    /// `> 0.66` → High, `> 0.33` → Medium, otherwise Low.  An empty network
    /// is Low.
    pub fn from_counts(congested: usize, total: usize) -> Self {
        if total == 0 {
            return CongestionLevel::Low;
        }
        let ratio = congested as f64 / total as f64;
        if ratio > 0.66 {
            CongestionLevel::High
        } else if ratio > 0.33 {
            CongestionLevel::Medium
        } else {
            CongestionLevel::Low
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CongestionLevel::Low => f.write_str("Low"),
            CongestionLevel::Medium => f.write_str("Medium"),
            CongestionLevel::High => f.write_str("High"),
        }
    }
}

/// Read-only state of the whole simulation after a tick or command.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimSnapshot {
    pub clock_secs:            u64,
    pub running:               bool,
    pub intersections:         BTreeMap<IntersectionId, IntersectionSnapshot>,
    pub congestion_level:      CongestionLevel,
    pub congested_count:       usize,
    pub active_incident_count: usize,
}

impl SimSnapshot {
    pub fn aggregate(
        clock_secs:            u64,
        running:               bool,
        intersections:         Vec<IntersectionSnapshot>,
        active_incident_count: usize,
    ) -> Self {
        let total = intersections.len();
        let congested_count = intersections.iter().filter(|s| s.congested).count();
        Self {
            clock_secs,
            running,
            intersections: intersections.into_iter().map(|s| (s.id.clone(), s)).collect(),
            congestion_level: CongestionLevel::from_counts(congested_count, total),
            congested_count,
            active_incident_count,
        }
    }

    pub fn intersection(&self, id: &str) -> Option<&IntersectionSnapshot> {
        self.intersections.get(id)
    }

    /// e.g. `"Medium (1/3 congested)"`.
    pub fn congestion_summary(&self) -> String {
        format!(
            "{} ({}/{} congested)",
            self.congestion_level,
            self.congested_count,
            self.intersections.len()
        )
    }
}
