//! `IncidentRegistry`: active incidents and the blocks they hold.

use std::collections::BTreeMap;

use log::info;

use ts_core::{Approach, IncidentId, IntersectionId, Tick};

use crate::{Incident, IncidentError, IncidentKind, IncidentResult};

/// Where the registry applies and reverts blocks.
///
/// Implementations must take the same exclusive access to the intersection
/// that a phase-timer firing would, since changing a block re-arms the
/// intersection's timer.
pub trait BlockTarget {
    /// Whether `intersection` exists.
    fn contains(&self, intersection: &IntersectionId) -> bool;

    /// Set or clear the block on one approach.  Returns `false` if the
    /// intersection does not exist.
    fn set_blocked(&mut self, intersection: &IntersectionId, approach: Approach, blocked: bool) -> bool;
}

/// Active incidents, keyed by id in creation order.
#[derive(Debug, Default)]
pub struct IncidentRegistry {
    incidents: BTreeMap<IncidentId, Incident>,
    next_id:   u64,
}

impl IncidentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new incident and block its approach.
    ///
    /// Triggering again on an already-blocked approach records a second,
    /// distinct incident; the block itself is unchanged.
    pub fn trigger<T: BlockTarget>(
        &mut self,
        target:       &mut T,
        intersection: &IntersectionId,
        approach:     Approach,
        kind:         IncidentKind,
        now:          Tick,
    ) -> IncidentResult<IncidentId> {
        if !target.contains(intersection) {
            return Err(IncidentError::UnknownIntersection(intersection.clone()));
        }
        target.set_blocked(intersection, approach, true);

        self.next_id += 1;
        let id = IncidentId(self.next_id);
        let incident = Incident {
            id,
            intersection: intersection.clone(),
            approach,
            kind,
            description: Incident::describe(intersection, approach, kind),
            raised_at: now,
        };
        info!("{id} at {now}: {}", incident.description);
        self.incidents.insert(id, incident);
        Ok(id)
    }

    /// Remove one incident.  Its approach is unblocked only when no other
    /// active incident covers the same intersection and approach.
    pub fn clear<T: BlockTarget>(&mut self, target: &mut T, id: IncidentId) -> IncidentResult<Incident> {
        let incident = self
            .incidents
            .remove(&id)
            .ok_or(IncidentError::UnknownIncident(id))?;
        if !self.blocks(&incident.intersection, incident.approach) {
            target.set_blocked(&incident.intersection, incident.approach, false);
        }
        info!("cleared {id}: {}", incident.description);
        Ok(incident)
    }

    /// Remove every incident and unblock every approach they held.  Returns
    /// how many incidents were cleared; zero on an empty registry.
    pub fn clear_all<T: BlockTarget>(&mut self, target: &mut T) -> usize {
        let cleared = std::mem::take(&mut self.incidents);
        if cleared.is_empty() {
            return 0;
        }
        let mut unblocked: Vec<(&IntersectionId, Approach)> = Vec::new();
        for incident in cleared.values() {
            let key = (&incident.intersection, incident.approach);
            if !unblocked.contains(&key) {
                target.set_blocked(key.0, key.1, false);
                unblocked.push(key);
            }
        }
        info!("cleared {} active incident(s)", cleared.len());
        cleared.len()
    }

    /// Forget every incident without touching any intersection.  Used by a
    /// full reset, which clears blocks on the intersections directly.
    pub fn forget_all(&mut self) -> usize {
        std::mem::take(&mut self.incidents).len()
    }

    /// Whether any active incident blocks `approach` at `intersection`.
    pub fn blocks(&self, intersection: &IntersectionId, approach: Approach) -> bool {
        self.incidents
            .values()
            .any(|i| &i.intersection == intersection && i.approach == approach)
    }

    pub fn get(&self, id: IncidentId) -> Option<&Incident> {
        self.incidents.get(&id)
    }

    /// Active incidents in creation order.
    pub fn active(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.values()
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}
