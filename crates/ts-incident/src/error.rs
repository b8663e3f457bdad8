use thiserror::Error;

use ts_core::{CoreError, IncidentId, IntersectionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IncidentError {
    #[error("unknown intersection {0:?}")]
    UnknownIntersection(IntersectionId),

    #[error("no active incident {0}")]
    UnknownIncident(IncidentId),

    #[error("invalid incident kind {0:?} (expected accident or road_closure)")]
    InvalidKind(String),

    #[error("malformed incident request {0:?} (expected intersection:approach:kind)")]
    InvalidRequest(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type IncidentResult<T> = Result<T, IncidentError>;
