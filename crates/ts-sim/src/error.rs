use thiserror::Error;

use ts_core::{CoreError, IncidentId, IntersectionId};
use ts_incident::IncidentError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("unknown intersection {0:?}")]
    UnknownIntersection(IntersectionId),

    #[error("simulation is not running")]
    NotRunning,

    #[error("no active incident {0}")]
    UnknownIncident(IncidentId),

    #[error("invalid approach {0:?}")]
    InvalidApproach(String),

    #[error("invalid incident kind {0:?}")]
    InvalidKind(String),

    #[error("malformed incident request {0:?}")]
    InvalidRequest(String),

    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("failed to spawn ticker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidApproach(s) => SimError::InvalidApproach(s),
            CoreError::Config(s) => SimError::Config(s),
        }
    }
}

impl From<IncidentError> for SimError {
    fn from(e: IncidentError) -> Self {
        match e {
            IncidentError::UnknownIntersection(id) => SimError::UnknownIntersection(id),
            IncidentError::UnknownIncident(id) => SimError::UnknownIncident(id),
            IncidentError::InvalidKind(s) => SimError::InvalidKind(s),
            IncidentError::InvalidRequest(s) => SimError::InvalidRequest(s),
            IncidentError::Core(e) => e.into(),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
