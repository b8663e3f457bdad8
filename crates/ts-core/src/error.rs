//! Core error type.
//!
//! Sub-crates define their own error enums and convert `CoreError` into them
//! via `From` impls.  Everything here is a boundary error: once a value has
//! been parsed into a typed `Approach` or validated into a `SimConfig`,
//! nothing downstream can fail on it.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid approach {0:?} (expected one of N, S, E, W)")]
    InvalidApproach(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `ts-core`.
pub type CoreResult<T> = Result<T, CoreError>;
