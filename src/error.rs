//! Error types
//!
//! Geometry generation never fails; degenerate shapes produce empty levels.
//! Only cache construction and config loading report errors.

use thiserror::Error;

/// Errors surfaced across the crate's public operations
#[derive(Debug, Error)]
pub enum TowerError {
    /// The parameters handle no longer points at live parameters
    #[error("tower parameters are missing")]
    MissingParameters,

    /// The parameters are mutably borrowed elsewhere (e.g. from inside a listener)
    #[error("tower parameters are currently borrowed and cannot be subscribed to")]
    ParametersUnavailable,

    /// Settings JSON failed to parse
    #[error("invalid tower settings: {0}")]
    Config(#[from] serde_json::Error),

    /// Settings file could not be read
    #[error("failed to read tower settings: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned by a change listener
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;
