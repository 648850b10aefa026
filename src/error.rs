//! Error types for spherical Voronoi generation

use thiserror::Error;

/// Errors that can occur while configuring or running a tessellation
///
/// The sweep core itself never fails: degenerate events are dropped and lost
/// ownership races are ignored. These errors cover the API boundary (bad input,
/// bad configuration, thread pool setup and export I/O).
#[derive(Debug, Error)]
pub enum VoronoiError {
    /// Invalid configuration parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Fewer sites than the sweep needs to bootstrap its beach line
    #[error("Insufficient points: need at least 2 sites, got {0}")]
    InsufficientPoints(usize),

    /// An input direction could not be placed on the unit sphere
    #[error("Invalid point at index {index}: {reason}")]
    InvalidPoint {
        /// Position of the offending vector in the input slice
        index: usize,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Generation failed outside the sweep core (e.g. the worker pool could not start)
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Writing an export failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for Voronoi operations
pub type Result<T> = std::result::Result<T, VoronoiError>;
