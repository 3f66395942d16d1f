use std::path::PathBuf;
use thiserror::Error;

/// Percentiles reported for every sample set, in ascending order.
pub const PERCENTILES: [f64; 5] = [50.0, 90.0, 95.0, 99.0, 99.9];

/// Error types for latplot operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LatplotError {
    #[error("No file matching {pattern} found in {}", dir.display())]
    NoInputFile { dir: PathBuf, pattern: String },

    #[error("Invalid file pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("I/O error on {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    #[error("No latency samples to analyse")]
    EmptySampleSet,

    #[error("Failed to render {}: {reason}", path.display())]
    Render { path: PathBuf, reason: String },
}

impl LatplotError {
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        LatplotError::Io { path: path.into(), reason: err.to_string() }
    }
}

/// Result type for latplot operations
pub type Result<T> = std::result::Result<T, LatplotError>;
