//! Error types for loading and per-row coordinate transforms.

use thiserror::Error;

/// Fatal failure to turn a source into rows. Nothing downstream can run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("source is neither UTF-8 nor EUC-KR text")]
    Decode,

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("source has no header row")]
    MissingHeader,
}

/// Which planar axis a malformed value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Why a single row could not be projected. Never aborts the batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("{axis} coordinate {value:?} is not a number")]
    Malformed { axis: Axis, value: String },

    #[error("coordinate pair is not finite")]
    NonFinite,

    #[error("projected point ({lat:.6}, {lon:.6}) lies outside the area of use")]
    OutOfDomain { lat: f64, lon: f64 },

    #[error("coordinate system: {0}")]
    Projection(String),
}

impl From<proj4rs::errors::Error> for TransformError {
    fn from(err: proj4rs::errors::Error) -> Self {
        TransformError::Projection(err.to_string())
    }
}
