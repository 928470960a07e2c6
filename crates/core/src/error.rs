//! Error types for table structure reconstruction.

use thiserror::Error;

/// Errors produced while reconstructing table structure from rulings.
///
/// Empty input and incomplete rectangles are not errors: they yield empty
/// results. Only geometry that breaks the rectangle-union assumptions or
/// unusable configuration surfaces here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LatticeError {
    /// Cell or ruling geometry that cannot be merged into closed polygons.
    #[error("geometry inconsistency: {reason}")]
    GeometryInconsistency { reason: String },

    /// Settings outside their accepted range.
    #[error("invalid settings: {message}")]
    InvalidSettings { message: String },

    /// A ruling segment that is not finite or not axis-aligned.
    #[error("invalid ruling: {message}")]
    InvalidRuling { message: String },

    /// The worker pool for batch reconstruction could not be started.
    #[error("thread pool: {message}")]
    ThreadPool { message: String },
}

impl LatticeError {
    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        LatticeError::GeometryInconsistency {
            reason: reason.into(),
        }
    }

    pub(crate) fn settings(message: impl Into<String>) -> Self {
        LatticeError::InvalidSettings {
            message: message.into(),
        }
    }

    pub(crate) fn ruling(message: impl Into<String>) -> Self {
        LatticeError::InvalidRuling {
            message: message.into(),
        }
    }

    /// True for the error kind that excludes a single region from batch output.
    pub fn is_geometry_inconsistency(&self) -> bool {
        matches!(self, LatticeError::GeometryInconsistency { .. })
    }
}

pub type Result<T> = std::result::Result<T, LatticeError>;
