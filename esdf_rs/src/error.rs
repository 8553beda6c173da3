//! Error types for esdf_rs operations.

use esdf_grid::GridError;
use thiserror::Error;

/// Errors that can occur while setting up or driving a relaxation run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EsdfError {
    /// Grid construction or lookup failed.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Driver parameters were rejected.
    #[error("invalid driver configuration: {message}")]
    InvalidConfig {
        /// What was wrong.
        message: String,
    },
}

/// Result type alias for esdf_rs operations.
pub type Result<T> = core::result::Result<T, EsdfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EsdfError::InvalidConfig {
            message: "max_cycles must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid driver configuration: max_cycles must be at least 1"
        );
    }

    #[test]
    fn test_grid_error_is_transparent() {
        let err: EsdfError = GridError::ZeroCapacity.into();
        assert_eq!(err.to_string(), GridError::ZeroCapacity.to_string());
        assert_eq!(err, EsdfError::Grid(GridError::ZeroCapacity));
    }
}
