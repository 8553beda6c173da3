//! Error types for esdf_core operations.
//!
//! Provides a simple error enum with no external dependencies for no_std compatibility.

use core::fmt;

/// Error types that can occur during esdf_core operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EsdfCoreError {
    /// A voxel coordinate is out of bounds for the block dimension.
    VoxelOutOfBounds {
        /// The coordinate component that was out of bounds.
        coord: u32,
        /// The maximum valid value (voxels_per_side - 1).
        max: u32,
    },
    /// The block side length is outside the supported range.
    InvalidDimension {
        /// The rejected side length.
        dim: u32,
    },
    /// The relaxation step is not a positive finite number.
    InvalidStepSize {
        /// The rejected step.
        step: f32,
    },
}

impl fmt::Display for EsdfCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EsdfCoreError::VoxelOutOfBounds { coord, max } => {
                write!(f, "voxel coordinate {} exceeds maximum {}", coord, max)
            }
            EsdfCoreError::InvalidDimension { dim } => {
                write!(
                    f,
                    "voxels per side {} is outside [{}, {}]",
                    dim,
                    crate::MIN_VOXELS_PER_SIDE,
                    crate::MAX_VOXELS_PER_SIDE
                )
            }
            EsdfCoreError::InvalidStepSize { step } => {
                write!(f, "step size {} must be positive and finite", step)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EsdfCoreError {}

/// Check a block side length.
pub fn validate_dimension(dim: u32) -> Result<u32, EsdfCoreError> {
    if (crate::MIN_VOXELS_PER_SIDE..=crate::MAX_VOXELS_PER_SIDE).contains(&dim) {
        Ok(dim)
    } else {
        Err(EsdfCoreError::InvalidDimension { dim })
    }
}

/// Check a relaxation step.
pub fn validate_step(step: f32) -> Result<f32, EsdfCoreError> {
    if step.is_finite() && step > 0.0 {
        Ok(step)
    } else {
        Err(EsdfCoreError::InvalidStepSize { step })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "std")]
    #[test]
    fn test_error_display() {
        use std::format;

        let err = EsdfCoreError::VoxelOutOfBounds { coord: 10, max: 7 };
        assert_eq!(format!("{}", err), "voxel coordinate 10 exceeds maximum 7");

        let err = EsdfCoreError::InvalidDimension { dim: 1 };
        assert_eq!(format!("{}", err), "voxels per side 1 is outside [2, 64]");

        let err = EsdfCoreError::InvalidStepSize { step: -0.5 };
        assert_eq!(
            format!("{}", err),
            "step size -0.5 must be positive and finite"
        );
    }

    #[test]
    fn test_validate_dimension() {
        assert_eq!(validate_dimension(2), Ok(2));
        assert_eq!(validate_dimension(64), Ok(64));
        assert_eq!(
            validate_dimension(0),
            Err(EsdfCoreError::InvalidDimension { dim: 0 })
        );
        assert!(validate_dimension(65).is_err());
    }

    #[test]
    fn test_validate_step() {
        assert_eq!(validate_step(0.05), Ok(0.05));
        assert!(validate_step(0.0).is_err());
        assert!(validate_step(f32::NAN).is_err());
        assert!(validate_step(f32::INFINITY).is_err());
    }
}
