//! Error types for the carousel engine and its collaborators.

use thiserror::Error;

/// The structural rule a rejected [`CarouselConfig`](crate::config::CarouselConfig) broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigViolation {
    #[error("angle_step must be a positive, finite number of degrees")]
    AngleStep,
    #[error("max_visible must be at least 1")]
    MaxVisible,
    #[error("min_angle must be strictly less than max_angle")]
    AngleRange,
    #[error("min_angle and max_angle must be finite")]
    NonFiniteAngle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CarouselError {
    #[error("catalog must contain at least one album")]
    InvalidCatalog,
    #[error("invalid carousel configuration: {0}")]
    InvalidConfiguration(#[from] ConfigViolation),
}

pub type Result<T> = std::result::Result<T, CarouselError>;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to locate state directory: {0}")]
    StateDir(std::io::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
