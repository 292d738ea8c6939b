//! Errors of the viewer session

use thiserror::Error;

/// A rejected viewer operation
/// The view is left unchanged whenever one of these is returned
#[derive(Error, Clone, Copy, PartialEq, Debug)]
pub enum ViewerError {
    #[error("The image has no astrometric solution to lock to")]
    LockUnavailable,

    #[error("The orientation is locked to the WCS")]
    OrientationLocked,

    #[error("Invalid scale factor: {0}")]
    InvalidScale(f64),

    #[error("Invalid angle: {0}")]
    NonFiniteAngle(f64),
}
