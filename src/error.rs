use thiserror::Error;

use crate::types::BoundingBox;

/// Per-eye failure modes of the iris pipeline.
///
/// All of these abort processing of a single eye only. The frame loop keeps
/// running and simply skips that eye's annotations.
#[derive(Error, Debug)]
pub enum TrackError {
    #[error("eye region {bbox:?} has no area after clamping")]
    InvalidRegion { bbox: BoundingBox },

    #[error("iris detector returned {got} iris landmarks, expected {expected}")]
    MalformedLandmarks { expected: usize, got: usize },

    #[error("iris detector failed: {0}")]
    DetectorFailure(#[from] anyhow::Error),

    #[error("cannot fit a circle to an empty point set")]
    EmptyPointSet,
}

pub type Result<T> = std::result::Result<T, TrackError>;
