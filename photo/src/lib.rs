//! Computational photography built on the feature and imgproc crates.
//!
//! The main entry point is [`Stitcher`], which registers a sequence of
//! overlapping photos with FAST + BRIEF + RANSAC and composites them
//! onto a single canvas.

pub mod stitcher;

pub use stitcher::{Stitcher, StitcherConfig};

/// Errors produced while compositing images.
#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("need at least two images to stitch")]
    NotEnoughImages,

    #[error("not enough matches between adjacent images: found {found}, need {needed}")]
    InsufficientMatches { found: usize, needed: usize },

    #[error("homography estimation failed between adjacent images")]
    EstimationFailed,

    #[error("stitched canvas {width}x{height} exceeds the configured maximum")]
    CanvasTooLarge { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, PhotoError>;
