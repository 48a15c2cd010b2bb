//! Sparse feature detection, description and matching.
//!
//! The pipeline is FAST corners, BRIEF binary descriptors, brute-force
//! Hamming matching, and RANSAC homography estimation on the resulting
//! correspondences.

pub mod brief;
pub mod fast;
pub mod matcher;
pub mod ransac;

pub use brief::*;
pub use fast::*;
pub use matcher::*;
pub use ransac::*;
