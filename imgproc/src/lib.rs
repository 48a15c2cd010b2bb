//! Pixel-level image processing kernels.
//!
//! Everything here operates on the `image` crate's buffer types and is
//! total: degenerate inputs (zero-sized images, out-of-range coordinates)
//! produce empty or clamped results instead of errors. Hot loops use
//! rayon for row parallelism and `wide` for SIMD inner kernels.

pub mod color;
pub mod convolve;
pub mod edges;
pub mod geometry;
pub mod morph;
pub mod resize;
pub mod simd;

pub use color::*;
pub use convolve::*;
pub use edges::*;
pub use geometry::*;
pub use morph::*;
pub use resize::*;
