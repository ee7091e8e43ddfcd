#![deny(missing_docs)]
//! Image processing operations used by the aruco-ar marker pipeline.

/// Color space conversions.
pub mod color;

/// Drawing primitives for overlays.
pub mod draw;

/// Pixel interpolation utilities.
pub mod interpolation;

/// Parallel execution helpers.
pub mod parallel;

/// Thresholding operations.
pub mod threshold;

/// Perspective warping.
pub mod warp;
