#![deny(missing_docs)]
//! Image container types shared by the aruco-ar crates.

/// Error types for image operations.
pub mod error;

/// The image container and its accessors.
pub mod image;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
