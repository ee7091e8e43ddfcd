#![deny(missing_docs)]
//! Wireframe shapes and AR overlay drawing for detected markers.
//!
//! Associates each marker id with a 3d shape, projects the shape through
//! the estimated pose and draws it onto the frame together with the marker
//! border.

/// Overlay drawing onto camera frames.
pub mod overlay;

/// The shape catalogue.
pub mod shape;

/// Wireframe geometry for each shape.
pub mod wireframe;

pub use crate::overlay::{draw_overlay, OverlayStyle};
pub use crate::shape::{shape_for_id, Shape};
pub use crate::wireframe::Wireframe;
