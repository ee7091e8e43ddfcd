//! Top-level crate re-exporting the aruco-ar stack.

#[doc(inline)]
pub use aruco_image as image;

#[doc(inline)]
pub use aruco_imgproc as imgproc;

#[doc(inline)]
pub use aruco_detect as detect;

#[doc(inline)]
pub use aruco_pose as pose;

#[doc(inline)]
pub use aruco_render as render;
