/// Errors that can occur during pose estimation.
#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    /// The marker corners do not span a proper quadrilateral.
    #[error("The marker corners are degenerate")]
    DegenerateCorners,

    /// The recovered pose places the marker at zero or negative depth.
    #[error("The recovered pose has near-zero depth")]
    NearZeroDepth,
}
