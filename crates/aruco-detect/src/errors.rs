/// Errors that can occur during marker detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// Error related to image containers or operations.
    #[error(transparent)]
    ImageError(#[from] aruco_image::ImageError),

    /// The dictionary contains no marker codes.
    #[error("The marker dictionary contains no codes")]
    EmptyDictionary,

    /// The requested marker id is not part of the dictionary.
    #[error("Marker id {0} is out of range ({1} codes)")]
    InvalidMarkerId(u16, usize),

    /// The rectified patch cell size must be non-zero.
    #[error("The rectified patch cell size must be non-zero")]
    InvalidCellSize,
}
