/// An error type for image construction and access.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    /// Error when the data length does not match the image shape.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images were expected to have the same size.
    #[error("Source size ({0}x{1}) does not match destination size ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a pixel coordinate falls outside the image.
    #[error("Pixel ({0}, {1}) is out of bounds for image {2}x{3}")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when a channel index exceeds the number of channels.
    #[error("Channel index {0} is out of bounds ({1} channels)")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when casting pixel data to another type fails.
    #[error("Failed to cast image data")]
    CastError,

    /// Error when a perspective matrix is not invertible.
    #[error("Cannot compute the determinant of the transform")]
    CannotComputeDeterminant,
}
