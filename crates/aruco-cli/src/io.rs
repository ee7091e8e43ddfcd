use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use aruco_ar::image::{Image, ImageSize};
use png::{BitDepth, ColorType, Decoder, Encoder};

/// An error type for frame file I/O.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Error to open or create the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] aruco_ar::image::ImageError),

    /// Error to decode the PNG image.
    #[error("Failed to decode the png image. {0}")]
    PngDecodeError(String),

    /// Error to encode the PNG image.
    #[error("Failed to encode the png image. {0}")]
    PngEncodeError(String),

    /// The PNG layout is not supported.
    #[error("Unsupported png layout {0:?} at {1:?} bit depth")]
    UnsupportedPngLayout(ColorType, BitDepth),
}

/// Read a PNG frame as an RGB8 image.
///
/// Grayscale input is replicated to three channels and an alpha channel is
/// dropped; other layouts are rejected.
pub fn read_image_png_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let file = File::open(file_path)?;
    let mut reader = Decoder::new(file)
        .read_info()
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;
    buf.truncate(info.buffer_size());

    if info.bit_depth != BitDepth::Eight {
        return Err(IoError::UnsupportedPngLayout(
            info.color_type,
            info.bit_depth,
        ));
    }

    let size = ImageSize {
        width: info.width as usize,
        height: info.height as usize,
    };

    let rgb = match info.color_type {
        ColorType::Rgb => buf,
        ColorType::Grayscale => {
            let mut rgb = Vec::with_capacity(buf.len() * 3);
            for px in buf {
                rgb.extend_from_slice(&[px, px, px]);
            }
            rgb
        }
        ColorType::Rgba => {
            let mut rgb = Vec::with_capacity(buf.len() / 4 * 3);
            for px in buf.chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
            }
            rgb
        }
        other => {
            return Err(IoError::UnsupportedPngLayout(other, info.bit_depth));
        }
    };

    Ok(Image::new(size, rgb)?)
}

/// Write an RGB8 image to a PNG file.
pub fn write_image_png_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
) -> Result<(), IoError> {
    let file = File::create(file_path)?;
    let writer = BufWriter::new(file);

    let mut encoder = Encoder::new(writer, image.width() as u32, image.height() as u32);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::PngEncodeError(e.to_string()))?;
    writer
        .write_image_data(image.as_slice())
        .map_err(|e| IoError::PngEncodeError(e.to_string()))?;

    Ok(())
}
