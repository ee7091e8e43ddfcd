use num_traits::Zero;
use std::cmp::PartialOrd;

use aruco_image::{Image, ImageError};

use crate::parallel;

/// Apply a binary threshold to an image.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `dst` - The output image of an arbitrary number of channels and type.
/// * `threshold` - The threshold value. Must be the same type as the image.
/// * `max_value` - The value to use when the input value is greater than the threshold.
///
/// # Examples
///
/// ```
/// use aruco_image::{Image, ImageSize};
/// use aruco_imgproc::threshold::threshold_binary;
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_binary(&image, &mut thresholded, 100, 255).unwrap();
/// assert_eq!(thresholded.as_slice(), &[0, 255, 0, 255, 255, 255]);
/// ```
pub fn threshold_binary<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    threshold: T,
    max_value: T,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + PartialOrd + Zero,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = if *src_pixel > threshold {
            max_value
        } else {
            T::zero()
        };
    });

    Ok(())
}

/// Apply an inverse binary threshold to an image.
///
/// Pixels greater than the threshold become zero, all others `max_value`.
pub fn threshold_binary_inverse<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    threshold: T,
    max_value: T,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + PartialOrd + Zero,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = if *src_pixel > threshold {
            T::zero()
        } else {
            max_value
        };
    });

    Ok(())
}

/// Binarize a grayscale image with an automatic threshold level (Otsu's method).
///
/// The level maximizing the between-class variance of the grayscale
/// histogram is selected, pixels above it become 255 and the rest 0.
///
/// # Returns
///
/// The selected threshold level.
pub fn otsu_threshold(src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<u8, ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let mut histogram = [0u32; 256];
    for px in src.as_slice() {
        histogram[*px as usize] += 1;
    }

    let total = (src.cols() * src.rows()) as f64;
    let total_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(v, count)| v as f64 * *count as f64)
        .sum();

    let mut best_level = 0u8;
    let mut best_variance = 0.0f64;
    let mut weight_bg = 0.0f64;
    let mut sum_bg = 0.0f64;

    for level in 0..256usize {
        weight_bg += histogram[level] as f64;
        if weight_bg == 0.0 {
            continue;
        }

        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }

        sum_bg += level as f64 * histogram[level] as f64;

        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (total_sum - sum_bg) / weight_fg;
        let variance = weight_bg * weight_fg * (mean_bg - mean_fg) * (mean_bg - mean_fg);

        if variance > best_variance {
            best_variance = variance;
            best_level = level as u8;
        }
    }

    threshold_binary(src, dst, best_level, 255)?;

    Ok(best_level)
}

/// Apply an adaptive mean threshold with inverted output.
///
/// Each pixel is compared against the mean of its `window`x`window`
/// neighborhood minus `offset`. Pixels at or below the local level become
/// 255 (foreground), the rest 0, so dark structures such as marker borders
/// come out as foreground. The neighborhood mean is computed with a
/// summed-area table, making the cost independent of the window size.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output binary image.
/// * `window` - The neighborhood side length, must be odd and non-zero.
/// * `offset` - Constant subtracted from the neighborhood mean.
pub fn adaptive_threshold_mean(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    window: usize,
    offset: i16,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (width, height) = (src.cols(), src.rows());
    if width == 0 || height == 0 {
        return Ok(());
    }

    let radius = window.max(1) / 2;
    let src_data = src.as_slice();

    // Summed-area table with a zero padded first row/column.
    let stride = width + 1;
    let mut integral = vec![0u64; stride * (height + 1)];
    for y in 0..height {
        let mut row_sum = 0u64;
        for x in 0..width {
            row_sum += src_data[y * width + x] as u64;
            integral[(y + 1) * stride + (x + 1)] = integral[y * stride + (x + 1)] + row_sum;
        }
    }

    let dst_data = dst.as_slice_mut();
    for y in 0..height {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius + 1).min(height);

        for x in 0..width {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius + 1).min(width);

            let area = ((y1 - y0) * (x1 - x0)) as u64;
            let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                - integral[y0 * stride + x1]
                - integral[y1 * stride + x0];
            let mean = (sum / area) as i16;

            let px = src_data[y * width + x] as i16;
            dst_data[y * width + x] = if px > mean - offset { 0 } else { 255 };
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aruco_image::ImageSize;

    #[test]
    fn binary_inverse() -> Result<(), ImageError> {
        let data = vec![100u8, 200, 50, 150, 200, 250];
        let image = Image::<_, 1>::new(
            ImageSize {
                width: 2,
                height: 3,
            },
            data,
        )?;
        let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0)?;

        threshold_binary_inverse(&image, &mut thresholded, 100, 255)?;
        assert_eq!(thresholded.as_slice(), &[255, 0, 255, 0, 0, 0]);

        Ok(())
    }

    #[test]
    fn otsu_bimodal() -> Result<(), ImageError> {
        // Two well separated populations, the split must land between them.
        let mut data = vec![20u8; 32];
        data.extend(vec![220u8; 32]);
        let image = Image::<_, 1>::new(
            ImageSize {
                width: 8,
                height: 8,
            },
            data,
        )?;
        let mut binary = Image::<_, 1>::from_size_val(image.size(), 0)?;

        let level = otsu_threshold(&image, &mut binary)?;
        assert!(level >= 20 && level < 220, "level = {level}");
        assert!(binary.as_slice()[..32].iter().all(|&px| px == 0));
        assert!(binary.as_slice()[32..].iter().all(|&px| px == 255));

        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn adaptive_mean_dark_foreground() -> Result<(), ImageError> {
        // A dark cross on a bright background becomes foreground.
        let data = vec![
            200, 200,  10, 200, 200,
            200, 200,  10, 200, 200,
             10,  10,  10,  10,  10,
            200, 200,  10, 200, 200,
            200, 200,  10, 200, 200,
        ];
        let image = Image::<u8, 1>::new(ImageSize { width: 5, height: 5 }, data)?;
        let mut binary = Image::<u8, 1>::from_size_val(image.size(), 0)?;

        adaptive_threshold_mean(&image, &mut binary, 3, 7)?;

        assert_eq!(*binary.get_pixel(2, 0, 0)?, 255);
        assert_eq!(*binary.get_pixel(0, 2, 0)?, 255);
        assert_eq!(*binary.get_pixel(2, 2, 0)?, 255);
        assert_eq!(*binary.get_pixel(0, 0, 0)?, 0);
        assert_eq!(*binary.get_pixel(4, 4, 0)?, 0);

        Ok(())
    }
}
