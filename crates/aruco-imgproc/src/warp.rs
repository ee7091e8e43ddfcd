use crate::interpolation::bilinear_sample;
use aruco_image::{Image, ImageError};
use rayon::prelude::*;

#[rustfmt::skip]
fn determinant3x3(m: &[f32; 9]) -> f32 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) -
    m[1] * (m[3] * m[8] - m[5] * m[6]) +
    m[2] * (m[3] * m[7] - m[4] * m[6])
}

#[rustfmt::skip]
fn adjugate3x3(m: &[f32; 9]) -> [f32; 9] {
    [
        m[4] * m[8] - m[5] * m[7],  // [0, 0]
        m[2] * m[7] - m[1] * m[8],  // [0, 1]
        m[1] * m[5] - m[2] * m[4],  // [0, 2]
        m[5] * m[6] - m[3] * m[8],  // [1, 0]
        m[0] * m[8] - m[2] * m[6],  // [1, 1]
        m[2] * m[3] - m[0] * m[5],  // [1, 2]
        m[3] * m[7] - m[4] * m[6],  // [2, 0]
        m[1] * m[6] - m[0] * m[7],  // [2, 1]
        m[0] * m[4] - m[1] * m[3],  // [2, 2]
    ]
}

/// Invert a 3x3 perspective matrix stored in row-major order.
pub fn inverse_perspective_matrix(m: &[f32; 9]) -> Result<[f32; 9], ImageError> {
    let det = determinant3x3(m);

    if det == 0.0 {
        return Err(ImageError::CannotComputeDeterminant);
    }

    let adj = adjugate3x3(m);
    let inv_det = 1.0 / det;

    let mut inv_m = [0.0; 9];
    for i in 0..9 {
        inv_m[i] = adj[i] * inv_det;
    }

    Ok(inv_m)
}

/// Apply a 3x3 perspective matrix to a 2d point.
pub fn transform_point(x: f32, y: f32, m: &[f32; 9]) -> (f32, f32) {
    let w = m[6] * x + m[7] * y + m[8];
    let x_out = (m[0] * x + m[1] * y + m[2]) / w;
    let y_out = (m[3] * x + m[4] * y + m[5]) / w;
    (x_out, y_out)
}

/// Applies a perspective transformation to an image.
///
/// Destination pixels are inverse-mapped into the source and sampled
/// bilinearly; pixels that map outside the source are left untouched.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image, pre-allocated at the target size.
/// * `m` - The 3x3 row-major perspective matrix mapping src -> dst.
pub fn warp_perspective<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    m: &[f32; 9],
) -> Result<(), ImageError> {
    let inv_m = inverse_perspective_matrix(m)?;

    let (src_cols, src_rows) = (src.cols() as f32, src.rows() as f32);
    let dst_cols = dst.cols();

    dst.as_slice_mut()
        .par_chunks_exact_mut(C * dst_cols)
        .enumerate()
        .for_each(|(y, dst_row)| {
            dst_row
                .chunks_exact_mut(C)
                .enumerate()
                .for_each(|(x, dst_pixel)| {
                    let (xs, ys) = transform_point(x as f32, y as f32, &inv_m);

                    if xs >= 0.0 && xs < src_cols && ys >= 0.0 && ys < src_rows {
                        for (k, px) in dst_pixel.iter_mut().enumerate() {
                            *px = bilinear_sample(src, xs, ys, k).round().clamp(0.0, 255.0) as u8;
                        }
                    }
                });
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aruco_image::ImageSize;

    #[test]
    fn inverse_matrix() -> Result<(), ImageError> {
        let m = [1.0, 0.0, -1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
        let expected = [1.0, 0.0, 1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0];
        let inv_m = inverse_perspective_matrix(&m)?;
        assert_eq!(inv_m, expected);
        Ok(())
    }

    #[test]
    fn inverse_matrix_singular() {
        let m = [1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        assert!(inverse_perspective_matrix(&m).is_err());
    }

    #[test]
    fn point_transform() {
        let m = [1.0, 0.0, -1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
        let (x, y) = transform_point(1.0, 1.0, &m);
        assert_eq!((x, y), (0.0, 2.0));
    }

    #[test]
    fn warp_identity() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 3,
            },
            vec![0, 1, 2, 3, 4, 5],
        )?;

        let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let mut warped = Image::<u8, 1>::from_size_val(image.size(), 0)?;

        warp_perspective(&image, &mut warped, &m)?;
        assert_eq!(warped.as_slice(), image.as_slice());

        Ok(())
    }

    #[test]
    fn warp_hflip() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 3,
            },
            vec![0, 1, 2, 3, 4, 5],
        )?;

        // flip matrix around the vertical axis
        let m = [-1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let mut warped = Image::<u8, 1>::from_size_val(image.size(), 0)?;

        warp_perspective(&image, &mut warped, &m)?;
        assert_eq!(warped.as_slice(), &[1, 0, 3, 2, 5, 4]);

        Ok(())
    }
}
