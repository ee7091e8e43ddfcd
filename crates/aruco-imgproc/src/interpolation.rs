use aruco_image::Image;

/// Bilinearly interpolate a channel of a u8 image at a fractional coordinate.
///
/// The coordinate must satisfy `0 <= x < width` and `0 <= y < height`;
/// samples past the last row or column clamp to it.
pub fn bilinear_sample<const C: usize>(src: &Image<u8, C>, x: f32, y: f32, ch: usize) -> f32 {
    let (width, height) = (src.cols(), src.rows());

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let data = src.as_slice();
    let at = |xi: usize, yi: usize| data[(yi * width + xi) * C + ch] as f32;

    let top = at(x0, y0) * (1.0 - fx) + at(x1, y0) * fx;
    let bottom = at(x0, y1) * (1.0 - fx) + at(x1, y1) * fx;

    top * (1.0 - fy) + bottom * fy
}
