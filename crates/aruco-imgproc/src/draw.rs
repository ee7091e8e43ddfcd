use aruco_image::Image;

/// Helper function to set a pixel's color, handling bounds checking.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Draws a line on an image inplace using Bresenham's line algorithm.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
/// * `thickness` - The thickness of the line. (Note: thickness > 1 is approximate).
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    let half_thickness = thickness as i64 / 2;

    loop {
        if thickness <= 1 {
            set_pixel(img, x0, y0, color);
        } else {
            // Approximate thickness with a filled square centered at the point.
            for i in -half_thickness..=half_thickness {
                for j in -half_thickness..=half_thickness {
                    set_pixel(img, x0 + i, y0 + j, color);
                }
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draws a closed polygon outline on an image inplace.
///
/// Each vertex connects to the next, and the last back to the first.
pub fn draw_polygon<const C: usize>(
    img: &mut Image<u8, C>,
    points: &[(i64, i64)],
    color: [u8; C],
    thickness: usize,
) {
    if points.len() < 2 {
        return;
    }

    for i in 0..points.len() {
        let p0 = points[i];
        let p1 = points[(i + 1) % points.len()];
        draw_line(img, p0, p1, color, thickness);
    }
}

/// Draws a circle outline on an image inplace using the midpoint algorithm.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `center` - The circle center as a tuple of (x, y).
/// * `radius` - The circle radius in pixels.
/// * `color` - The color of the circle as an array of `C` elements.
pub fn draw_circle<const C: usize>(
    img: &mut Image<u8, C>,
    center: (i64, i64),
    radius: i64,
    color: [u8; C],
) {
    if radius <= 0 {
        set_pixel(img, center.0, center.1, color);
        return;
    }

    let (cx, cy) = center;
    let mut x = radius;
    let mut y = 0i64;
    let mut err = 1 - radius;

    while x >= y {
        set_pixel(img, cx + x, cy + y, color);
        set_pixel(img, cx + y, cy + x, color);
        set_pixel(img, cx - y, cy + x, color);
        set_pixel(img, cx - x, cy + y, color);
        set_pixel(img, cx - x, cy - y, color);
        set_pixel(img, cx - y, cy - x, color);
        set_pixel(img, cx + y, cy - x, color);
        set_pixel(img, cx + x, cy - y, color);

        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}
