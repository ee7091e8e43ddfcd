use crate::dictionary::{GRID_BITS, GRID_TOTAL};
use crate::errors::DetectError;
use crate::quad::Quad;
use aruco_image::Image;
use aruco_imgproc::{threshold::otsu_threshold, warp::warp_perspective};

/// The bit grid read from a rectified marker candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitGrid {
    /// The inner 4x4 payload, row-major, most significant bit top-left.
    pub bits: u16,
    /// How many of the 20 border cells classified as black.
    pub black_border_cells: usize,
}

/// Rectifies a marker candidate and reads its cell grid.
///
/// The quad interior is warped into `patch` through the candidate's
/// homography, binarized with Otsu's method into `patch_bin`, and averaged
/// per cell. Cell means are taken over the central region of each cell to
/// stay clear of perspective bleed at the cell boundaries.
///
/// Returns `None` when the patch has no usable contrast.
pub fn read_bit_grid(
    gray: &Image<u8, 1>,
    quad: &Quad,
    patch: &mut Image<u8, 1>,
    patch_bin: &mut Image<u8, 1>,
    min_contrast: u8,
) -> Result<Option<BitGrid>, DetectError> {
    let side = patch.width();
    debug_assert_eq!(side % GRID_TOTAL, 0);

    let s = (side - 1) as f32;
    let dst_corners = [[0.0, 0.0], [s, 0.0], [s, s], [0.0, s]];

    let Some(h) = quad.homography_to(&dst_corners) else {
        return Ok(None);
    };

    warp_perspective(gray, patch, &h)?;

    let (mut lo, mut hi) = (u8::MAX, u8::MIN);
    for px in patch.as_slice() {
        lo = lo.min(*px);
        hi = hi.max(*px);
    }
    if hi - lo < min_contrast {
        return Ok(None);
    }

    otsu_threshold(patch, patch_bin)?;

    let cell = side / GRID_TOTAL;
    let margin = cell / 4;

    let mut bits = 0u16;
    let mut black_border_cells = 0usize;

    for r in 0..GRID_TOTAL {
        for c in 0..GRID_TOTAL {
            let mut sum = 0u32;
            let mut count = 0u32;
            for y in (r * cell + margin)..((r + 1) * cell - margin) {
                for x in (c * cell + margin)..((c + 1) * cell - margin) {
                    sum += *patch_bin.get_pixel(x, y, 0)? as u32;
                    count += 1;
                }
            }
            let white = count > 0 && sum / count >= 128;

            let on_border = r == 0 || c == 0 || r == GRID_TOTAL - 1 || c == GRID_TOTAL - 1;
            if on_border {
                if !white {
                    black_border_cells += 1;
                }
            } else if white {
                bits |= 1 << (15 - ((r - 1) * GRID_BITS + (c - 1)));
            }
        }
    }

    Ok(Some(BitGrid {
        bits,
        black_border_cells,
    }))
}
