use aruco_image::Image;
use glam::IVec2;
use std::collections::VecDeque;

/// Specification for Border Type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BorderType {
    /// Perimeter of foreground regions.
    Outer,
    /// Perimeter of background regions enclosed by foreground.
    Hole,
}

/// The border of one connected region.
#[derive(Debug, Clone)]
pub struct Contour {
    /// The points on the border, in tracing order.
    pub points: Vec<IVec2>,
    /// The type of the border, outer or hole.
    pub border_type: BorderType,
    /// Index of the enclosing contour, if any.
    pub parent: Option<usize>,
}

impl Contour {
    /// Constructor for contour.
    pub fn new(points: Vec<IVec2>, border_type: BorderType, parent: Option<usize>) -> Self {
        Contour {
            points,
            border_type,
            parent,
        }
    }
}

// Direction offsets in clockwise order: E, SE, S, SW, W, NW, N, NE.
const DIRECTIONS: [IVec2; 8] = [
    IVec2::new(1, 0),
    IVec2::new(1, 1),
    IVec2::new(0, 1),
    IVec2::new(-1, 1),
    IVec2::new(-1, 0),
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
];

fn rotate_to_value(values: &mut VecDeque<IVec2>, value: IVec2) {
    if let Some(rotate_pos) = values.iter().position(|x| *x == value) {
        values.rotate_left(rotate_pos);
    }
}

/// Finds the borders of the foreground regions of a binary image.
///
/// Pixels greater than zero are treated as foreground. Border following is
/// done with the Suzuki-Abe algorithm; each returned contour carries its
/// border type (outer or hole) and a link to its enclosing contour, which
/// together form the region hierarchy.
///
/// # Arguments
///
/// * `src` - A binary single channel image.
///
/// # Returns
///
/// A vector containing all the [`Contour`]s found in the input image.
pub fn find_contours(src: &Image<u8, 1>) -> Vec<Contour> {
    let width = src.width();
    let height = src.height();
    let mut labels = vec![0i32; height * width];
    let mut contours: Vec<Contour> = Vec::new();
    let mut nbd = 1i32; // new-border label

    let at = |x: usize, y: usize| x + y * width;

    for (i, px) in src.as_slice().iter().enumerate() {
        if *px > 0 {
            labels[i] = 1;
        }
    }

    let nonzero_at = |labels: &[i32], p: IVec2| -> Option<IVec2> {
        let in_bounds = p.x > -1 && p.x < width as i32 && p.y > -1 && p.y < height as i32;
        if in_bounds && labels[at(p.x as usize, p.y as usize)] != 0 {
            Some(p)
        } else {
            None
        }
    };

    let mut directions: VecDeque<IVec2> = DIRECTIONS.into_iter().collect();

    for y in 0..height {
        let mut lnbd = 0i32;

        for x in 0..width {
            if labels[at(x, y)] == 0 {
                continue;
            }

            // A border starts where the foreground meets the background,
            // from the left for outer borders and from the right for holes.
            // Negative labels mark already-traced border pixels; they fall
            // through to the lnbd bookkeeping below.
            let maybe_border = if labels[at(x, y)] == 1 && (x == 0 || labels[at(x - 1, y)] == 0) {
                Some((IVec2::new(x as i32 - 1, y as i32), BorderType::Outer))
            } else if labels[at(x, y)] >= 1 && (x + 1 == width || labels[at(x + 1, y)] == 0) {
                if labels[at(x, y)] > 1 {
                    lnbd = labels[at(x, y)];
                }
                Some((IVec2::new(x as i32 + 1, y as i32), BorderType::Hole))
            } else {
                None
            };

            if let Some((adj, border_type)) = maybe_border {
                nbd += 1;

                let parent = if lnbd.abs() >= 2 {
                    let parent_index = (lnbd.abs() - 2) as usize;
                    let parent_contour = &contours[parent_index];
                    if (border_type == BorderType::Outer)
                        ^ (parent_contour.border_type == BorderType::Outer)
                    {
                        Some(parent_index)
                    } else {
                        parent_contour.parent
                    }
                } else {
                    None
                };

                let mut contour_points = Vec::new();
                let curr = IVec2::new(x as i32, y as i32);
                rotate_to_value(&mut directions, adj - curr);

                let first_nonzero = directions
                    .iter()
                    .find_map(|diff| nonzero_at(&labels, curr + *diff));

                if let Some(pos1) = first_nonzero {
                    let mut pos2 = pos1;
                    let mut pos3 = curr;

                    loop {
                        contour_points.push(pos3);

                        rotate_to_value(&mut directions, pos2 - pos3);

                        let Some(pos4) = directions
                            .iter()
                            .rev()
                            .find_map(|diff| nonzero_at(&labels, pos3 + *diff))
                        else {
                            break;
                        };

                        let mut is_right_edge = false;
                        for diff in directions.iter().rev() {
                            if *diff == pos4 - pos3 {
                                break;
                            }
                            if *diff == IVec2::new(1, 0) {
                                is_right_edge = true;
                                break;
                            }
                        }

                        let pos3_at = at(pos3.x as usize, pos3.y as usize);
                        if pos3.x as usize + 1 == width || is_right_edge {
                            labels[pos3_at] = -nbd;
                        } else if labels[pos3_at] == 1 {
                            labels[pos3_at] = nbd;
                        }

                        if pos4 == curr && pos3 == pos1 {
                            break;
                        }
                        pos2 = pos3;
                        pos3 = pos4;
                    }
                } else {
                    // Single pixel region.
                    contour_points.push(curr);
                    labels[at(x, y)] = -nbd;
                }

                if border_type == BorderType::Hole {
                    contour_points.reverse();
                }

                contours.push(Contour::new(contour_points, border_type, parent));
            }

            if labels[at(x, y)] != 1 {
                lnbd = labels[at(x, y)].abs();
            }
        }
    }

    contours
}
