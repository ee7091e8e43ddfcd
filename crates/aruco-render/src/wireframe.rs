use glam::Vec3;
use std::f32::consts::TAU;

use crate::shape::Shape;
use aruco_pose::planar::square_object_points;

/// Height of a shape relative to the marker side.
const BODY_HEIGHT: f32 = 1.0;
/// Apex height of the upright pyramid relative to the marker side.
const PYRAMID_APEX_HEIGHT: f32 = 1.44;
/// Apex height of the sideways pyramid relative to the marker side.
const SIDE_APEX_HEIGHT: f32 = 0.48;

/// Wireframe geometry in the marker frame.
///
/// Vertices use the marker coordinate convention: z = 0 is the marker
/// plane and negative z rises toward the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Wireframe {
    /// The model vertices.
    pub vertices: Vec<Vec3>,
    /// Index pairs into `vertices`, one per line segment.
    pub edges: Vec<[usize; 2]>,
}

impl Wireframe {
    /// Builds the wireframe of a shape for a marker of the given side length.
    pub fn for_shape(shape: Shape, side: f32) -> Self {
        match shape {
            Shape::Cube => cube(side),
            Shape::Prism5 => prism5(side),
            Shape::Pyramid => pyramid(side),
            Shape::PyramidInv => pyramid_inv(side),
            Shape::PyramidSide => pyramid_side(side),
        }
    }
}

fn raised(p: Vec3, height: f32) -> Vec3 {
    Vec3::new(p.x, p.y, -height)
}

fn cube(side: f32) -> Wireframe {
    let base = square_object_points(side);
    let height = BODY_HEIGHT * side;

    let mut vertices = base.to_vec();
    vertices.extend(base.iter().map(|p| raised(*p, height)));

    let mut edges = Vec::with_capacity(12);
    for i in 0..4 {
        edges.push([i, (i + 1) % 4]); // base
        edges.push([4 + i, 4 + (i + 1) % 4]); // top
        edges.push([i, 4 + i]); // vertical
    }

    Wireframe { vertices, edges }
}

fn pyramid(side: f32) -> Wireframe {
    let base = square_object_points(side);
    let apex = Vec3::new(0.0, 0.0, -PYRAMID_APEX_HEIGHT * side);

    let mut vertices = base.to_vec();
    vertices.push(apex);

    let mut edges = Vec::with_capacity(8);
    for i in 0..4 {
        edges.push([i, (i + 1) % 4]);
        edges.push([i, 4]);
    }

    Wireframe { vertices, edges }
}

fn pyramid_inv(side: f32) -> Wireframe {
    let base = square_object_points(side);
    let height = BODY_HEIGHT * side;

    let mut vertices: Vec<Vec3> = base.iter().map(|p| raised(*p, height)).collect();
    vertices.push(Vec3::ZERO); // apex resting on the marker center

    let mut edges = Vec::with_capacity(8);
    for i in 0..4 {
        edges.push([i, (i + 1) % 4]);
        edges.push([i, 4]);
    }

    Wireframe { vertices, edges }
}

fn pyramid_side(side: f32) -> Wireframe {
    let base = square_object_points(side);
    let height = BODY_HEIGHT * side;
    let half = side / 2.0;

    // Ridge above the marker's left edge, apex toward the right edge.
    let mut vertices = base.to_vec();
    vertices.push(raised(base[0], height)); // 4: above top-left
    vertices.push(raised(base[3], height)); // 5: above bottom-left
    vertices.push(Vec3::new(half, 0.0, -SIDE_APEX_HEIGHT * side)); // 6: apex

    let edges = vec![
        [0, 1],
        [1, 2],
        [2, 3],
        [3, 0],
        [0, 4],
        [3, 5],
        [4, 5],
        [4, 6],
        [5, 6],
        [1, 6],
        [2, 6],
    ];

    Wireframe { vertices, edges }
}

fn prism5(side: f32) -> Wireframe {
    let radius = side / 2.0;
    let height = BODY_HEIGHT * side;

    // Pentagon inscribed in the marker square, one vertex pointing up.
    let mut vertices = Vec::with_capacity(10);
    for k in 0..5 {
        let angle = -TAU / 4.0 + k as f32 * TAU / 5.0;
        vertices.push(Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0));
    }
    for k in 0..5 {
        let bottom = vertices[k];
        vertices.push(raised(bottom, height));
    }

    let mut edges = Vec::with_capacity(15);
    for i in 0..5 {
        edges.push([i, (i + 1) % 5]);
        edges.push([5 + i, 5 + (i + 1) % 5]);
        edges.push([i, 5 + i]);
    }

    Wireframe { vertices, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cube_counts_and_height() {
        let wf = Wireframe::for_shape(Shape::Cube, 2.0);
        assert_eq!(wf.vertices.len(), 8);
        assert_eq!(wf.edges.len(), 12);

        assert!(wf.vertices[..4].iter().all(|v| v.z == 0.0));
        assert!(wf.vertices[4..].iter().all(|v| v.z == -2.0));
    }

    #[test]
    fn pyramid_apex_above_center() {
        let wf = Wireframe::for_shape(Shape::Pyramid, 1.0);
        assert_eq!(wf.vertices.len(), 5);
        assert_eq!(wf.edges.len(), 8);

        let apex = wf.vertices[4];
        assert_relative_eq!(apex.x, 0.0);
        assert_relative_eq!(apex.y, 0.0);
        assert_relative_eq!(apex.z, -1.44);
    }

    #[test]
    fn inverted_pyramid_rests_on_marker() {
        let wf = Wireframe::for_shape(Shape::PyramidInv, 1.0);
        assert_eq!(wf.vertices[4], Vec3::ZERO);
        assert!(wf.vertices[..4].iter().all(|v| v.z == -1.0));
    }

    #[test]
    fn side_pyramid_ridge() {
        let wf = Wireframe::for_shape(Shape::PyramidSide, 1.0);
        assert_eq!(wf.vertices.len(), 7);
        assert_eq!(wf.edges.len(), 11);
        assert_relative_eq!(wf.vertices[6].z, -0.48);
    }

    #[test]
    fn prism_counts() {
        let wf = Wireframe::for_shape(Shape::Prism5, 1.0);
        assert_eq!(wf.vertices.len(), 10);
        assert_eq!(wf.edges.len(), 15);

        // All pentagon vertices stay within the marker square.
        for v in &wf.vertices {
            assert!(v.x.abs() <= 0.5 + 1e-6);
            assert!(v.y.abs() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn edges_reference_valid_vertices() {
        for shape in Shape::ALL {
            let wf = Wireframe::for_shape(shape, 1.0);
            for [a, b] in &wf.edges {
                assert!(*a < wf.vertices.len());
                assert!(*b < wf.vertices.len());
                assert_ne!(a, b);
            }
        }
    }
}
