use aruco_detect::Detection;
use aruco_image::Image;
use aruco_imgproc::draw::{draw_circle, draw_line, draw_polygon};
use aruco_pose::{project_points, CameraCalibration, MarkerPose};

use crate::shape::Shape;
use crate::wireframe::Wireframe;

/// Colors and stroke settings for the marker overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Color of the marker border polygon.
    pub border_color: [u8; 3],
    /// Color of the reference corner mark.
    pub corner_color: [u8; 3],
    /// Color of the projected wireframe.
    pub wire_color: [u8; 3],
    /// Stroke thickness in pixels.
    pub thickness: usize,
    /// Radius of the reference corner mark.
    pub corner_radius: i64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            border_color: [0, 255, 0],
            corner_color: [255, 0, 0],
            wire_color: [255, 255, 0],
            thickness: 2,
            corner_radius: 8,
        }
    }
}

/// Draws a detected marker and its shape onto an RGB frame.
///
/// The marker border and reference corner are drawn from the detection;
/// the shape wireframe is projected through the pose. Edges with an
/// endpoint behind the camera are skipped, off-frame segments clip in the
/// drawing layer.
pub fn draw_overlay(
    frame: &mut Image<u8, 3>,
    detection: &Detection,
    pose: &MarkerPose,
    camera: &CameraCalibration,
    shape: Shape,
    side_length: f32,
    style: &OverlayStyle,
) {
    let border: Vec<(i64, i64)> = detection
        .corners
        .iter()
        .map(|c| (c.x.round() as i64, c.y.round() as i64))
        .collect();
    draw_polygon(frame, &border, style.border_color, style.thickness);

    let reference = detection.oriented_corners()[0];
    draw_circle(
        frame,
        (reference.x.round() as i64, reference.y.round() as i64),
        style.corner_radius,
        style.corner_color,
    );

    let wireframe = Wireframe::for_shape(shape, side_length);
    let projected = project_points(&wireframe.vertices, pose, camera);

    for [a, b] in &wireframe.edges {
        let (Some(pa), Some(pb)) = (projected[*a], projected[*b]) else {
            continue;
        };
        draw_line(
            frame,
            (pa.x.round() as i64, pa.y.round() as i64),
            (pb.x.round() as i64, pb.y.round() as i64),
            style.wire_color,
            style.thickness,
        );
    }
}
