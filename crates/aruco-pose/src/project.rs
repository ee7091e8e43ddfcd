use glam::{Vec2, Vec3};

use crate::camera::CameraCalibration;
use crate::planar::MarkerPose;

const MIN_DEPTH: f32 = 1e-6;

/// Projects marker-frame 3d points into the image.
///
/// Each point is rigidly transformed into the camera frame, perspective
/// divided, distorted and mapped to pixels. Points at or behind the camera
/// plane yield `None`.
pub fn project_points(
    points: &[Vec3],
    pose: &MarkerPose,
    camera: &CameraCalibration,
) -> Vec<Option<Vec2>> {
    points
        .iter()
        .map(|p| {
            let pc = pose.transform_point(*p);
            if pc.z < MIN_DEPTH {
                return None;
            }

            let (u, v) = camera.normalized_to_pixel(pc.x / pc.z, pc.y / pc.z);
            Some(Vec2::new(u, v))
        })
        .collect()
}
