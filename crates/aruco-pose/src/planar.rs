use glam::{Mat3, Vec2, Vec3};

use crate::camera::CameraCalibration;
use crate::errors::PoseError;

/// Pose of a marker relative to the camera.
///
/// The rotation maps marker coordinates to camera coordinates; the marker
/// frame has x to the right, y down and z pointing away from the camera,
/// so geometry raised above the marker plane carries negative z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPose {
    /// Rotation from the marker frame to the camera frame.
    pub rotation: Mat3,
    /// Translation from the marker frame to the camera frame.
    pub translation: Vec3,
}

impl MarkerPose {
    /// Transforms a marker-frame point into the camera frame.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * p + self.translation
    }

    /// Root-mean-square reprojection error of the marker corners, in pixels.
    pub fn reprojection_rmse(
        &self,
        corners: &[Vec2; 4],
        side_length: f32,
        camera: &CameraCalibration,
    ) -> f32 {
        let mut sum_sq = 0.0f32;
        for (object, observed) in square_object_points(side_length).iter().zip(corners.iter()) {
            let pc = self.transform_point(*object);
            let (u, v) = camera.normalized_to_pixel(pc.x / pc.z, pc.y / pc.z);
            sum_sq += (u - observed.x).powi(2) + (v - observed.y).powi(2);
        }
        (sum_sq / 4.0).sqrt()
    }
}

/// The marker corner positions in the marker frame, matching the clockwise
/// image-space corner order: top-left, top-right, bottom-right, bottom-left.
pub fn square_object_points(side_length: f32) -> [Vec3; 4] {
    let h = side_length / 2.0;
    [
        Vec3::new(-h, -h, 0.0),
        Vec3::new(h, -h, 0.0),
        Vec3::new(h, h, 0.0),
        Vec3::new(-h, h, 0.0),
    ]
}

/// Estimates the pose of a square marker from its four image corners.
///
/// The corners must be ordered clockwise in image coordinates starting at
/// the marker's canonical top-left corner (see
/// `Detection::oriented_corners`). Pixels are undistorted and normalized
/// through the camera model, the object-plane homography is fitted, and
/// its columns are scaled and re-orthonormalized into a rotation.
///
/// # Arguments
///
/// * `corners` - The marker corners in pixel coordinates.
/// * `side_length` - The physical marker side length; the translation
///   comes out in the same unit.
/// * `camera` - The camera model used for normalization.
pub fn solve_square_pose(
    corners: &[Vec2; 4],
    side_length: f32,
    camera: &CameraCalibration,
) -> Result<MarkerPose, PoseError> {
    let h = side_length as f64 / 2.0;
    let object: [[f64; 2]; 4] = [[-h, -h], [h, -h], [h, h], [-h, h]];

    let mut normalized = [[0.0f64; 2]; 4];
    for (dst, corner) in normalized.iter_mut().zip(corners.iter()) {
        let (x, y) = camera.undistort_pixel(corner.x, corner.y);
        *dst = [x as f64, y as f64];
    }

    let hmat = homography_4pt(&object, &normalized).ok_or(PoseError::DegenerateCorners)?;

    // Columns of H are [s*r1, s*r2, s*t] up to the projective scale.
    let h1 = Vec3::new(hmat[0] as f32, hmat[3] as f32, hmat[6] as f32);
    let h2 = Vec3::new(hmat[1] as f32, hmat[4] as f32, hmat[7] as f32);
    let h3 = Vec3::new(hmat[2] as f32, hmat[5] as f32, hmat[8] as f32);

    let n1 = h1.length();
    let n2 = h2.length();
    if n1 < f32::EPSILON || n2 < f32::EPSILON {
        return Err(PoseError::DegenerateCorners);
    }

    let scale = 1.0 / (n1 * n2).sqrt();

    let mut r1 = h1 * scale;
    let mut r2 = h2 * scale;
    let mut t = h3 * scale;

    // The homography is only defined up to sign; keep the marker in front
    // of the camera.
    if t.z < 0.0 {
        r1 = -r1;
        r2 = -r2;
        t = -t;
    }
    if t.z < f32::EPSILON {
        return Err(PoseError::NearZeroDepth);
    }

    // Re-orthonormalize [r1 r2] and complete the right-handed basis.
    let a = r1.normalize();
    let b = (r2 - a * a.dot(r2)).normalize();
    let c = a.cross(b);

    let pose = MarkerPose {
        rotation: Mat3::from_cols(a, b, c),
        translation: t,
    };

    // Every corner must project from positive depth.
    for object in square_object_points(side_length) {
        if pose.transform_point(object).z < f32::EPSILON {
            return Err(PoseError::NearZeroDepth);
        }
    }

    Ok(pose)
}

/// Estimates the homography mapping four planar points onto four image
/// points with a direct linear transform, in double precision.
fn homography_4pt(src: &[[f64; 2]; 4], dst: &[[f64; 2]; 4]) -> Option<[f64; 9]> {
    let mut a = [[0.0f64; 9]; 8];
    for i in 0..4 {
        let (x, y) = (src[i][0], src[i][1]);
        let (u, v) = (dst[i][0], dst[i][1]);

        a[2 * i] = [x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y, u];
        a[2 * i + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y, v];
    }

    for col in 0..8 {
        let mut pivot = col;
        for row in (col + 1)..8 {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);

        let div = a[col][col];
        for k in col..9 {
            a[col][k] /= div;
        }
        for row in 0..8 {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..9 {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    Some([
        a[0][8], a[1][8], a[2][8], a[3][8], a[4][8], a[5][8], a[6][8], a[7][8], 1.0,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraIntrinsics;
    use approx::assert_relative_eq;

    fn test_camera() -> CameraCalibration {
        CameraCalibration::pinhole(CameraIntrinsics::new(800.0, 800.0, 320.0, 240.0))
    }

    fn project_corners(
        pose: &MarkerPose,
        side_length: f32,
        camera: &CameraCalibration,
    ) -> [Vec2; 4] {
        let mut out = [Vec2::ZERO; 4];
        for (dst, object) in out.iter_mut().zip(square_object_points(side_length)) {
            let pc = pose.transform_point(object);
            let (u, v) = camera.normalized_to_pixel(pc.x / pc.z, pc.y / pc.z);
            *dst = Vec2::new(u, v);
        }
        out
    }

    #[test]
    fn frontal_pose_recovered() -> Result<(), PoseError> {
        let camera = test_camera();
        let truth = MarkerPose {
            rotation: Mat3::IDENTITY,
            translation: Vec3::new(0.0, 0.0, 4.0),
        };

        let corners = project_corners(&truth, 1.0, &camera);
        let pose = solve_square_pose(&corners, 1.0, &camera)?;

        assert_relative_eq!(pose.translation.z, 4.0, epsilon = 1e-3);
        assert_relative_eq!(pose.translation.x, 0.0, epsilon = 1e-3);
        for col in 0..3 {
            for row in 0..3 {
                assert_relative_eq!(
                    pose.rotation.col(col)[row],
                    Mat3::IDENTITY.col(col)[row],
                    epsilon = 1e-3
                );
            }
        }

        assert!(pose.reprojection_rmse(&corners, 1.0, &camera) < 0.1);

        Ok(())
    }

    #[test]
    fn tilted_pose_recovered() -> Result<(), PoseError> {
        let camera = test_camera();
        let truth = MarkerPose {
            rotation: Mat3::from_rotation_x(0.3),
            translation: Vec3::new(0.2, -0.1, 5.0),
        };

        let corners = project_corners(&truth, 1.0, &camera);
        let pose = solve_square_pose(&corners, 1.0, &camera)?;

        for col in 0..3 {
            for row in 0..3 {
                assert_relative_eq!(
                    pose.rotation.col(col)[row],
                    truth.rotation.col(col)[row],
                    epsilon = 1e-3
                );
            }
        }
        assert_relative_eq!(pose.translation.x, 0.2, epsilon = 1e-3);
        assert_relative_eq!(pose.translation.y, -0.1, epsilon = 1e-3);
        assert_relative_eq!(pose.translation.z, 5.0, epsilon = 1e-3);

        Ok(())
    }

    #[test]
    fn rotation_stays_orthonormal() -> Result<(), PoseError> {
        let camera = test_camera();
        let truth = MarkerPose {
            rotation: Mat3::from_rotation_y(0.4) * Mat3::from_rotation_x(-0.2),
            translation: Vec3::new(-0.3, 0.2, 3.0),
        };

        let corners = project_corners(&truth, 0.5, &camera);
        let pose = solve_square_pose(&corners, 0.5, &camera)?;

        let should_be_identity = pose.rotation * pose.rotation.transpose();
        for col in 0..3 {
            for row in 0..3 {
                assert_relative_eq!(
                    should_be_identity.col(col)[row],
                    Mat3::IDENTITY.col(col)[row],
                    epsilon = 1e-4
                );
            }
        }
        assert_relative_eq!(pose.rotation.determinant(), 1.0, epsilon = 1e-4);

        Ok(())
    }

    #[test]
    fn collinear_corners_rejected() {
        let camera = test_camera();
        let corners = [
            Vec2::new(100.0, 100.0),
            Vec2::new(200.0, 100.0),
            Vec2::new(300.0, 100.0),
            Vec2::new(400.0, 100.0),
        ];
        assert!(solve_square_pose(&corners, 1.0, &camera).is_err());
    }
}
