use serde::{Deserialize, Serialize};

/// Represents the intrinsic parameters of a pinhole camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length in x direction
    pub fx: f32,
    /// Focal length in y direction
    pub fy: f32,
    /// Principal point x coordinate
    pub cx: f32,
    /// Principal point y coordinate
    pub cy: f32,
}

impl CameraIntrinsics {
    /// Create camera intrinsics from focal lengths and principal point.
    pub fn new(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// A rough default for an uncalibrated camera: focal length equal to
    /// the frame width, principal point at the frame center.
    pub fn default_for(width: usize, height: usize) -> Self {
        let f = width as f32;
        Self {
            fx: f,
            fy: f,
            cx: width as f32 / 2.0,
            cy: height as f32 / 2.0,
        }
    }

    /// Convert to a row-major 3x3 intrinsics matrix.
    pub fn to_matrix(&self) -> [[f32; 3]; 3] {
        [
            [self.fx, 0.0, self.cx],
            [0.0, self.fy, self.cy],
            [0.0, 0.0, 1.0],
        ]
    }
}

/// Polynomial lens distortion in the Brown-Conrady model, with the
/// coefficients laid out as (k1, k2, p1, p2, k3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PolynomialDistortion {
    /// First radial distortion coefficient
    pub k1: f32,
    /// Second radial distortion coefficient
    pub k2: f32,
    /// First tangential distortion coefficient
    pub p1: f32,
    /// Second tangential distortion coefficient
    pub p2: f32,
    /// Third radial distortion coefficient
    pub k3: f32,
}

impl PolynomialDistortion {
    /// Create distortion parameters with only the first two radial coefficients.
    pub fn radial(k1: f32, k2: f32) -> Self {
        Self {
            k1,
            k2,
            ..Default::default()
        }
    }

    /// Check if there is any distortion.
    pub fn has_distortion(&self) -> bool {
        self.k1 != 0.0 || self.k2 != 0.0 || self.k3 != 0.0 || self.p1 != 0.0 || self.p2 != 0.0
    }

    /// Apply the distortion to a normalized image coordinate.
    pub fn distort_normalized(&self, x: f32, y: f32) -> (f32, f32) {
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;

        let radial = 1.0 + self.k1 * r2 + self.k2 * r4 + self.k3 * r6;

        let xd = x * radial + 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
        let yd = y * radial + self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;

        (xd, yd)
    }
}

/// A complete camera model with intrinsics and optional distortion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraCalibration {
    /// Camera intrinsics
    pub intrinsics: CameraIntrinsics,
    /// Distortion parameters (None for an ideal pinhole camera)
    #[serde(default)]
    pub distortion: Option<PolynomialDistortion>,
}

impl CameraCalibration {
    /// Create a camera model without distortion.
    pub fn pinhole(intrinsics: CameraIntrinsics) -> Self {
        Self {
            intrinsics,
            distortion: None,
        }
    }

    /// Create a camera model with distortion.
    pub fn with_distortion(intrinsics: CameraIntrinsics, distortion: PolynomialDistortion) -> Self {
        Self {
            intrinsics,
            distortion: Some(distortion),
        }
    }

    /// Check if the camera has distortion.
    pub fn has_distortion(&self) -> bool {
        self.distortion.as_ref().is_some_and(|d| d.has_distortion())
    }

    /// Map a pixel coordinate to an undistorted normalized coordinate.
    ///
    /// The Brown-Conrady model is inverted iteratively; convergence for
    /// realistic coefficients takes a handful of iterations.
    pub fn undistort_pixel(&self, u: f32, v: f32) -> (f32, f32) {
        let x = (u - self.intrinsics.cx) / self.intrinsics.fx;
        let y = (v - self.intrinsics.cy) / self.intrinsics.fy;

        let Some(distortion) = &self.distortion else {
            return (x, y);
        };
        if !distortion.has_distortion() {
            return (x, y);
        }

        const MAX_ITERATIONS: usize = 10;
        const EPSILON: f32 = 1e-6;

        let mut xu = x;
        let mut yu = y;

        for _ in 0..MAX_ITERATIONS {
            let (xd, yd) = distortion.distort_normalized(xu, yu);
            let dx = x - xd;
            let dy = y - yd;

            xu += dx;
            yu += dy;

            if dx.abs() < EPSILON && dy.abs() < EPSILON {
                break;
            }
        }

        (xu, yu)
    }

    /// Map a normalized camera coordinate to a pixel, applying distortion.
    pub fn normalized_to_pixel(&self, x: f32, y: f32) -> (f32, f32) {
        let (xd, yd) = match &self.distortion {
            Some(distortion) => distortion.distort_normalized(x, y),
            None => (x, y),
        };

        (
            self.intrinsics.fx * xd + self.intrinsics.cx,
            self.intrinsics.fy * yd + self.intrinsics.cy,
        )
    }
}
