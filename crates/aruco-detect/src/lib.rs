#![deny(missing_docs)]
//! Square fiducial marker detection and decoding.
//!
//! The pipeline thresholds a grayscale frame adaptively, follows region
//! borders, filters quadrilateral candidates, rectifies each candidate
//! through its homography and matches the decoded 4x4 bit grid against a
//! fixed dictionary.

use glam::Vec2;

use aruco_image::{Image, ImageSize};
use aruco_imgproc::threshold::adaptive_threshold_mean;

use crate::contours::{find_contours, BorderType};
use crate::decode::read_bit_grid;
use crate::dictionary::GRID_TOTAL;
use crate::quad::{approx_polygon, contour_area, contour_perimeter, is_convex, Quad};

/// Border following and contour hierarchy.
pub mod contours;

/// Rectification and bit grid reading.
pub mod decode;

/// Marker codebooks.
pub mod dictionary;

/// Error types for marker detection.
pub mod errors;

/// Quadrilateral candidate filtering utilities.
pub mod quad;

pub use crate::dictionary::Dictionary;
pub use crate::errors::DetectError;

/// Configuration for the marker detector.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Window side length of the adaptive threshold, in pixels.
    pub adaptive_window: usize,
    /// Constant subtracted from the adaptive threshold neighborhood mean.
    pub adaptive_offset: i16,
    /// Minimum contour area in square pixels for a candidate.
    pub min_area: f32,
    /// Polygon approximation tolerance as a fraction of the perimeter.
    pub approx_epsilon: f32,
    /// Side length of one rectified grid cell, in pixels.
    pub cell_px: usize,
    /// Minimum number of the 20 border cells that must be black.
    pub min_border_black: usize,
    /// Minimum grayscale spread inside a rectified patch.
    pub min_contrast: u8,
    /// Maximum tolerated bit errors when matching the dictionary.
    pub max_hamming: u8,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            adaptive_window: 21,
            adaptive_offset: 7,
            min_area: 500.0,
            approx_epsilon: 0.03,
            cell_px: 10,
            min_border_black: 18,
            min_contrast: 30,
            max_hamming: 0,
        }
    }
}

/// A marker found in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// The dictionary id of the marker.
    pub id: u16,
    /// Number of 90 degree counter-clockwise rotations of the observed
    /// grid relative to the canonical code.
    pub rotation: u8,
    /// Number of corrected bit errors.
    pub hamming: u8,
    /// The four corners in image coordinates, clockwise, starting at the
    /// corner that was rectified to the patch origin.
    pub corners: [Vec2; 4],
    /// The intersection of the marker diagonals.
    pub center: Vec2,
}

impl Detection {
    /// The corners rotated so index 0 is the marker's canonical top-left
    /// corner regardless of how the marker is oriented in the frame.
    pub fn oriented_corners(&self) -> [Vec2; 4] {
        let k = self.rotation as usize;
        [
            self.corners[(4 - k) % 4],
            self.corners[(5 - k) % 4],
            self.corners[(6 - k) % 4],
            self.corners[(7 - k) % 4],
        ]
    }
}

/// Detector for square fiducial markers.
///
/// Owns the dictionary, the configuration and the scratch buffers reused
/// across frames.
pub struct MarkerDetector {
    config: DetectorConfig,
    dictionary: Dictionary,
    bin_img: Image<u8, 1>,
    patch: Image<u8, 1>,
    patch_bin: Image<u8, 1>,
}

impl MarkerDetector {
    /// Creates a detector for frames of the given size, with the standard
    /// dictionary.
    pub fn new(config: DetectorConfig, img_size: ImageSize) -> Result<Self, DetectError> {
        Self::with_dictionary(config, Dictionary::standard(), img_size)
    }

    /// Creates a detector with a custom dictionary.
    pub fn with_dictionary(
        config: DetectorConfig,
        dictionary: Dictionary,
        img_size: ImageSize,
    ) -> Result<Self, DetectError> {
        if config.cell_px == 0 {
            return Err(DetectError::InvalidCellSize);
        }
        if dictionary.is_empty() {
            return Err(DetectError::EmptyDictionary);
        }

        let patch_side = GRID_TOTAL * config.cell_px;
        let patch_size = ImageSize {
            width: patch_side,
            height: patch_side,
        };

        Ok(Self {
            config,
            dictionary,
            bin_img: Image::from_size_val(img_size, 0)?,
            patch: Image::from_size_val(patch_size, 0)?,
            patch_bin: Image::from_size_val(patch_size, 0)?,
        })
    }

    /// Returns a reference to the detector configuration.
    #[inline]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Returns a reference to the dictionary in use.
    #[inline]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Detects markers in a grayscale frame.
    ///
    /// The frame size must match the size the detector was created with.
    pub fn detect(&mut self, gray: &Image<u8, 1>) -> Result<Vec<Detection>, DetectError> {
        adaptive_threshold_mean(
            gray,
            &mut self.bin_img,
            self.config.adaptive_window,
            self.config.adaptive_offset,
        )?;

        let contours = find_contours(&self.bin_img);

        // Markers enclose at least one hole (their interior cells), so an
        // outer border qualifies only when some hole names it as parent.
        let mut has_hole = vec![false; contours.len()];
        for contour in &contours {
            if contour.border_type == BorderType::Hole {
                if let Some(parent) = contour.parent {
                    has_hole[parent] = true;
                }
            }
        }

        let mut detections = Vec::new();

        for (i, contour) in contours.iter().enumerate() {
            if contour.border_type != BorderType::Outer || !has_hole[i] {
                continue;
            }
            if contour.points.len() < 4 {
                continue;
            }
            if contour_area(&contour.points) < self.config.min_area {
                continue;
            }

            let perimeter = contour_perimeter(&contour.points);
            let poly = approx_polygon(&contour.points, self.config.approx_epsilon * perimeter);

            if poly.len() != 4 || !is_convex(&poly) {
                continue;
            }

            let quad = Quad::from_corners([
                poly[0].as_vec2(),
                poly[1].as_vec2(),
                poly[2].as_vec2(),
                poly[3].as_vec2(),
            ]);

            let Some(grid) = read_bit_grid(
                gray,
                &quad,
                &mut self.patch,
                &mut self.patch_bin,
                self.config.min_contrast,
            )?
            else {
                continue;
            };

            if grid.black_border_cells < self.config.min_border_black {
                continue;
            }

            let Some(decoded) = self.dictionary.decode(grid.bits, self.config.max_hamming) else {
                log::debug!(
                    "quad at {:?} decoded to {:#06x}, no dictionary match",
                    quad.center(),
                    grid.bits
                );
                continue;
            };

            detections.push(Detection {
                id: decoded.id,
                rotation: decoded.rotation,
                hamming: decoded.hamming,
                corners: quad.corners,
                center: quad.center(),
            });
        }

        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detector_rejects_bad_config() {
        let size = ImageSize {
            width: 64,
            height: 64,
        };

        assert!(MarkerDetector::new(DetectorConfig::default(), size).is_ok());

        let bad_config = DetectorConfig {
            cell_px: 0,
            ..Default::default()
        };
        assert!(MarkerDetector::new(bad_config, size).is_err());
    }

    #[test]
    fn oriented_corners_rotation() {
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let detection = Detection {
            id: 0,
            rotation: 1,
            hamming: 0,
            corners,
            center: Vec2::new(0.5, 0.5),
        };

        let oriented = detection.oriented_corners();
        assert_eq!(oriented[0], corners[3]);
        assert_eq!(oriented[1], corners[0]);
    }

    #[test]
    fn empty_frame_has_no_detections() -> Result<(), DetectError> {
        let size = ImageSize {
            width: 64,
            height: 64,
        };
        let gray = Image::from_size_val(size, 255u8)?;
        let mut detector = MarkerDetector::new(DetectorConfig::default(), size)?;

        assert!(detector.detect(&gray)?.is_empty());

        Ok(())
    }
}
