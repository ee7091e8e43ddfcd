use crate::errors::DetectError;
use aruco_image::{Image, ImageSize};

/// Number of payload cells per marker side.
pub const GRID_BITS: usize = 4;

/// Number of cells per marker side including the border ring.
pub const GRID_TOTAL: usize = GRID_BITS + 2;

/// The standard 10-marker codebook.
///
/// Codes are row-major 16-bit patterns of the 4x4 payload, most significant
/// bit at the top-left cell, 1 = white. Rotated variants are derived at
/// decode time instead of being stored.
pub const STANDARD_CODES: [u16; 10] = [
    0x0F9A, 0xB532, 0xFEDA, 0x332D, 0x9946, 0xCF56, 0x549E, 0x9E2E, 0x79CD, 0xC4F2,
];

/// Rotate a 4x4 bit code by 90 degrees counter-clockwise.
pub fn rotate_code_ccw(code: u16) -> u16 {
    let mut rotated = 0u16;
    for r in 0..GRID_BITS {
        for c in 0..GRID_BITS {
            // rotated(r, c) takes its value from (c, 3 - r)
            let src_bit = 15 - (c * GRID_BITS + (GRID_BITS - 1 - r));
            if code >> src_bit & 1 == 1 {
                rotated |= 1 << (15 - (r * GRID_BITS + c));
            }
        }
    }
    rotated
}

/// A successful dictionary lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedId {
    /// Index of the matched code in the dictionary.
    pub id: u16,
    /// Number of 90 degree counter-clockwise rotations separating the
    /// observed grid from the canonical code.
    pub rotation: u8,
    /// Number of bit errors between the observed and the matched code.
    pub hamming: u8,
}

/// The fixed enumeration of valid 4x4 marker patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    codes: Vec<u16>,
}

impl Dictionary {
    /// Creates a dictionary from a list of canonical codes.
    pub fn new(codes: Vec<u16>) -> Result<Self, DetectError> {
        if codes.is_empty() {
            return Err(DetectError::EmptyDictionary);
        }
        Ok(Self { codes })
    }

    /// The standard 10-marker dictionary.
    pub fn standard() -> Self {
        Self {
            codes: STANDARD_CODES.to_vec(),
        }
    }

    /// Number of markers in the dictionary.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns true if the dictionary has no codes.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Returns the canonical code of a marker id.
    pub fn code(&self, id: u16) -> Option<u16> {
        self.codes.get(id as usize).copied()
    }

    /// Matches an observed bit grid against the dictionary.
    ///
    /// All four rotations of every canonical code are considered; the first
    /// match within `max_hamming` bit errors wins.
    pub fn decode(&self, observed: u16, max_hamming: u8) -> Option<DecodedId> {
        for (id, &canonical) in self.codes.iter().enumerate() {
            let mut candidate = canonical;
            for rotation in 0..4u8 {
                let hamming = (observed ^ candidate).count_ones() as u8;
                if hamming <= max_hamming {
                    return Some(DecodedId {
                        id: id as u16,
                        rotation,
                        hamming,
                    });
                }
                candidate = rotate_code_ccw(candidate);
            }
        }
        None
    }

    /// Renders a marker as a grayscale image, black border ring included.
    ///
    /// The image is `6 * cell_px` pixels on each side; payload cells are
    /// white (255) for 1-bits and black (0) otherwise. A white quiet zone
    /// around the marker is the caller's responsibility.
    pub fn marker_image(&self, id: u16, cell_px: usize) -> Result<Image<u8, 1>, DetectError> {
        let code = self
            .code(id)
            .ok_or(DetectError::InvalidMarkerId(id, self.codes.len()))?;
        if cell_px == 0 {
            return Err(DetectError::InvalidCellSize);
        }

        let side = GRID_TOTAL * cell_px;
        let mut img = Image::from_size_val(
            ImageSize {
                width: side,
                height: side,
            },
            0u8,
        )?;

        for r in 0..GRID_BITS {
            for c in 0..GRID_BITS {
                if code >> (15 - (r * GRID_BITS + c)) & 1 == 0 {
                    continue;
                }
                for y in 0..cell_px {
                    for x in 0..cell_px {
                        img.set_pixel(
                            (c + 1) * cell_px + x,
                            (r + 1) * cell_px + y,
                            0,
                            255,
                        )?;
                    }
                }
            }
        }

        Ok(img)
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_ccw_once() {
        // 0000 1111 1001 1010 rotated counter-clockwise is
        // 0110 0101 0100 0111
        assert_eq!(rotate_code_ccw(0x0F9A), 0x6547);
    }

    #[test]
    fn rotate_four_times_is_identity() {
        for &code in STANDARD_CODES.iter() {
            let mut rotated = code;
            for _ in 0..4 {
                rotated = rotate_code_ccw(rotated);
            }
            assert_eq!(rotated, code);
        }
    }

    #[test]
    fn decode_exact() {
        let dict = Dictionary::standard();
        for (id, &code) in STANDARD_CODES.iter().enumerate() {
            let decoded = dict.decode(code, 0).unwrap();
            assert_eq!(decoded.id, id as u16);
            assert_eq!(decoded.rotation, 0);
            assert_eq!(decoded.hamming, 0);
        }
    }

    #[test]
    fn decode_rotated() {
        let dict = Dictionary::standard();
        let observed = rotate_code_ccw(rotate_code_ccw(STANDARD_CODES[3]));
        let decoded = dict.decode(observed, 0).unwrap();
        assert_eq!(decoded.id, 3);
        assert_eq!(decoded.rotation, 2);
    }

    #[test]
    fn decode_unknown() {
        let dict = Dictionary::standard();
        assert!(dict.decode(0x0000, 0).is_none());
        assert!(dict.decode(0xFFFF, 0).is_none());
    }

    #[test]
    fn codes_unique_over_rotations() {
        // No code may collide with any rotation of another, otherwise ids
        // would be ambiguous.
        let dict = Dictionary::standard();
        for (id, &code) in STANDARD_CODES.iter().enumerate() {
            let decoded = dict.decode(code, 0).unwrap();
            assert_eq!(decoded.id, id as u16, "code {code:#06x} is ambiguous");

            let mut rotated = code;
            for _ in 0..3 {
                rotated = rotate_code_ccw(rotated);
                let decoded = dict.decode(rotated, 0).unwrap();
                assert_eq!(decoded.id, id as u16, "code {code:#06x} is ambiguous");
            }
        }
    }

    #[test]
    fn decode_with_bit_error() {
        let dict = Dictionary::standard();
        let observed = STANDARD_CODES[5] ^ 0x0010;
        assert!(dict.decode(observed, 0).is_none());

        let decoded = dict.decode(observed, 1).unwrap();
        assert_eq!(decoded.id, 5);
        assert_eq!(decoded.hamming, 1);
    }

    #[test]
    fn marker_image_cells() -> Result<(), DetectError> {
        let dict = Dictionary::standard();
        let img = dict.marker_image(0, 4)?;
        assert_eq!(img.size().width, 24);

        // Border ring is black.
        assert_eq!(*img.get_pixel(0, 0, 0)?, 0);
        assert_eq!(*img.get_pixel(23, 23, 0)?, 0);

        // Code 0x0F9A: top payload row is 0000, second row is 1111.
        assert_eq!(*img.get_pixel(4, 4, 0)?, 0);
        assert_eq!(*img.get_pixel(4, 8, 0)?, 255);

        Ok(())
    }

    #[test]
    fn marker_image_bad_id() {
        let dict = Dictionary::standard();
        assert!(dict.marker_image(10, 4).is_err());
    }
}
