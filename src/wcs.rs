//! Module for the astrometric solution of an image and the orientation that presents it
//! North up, East left.

use crate::angle::SkyAngle;

use serde::Deserialize;
use std::fmt::Debug;
use thiserror::Error;

/// Linear part of a pixel-to-sky transform, in degrees per pixel
/// `cd[i][j]` is the FITS keyword `CDi_j` (row = world axis, column = pixel axis)
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LinearMatrix {
    pub cd: [[f64; 2]; 2],
}

impl LinearMatrix {
    pub fn from_cd(cd: [[f64; 2]; 2]) -> Self {
        Self { cd }
    }

    /// Build from a unit rotation matrix scaled per world axis
    pub fn from_pc_cdelt(pc: [[f64; 2]; 2], cdelt: [f64; 2]) -> Self {
        Self {
            cd: [
                [pc[0][0] * cdelt[0], pc[0][1] * cdelt[0]],
                [pc[1][0] * cdelt[1], pc[1][1] * cdelt[1]],
            ],
        }
    }

    pub fn determinant(&self) -> f64 {
        let [[a, b], [c, d]] = self.cd;
        a * d - b * c
    }

    /// Whether the matrix describes an invertible, finite transform
    pub fn is_regular(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det != 0.0
    }

    /// The inverse (sky offset to pixel offset)
    /// `None` if the matrix is not regular
    pub fn inverse(&self) -> Option<Self> {
        if !self.is_regular() {
            return None;
        }

        let [[a, b], [c, d]] = self.cd;
        let inv_det = 1.0 / self.determinant();

        Some(Self {
            cd: [[d * inv_det, -b * inv_det], [-c * inv_det, a * inv_det]],
        })
    }

    /// Apply the matrix to a column vector
    pub fn apply(&self, v: [f64; 2]) -> [f64; 2] {
        let [[a, b], [c, d]] = self.cd;
        [a * v[0] + b * v[1], c * v[0] + d * v[1]]
    }
}

/// WCS header keywords describing a linear celestial solution
#[derive(Deserialize, Clone, Debug)]
pub struct WcsKeywords {
    /// Reference pixel (1-indexed)
    pub crpix: [f64; 2],
    /// Sky position of the reference pixel (RA, Dec) in degrees
    pub crval: [f64; 2],
    /// `CDi_j`
    pub cd: Option<[[f64; 2]; 2]>,
    /// `PCi_j`
    pub pc: Option<[[f64; 2]; 2]>,
    /// `CDELTi`
    pub cdelt: Option<[f64; 2]>,
}

impl WcsKeywords {
    /// The linear matrix of the solution
    /// The CD form takes priority, otherwise `PC` scaled by `CDELT` (defaults: identity, 1)
    pub fn linear_matrix(&self) -> LinearMatrix {
        match self.cd {
            Some(cd) => LinearMatrix::from_cd(cd),
            None => LinearMatrix::from_pc_cdelt(
                self.pc.unwrap_or([[1.0, 0.0], [0.0, 1.0]]),
                self.cdelt.unwrap_or([1.0, 1.0]),
            ),
        }
    }
}

/// A position on the celestial sphere in decimal degrees
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SkyPosition {
    pub ra: f64,
    pub dec: f64,
}

impl From<(f64, f64)> for SkyPosition {
    fn from((ra, dec): (f64, f64)) -> Self {
        Self { ra, dec }
    }
}

#[derive(Error, Clone, PartialEq, Debug)]
pub enum ProjectionError {
    #[error("Pixel position ({x}, {y}) is not finite")]
    NonFinitePixel { x: f64, y: f64 },

    #[error("The linear matrix is singular (determinant {0})")]
    Singular(f64),

    #[error("The reference position ({ra}, {dec}) is not a valid sky position")]
    InvalidReference { ra: f64, dec: f64 },

    #[error("The projection produced no sky position for ({x}, {y})")]
    NoSolution { x: f64, y: f64 },
}

/// The capability of mapping image pixels onto the sky
pub trait SkyProjection: Debug {
    /// Whether the projection can be used at all
    fn is_valid(&self) -> bool {
        true
    }

    /// The linear part of the transform, if known
    fn linear_matrix(&self) -> Option<LinearMatrix>;

    /// Map a pixel position (1-indexed DS9/FITS coordinates) to the sky
    fn pixel_to_world(&self, x: f64, y: f64) -> Result<SkyPosition, ProjectionError>;
}

/// The orientation that presents an image North up, East left
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct WcsAlignment {
    /// Counterclockwise rotation bringing North to the top of the screen
    pub rotation: SkyAngle,
    /// Whether a horizontal mirror is needed to put East on the left
    pub flip_horizontal: bool,
}

impl WcsAlignment {
    /// Solve the alignment from a linear pixel-to-sky matrix
    /// `None` if the matrix cannot describe a sky orientation
    pub fn solve(matrix: &LinearMatrix) -> Option<Self> {
        if !matrix.is_regular() {
            log::debug!("No WCS alignment: singular matrix {:?}", matrix.cd);
            return None;
        }

        let det = matrix.determinant();

        // A positive determinant means the pixel grid has the handedness opposite to the sky
        let needs_flip = det > 0.0;

        let [[_, _], [mut cd2_1, cd2_2]] = matrix.cd;
        if needs_flip {
            // A horizontal mirror negates the first pixel column
            cd2_1 = -cd2_1;
        }

        // North is the direction of increasing declination (the second row)
        let north = cd2_1.atan2(cd2_2);
        let rotation = SkyAngle::new(north.to_degrees());

        log::debug!(
            "WCS alignment: determinant {:e}, flip {}, north at {}",
            det,
            needs_flip,
            rotation
        );

        Some(Self {
            rotation,
            flip_horizontal: needs_flip,
        })
    }

    /// Solve the alignment of an image's projection
    /// `None` if the projection is absent, invalid or has no usable matrix
    pub fn from_projection(projection: Option<&dyn SkyProjection>) -> Option<Self> {
        let projection = projection.filter(|p| p.is_valid())?;

        Self::solve(&projection.linear_matrix()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identity_matrix_needs_flip() {
        let alignment = WcsAlignment::solve(&LinearMatrix::from_cd([[1.0, 0.0], [0.0, 1.0]])).unwrap();

        assert!(alignment.flip_horizontal);
        assert_eq!(alignment.rotation.degrees(), 0.0);
    }

    #[test]
    fn standard_parity_needs_no_flip() {
        let alignment = WcsAlignment::solve(&LinearMatrix::from_cd([[-1.0, 0.0], [0.0, 1.0]])).unwrap();

        assert!(!alignment.flip_horizontal);
        assert_eq!(alignment.rotation.degrees(), 0.0);
    }

    #[test]
    fn rotated_solution() {
        // North tilted 30° counterclockwise from the pixel y axis, standard parity
        let a = 30f64.to_radians();
        let (s, c) = a.sin_cos();
        let scale = 1.0 / 3600.0;
        let matrix = LinearMatrix::from_cd([[-c * scale, s * scale], [s * scale, c * scale]]);

        let alignment = WcsAlignment::solve(&matrix).unwrap();
        assert!(!alignment.flip_horizontal);
        assert_abs_diff_eq!(alignment.rotation.degrees(), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn negative_angles_wrap() {
        let a = (-45f64).to_radians();
        let (s, c) = a.sin_cos();
        let matrix = LinearMatrix::from_cd([[-c, s], [s, c]]);

        let alignment = WcsAlignment::solve(&matrix).unwrap();
        assert_abs_diff_eq!(alignment.rotation.degrees(), 315.0, epsilon = 1e-9);
    }

    #[test]
    fn singular_matrix_has_no_alignment() {
        assert!(WcsAlignment::solve(&LinearMatrix::from_cd([[1.0, 2.0], [2.0, 4.0]])).is_none());
        assert!(WcsAlignment::solve(&LinearMatrix::from_cd([[f64::NAN, 0.0], [0.0, 1.0]])).is_none());
    }

    #[test]
    fn absent_projection_has_no_alignment() {
        assert!(WcsAlignment::from_projection(None).is_none());
    }

    #[test]
    fn pc_cdelt_scales_rows() {
        let matrix = LinearMatrix::from_pc_cdelt([[1.0, 0.5], [-0.5, 1.0]], [-2.0, 3.0]);
        assert_eq!(matrix.cd, [[-2.0, -1.0], [-1.5, 3.0]]);
    }

    #[test]
    fn keywords_prefer_cd() {
        let keywords = WcsKeywords {
            crpix: [1.0, 1.0],
            crval: [0.0, 0.0],
            cd: Some([[0.0, -1.0], [1.0, 0.0]]),
            pc: Some([[1.0, 0.0], [0.0, 1.0]]),
            cdelt: Some([5.0, 5.0]),
        };
        assert_eq!(keywords.linear_matrix().cd, [[0.0, -1.0], [1.0, 0.0]]);

        let keywords = WcsKeywords {
            cd: None,
            pc: None,
            cdelt: Some([-0.5, 0.5]),
            ..keywords
        };
        assert_eq!(keywords.linear_matrix().cd, [[-0.5, 0.0], [0.0, 0.5]]);
    }

    #[test]
    fn inverse_round_trips() {
        let matrix = LinearMatrix::from_cd([[0.002, 0.001], [-0.001, 0.002]]);
        let inverse = matrix.inverse().unwrap();
        let v = inverse.apply(matrix.apply([3.0, -4.0]));

        assert_abs_diff_eq!(v[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v[1], -4.0, epsilon = 1e-12);
    }
}
