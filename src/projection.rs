//! Module for the gnomonic (TAN) sky projection, the usual projection of optical images.

use crate::wcs::{LinearMatrix, ProjectionError, SkyPosition, SkyProjection, WcsKeywords};

/// TAN projection from FITS WCS keywords
#[derive(Clone, Debug)]
pub struct TanProjection {
    /// Reference pixel (1-indexed)
    crpix: [f64; 2],
    /// Sky position of the reference pixel in degrees
    crval: [f64; 2],
    /// Pixel offset to intermediate world coordinates (degrees)
    matrix: LinearMatrix,
}

impl TanProjection {
    pub fn new(crpix: [f64; 2], crval: [f64; 2], matrix: LinearMatrix) -> Result<Self, ProjectionError> {
        if !matrix.is_regular() {
            return Err(ProjectionError::Singular(matrix.determinant()));
        }

        let [ra, dec] = crval;
        if !ra.is_finite() || !dec.is_finite() || dec.abs() > 90.0 {
            return Err(ProjectionError::InvalidReference { ra, dec });
        }

        Ok(Self {
            crpix,
            crval,
            matrix,
        })
    }

    pub fn from_keywords(keywords: &WcsKeywords) -> Result<Self, ProjectionError> {
        Self::new(keywords.crpix, keywords.crval, keywords.linear_matrix())
    }
}

impl SkyProjection for TanProjection {
    fn linear_matrix(&self) -> Option<LinearMatrix> {
        Some(self.matrix)
    }

    fn pixel_to_world(&self, x: f64, y: f64) -> Result<SkyPosition, ProjectionError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinitePixel { x, y });
        }

        // Intermediate world coordinates in degrees
        let [ix, iy] = self
            .matrix
            .apply([x - self.crpix[0], y - self.crpix[1]]);

        // Native spherical coordinates: the reference point is the native pole
        let r = ix.hypot(iy).to_radians();
        let phi = ix.atan2(-iy);
        let theta = 1.0f64.atan2(r);

        // Rotate the native sphere onto the celestial sphere (native longitude of the pole: 180°)
        let ra0 = self.crval[0].to_radians();
        let dec0 = self.crval[1].to_radians();
        let dphi = phi - std::f64::consts::PI;

        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_dec0, cos_dec0) = dec0.sin_cos();
        let (sin_dphi, cos_dphi) = dphi.sin_cos();

        let ra = ra0
            + (-cos_theta * sin_dphi)
                .atan2(sin_theta * cos_dec0 - cos_theta * sin_dec0 * cos_dphi);
        let dec = (sin_theta * sin_dec0 + cos_theta * cos_dec0 * cos_dphi)
            .clamp(-1.0, 1.0)
            .asin();

        let position = SkyPosition {
            ra: ra.to_degrees().rem_euclid(360.0),
            dec: dec.to_degrees(),
        };

        if position.ra.is_finite() && position.dec.is_finite() {
            Ok(position)
        } else {
            Err(ProjectionError::NoSolution { x, y })
        }
    }
}
