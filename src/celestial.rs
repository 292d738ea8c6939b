//! Module for resolving image positions to celestial coordinates and formatting them.
//!
//! Right ascension is shown in hours (`HH:MM:SS.ss`, unsigned) and declination in degrees
//! (`±DD:MM:SS.ss`, always signed).

use crate::geometry::Point;
use crate::wcs::SkyProjection;

/// Celestial coordinates of an image position
#[derive(Clone, PartialEq, Debug)]
pub struct CelestialCoordinates {
    /// Right ascension in decimal degrees
    pub ra: f64,
    /// Declination in decimal degrees
    pub dec: f64,
    pub ra_sexagesimal: String,
    pub dec_sexagesimal: String,
}

impl CelestialCoordinates {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self {
            ra,
            dec,
            ra_sexagesimal: format_ra(ra),
            dec_sexagesimal: format_dec(dec),
        }
    }

    /// Decimal right ascension to 6 places
    pub fn ra_decimal(&self) -> String {
        format!("{:.6}", self.ra)
    }

    /// Decimal declination to 6 places
    pub fn dec_decimal(&self) -> String {
        format!("{:.6}", self.dec)
    }
}

/// Resolve the sky position of a point in DS9 coordinates
///
/// `None` when there is no projection, the point is out of bounds, or the projection fails
///
pub fn resolve(
    image: Point,
    in_bounds: bool,
    projection: Option<&dyn SkyProjection>,
) -> Option<CelestialCoordinates> {
    if !in_bounds {
        return None;
    }
    let projection = projection.filter(|p| p.is_valid())?;

    match projection.pixel_to_world(image.x, image.y) {
        Ok(sky) if sky.ra.is_finite() && sky.dec.is_finite() => {
            Some(CelestialCoordinates::new(sky.ra, sky.dec))
        }
        Ok(sky) => {
            log::warn!("Projection returned a non-finite position: {:?}", sky);
            None
        }
        Err(e) => {
            log::warn!("Failed to resolve celestial coordinates: {}", e);
            None
        }
    }
}

/// Format a right ascension (degrees) as `HH:MM:SS.ss`
pub fn format_ra(ra: f64) -> String {
    let hours = ra.rem_euclid(360.0) / 15.0;
    let (h, m, s) = split_sexagesimal(hours);

    // Rounding can carry all the way to 24h
    format!("{:02}:{:02}:{:05.2}", h % 24, m, s)
}

/// Format a declination (degrees) as `±DD:MM:SS.ss`
pub fn format_dec(dec: f64) -> String {
    let sign = if dec < 0.0 { '-' } else { '+' };
    let (d, m, s) = split_sexagesimal(dec.abs());

    format!("{}{:02}:{:02}:{:05.2}", sign, d, m, s)
}

/// Split a non-negative value into whole units, minutes and seconds
/// Seconds are rounded to hundredths first so carries propagate
fn split_sexagesimal(value: f64) -> (u64, u64, f64) {
    let centiseconds = (value * 360_000.0).round() as u64;

    let units = centiseconds / 360_000;
    let minutes = centiseconds % 360_000 / 6_000;
    let seconds = (centiseconds % 6_000) as f64 / 100.0;

    (units, minutes, seconds)
}
