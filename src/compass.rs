//! Module for the orientation indicator: where the image axes and the celestial axes point on
//! screen.
//!
//! Directions are screen angles, clockwise from the +x axis with y pointing down, so "up" is
//! 270° and "left" is 180°.

use crate::angle::ScreenAngle;
use crate::display_transform::display_transform;
use crate::geometry::*;
use crate::transform_state::TransformState;
use crate::wcs::LinearMatrix;

use std::fmt::{self, Display};

/// Screen directions of the image and sky axes
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Compass {
    /// Direction of increasing pixel x
    pub x: ScreenAngle,
    /// Direction of increasing pixel y (DS9 convention, up in the raw image)
    pub y: ScreenAngle,
    /// Direction of increasing declination
    /// `None` without an astrometric solution
    pub north: Option<ScreenAngle>,
    /// Direction of increasing right ascension
    pub east: Option<ScreenAngle>,
}

impl Compass {
    pub fn compute(state: &TransformState, matrix: Option<&LinearMatrix>) -> Self {
        // Only the linear part of the display transform matters for directions
        let transform = display_transform(state, Rect::zero());
        let direction = |fits: [f64; 2]| {
            // The raw image is stored with y pointing down
            let screen = transform.transform_vector(Vector::new(fits[0], -fits[1]));
            ScreenAngle::new(screen.y.atan2(screen.x).to_degrees())
        };

        // Sky directions in pixel space are the columns of the inverse matrix
        let inverse = matrix.and_then(|m| m.inverse());

        Self {
            x: direction([1.0, 0.0]),
            y: direction([0.0, 1.0]),
            north: inverse.map(|inv| direction(inv.apply([0.0, 1.0]))),
            east: inverse.map(|inv| direction(inv.apply([1.0, 0.0]))),
        }
    }
}

impl Display for Compass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let show = |angle: Option<ScreenAngle>| match angle {
            Some(angle) => format!("{:.2}", angle.degrees()),
            None => "-".to_string(),
        };

        write!(
            f,
            "X: {:.2}  Y: {:.2}  N: {}  E: {}",
            self.x.degrees(),
            self.y.degrees(),
            show(self.north),
            show(self.east),
        )
    }
}
