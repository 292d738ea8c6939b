//! Module for the two rotation conventions used by the viewer
//!
//! The transform is stored as a clockwise rotation on screen (`ScreenAngle`), while the user
//! reads and writes rotations the way astronomers do: counterclockwise, measured from North
//! (`SkyAngle`). A horizontal mirror reverses the handedness linking the two senses, so every
//! conversion takes the mirror flag explicitly.

use std::fmt::{self, Display};

/// Number of angle steps per degree that normalised angles are snapped to
///
/// At this resolution `(360 - θ) mod 360` is an exact involution in `f64`.
const STEPS_PER_DEGREE: f64 = 1e9;

/// Wrap an angle in degrees into `[0, 360)`
/// Non-finite input is passed through unchanged
pub fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return degrees;
    }

    let wrapped = degrees.rem_euclid(360.0);
    let snapped = (wrapped * STEPS_PER_DEGREE).round() / STEPS_PER_DEGREE;

    if snapped >= 360.0 {
        0.0
    } else {
        // Adding zero turns a negative zero positive
        snapped + 0.0
    }
}

/// Clockwise rotation on screen, in degrees within `[0, 360)`
#[derive(Clone, Copy, PartialEq, PartialOrd, Default, Debug)]
pub struct ScreenAngle(f64);

/// Counterclockwise astronomical rotation, in degrees within `[0, 360)`
#[derive(Clone, Copy, PartialEq, PartialOrd, Default, Debug)]
pub struct SkyAngle(f64);

impl ScreenAngle {
    pub const ZERO: Self = Self(0.0);

    pub fn new(degrees: f64) -> Self {
        Self(normalize_degrees(degrees))
    }

    pub fn degrees(self) -> f64 {
        self.0
    }

    pub fn radians(self) -> f64 {
        self.0.to_radians()
    }

    /// The astronomical angle seen on screen
    /// `mirrored`: whether the view is flipped horizontally
    pub fn to_sky(self, mirrored: bool) -> SkyAngle {
        if mirrored {
            SkyAngle::new(self.0)
        } else {
            SkyAngle::new(360.0 - self.0)
        }
    }
}

impl SkyAngle {
    pub const ZERO: Self = Self(0.0);

    pub fn new(degrees: f64) -> Self {
        Self(normalize_degrees(degrees))
    }

    pub fn degrees(self) -> f64 {
        self.0
    }

    pub fn radians(self) -> f64 {
        self.0.to_radians()
    }

    /// The screen rotation that displays this astronomical angle
    /// `mirrored`: whether the view is flipped horizontally
    pub fn to_screen(self, mirrored: bool) -> ScreenAngle {
        if mirrored {
            ScreenAngle::new(self.0)
        } else {
            ScreenAngle::new(360.0 - self.0)
        }
    }
}

impl Display for ScreenAngle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.2}° cw", self.0)
    }
}

impl Display for SkyAngle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.2}° ccw", self.0)
    }
}
