//! Module for the orientation of the displayed image: scale, pan, rotation and flips.
//!
//! Rotation is held in the screen (clockwise) convention. Any orientation change made through
//! the public setters clears the WCS lock; only the lock engine may change the orientation while
//! keeping the view locked.

use crate::angle::ScreenAngle;
use crate::geometry::*;

use enum_map::{Enum, EnumMap};
use std::fmt::{self, Display};

/// Minimum scale factor
pub const MIN_SCALE: f64 = 0.1;
/// Maximum scale factor
pub const MAX_SCALE: f64 = 100.0;

/// An axis of the displayed image
#[derive(Enum, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Axis {
    /// Mirror left/right
    Horizontal,
    /// Mirror top/bottom
    Vertical,
}

/// The view orientation of the current image
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TransformState {
    /// Zoom scale factor (in [MIN_SCALE, MAX_SCALE])
    scale: f64,
    /// Pan translation in screen pixels
    offset: Vector,
    /// Rotation on screen
    rotation: ScreenAngle,
    /// Mirrors applied on each axis
    flips: EnumMap<Axis, bool>,
    /// Whether the orientation is pinned to the astrometric solution
    wcs_locked: bool,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vector::zero(),
            rotation: ScreenAngle::ZERO,
            flips: EnumMap::default(),
            wcs_locked: false,
        }
    }
}

/// Clamp a scale factor into the supported range
pub fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

impl TransformState {
    // === Getters ===

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Vector {
        self.offset
    }

    pub fn rotation(&self) -> ScreenAngle {
        self.rotation
    }

    pub fn flip(&self, axis: Axis) -> bool {
        self.flips[axis]
    }

    pub fn flip_horizontal(&self) -> bool {
        self.flips[Axis::Horizontal]
    }

    pub fn flip_vertical(&self) -> bool {
        self.flips[Axis::Vertical]
    }

    /// Whether the displayed image is mirrored overall
    /// Two flips amount to a half turn, which keeps the handedness
    pub fn is_mirrored(&self) -> bool {
        self.flip_horizontal() != self.flip_vertical()
    }

    pub fn is_wcs_locked(&self) -> bool {
        self.wcs_locked
    }

    // === Scale and pan (never affect the lock) ===

    /// Pre: `scale` is finite and positive
    pub fn set_scale(&mut self, scale: f64) {
        debug_assert!(scale.is_finite() && scale > 0.0);

        self.scale = clamp_scale(scale);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset += Vector::new(dx, dy);
    }

    pub fn set_offset(&mut self, offset: Vector) {
        self.offset = offset;
    }

    // === Orientation (clears the lock) ===

    pub fn set_rotation(&mut self, rotation: ScreenAngle) {
        self.rotation = rotation;
        self.wcs_locked = false;
    }

    /// Set the raw flip flag, keeping the screen rotation
    ///
    /// A horizontal flip made this way mirrors the astronomical angle.
    /// Use `WcsLock::toggle_flip` (or `Viewer::toggle_flip`) to flip while keeping it
    pub fn set_flip(&mut self, axis: Axis, on: bool) {
        self.flips[axis] = on;
        self.wcs_locked = false;
    }

    /// Return to the initial view
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // === Lock engine access ===

    /// Pin the orientation to an astrometric alignment
    pub(crate) fn apply_locked(&mut self, rotation: ScreenAngle, flip_horizontal: bool) {
        self.rotation = rotation;
        self.flips[Axis::Horizontal] = flip_horizontal;
        self.flips[Axis::Vertical] = false;
        self.wcs_locked = true;
    }

    /// Rotate without leaving the locked state
    pub(crate) fn set_locked_rotation(&mut self, rotation: ScreenAngle) {
        debug_assert!(self.wcs_locked);

        self.rotation = rotation;
    }

    /// Drop the orientation, keeping scale and pan
    pub(crate) fn unlock(&mut self) {
        self.rotation = ScreenAngle::ZERO;
        self.flips = EnumMap::default();
        self.wcs_locked = false;
    }
}

impl Display for TransformState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "scale: {:.3}, offset: ({:.2}, {:.2}), rotation: {}, flip: {}{}{}",
            self.scale,
            self.offset.x,
            self.offset.y,
            self.rotation,
            if self.flip_horizontal() { "h" } else { "-" },
            if self.flip_vertical() { "v" } else { "-" },
            if self.wcs_locked { ", wcs locked" } else { "" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked() -> TransformState {
        let mut state = TransformState::default();
        state.apply_locked(ScreenAngle::new(40.0), true);
        state
    }

    #[test]
    fn scale_is_clamped() {
        let mut state = TransformState::default();

        state.set_scale(1000.0);
        assert_eq!(state.scale(), MAX_SCALE);

        state.set_scale(0.01);
        assert_eq!(state.scale(), MIN_SCALE);

        state.set_scale(2.5);
        assert_eq!(state.scale(), 2.5);
    }

    #[test]
    fn orientation_changes_clear_lock() {
        let mut state = locked();
        state.set_rotation(ScreenAngle::new(10.0));
        assert!(!state.is_wcs_locked());

        let mut state = locked();
        state.set_flip(Axis::Vertical, true);
        assert!(!state.is_wcs_locked());

        let mut state = locked();
        state.set_flip(Axis::Horizontal, false);
        assert!(!state.is_wcs_locked());
    }

    #[test]
    fn scale_and_pan_keep_lock() {
        let mut state = locked();
        state.set_scale(3.0);
        state.pan(5.0, -7.0);
        state.set_offset(Vector::new(1.0, 1.0));
        assert!(state.is_wcs_locked());
    }

    #[test]
    fn apply_locked_clears_vertical_flip() {
        let mut state = TransformState::default();
        state.set_flip(Axis::Vertical, true);
        state.apply_locked(ScreenAngle::new(90.0), false);

        assert!(!state.flip_vertical());
        assert!(!state.flip_horizontal());
        assert_eq!(state.rotation(), ScreenAngle::new(90.0));
        assert!(state.is_wcs_locked());
    }

    #[test]
    fn unlock_keeps_scale_and_offset() {
        let mut state = locked();
        state.set_scale(4.2);
        state.pan(13.5, 2.25);

        state.unlock();

        assert_eq!(state.scale(), 4.2);
        assert_eq!(state.offset(), Vector::new(13.5, 2.25));
        assert_eq!(state.rotation(), ScreenAngle::ZERO);
        assert!(!state.flip_horizontal() && !state.flip_vertical());
        assert!(!state.is_wcs_locked());
    }

    #[test]
    fn reset_restores_default() {
        let mut state = locked();
        state.set_scale(7.0);
        state.pan(1.0, 2.0);
        state.reset();
        assert_eq!(state, TransformState::default());
    }

    #[test]
    fn mirrored_follows_parity() {
        let mut state = TransformState::default();
        assert!(!state.is_mirrored());
        state.set_flip(Axis::Horizontal, true);
        assert!(state.is_mirrored());
        state.set_flip(Axis::Vertical, true);
        assert!(!state.is_mirrored());
        state.set_flip(Axis::Horizontal, false);
        assert!(state.is_mirrored());
    }
}
