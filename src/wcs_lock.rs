//! Module for locking the view to the astrometric orientation of the image.
//!
//! While locked, the view shows North up and East left, and user rotations are measured from
//! North. The engine keeps that rotation separately from the screen rotation of the transform,
//! since the two are related through the alignment of the image.

use crate::angle::{ScreenAngle, SkyAngle};
use crate::error::ViewerError;
use crate::transform_state::{Axis, TransformState};
use crate::wcs::WcsAlignment;

/// The result of a lock request
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LockChange {
    Locked,
    Unlocked,
}

/// Lock state machine for one image
#[derive(Clone, Copy, Default, Debug)]
pub struct WcsLock {
    /// Alignment of the current image
    /// `None` if the image has no usable astrometric solution
    alignment: Option<WcsAlignment>,
    /// Rotation from North requested while locked
    relative_rotation: SkyAngle,
}

impl WcsLock {
    pub fn new(alignment: Option<WcsAlignment>) -> Self {
        Self {
            alignment,
            relative_rotation: SkyAngle::ZERO,
        }
    }

    pub fn alignment(&self) -> Option<&WcsAlignment> {
        self.alignment.as_ref()
    }

    /// Whether the view can be locked
    pub fn is_available(&self) -> bool {
        self.alignment.is_some()
    }

    /// The rotation from North requested while locked
    /// `None` if the view is not locked
    pub fn relative_rotation(&self, state: &TransformState) -> Option<SkyAngle> {
        state.is_wcs_locked().then_some(self.relative_rotation)
    }

    /// The astronomical rotation currently displayed
    /// While locked this is measured from North
    pub fn sky_rotation(&self, state: &TransformState) -> SkyAngle {
        if state.is_wcs_locked() {
            self.relative_rotation
        } else {
            state.rotation().to_sky(state.flip_horizontal())
        }
    }

    /// Toggle the flip on an axis
    ///
    /// A horizontal flip keeps the astronomical angle the user sees, so only the parity changes
    /// Refused while locked
    ///
    pub fn toggle_flip(&self, state: &mut TransformState, axis: Axis) -> Result<(), ViewerError> {
        if state.is_wcs_locked() {
            log::warn!("Cannot flip the image while the orientation is locked");
            return Err(ViewerError::OrientationLocked);
        }

        match axis {
            Axis::Horizontal => {
                let sky = self.sky_rotation(state);
                let flip = !state.flip_horizontal();

                state.set_flip(Axis::Horizontal, flip);
                state.set_rotation(sky.to_screen(flip));
            }
            Axis::Vertical => {
                state.set_flip(Axis::Vertical, !state.flip_vertical());
            }
        }

        Ok(())
    }

    /// Lock the view to the alignment, or unlock it if already locked
    ///
    /// Scale and pan are kept either way
    /// Fails with `LockUnavailable` if there is no alignment to lock to, leaving `state` unchanged
    ///
    pub fn lock(&mut self, state: &mut TransformState) -> Result<LockChange, ViewerError> {
        if state.is_wcs_locked() {
            self.unlock(state);
            return Ok(LockChange::Unlocked);
        }

        let alignment = self.alignment.ok_or(ViewerError::LockUnavailable)?;

        self.relative_rotation = SkyAngle::ZERO;

        let rotation = alignment.rotation.to_screen(alignment.flip_horizontal);
        state.apply_locked(rotation, alignment.flip_horizontal);

        log::debug!(
            "WCS locked: rotation {} with{} horizontal flip",
            rotation,
            if alignment.flip_horizontal { "" } else { "out" }
        );

        Ok(LockChange::Locked)
    }

    /// Leave the locked state, dropping the orientation
    pub fn unlock(&mut self, state: &mut TransformState) {
        self.relative_rotation = SkyAngle::ZERO;
        state.unlock();

        log::debug!("WCS unlocked");
    }

    /// Set the astronomical rotation
    ///
    /// While locked the rotation is measured from North and the view stays locked
    /// Otherwise it is converted directly to a screen rotation, which clears the lock
    ///
    pub fn set_rotation_from_north(&mut self, state: &mut TransformState, rotation: SkyAngle) {
        let alignment = match self.alignment {
            Some(alignment) if state.is_wcs_locked() => alignment,
            _ => {
                state.set_rotation(rotation.to_screen(state.flip_horizontal()));
                return;
            }
        };

        self.relative_rotation = rotation;

        let north = alignment.rotation.degrees();
        let internal = if state.flip_horizontal() {
            ScreenAngle::new(north + rotation.degrees())
        } else {
            SkyAngle::new(north - rotation.degrees()).to_screen(false)
        };

        state.set_locked_rotation(internal);

        log::debug!("WCS rotation: {} from North, internal {}", rotation, internal);
    }

    /// Replace the alignment when a new image is loaded
    /// A locked view is unlocked, since its orientation belonged to the previous image
    pub fn replace_alignment(&mut self, state: &mut TransformState, alignment: Option<WcsAlignment>) {
        if state.is_wcs_locked() {
            self.unlock(state);
        }

        *self = Self::new(alignment);
    }
}
