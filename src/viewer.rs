//! Module for the viewer session: the owner of the view of one image
//!
//! Every mutation goes through the `Viewer`, which applies it to the current state and then
//! notifies the listeners. Orientation changes that involve the astrometric solution are
//! delegated to the `WcsLock`.

use crate::angle::SkyAngle;
use crate::compass::Compass;
use crate::cursor::CursorSample;
use crate::display_transform;
use crate::error::ViewerError;
use crate::geometry::*;
use crate::image::Image;
use crate::input::{InputEvent, InputHub, InputSubscription};
use crate::levels::{self, DisplayLevels, ImageStats, ScaleMode};
use crate::observer::{ListenerId, Observers};
use crate::transform_state::{clamp_scale, Axis, TransformState};
use crate::wcs::WcsAlignment;
use crate::wcs_lock::{LockChange, WcsLock};

use std::cell::RefCell;
use std::rc::Rc;

/// Default relative change of scale per wheel step
pub const DEFAULT_WHEEL_ZOOM_STEP: f64 = 0.1;

/// Settings of a viewer session
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ViewerSettings {
    /// Size of the viewer surface
    pub viewport: Size,
    /// Relative change of scale per wheel step
    pub wheel_zoom_step: f64,
    /// Intensity curve of newly loaded images
    pub scale_mode: ScaleMode,
    /// Percentiles of the automatic black and white points
    pub low_percentile: f64,
    pub high_percentile: f64,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            viewport: Size::new(800.0, 600.0),
            wheel_zoom_step: DEFAULT_WHEEL_ZOOM_STEP,
            scale_mode: ScaleMode::default(),
            low_percentile: levels::DEFAULT_LOW_PERCENTILE,
            high_percentile: levels::DEFAULT_HIGH_PERCENTILE,
        }
    }
}

/// An active pan gesture
#[derive(Clone, Copy, Debug)]
struct Drag {
    /// Last pointer position seen
    last: Point,
    /// Movement not yet applied to the offset
    pending: Vector,
}

pub struct Viewer {
    settings: ViewerSettings,
    /// Bounds of the viewer surface in screen coordinates
    viewport: Rect,

    image: Option<Image>,
    stats: Option<ImageStats>,
    levels: DisplayLevels,

    state: TransformState,
    lock: WcsLock,

    /// The last cursor sample
    /// `None` if the pointer is not over the viewer or there is no image
    cursor: Option<CursorSample>,
    /// `None` if no drag is in progress
    drag: Option<Drag>,

    transform_observers: Observers<TransformState>,
    cursor_observers: Observers<Option<CursorSample>>,
}

impl Viewer {
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            settings,
            viewport: Rect::from_size(settings.viewport),
            image: None,
            stats: None,
            levels: DisplayLevels {
                mode: settings.scale_mode,
                ..DisplayLevels::default()
            },
            state: TransformState::default(),
            lock: WcsLock::default(),
            cursor: None,
            drag: None,
            transform_observers: Observers::default(),
            cursor_observers: Observers::default(),
        }
    }
}

// === Queries ===

impl Viewer {
    /// A snapshot of the current view orientation
    pub fn state(&self) -> TransformState {
        self.state
    }

    pub fn cursor(&self) -> Option<&CursorSample> {
        self.cursor.as_ref()
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn stats(&self) -> Option<&ImageStats> {
        self.stats.as_ref()
    }

    pub fn levels(&self) -> DisplayLevels {
        self.levels
    }

    pub fn alignment(&self) -> Option<&WcsAlignment> {
        self.lock.alignment()
    }

    /// Whether the view can be locked to the WCS
    pub fn can_lock(&self) -> bool {
        self.lock.is_available()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The astronomical rotation as the user sees it
    /// Measured from North while locked
    pub fn sky_rotation(&self) -> SkyAngle {
        self.lock.sky_rotation(&self.state)
    }

    /// The transform placing the image center in the viewport
    pub fn display_transform(&self) -> Transform {
        display_transform::display_transform(&self.state, self.viewport)
    }

    /// The transform of the raw image, for rendering
    /// `None` without an image
    pub fn image_transform(&self) -> Option<Transform> {
        let image = self.image.as_ref()?;

        Some(display_transform::image_transform(
            &self.state,
            self.viewport,
            image.size(),
        ))
    }

    pub fn compass(&self) -> Compass {
        let matrix = self.image.as_ref().and_then(|image| image.linear_matrix());

        // Sky directions are only meaningful with a usable alignment
        let matrix = matrix.filter(|_| self.can_lock());

        Compass::compute(&self.state, matrix.as_ref())
    }

    /// Sample the image under a screen position without moving the cursor
    pub fn sample_at(&self, screen: Point) -> Option<CursorSample> {
        let image = self.image.as_ref()?;

        Some(CursorSample::at(screen, self.viewport, &self.state, image))
    }

    /// The display intensity of the sample under the cursor
    pub fn cursor_intensity(&self) -> Option<f64> {
        let value = self.cursor.as_ref()?.value?;

        Some(self.levels.normalize(value as f64))
    }
}

// === Orientation ===

impl Viewer {
    /// Set the astronomical rotation in degrees (counterclockwise)
    /// Measured from North while locked
    pub fn set_rotation_from_north(&mut self, degrees: f64) -> Result<(), ViewerError> {
        if !degrees.is_finite() {
            return Err(ViewerError::NonFiniteAngle(degrees));
        }

        self.lock
            .set_rotation_from_north(&mut self.state, SkyAngle::new(degrees));
        self.transform_changed();

        Ok(())
    }

    pub fn toggle_flip(&mut self, axis: Axis) -> Result<(), ViewerError> {
        self.lock.toggle_flip(&mut self.state, axis)?;
        self.transform_changed();

        Ok(())
    }

    /// Set the flip on an axis, toggling it if needed
    pub fn set_flip(&mut self, axis: Axis, on: bool) -> Result<(), ViewerError> {
        if self.state.flip(axis) == on {
            return Ok(());
        }

        self.toggle_flip(axis)
    }

    /// Lock the view to the WCS, or unlock it if locked
    pub fn lock(&mut self) -> Result<LockChange, ViewerError> {
        let change = self.lock.lock(&mut self.state)?;
        self.transform_changed();

        Ok(change)
    }

    /// Return to the initial view, leaving the locked state
    pub fn reset(&mut self) {
        if self.state.is_wcs_locked() {
            self.lock.unlock(&mut self.state);
        }
        self.state.reset();

        self.transform_changed();
    }
}

// === Scale and pan ===

impl Viewer {
    /// Set the scale factor, clamped to the supported range
    pub fn set_scale(&mut self, scale: f64) -> Result<(), ViewerError> {
        if !scale.is_finite() || scale <= 0.0 {
            log::warn!("Rejected scale factor {}", scale);
            return Err(ViewerError::InvalidScale(scale));
        }

        self.state.set_scale(scale);
        self.transform_changed();

        Ok(())
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.state.pan(dx, dy);
        self.transform_changed();
    }

    /// Zoom by `factor`, keeping the image point under `screen` fixed
    pub fn zoom_at(&mut self, screen: Point, factor: f64) -> Result<(), ViewerError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ViewerError::InvalidScale(factor));
        }

        let scale = self.state.scale();
        let new_scale = clamp_scale(scale * factor);

        // Pointer relative to the viewport center
        let pointer = screen - self.viewport.center();
        let offset = self.state.offset();
        let new_offset = pointer - (pointer - offset) * (new_scale / scale);

        self.state.set_scale(new_scale);
        self.state.set_offset(new_offset);
        self.transform_changed();

        Ok(())
    }
}

// === Image and viewport ===

impl Viewer {
    /// Show a new image
    /// The view is reset and the WCS alignment recomputed
    pub fn load_image(&mut self, image: Image) {
        let alignment = WcsAlignment::from_projection(image.projection());
        self.lock.replace_alignment(&mut self.state, alignment);
        self.state.reset();

        self.stats = ImageStats::compute(
            image.samples(),
            self.settings.low_percentile,
            self.settings.high_percentile,
        );
        self.levels = match &self.stats {
            Some(stats) => DisplayLevels::from_stats(stats, self.levels.mode),
            None => DisplayLevels {
                mode: self.levels.mode,
                ..DisplayLevels::default()
            },
        };

        log::debug!(
            "Loaded {}x{} image, alignment: {:?}, levels: {:?}",
            image.width(),
            image.height(),
            alignment,
            self.levels
        );

        self.image = Some(image);
        self.drag = None;

        self.transform_changed();
        self.set_cursor(None);
    }

    /// Resize or move the viewer surface
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.transform_changed();
    }

    pub fn set_levels(&mut self, levels: DisplayLevels) {
        self.levels = levels;
    }

    pub fn set_scale_mode(&mut self, mode: ScaleMode) {
        self.levels.mode = mode;
    }
}

// === Input ===

impl Viewer {
    /// Subscribe a viewer to an input hub
    /// The viewer receives events until the returned subscription is dropped
    pub fn attach(viewer: &Rc<RefCell<Viewer>>, hub: &InputHub) -> InputSubscription {
        let viewer = Rc::downgrade(viewer);

        hub.subscribe(move |event| {
            let Some(viewer) = viewer.upgrade() else {
                return;
            };

            match viewer.try_borrow_mut() {
                Ok(mut viewer) => viewer.handle_input(*event),
                Err(_) => log::warn!("Viewer is busy, dropped input event {:?}", event),
            };
        })
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown(position) => {
                self.drag = Some(Drag {
                    last: position,
                    pending: Vector::zero(),
                });
            }
            InputEvent::PointerMove(position) => {
                if let Some(drag) = &mut self.drag {
                    drag.pending += position - drag.last;
                    drag.last = position;
                }

                let sample = self.sample_at(position);
                self.set_cursor(sample);
            }
            InputEvent::PointerUp(source) => {
                if self.drag.is_some() {
                    log::trace!("Drag ended by pointer up on {:?}", source);

                    self.apply_drag();
                    self.drag = None;
                }
            }
            InputEvent::PointerLeave => {
                self.set_cursor(None);
            }
            InputEvent::Wheel { position, delta_y } => {
                let step = self.settings.wheel_zoom_step;
                let factor = if delta_y < 0.0 { 1.0 + step } else { 1.0 - step };

                if let Err(e) = self.zoom_at(position, factor) {
                    log::warn!("Ignored wheel zoom: {}", e);
                }
            }
            InputEvent::Frame => self.apply_drag(),
        }
    }

    /// Apply the movement accumulated since the last frame as one pan
    fn apply_drag(&mut self) {
        let Some(drag) = &mut self.drag else {
            return;
        };

        let pending = std::mem::replace(&mut drag.pending, Vector::zero());
        if pending != Vector::zero() {
            self.pan(pending.x, pending.y);
        }
    }
}

// === Listeners ===

impl Viewer {
    /// Register a listener for changes of the view orientation
    pub fn subscribe_transform(&mut self, listener: impl FnMut(&TransformState) + 'static) -> ListenerId {
        self.transform_observers.subscribe(listener)
    }

    pub fn unsubscribe_transform(&mut self, id: ListenerId) -> bool {
        self.transform_observers.unsubscribe(id)
    }

    /// Register a listener for cursor samples
    pub fn subscribe_cursor(
        &mut self,
        listener: impl FnMut(&Option<CursorSample>) + 'static,
    ) -> ListenerId {
        self.cursor_observers.subscribe(listener)
    }

    pub fn unsubscribe_cursor(&mut self, id: ListenerId) -> bool {
        self.cursor_observers.unsubscribe(id)
    }

    fn transform_changed(&mut self) {
        self.transform_observers.notify(&self.state);
    }

    fn set_cursor(&mut self, cursor: Option<CursorSample>) {
        self.cursor = cursor;
        self.cursor_observers.notify(&self.cursor);
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(ViewerSettings::default())
    }
}
