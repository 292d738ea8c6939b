//! Module for mapping a screen position back onto the image and sampling it.
//!
//! Image positions are reported in the DS9 convention: 1-indexed, origin at the bottom-left
//! corner, with integer coordinates at pixel centers. Pixel indices are 0-indexed and count rows
//! from the bottom, matching the row order of the sample buffer.

use crate::celestial::{self, CelestialCoordinates};
use crate::geometry::*;
use crate::image::Image;
use crate::transform_state::TransformState;

/// The position on the image under a screen point
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ImagePosition {
    /// Continuous coordinates in the DS9 convention
    pub image: Point,
    /// 0-indexed pixel column
    pub pixel_x: i64,
    /// 0-indexed pixel row, counted from the bottom
    pub pixel_y: i64,
    /// Whether the pixel indices lie within the image
    pub in_bounds: bool,
}

/// A readout of the image under the pointer
#[derive(Clone, PartialEq, Debug)]
pub struct CursorSample {
    /// Raw pointer position
    pub screen: Point,
    /// Continuous coordinates in the DS9 convention
    pub image: Point,
    pub pixel_x: i64,
    pub pixel_y: i64,
    pub in_bounds: bool,
    /// The sample at the pixel, if in bounds
    pub value: Option<f32>,
    /// The position on the sky, if in bounds and the image has a usable projection
    pub celestial: Option<CelestialCoordinates>,
}

/// Map a screen position to the image by undoing the display transform step by step
///
/// `viewport`: the bounds of the viewer surface in screen coordinates
///
pub fn screen_to_image(
    screen: Point,
    viewport: Rect,
    state: &TransformState,
    image_size: IntSize,
) -> ImagePosition {
    let width = image_size.width as f64;
    let height = image_size.height as f64;

    // Relative to the center of the viewport
    let adjusted = screen - viewport.center();

    // Undo the pan
    let unpanned = adjusted - state.offset();

    // Undo the scale
    let unscaled = unpanned / state.scale();

    // Undo the rotation
    // A mirrored display turns the opposite way on screen, so the inverse turns the other way too
    let (sin, cos) = state.rotation().radians().sin_cos();
    let rotated = if state.is_mirrored() {
        Vector::new(
            unscaled.x * cos - unscaled.y * sin,
            unscaled.x * sin + unscaled.y * cos,
        )
    } else {
        Vector::new(
            unscaled.x * cos + unscaled.y * sin,
            -unscaled.x * sin + unscaled.y * cos,
        )
    };

    // Undo the flips
    let unflipped = Vector::new(
        if state.flip_horizontal() { -rotated.x } else { rotated.x },
        if state.flip_vertical() { -rotated.y } else { rotated.y },
    );

    // From center-relative to the top-left corner of the raw image
    let image_x = unflipped.x + width / 2.0;
    let image_y = unflipped.y + height / 2.0;

    // DS9 convention: 1-indexed, y measured up from the bottom
    let ds9 = Point::new(image_x + 0.5, height - image_y + 0.5);

    let finite = ds9.x.is_finite() && ds9.y.is_finite();
    let pixel_x = (ds9.x - 0.5).floor() as i64;
    let pixel_y = (ds9.y - 0.5).floor() as i64;

    // Bounds are decided on the indices used for data access
    let in_bounds = finite
        && (0..image_size.width as i64).contains(&pixel_x)
        && (0..image_size.height as i64).contains(&pixel_y);

    ImagePosition {
        image: ds9,
        pixel_x,
        pixel_y,
        in_bounds,
    }
}

impl CursorSample {
    /// Sample the image under a screen position
    pub fn at(screen: Point, viewport: Rect, state: &TransformState, image: &Image) -> Self {
        let position = screen_to_image(screen, viewport, state, image.size());

        let value = position
            .in_bounds
            .then(|| image.sample(position.pixel_x, position.pixel_y))
            .flatten();

        let celestial = celestial::resolve(position.image, position.in_bounds, image.projection());

        let sample = Self {
            screen,
            image: position.image,
            pixel_x: position.pixel_x,
            pixel_y: position.pixel_y,
            in_bounds: position.in_bounds,
            value,
            celestial,
        };

        log::trace!("Cursor sample: {:?}", sample);

        sample
    }

    pub fn ra(&self) -> Option<f64> {
        self.celestial.as_ref().map(|c| c.ra)
    }

    pub fn dec(&self) -> Option<f64> {
        self.celestial.as_ref().map(|c| c.dec)
    }

    /// Sexagesimal right ascension, empty if unavailable
    pub fn ra_sexagesimal(&self) -> &str {
        self.celestial
            .as_ref()
            .map_or("", |c| c.ra_sexagesimal.as_str())
    }

    /// Sexagesimal declination, empty if unavailable
    pub fn dec_sexagesimal(&self) -> &str {
        self.celestial
            .as_ref()
            .map_or("", |c| c.dec_sexagesimal.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::ScreenAngle;
    use crate::display_transform::image_point_to_screen;
    use crate::transform_state::Axis;
    use approx::assert_abs_diff_eq;

    fn viewport() -> Rect {
        Rect::from_size(Size::new(800.0, 600.0))
    }

    #[test]
    fn center_of_identity_view() {
        let state = TransformState::default();
        let pos = screen_to_image(Point::new(400.0, 300.0), viewport(), &state, IntSize::new(100, 100));

        assert_abs_diff_eq!(pos.image.x, 50.5);
        assert_abs_diff_eq!(pos.image.y, 50.5);
        assert_eq!((pos.pixel_x, pos.pixel_y), (50, 50));
        assert!(pos.in_bounds);
    }

    #[test]
    fn y_axis_points_up() {
        let state = TransformState::default();
        let size = IntSize::new(100, 100);

        // Just inside the bottom-left corner of the image on screen
        let pos = screen_to_image(Point::new(350.25, 349.75), viewport(), &state, size);
        assert_eq!((pos.pixel_x, pos.pixel_y), (0, 0));

        // Just inside the top-right corner
        let pos = screen_to_image(Point::new(449.75, 250.25), viewport(), &state, size);
        assert_eq!((pos.pixel_x, pos.pixel_y), (99, 99));
        assert!(pos.in_bounds);
    }

    #[test]
    fn bounds_are_exact_on_indices() {
        let state = TransformState::default();
        let size = IntSize::new(100, 100);

        // The left edge of the last column is still inside
        let pos = screen_to_image(Point::new(449.0, 300.0), viewport(), &state, size);
        assert_eq!(pos.pixel_x, 99);
        assert!(pos.in_bounds);

        // The right edge of the last column is outside
        let pos = screen_to_image(Point::new(450.0, 300.0), viewport(), &state, size);
        assert_eq!(pos.pixel_x, 100);
        assert!(!pos.in_bounds);

        // The bottom row begins exactly at the bottom edge
        let pos = screen_to_image(Point::new(400.0, 350.0), viewport(), &state, size);
        assert_eq!(pos.pixel_y, 0);
        assert!(pos.in_bounds);

        // The top edge rounds to row `height`
        let pos = screen_to_image(Point::new(400.0, 250.0), viewport(), &state, size);
        assert_eq!(pos.pixel_y, 100);
        assert!(!pos.in_bounds);
    }

    #[test]
    fn far_outside_is_out_of_bounds() {
        let state = TransformState::default();
        let pos = screen_to_image(Point::new(-5000.0, 9000.0), viewport(), &state, IntSize::new(10, 10));
        assert!(!pos.in_bounds);
    }

    #[test]
    fn horizontal_flip_with_rotation_reads_the_right_pixel() {
        let mut state = TransformState::default();
        state.set_rotation(ScreenAngle::new(90.0));
        state.set_flip(Axis::Horizontal, true);
        let size = IntSize::new(100, 100);

        // Raw pixel (70, 50) (top-left origin) is displayed at center + flip(rotate((20, 0)))
        // rotate 90° cw: (0, 20); flip: (0, 20) -> screen (400, 320)
        let pos = screen_to_image(Point::new(400.0, 320.0), viewport(), &state, size);
        assert_abs_diff_eq!(pos.image.x, 70.5, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.image.y, 50.5, epsilon = 1e-9);
    }

    #[test]
    fn vertical_flip_alone_reverses_the_rotation() {
        let mut state = TransformState::default();
        state.set_rotation(ScreenAngle::new(90.0));
        state.set_flip(Axis::Vertical, true);
        let size = IntSize::new(100, 100);

        // rotate 90° cw: (20, 0) -> (0, 20); flip: (0, 20) -> screen (400, 280)
        let pos = screen_to_image(Point::new(400.0, 280.0), viewport(), &state, size);
        assert_abs_diff_eq!(pos.image.x, 70.5, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.image.y, 50.5, epsilon = 1e-9);
    }

    #[test]
    fn round_trip_over_orientations() {
        let size = IntSize::new(120, 80);
        let screens = [
            Point::new(400.0, 300.0),
            Point::new(410.3, 287.9),
            Point::new(372.0, 333.0),
        ];

        for rotation in [0.0, 17.5, 90.0, 200.25, 333.0] {
            for (flip_h, flip_v) in [(false, false), (true, false), (false, true), (true, true)] {
                for scale in [0.1, 1.0, 3.7, 100.0] {
                    let mut state = TransformState::default();
                    state.set_scale(scale);
                    state.pan(12.0, -8.5);
                    state.set_rotation(ScreenAngle::new(rotation));
                    state.set_flip(Axis::Horizontal, flip_h);
                    state.set_flip(Axis::Vertical, flip_v);

                    for screen in screens {
                        let pos = screen_to_image(screen, viewport(), &state, size);
                        let back = image_point_to_screen(pos.image, &state, viewport(), size);

                        assert_abs_diff_eq!(back.x, screen.x, epsilon = 1e-6);
                        assert_abs_diff_eq!(back.y, screen.y, epsilon = 1e-6);
                    }
                }
            }
        }
    }
}
