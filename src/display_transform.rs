//! Module for generating the screen transform of the image from its `TransformState`.
//!
//! Read outermost first, the transform is: translate to the viewport center, translate by the
//! pan offset, scale (negated on flipped axes), then rotate clockwise. Points pass through the
//! components in the reverse order, so the image rotates and mirrors about its own center.

use crate::geometry::*;
use crate::transform_state::TransformState;

/// Generate the transform placing the image in the viewport
///
/// The input space has the center of the image at the origin (y pointing down)
/// The output space is the screen, in the same coordinates as `viewport`
///
pub fn display_transform(state: &TransformState, viewport: Rect) -> Transform {
    // The components of the transform in the order they are performed
    let transforms = [
        rotation_t(state),
        scale_t(state),
        pan_t(state),
        center_t(viewport),
    ];

    transforms
        .iter()
        .fold(Transform::identity(), |acc, t| acc.then(t))
}

/// Generate the transform for the raw image
///
/// The input space contains the raw image with its top-left corner at the origin, as the
/// renderer draws it
///
pub fn image_transform(state: &TransformState, viewport: Rect, image_size: IntSize) -> Transform {
    let half = image_size.to_f64() / 2.0;

    Transform::translation(-half.width, -half.height).then(&display_transform(state, viewport))
}

/// Map a point in DS9 coordinates (1-indexed, origin bottom-left) to the screen
pub fn image_point_to_screen(
    ds9: Point,
    state: &TransformState,
    viewport: Rect,
    image_size: IntSize,
) -> Point {
    let height = image_size.height as f64;
    let raw = Point::new(ds9.x - 0.5, height - ds9.y + 0.5);

    image_transform(state, viewport, image_size).transform_point(raw)
}

// === Transform components ===

fn rotation_t(state: &TransformState) -> Transform {
    Transform::rotation(Angle::degrees(state.rotation().degrees()))
}

fn scale_t(state: &TransformState) -> Transform {
    let scale = state.scale();
    let sx = if state.flip_horizontal() { -scale } else { scale };
    let sy = if state.flip_vertical() { -scale } else { scale };

    Transform::scale(sx, sy)
}

fn pan_t(state: &TransformState) -> Transform {
    Translation::from(state.offset()).to_transform()
}

fn center_t(viewport: Rect) -> Transform {
    Translation::from(viewport.center().to_vector()).to_transform()
}
