//! skylens: the geometry and astrometric alignment engine of an astronomical image viewer
//!
//! The `Viewer` owns the orientation of the displayed image (`TransformState`), maps it to a
//! screen transform for rendering, maps pointer positions back onto image pixels and the sky,
//! and locks the view North up, East left when the image has a WCS solution.

pub mod angle;
pub mod celestial;
pub mod command;
pub mod compass;
pub mod config;
pub mod cursor;
pub mod display_transform;
pub mod error;
pub mod geometry;
pub mod image;
pub mod input;
pub mod levels;
pub mod observer;
pub mod projection;
pub mod scene;
pub mod status_bar;
pub mod transform_state;
pub mod util;
pub mod viewer;
pub mod wcs;
pub mod wcs_lock;

pub use angle::{ScreenAngle, SkyAngle};
pub use cursor::CursorSample;
pub use error::ViewerError;
pub use image::Image;
pub use transform_state::{Axis, TransformState};
pub use viewer::{Viewer, ViewerSettings};
pub use wcs::{SkyProjection, WcsAlignment};
pub use wcs_lock::LockChange;
