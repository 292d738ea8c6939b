//! Module for representing the image being viewed

use crate::geometry::*;
use crate::wcs::{LinearMatrix, SkyProjection};

use thiserror::Error;

/// A raster image with an optional sky projection
#[derive(Debug)]
pub struct Image {
    /// Width in pixels (> 0)
    width: u32,
    /// Height in pixels (> 0)
    height: u32,
    /// Row-major samples, bottom row first (`row * width + col`)
    samples: Vec<f32>,
    /// Mapping from pixels to the sky
    projection: Option<Box<dyn SkyProjection>>,
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image dimensions must be positive, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },

    #[error("Expected {expected} samples for the image dimensions, got {actual}")]
    SampleCount { expected: usize, actual: usize },
}

impl Image {
    /// Create an image from its samples
    /// An empty sample buffer is accepted for images without pixel data
    pub fn new(width: u32, height: u32, samples: Vec<f32>) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::EmptyDimensions { width, height });
        }

        let expected = width as usize * height as usize;
        if !samples.is_empty() && samples.len() != expected {
            return Err(ImageError::SampleCount {
                expected,
                actual: samples.len(),
            });
        }

        Ok(Self {
            width,
            height,
            samples,
            projection: None,
        })
    }

    /// Attach a sky projection
    pub fn with_projection(mut self, projection: impl SkyProjection + 'static) -> Self {
        self.projection = Some(Box::new(projection));
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> IntSize {
        IntSize::new(self.width, self.height)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// The sample at a pixel (0-indexed, rows from the bottom)
    /// `None` if the pixel is outside the image or there is no pixel data
    pub fn sample(&self, x: i64, y: i64) -> Option<f32> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width as usize)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.height as usize)?;

        self.samples.get(y * self.width as usize + x).copied()
    }

    pub fn projection(&self) -> Option<&dyn SkyProjection> {
        self.projection.as_deref()
    }

    /// The linear matrix of a valid projection
    pub fn linear_matrix(&self) -> Option<LinearMatrix> {
        self.projection()
            .filter(|p| p.is_valid())
            .and_then(|p| p.linear_matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_dimensions() {
        assert!(matches!(
            Image::new(0, 10, vec![]),
            Err(ImageError::EmptyDimensions { .. })
        ));
    }

    #[test]
    fn rejects_mismatched_samples() {
        assert!(matches!(
            Image::new(2, 2, vec![0.0; 3]),
            Err(ImageError::SampleCount {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn samples_are_row_major() {
        let image = Image::new(3, 2, vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]).unwrap();

        assert_eq!(image.sample(0, 0), Some(0.0));
        assert_eq!(image.sample(2, 0), Some(2.0));
        assert_eq!(image.sample(1, 1), Some(11.0));
    }

    #[test]
    fn out_of_range_samples_are_none() {
        let image = Image::new(3, 2, vec![0.0; 6]).unwrap();

        assert_eq!(image.sample(-1, 0), None);
        assert_eq!(image.sample(3, 0), None);
        assert_eq!(image.sample(0, 2), None);
    }

    #[test]
    fn image_without_data_has_no_samples() {
        let image = Image::new(4, 4, vec![]).unwrap();
        assert_eq!(image.sample(1, 1), None);
        assert!(image.projection().is_none());
        assert!(image.linear_matrix().is_none());
    }
}
