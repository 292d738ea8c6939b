//! Module for scene files: the description of an image to view
//!
//! ```toml
//! [image]
//! width = 100
//! height = 100
//! data = "field.f32"      # raw little-endian f32 samples, bottom row first
//!
//! [wcs]
//! crpix = [50.5, 50.5]
//! crval = [150.0, 2.0]
//! cd = [[-2.8e-4, 0.0], [0.0, 2.8e-4]]
//! ```
//!
//! Samples may instead be given inline (`samples = [...]`) or left out entirely.

use crate::image::{Image, ImageError};
use crate::projection::TanProjection;
use crate::wcs::WcsKeywords;

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    pub image: ImageSection,
    pub wcs: Option<WcsKeywords>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ImageSection {
    pub width: u32,
    pub height: u32,
    /// Path of a raw sample file, relative to the scene file
    pub data: Option<PathBuf>,
    /// Inline samples
    pub samples: Option<Vec<f32>>,
}

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read `{}`: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Error parsing scene: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Sample data of {0} bytes is not a whole number of f32 values")]
    DataLength(usize),

    #[error("A scene cannot have both a data file and inline samples")]
    DuplicateSamples,

    #[error(transparent)]
    Image(#[from] ImageError),
}

impl Scene {
    pub fn parse(data: &str) -> Result<Self, SceneError> {
        Ok(toml::from_str(data)?)
    }

    /// Read and parse a scene file
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let data = fs::read_to_string(path).map_err(|source| SceneError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&data)
    }

    /// Build the image of the scene
    /// `base_dir`: the directory relative data paths are resolved against
    ///
    /// A `[wcs]` block that does not describe a usable projection is reported and ignored,
    /// leaving an image without sky coordinates
    pub fn into_image(self, base_dir: &Path) -> Result<Image, SceneError> {
        let Scene { image, wcs } = self;

        let samples = match (image.data, image.samples) {
            (Some(_), Some(_)) => return Err(SceneError::DuplicateSamples),
            (Some(data), None) => read_samples(&base_dir.join(data))?,
            (None, Some(samples)) => samples,
            (None, None) => Vec::new(),
        };

        let image = Image::new(image.width, image.height, samples)?;

        let projection = wcs.and_then(|keywords| {
            TanProjection::from_keywords(&keywords)
                .map_err(|e| log::warn!("Ignoring invalid WCS: {}", e))
                .ok()
        });

        Ok(match projection {
            Some(projection) => image.with_projection(projection),
            None => image,
        })
    }
}

/// Read raw little-endian `f32` samples
fn read_samples(path: &Path) -> Result<Vec<f32>, SceneError> {
    let bytes = fs::read(path).map_err(|source| SceneError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    decode_samples(&bytes)
}

fn decode_samples(bytes: &[u8]) -> Result<Vec<f32>, SceneError> {
    if bytes.len() % 4 != 0 {
        return Err(SceneError::DataLength(bytes.len()));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
