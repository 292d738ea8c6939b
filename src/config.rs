//! Module for the configuration file

use crate::geometry::Size;
use crate::levels::ScaleMode;
use crate::viewer::ViewerSettings;

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Configuration file contents
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Size of the viewer surface `[width, height]`
    pub viewport: Option<[f64; 2]>,
    /// Relative change of scale per wheel step
    pub wheel_zoom_step: Option<f64>,
    pub levels: Option<LevelsConfig>,
}

#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct LevelsConfig {
    pub mode: Option<ScaleMode>,
    pub low_percentile: Option<f64>,
    pub high_percentile: Option<f64>,
}

impl Config {
    /// Attempt to get the details of the config file
    /// If the file does not exist, an empty config is returned
    /// If reading or parsing the file fails, a descriptive error message is returned
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            log::debug!("No config file at `{}`", path.display());
            return Ok(Config::default());
        }

        let config_data = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file at `{}`: {}", path.display(), e))?;

        Self::parse(&config_data)
            .map_err(|e| format!("Error parsing config file at `{}`: {}", path.display(), e))
    }

    pub fn parse(data: &str) -> Result<Self, String> {
        toml::from_str(data).map_err(|e| e.to_string())
    }

    /// Build viewer settings from the config and defaults
    pub fn settings(&self) -> Result<ViewerSettings, String> {
        let defaults = ViewerSettings::default();

        // Viewport: Determined by the config, then a default
        let viewport = match self.viewport {
            Some([w, h]) if w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite() => Size::new(w, h),
            Some([w, h]) => return Err(format!("Invalid viewport size {}x{}", w, h)),
            None => defaults.viewport,
        };

        // Wheel step: Determined by the config, then a default
        let wheel_zoom_step = match self.wheel_zoom_step {
            Some(step) if step > 0.0 && step < 1.0 => step,
            Some(step) => return Err(format!("Wheel zoom step must be in (0, 1), got {}", step)),
            None => defaults.wheel_zoom_step,
        };

        let levels = self.levels.as_ref();
        let scale_mode = levels
            .and_then(|l| l.mode)
            .unwrap_or(defaults.scale_mode);
        let low_percentile = levels
            .and_then(|l| l.low_percentile)
            .unwrap_or(defaults.low_percentile);
        let high_percentile = levels
            .and_then(|l| l.high_percentile)
            .unwrap_or(defaults.high_percentile);

        if !(0.0..=100.0).contains(&low_percentile)
            || !(0.0..=100.0).contains(&high_percentile)
            || low_percentile >= high_percentile
        {
            return Err(format!(
                "Invalid percentiles: low {} and high {} must satisfy 0 <= low < high <= 100",
                low_percentile, high_percentile
            ));
        }

        Ok(ViewerSettings {
            viewport,
            wheel_zoom_step,
            scale_mode,
            low_percentile,
            high_percentile,
        })
    }
}
