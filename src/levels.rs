//! Module for the display levels mapping sample values onto the [0, 1] intensity range.

use serde::Deserialize;
use std::fmt::{self, Display};

/// Smallest black-to-white range used as a denominator
pub const MIN_RANGE: f64 = 1e-5;

/// Default percentile of the automatic black point
pub const DEFAULT_LOW_PERCENTILE: f64 = 1.0;
/// Default percentile of the automatic white point
pub const DEFAULT_HIGH_PERCENTILE: f64 = 99.9;

/// Summary statistics of an image's samples
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ImageStats {
    /// Lower end of the slider range, padded below the minimum sample
    pub raw_min: f64,
    /// Upper end of the slider range, padded above the maximum sample
    pub raw_max: f64,
    /// Black point at the low percentile
    pub auto_black: f64,
    /// White point at the high percentile
    pub auto_white: f64,
}

impl ImageStats {
    /// Compute the statistics of the finite samples
    /// `None` if there are none
    pub fn compute(samples: &[f32], low_percentile: f64, high_percentile: f64) -> Option<Self> {
        let mut sorted: Vec<f64> = samples
            .iter()
            .map(|&s| s as f64)
            .filter(|s| s.is_finite())
            .collect();

        if sorted.is_empty() {
            return None;
        }

        sorted.sort_by(f64::total_cmp);

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        let percentile = |p: f64| {
            let i = (p.clamp(0.0, 100.0) / 100.0 * sorted.len() as f64).floor() as usize;
            sorted[i.min(sorted.len() - 1)]
        };

        Some(Self {
            raw_min: min - 0.1 * min.abs(),
            raw_max: max + 0.1 * max.abs(),
            auto_black: percentile(low_percentile),
            auto_white: percentile(high_percentile),
        })
    }
}

/// Intensity curve applied after the linear stretch
#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    #[default]
    Linear,
    Sqrt,
    Log,
    Asinh,
}

impl ScaleMode {
    /// Apply the curve to a value in [0, 1]
    fn apply(self, x: f64) -> f64 {
        match self {
            ScaleMode::Linear => x,
            ScaleMode::Sqrt => x.sqrt(),
            ScaleMode::Log => (1.0 + 1000.0 * x).ln() / 1001f64.ln(),
            ScaleMode::Asinh => (3.0 * x).asinh() / 3f64.asinh(),
        }
    }
}

impl std::str::FromStr for ScaleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(ScaleMode::Linear),
            "sqrt" => Ok(ScaleMode::Sqrt),
            "log" => Ok(ScaleMode::Log),
            "asinh" => Ok(ScaleMode::Asinh),
            _ => Err(format!("Unknown scale mode '{}'", s)),
        }
    }
}

impl Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ScaleMode::Linear => "linear",
            ScaleMode::Sqrt => "sqrt",
            ScaleMode::Log => "log",
            ScaleMode::Asinh => "asinh",
        };
        write!(f, "{}", name)
    }
}

/// Black and white points with an intensity curve
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DisplayLevels {
    pub black: f64,
    pub white: f64,
    pub mode: ScaleMode,
}

impl Default for DisplayLevels {
    fn default() -> Self {
        Self {
            black: 0.0,
            white: 1.0,
            mode: ScaleMode::Linear,
        }
    }
}

impl DisplayLevels {
    /// Levels at the automatic black and white points
    pub fn from_stats(stats: &ImageStats, mode: ScaleMode) -> Self {
        Self {
            black: stats.auto_black,
            white: stats.auto_white,
            mode,
        }
    }

    /// Map a sample value to an intensity in [0, 1]
    /// Non-finite samples map to 0
    pub fn normalize(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }

        let range = (self.white - self.black).max(MIN_RANGE);
        let x = ((value - self.black) / range).clamp(0.0, 1.0);

        self.mode.apply(x).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn stats_pad_range_and_pick_percentiles() {
        let samples: Vec<f32> = (0..1000).map(|i| i as f32).collect();
        let stats = ImageStats::compute(&samples, 1.0, 99.9).unwrap();

        assert_abs_diff_eq!(stats.raw_min, 0.0);
        assert_abs_diff_eq!(stats.raw_max, 999.0 * 1.1, epsilon = 1e-9);
        assert_eq!(stats.auto_black, 10.0);
        assert_eq!(stats.auto_white, 999.0);
    }

    #[test]
    fn stats_ignore_non_finite_samples() {
        let stats = ImageStats::compute(&[f32::NAN, -2.0, f32::INFINITY, 4.0], 0.0, 100.0).unwrap();

        assert_abs_diff_eq!(stats.raw_min, -2.2, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.raw_max, 4.4, epsilon = 1e-9);
        assert_eq!(stats.auto_white, 4.0);

        assert!(ImageStats::compute(&[f32::NAN], 1.0, 99.9).is_none());
        assert!(ImageStats::compute(&[], 1.0, 99.9).is_none());
    }

    #[test]
    fn linear_normalization() {
        let levels = DisplayLevels {
            black: 10.0,
            white: 20.0,
            mode: ScaleMode::Linear,
        };

        assert_eq!(levels.normalize(15.0), 0.5);
        assert_eq!(levels.normalize(0.0), 0.0);
        assert_eq!(levels.normalize(50.0), 1.0);
    }

    #[test]
    fn zero_range_stays_finite() {
        let levels = DisplayLevels {
            black: 3.0,
            white: 3.0,
            mode: ScaleMode::Log,
        };

        for value in [2.0, 3.0, 3.000001, 4.0] {
            let v = levels.normalize(value);
            assert!(v.is_finite());
            assert!((0.0..=1.0).contains(&v));
        }

        let inverted = DisplayLevels {
            black: 5.0,
            white: 1.0,
            mode: ScaleMode::Sqrt,
        };
        assert!(inverted.normalize(3.0).is_finite());
        assert_eq!(levels.normalize(f64::NAN), 0.0);
    }

    #[test]
    fn curves_keep_end_points() {
        for mode in [ScaleMode::Linear, ScaleMode::Sqrt, ScaleMode::Log, ScaleMode::Asinh] {
            let levels = DisplayLevels { mode, ..Default::default() };

            assert_abs_diff_eq!(levels.normalize(0.0), 0.0);
            assert_abs_diff_eq!(levels.normalize(1.0), 1.0, epsilon = 1e-12);
            assert!(levels.normalize(0.25) >= 0.25);
        }
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("asinh".parse::<ScaleMode>(), Ok(ScaleMode::Asinh));
        assert!("gamma".parse::<ScaleMode>().is_err());
        assert_eq!(ScaleMode::Sqrt.to_string(), "sqrt");
    }
}
