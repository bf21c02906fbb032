//! Feature extraction settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::model::METADATA_PREFIX;
use crate::error::{Error, Result};

/// Window widths of the multi-scale pipeline, in samples.
pub const DEFAULT_WINDOW_WIDTHS: [usize; 5] = [1, 2, 4, 8, 16];

/// Confidence below which a sample takes no part in derivative estimates.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.75;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Velocity window widths, processed in this order
    pub window_widths: Vec<usize>,
    /// Window width used for every acceleration column
    pub acceleration_width: usize,
    /// Confidence gate
    pub min_confidence: f64,
    /// What to do when the derived columns already exist
    pub rerun: RerunPolicy,
    /// Trailing rolling-mean window applied to x/y before velocity (None = off)
    pub position_smoothing: Option<usize>,
    /// Display geometry written as metadata when importing raw gaze CSV
    pub screen: ScreenGeometry,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            window_widths: DEFAULT_WINDOW_WIDTHS.to_vec(),
            acceleration_width: 1,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            rerun: RerunPolicy::Reject,
            position_smoothing: None,
            screen: ScreenGeometry::default(),
        }
    }
}

/// Behaviour of the pipeline on a dataset that already carries its columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerunPolicy {
    /// Fail with a duplicate-column error before touching the dataset.
    #[default]
    Reject,
    /// Recompute the derived columns in place.
    Overwrite,
}

/// Screen and viewing distance of the recording setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenGeometry {
    pub width_px: f64,
    pub height_px: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    pub distance_mm: f64,
}

impl Default for ScreenGeometry {
    fn default() -> Self {
        Self {
            width_px: 1280.0,
            height_px: 720.0,
            width_mm: 400.0,
            height_mm: 225.0,
            distance_mm: 450.0,
        }
    }
}

impl ScreenGeometry {
    /// `(key, value)` pairs in the order they are written as metadata.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("width_px", self.width_px),
            ("height_px", self.height_px),
            ("width_mm", self.width_mm),
            ("height_mm", self.height_mm),
            ("distance_mm", self.distance_mm),
        ]
    }

    /// `%@METADATA <key> <value>` lines describing this geometry.
    pub fn metadata_lines(&self) -> Vec<String> {
        self.entries()
            .iter()
            .map(|(key, value)| format!("{METADATA_PREFIX} {key} {value:?}"))
            .collect()
    }
}

impl FeatureConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        if self.window_widths.is_empty() {
            return Err(Error::Config("window_widths must not be empty".to_string()));
        }
        if self.window_widths.contains(&0) {
            return Err(Error::Config("window widths must be > 0".to_string()));
        }
        if self.window_widths.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::Config(format!(
                "window_widths must be strictly increasing, got {:?}",
                self.window_widths
            )));
        }
        if self.acceleration_width == 0 {
            return Err(Error::Config("acceleration_width must be > 0".to_string()));
        }
        if !self.min_confidence.is_finite() {
            return Err(Error::Config(format!(
                "min_confidence must be finite, got {}",
                self.min_confidence
            )));
        }
        if self.position_smoothing == Some(0) {
            return Err(Error::Config("position_smoothing must be > 0".to_string()));
        }
        for (key, value) in self.screen.entries() {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!("screen.{key} must be > 0, got {value}")));
            }
        }
        Ok(())
    }

    /// Load config from a JSON file. Absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Pretty JSON representation.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = FeatureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_widths, vec![1, 2, 4, 8, 16]);
        assert_eq!(config.acceleration_width, 1);
        assert_eq!(config.rerun, RerunPolicy::Reject);
    }

    #[test]
    fn test_rejects_unsorted_widths() {
        let config = FeatureConfig {
            window_widths: vec![2, 1],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_zero_width() {
        let config = FeatureConfig {
            window_widths: vec![0, 1],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FeatureConfig {
            acceleration_width: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_smoothing() {
        let config = FeatureConfig {
            position_smoothing: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "rerun": "overwrite", "screen": {{ "width_px": 1920.0 }} }}"#).unwrap();

        let config = FeatureConfig::load(file.path()).unwrap();
        assert_eq!(config.rerun, RerunPolicy::Overwrite);
        assert_eq!(config.screen.width_px, 1920.0);
        assert_eq!(config.screen.height_px, 720.0);
        assert_eq!(config.window_widths, DEFAULT_WINDOW_WIDTHS.to_vec());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = FeatureConfig {
            position_smoothing: Some(5),
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        let back: FeatureConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
