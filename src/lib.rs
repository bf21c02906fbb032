//! # gaze-features
//!
//! Confidence-gated, multi-scale kinematic features for eye-tracking
//! recordings. A recording of `time` (µs), `x`, `y` and `confidence` samples
//! is enriched with `speed_w`, `direction_w` and `acceleration_w` columns for
//! the window widths `w = 1, 2, 4, 8, 16`, ready for an external
//! fixation / saccade / smooth-pursuit classifier.
//!
//! ```no_run
//! use std::path::Path;
//! use gaze_features::{data::loader::load_file, FeaturePipeline};
//!
//! let mut ds = load_file(Path::new("recording.arff"))?;
//! FeaturePipeline::default().annotate(&mut ds)?;
//! gaze_features::data::writer::save_arff(Path::new("features.arff"), &ds)?;
//! # Ok::<(), gaze_features::Error>(())
//! ```
//!
//! - [`data`]: dataset model and the ARFF / raw CSV readers and writer
//! - [`features`]: window locator, velocity, acceleration, pipeline
//! - [`classify`]: labels and the classifier capability boundary
//! - [`config`]: JSON configuration

pub mod classify;
pub mod config;
pub mod data;
pub mod error;
pub mod features;

pub use config::{FeatureConfig, RerunPolicy};
pub use data::model::{Dataset, Sample, Schema};
pub use error::{Error, Result};
pub use features::FeaturePipeline;
