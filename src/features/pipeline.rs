use std::path::Path;

use log::info;

use super::acceleration::{estimate_acceleration, VelocityColumns};
use super::smoothing::rolling_mean;
use super::velocity::{estimate_velocity, KinematicColumns};
use super::window::ConfidenceGate;
use crate::config::{FeatureConfig, RerunPolicy};
use crate::data::loader::load_file;
use crate::data::model::Dataset;
use crate::data::writer::save_arff;
use crate::error::{Error, Result};

/// Comment lines documenting the derived columns, added once per dataset.
pub const FEATURE_COMMENTS: [&str; 2] = [
    "% The number after speed, direction denotes the step size used for calculation.",
    "% Acceleration was calculated between adjacent samples of the low-pass filtered velocity.",
];

/// Names of the three columns derived for one window width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureNames {
    pub speed: String,
    pub direction: String,
    pub acceleration: String,
}

impl FeatureNames {
    pub fn for_width(width: usize) -> Self {
        Self {
            speed: format!("speed_{width}"),
            direction: format!("direction_{width}"),
            acceleration: format!("acceleration_{width}"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [
            self.speed.as_str(),
            self.direction.as_str(),
            self.acceleration.as_str(),
        ]
        .into_iter()
    }
}

/// What a pipeline run did to the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationReport {
    /// Columns created, in creation order.
    pub appended: Vec<String>,
    /// Existing columns recomputed under [`RerunPolicy::Overwrite`].
    pub replaced: Vec<String>,
    /// Samples below the confidence gate.
    pub gated_samples: usize,
}

/// Multi-scale speed/direction/acceleration extraction.
#[derive(Debug, Clone, Default)]
pub struct FeaturePipeline {
    config: FeatureConfig,
}

impl FeaturePipeline {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Append `speed_w`, `direction_w` and `acceleration_w` for every window
    /// width, in increasing width order.
    ///
    /// All input columns and (under [`RerunPolicy::Reject`]) all output names
    /// are checked before the dataset is touched, so a failed run leaves it
    /// unchanged.
    pub fn annotate(&self, ds: &mut Dataset) -> Result<AnnotationReport> {
        self.config.validate()?;
        let gate = ConfidenceGate::new(self.config.min_confidence);

        let cols = KinematicColumns::from_dataset(ds)?;
        let gated_samples = cols.confidence.iter().filter(|&&c| gate.fails(c)).count();
        let smoothed = self
            .config
            .position_smoothing
            .map(|w| (rolling_mean(cols.x, w), rolling_mean(cols.y, w)));

        let names: Vec<(usize, FeatureNames)> = self
            .config
            .window_widths
            .iter()
            .map(|&w| (w, FeatureNames::for_width(w)))
            .collect();
        if self.config.rerun == RerunPolicy::Reject {
            if let Some(existing) = names
                .iter()
                .flat_map(|(_, n)| n.iter())
                .find(|name| ds.schema().contains(name))
            {
                return Err(Error::DuplicateColumn(existing.to_string()));
            }
        }

        let mut report = AnnotationReport {
            gated_samples,
            ..Default::default()
        };

        for (width, names) in &names {
            let velocity = {
                let mut cols = KinematicColumns::from_dataset(ds)?;
                if let Some((x, y)) = &smoothed {
                    cols = cols.with_positions(x, y);
                }
                estimate_velocity(&cols, *width, gate)
            };
            put_column(ds, &names.speed, velocity.speed, &mut report)?;
            put_column(ds, &names.direction, velocity.direction, &mut report)?;

            let acceleration = {
                let cols = VelocityColumns::from_dataset(ds, &names.speed, &names.direction)?;
                estimate_acceleration(&cols, self.config.acceleration_width, gate)
            };
            put_column(ds, &names.acceleration, acceleration, &mut report)?;

            info!("width {width}: added {}, {}, {}", names.speed, names.direction, names.acceleration);
        }

        for line in FEATURE_COMMENTS {
            if !ds.comments.iter().any(|c| c == line) {
                ds.comments.push(line.to_string());
            }
        }

        info!(
            "annotated {}: {} columns added, {} replaced, {} samples below confidence {}",
            ds.relation,
            report.appended.len(),
            report.replaced.len(),
            report.gated_samples,
            gate.threshold()
        );
        Ok(report)
    }
}

fn put_column(
    ds: &mut Dataset,
    name: &str,
    values: Vec<f64>,
    report: &mut AnnotationReport,
) -> Result<()> {
    if ds.schema().contains(name) {
        ds.replace_column(name, values)?;
        report.replaced.push(name.to_string());
    } else {
        ds.append_column(name, values)?;
        report.appended.push(name.to_string());
    }
    Ok(())
}

/// Load `input`, annotate it, and write the result to `output`.
///
/// Nothing is written unless loading and annotation both succeed.
pub fn annotate_file(input: &Path, output: &Path, config: &FeatureConfig) -> Result<AnnotationReport> {
    let mut ds = load_file(input)?;
    let report = FeaturePipeline::new(config.clone()).annotate(&mut ds)?;
    save_arff(output, &ds)?;
    Ok(report)
}
