use log::debug;

use super::velocity::elapsed_seconds;
use super::window::{half_width, locate, ConfidenceGate};
use crate::data::model::Dataset;
use crate::error::Result;

/// Borrowed input columns for the acceleration estimate.
#[derive(Debug, Clone, Copy)]
pub struct VelocityColumns<'a> {
    /// Microseconds.
    pub time: &'a [f64],
    pub confidence: &'a [f64],
    pub speed: &'a [f64],
    /// Radians.
    pub direction: &'a [f64],
}

impl<'a> VelocityColumns<'a> {
    /// Resolve `time`, `confidence` and a named speed/direction pair.
    pub fn from_dataset(ds: &'a Dataset, speed: &str, direction: &str) -> Result<Self> {
        Ok(Self {
            time: ds.column("time")?,
            confidence: ds.column("confidence")?,
            speed: ds.column(speed)?,
            direction: ds.column(direction)?,
        })
    }

    fn velocity_vector(&self, i: usize) -> (f64, f64) {
        let (sin, cos) = self.direction[i].sin_cos();
        (self.speed[i] * cos, self.speed[i] * sin)
    }
}

/// Acceleration magnitude at sample `i`. Zero when there is no window or the
/// window spans no time.
pub fn acceleration_at(
    cols: &VelocityColumns<'_>,
    i: usize,
    step: usize,
    gate: ConfidenceGate,
) -> f64 {
    let Some(w) = locate(i, step, cols.confidence, gate) else {
        return 0.0;
    };

    let (sx, sy) = cols.velocity_vector(w.start);
    let (ex, ey) = cols.velocity_vector(w.end);
    let elapsed = elapsed_seconds(cols.time, w);
    if elapsed == 0.0 {
        return 0.0;
    }
    ((ex - sx) / elapsed).hypot((ey - sy) / elapsed)
}

/// Acceleration for every sample at the given window width.
pub fn estimate_acceleration(
    cols: &VelocityColumns<'_>,
    width: usize,
    gate: ConfidenceGate,
) -> Vec<f64> {
    let step = half_width(width);
    let acceleration: Vec<f64> = (0..cols.time.len())
        .map(|i| acceleration_at(cols, i, step, gate))
        .collect();

    debug!(
        "acceleration width {width}: {} of {} samples non-zero",
        acceleration.iter().filter(|&&a| a != 0.0).count(),
        acceleration.len()
    );
    acceleration
}
