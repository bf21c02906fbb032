use log::debug;

use super::window::{half_width, locate, ConfidenceGate, Window};
use crate::data::model::Dataset;
use crate::error::Result;

pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Borrowed input columns for the velocity estimate.
#[derive(Debug, Clone, Copy)]
pub struct KinematicColumns<'a> {
    /// Microseconds.
    pub time: &'a [f64],
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub confidence: &'a [f64],
}

impl<'a> KinematicColumns<'a> {
    /// Resolve `time`, `x`, `y` and `confidence` by name.
    pub fn from_dataset(ds: &'a Dataset) -> Result<Self> {
        Ok(Self {
            time: ds.column("time")?,
            x: ds.column("x")?,
            y: ds.column("y")?,
            confidence: ds.column("confidence")?,
        })
    }

    /// Same columns with substitute positions (e.g. smoothed copies).
    pub fn with_positions(self, x: &'a [f64], y: &'a [f64]) -> Self {
        Self { x, y, ..self }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Per-sample speed (position units per second) and direction (radians).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Velocity {
    pub speed: Vec<f64>,
    pub direction: Vec<f64>,
}

/// Seconds between the window bounds.
pub fn elapsed_seconds(time: &[f64], w: Window) -> f64 {
    (time[w.end] - time[w.start]) / MICROS_PER_SECOND
}

/// Speed and direction at sample `i`. `(0, 0)` when there is no window.
pub fn velocity_at(
    cols: &KinematicColumns<'_>,
    i: usize,
    step: usize,
    gate: ConfidenceGate,
) -> (f64, f64) {
    let Some(w) = locate(i, step, cols.confidence, gate) else {
        return (0.0, 0.0);
    };

    let dx = cols.x[w.end] - cols.x[w.start];
    let dy = cols.y[w.end] - cols.y[w.start];
    let amplitude = dx.hypot(dy);
    let elapsed = elapsed_seconds(cols.time, w);

    let speed = if elapsed != 0.0 { amplitude / elapsed } else { 0.0 };
    (speed, dy.atan2(dx))
}

/// Velocity for every sample at the given window width.
pub fn estimate_velocity(
    cols: &KinematicColumns<'_>,
    width: usize,
    gate: ConfidenceGate,
) -> Velocity {
    if cols.is_empty() {
        return Velocity::default();
    }
    let step = half_width(width);
    let (speed, direction): (Vec<f64>, Vec<f64>) = (0..cols.len())
        .map(|i| velocity_at(cols, i, step, gate))
        .unzip();

    debug!(
        "velocity width {width}: {} of {} samples moving",
        speed.iter().filter(|&&s| s != 0.0).count(),
        speed.len()
    );
    Velocity { speed, direction }
}
