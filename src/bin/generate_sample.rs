use std::path::PathBuf;

use anyhow::{Context, Result};

use gaze_features::config::ScreenGeometry;
use gaze_features::data::model::Dataset;
use gaze_features::data::writer::save_arff;

/// Sampling interval of the synthetic tracker (250 Hz), in microseconds.
const SAMPLE_INTERVAL_US: f64 = 4000.0;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One stretch of synthetic eye movement.
enum Segment {
    Fixation { at: (f64, f64), samples: usize },
    Saccade { to: (f64, f64), samples: usize },
    Pursuit { velocity: (f64, f64), samples: usize },
    Dropout { samples: usize },
}

#[derive(Default)]
struct Recorder {
    time: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
    confidence: Vec<f64>,
}

impl Recorder {
    fn push(&mut self, pos: (f64, f64), confidence: f64) {
        self.time.push(self.time.len() as f64 * SAMPLE_INTERVAL_US);
        self.x.push(pos.0);
        self.y.push(pos.1);
        self.confidence.push(confidence);
    }
}

fn main() -> Result<()> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_gaze.arff"));

    let mut rng = SimpleRng::new(42);
    let script = [
        Segment::Fixation { at: (640.0, 360.0), samples: 60 },
        Segment::Saccade { to: (900.0, 200.0), samples: 8 },
        Segment::Fixation { at: (900.0, 200.0), samples: 50 },
        Segment::Dropout { samples: 12 },
        Segment::Fixation { at: (900.0, 200.0), samples: 30 },
        Segment::Pursuit { velocity: (-150.0, 60.0), samples: 120 },
        Segment::Saccade { to: (300.0, 500.0), samples: 10 },
        Segment::Fixation { at: (300.0, 500.0), samples: 60 },
    ];

    let mut rec = Recorder::default();
    let mut pos = (640.0, 360.0);
    for segment in &script {
        match *segment {
            Segment::Fixation { at, samples } => {
                pos = at;
                for _ in 0..samples {
                    let jitter = (rng.gauss(0.0, 0.8), rng.gauss(0.0, 0.8));
                    rec.push((at.0 + jitter.0, at.1 + jitter.1), rng.gauss(0.95, 0.02).min(1.0));
                }
            }
            Segment::Saccade { to, samples } => {
                let from = pos;
                for k in 1..=samples {
                    let t = k as f64 / samples as f64;
                    // Smoothstep velocity profile.
                    let s = t * t * (3.0 - 2.0 * t);
                    rec.push((from.0 + (to.0 - from.0) * s, from.1 + (to.1 - from.1) * s), 0.9);
                }
                pos = to;
            }
            Segment::Pursuit { velocity, samples } => {
                let dt = SAMPLE_INTERVAL_US / 1_000_000.0;
                for _ in 0..samples {
                    pos = (pos.0 + velocity.0 * dt, pos.1 + velocity.1 * dt);
                    rec.push((pos.0 + rng.gauss(0.0, 0.3), pos.1 + rng.gauss(0.0, 0.3)), 0.92);
                }
            }
            Segment::Dropout { samples } => {
                for _ in 0..samples {
                    rec.push((rng.gauss(0.0, 5.0), rng.gauss(0.0, 5.0)), rng.next_f64() * 0.3);
                }
            }
        }
    }

    let n = rec.time.len();
    let mut ds = Dataset::new("gaze_labels");
    ds.append_column("time", rec.time)?;
    ds.append_column("x", rec.x)?;
    ds.append_column("y", rec.y)?;
    ds.append_column("confidence", rec.confidence)?;
    ds.comments.push("% synthetic recording, seed 42".to_string());
    ds.metadata = ScreenGeometry::default().metadata_lines();

    save_arff(&output, &ds).with_context(|| format!("writing {}", output.display()))?;
    println!("Wrote {n} gaze samples to {}", output.display());
    Ok(())
}
