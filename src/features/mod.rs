/// Kinematic feature extraction.
///
/// ```text
///   Dataset (time, x, y, confidence)
///        │
///        ▼
///   ┌──────────┐
///   │  window   │  confidence-gated [start, end] around each sample
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────────┐
///   │ velocity  │ ───▶ │ acceleration  │   per window width
///   └──────────┘      └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  speed_w, direction_w, acceleration_w → Dataset
///   └──────────┘
/// ```

pub mod acceleration;
pub mod pipeline;
pub mod smoothing;
pub mod velocity;
pub mod window;

pub use pipeline::{annotate_file, AnnotationReport, FeatureNames, FeaturePipeline};
