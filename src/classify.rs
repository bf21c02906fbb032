//! Boundary to the downstream eye-movement classifier.
//!
//! Classification itself happens outside this crate. The surrounding
//! application supplies a [`Classifier`]; this module only names the labels
//! and groups labelled samples into events.

use std::convert::Infallible;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use log::info;

use serde::{Serialize, Serializer};

use crate::data::loader::{parse_arff, parse_text_column};
use crate::data::model::Dataset;
use crate::error::{Error, Result};

/// Label column written by the downstream classifier.
pub const DEFAULT_LABEL_COLUMN: &str = "EYE_MOVEMENT_TYPE";

/// Per-sample label produced by a classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EyeMovement {
    Fixation,
    Saccade,
    SmoothPursuit,
    /// Any other label (noise, blink, unknown), kept verbatim.
    Other(String),
}

impl FromStr for EyeMovement {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "FIX" => EyeMovement::Fixation,
            "SACCADE" => EyeMovement::Saccade,
            "SP" => EyeMovement::SmoothPursuit,
            other => EyeMovement::Other(other.to_string()),
        })
    }
}

impl fmt::Display for EyeMovement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EyeMovement::Fixation => write!(f, "FIX"),
            EyeMovement::Saccade => write!(f, "SACCADE"),
            EyeMovement::SmoothPursuit => write!(f, "SP"),
            EyeMovement::Other(s) => write!(f, "{s}"),
        }
    }
}

impl Serialize for EyeMovement {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Read the labels of a classified file from its `column` attribute.
pub fn read_labels(text: &str, column: &str) -> Result<Vec<EyeMovement>> {
    let labels = parse_text_column(text, column)?
        .iter()
        .map(|cell| cell.parse().unwrap_or_else(|never: Infallible| match never {}))
        .collect();
    Ok(labels)
}

/// Labels every sample of an annotated dataset.
///
/// Implementations must return exactly one label per sample.
pub trait Classifier {
    fn classify(&self, dataset: &Dataset) -> Result<Vec<EyeMovement>>;
}

/// One labelled gaze sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GazeEvent {
    #[serde(rename = "videoTime")]
    pub video_time: Option<f64>,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "classification")]
    pub label: EyeMovement,
}

/// Labelled samples grouped by movement type, plus the full sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventSummary {
    pub fixations: Vec<GazeEvent>,
    pub saccades: Vec<GazeEvent>,
    pub smooth_pursuits: Vec<GazeEvent>,
    pub total: Vec<GazeEvent>,
}

impl EventSummary {
    /// Group `labels` (one per sample of `ds`) into events.
    ///
    /// `video_times`, when given, must also have one entry per sample.
    pub fn from_labels(
        ds: &Dataset,
        labels: &[EyeMovement],
        video_times: Option<&[Option<f64>]>,
    ) -> Result<Self> {
        if labels.len() != ds.len() {
            return Err(Error::LabelCount(labels.len(), ds.len()));
        }
        if let Some(vt) = video_times {
            if vt.len() != ds.len() {
                return Err(Error::ColumnLength {
                    name: "videoTime".to_string(),
                    expected: ds.len(),
                    actual: vt.len(),
                });
            }
        }

        let x = ds.column("x")?;
        let y = ds.column("y")?;
        let mut summary = EventSummary::default();

        for (i, label) in labels.iter().enumerate() {
            let event = GazeEvent {
                video_time: video_times.and_then(|vt| vt[i]),
                x: x[i],
                y: y[i],
                label: label.clone(),
            };
            match label {
                EyeMovement::Fixation => summary.fixations.push(event.clone()),
                EyeMovement::Saccade => summary.saccades.push(event.clone()),
                EyeMovement::SmoothPursuit => summary.smooth_pursuits.push(event.clone()),
                EyeMovement::Other(_) => {}
            }
            summary.total.push(event);
        }
        Ok(summary)
    }

    /// Run `classifier` on `ds` and group the result.
    pub fn classify_with<C: Classifier + ?Sized>(
        classifier: &C,
        ds: &Dataset,
        video_times: Option<&[Option<f64>]>,
    ) -> Result<Self> {
        let labels = classifier.classify(ds)?;
        Self::from_labels(ds, &labels, video_times)
    }

    /// Group a classified file: the feature dataset plus a nominal label
    /// column named `label_column`.
    pub fn from_classified_arff(
        text: &str,
        label_column: &str,
        video_times: Option<&[Option<f64>]>,
    ) -> Result<Self> {
        let ds = parse_arff(text)?;
        let labels = read_labels(text, label_column)?;
        Self::from_labels(&ds, &labels, video_times)
    }

    /// [`EventSummary::from_classified_arff`] on a file.
    pub fn load_classified(
        path: &Path,
        label_column: &str,
        video_times: Option<&[Option<f64>]>,
    ) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let summary = Self::from_classified_arff(&text, label_column, video_times)?;
        info!(
            "{}: {} fixation, {} saccade, {} smooth pursuit samples of {}",
            path.display(),
            summary.fixations.len(),
            summary.saccades.len(),
            summary.smooth_pursuits.len(),
            summary.total.len()
        );
        Ok(summary)
    }

    /// Write every event as CSV (`videoTime,x,y,classification`).
    pub fn write_csv<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        for event in &self.total {
            writer.serialize(event)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Schema;

    fn dataset() -> Dataset {
        let schema = Schema::from_names(["time", "x", "y", "confidence"]).unwrap();
        Dataset::from_columns(
            "gaze",
            schema,
            vec![
                vec![0.0, 1.0, 2.0, 3.0],
                vec![10.0, 11.0, 12.0, 13.0],
                vec![20.0, 21.0, 22.0, 23.0],
                vec![1.0; 4],
            ],
        )
        .unwrap()
    }

    /// Labels samples from a fixed list.
    struct Fixed(Vec<&'static str>);

    impl Classifier for Fixed {
        fn classify(&self, _dataset: &Dataset) -> Result<Vec<EyeMovement>> {
            Ok(self.0.iter().map(|s| s.parse().unwrap()).collect())
        }
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("FIX".parse::<EyeMovement>().unwrap(), EyeMovement::Fixation);
        assert_eq!(" SP ".parse::<EyeMovement>().unwrap(), EyeMovement::SmoothPursuit);
        assert_eq!(
            "NOISE".parse::<EyeMovement>().unwrap(),
            EyeMovement::Other("NOISE".to_string())
        );
        assert_eq!(EyeMovement::Saccade.to_string(), "SACCADE");
    }

    #[test]
    fn test_grouping() {
        let ds = dataset();
        let classifier = Fixed(vec!["FIX", "SACCADE", "NOISE", "FIX"]);
        let vt = [Some(0.0), Some(0.1), None, Some(0.3)];
        let summary = EventSummary::classify_with(&classifier, &ds, Some(&vt)).unwrap();

        assert_eq!(summary.fixations.len(), 2);
        assert_eq!(summary.saccades.len(), 1);
        assert!(summary.smooth_pursuits.is_empty());
        assert_eq!(summary.total.len(), 4);
        assert_eq!(summary.fixations[1].x, 13.0);
        assert_eq!(summary.fixations[1].video_time, Some(0.3));
        assert_eq!(summary.total[2].label, EyeMovement::Other("NOISE".to_string()));
    }

    #[test]
    fn test_label_count_mismatch() {
        let ds = dataset();
        let err = EventSummary::classify_with(&Fixed(vec!["FIX"]), &ds, None).unwrap_err();
        assert!(matches!(err, Error::LabelCount(1, 4)));
    }

    #[test]
    fn test_csv_output() {
        let ds = dataset();
        let labels: Vec<EyeMovement> = ["SP", "SP", "FIX", "SACCADE"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let summary = EventSummary::from_labels(&ds, &labels, None).unwrap();

        let mut buf = Vec::new();
        summary.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("videoTime,x,y,classification"));
        let first = lines.next().unwrap();
        assert!(first.starts_with(",10"), "{first}");
        assert!(first.ends_with(",SP"), "{first}");
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_classified_file_grouping() {
        let mut text = String::from("@RELATION gaze_labels\n");
        for name in ["time", "x", "y", "confidence"] {
            text.push_str(&format!("@ATTRIBUTE {name} NUMERIC\n"));
        }
        for width in [1, 2, 4, 8, 16] {
            for feature in ["speed", "direction", "acceleration"] {
                text.push_str(&format!("@ATTRIBUTE {feature}_{width} NUMERIC\n"));
            }
        }
        text.push_str("@ATTRIBUTE EYE_MOVEMENT_TYPE {UNKNOWN,FIX,SACCADE,SP,NOISE}\n@DATA\n");
        let features = vec!["0.5"; 15].join(",");
        for (i, label) in ["FIX", "FIX", "SACCADE", "SP", "NOISE"].iter().enumerate() {
            text.push_str(&format!("{},{},{},1,{features},{label}\n", i * 4000, 100 + i, 200 + i));
        }

        let vt = [Some(0.0), Some(0.004), Some(0.008), Some(0.012), Some(0.016)];
        let summary =
            EventSummary::from_classified_arff(&text, DEFAULT_LABEL_COLUMN, Some(&vt)).unwrap();

        assert_eq!(summary.fixations.len(), 2);
        assert_eq!(summary.saccades.len(), 1);
        assert_eq!(summary.smooth_pursuits.len(), 1);
        assert_eq!(summary.total.len(), 5);
        assert_eq!(summary.saccades[0].x, 102.0);
        assert_eq!(summary.smooth_pursuits[0].y, 203.0);
        assert_eq!(summary.smooth_pursuits[0].video_time, Some(0.012));
        assert_eq!(summary.total[4].label, EyeMovement::Other("NOISE".to_string()));
    }

    #[test]
    fn test_missing_label_column() {
        let text = "@ATTRIBUTE x numeric\n@ATTRIBUTE y numeric\n@DATA\n1,2\n";
        let err = EventSummary::from_classified_arff(text, DEFAULT_LABEL_COLUMN, None).unwrap_err();
        assert!(matches!(err, Error::MissingAttribute(name) if name == DEFAULT_LABEL_COLUMN));
    }
}
