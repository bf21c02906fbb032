use std::path::Path;

use log::{debug, info, warn};
use serde::Deserialize;

use super::model::{Dataset, Schema, DEFAULT_RELATION, METADATA_PREFIX};
use crate::config::ScreenGeometry;
use crate::error::{Error, Result};

/// Relation name given to datasets imported from raw gaze CSV.
pub const GAZE_RELATION: &str = "gaze_labels";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a gaze dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.arff` – attribute/relation exchange format (see [`parse_arff`])
/// * `.csv`  – raw gaze export with `timestamp`, `x`, `y` columns, imported
///   with the default screen geometry
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "arff" => load_arff(path),
        "csv" => Ok(load_gaze_csv(path, &ScreenGeometry::default())?.dataset),
        other => Err(Error::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// ARFF loader
// ---------------------------------------------------------------------------

pub fn load_arff(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)?;
    let ds = parse_arff(&text)?;
    info!("loaded {} from {}", ds, path.display());
    Ok(ds)
}

/// Parse the text exchange format.
///
/// Layout:
///
/// ```text
/// % free-form comment
/// @RELATION gaze_labels
/// %@METADATA width_px 1280.0
/// @ATTRIBUTE time NUMERIC
/// @ATTRIBUTE x NUMERIC
/// @DATA
/// 0,512.5
/// ```
///
/// Directives are case-insensitive. `%` lines anywhere in the file are kept
/// as comments, except `%@METADATA` lines which are kept as metadata. Data
/// cells that do not parse as numbers become `NaN`; rows with fewer cells
/// than attributes are padded with `NaN`.
pub fn parse_arff(text: &str) -> Result<Dataset> {
    let mut relation: Option<String> = None;
    let mut metadata = Vec::new();
    let mut comments = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut in_data = false;
    let mut coerced = 0usize;

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim_end();
        let trimmed = line.trim_start();

        if trimmed.starts_with(METADATA_PREFIX) {
            metadata.push(line.to_string());
            continue;
        }
        if trimmed.starts_with('%') {
            comments.push(line.to_string());
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }

        if in_data {
            let cells: Vec<&str> = trimmed.split(',').collect();
            if cells.len() > names.len() {
                return Err(Error::MalformedRow {
                    line: line_no + 1,
                    cells: cells.len(),
                    attributes: names.len(),
                });
            }
            let mut row = Vec::with_capacity(names.len());
            for cell in cells {
                let value = parse_cell(cell);
                if value.is_nan() && !is_missing_marker(cell) {
                    coerced += 1;
                }
                row.push(value);
            }
            row.resize(names.len(), f64::NAN);
            rows.push(row);
            continue;
        }

        match directive(trimmed) {
            Some((kw, rest)) if kw == "RELATION" => {
                if relation.is_none() {
                    relation = rest.split_whitespace().last().map(str::to_string);
                }
            }
            Some((kw, rest)) if kw == "ATTRIBUTE" => match rest.split_whitespace().next() {
                Some(name) => names.push(name.to_string()),
                None => warn!("line {}: @ATTRIBUTE without a name, ignored", line_no + 1),
            },
            Some((kw, _)) if kw == "DATA" => in_data = true,
            _ => debug!("line {}: ignoring '{}'", line_no + 1, trimmed),
        }
    }

    if !in_data {
        return Err(Error::MissingDataMarker);
    }
    if coerced > 0 {
        warn!("{coerced} non-numeric cells coerced to missing");
    }

    let schema = Schema::from_names(names)?;
    let columns = transpose(rows, schema.len());
    let mut ds = Dataset::from_columns(
        relation.unwrap_or_else(|| DEFAULT_RELATION.to_string()),
        schema,
        columns,
    )?;
    ds.metadata = metadata;
    ds.comments = comments;
    Ok(ds)
}

/// Raw text cells of one named column, one per data row.
///
/// [`parse_arff`] coerces nominal cells such as classifier labels to `NaN`;
/// this reads them verbatim instead, with surrounding quotes removed. Cells
/// missing from short rows are returned as empty strings.
pub fn parse_text_column(text: &str, column: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    let mut index: Option<usize> = None;
    let mut cells_out = Vec::new();
    let mut in_data = false;

    for (line_no, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }

        if in_data {
            let cells: Vec<&str> = trimmed.split(',').collect();
            if cells.len() > names.len() {
                return Err(Error::MalformedRow {
                    line: line_no + 1,
                    cells: cells.len(),
                    attributes: names.len(),
                });
            }
            let cell = index.and_then(|i| cells.get(i)).map_or("", |c| c.trim());
            cells_out.push(cell.trim_matches(|c| c == '\'' || c == '"').to_string());
            continue;
        }

        match directive(trimmed) {
            Some((kw, rest)) if kw == "ATTRIBUTE" => {
                if let Some(name) = rest.split_whitespace().next() {
                    names.push(name.to_string());
                }
            }
            Some((kw, _)) if kw == "DATA" => {
                in_data = true;
                index = names.iter().position(|n| n == column);
                if index.is_none() {
                    return Err(Error::MissingAttribute(column.to_string()));
                }
            }
            _ => {}
        }
    }

    if !in_data {
        return Err(Error::MissingDataMarker);
    }
    Ok(cells_out)
}

/// Split `@KEYWORD rest` into an upper-cased keyword and the trimmed rest.
fn directive(line: &str) -> Option<(String, &str)> {
    let body = line.strip_prefix('@')?;
    let (kw, rest) = body
        .split_once(char::is_whitespace)
        .unwrap_or((body, ""));
    Some((kw.to_ascii_uppercase(), rest.trim()))
}

fn parse_cell(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn is_missing_marker(cell: &str) -> bool {
    let cell = cell.trim();
    cell == "?" || cell.is_empty() || cell.eq_ignore_ascii_case("nan")
}

fn transpose(rows: Vec<Vec<f64>>, width: usize) -> Vec<Vec<f64>> {
    let mut columns: Vec<Vec<f64>> = (0..width).map(|_| Vec::with_capacity(rows.len())).collect();
    for row in rows {
        for (col, value) in columns.iter_mut().zip(row) {
            col.push(value);
        }
    }
    columns
}

// ---------------------------------------------------------------------------
// Raw gaze CSV import
// ---------------------------------------------------------------------------

/// One row of a raw gaze export.
#[derive(Debug, Deserialize)]
struct GazeRecord {
    /// Milliseconds.
    timestamp: f64,
    x: f64,
    y: f64,
    #[serde(rename = "videoTime", default)]
    video_time: Option<f64>,
}

/// A raw gaze export converted to a dataset, plus the per-sample video
/// times needed to line results back up with the stimulus.
#[derive(Debug, Clone)]
pub struct GazeRecording {
    pub dataset: Dataset,
    pub video_times: Vec<Option<f64>>,
}

/// CSV layout: header row with at least `timestamp` (ms), `x`, `y`, and an
/// optional `videoTime` column.
///
/// The dataset gets `time` in microseconds, `x`, `y`, and a constant
/// `confidence` of 1, with the screen geometry recorded as metadata.
pub fn load_gaze_csv(path: &Path, screen: &ScreenGeometry) -> Result<GazeRecording> {
    let reader = csv::Reader::from_path(path)?;
    let recording = read_gaze_csv(reader, screen)?;
    info!(
        "imported {} gaze samples from {}",
        recording.dataset.len(),
        path.display()
    );
    Ok(recording)
}

pub fn read_gaze_csv<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    screen: &ScreenGeometry,
) -> Result<GazeRecording> {
    let mut time = Vec::new();
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut video_times = Vec::new();

    for result in reader.deserialize() {
        let record: GazeRecord = result?;
        time.push(record.timestamp * 1000.0);
        x.push(record.x);
        y.push(record.y);
        video_times.push(record.video_time);
    }

    let confidence = vec![1.0; time.len()];
    let mut dataset = Dataset::new(GAZE_RELATION);
    dataset.append_column("time", time)?;
    dataset.append_column("x", x)?;
    dataset.append_column("y", y)?;
    dataset.append_column("confidence", confidence)?;
    dataset.metadata = screen.metadata_lines();

    Ok(GazeRecording {
        dataset,
        video_times,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
% recorded with tracker v2
@RELATION gaze_labels

%@METADATA width_px 1280.0
%@METADATA height_px 720.0

@ATTRIBUTE time NUMERIC
@ATTRIBUTE x NUMERIC
@ATTRIBUTE y NUMERIC
@ATTRIBUTE confidence NUMERIC
@DATA
0,10.5,20,1
4000,11,abc,0.5
8000,12
";

    #[test]
    fn test_parse_sections() {
        let ds = parse_arff(SAMPLE).unwrap();
        assert_eq!(ds.relation, "gaze_labels");
        assert_eq!(ds.comments, vec!["% recorded with tracker v2"]);
        assert_eq!(
            ds.metadata,
            vec!["%@METADATA width_px 1280.0", "%@METADATA height_px 720.0"]
        );
        assert_eq!(ds.schema().names(), &["time", "x", "y", "confidence"]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column("time").unwrap(), &[0.0, 4000.0, 8000.0]);
    }

    #[test]
    fn test_non_numeric_cells_become_missing() {
        let ds = parse_arff(SAMPLE).unwrap();
        let y = ds.column("y").unwrap();
        assert_eq!(y[0], 20.0);
        assert!(y[1].is_nan());
        // short row padded
        assert!(y[2].is_nan());
        assert!(ds.column("confidence").unwrap()[2].is_nan());
    }

    #[test]
    fn test_missing_data_marker() {
        let text = "@RELATION r\n@ATTRIBUTE time numeric\n0\n";
        assert!(matches!(parse_arff(text), Err(Error::MissingDataMarker)));
    }

    #[test]
    fn test_relation_defaults() {
        let ds = parse_arff("@attribute time numeric\n@data\n1\n").unwrap();
        assert_eq!(ds.relation, DEFAULT_RELATION);
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn test_row_with_extra_cells() {
        let text = "@ATTRIBUTE time numeric\n@DATA\n1,2\n";
        assert!(matches!(
            parse_arff(text),
            Err(Error::MalformedRow { line: 3, cells: 2, attributes: 1 })
        ));
    }

    #[test]
    fn test_duplicate_attribute() {
        let text = "@ATTRIBUTE x numeric\n@ATTRIBUTE x numeric\n@DATA\n";
        assert!(matches!(parse_arff(text), Err(Error::DuplicateColumn(_))));
    }

    #[test]
    fn test_nominal_label_column() {
        let text = "\
@ATTRIBUTE time numeric
@ATTRIBUTE EYE_MOVEMENT_TYPE {UNKNOWN,FIX,SACCADE,SP,NOISE}
@DATA
0,FIX
";
        let ds = parse_arff(text).unwrap();
        assert_eq!(ds.schema().index_of("EYE_MOVEMENT_TYPE"), Some(1));
        assert!(ds.column("EYE_MOVEMENT_TYPE").unwrap()[0].is_nan());
    }

    #[test]
    fn test_text_column_kept_verbatim() {
        let text = "\
@ATTRIBUTE time numeric
@ATTRIBUTE label {FIX,SP}
@ATTRIBUTE x numeric
@DATA
0,FIX,1
% interleaved comment
1,'SP',2
2
";
        let labels = parse_text_column(text, "label").unwrap();
        assert_eq!(labels, vec!["FIX", "SP", ""]);

        assert!(matches!(
            parse_text_column(text, "classification"),
            Err(Error::MissingAttribute(name)) if name == "classification"
        ));
        assert!(matches!(
            parse_text_column("@ATTRIBUTE label string\n", "label"),
            Err(Error::MissingDataMarker)
        ));
    }

    #[test]
    fn test_read_gaze_csv() {
        let csv_text = "timestamp,x,y,videoTime\n0,100,200,0.0\n16.5,101,202,0.033\n";
        let reader = csv::Reader::from_reader(csv_text.as_bytes());
        let rec = read_gaze_csv(reader, &ScreenGeometry::default()).unwrap();

        assert_eq!(rec.dataset.relation, GAZE_RELATION);
        assert_eq!(rec.dataset.column("time").unwrap(), &[0.0, 16500.0]);
        assert_eq!(rec.dataset.column("confidence").unwrap(), &[1.0, 1.0]);
        assert_eq!(rec.video_times, vec![Some(0.0), Some(0.033)]);
        assert_eq!(rec.dataset.metadata[0], "%@METADATA width_px 1280.0");
        assert_eq!(rec.dataset.metadata.len(), 5);
    }

    #[test]
    fn test_read_gaze_csv_without_video_time() {
        let csv_text = "timestamp,x,y\n1,2,3\n";
        let reader = csv::Reader::from_reader(csv_text.as_bytes());
        let rec = read_gaze_csv(reader, &ScreenGeometry::default()).unwrap();
        assert_eq!(rec.video_times, vec![None]);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("recording.parquet")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ext) if ext == "parquet"));
    }
}
