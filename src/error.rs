use thiserror::Error;

/// Errors raised while loading, validating or enriching a gaze dataset.
///
/// Degenerate samples (low confidence, coincident window bounds, zero elapsed
/// time) are never errors; they produce zero-valued features instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing @DATA section")]
    MissingDataMarker,

    #[error("no @ATTRIBUTE declared for column '{0}'")]
    MissingAttribute(String),

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("column '{name}' has {actual} values but the dataset has {expected} rows")]
    ColumnLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("line {line}: {cells} cells but only {attributes} attributes declared")]
    MalformedRow {
        line: usize,
        cells: usize,
        attributes: usize,
    },

    #[error("{0} labels for {1} samples")]
    LabelCount(usize, usize),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
