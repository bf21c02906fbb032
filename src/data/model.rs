use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// Relation name used when a file carries no `@RELATION` line.
pub const DEFAULT_RELATION: &str = "gaze_data";

/// Prefix of the reserved comment lines that are kept as metadata.
pub const METADATA_PREFIX: &str = "%@METADATA";

// ---------------------------------------------------------------------------
// Schema – ordered attribute map
// ---------------------------------------------------------------------------

/// Ordered mapping from column name to physical column index.
///
/// Indices are contiguous from zero and assigned in insertion order. The only
/// way to grow a schema is [`Schema::append`], which rejects duplicate names.
/// `version` counts appends, so callers holding an index can tell whether the
/// layout changed underneath them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    names: Vec<String>,
    index: HashMap<String, usize>,
    version: u64,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from declared attribute names, in order.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Schema::new();
        for name in names {
            schema.append(name)?;
        }
        Ok(schema)
    }

    /// Register a new column and return its index.
    pub fn append(&mut self, name: impl Into<String>) -> Result<usize> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(Error::DuplicateColumn(name));
        }
        let idx = self.names.len();
        self.index.insert(name.clone(), idx);
        self.names.push(name);
        self.version += 1;
        Ok(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Like [`Schema::index_of`] but a missing column is a malformed-input error.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .ok_or_else(|| Error::MissingAttribute(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Column names in physical order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

// ---------------------------------------------------------------------------
// Sample – one row seen through the kinematic columns
// ---------------------------------------------------------------------------

/// The logical fields of one recorded gaze sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Timestamp in microseconds.
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// Dataset – column storage plus header sections
// ---------------------------------------------------------------------------

/// A loaded recording: header sections plus numeric columns.
///
/// Missing or non-numeric cells are stored as `NaN`.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub relation: String,
    /// `%@METADATA` lines, verbatim.
    pub metadata: Vec<String>,
    /// Free-form `%` comment lines, verbatim.
    pub comments: Vec<String>,
    schema: Schema,
    columns: Vec<Vec<f64>>,
    rows: usize,
}

impl Dataset {
    /// An empty dataset with no columns and no rows.
    pub fn new(relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            metadata: Vec::new(),
            comments: Vec::new(),
            schema: Schema::new(),
            columns: Vec::new(),
            rows: 0,
        }
    }

    /// Assemble a dataset from a schema and one value vector per column.
    pub fn from_columns(
        relation: impl Into<String>,
        schema: Schema,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let rows = columns.first().map_or(0, Vec::len);
        if columns.len() != schema.len() {
            return Err(Error::ColumnLength {
                name: "<schema>".to_string(),
                expected: schema.len(),
                actual: columns.len(),
            });
        }
        for (name, col) in schema.names().iter().zip(&columns) {
            if col.len() != rows {
                return Err(Error::ColumnLength {
                    name: name.clone(),
                    expected: rows,
                    actual: col.len(),
                });
            }
        }
        let mut ds = Dataset::new(relation);
        ds.schema = schema;
        ds.columns = columns;
        ds.rows = rows;
        Ok(ds)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of samples (rows).
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Values of a named column.
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        let idx = self.schema.require(name)?;
        Ok(&self.columns[idx])
    }

    pub fn column_at(&self, idx: usize) -> Option<&[f64]> {
        self.columns.get(idx).map(Vec::as_slice)
    }

    /// Append a new column at the next free index.
    ///
    /// The first column of an empty dataset fixes the row count.
    pub fn append_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<usize> {
        let name = name.into();
        if self.columns.is_empty() {
            self.rows = values.len();
        }
        self.check_length(&name, &values)?;
        let idx = self.schema.append(name)?;
        self.columns.push(values);
        Ok(idx)
    }

    /// Replace the values of an existing column, keeping its index.
    pub fn replace_column(&mut self, name: &str, values: Vec<f64>) -> Result<usize> {
        let idx = self.schema.require(name)?;
        self.check_length(name, &values)?;
        self.columns[idx] = values;
        Ok(idx)
    }

    /// Iterate over one row's cells in column order.
    pub fn row(&self, i: usize) -> impl Iterator<Item = f64> + '_ {
        self.columns.iter().map(move |col| col[i])
    }

    /// View every row through the `time`, `x`, `y`, `confidence` columns.
    pub fn samples(&self) -> Result<Vec<Sample>> {
        let time = self.column("time")?;
        let x = self.column("x")?;
        let y = self.column("y")?;
        let confidence = self.column("confidence")?;
        Ok((0..self.rows)
            .map(|i| Sample {
                time: time[i],
                x: x[i],
                y: y[i],
                confidence: confidence[i],
            })
            .collect())
    }

    fn check_length(&self, name: &str, values: &[f64]) -> Result<()> {
        if values.len() != self.rows {
            return Err(Error::ColumnLength {
                name: name.to_string(),
                expected: self.rows,
                actual: values.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} samples, {} columns)",
            self.relation,
            self.rows,
            self.columns.len()
        )
    }
}
