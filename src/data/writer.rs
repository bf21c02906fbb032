use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use super::model::Dataset;
use crate::error::Result;

/// Serialize a dataset in the exchange format.
///
/// Order: comments, `@RELATION`, metadata, one `@ATTRIBUTE <name> numeric`
/// per column, `@DATA`, then one comma-joined line per sample. Missing
/// values are written as `?`.
pub fn write_arff<W: Write>(mut out: W, ds: &Dataset) -> std::io::Result<()> {
    for comment in &ds.comments {
        writeln!(out, "{comment}")?;
    }
    writeln!(out, "@RELATION {}", ds.relation)?;
    writeln!(out)?;
    for meta in &ds.metadata {
        writeln!(out, "{meta}")?;
    }
    for name in ds.schema().names() {
        writeln!(out, "@ATTRIBUTE {name} numeric")?;
    }
    writeln!(out)?;
    writeln!(out, "@DATA")?;

    let mut line = String::new();
    for i in 0..ds.len() {
        line.clear();
        for (j, value) in ds.row(i).enumerate() {
            if j > 0 {
                line.push(',');
            }
            push_cell(&mut line, value);
        }
        writeln!(out, "{line}")?;
    }
    out.flush()
}

pub fn to_arff_string(ds: &Dataset) -> std::io::Result<String> {
    let mut buf = Vec::new();
    write_arff(&mut buf, ds)?;
    String::from_utf8(buf).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

pub fn save_arff(path: &Path, ds: &Dataset) -> Result<()> {
    let file = File::create(path)?;
    write_arff(BufWriter::new(file), ds)?;
    info!("wrote {} to {}", ds, path.display());
    Ok(())
}

fn push_cell(line: &mut String, value: f64) {
    if value.is_nan() {
        line.push('?');
    } else {
        line.push_str(&value.to_string());
    }
}
