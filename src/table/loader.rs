//! CSV loading with per-column type inference.

use std::fs::File;
use std::io;
use std::path::Path;

use tracing::debug;

use super::value::Value;
use super::{Column, Table};
use crate::error::Result;

/// Cells read as missing values.
const NULL_TOKENS: [&str; 2] = ["", "NA"];

/// Read a CSV file with a header row.
///
/// # Errors
///
/// Returns [`crate::Error::Io`] if the file cannot be opened and
/// [`crate::Error::Csv`] for malformed input.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let table = Table::from_csv_reader(File::open(path)?)?;
    debug!(path = %path.display(), rows = table.nrow(), cols = table.ncol(), "read_csv");
    Ok(table)
}

impl Table {
    /// Parse CSV with a header row from any reader.
    ///
    /// A column is `Int` if every present cell parses as an integer, else
    /// `Float` if every cell parses as a number, else `Bool` if every cell is
    /// `true`/`false`, else `Text`. Empty cells and `NA` are missing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Csv`] for malformed input and
    /// [`crate::Error::DuplicateColumn`] for repeated headers.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers: Vec<String> = reader.headers()?.iter().map(ToString::to_string).collect();

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record?;
            for (column, field) in cells.iter_mut().zip(record.iter()) {
                column.push(field.to_string());
            }
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, raw)| Column::new(name, infer(&raw)))
            .collect::<Result<Vec<_>>>()?;
        Table::new(columns)
    }

    /// Parse CSV text with a header row.
    ///
    /// # Errors
    ///
    /// As [`Table::from_csv_reader`].
    pub fn from_csv_str(text: &str) -> Result<Table> {
        Table::from_csv_reader(text.as_bytes())
    }
}

fn infer(raw: &[String]) -> Vec<Value> {
    let present = || raw.iter().filter(|s| !NULL_TOKENS.contains(&s.as_str()));
    let parse_all = |parse: &dyn Fn(&str) -> Option<Value>| -> Option<Vec<Value>> {
        if present().any(|s| parse(s).is_none()) {
            return None;
        }
        Some(
            raw.iter()
                .map(|s| {
                    if NULL_TOKENS.contains(&s.as_str()) {
                        Value::Null
                    } else {
                        parse(s).unwrap_or_default()
                    }
                })
                .collect(),
        )
    };

    parse_all(&|s| s.parse::<i64>().ok().map(Value::Int))
        .or_else(|| parse_all(&|s| s.parse::<f64>().ok().map(Value::Float)))
        .or_else(|| parse_all(&|s| s.parse::<bool>().ok().map(Value::Bool)))
        .unwrap_or_else(|| {
            raw.iter()
                .map(|s| {
                    if NULL_TOKENS.contains(&s.as_str()) {
                        Value::Null
                    } else {
                        Value::Text(s.clone())
                    }
                })
                .collect()
        })
}
