//! Tabular input: CSV exports whose columns carry meaning only by position.

use crate::error::{PrepError, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// One row of a tabular export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow(Vec<String>);

impl RawRow {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self(fields.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First field, used to identify the row in error messages.
    pub fn key(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or("")
    }

    /// Data rows start with a numeric id and have at least one more field.
    /// Everything else is a header, a type row or noise.
    pub fn is_record(&self) -> bool {
        let first = self.key();
        self.len() >= 2 && !first.is_empty() && first.chars().all(|c| c.is_ascii_digit())
    }

    pub fn text(&self, column: usize, field: &'static str) -> Result<&str> {
        self.0
            .get(column)
            .map(String::as_str)
            .ok_or_else(|| self.schema_error(column, field, format!("is missing ({} fields)", self.len())))
    }

    pub fn number<T: FromStr>(&self, column: usize, field: &'static str) -> Result<T> {
        let raw = self.text(column, field)?;
        raw.trim()
            .parse()
            .map_err(|_| self.schema_error(column, field, format!("is not an integer: {:?}", raw)))
    }

    /// Exact string equality against the truthy literal.
    pub fn flag(&self, column: usize, field: &'static str, truthy: &str) -> Result<bool> {
        Ok(self.text(column, field)? == truthy)
    }

    fn schema_error(&self, column: usize, field: &'static str, problem: String) -> PrepError {
        PrepError::Schema {
            row_id: self.key().to_string(),
            column,
            field,
            problem,
        }
    }
}

impl From<&csv::StringRecord> for RawRow {
    fn from(record: &csv::StringRecord) -> Self {
        RawRow::new(record.iter())
    }
}

/// Read rows lazily from any CSV stream.
///
/// `skip_leading` rows are dropped unconditionally; after that only rows that
/// pass [`RawRow::is_record`] are yielded. Decoding errors are returned as
/// items and end the run.
pub fn read_rows<R: Read>(reader: R, skip_leading: usize) -> impl Iterator<Item = Result<RawRow>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
        .into_records()
        .skip(skip_leading)
        .filter_map(|record| match record {
            Ok(record) => {
                let row = RawRow::from(&record);
                row.is_record().then_some(Ok(row))
            }
            Err(e) => Some(Err(PrepError::from(e))),
        })
}

#[derive(Debug, Clone)]
pub struct TabularImporter {
    path: PathBuf,
    skip_leading: usize,
}

impl TabularImporter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            skip_leading: 0,
        }
    }

    pub fn skip_leading(mut self, rows: usize) -> Self {
        self.skip_leading = rows;
        self
    }

    pub fn rows(&self) -> Result<impl Iterator<Item = Result<RawRow>>> {
        let file = File::open(&self.path).map_err(|source| PrepError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(read_rows(file, self.skip_leading))
    }
}
