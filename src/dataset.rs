//! In-memory tabular model: typed cells, columns with a declared storage
//! type, and the rectangular dataset the profiling core consumes.
//!
//! Storage types are inferred at load the way a dataframe loader would:
//! a column where every non-missing field parses as an integer is `Integer`,
//! every field as a float is `Float`, anything else is `Text`. `Categorical`
//! and `DateTime` storage only arise through explicit conversion directives.

use std::{collections::HashSet, fmt, path::Path};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDateTime;
use encoding_rs::Encoding;
use log::debug;

use crate::{data, io_utils};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Integer,
    Float,
    Text,
    Categorical,
    DateTime,
}

impl Storage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Storage::Integer => "integer",
            Storage::Float => "float",
            Storage::Text => "text",
            Storage::Categorical => "categorical",
            Storage::DateTime => "datetime",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Storage::Integer | Storage::Float)
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, Storage::Text | Storage::Categorical)
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Stamp(NaiveDateTime),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Display form; missing cells render as the empty string.
    pub fn display(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => {
                if f.fract() == 0.0 {
                    format!("{f:.0}")
                } else {
                    f.to_string()
                }
            }
            Cell::Text(s) => s.clone(),
            Cell::Stamp(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Lenient numeric coercion: numbers pass through, text is parsed,
    /// everything else fails.
    pub fn to_numeric(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::Text(s) => data::parse_numeric(s),
            Cell::Null | Cell::Stamp(_) => None,
        }
    }

    pub fn to_stamp(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Stamp(dt) => Some(*dt),
            Cell::Text(s) => data::parse_stamp(s),
            Cell::Null | Cell::Int(_) | Cell::Float(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub storage: Storage,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, storage: Storage, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            storage,
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_null()).count()
    }

    /// Display keys of all non-missing cells, in row order.
    pub fn non_null_keys(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .iter()
            .filter(|c| !c.is_null())
            .map(Cell::display)
    }

    /// Number of distinct non-missing values.
    pub fn unique_count(&self) -> usize {
        self.non_null_keys().collect::<HashSet<_>>().len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Builds a dataset from columns, validating rectangularity.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let rows = first.len();
            for column in &columns {
                if column.len() != rows {
                    return Err(anyhow!(
                        "Column '{}' has {} row(s) but '{}' has {}",
                        column.name,
                        column.len(),
                        first.name,
                        rows
                    ));
                }
            }
        }
        Ok(Self { columns })
    }

    pub fn from_csv_path(
        path: &Path,
        delimiter: u8,
        encoding: &'static Encoding,
        limit: usize,
    ) -> Result<Self> {
        let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
        let headers = io_utils::reader_headers(&mut reader, encoding)?;

        let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for (row_idx, record) in reader.byte_records().enumerate() {
            if limit > 0 && row_idx >= limit {
                break;
            }
            let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
            let decoded = io_utils::decode_record(&record, encoding)?;
            if decoded.len() != headers.len() {
                return Err(anyhow!(
                    "Row {} has {} field(s) but the header has {}",
                    row_idx + 2,
                    decoded.len(),
                    headers.len()
                ));
            }
            for (idx, field) in decoded.into_iter().enumerate() {
                raw[idx].push(field);
            }
        }

        let columns = headers
            .into_iter()
            .zip(raw)
            .map(|(name, fields)| build_column(name, fields))
            .collect::<Vec<_>>();
        for column in &columns {
            debug!(
                "Loaded column '{}' as {} ({} rows)",
                column.name,
                column.storage,
                column.len()
            );
        }
        Self::from_columns(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }
}

fn build_column(name: String, fields: Vec<String>) -> Column {
    let mut non_empty = 0usize;
    let mut all_int = true;
    let mut all_float = true;
    for field in &fields {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            continue;
        }
        non_empty += 1;
        if all_int && trimmed.parse::<i64>().is_err() {
            all_int = false;
        }
        if all_float && data::parse_numeric(trimmed).is_none() {
            all_float = false;
        }
        if !all_int && !all_float {
            break;
        }
    }

    let storage = if non_empty == 0 {
        Storage::Text
    } else if all_int {
        Storage::Integer
    } else if all_float {
        Storage::Float
    } else {
        Storage::Text
    };

    let cells = fields
        .into_iter()
        .map(|field| match storage {
            Storage::Integer => field
                .trim()
                .parse::<i64>()
                .map(Cell::Int)
                .unwrap_or(Cell::Null),
            Storage::Float => data::parse_numeric(&field)
                .map(Cell::Float)
                .unwrap_or(Cell::Null),
            // Text keeps the raw field, whitespace included, so missing
            // tokens like a lone space stay observable downstream.
            _ => {
                if field.is_empty() {
                    Cell::Null
                } else {
                    Cell::Text(field)
                }
            }
        })
        .collect();

    Column::new(name, storage, cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_from(fields: &[&str]) -> Column {
        build_column(
            "col".to_string(),
            fields.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn storage_inference_prefers_integer_then_float_then_text() {
        assert_eq!(column_from(&["1", "2", "3"]).storage, Storage::Integer);
        assert_eq!(column_from(&["1", "2.5", "3"]).storage, Storage::Float);
        assert_eq!(column_from(&["1", "x", "3"]).storage, Storage::Text);
        assert_eq!(column_from(&["", ""]).storage, Storage::Text);
    }

    #[test]
    fn empty_fields_become_nulls() {
        let column = column_from(&["1", "", "3"]);
        assert_eq!(column.storage, Storage::Integer);
        assert_eq!(column.cells[1], Cell::Null);
        assert_eq!(column.null_count(), 1);
    }

    #[test]
    fn unique_count_ignores_missing_cells() {
        let column = column_from(&["a", "b", "a", ""]);
        assert_eq!(column.unique_count(), 2);
    }

    #[test]
    fn from_columns_rejects_ragged_data() {
        let a = Column::new("a", Storage::Integer, vec![Cell::Int(1)]);
        let b = Column::new("b", Storage::Integer, vec![Cell::Int(1), Cell::Int(2)]);
        assert!(Dataset::from_columns(vec![a, b]).is_err());
    }
}
