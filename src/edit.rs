//! Ordered per-column edit directives: drop a column, drop its missing
//! rows, convert its type, or rename it. Directives run strictly in list
//! order over an owned copy of the dataset; the profiling core itself never
//! mutates anything.

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::EditArgs,
    dataset::{Cell, Column, Dataset, Storage},
    error::RequestError,
    io_utils,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertKind {
    Numeric,
    Datetime,
    Categorical,
    Binary,
}

impl ConvertKind {
    pub fn parse(value: &str) -> Result<Self, RequestError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "numeric" => Ok(ConvertKind::Numeric),
            "datetime" => Ok(ConvertKind::Datetime),
            "categorical" => Ok(ConvertKind::Categorical),
            "binary" => Ok(ConvertKind::Binary),
            other => Err(RequestError::invalid(format!(
                "unsupported conversion '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditDirective {
    Drop,
    DropNa,
    Convert(ConvertKind),
    Rename(String),
}

/// Applies the directives in order and returns the edited dataset.
pub fn apply_edits(
    dataset: &Dataset,
    directives: &[(String, EditDirective)],
) -> Result<Dataset, RequestError> {
    let mut columns = dataset.columns().to_vec();
    for (name, directive) in directives {
        let idx = columns
            .iter()
            .position(|c| c.name == *name)
            .ok_or_else(|| RequestError::ColumnNotFound(name.clone()))?;
        match directive {
            EditDirective::Drop => {
                columns.remove(idx);
            }
            EditDirective::DropNa => {
                let keep: Vec<bool> = columns[idx].cells.iter().map(|c| !c.is_null()).collect();
                for column in &mut columns {
                    let mut row = 0usize;
                    column.cells.retain(|_| {
                        let kept = keep[row];
                        row += 1;
                        kept
                    });
                }
            }
            EditDirective::Convert(kind) => {
                columns[idx] = convert_column(&columns[idx], *kind);
            }
            EditDirective::Rename(new_name) => {
                columns[idx].name = new_name.clone();
            }
        }
    }
    Dataset::from_columns(columns).map_err(|err| RequestError::invalid(err.to_string()))
}

fn convert_column(column: &Column, kind: ConvertKind) -> Column {
    let cells = column
        .cells
        .iter()
        .map(|cell| match kind {
            ConvertKind::Numeric => cell.to_numeric().map(Cell::Float).unwrap_or(Cell::Null),
            ConvertKind::Datetime => cell.to_stamp().map(Cell::Stamp).unwrap_or(Cell::Null),
            ConvertKind::Categorical => {
                if cell.is_null() {
                    Cell::Null
                } else {
                    Cell::Text(cell.display())
                }
            }
            // Missing values are falsy here on purpose, matching the
            // truthy-token contract: only true/1/yes map to one.
            ConvertKind::Binary => {
                let truthy = matches!(
                    cell.display().trim().to_ascii_lowercase().as_str(),
                    "true" | "1" | "yes"
                );
                Cell::Int(if truthy { 1 } else { 0 })
            }
        })
        .collect();
    let storage = match kind {
        ConvertKind::Numeric => Storage::Float,
        ConvertKind::Datetime => Storage::DateTime,
        ConvertKind::Categorical => Storage::Categorical,
        ConvertKind::Binary => Storage::Integer,
    };
    Column::new(column.name.clone(), storage, cells)
}

fn parse_pair<'a>(raw: &'a str, flag: &str) -> Result<(&'a str, &'a str), RequestError> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, value)| !name.is_empty() && !value.is_empty())
        .ok_or_else(|| {
            RequestError::invalid(format!("--{flag} expects 'column=value', got '{raw}'"))
        })
}

/// Assembles the directive list from CLI arguments: missing-row drops first,
/// then conversions and renames, column drops last.
pub fn directives_from_args(args: &EditArgs) -> Result<Vec<(String, EditDirective)>, RequestError> {
    let mut directives = Vec::new();
    for name in &args.dropna {
        directives.push((name.clone(), EditDirective::DropNa));
    }
    for raw in &args.convert {
        let (name, kind) = parse_pair(raw, "convert")?;
        directives.push((name.to_string(), EditDirective::Convert(ConvertKind::parse(kind)?)));
    }
    for raw in &args.rename {
        let (name, new_name) = parse_pair(raw, "rename")?;
        directives.push((name.to_string(), EditDirective::Rename(new_name.to_string())));
    }
    for name in &args.drop {
        directives.push((name.clone(), EditDirective::Drop));
    }
    Ok(directives)
}

pub fn execute(args: &EditArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let dataset = Dataset::from_csv_path(&args.input, delimiter, encoding, 0)
        .with_context(|| format!("Loading dataset from {:?}", args.input))?;

    let directives = directives_from_args(args)?;
    let edited = apply_edits(&dataset, &directives)?;

    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), delimiter)?;
    writer
        .write_record(edited.column_names())
        .context("Writing output header")?;
    for row in 0..edited.row_count() {
        let record = edited
            .columns()
            .iter()
            .map(|column| column.cells[row].display())
            .collect::<Vec<_>>();
        writer
            .write_record(&record)
            .with_context(|| format!("Writing output row {}", row + 1))?;
    }
    writer.flush().context("Flushing output")?;
    info!(
        "Applied {} edit directive(s); wrote {} row(s) across {} column(s)",
        directives.len(),
        edited.row_count(),
        edited.column_count()
    );
    Ok(())
}
