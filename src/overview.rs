//! Dataset-level summarization: shape, duplicate rows, and row/column
//! missingness severity.

use std::collections::HashSet;

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::{OutputFormat, OverviewArgs},
    dataset::{Cell, Dataset},
    io_utils,
    summary::{Fact, Summary},
    table,
};

/// Row missing-share bands reported in the overview, as fractions of the
/// column count.
const MISSING_BANDS: &[(&str, f64)] = &[
    (">10% Values Missing", 0.10),
    (">25% Values Missing", 0.25),
    (">50% Values Missing", 0.50),
];

/// Number of columns reported in the most-missing ranking.
const TOP_MISSING_COLUMNS: usize = 5;

/// Builds the dataset-level summary.
pub fn profile_dataset(dataset: &Dataset) -> Summary {
    let mut summary = Summary::new();
    let rows = dataset.row_count();
    let cols = dataset.column_count();

    summary.set(
        "Column Names",
        Fact::text(dataset.column_names().join(", ")),
    );
    summary.set("Number of Columns", Fact::Count(cols));
    summary.set("Number of Rows", Fact::Count(rows));
    summary.set(
        "Number of Duplicate Rows",
        Fact::Count(duplicate_row_count(dataset)),
    );

    let mut band_counts = vec![0usize; MISSING_BANDS.len()];
    for row in 0..rows {
        let missing = dataset
            .columns()
            .iter()
            .filter(|column| column.cells[row].is_null())
            .count() as f64;
        for (idx, (_, fraction)) in MISSING_BANDS.iter().enumerate() {
            if missing > cols as f64 * fraction {
                band_counts[idx] += 1;
            }
        }
    }
    let band_entries = MISSING_BANDS
        .iter()
        .zip(&band_counts)
        .filter(|(_, count)| **count > 0)
        .map(|((label, _), count)| (label.to_string(), count.to_string()))
        .collect::<Vec<_>>();
    if !band_entries.is_empty() {
        let severe = band_counts[1] > 0 || band_counts[2] > 0;
        summary.set("Number of Rows with Missing Values (%)", Fact::Map(band_entries));
        if severe {
            summary.set(
                "Recommendation",
                Fact::text("Consider dropping rows with large amounts of missing values"),
            );
        }
    }

    let mut most_missing = dataset
        .columns()
        .iter()
        .map(|column| (column.name.clone(), column.null_count()))
        .collect::<Vec<_>>();
    most_missing.sort_by(|a, b| b.1.cmp(&a.1));
    let top = most_missing
        .into_iter()
        .take(TOP_MISSING_COLUMNS)
        .filter(|(_, count)| *count > 0)
        .map(|(name, count)| (name, count.to_string()))
        .collect::<Vec<_>>();
    if !top.is_empty() {
        summary.set("Columns with Most Missing Values", Fact::Map(top));
    }

    summary
}

/// Count of rows that exactly duplicate an earlier row across all columns.
/// Invariant under column reordering.
fn duplicate_row_count(dataset: &Dataset) -> usize {
    let rows = dataset.row_count();
    let mut sorted_columns = dataset.columns().iter().collect::<Vec<_>>();
    sorted_columns.sort_by(|a, b| a.name.cmp(&b.name));

    let mut seen: HashSet<String> = HashSet::with_capacity(rows);
    let mut duplicates = 0usize;
    for row in 0..rows {
        let key = sorted_columns
            .iter()
            .map(|column| match &column.cells[row] {
                Cell::Null => "\u{0}".to_string(),
                cell => cell.display(),
            })
            .collect::<Vec<_>>()
            .join("\u{1f}");
        if !seen.insert(key) {
            duplicates += 1;
        }
    }
    duplicates
}

pub fn execute(args: &OverviewArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let dataset = Dataset::from_csv_path(&args.input, delimiter, encoding, args.limit)
        .with_context(|| format!("Loading dataset from {:?}", args.input))?;

    let summary = profile_dataset(&dataset);
    match args.format {
        OutputFormat::Table => table::print_summary(&summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    info!(
        "Summarized dataset with {} row(s) across {} column(s)",
        dataset.row_count(),
        dataset.column_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Storage};

    fn dataset(columns: Vec<(&str, Vec<Cell>)>) -> Dataset {
        Dataset::from_columns(
            columns
                .into_iter()
                .map(|(name, cells)| Column::new(name, Storage::Text, cells))
                .collect(),
        )
        .unwrap()
    }

    fn text(value: &str) -> Cell {
        Cell::Text(value.to_string())
    }

    #[test]
    fn duplicate_count_is_invariant_under_column_reordering() {
        let a = vec![text("x"), text("x"), text("y")];
        let b = vec![text("1"), text("1"), text("2")];
        let forward = dataset(vec![("a", a.clone()), ("b", b.clone())]);
        let reversed = dataset(vec![("b", b), ("a", a)]);
        assert_eq!(duplicate_row_count(&forward), 1);
        assert_eq!(duplicate_row_count(&reversed), 1);
    }

    #[test]
    fn altering_a_row_changes_the_duplicate_count() {
        let altered = dataset(vec![
            ("a", vec![text("x"), text("x"), text("y")]),
            ("b", vec![text("1"), text("3"), text("2")]),
        ]);
        assert_eq!(duplicate_row_count(&altered), 0);
    }

    #[test]
    fn missing_bands_and_ranking_only_include_nonzero_entries() {
        let ds = dataset(vec![
            ("a", vec![Cell::Null, text("1"), Cell::Null, text("2")]),
            ("b", vec![Cell::Null, text("x"), text("y"), text("z")]),
            ("c", vec![text("p"), text("q"), text("r"), text("s")]),
        ]);
        let summary = profile_dataset(&ds);
        match summary.get("Number of Rows with Missing Values (%)") {
            Some(Fact::Map(entries)) => {
                // Row 0 misses 2 of 3 columns, row 2 misses 1 of 3.
                assert_eq!(
                    entries,
                    &vec![
                        (">10% Values Missing".to_string(), "2".to_string()),
                        (">25% Values Missing".to_string(), "2".to_string()),
                        (">50% Values Missing".to_string(), "1".to_string()),
                    ]
                );
            }
            other => panic!("expected band map, got {other:?}"),
        }
        assert!(summary.get("Recommendation").is_some());
        match summary.get("Columns with Most Missing Values") {
            Some(Fact::Map(entries)) => {
                assert_eq!(
                    entries,
                    &vec![
                        ("a".to_string(), "2".to_string()),
                        ("b".to_string(), "1".to_string()),
                    ]
                );
            }
            other => panic!("expected ranking map, got {other:?}"),
        }
    }

    #[test]
    fn clean_dataset_has_no_missing_facts() {
        let ds = dataset(vec![("a", vec![text("1"), text("2")])]);
        let summary = profile_dataset(&ds);
        assert!(summary.get("Number of Rows with Missing Values (%)").is_none());
        assert!(summary.get("Columns with Most Missing Values").is_none());
        assert!(summary.get("Recommendation").is_none());
    }
}
