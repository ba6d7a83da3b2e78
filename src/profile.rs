//! Column classification and the per-column profiling contract.
//!
//! Classification walks a fixed precedence chain. Constant and binary
//! columns short-circuit; an index column (every value unique) records its
//! recommendation and still falls through to the numeric, categorical, and
//! datetime checks, so a unique numeric column also gets numeric statistics.
//! A column can therefore accumulate facts from more than one summarizer;
//! the recommendation reflects the last rule that fired, and the datetime
//! rule re-inserts its recommendation at the end so it wins both ways.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{
    cli::{OutputFormat, ProfileArgs},
    data::{format_number, normalize_column_name, round_to},
    dataset::{Cell, Column, Dataset, Storage},
    error::RequestError,
    frequency, io_utils, missing, plot,
    stats::{self, NumericDistribution},
    summary::{Fact, Summary},
    table, temporal,
};

/// Minimum share of numeric-coercible values for a numeric classification.
pub const NUMERIC_THRESHOLD: f64 = 95.0;
/// Minimum share of datetime-coercible values, exclusive.
pub const DATETIME_THRESHOLD: f64 = 95.0;
/// Maximum unique-to-row ratio for categorical eligibility.
pub const CATEGORY_RATIO: f64 = 0.1;
/// Numeric-share band (exclusive bounds) flagged as an inconsistent type.
pub const INCONSISTENT_BAND: (f64, f64) = (20.0, 80.0);
/// Missing-value share above which the column itself is questioned.
pub const HIGH_MISSING_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveType {
    Constant,
    Binary,
    Index,
    Numeric,
    Inconsistent,
    Categorical,
    DateTime,
    Text,
}

impl EffectiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectiveType::Constant => "constant",
            EffectiveType::Binary => "binary",
            EffectiveType::Index => "index",
            EffectiveType::Numeric => "numeric",
            EffectiveType::Inconsistent => "inconsistent",
            EffectiveType::Categorical => "categorical",
            EffectiveType::DateTime => "datetime",
            EffectiveType::Text => "text",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnProfile {
    pub effective_type: EffectiveType,
    pub summary: Summary,
}

/// Profiles one column of the dataset.
pub fn profile_column(dataset: &Dataset, name: &str) -> Result<Summary, RequestError> {
    let column = dataset
        .column(name)
        .ok_or_else(|| RequestError::ColumnNotFound(name.to_string()))?;
    Ok(classify_column(column).summary)
}

/// Classifies a column and builds its summary facts.
pub fn classify_column(column: &Column) -> ColumnProfile {
    let mut summary = Summary::new();
    let rows = column.len();
    let unique = column.unique_count();

    summary.set("Data Type", Fact::text(column.storage.as_str()));
    summary.set(
        "Unique Values",
        Fact::text(format!("{unique} (out of {rows})")),
    );

    let report = missing::detect(column);
    match &report {
        missing::MissingReport::Clean => {
            summary.set("Missing Values", Fact::Count(0));
        }
        missing::MissingReport::Counts {
            by_token,
            total,
            percentage,
        } => {
            let entries = by_token
                .iter()
                .map(|(token, count)| (token.clone(), count.to_string()))
                .collect();
            summary.set("Missing Values", Fact::Map(entries));
            summary.set(
                "Missing Values (%)",
                Fact::text(format!(
                    "{}% ({} of {})",
                    format_number(*percentage),
                    total,
                    rows
                )),
            );
            if *percentage > HIGH_MISSING_THRESHOLD {
                summary.set(
                    "Recommendation",
                    Fact::text(format!(
                        "High percentage ({}%) of missing values, consider whether the column is necessary",
                        format_number(*percentage)
                    )),
                );
            }
        }
    }

    if rows == 0 {
        return ColumnProfile {
            effective_type: EffectiveType::Text,
            summary,
        };
    }

    if unique == 1 {
        summary.set(
            "Recommendation",
            Fact::text("Constant column, can be removed"),
        );
        return ColumnProfile {
            effective_type: EffectiveType::Constant,
            summary,
        };
    }

    if unique == 2 {
        frequency::binary_facts(column, &mut summary);
        return ColumnProfile {
            effective_type: EffectiveType::Binary,
            summary,
        };
    }

    let mut effective = EffectiveType::Text;
    if unique == rows {
        summary.set(
            "Recommendation",
            Fact::text("Index column (every row has a unique value)"),
        );
        effective = EffectiveType::Index;
    }

    let numeric_values: Vec<f64> = column.cells.iter().filter_map(Cell::to_numeric).collect();
    let numeric_pct = round_to(numeric_values.len() as f64 / rows as f64 * 100.0, 4);
    if numeric_pct >= NUMERIC_THRESHOLD || column.storage.is_numeric() {
        let dist = NumericDistribution::from_values(numeric_values);
        stats::numeric_facts(&dist, &mut summary);
        effective = EffectiveType::Numeric;
        if !column.storage.is_numeric() {
            summary.set(
                "Recommendation",
                Fact::text(format!(
                    "Convert to numeric variable ({}% can be converted)",
                    format_number(numeric_pct)
                )),
            );
        }
    }

    let (band_low, band_high) = INCONSISTENT_BAND;
    if numeric_pct > band_low && numeric_pct < band_high {
        let missing_pct = report.percentage();
        let recommendation = if missing_pct > 0.0 {
            format!(
                "Inconsistent data type ({}% numeric, {}% missing, {}% string)",
                format_number(numeric_pct),
                format_number(missing_pct),
                format_number(100.0 - numeric_pct - missing_pct)
            )
        } else {
            format!(
                "Inconsistent data type ({}% numeric, {}% string)",
                format_number(numeric_pct),
                format_number(100.0 - numeric_pct)
            )
        };
        summary.set("Recommendation", Fact::text(recommendation));
        effective = EffectiveType::Inconsistent;
    }

    let unique_ratio = unique as f64 / rows as f64;
    if (column.storage == Storage::Text && unique_ratio <= CATEGORY_RATIO)
        || column.storage == Storage::Categorical
    {
        frequency::categorical_facts(column, &mut summary);
        summary.set(
            "Recommendation",
            Fact::text("Convert to categorical variable"),
        );
        effective = EffectiveType::Categorical;
    }

    if column.storage == Storage::Text {
        let date_pct = temporal::coercion_percentage(column);
        if date_pct > DATETIME_THRESHOLD {
            let stamps = temporal::coerce(column);
            temporal::datetime_facts(&stamps, &mut summary);
            summary.set_last(
                "Recommendation",
                Fact::text(format!(
                    "Convert to datetime variable ({}% can be converted)",
                    format_number(date_pct)
                )),
            );
            effective = EffectiveType::DateTime;
        }
    }

    ColumnProfile {
        effective_type: effective,
        summary,
    }
}

struct ProfileDocument<'a> {
    entries: Vec<(&'a str, Summary)>,
}

impl Serialize for ProfileDocument<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, summary) in &self.entries {
            map.serialize_entry(name, summary)?;
        }
        map.end()
    }
}

pub fn execute(args: &ProfileArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let dataset = Dataset::from_csv_path(&args.input, delimiter, encoding, args.limit)
        .with_context(|| format!("Loading dataset from {:?}", args.input))?;

    let names = if args.columns.is_empty() {
        dataset.column_names()
    } else {
        args.columns.clone()
    };

    let mut entries = Vec::with_capacity(names.len());
    for name in &names {
        let summary = profile_column(&dataset, name)?;
        if let Some(dir) = &args.plots
            && summary.get("Mean").is_some()
        {
            write_distribution_plots(&dataset, name, dir)?;
        }
        entries.push((name.as_str(), summary));
    }

    match args.format {
        OutputFormat::Table => {
            for (idx, (name, summary)) in entries.iter().enumerate() {
                if idx > 0 {
                    println!();
                }
                println!("Column: {name}");
                table::print_summary(summary);
            }
        }
        OutputFormat::Json => {
            let document = ProfileDocument { entries };
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }
    info!("Profiled {} column(s)", names.len());
    Ok(())
}

fn write_distribution_plots(dataset: &Dataset, name: &str, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Creating plot directory {dir:?}"))?;
    let specs = plot::distribution_plots(dataset, name)?;
    let stem = normalize_column_name(name);
    for spec in specs {
        let path = dir.join(format!("{stem}_{}.json", spec.kind.as_str()));
        let file = fs::File::create(&path)
            .with_context(|| format!("Creating plot spec file {path:?}"))?;
        serde_json::to_writer_pretty(file, &spec)
            .with_context(|| format!("Writing plot spec {path:?}"))?;
    }
    Ok(())
}
