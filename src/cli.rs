use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Profile CSV datasets and build chart specifications", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Profile columns: effective types, statistics, and recommendations
    Profile(ProfileArgs),
    /// Summarize a dataset: shape, duplicate rows, missing-value severity
    Overview(OverviewArgs),
    /// Build a renderer-ready chart specification for one or two columns
    Plot(PlotArgs),
    /// Apply ordered per-column edit directives and write the result
    Edit(EditArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Input CSV file to profile
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Columns to profile (defaults to every column)
    #[arg(short = 'C', long = "columns", action = clap::ArgAction::Append)]
    pub columns: Vec<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Maximum rows to scan (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
    /// Output format for the summaries
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
    /// Write histogram/boxplot specs for numeric columns into this directory
    #[arg(long = "plots")]
    pub plots: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct OverviewArgs {
    /// Input CSV file to summarize
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Maximum rows to scan (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
    /// Output format for the summary
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Input CSV file to plot from
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Primary column
    #[arg(short = 'x', long = "x-column")]
    pub x: String,
    /// Secondary column, for two-variable plot kinds
    #[arg(short = 'y', long = "y-column")]
    pub y: Option<String>,
    /// Plot kind: histogram, density, barchart, piechart, boxplot, violin,
    /// scatter, line, or heatmap
    #[arg(short = 'k', long = "kind")]
    pub kind: String,
    /// Output file for the chart specification (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Input CSV file to edit
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Drop a column entirely
    #[arg(long = "drop", action = clap::ArgAction::Append)]
    pub drop: Vec<String>,
    /// Drop rows where this column has a missing value
    #[arg(long = "dropna", action = clap::ArgAction::Append)]
    pub dropna: Vec<String>,
    /// Convert a column, as `column=numeric|datetime|categorical|binary`
    #[arg(long = "convert", action = clap::ArgAction::Append)]
    pub convert: Vec<String>,
    /// Rename a column, as `column=new_name`
    #[arg(long = "rename", action = clap::ArgAction::Append)]
    pub rename: Vec<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_single_characters() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
    }
}
