//! Missing-value detection.
//!
//! Two kinds of missingness are tracked independently: literal tokens that
//! conventionally mean "no data" (`none`, `nil`, `na`, ...) and storage-level
//! nulls, which get their own `NaN` key so a blank cell and the string "NA"
//! stay distinguishable in the report.

use crate::data::round_to;
use crate::dataset::Column;

/// Tokens treated as missing after trimming and ASCII case-folding.
pub const MISSING_TOKENS: &[&str] = &["none", "nil", "na", "null", "n/a", "", " "];

/// Key under which storage-level nulls are reported.
pub const NULL_MARKER_KEY: &str = "NaN";

#[derive(Debug, Clone, PartialEq)]
pub enum MissingReport {
    /// No missing values of either kind.
    Clean,
    Counts {
        /// Matched token (or the null marker) to occurrence count, in
        /// vocabulary order with the null marker last. Unmatched tokens are
        /// omitted.
        by_token: Vec<(String, usize)>,
        total: usize,
        /// Share of the row count, rounded to four decimals.
        percentage: f64,
    },
}

impl MissingReport {
    pub fn total(&self) -> usize {
        match self {
            MissingReport::Clean => 0,
            MissingReport::Counts { total, .. } => *total,
        }
    }

    pub fn percentage(&self) -> f64 {
        match self {
            MissingReport::Clean => 0.0,
            MissingReport::Counts { percentage, .. } => *percentage,
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, MissingReport::Clean)
    }
}

/// Scans a column for missing values. Deterministic and read-only: running
/// it twice on an unmodified column yields identical counts.
pub fn detect(column: &Column) -> MissingReport {
    let rows = column.len();
    if rows == 0 {
        return MissingReport::Clean;
    }

    let mut token_counts = vec![0usize; MISSING_TOKENS.len()];
    let mut null_count = 0usize;
    for cell in &column.cells {
        if cell.is_null() {
            null_count += 1;
            continue;
        }
        let normalized = cell.display().trim().to_ascii_lowercase();
        if let Some(idx) = MISSING_TOKENS.iter().position(|t| *t == normalized) {
            token_counts[idx] += 1;
        }
    }

    let mut by_token = MISSING_TOKENS
        .iter()
        .zip(&token_counts)
        .filter(|(_, count)| **count > 0)
        .map(|(token, count)| (token.to_string(), *count))
        .collect::<Vec<_>>();
    if null_count > 0 {
        by_token.push((NULL_MARKER_KEY.to_string(), null_count));
    }

    let total: usize = by_token.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return MissingReport::Clean;
    }
    MissingReport::Counts {
        by_token,
        total,
        percentage: round_to(total as f64 / rows as f64 * 100.0, 4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Cell, Storage};

    fn text_column(values: &[&str]) -> Column {
        Column::new(
            "c",
            Storage::Text,
            values
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        Cell::Null
                    } else {
                        Cell::Text(v.to_string())
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn counts_tokens_and_nulls_separately() {
        let column = text_column(&["NA", "x", "null", "", "None"]);
        let report = detect(&column);
        match report {
            MissingReport::Counts {
                by_token,
                total,
                percentage,
            } => {
                assert_eq!(
                    by_token,
                    vec![
                        ("none".to_string(), 1),
                        ("na".to_string(), 1),
                        ("null".to_string(), 1),
                        ("NaN".to_string(), 1),
                    ]
                );
                assert_eq!(total, 4);
                assert_eq!(percentage, 80.0);
            }
            MissingReport::Clean => panic!("expected counts"),
        }
    }

    #[test]
    fn clean_column_yields_clean_report() {
        let column = text_column(&["a", "b", "c"]);
        assert_eq!(detect(&column), MissingReport::Clean);
    }

    #[test]
    fn matching_is_case_and_whitespace_insensitive() {
        let column = text_column(&["  N/A ", "NIL", "ok"]);
        let report = detect(&column);
        assert_eq!(report.total(), 2);
    }

    #[test]
    fn detector_is_idempotent() {
        let column = text_column(&["NA", "", "x"]);
        assert_eq!(detect(&column), detect(&column));
    }
}
