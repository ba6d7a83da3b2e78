//! Datetime coercion and the calendar/time-of-day range summarizer.

use chrono::{Local, NaiveDateTime};

use crate::data::round_to;
use crate::dataset::Column;
use crate::summary::{Fact, Summary};

/// Share of cells that coerce to a timestamp, rounded to four decimals.
pub fn coercion_percentage(column: &Column) -> f64 {
    if column.is_empty() {
        return 0.0;
    }
    let parsed = column.cells.iter().filter(|c| c.to_stamp().is_some()).count();
    round_to(parsed as f64 / column.len() as f64 * 100.0, 4)
}

/// Coerced timestamps of the column, invalid cells dropped.
pub fn coerce(column: &Column) -> Vec<NaiveDateTime> {
    column.cells.iter().filter_map(|c| c.to_stamp()).collect()
}

/// Range facts for a coerced datetime column.
///
/// A value that carried only a time of day was anchored to today's date
/// during coercion, so a column whose dates all equal today is reported as a
/// time-of-day range. A dataset genuinely timestamped today trips the same
/// branch; that trade-off is inherent to the anchoring.
pub fn datetime_facts(stamps: &[NaiveDateTime], summary: &mut Summary) {
    if stamps.is_empty() {
        return;
    }
    let today = Local::now().date_naive();
    let time_only = stamps.iter().all(|dt| dt.date() == today);
    if time_only {
        let min = stamps.iter().map(NaiveDateTime::time).min();
        let max = stamps.iter().map(NaiveDateTime::time).max();
        if let (Some(min), Some(max)) = (min, max) {
            summary.set(
                "Time Range",
                Fact::text(format!(
                    "{} to {}",
                    min.format("%H:%M:%S"),
                    max.format("%H:%M:%S")
                )),
            );
        }
    } else {
        let min = stamps.iter().map(NaiveDateTime::date).min();
        let max = stamps.iter().map(NaiveDateTime::date).max();
        if let (Some(min), Some(max)) = (min, max) {
            summary.set(
                "Date Range",
                Fact::text(format!(
                    "{} to {}",
                    min.format("%Y-%m-%d"),
                    max.format("%Y-%m-%d")
                )),
            );
        }
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
            values.iter().map(|v| Cell::Text(v.to_string())).collect(),
        )
    }

    #[test]
    fn coercion_percentage_counts_parsable_cells() {
        let column = text_column(&["2024-01-01", "2024-02-03 10:00:00", "nope", "2024-03-04"]);
        assert_eq!(coercion_percentage(&column), 75.0);
    }

    #[test]
    fn date_range_covers_min_and_max() {
        let column = text_column(&["2023-05-01", "2024-02-03", "2023-12-31"]);
        let stamps = coerce(&column);
        let mut summary = Summary::new();
        datetime_facts(&stamps, &mut summary);
        assert_eq!(
            summary.get("Date Range"),
            Some(&Fact::text("2023-05-01 to 2024-02-03"))
        );
        assert!(summary.get("Time Range").is_none());
    }

    #[test]
    fn time_only_values_yield_a_time_range() {
        let column = text_column(&["08:30:00", "16:45:00", "12:00:00"]);
        let stamps = coerce(&column);
        let mut summary = Summary::new();
        datetime_facts(&stamps, &mut summary);
        assert_eq!(
            summary.get("Time Range"),
            Some(&Fact::text("08:30:00 to 16:45:00"))
        );
        assert!(summary.get("Date Range").is_none());
    }
}
