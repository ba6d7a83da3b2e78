//! Value-count machinery and the binary/categorical summarizers built on it.

use std::collections::HashMap;

use itertools::Itertools;

use crate::dataset::Column;
use crate::summary::{Fact, Summary};

/// Most frequent values reported for a categorical column.
pub const TOP_CATEGORIES: usize = 10;

/// Display cap for the joined category list, in characters.
pub const CATEGORY_DISPLAY_CAP: usize = 300;

/// Occurrence counts of non-missing values, ordered by frequency descending.
/// Ties keep first-encountered order (the sort is stable over row order).
pub fn value_counts(column: &Column) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for key in column.non_null_keys() {
        match counts.get_mut(&key) {
            Some(count) => *count += 1,
            None => {
                counts.insert(key.clone(), 1);
                order.push(key);
            }
        }
    }
    let mut items = order
        .into_iter()
        .map(|key| {
            let count = counts[&key];
            (key, count)
        })
        .collect::<Vec<_>>();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    items
}

fn percent_of(count: usize, rows: usize) -> String {
    format!("{count} ({:.2}%)", count as f64 / rows as f64 * 100.0)
}

/// Facts for a two-valued column: each value with its count and share of the
/// row count.
pub fn binary_facts(column: &Column, summary: &mut Summary) {
    summary.set("Recommendation", Fact::text("Convert to binary column"));
    let rows = column.len();
    let entries = value_counts(column)
        .into_iter()
        .map(|(value, count)| (value, percent_of(count, rows)))
        .collect::<Vec<_>>();
    summary.set("Value Counts (Binary)", Fact::Map(entries));
}

/// Facts for a categorical column: the sorted category list (truncated for
/// display) and the top values with counts and percentages.
pub fn categorical_facts(column: &Column, summary: &mut Summary) {
    let joined = column
        .non_null_keys()
        .unique()
        .sorted()
        .join(", ");
    let categories = if joined.chars().count() > CATEGORY_DISPLAY_CAP {
        let truncated: String = joined.chars().take(CATEGORY_DISPLAY_CAP).collect();
        format!("{truncated}...")
    } else {
        joined
    };
    summary.set("Categories", Fact::text(categories));

    let rows = column.len();
    let top = value_counts(column)
        .into_iter()
        .take(TOP_CATEGORIES)
        .map(|(value, count)| (value, percent_of(count, rows)))
        .collect::<Vec<_>>();
    summary.set("Top Categories", Fact::Map(top));
}
