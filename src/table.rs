//! Aligned key/value rendering of summaries for terminal output. Nested
//! map facts render as indented sub-rows under their parent key.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::summary::{Fact, Summary};

pub fn render_summary(summary: &Summary) -> String {
    let mut rows: Vec<(String, String)> = Vec::new();
    for (key, fact) in summary.iter() {
        match fact {
            Fact::Map(entries) => {
                rows.push((key.to_string(), String::new()));
                for (sub_key, value) in entries {
                    rows.push((format!("  {sub_key}"), value.clone()));
                }
            }
            other => rows.push((
                key.to_string(),
                other.scalar_display().unwrap_or_default(),
            )),
        }
    }

    let key_width = rows
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(1);

    let mut output = String::new();
    for (key, value) in rows {
        let value = sanitize_cell(&value);
        if value.is_empty() {
            let _ = writeln!(output, "{key}");
        } else {
            let padding = key_width.saturating_sub(key.chars().count());
            let _ = writeln!(output, "{key}{}  {value}", " ".repeat(padding));
        }
    }
    output
}

pub fn print_summary(summary: &Summary) {
    print!("{}", render_summary(summary));
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        let mut sanitized = String::with_capacity(value.len());
        for ch in value.chars() {
            match ch {
                '\n' | '\r' | '\t' => sanitized.push(' '),
                other => sanitized.push(other),
            }
        }
        Cow::Owned(sanitized)
    } else {
        Cow::Borrowed(value)
    }
}
