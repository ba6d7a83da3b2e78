//! Insertion-ordered fact maps produced by the profiling layer.
//!
//! A summary is a sequence of named facts whose order is part of the display
//! contract: callers render the facts top to bottom in the order the
//! profiler inserted them.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::data::format_number;

#[derive(Debug, Clone, PartialEq)]
pub enum Fact {
    Text(String),
    Count(usize),
    Number(f64),
    /// Nested key/value facts, for example per-value counts.
    Map(Vec<(String, String)>),
}

impl Fact {
    pub fn text(value: impl Into<String>) -> Self {
        Fact::Text(value.into())
    }

    /// Scalar display form; map facts render entry by entry instead.
    pub fn scalar_display(&self) -> Option<String> {
        match self {
            Fact::Text(s) => Some(s.clone()),
            Fact::Count(n) => Some(n.to_string()),
            Fact::Number(v) => Some(format_number(*v)),
            Fact::Map(_) => None,
        }
    }
}

impl Serialize for Fact {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Fact::Text(s) => serializer.serialize_str(s),
            Fact::Count(n) => serializer.serialize_u64(*n as u64),
            Fact::Number(v) => serializer.serialize_f64(*v),
            Fact::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    entries: Vec<(String, Fact)>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fact, replacing an existing one in place so the key keeps
    /// its original position.
    pub fn set(&mut self, key: impl Into<String>, fact: Fact) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = fact;
        } else {
            self.entries.push((key, fact));
        }
    }

    /// Appends a fact at the end, displacing any earlier entry with the same
    /// key. Used when a later rule must win both in value and position.
    pub fn set_last(&mut self, key: impl Into<String>, fact: Fact) {
        let key = key.into();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, fact));
    }

    pub fn get(&self, key: &str) -> Option<&Fact> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, fact)| fact)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fact)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Summary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, fact) in &self.entries {
            map.serialize_entry(key, fact)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place_preserving_position() {
        let mut summary = Summary::new();
        summary.set("a", Fact::Count(1));
        summary.set("b", Fact::Count(2));
        summary.set("a", Fact::Count(9));
        let keys = summary.iter().map(|(k, _)| k).collect::<Vec<_>>();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(summary.get("a"), Some(&Fact::Count(9)));
    }

    #[test]
    fn set_last_moves_key_to_the_end() {
        let mut summary = Summary::new();
        summary.set("recommendation", Fact::text("old"));
        summary.set("other", Fact::Count(1));
        summary.set_last("recommendation", Fact::text("new"));
        let keys = summary.iter().map(|(k, _)| k).collect::<Vec<_>>();
        assert_eq!(keys, vec!["other", "recommendation"]);
    }

    #[test]
    fn serializes_as_an_ordered_map() {
        let mut summary = Summary::new();
        summary.set("first", Fact::Count(1));
        summary.set("second", Fact::Map(vec![("x".into(), "1".into())]));
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(json, r#"{"first":1,"second":{"x":"1"}}"#);
    }
}
