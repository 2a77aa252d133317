//! Accumulated link results
//!
//! Results are appended in chain order and never overwritten. Templates reach
//! into them with dotted paths such as `person.address.city`, where the first
//! segment names a link and the rest walk into its value.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use super::error::ChainError;

/// Outcome of a dotted-path lookup
#[derive(Debug, Clone, PartialEq)]
pub enum PathLookup<'a> {
    /// Every segment resolved
    Found(&'a Value),
    /// Resolution stopped at `segment`
    Missing { segment: String },
}

impl<'a> PathLookup<'a> {
    pub fn found(self) -> Option<&'a Value> {
        match self {
            Self::Found(value) => Some(value),
            Self::Missing { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Append-only, insertion-ordered map from link name to result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkResults {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl LinkResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// The most recently appended result
    pub fn last(&self) -> Option<(&str, &Value)> {
        self.entries
            .last()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Append a result. A name can only be written once.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Result<(), ChainError> {
        let name = name.into();

        if self.index.contains_key(&name) {
            return Err(ChainError::duplicate_link(name));
        }

        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
        Ok(())
    }

    /// Follow a dotted path into the results
    pub fn lookup(&self, path: &str) -> PathLookup<'_> {
        let mut segments = path.split('.');

        let head = segments.next().unwrap_or_default();
        let Some(mut current) = self.get(head) else {
            return PathLookup::Missing {
                segment: head.to_string(),
            };
        };

        for segment in segments {
            match child(current, segment) {
                Some(next) => current = next,
                None => {
                    return PathLookup::Missing {
                        segment: segment.to_string(),
                    };
                }
            }
        }

        PathLookup::Found(current)
    }

    /// All results as a JSON object keyed by link name
    pub fn to_object(&self) -> Map<String, Value> {
        self.entries.iter().cloned().collect()
    }
}

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(obj) => obj.get(segment),
        Value::Array(arr) => {
            let index: usize = segment.parse().ok()?;
            arr.get(index)
        }
        _ => None,
    }
}

impl Serialize for LinkResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;

        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }

        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> LinkResults {
        let mut results = LinkResults::new();
        results.insert("greeting", json!("hello")).unwrap();
        results
            .insert(
                "person",
                json!({
                    "name": "Ivan",
                    "address": { "city": "Kazan" },
                    "tags": ["a", "b"]
                }),
            )
            .unwrap();
        results
    }

    #[test]
    fn test_insert_preserves_order() {
        let results = sample();
        let names: Vec<&str> = results.iter().map(|(name, _)| name).collect();

        assert_eq!(names, vec!["greeting", "person"]);
        assert_eq!(results.last().map(|(name, _)| name), Some("person"));
    }

    #[test]
    fn test_insert_rejects_existing_name() {
        let mut results = sample();
        let err = results.insert("greeting", json!("again")).unwrap_err();

        assert_eq!(err, ChainError::duplicate_link("greeting"));
        assert_eq!(results.get("greeting"), Some(&json!("hello")));
    }

    #[test]
    fn test_lookup_nested_paths() {
        let results = sample();

        assert_eq!(results.lookup("greeting").found(), Some(&json!("hello")));
        assert_eq!(
            results.lookup("person.address.city").found(),
            Some(&json!("Kazan"))
        );
        assert_eq!(results.lookup("person.tags.1").found(), Some(&json!("b")));
    }

    #[test]
    fn test_lookup_reports_missing_segment() {
        let results = sample();

        assert_eq!(
            results.lookup("person.address.zip"),
            PathLookup::Missing {
                segment: "zip".to_string()
            }
        );
        assert_eq!(
            results.lookup("unknown.field"),
            PathLookup::Missing {
                segment: "unknown".to_string()
            }
        );
        // strings have no fields
        assert!(!results.lookup("greeting.length").is_found());
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let results = sample();
        let json = serde_json::to_string(&results).unwrap();

        assert!(json.starts_with("{\"greeting\":\"hello\",\"person\":"));
        assert_eq!(Value::Object(results.to_object())["person"]["name"], json!("Ivan"));
    }
}
