//! In-memory configuration document addressed by dotted paths.
//!
//! A [`ConfigDocument`] is an ordered tree of sections (mappings) whose leaves
//! are scalars or lists. Every entry can be reached with a dotted path such as
//! `database.pool.size`. Insertion order is kept, so a document written back
//! to disk lists keys in the order they were first added.
//!
//! # Example
//!
//! ```rust
//! use config_migrator::{ConfigDocument, DocumentFormat};
//! use serde_yaml::Value;
//!
//! let mut doc = ConfigDocument::parse("config-version: 1\n", DocumentFormat::Yaml)?;
//! doc.set("database.host", Value::from("db.local"));
//!
//! assert_eq!(doc.version("config-version"), 1);
//! assert!(doc.is_section("database"));
//! assert_eq!(doc.get("database.host"), Some(&Value::from("db.local")));
//! # Ok::<(), config_migrator::Error>(())
//! ```
use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

use crate::{error::Error, format::DocumentFormat};

/// Separator between the segments of a dotted path.
pub const PATH_SEPARATOR: char = '.';

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    root: Mapping,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mapping(root: Mapping) -> Self {
        Self { root }
    }

    pub fn parse(text: &str, format: DocumentFormat) -> Result<Self, Error> {
        format.parse(text).map(Self::from_mapping)
    }

    pub fn emit(&self, format: DocumentFormat) -> Result<String, Error> {
        format.emit(&self.root)
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Returns the value at `path`, which may itself be a section.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split(PATH_SEPARATOR);
        let first = segments.next()?;
        let mut current = lookup(&self.root, first)?;

        for segment in segments {
            current = lookup(current.as_mapping()?, segment)?;
        }

        Some(current)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn is_section(&self, path: &str) -> bool {
        self.get(path).is_some_and(Value::is_mapping)
    }

    /// Reads an integer at `path`, falling back to `default` when the entry is
    /// missing, not a number or out of `i64` range. Floats are truncated.
    pub fn get_int(&self, path: &str, default: i64) -> i64 {
        match self.get(path) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_u64().and_then(|v| i64::try_from(v).ok()))
                .or_else(|| n.as_f64().map(|v| v as i64))
                .unwrap_or(default),
            _ => default,
        }
    }

    /// Schema version stored at `version_path`, `0` when absent.
    pub fn version(&self, version_path: &str) -> i64 {
        self.get_int(version_path, 0)
    }

    /// Stores `value` at `path`.
    ///
    /// Missing sections along the way are created. A non-section entry that
    /// sits where a section is needed gets replaced by an empty section.
    pub fn set(&mut self, path: &str, value: Value) {
        let (parents, last) = match path.rsplit_once(PATH_SEPARATOR) {
            Some((parents, last)) => (Some(parents), last),
            None => (None, path),
        };

        let mut current = &mut self.root;
        if let Some(parents) = parents {
            for segment in parents.split(PATH_SEPARATOR) {
                current = child_section(current, segment);
            }
        }

        let key = key_for(current, last);
        current.insert(key, value);
    }

    /// Removes the entry at `path` and returns it.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let (parents, last) = match path.rsplit_once(PATH_SEPARATOR) {
            Some((parents, last)) => (Some(parents), last),
            None => (None, path),
        };

        let mut current = &mut self.root;
        if let Some(parents) = parents {
            for segment in parents.split(PATH_SEPARATOR) {
                let key = existing_key(current, segment)?;
                current = current.get_mut(&key)?.as_mapping_mut()?;
            }
        }

        let key = existing_key(current, last)?;
        current.shift_remove(&key)
    }

    /// All entries keyed by dotted path, in document order.
    ///
    /// With `deep`, entries nested in sections are listed right after the
    /// section itself. Sections are included as values either way.
    pub fn values(&self, deep: bool) -> IndexMap<String, Value> {
        let mut out = IndexMap::new();
        collect(&self.root, None, deep, &mut out);
        out
    }

    /// Every entry keyed by dotted path, optionally leaving sections out so
    /// only scalars and lists remain.
    pub fn flatten(&self, exclude_sections: bool) -> IndexMap<String, Value> {
        let mut values = self.values(true);
        if exclude_sections {
            values.retain(|_, value| !value.is_mapping());
        }
        values
    }
}

fn collect(map: &Mapping, prefix: Option<&str>, deep: bool, out: &mut IndexMap<String, Value>) {
    for (key, value) in map {
        let Some(key) = key_text(key) else {
            continue;
        };

        let path = match prefix {
            Some(prefix) => format!("{prefix}{PATH_SEPARATOR}{key}"),
            None => key,
        };

        out.insert(path.clone(), value.clone());

        if deep {
            if let Value::Mapping(section) = value {
                collect(section, Some(&path), deep, out);
            }
        }
    }
}

/// Textual form of a mapping key. Keys that are lists, sections or tagged
/// values can't be addressed by path.
fn key_text(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        _ => None,
    }
}

fn existing_key(map: &Mapping, segment: &str) -> Option<Value> {
    if map.contains_key(segment) {
        return Some(Value::String(segment.to_string()));
    }

    map.keys()
        .find(|key| !key.is_string() && key_text(key).as_deref() == Some(segment))
        .cloned()
}

fn key_for(map: &Mapping, segment: &str) -> Value {
    existing_key(map, segment).unwrap_or_else(|| Value::String(segment.to_string()))
}

fn lookup<'a>(map: &'a Mapping, segment: &str) -> Option<&'a Value> {
    map.get(existing_key(map, segment)?)
}

fn child_section<'a>(map: &'a mut Mapping, segment: &str) -> &'a mut Mapping {
    let key = key_for(map, segment);
    let entry = map.entry(key).or_insert(Value::Null);
    if !entry.is_mapping() {
        *entry = Value::Mapping(Mapping::new());
    }

    entry
        .as_mapping_mut()
        .expect("entry was just made a section")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> ConfigDocument {
        ConfigDocument::parse(text, DocumentFormat::Yaml).unwrap()
    }

    #[test]
    fn get_walks_sections() {
        let doc = yaml("database:\n  host: db.local\n  pool:\n    size: 4\n");

        assert_eq!(doc.get("database.host"), Some(&Value::from("db.local")));
        assert_eq!(doc.get_int("database.pool.size", 0), 4);
        assert!(doc.is_section("database.pool"));
        assert!(doc.get("database.host.nope").is_none());
        assert!(doc.get("missing").is_none());
    }

    #[test]
    fn version_defaults_to_zero() {
        assert_eq!(yaml("some-key: value\n").version("config-version"), 0);
        assert_eq!(yaml("config-version: nope\n").version("config-version"), 0);
        assert_eq!(yaml("config-version: 7\n").version("config-version"), 7);
        assert_eq!(yaml("config-version: 2.9\n").version("config-version"), 2);
        assert_eq!(yaml("meta:\n  schema: 5\n").version("meta.schema"), 5);
        assert_eq!(
            yaml("config-version: 18446744073709551615\n").version("config-version"),
            0
        );
        assert_eq!(yaml("config-version: -3\n").get_int("config-version", 0), -3);
    }

    #[test]
    fn set_creates_missing_sections() {
        let mut doc = ConfigDocument::new();
        doc.set("a.b.c", Value::from(true));

        assert!(doc.is_section("a"));
        assert!(doc.is_section("a.b"));
        assert_eq!(doc.get("a.b.c"), Some(&Value::from(true)));
    }

    #[test]
    fn set_replaces_scalar_in_the_way() {
        let mut doc = yaml("a: 1\n");
        doc.set("a.b", Value::from("x"));

        assert!(doc.is_section("a"));
        assert_eq!(doc.get("a.b"), Some(&Value::from("x")));
    }

    #[test]
    fn set_keeps_key_position() {
        let mut doc = yaml("first: 1\nsecond: 2\n");
        doc.set("first", Value::from(10));
        doc.set("third", Value::from(3));

        let keys: Vec<_> = doc.values(false).into_keys().collect();
        assert_eq!(keys, ["first", "second", "third"]);
    }

    #[test]
    fn numeric_keys_are_addressed_by_text() {
        let mut doc = yaml("levels:\n  1: low\n  2: high\n");
        assert_eq!(doc.get("levels.2"), Some(&Value::from("high")));

        doc.set("levels.1", Value::from("lowest"));
        assert_eq!(doc.get("levels.1"), Some(&Value::from("lowest")));
        assert_eq!(doc.get("levels").and_then(Value::as_mapping).unwrap().len(), 2);
    }

    #[test]
    fn remove_detaches_entry() {
        let mut doc = yaml("a:\n  b: 1\n  c: 2\n");

        assert_eq!(doc.remove("a.b"), Some(Value::from(1)));
        assert!(!doc.contains("a.b"));
        assert!(doc.contains("a.c"));
        assert_eq!(doc.remove("a.zzz"), None);
    }

    #[test]
    fn flatten_can_drop_sections() {
        let doc = yaml("config-version: 2\ndatabase:\n  host: h\n  tags: [a, b]\nname: n\n");

        let all: Vec<_> = doc.flatten(false).into_keys().collect();
        assert_eq!(
            all,
            ["config-version", "database", "database.host", "database.tags", "name"]
        );

        let leaves: Vec<_> = doc.flatten(true).into_keys().collect();
        assert_eq!(leaves, ["config-version", "database.host", "database.tags", "name"]);
    }

    #[test]
    fn shallow_values_stop_at_sections() {
        let doc = yaml("database:\n  host: h\nname: n\n");
        let keys: Vec<_> = doc.values(false).into_keys().collect();
        assert_eq!(keys, ["database", "name"]);
    }
}
