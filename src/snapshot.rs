use indexmap::IndexMap;
use serde_yaml::Value;

use crate::store::DocumentStore;

/// Flat copy of a document's user values, taken right before the document is
/// replaced.
///
/// Holds scalars and lists only. Sections and the version entry are never
/// part of a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSnapshot {
    entries: IndexMap<String, Value>,
}

impl ValueSnapshot {
    pub fn capture<S: DocumentStore + ?Sized>(store: &S, version_path: &str) -> Self {
        let mut entries = store.flatten(true);
        entries.retain(|key, value| key != version_path && !value.is_mapping());

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl IntoIterator for ValueSnapshot {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
