//! Alias table - informal names mapped to a fragment of the official name
//!
//! The resource is a flat JSON object, e.g. `{"lib": "library"}`. Both sides
//! are lowercased on load. A missing or unreadable resource yields an empty
//! table: aliases only ever add matches, they are never required.

use ahash::AHashMap;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: AHashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (alias, canonical) pairs
    pub fn from_pairs<I, A, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: AsRef<str>,
        C: AsRef<str>,
    {
        let mut table = Self::new();
        for (alias, canonical) in pairs {
            table.insert(alias.as_ref(), canonical.as_ref());
        }
        table
    }

    /// Insert one mapping; blank aliases or fragments are ignored
    pub fn insert(&mut self, alias: &str, canonical: &str) {
        let alias = alias.trim().to_lowercase();
        let canonical = canonical.trim().to_lowercase();
        if alias.is_empty() || canonical.is_empty() {
            return;
        }
        self.entries.insert(alias, canonical);
    }

    /// Parse the JSON resource
    ///
    /// Returns the table and the number of entries skipped because their
    /// value was not a string.
    pub fn from_json(json: &str) -> serde_json::Result<(Self, usize)> {
        let raw: AHashMap<String, Value> = serde_json::from_str(json)?;
        let mut table = Self::new();
        let mut skipped = 0;
        for (alias, value) in raw {
            match value {
                Value::String(canonical) => table.insert(&alias, &canonical),
                _ => skipped += 1,
            }
        }
        Ok((table, skipped))
    }

    /// Load from disk, degrading to an empty table on any failure
    pub fn load_or_empty(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Alias file {:?} unavailable ({}) - continuing without aliases", path, e);
                return Self::new();
            }
        };

        match Self::from_json(&content) {
            Ok((table, skipped)) => {
                if skipped > 0 {
                    tracing::warn!("Skipped {} non-string alias entries in {:?}", skipped, path);
                }
                tracing::info!("Loaded {} aliases from {:?}", table.len(), path);
                table
            }
            Err(e) => {
                tracing::warn!("Alias file {:?} is malformed ({}) - continuing without aliases", path, e);
                Self::new()
            }
        }
    }

    /// Canonical fragment for an alias (lookup is case-insensitive)
    pub fn lookup(&self, alias: &str) -> Option<&str> {
        self.entries.get(&alias.trim().to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = AliasTable::from_pairs([("Lib", "Main LIBRARY")]);
        assert_eq!(table.lookup("LIB"), Some("main library"));
        assert_eq!(table.lookup(" lib "), Some("main library"));
        assert_eq!(table.lookup("gym"), None);
    }

    #[test]
    fn test_from_json_skips_non_strings() {
        let (table, skipped) =
            AliasTable::from_json(r#"{"lib": "library", "gym": 3, "caf": "canteen"}"#).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(AliasTable::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let table = AliasTable::load_or_empty(Path::new("does/not/exist.json"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_blank_entries_ignored() {
        let table = AliasTable::from_pairs([("", "x"), ("y", "  ")]);
        assert!(table.is_empty());
    }
}
