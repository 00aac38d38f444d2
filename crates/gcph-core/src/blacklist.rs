//! Persistent set of commits never to offer for picking.

use std::collections::HashSet;
use std::path::Path;

use crate::error::Result;
use crate::persist;

/// Insertion-ordered set of commit identities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    entries: Vec<String>,
    index: HashSet<String>,
}

impl Blacklist {
    /// Create an empty blacklist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a file with one identity per line; missing file is empty.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let list: Self = persist::read_lines(path)?.into_iter().collect();
        tracing::debug!(path = %path.display(), entries = list.len(), "loaded blacklist");
        Ok(list)
    }

    /// Rewrite the whole file, preserving insertion order.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        persist::write_lines_atomic(path, self.iter())
    }

    /// Add an identity. Returns `false` if it was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if !self.index.insert(id.clone()) {
            return false;
        }
        self.entries.push(id);
        true
    }

    /// Check membership.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Identities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the blacklist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<String> for Blacklist {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut list = Self::new();
        for id in iter {
            list.insert(id);
        }
        list
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_insert_is_idempotent() {
        let mut list = Blacklist::new();
        assert!(list.insert("abc"));
        assert!(!list.insert("abc"));
        assert_eq!(list.len(), 1);
        assert!(list.contains("abc"));
    }

    #[test]
    fn test_roundtrip_preserves_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".gcph_blacklist");

        let mut list = Blacklist::new();
        for id in ["ffff", "0000", "aaaa"] {
            list.insert(id);
        }
        list.save(&path).unwrap();

        let loaded = Blacklist::load(&path).unwrap();
        assert_eq!(loaded, list);
        assert_eq!(loaded.iter().collect::<Vec<_>>(), vec!["ffff", "0000", "aaaa"]);
    }

    #[test]
    fn test_load_deduplicates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bl");
        std::fs::write(&path, "a\nb\na\n").unwrap();

        let loaded = Blacklist::load(&path).unwrap();
        assert_eq!(loaded.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
