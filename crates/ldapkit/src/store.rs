//! Attribute store
//!
//! Holds an entry's `original` snapshot (as last read from or committed to
//! the directory) next to its mutable `current` state.

use crate::attributes::RawAttributeSet;
use crate::changeset::{self, AttributeDelta, ModType};

/// Original and current attributes of one entry.
#[derive(Debug, Clone, Default)]
pub struct AttributeStore {
    original: RawAttributeSet,
    current: RawAttributeSet,
    exists: bool,
}

impl AttributeStore {
    /// Create an empty store for an entry not yet in the directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store for a new entry with initial attributes.
    ///
    /// The attributes are current state only; the entry does not exist.
    pub fn with_attributes(attributes: RawAttributeSet) -> Self {
        Self {
            original: RawAttributeSet::new(),
            current: attributes,
            exists: false,
        }
    }

    /// Load attributes read from the directory into both snapshots.
    pub fn load(&mut self, attributes: RawAttributeSet) {
        self.current = attributes.clone();
        self.original = attributes;
        self.exists = true;
    }

    /// Whether the entry has been read from or written to the directory.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Mark whether the entry exists in the directory.
    pub fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }

    /// The snapshot taken at the last load or commit.
    pub fn original(&self) -> &RawAttributeSet {
        &self.original
    }

    /// The current in-memory attributes.
    pub fn current(&self) -> &RawAttributeSet {
        &self.current
    }

    /// The distinguished name of the current state.
    pub fn dn(&self) -> Option<&str> {
        self.current.dn()
    }

    /// Set the distinguished name of the current state.
    pub fn set_dn(&mut self, dn: impl Into<String>) {
        self.current.set_dn(dn);
    }

    /// Get the current values of an attribute.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.current.get(name)
    }

    /// Get the first current value of an attribute.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.current.first(name)
    }

    /// Set the current values of an attribute.
    pub fn set<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.current.set(name, values);
    }

    /// Remove an attribute from the current state.
    pub fn unset(&mut self, name: &str) -> Option<Vec<String>> {
        self.current.remove(name)
    }

    /// The modifications between the original and current state.
    pub fn changes(&self) -> Vec<AttributeDelta> {
        changeset::diff(&self.original, &self.current)
    }

    /// Whether the current state differs from the original.
    pub fn is_dirty(&self) -> bool {
        !self.changes().is_empty()
    }

    /// Take the current state as the new original after a commit.
    pub fn sync_original(&mut self) {
        self.original = self.current.clone();
    }

    /// Apply a committed single-attribute modification to both snapshots.
    pub fn apply_committed(&mut self, delta: &AttributeDelta) {
        for snapshot in [&mut self.original, &mut self.current] {
            match delta.kind() {
                ModType::Remove => {
                    snapshot.remove(delta.attribute());
                }
                ModType::Add | ModType::Replace => {
                    let values = delta.values().unwrap_or_default().to_vec();
                    snapshot.set(delta.attribute(), values);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawAttributeSet {
        RawAttributeSet::new()
            .with_dn("cn=Common Name,dc=corp,dc=org")
            .with("cn", ["Common Name"])
            .with("samaccountname", ["Account Name"])
    }

    #[test]
    fn test_new_store_does_not_exist() {
        let store = AttributeStore::new();
        assert!(!store.exists());
        assert!(store.current().is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_load_populates_both_snapshots() {
        let mut store = AttributeStore::new();
        store.load(raw());

        assert!(store.exists());
        assert_eq!(store.original(), &raw());
        assert_eq!(store.current(), &raw());
        assert_eq!(store.dn(), Some("cn=Common Name,dc=corp,dc=org"));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_mutation_only_touches_current() {
        let mut store = AttributeStore::new();
        store.load(raw());

        store.set("cn", ["New Common Name"]);
        store.unset("samaccountname");

        assert_eq!(store.first("cn"), Some("New Common Name"));
        assert_eq!(store.original().first("cn"), Some("Common Name"));
        assert!(store.original().contains("samaccountname"));
        assert_eq!(store.changes().len(), 2);
    }

    #[test]
    fn test_sync_original_cleans_store() {
        let mut store = AttributeStore::new();
        store.load(raw());
        store.set("mail", ["jdoe@corp.org"]);
        assert!(store.is_dirty());

        store.sync_original();
        assert!(!store.is_dirty());
        assert_eq!(store.original().first("mail"), Some("jdoe@corp.org"));
    }

    #[test]
    fn test_with_attributes_is_all_additions() {
        let store = AttributeStore::with_attributes(raw());
        assert!(!store.exists());
        assert!(store.changes().iter().all(|d| d.kind() == ModType::Add));
    }

    #[test]
    fn test_apply_committed() {
        let mut store = AttributeStore::new();
        store.load(raw());

        store.apply_committed(&AttributeDelta::replace("cn", vec!["John Doe".to_string()]));
        store.apply_committed(&AttributeDelta::add("givenName", vec!["John".to_string()]));
        store.apply_committed(&AttributeDelta::remove("samaccountname"));

        assert_eq!(store.first("cn"), Some("John Doe"));
        assert_eq!(store.original().first("givenname"), Some("John"));
        assert!(!store.current().contains("samaccountname"));
        assert!(!store.is_dirty());
    }
}
