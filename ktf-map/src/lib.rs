//! Name-keyed map for test cases
//!
//! A `NameMap` stores values under short string names and iterates them in
//! key order, the way an rbtree keyed by name would. Key validation happens
//! before anything is allocated, so a rejected insert leaves nothing behind.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::collections::btree_map::{self, BTreeMap, Entry};
use alloc::string::{String, ToString};

/// Longest key accepted, in bytes.
pub const MAX_KEY_LEN: usize = 64;

/// Errors from map insertion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("empty key")]
    EmptyKey,

    #[error("key is {len} bytes, limit is {}", MAX_KEY_LEN)]
    KeyTooLong { len: usize },

    #[error("key '{0}' already present")]
    Exists(String),
}

/// Check that `key` can be stored.
pub fn validate_key(key: &str) -> Result<(), MapError> {
    if key.is_empty() {
        return Err(MapError::EmptyKey);
    }
    if key.len() > MAX_KEY_LEN {
        return Err(MapError::KeyTooLong { len: key.len() });
    }
    Ok(())
}

/// Ordered map from name to `V`.
#[derive(Debug, Clone)]
pub struct NameMap<V> {
    entries: BTreeMap<String, V>,
}

impl<V> NameMap<V> {
    /// Create an empty map
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Exact lookup
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    /// Insert a new entry; an existing key is left untouched.
    pub fn insert(&mut self, key: &str, value: V) -> Result<&mut V, MapError> {
        validate_key(key)?;
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(_) => Err(MapError::Exists(key.to_string())),
            Entry::Vacant(slot) => Ok(slot.insert(value)),
        }
    }

    /// Look up `key`, creating the entry with `create` if it is missing.
    ///
    /// Lookup and creation happen in one step on `&mut self`, so two callers
    /// serialized by the same lock can never both create. The flag is `true`
    /// when this call created the entry.
    pub fn get_or_insert_with<F>(&mut self, key: &str, create: F) -> Result<(&mut V, bool), MapError>
    where
        F: FnOnce() -> V,
    {
        validate_key(key)?;
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(slot) => Ok((slot.into_mut(), false)),
            Entry::Vacant(slot) => Ok((slot.insert(create()), true)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.remove(key)
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, V> {
        self.entries.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, V> {
        self.entries.keys()
    }

    pub fn values(&self) -> btree_map::Values<'_, String, V> {
        self.entries.values()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V> Default for NameMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V> IntoIterator for &'a NameMap<V> {
    type Item = (&'a String, &'a V);
    type IntoIter = btree_map::Iter<'a, String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
