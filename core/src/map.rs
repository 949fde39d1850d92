//! Insertion-ordered map keyed by identifier.
//!
//! Declaration order drives display (help listings) and positional binding,
//! while resolution looks entries up by key. [`OrderedMap`] provides both and
//! refuses to overwrite an existing key.

use std::collections::HashMap;
use std::ops::Index;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{BuildError, Result};

/// A string-keyed map that preserves insertion order and rejects duplicates.
///
/// # Examples
///
/// ```
/// use cmdtree_core::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.insert("zeta", 1).unwrap();
/// map.insert("alpha", 2).unwrap();
///
/// assert!(map.insert("zeta", 3).is_err());
/// assert_eq!(map.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
/// assert_eq!(*map.get("alpha").unwrap(), 2);
/// assert!(map.get("missing").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DuplicateKey`] if `key` is already present; the
    /// map is left unchanged.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Result<()> {
        let key = key.into();
        if self.index.contains_key(&key) {
            return Err(BuildError::DuplicateKey(key));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        Ok(())
    }

    /// Returns a map with the same keys, in the same order, and each value
    /// replaced by `f(value)`.
    pub(crate) fn map_values<U>(&self, mut f: impl FnMut(&V) -> U) -> OrderedMap<U> {
        OrderedMap {
            entries: self
                .entries
                .iter()
                .map(|(key, value)| (key.clone(), f(value)))
                .collect(),
            index: self.index.clone(),
        }
    }

    /// Looks up `key`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NotFound`] if `key` is absent.
    pub fn get(&self, key: &str) -> Result<&V> {
        self.try_get(key)
            .ok_or_else(|| BuildError::NotFound(key.to_string()))
    }

    /// Looks up `key` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NotFound`] if `key` is absent.
    pub fn get_mut(&mut self, key: &str) -> Result<&mut V> {
        match self.index.get(key) {
            Some(&position) => Ok(&mut self.entries[position].1),
            None => Err(BuildError::NotFound(key.to_string())),
        }
    }

    /// Looks up `key`, returning `None` when absent.
    pub fn try_get(&self, key: &str) -> Option<&V> {
        self.index
            .get(key)
            .map(|&position| &self.entries[position].1)
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the position of `key` in insertion order.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, value)| value)
    }

    /// Iterates mutably over values in insertion order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|(_, value)| value)
    }
}

impl<V> Index<&str> for OrderedMap<V> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if `key` is absent, like [`HashMap`]'s `Index` impl.
    fn index(&self, key: &str) -> &V {
        match self.try_get(key) {
            Some(value) => value,
            None => panic!("key not found in ordered map: {key}"),
        }
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_insert_leaves_map_unchanged() {
        let mut map = OrderedMap::new();
        map.insert("dev", 1).unwrap();
        let err = map.insert("dev", 2).unwrap_err();

        assert_eq!(err, BuildError::DuplicateKey("dev".to_string()));
        assert_eq!(map.len(), 1);
        assert_eq!(map["dev"], 1);
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut map = OrderedMap::new();
        for key in ["prompt", "credentials", "help"] {
            map.insert(key, key.len()).unwrap();
        }

        let keys: Vec<_> = map.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["prompt", "credentials", "help"]);
        assert_eq!(map.position("help"), Some(2));
    }

    #[test]
    fn test_map_values_keeps_keys_and_order() {
        let mut map = OrderedMap::new();
        map.insert("scope", "read").unwrap();
        map.insert("tags", "a,b").unwrap();

        let lengths = map.map_values(|value| value.len());
        assert_eq!(lengths.keys().collect::<Vec<_>>(), ["scope", "tags"]);
        assert_eq!(lengths["tags"], 3);
        assert!(lengths.contains("scope"));
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let mut map: OrderedMap<u8> = OrderedMap::new();
        assert_eq!(
            map.get("nope").unwrap_err(),
            BuildError::NotFound("nope".to_string())
        );
        assert!(map.get_mut("nope").is_err());
        assert!(!map.contains("nope"));
        assert!(map.is_empty());
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let mut map = OrderedMap::new();
        map.insert("b", 1).unwrap();
        map.insert("a", 2).unwrap();

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"b":1,"a":2}"#);
    }
}
