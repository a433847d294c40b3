//! Roster - An insertion-ordered, id-keyed collection
//!
//! Characters and monsters are processed in the order they joined the campaign,
//! but are always addressed by id. Removing an entry never shifts the ids of the
//! remaining ones.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct Roster<K, V> {
    order: Vec<K>,
    entries: HashMap<K, V>,
}

impl<K, V> Default for Roster<K, V> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> Roster<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced entry keeps its original slot in the order.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.entries.insert(key.clone(), value);
        if previous.is_none() {
            self.order.push(key);
        }
        previous
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Snapshot of the keys in order, safe to hold while mutating entries.
    pub fn keys(&self) -> Vec<K> {
        self.order.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> + '_ {
        self.order.iter().filter_map(|k| self.entries.get(k))
    }
}

impl<K: Eq + Hash, V: PartialEq> PartialEq for Roster<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.entries == other.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_survives_removal_and_replacement() {
        let mut roster = Roster::new();
        roster.insert("a", 1);
        roster.insert("b", 2);
        roster.insert("c", 3);

        assert_eq!(roster.remove(&"b"), Some(2));
        assert_eq!(roster.insert("a", 10), Some(1));
        roster.insert("d", 4);

        assert_eq!(roster.keys(), vec!["a", "c", "d"]);
        assert_eq!(roster.iter().copied().collect::<Vec<_>>(), vec![10, 3, 4]);
        assert_eq!(roster.remove(&"b"), None);
        assert_eq!(roster.len(), 3);
    }
}
