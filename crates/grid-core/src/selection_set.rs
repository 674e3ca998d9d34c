//! Persistent set of selected row keys.
//!
//! Every mutator returns a new set and leaves the receiver untouched. The backing storage is
//! shared copy-on-write: clones are cheap, and a mutation copies once.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

/// An immutable set of opaque keys that remembers insertion order.
///
/// Membership is order-insensitive; [`to_list`](Self::to_list) returns keys in the order they
/// were first added. Callers that need view order must sort by row position themselves.
#[derive(Debug, Clone)]
pub struct ImmutableSelectionSet<K> {
    order: Arc<Vec<K>>,
    members: Arc<HashSet<K>>,
}

impl<K: Clone + Eq + Hash> ImmutableSelectionSet<K> {
    /// The empty set.
    pub fn empty() -> Self {
        Self {
            order: Arc::new(Vec::new()),
            members: Arc::new(HashSet::new()),
        }
    }

    /// A set holding exactly `keys` (duplicates collapse).
    pub fn just<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        Self::empty().add(keys)
    }

    /// Whether `key` is a member.
    pub fn has(&self, key: &K) -> bool {
        self.members.contains(key)
    }

    /// A new set with `keys` added.
    pub fn add<I>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut next = self.clone();
        for key in keys {
            if !next.members.contains(&key) {
                Arc::make_mut(&mut next.members).insert(key.clone());
                Arc::make_mut(&mut next.order).push(key);
            }
        }
        next
    }

    /// A new set without `key`.
    pub fn delete(&self, key: &K) -> Self {
        if !self.has(key) {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.members).remove(key);
        Arc::make_mut(&mut next.order).retain(|k| k != key);
        next
    }

    /// A new set with the membership of `key` flipped.
    pub fn toggle(&self, key: &K) -> Self {
        if self.has(key) {
            self.delete(key)
        } else {
            self.add([key.clone()])
        }
    }

    /// The empty set (kept as a method so call sites read like the other mutators).
    pub fn clear(&self) -> Self {
        Self::empty()
    }

    /// A new set keeping only the keys accepted by `keep`.
    pub fn retain<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&K) -> bool,
    {
        Self::just(self.order.iter().filter(|k| keep(k)).cloned())
    }

    /// Members in insertion order.
    pub fn to_list(&self) -> Vec<K> {
        self.order.as_ref().clone()
    }

    /// Iterate members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The only member, if the set has exactly one.
    pub fn sole(&self) -> Option<&K> {
        match self.order.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Whether both sets share the same backing storage (no copy has happened between them).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.order, &other.order)
    }
}

impl<K: Clone + Eq + Hash> Default for ImmutableSelectionSet<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: Clone + Eq + Hash> PartialEq for ImmutableSelectionSet<K> {
    /// Set equality: insertion order is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl<K: Clone + Eq + Hash> Eq for ImmutableSelectionSet<K> {}

impl<K: Clone + Eq + Hash> FromIterator<K> for ImmutableSelectionSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self::just(iter)
    }
}
