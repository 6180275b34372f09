//! B+Tree node definitions.

use crate::comparator::Comparator;
use alloc::vec::Vec;
use quarry_core::RowId;

/// Node identifier in the B+Tree arena.
pub type NodeId = usize;

/// A node in the B+Tree.
#[derive(Clone, Debug)]
pub struct Node<K> {
    pub keys: Vec<K>,
    /// For leaf nodes: row IDs associated with each key. Empty for internal nodes.
    pub values: Vec<Vec<RowId>>,
    /// For internal nodes: child node IDs. Empty for leaf nodes.
    pub children: Vec<NodeId>,
    /// Leaf chain, forward.
    pub next: Option<NodeId>,
    /// Leaf chain, backward.
    pub prev: Option<NodeId>,
    pub is_leaf: bool,
    pub parent: Option<NodeId>,
}

impl<K> Node<K> {
    pub fn new_leaf() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            children: Vec::new(),
            next: None,
            prev: None,
            is_leaf: true,
            parent: None,
        }
    }

    pub fn new_internal() -> Self {
        Self {
            is_leaf: false,
            ..Self::new_leaf()
        }
    }

    #[inline]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Finds the position where a key should be inserted.
    pub fn find_key_position<C: Comparator<K>>(&self, key: &K, cmp: &C) -> usize {
        self.keys.partition_point(|k| cmp.is_less(k, key))
    }

    /// Finds the exact position of a key, or None if not found.
    pub fn find_key<C: Comparator<K>>(&self, key: &K, cmp: &C) -> Option<usize> {
        let pos = self.find_key_position(key, cmp);
        (pos < self.keys.len() && cmp.is_equal(&self.keys[pos], key)).then_some(pos)
    }

    /// Inserts a key-value pair in a leaf, appending to the key's row IDs
    /// when the key is already present at `pos`.
    pub fn insert_at<C: Comparator<K>>(&mut self, pos: usize, key: K, value: RowId, cmp: &C) {
        debug_assert!(self.is_leaf);
        if pos < self.keys.len() && cmp.is_equal(&self.keys[pos], &key) {
            self.values[pos].push(value);
        } else {
            self.keys.insert(pos, key);
            self.values.insert(pos, alloc::vec![value]);
        }
    }

    /// Removes row IDs of the key at `pos` from a leaf; the key goes away
    /// with its last row ID. Returns the number of row IDs removed.
    pub fn remove_at(&mut self, pos: usize, value: Option<RowId>) -> usize {
        debug_assert!(self.is_leaf);
        let removed = match value {
            Some(v) => {
                let values = &mut self.values[pos];
                let before = values.len();
                values.retain(|&x| x != v);
                before - values.len()
            }
            None => self.values[pos].len(),
        };
        if value.is_none() || self.values[pos].is_empty() {
            self.keys.remove(pos);
            self.values.remove(pos);
        }
        removed
    }
}
