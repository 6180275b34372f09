//! B+Tree implementation.

use super::iter::{BTreeIterator, Position};
use super::node::{Node, NodeId};
use crate::comparator::{Comparator, SimpleComparator};
use crate::settings::MIN_BTREE_ORDER;
use crate::stats::IndexStats;
use crate::traits::{IndexError, KeyIndex};
use alloc::vec::Vec;
use quarry_core::RowId;

/// A B+Tree mapping keys to row IDs, ordered by a pluggable comparator.
///
/// Deletion removes keys from their leaf without rebalancing. Empty leaves
/// stay in the leaf chain and are skipped by positioning, so separator keys
/// in internal nodes remain valid routing bounds.
#[derive(Debug)]
pub struct BTreeIndex<K, C = SimpleComparator> {
    arena: Vec<Node<K>>,
    root: NodeId,
    /// Maximum number of keys per node.
    order: usize,
    unique: bool,
    comparator: C,
    stats: IndexStats,
}

impl<K: Clone + Ord> BTreeIndex<K> {
    /// Creates a new B+Tree ordered by `K: Ord` ascending.
    pub fn new(order: usize, unique: bool) -> Self {
        Self::with_comparator(order, unique, SimpleComparator::asc())
    }
}

impl<K: Clone, C: Comparator<K>> BTreeIndex<K, C> {
    pub fn with_comparator(order: usize, unique: bool, comparator: C) -> Self {
        let mut arena = Vec::new();
        let root = Self::alloc_node(&mut arena, Node::new_leaf());
        Self {
            arena,
            root,
            order: order.max(MIN_BTREE_ORDER),
            unique,
            comparator,
            stats: IndexStats::new(),
        }
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    fn alloc_node(arena: &mut Vec<Node<K>>, node: Node<K>) -> NodeId {
        let id = arena.len();
        arena.push(node);
        id
    }

    /// Finds the leaf node that should contain the given key.
    fn find_leaf(&self, key: &K) -> NodeId {
        let mut current = self.root;
        while !self.arena[current].is_leaf {
            let node = &self.arena[current];
            current = node.children[self.find_child_position(node, key)];
        }
        current
    }

    /// Child to descend into: the number of separators not greater than `key`.
    #[inline]
    fn find_child_position(&self, node: &Node<K>, key: &K) -> usize {
        let pos = node
            .keys
            .partition_point(|k| !self.comparator.is_less(key, k));
        pos.min(node.children.len().saturating_sub(1))
    }

    fn insert(&mut self, key: K, value: RowId) -> Result<(), IndexError> {
        let leaf_id = self.find_leaf(&key);
        let cmp = &self.comparator;

        if self.unique && self.arena[leaf_id].find_key(&key, cmp).is_some() {
            return Err(IndexError::DuplicateKey);
        }

        let pos = self.arena[leaf_id].find_key_position(&key, cmp);
        self.arena[leaf_id].insert_at(pos, key, value, cmp);
        self.stats.add_rows(1);

        if self.arena[leaf_id].key_count() >= self.order {
            self.split_leaf(leaf_id);
        }
        Ok(())
    }

    fn split_leaf(&mut self, leaf_id: NodeId) {
        let mid = self.arena[leaf_id].key_count() / 2;

        let mut new_leaf = Node::new_leaf();
        new_leaf.keys = self.arena[leaf_id].keys.split_off(mid);
        new_leaf.values = self.arena[leaf_id].values.split_off(mid);
        new_leaf.next = self.arena[leaf_id].next;
        new_leaf.prev = Some(leaf_id);
        new_leaf.parent = self.arena[leaf_id].parent;
        let promote_key = new_leaf.keys[0].clone();

        let new_leaf_id = Self::alloc_node(&mut self.arena, new_leaf);
        if let Some(next_id) = self.arena[leaf_id].next {
            self.arena[next_id].prev = Some(new_leaf_id);
        }
        self.arena[leaf_id].next = Some(new_leaf_id);

        self.insert_into_parent(leaf_id, promote_key, new_leaf_id);
    }

    fn insert_into_parent(&mut self, left_id: NodeId, key: K, right_id: NodeId) {
        match self.arena[left_id].parent {
            None => {
                let mut new_root = Node::new_internal();
                new_root.children.push(left_id);
                new_root.children.push(right_id);
                new_root.keys.push(key);

                let new_root_id = Self::alloc_node(&mut self.arena, new_root);
                self.arena[left_id].parent = Some(new_root_id);
                self.arena[right_id].parent = Some(new_root_id);
                self.root = new_root_id;
            }
            Some(parent_id) => {
                let pos = self.find_child_position(&self.arena[parent_id], &key);
                self.arena[parent_id].keys.insert(pos, key);
                self.arena[parent_id].children.insert(pos + 1, right_id);
                self.arena[right_id].parent = Some(parent_id);

                if self.arena[parent_id].key_count() >= self.order {
                    self.split_internal(parent_id);
                }
            }
        }
    }

    fn split_internal(&mut self, node_id: NodeId) {
        let mid = self.arena[node_id].key_count() / 2;
        let promote_key = self.arena[node_id].keys[mid].clone();

        let mut new_node = Node::new_internal();
        new_node.keys = self.arena[node_id].keys.split_off(mid + 1);
        new_node.children = self.arena[node_id].children.split_off(mid + 1);
        new_node.parent = self.arena[node_id].parent;
        // Drop the promoted separator from the left half.
        self.arena[node_id].keys.pop();

        let new_node_id = Self::alloc_node(&mut self.arena, new_node);
        for i in 0..self.arena[new_node_id].children.len() {
            let child_id = self.arena[new_node_id].children[i];
            self.arena[child_id].parent = Some(new_node_id);
        }

        self.insert_into_parent(node_id, promote_key, new_node_id);
    }

    fn delete(&mut self, key: &K, value: Option<RowId>) {
        let leaf_id = self.find_leaf(key);
        if let Some(pos) = self.arena[leaf_id].find_key(key, &self.comparator) {
            let removed = self.arena[leaf_id].remove_at(pos, value);
            self.stats.remove_rows(removed);
        }
    }

    fn leftmost_leaf(&self) -> NodeId {
        let mut current = self.root;
        while !self.arena[current].is_leaf {
            current = self.arena[current].children[0];
        }
        current
    }

    fn rightmost_leaf(&self) -> NodeId {
        let mut current = self.root;
        while !self.arena[current].is_leaf {
            let children = &self.arena[current].children;
            current = children[children.len() - 1];
        }
        current
    }

    /// First entry at or after key slot `key` of `node`, following the leaf chain.
    fn forward_from(&self, mut node: NodeId, mut key: usize) -> Option<Position> {
        loop {
            let leaf = &self.arena[node];
            if key < leaf.key_count() {
                return Some(Position { node, key, value: 0 });
            }
            node = leaf.next?;
            key = 0;
        }
    }

    /// Last entry of `node` or of the nearest non-empty leaf before it.
    fn backward_from(&self, mut node: NodeId) -> Option<Position> {
        loop {
            let leaf = &self.arena[node];
            if let Some(values) = leaf.values.last() {
                return Some(Position {
                    node,
                    key: leaf.key_count() - 1,
                    value: values.len() - 1,
                });
            }
            node = leaf.prev?;
        }
    }

    /// Position of the smallest entry.
    pub fn first(&self) -> Option<Position> {
        self.forward_from(self.leftmost_leaf(), 0)
    }

    /// Position of the largest entry.
    pub fn last(&self) -> Option<Position> {
        self.backward_from(self.rightmost_leaf())
    }

    /// Position of the first entry whose key is not `below`.
    ///
    /// `below` must be monotone in tree order: true for a (possibly empty)
    /// prefix of the keys and false for the rest.
    pub fn seek<F: Fn(&K) -> bool>(&self, below: F) -> Option<Position> {
        let mut current = self.root;
        while !self.arena[current].is_leaf {
            let node = &self.arena[current];
            let pos = node.keys.partition_point(&below);
            current = node.children[pos.min(node.children.len() - 1)];
        }
        let pos = self.arena[current].keys.partition_point(&below);
        self.forward_from(current, pos)
    }

    pub fn next_position(&self, at: Position) -> Option<Position> {
        let values = &self.arena[at.node].values[at.key];
        if at.value + 1 < values.len() {
            return Some(Position {
                value: at.value + 1,
                ..at
            });
        }
        self.forward_from(at.node, at.key + 1)
    }

    pub fn prev_position(&self, at: Position) -> Option<Position> {
        if at.value > 0 {
            return Some(Position {
                value: at.value - 1,
                ..at
            });
        }
        if at.key > 0 {
            let key = at.key - 1;
            let value = self.arena[at.node].values[key].len() - 1;
            return Some(Position {
                node: at.node,
                key,
                value,
            });
        }
        self.backward_from(self.arena[at.node].prev?)
    }

    /// The key and row ID at a position.
    pub fn entry(&self, at: Position) -> (&K, RowId) {
        let node = &self.arena[at.node];
        (&node.keys[at.key], node.values[at.key][at.value])
    }

    /// Iterates all entries in key order.
    pub fn iter(&self) -> BTreeIterator<'_, K, C> {
        BTreeIterator::new(self, self.first(), false)
    }

    /// Iterates all entries in reverse key order.
    pub fn iter_rev(&self) -> BTreeIterator<'_, K, C> {
        BTreeIterator::new(self, self.last(), true)
    }

    /// Iterates entries from the first key not `below`, in key order.
    pub fn iter_from<F: Fn(&K) -> bool>(&self, below: F) -> BTreeIterator<'_, K, C> {
        BTreeIterator::new(self, self.seek(below), false)
    }

    /// Returns the depth of the tree (a lone root leaf has depth 1).
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self.root;
        while !self.arena[current].is_leaf {
            current = self.arena[current].children[0];
            depth += 1;
        }
        depth
    }
}

impl<K: Clone, C: Comparator<K>> KeyIndex<K> for BTreeIndex<K, C> {
    fn add(&mut self, key: K, value: RowId) -> Result<(), IndexError> {
        self.insert(key, value)
    }

    fn get(&self, key: &K) -> Vec<RowId> {
        let leaf_id = self.find_leaf(key);
        let leaf = &self.arena[leaf_id];
        match leaf.find_key(key, &self.comparator) {
            Some(pos) => leaf.values[pos].clone(),
            None => Vec::new(),
        }
    }

    fn remove(&mut self, key: &K, value: Option<RowId>) {
        self.delete(key, value);
    }

    fn contains_key(&self, key: &K) -> bool {
        let leaf_id = self.find_leaf(key);
        self.arena[leaf_id].find_key(key, &self.comparator).is_some()
    }

    fn len(&self) -> usize {
        self.stats.total_rows()
    }

    fn clear(&mut self) {
        self.arena.clear();
        self.root = Self::alloc_node(&mut self.arena, Node::new_leaf());
        self.stats.clear();
    }
}
