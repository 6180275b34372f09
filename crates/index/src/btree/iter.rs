//! B+Tree positions and iteration.

use super::node::NodeId;
use super::tree::BTreeIndex;
use crate::comparator::Comparator;
use quarry_core::RowId;

/// A position on one row ID of one key in a leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub node: NodeId,
    pub key: usize,
    pub value: usize,
}

/// Iterator over the (key, row id) entries of a B+Tree, in either direction.
pub struct BTreeIterator<'a, K, C> {
    tree: &'a BTreeIndex<K, C>,
    position: Option<Position>,
    reverse: bool,
}

impl<'a, K: Clone, C: Comparator<K>> BTreeIterator<'a, K, C> {
    pub fn new(tree: &'a BTreeIndex<K, C>, start: Option<Position>, reverse: bool) -> Self {
        Self {
            tree,
            position: start,
            reverse,
        }
    }
}

impl<'a, K: Clone, C: Comparator<K>> Iterator for BTreeIterator<'a, K, C> {
    type Item = (&'a K, RowId);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.position?;
        self.position = if self.reverse {
            self.tree.prev_position(current)
        } else {
            self.tree.next_position(current)
        };
        Some(self.tree.entry(current))
    }
}
