//! B+Tree index implementation.
//!
//! `BTreeIndex` is the generic key → row-id tree; `BTreeRowIndex` stores rows
//! behind one and serves ordered range scans.

mod iter;
mod node;
mod row_index;
mod tree;

pub use iter::{BTreeIterator, Position};
pub use node::{Node, NodeId};
pub use row_index::{BTreeCursor, BTreeRowIndex};
pub use tree::BTreeIndex;
