//! Index and cursor contracts.
//!
//! `KeyIndex` is the storage-level contract of a key → row-id structure.
//! `Index` and `Cursor` are the row-level contract every access path
//! satisfies, whether its rows are stored or computed by a query.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use quarry_core::schema::Table;
use quarry_core::{Result, Row, RowId, RowValues, SearchRow};
use thiserror::Error as ThisError;

use crate::comparator::RowComparator;

/// Storage-level contract for key → row-id structures.
pub trait KeyIndex<K> {
    /// Adds a key-value pair to the index.
    /// For unique indexes, this will fail if the key already exists.
    fn add(&mut self, key: K, value: RowId) -> core::result::Result<(), IndexError>;

    /// Gets all row IDs associated with a key.
    fn get(&self, key: &K) -> Vec<RowId>;

    /// Removes a key (and optionally a specific value) from the index.
    /// If value is None, removes all values for the key.
    fn remove(&mut self, key: &K, value: Option<RowId>);

    fn contains_key(&self, key: &K) -> bool;

    /// Returns the number of row IDs in the index.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);
}

/// Error type for key-index operations.
#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum IndexError {
    /// Attempted to insert a duplicate key in a unique index.
    #[error("Duplicate key in unique index")]
    DuplicateKey,
}

/// The closed set of index implementations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Stored rows in a B+Tree ordered by the key columns.
    BTree,
    /// Stored rows in a hash map on the full key.
    Hash,
    /// Rows re-computed from a query on every scan.
    QueryExpression,
    /// Rows read from the shared working table of a recursive query.
    Recursive,
}

impl IndexKind {
    /// Returns true if rows are produced by a query rather than read from storage.
    pub fn is_query_backed(&self) -> bool {
        matches!(self, IndexKind::QueryExpression | IndexKind::Recursive)
    }
}

/// Position of a cursor in its scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorState {
    /// Created, `next` not called yet.
    BeforeFirst,
    /// Positioned on a row; `get` returns it.
    OnRow,
    /// `next` has reported the end of the scan.
    Exhausted,
}

/// Stateful iteration over the rows of one index scan.
pub trait Cursor {
    /// Advances to the next row in range. Returns false once the scan is over.
    fn next(&mut self) -> Result<bool>;

    /// The current row, while the cursor is on a row.
    fn get(&self) -> Option<&Row>;

    /// The current row as a search key. Indexes without a compact key
    /// representation return the full row.
    fn search_row(&self) -> Option<&Row> {
        self.get()
    }

    /// Moves to the previous row in range, for cursors that can go backwards.
    fn previous(&mut self) -> Result<bool>;

    fn state(&self) -> CursorState;
}

/// A queryable access path over a table's rows.
pub trait Index {
    fn name(&self) -> &str;

    /// The table whose rows this index yields.
    fn table(&self) -> &Table;

    fn kind(&self) -> IndexKind;

    /// The ordering used for key placement and range pruning.
    fn comparator(&self) -> &RowComparator;

    /// Compares two rows on this index's key columns.
    fn compare_rows(&self, a: &dyn RowValues, b: &dyn RowValues) -> Ordering {
        self.comparator().compare_rows(a, b)
    }

    /// Returns true if a forward scan yields rows sorted by `compare_rows`.
    fn is_ordered(&self) -> bool;

    /// Opens a cursor over the rows with `lower <= key <= upper`.
    /// A missing bound leaves that side unbounded. Bounds are borrowed for
    /// the lifetime of the cursor and never modified.
    fn scan<'a>(
        &'a self,
        lower: Option<&'a SearchRow>,
        upper: Option<&'a SearchRow>,
    ) -> Result<Box<dyn Cursor + 'a>>;
}

/// Drains a cursor, returning every remaining row in scan order.
pub fn read_all(cursor: &mut dyn Cursor) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    while cursor.next()? {
        if let Some(row) = cursor.get() {
            rows.push(row.clone());
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_index_kind_query_backed() {
        assert!(!IndexKind::BTree.is_query_backed());
        assert!(!IndexKind::Hash.is_query_backed());
        assert!(IndexKind::QueryExpression.is_query_backed());
        assert!(IndexKind::Recursive.is_query_backed());
    }

    #[test]
    fn test_index_error_display() {
        assert_eq!(IndexError::DuplicateKey.to_string(), "Duplicate key in unique index");
    }
}
