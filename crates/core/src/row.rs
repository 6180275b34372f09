//! Rows and search rows.
//!
//! A `Row` is a complete set of cells shaped by the owning table. A
//! `SearchRow` carries a scan bound: each cell is either a value or absent,
//! and an absent cell means "do not constrain this column".

use crate::value::Value;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a row.
pub type RowId = u64;

/// Row ID for rows that don't correspond to a stored entry
/// (e.g. rows materialized from a query result).
pub const DUMMY_ROW_ID: RowId = u64::MAX;

static NEXT_ROW_ID: AtomicU64 = AtomicU64::new(0);

/// Gets the next unique row ID.
pub fn next_row_id() -> RowId {
    NEXT_ROW_ID.fetch_add(1, Ordering::SeqCst)
}

/// Read access to the cells of a row-shaped value.
///
/// Comparators work against this trait so the same code orders full rows
/// against full rows and full rows against partial search bounds.
pub trait RowValues {
    /// Number of column slots.
    fn column_count(&self) -> usize;

    /// The value of column `index`, or `None` when the slot carries no value.
    fn value_at(&self, index: usize) -> Option<&Value>;
}

/// A full row: one value per table column.
#[derive(Clone, Debug)]
pub struct Row {
    id: RowId,
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row with the given ID and values.
    pub fn new(id: RowId, values: Vec<Value>) -> Self {
        Self { id, values }
    }

    /// Creates a new row with an automatically assigned ID.
    pub fn create(values: Vec<Value>) -> Self {
        Self::new(next_row_id(), values)
    }

    /// Creates a row of `column_count` NULL cells that isn't backed by storage.
    pub fn template(column_count: usize) -> Self {
        Self::new(DUMMY_ROW_ID, alloc::vec![Value::Null; column_count])
    }

    /// Creates a dummy row (query results, join results, etc.).
    pub fn dummy(values: Vec<Value>) -> Self {
        Self::new(DUMMY_ROW_ID, values)
    }

    #[inline]
    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn set_id(&mut self, id: RowId) {
        self.id = id;
    }

    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the row, returning its cells.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Sets a value at the given column index. Returns false when the index
    /// is outside the row's shape; the row never grows.
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Fills the row from `source`, padding columns the source lacks with NULL.
    pub fn fill_from(&mut self, source: &[Value]) {
        for (i, slot) in self.values.iter_mut().enumerate() {
            *slot = source.get(i).cloned().unwrap_or(Value::Null);
        }
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.id == DUMMY_ROW_ID
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.values == other.values
    }
}

impl RowValues for Row {
    fn column_count(&self) -> usize {
        self.values.len()
    }

    fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

/// A scan bound shaped like a table row, where any cell may be absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchRow {
    cells: Vec<Option<Value>>,
}

impl SearchRow {
    /// Creates a bound with `column_count` absent cells.
    pub fn new(column_count: usize) -> Self {
        Self {
            cells: alloc::vec![None; column_count],
        }
    }

    /// Creates a bound whose leading columns hold `values` and the rest are absent.
    pub fn prefix<I>(column_count: usize, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut row = Self::new(column_count);
        for (slot, value) in row.cells.iter_mut().zip(values) {
            *slot = Some(value.into());
        }
        row
    }

    /// Creates a bound that constrains every column of `row`.
    pub fn from_row(row: &Row) -> Self {
        Self {
            cells: row.values().iter().cloned().map(Some).collect(),
        }
    }

    /// Sets column `index` to a value. Returns false when out of shape.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> bool {
        match self.cells.get_mut(index) {
            Some(slot) => {
                *slot = Some(value.into());
                true
            }
            None => false,
        }
    }

    /// Marks column `index` as unconstrained.
    pub fn clear(&mut self, index: usize) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = None;
        }
    }

    pub fn cells(&self) -> &[Option<Value>] {
        &self.cells
    }
}

impl RowValues for SearchRow {
    fn column_count(&self) -> usize {
        self.cells.len()
    }

    fn value_at(&self, index: usize) -> Option<&Value> {
        self.cells.get(index).and_then(Option::as_ref)
    }
}
