//! Comparators for index keys and rows.
//!
//! `RowComparator` is the one ordering an index uses both to place keys in a
//! physical structure and to prune rows against scan bounds, so physical and
//! query-backed indexes agree on what "in range" means.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;
use quarry_core::schema::{IndexDef, NullOrdering, Order, Table};
use quarry_core::{Result, RowValues, Value};

/// Trait for comparing index keys.
pub trait Comparator<K> {
    /// Compares two keys according to the comparator's ordering.
    fn compare(&self, a: &K, b: &K) -> Ordering;

    fn is_less(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    fn is_less_or_equal(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) != Ordering::Greater
    }

    fn is_greater(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Greater
    }

    fn is_equal(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

/// A comparator for single keys that implement Ord.
#[derive(Clone, Debug)]
pub struct SimpleComparator {
    order: Order,
}

impl SimpleComparator {
    pub fn new(order: Order) -> Self {
        Self { order }
    }

    pub fn asc() -> Self {
        Self::new(Order::Asc)
    }

    pub fn desc() -> Self {
        Self::new(Order::Desc)
    }

    pub fn order(&self) -> Order {
        self.order
    }
}

impl<K: Ord> Comparator<K> for SimpleComparator {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self.order.apply(a.cmp(b))
    }
}

/// Orders rows on an index's key columns.
///
/// Each key column is a (row position, order) pair. NULL cells are placed by
/// the comparator's `NullOrdering`. A slot that carries no value (an absent
/// cell of a partial search bound) stops the comparison: the rows are
/// considered equal on every remaining key column.
#[derive(Clone, Debug)]
pub struct RowComparator {
    columns: Vec<(usize, Order)>,
    nulls: NullOrdering,
}

impl RowComparator {
    pub fn new(columns: Vec<(usize, Order)>, nulls: NullOrdering) -> Self {
        Self { columns, nulls }
    }

    /// Builds the comparator for an index definition of `table`.
    pub fn for_index(table: &Table, index: &IndexDef, nulls: NullOrdering) -> Result<Self> {
        Ok(Self::new(table.key_columns(index)?, nulls))
    }

    /// Returns the key columns as (row position, order) pairs.
    pub fn columns(&self) -> &[(usize, Order)] {
        &self.columns
    }

    pub fn null_ordering(&self) -> NullOrdering {
        self.nulls
    }

    /// Compares two cells of a key column.
    pub fn compare_values(&self, a: &Value, b: &Value, order: Order) -> Ordering {
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => self.nulls.null_vs_value(order),
            (false, true) => self.nulls.null_vs_value(order).reverse(),
            (false, false) => order.apply(a.cmp(b)),
        }
    }

    /// Compares two rows on the key columns.
    pub fn compare_rows(&self, a: &dyn RowValues, b: &dyn RowValues) -> Ordering {
        for &(pos, order) in &self.columns {
            let (Some(va), Some(vb)) = (a.value_at(pos), b.value_at(pos)) else {
                return Ordering::Equal;
            };
            let cmp = self.compare_values(va, vb, order);
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    }

    /// Compares an extracted key (in key-column order) with a row or bound.
    pub fn compare_key_with(&self, key: &[Value], other: &dyn RowValues) -> Ordering {
        for (i, &(pos, order)) in self.columns.iter().enumerate() {
            let (Some(va), Some(vb)) = (key.get(i), other.value_at(pos)) else {
                return Ordering::Equal;
            };
            let cmp = self.compare_values(va, vb, order);
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    }

    /// Extracts the key-column values of `row`, in key-column order.
    pub fn key_of(&self, row: &dyn RowValues) -> Vec<Value> {
        self.columns
            .iter()
            .map(|&(pos, _)| row.value_at(pos).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// Returns true if `bound` carries a value for every key column.
    pub fn covers(&self, bound: &dyn RowValues) -> bool {
        self.columns
            .iter()
            .all(|&(pos, _)| bound.value_at(pos).is_some())
    }
}

/// An extracted key as one value, for error messages.
pub(crate) fn key_value(mut key: Vec<Value>) -> Value {
    if key.len() == 1 {
        return key.remove(0);
    }
    let parts: Vec<String> = key.iter().map(|v| v.to_string()).collect();
    Value::String(format!("({})", parts.join(", ")))
}

impl Comparator<Vec<Value>> for RowComparator {
    fn compare(&self, a: &Vec<Value>, b: &Vec<Value>) -> Ordering {
        for (i, &(_, order)) in self.columns.iter().enumerate() {
            let cmp = match (a.get(i), b.get(i)) {
                (Some(va), Some(vb)) => self.compare_values(va, vb, order),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    }
}
