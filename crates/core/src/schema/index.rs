//! Index definitions.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

/// How an index produces its rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// Hash index - equality lookups only.
    Hash,
    /// B+Tree index - ordered range scans.
    BTree,
    /// Rows are produced by evaluating the table's stored query.
    QueryExpression,
}

/// Sort order for index columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    /// Applies this order to an ascending comparison result.
    #[inline]
    pub fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            Order::Asc => ord,
            Order::Desc => ord.reverse(),
        }
    }
}

/// Engine-wide policy for where NULL sorts in an index key column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum NullOrdering {
    /// NULL is smaller than every value: first in ascending columns, last in
    /// descending ones.
    #[default]
    Low,
    /// NULL is larger than every value.
    High,
    /// NULL sorts first regardless of column order.
    First,
    /// NULL sorts last regardless of column order.
    Last,
}

impl NullOrdering {
    /// Ordering of a NULL cell against a non-NULL cell in a column with the
    /// given sort order.
    #[inline]
    pub fn null_vs_value(&self, order: Order) -> Ordering {
        match self {
            NullOrdering::Low => order.apply(Ordering::Less),
            NullOrdering::High => order.apply(Ordering::Greater),
            NullOrdering::First => Ordering::Less,
            NullOrdering::Last => Ordering::Greater,
        }
    }
}

/// A column reference within an index definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedColumn {
    pub name: String,
    pub order: Order,
}

impl IndexedColumn {
    /// Creates a new indexed column with default ascending order.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: Order::Asc,
        }
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }
}

/// An index definition in a table schema.
#[derive(Clone, Debug)]
pub struct IndexDef {
    name: String,
    table_name: String,
    columns: Vec<IndexedColumn>,
    unique: bool,
    index_type: IndexType,
}

impl IndexDef {
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        columns: Vec<IndexedColumn>,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            columns,
            unique: false,
            index_type: IndexType::BTree,
        }
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn index_type(mut self, index_type: IndexType) -> Self {
        self.index_type = index_type;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the normalized name (table.index).
    pub fn normalized_name(&self) -> String {
        format!("{}.{}", self.table_name, self.name)
    }

    #[inline]
    pub fn columns(&self) -> &[IndexedColumn] {
        &self.columns
    }

    #[inline]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    #[inline]
    pub fn get_index_type(&self) -> IndexType {
        self.index_type
    }
}

impl PartialEq for IndexDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.table_name == other.table_name
    }
}
