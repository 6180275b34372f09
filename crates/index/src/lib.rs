//! Quarry Index - Index and cursor implementations for the Quarry scan engine.
//!
//! Every access path implements the `Index` trait and hands out `Cursor`s:
//!
//! - `BTreeRowIndex`: stored rows in a B+Tree, ordered range scans
//! - `HashRowIndex`: stored rows in a hash map, equality scans
//! - `QueryExpressionIndex`: rows computed by a view, derived table or
//!   recursive query on every scan
//!
//! All of them prune against scan bounds with the same `RowComparator`.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use quarry_core::schema::{Order, TableBuilder, TableKind};
//! use quarry_core::{DataType, SearchRow, Value};
//! use quarry_index::{
//!     read_all, Index, QueryExpression, QueryExpressionIndex, ScanSettings, ValuesQuery,
//! };
//!
//! let table = TableBuilder::new("v")
//!     .unwrap()
//!     .kind(TableKind::View)
//!     .add_column("a", DataType::Int64)
//!     .unwrap()
//!     .add_query_index("idxA", &[("a", Order::Asc)])
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let rows = (1..=3).map(|i| vec![Value::Int64(i)]).collect();
//! let query: Rc<dyn QueryExpression> = Rc::new(ValuesQuery::new(1, rows));
//! let index = QueryExpressionIndex::plain(table, "idxA", query, ScanSettings::new()).unwrap();
//!
//! let lower = SearchRow::prefix(1, [2i64]);
//! let mut cursor = index.scan(Some(&lower), None).unwrap();
//! let found = read_all(cursor.as_mut()).unwrap();
//! assert_eq!(found.len(), 2);
//! ```

#![no_std]

extern crate alloc;

pub mod btree;
pub mod comparator;
pub mod hash;
pub mod query_expr;
pub mod settings;
pub mod stats;
pub mod traits;

pub use btree::{BTreeIndex, BTreeRowIndex};
pub use comparator::{Comparator, RowComparator, SimpleComparator};
pub use hash::{HashIndex, HashRowIndex};
pub use query_expr::{
    CompiledQuery, LocalResult, QueryExpression, QueryExpressionCursor, QueryExpressionIndex,
    QueryResult, SharedResult, ValuesQuery,
};
pub use settings::ScanSettings;
pub use stats::IndexStats;
pub use traits::{read_all, Cursor, CursorState, Index, IndexError, IndexKind, KeyIndex};
