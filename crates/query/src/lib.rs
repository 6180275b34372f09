//! Quarry Query - Views, DDL and recursive queries for the Quarry scan engine.
//!
//! This crate sits on top of the query expression index:
//!
//! - `view`: stored queries and their recompilation
//! - `ddl`: `ALTER VIEW ... RECOMPILE`
//! - `recursive`: fixed-point evaluation of `WITH RECURSIVE`
//! - `catalog`: views by name
//! - `session`: users and schema ownership
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use quarry_core::schema::{Order, Table, TableBuilder, TableKind};
//! use quarry_core::{DataType, Result, Value};
//! use quarry_index::{read_all, Index, QueryExpression, ScanSettings, ValuesQuery};
//! use quarry_query::{AlterView, Catalog, QueryCompiler, User, View};
//!
//! struct Constant;
//!
//! impl QueryCompiler for Constant {
//!     fn compile(&self, _sql: &str, _table: &Table) -> Result<Rc<dyn QueryExpression>> {
//!         Ok(Rc::new(ValuesQuery::new(1, vec![vec![Value::Int64(42)]])))
//!     }
//! }
//!
//! let table = TableBuilder::new("answer")
//!     .unwrap()
//!     .kind(TableKind::View)
//!     .add_column("a", DataType::Int64)
//!     .unwrap()
//!     .add_query_index("idxA", &[("a", Order::Asc)])
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let view = View::create(table, "idxA", "SELECT 42", &Constant, ScanSettings::new(), false)
//!     .unwrap();
//! let mut catalog = Catalog::new();
//! catalog.add_view(view).unwrap();
//!
//! AlterView::new("answer")
//!     .update(&mut catalog, &User::admin("SA"), &Constant)
//!     .unwrap();
//!
//! let index = catalog.get_view("answer").unwrap().index();
//! let mut cursor = index.scan(None, None).unwrap();
//! assert_eq!(read_all(cursor.as_mut()).unwrap().len(), 1);
//! ```

#![no_std]

extern crate alloc;

pub mod catalog;
pub mod ddl;
pub mod recursive;
pub mod session;
pub mod view;

#[cfg(test)]
mod testing;

pub use catalog::Catalog;
pub use ddl::AlterView;
pub use recursive::{scan_working, RecursiveQuery, RecursiveStep};
pub use session::User;
pub use view::{QueryCompiler, View};
