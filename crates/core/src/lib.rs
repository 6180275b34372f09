//! Quarry Core - values, rows and schema definitions for the Quarry scan engine.
//!
//! This crate holds the types every index and cursor implementation shares:
//!
//! - `DataType`: column types (Boolean, Int32, Int64, Float64, String, DateTime, Bytes)
//! - `Value`: a typed cell value, with `Value::Null` as the SQL NULL sentinel
//! - `Row`: a full row materialized from a table's template
//! - `SearchRow`: a possibly partial bound row used to constrain scans
//! - `schema`: table, column and index definitions
//! - `Error`: the engine error type
//!
//! # Example
//!
//! ```rust
//! use quarry_core::{DataType, RowValues, SearchRow, Value};
//! use quarry_core::schema::TableBuilder;
//!
//! let table = TableBuilder::new("users")
//!     .unwrap()
//!     .add_column("id", DataType::Int64)
//!     .unwrap()
//!     .add_column("name", DataType::String)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! // Template rows start out as all NULL.
//! let mut row = table.template_row();
//! assert_eq!(row.column_count(), 2);
//! assert!(row.get(1).unwrap().is_null());
//! row.set(0, Value::Int64(1));
//!
//! // A search row only constrains the columns it carries.
//! let bound = SearchRow::prefix(2, [Value::Int64(1)]);
//! assert_eq!(bound.value_at(0), Some(&Value::Int64(1)));
//! assert_eq!(bound.value_at(1), None);
//! ```

#![no_std]

extern crate alloc;

mod error;
mod row;
pub mod schema;
mod types;
mod value;

pub use error::{Error, Result};
pub use row::{next_row_id, Row, RowId, RowValues, SearchRow, DUMMY_ROW_ID};
pub use types::DataType;
pub use value::Value;
