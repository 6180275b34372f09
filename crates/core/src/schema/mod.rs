//! Schema definitions: columns, tables and index definitions.

mod column;
mod index;
mod table;

pub use column::Column;
pub use index::{IndexDef, IndexType, IndexedColumn, NullOrdering, Order};
pub use table::{Table, TableBuilder, TableKind, DEFAULT_SCHEMA};
