//! Query expression indexes.
//!
//! Views, derived tables and recursive common table expressions have no
//! stored rows. They are scanned through a `QueryExpressionIndex`, which
//! evaluates the backing query on demand and presents its output through
//! the same `Index` / `Cursor` contract as a physical index.

mod cursor;
mod index;
mod query;
mod result;

pub use cursor::QueryExpressionCursor;
pub use index::{CompiledQuery, QueryExpressionIndex, SharedResult};
pub use query::{QueryExpression, ValuesQuery};
pub use result::{LocalResult, QueryResult};
