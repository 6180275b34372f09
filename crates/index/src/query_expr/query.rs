//! Compiled queries.

use super::result::{LocalResult, QueryResult};
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use quarry_core::{Result, Value};

/// A compiled query that can be evaluated any number of times.
pub trait QueryExpression {
    /// The query text, for diagnostics.
    fn sql(&self) -> &str;

    /// Number of values in each produced tuple.
    fn column_count(&self) -> usize;

    /// Returns true if the query's output is sorted on the key of the index
    /// it backs (a declared ORDER BY on the key columns).
    fn is_ordered(&self) -> bool {
        false
    }

    /// Starts a fresh evaluation.
    fn execute(&self) -> Result<Box<dyn QueryResult>>;
}

/// A query over a fixed list of tuples, as in `VALUES (..), (..)`.
#[derive(Clone, Debug)]
pub struct ValuesQuery {
    sql: String,
    column_count: usize,
    rows: Vec<Vec<Value>>,
    ordered: bool,
}

impl ValuesQuery {
    pub fn new(column_count: usize, rows: Vec<Vec<Value>>) -> Self {
        Self {
            sql: values_sql(&rows),
            column_count,
            rows,
            ordered: false,
        }
    }

    /// Declares the tuples sorted on the backing index's key.
    pub fn ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
}

fn values_sql(rows: &[Vec<Value>]) -> String {
    let mut sql = String::from("VALUES ");
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push('(');
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&value.to_string());
        }
        sql.push(')');
    }
    sql
}

impl QueryExpression for ValuesQuery {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn is_ordered(&self) -> bool {
        self.ordered
    }

    fn execute(&self) -> Result<Box<dyn QueryResult>> {
        Ok(Box::new(LocalResult::from_rows(
            self.column_count,
            self.rows.clone(),
        )))
    }
}
