//! Evaluator results.

use alloc::vec::Vec;
use quarry_core::{Error, Result, Value};

/// A forward-only stream of tuples produced by evaluating a query.
///
/// A tuple may carry fewer values than the table it is read into; missing
/// trailing cells are treated as NULL by consumers.
pub trait QueryResult {
    /// Advances to the next tuple. Returns false at the end of the result.
    fn next(&mut self) -> Result<bool>;

    /// Values of the current tuple. Empty before the first `next` and after
    /// the end.
    fn current_row(&self) -> &[Value];

    /// Rewinds to before the first tuple without releasing anything.
    fn reset(&mut self) -> Result<()>;

    /// Releases the result. A closed result cannot be read or reset.
    fn close(&mut self);

    fn is_closed(&self) -> bool;

    fn column_count(&self) -> usize;
}

/// An in-memory result buffer.
///
/// Serves as the working table of a recursive query and as the materialized
/// output of a derived table.
#[derive(Clone, Debug, Default)]
pub struct LocalResult {
    column_count: usize,
    rows: Vec<Vec<Value>>,
    /// Number of rows consumed by the reader.
    position: usize,
    exhausted: bool,
    closed: bool,
}

impl LocalResult {
    pub fn new(column_count: usize) -> Self {
        Self {
            column_count,
            ..Self::default()
        }
    }

    pub fn from_rows(column_count: usize, rows: Vec<Vec<Value>>) -> Self {
        Self {
            column_count,
            rows,
            ..Self::default()
        }
    }

    /// Appends a tuple. Rows added after the reader reached the end are seen
    /// after the next `reset`.
    pub fn add_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    /// Replaces every tuple and rewinds.
    pub fn set_rows(&mut self, rows: Vec<Vec<Value>>) {
        self.rows = rows;
        self.position = 0;
        self.exhausted = false;
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl QueryResult for LocalResult {
    fn next(&mut self) -> Result<bool> {
        if self.closed {
            return Err(Error::internal("read from a closed result"));
        }
        if !self.exhausted && self.position < self.rows.len() {
            self.position += 1;
            Ok(true)
        } else {
            self.exhausted = true;
            Ok(false)
        }
    }

    fn current_row(&self) -> &[Value] {
        if self.exhausted {
            return &[];
        }
        match self.position.checked_sub(1).and_then(|i| self.rows.get(i)) {
            Some(row) => row.as_slice(),
            None => &[],
        }
    }

    fn reset(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::internal("reset of a closed result"));
        }
        self.position = 0;
        self.exhausted = false;
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
        self.rows = Vec::new();
        self.position = 0;
        self.exhausted = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn column_count(&self) -> usize {
        self.column_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn ints(values: &[i64]) -> Vec<Vec<Value>> {
        values.iter().map(|v| vec![Value::Int64(*v)]).collect()
    }

    #[test]
    fn test_read_and_reset() {
        let mut result = LocalResult::from_rows(1, ints(&[1, 2]));
        assert!(result.current_row().is_empty());
        assert!(result.next().unwrap());
        assert_eq!(result.current_row(), &[Value::Int64(1)]);
        assert!(result.next().unwrap());
        assert!(!result.next().unwrap());
        assert!(result.current_row().is_empty());
        assert!(!result.next().unwrap());

        result.reset().unwrap();
        assert!(result.next().unwrap());
        assert_eq!(result.current_row(), &[Value::Int64(1)]);
    }

    #[test]
    fn test_rows_added_after_end_visible_after_reset() {
        let mut result = LocalResult::from_rows(1, ints(&[1]));
        while result.next().unwrap() {}
        result.add_row(vec![Value::Int64(2)]);
        result.add_row(vec![Value::Int64(3)]);
        assert!(!result.next().unwrap());
        result.reset().unwrap();
        let mut seen = Vec::new();
        while result.next().unwrap() {
            seen.push(result.current_row()[0].clone());
        }
        assert_eq!(seen, vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)]);
    }

    #[test]
    fn test_set_rows_rewinds() {
        let mut result = LocalResult::from_rows(1, ints(&[1, 2]));
        assert!(result.next().unwrap());
        result.set_rows(ints(&[7]));
        assert!(result.next().unwrap());
        assert_eq!(result.current_row(), &[Value::Int64(7)]);
        assert_eq!(result.row_count(), 1);
    }

    #[test]
    fn test_closed_result_rejects_reads() {
        let mut result = LocalResult::from_rows(1, ints(&[1]));
        result.close();
        assert!(result.is_closed());
        assert!(result.is_empty());
        assert!(result.next().unwrap_err().is_internal());
        assert!(result.reset().is_err());
    }
}
