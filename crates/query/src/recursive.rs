//! Fixed-point evaluation of recursive common table expressions.
//!
//! The anchor query seeds the working table. Each iteration runs the
//! recursive step, which reads the working table through a recursive
//! `QueryExpressionIndex`, and the rows it derives become the next working
//! table. Evaluation stops when an iteration derives nothing new.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use hashbrown::HashSet;
use quarry_core::schema::Table;
use quarry_core::{Error, Result, Value};
use quarry_index::{
    Index, LocalResult, QueryExpression, QueryExpressionIndex, QueryResult, ScanSettings,
    SharedResult,
};
use tracing::{debug, warn};

/// The recursive member of a recursive query.
pub trait RecursiveStep {
    /// Derives new tuples from the rows of the previous iteration, read
    /// through `working`.
    fn step(&mut self, working: &QueryExpressionIndex) -> Result<Vec<Vec<Value>>>;
}

impl<F> RecursiveStep for F
where
    F: FnMut(&QueryExpressionIndex) -> Result<Vec<Vec<Value>>>,
{
    fn step(&mut self, working: &QueryExpressionIndex) -> Result<Vec<Vec<Value>>> {
        self(working)
    }
}

/// `WITH RECURSIVE name AS (anchor UNION [ALL] step)`.
pub struct RecursiveQuery {
    table: Table,
    index_name: String,
    anchor: Rc<dyn QueryExpression>,
    step: Box<dyn RecursiveStep>,
    union_all: bool,
    settings: ScanSettings,
}

impl RecursiveQuery {
    /// Creates a `UNION ALL` recursive query over `table`, whose working
    /// table is scanned through the query index `index_name`.
    pub fn new(
        table: Table,
        index_name: &str,
        anchor: Rc<dyn QueryExpression>,
        step: Box<dyn RecursiveStep>,
        settings: ScanSettings,
    ) -> Self {
        Self {
            table,
            index_name: index_name.to_string(),
            anchor,
            step,
            union_all: true,
            settings,
        }
    }

    /// With `false`, tuples already produced are dropped (`UNION`).
    pub fn union_all(mut self, union_all: bool) -> Self {
        self.union_all = union_all;
        self
    }

    pub fn name(&self) -> &str {
        self.table.name()
    }

    /// Runs the query to its fixed point and returns every produced tuple:
    /// the anchor's first, then each iteration's in order.
    pub fn evaluate(&mut self) -> Result<LocalResult> {
        let width = self.table.column_count();
        let mut seen = HashSet::new();
        let seed = self.deduplicate(read_tuples(self.anchor.execute()?)?, &mut seen);

        let working = Rc::new(RefCell::new(LocalResult::from_rows(width, seed.clone())));
        let shared: SharedResult = working.clone();
        let mut index = QueryExpressionIndex::recursive(
            self.table.clone(),
            &self.index_name,
            shared,
            self.settings,
        )?;

        let outcome = self.iterate(&index, &working, seed, &mut seen);
        index.close();
        outcome.map(|rows| LocalResult::from_rows(width, rows))
    }

    fn iterate(
        &mut self,
        index: &QueryExpressionIndex,
        working: &RefCell<LocalResult>,
        seed: Vec<Vec<Value>>,
        seen: &mut HashSet<Vec<Value>>,
    ) -> Result<Vec<Vec<Value>>> {
        let limit = self.settings.get_max_recursion_depth();
        let mut all = seed;
        let mut iteration = 0;
        loop {
            let pending = !working
                .try_borrow()
                .map_err(|_| Error::internal("working table is in use"))?
                .is_empty();
            if !pending {
                return Ok(all);
            }
            if iteration == limit {
                warn!(query = self.name(), limit, "recursion limit reached");
                return Err(Error::evaluation(format!(
                    "recursive query {} did not finish within {} iterations",
                    self.name(),
                    limit
                )));
            }
            iteration += 1;
            let derived = self.step.step(index)?;
            let derived = self.deduplicate(derived, seen);
            debug!(
                query = self.name(),
                iteration,
                rows = derived.len(),
                "fixed-point iteration"
            );
            all.extend(derived.iter().cloned());
            working
                .try_borrow_mut()
                .map_err(|_| Error::internal("working table is in use"))?
                .set_rows(derived);
        }
    }

    fn deduplicate(
        &self,
        rows: Vec<Vec<Value>>,
        seen: &mut HashSet<Vec<Value>>,
    ) -> Vec<Vec<Value>> {
        if self.union_all {
            return rows;
        }
        rows.into_iter().filter(|row| seen.insert(row.clone())).collect()
    }
}

/// Reads every tuple of a result and closes it.
fn read_tuples(mut result: Box<dyn QueryResult>) -> Result<Vec<Vec<Value>>> {
    let mut rows = Vec::new();
    while result.next()? {
        rows.push(result.current_row().to_vec());
    }
    result.close();
    Ok(rows)
}

/// Reads the current working table rows through `working`, for steps that
/// only need the previous iteration's tuples.
pub fn scan_working(working: &QueryExpressionIndex) -> Result<Vec<Vec<Value>>> {
    let mut cursor = working.scan(None, None)?;
    let mut rows = Vec::new();
    while cursor.next()? {
        if let Some(row) = cursor.get() {
            rows.push(row.values().to_vec());
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use quarry_core::schema::{Order, TableBuilder, TableKind};
    use quarry_core::DataType;
    use quarry_index::ValuesQuery;

    fn cte_table() -> Table {
        TableBuilder::new("nums")
            .unwrap()
            .kind(TableKind::RecursiveCte)
            .add_column("n", DataType::Int64)
            .unwrap()
            .add_query_index("idxN", &[("n", Order::Asc)])
            .unwrap()
            .build()
            .unwrap()
    }

    fn anchor(values: &[i64]) -> Rc<dyn QueryExpression> {
        let rows = values.iter().map(|v| vec![Value::Int64(*v)]).collect();
        Rc::new(ValuesQuery::new(1, rows))
    }

    /// `SELECT n + 1 FROM nums WHERE n < bound`
    fn successor(bound: i64) -> Box<dyn RecursiveStep> {
        Box::new(move |working: &QueryExpressionIndex| -> Result<Vec<Vec<Value>>> {
            Ok(scan_working(working)?
                .into_iter()
                .filter_map(|row| row[0].as_i64())
                .filter(|n| *n < bound)
                .map(|n| vec![Value::Int64(n + 1)])
                .collect())
        })
    }

    fn ints(result: &LocalResult) -> Vec<i64> {
        result.rows().iter().map(|r| r[0].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_counts_to_fixed_point() {
        let settings = ScanSettings::new();
        let mut query =
            RecursiveQuery::new(cte_table(), "idxN", anchor(&[1]), successor(5), settings);
        let result = query.evaluate().unwrap();
        assert_eq!(ints(&result), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_depth_limit() {
        let settings = ScanSettings::new().max_recursion_depth(3);
        let mut query =
            RecursiveQuery::new(cte_table(), "idxN", anchor(&[1]), successor(5), settings);
        let err = query.evaluate().unwrap_err();
        assert!(matches!(err, Error::Evaluation { .. }));

        let settings = ScanSettings::new().max_recursion_depth(5);
        let mut query =
            RecursiveQuery::new(cte_table(), "idxN", anchor(&[1]), successor(5), settings);
        assert_eq!(ints(&query.evaluate().unwrap()), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_union_drops_repeats() {
        // n -> n % 3 + 1 cycles through 1, 2, 3 forever under UNION ALL.
        let cycle = Box::new(|working: &QueryExpressionIndex| -> Result<Vec<Vec<Value>>> {
            Ok(scan_working(working)?
                .into_iter()
                .filter_map(|row| row[0].as_i64())
                .map(|n| vec![Value::Int64(n % 3 + 1)])
                .collect())
        });
        let mut query =
            RecursiveQuery::new(cte_table(), "idxN", anchor(&[1]), cycle, ScanSettings::new())
                .union_all(false);
        assert_eq!(ints(&query.evaluate().unwrap()), vec![1, 2, 3]);
    }

    #[test]
    fn test_step_sees_only_previous_iteration() {
        let mut calls = 0;
        let step = Box::new(move |working: &QueryExpressionIndex| -> Result<Vec<Vec<Value>>> {
            calls += 1;
            let rows = scan_working(working)?;
            if calls > 1 {
                return Ok(Vec::new());
            }
            Ok(rows
                .into_iter()
                .filter_map(|r| r[0].as_i64())
                .map(|n| vec![Value::Int64(n * 10)])
                .collect())
        });
        let mut query =
            RecursiveQuery::new(cte_table(), "idxN", anchor(&[1, 2, 3]), step, ScanSettings::new());
        assert_eq!(ints(&query.evaluate().unwrap()), vec![1, 2, 3, 10, 20, 30]);
    }

    #[test]
    fn test_step_error_propagates() {
        let failing = Box::new(|_: &QueryExpressionIndex| -> Result<Vec<Vec<Value>>> {
            Err(Error::interrupted("WITH RECURSIVE nums"))
        });
        let mut query =
            RecursiveQuery::new(cte_table(), "idxN", anchor(&[1]), failing, ScanSettings::new());
        assert!(matches!(query.evaluate(), Err(Error::Interrupted { .. })));
    }

    #[test]
    fn test_empty_anchor() {
        let settings = ScanSettings::new();
        let mut query =
            RecursiveQuery::new(cte_table(), "idxN", anchor(&[]), successor(5), settings);
        assert!(query.evaluate().unwrap().is_empty());
    }
}
