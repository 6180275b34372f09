//! Property-based tests for quarry-query using proptest.

use std::rc::Rc;

use proptest::prelude::*;
use quarry_core::schema::{Order, Table, TableBuilder, TableKind};
use quarry_core::{DataType, Error, Result, Value};
use quarry_index::{QueryExpression, QueryExpressionIndex, ScanSettings, ValuesQuery};
use quarry_query::{scan_working, RecursiveQuery, RecursiveStep};

fn cte_table() -> Table {
    TableBuilder::new("seq")
        .unwrap()
        .kind(TableKind::RecursiveCte)
        .add_column("n", DataType::Int64)
        .unwrap()
        .add_query_index("idxSeq", &[("n", Order::Asc)])
        .unwrap()
        .build()
        .unwrap()
}

/// `SELECT n + step FROM seq WHERE n + step <= bound`
fn counter(step: i64, bound: i64) -> Box<dyn RecursiveStep> {
    Box::new(move |working: &QueryExpressionIndex| -> Result<Vec<Vec<Value>>> {
        Ok(scan_working(working)?
            .into_iter()
            .filter_map(|row| row[0].as_i64())
            .map(|n| n + step)
            .filter(|n| *n <= bound)
            .map(|n| vec![Value::Int64(n)])
            .collect())
    })
}

fn start(n: i64) -> Rc<dyn QueryExpression> {
    Rc::new(ValuesQuery::new(1, vec![vec![Value::Int64(n)]]))
}

proptest! {
    #[test]
    fn recursive_counter_reaches_bound(first in -20i64..20, step in 1i64..5, span in 0i64..60) {
        let bound = first + span;
        let step_fn = counter(step, bound);
        let mut query =
            RecursiveQuery::new(cte_table(), "idxSeq", start(first), step_fn, ScanSettings::new());
        let result = query.evaluate().unwrap();
        let got: Vec<i64> = result.rows().iter().filter_map(|r| r[0].as_i64()).collect();
        let expected: Vec<i64> =
            (0..).map(|k| first + k * step).take_while(|n| *n <= bound).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn recursion_limit_is_exact(depth in 1usize..30, limit in 1usize..30) {
        // `depth` productive iterations plus the empty one that ends it.
        let settings = ScanSettings::new().max_recursion_depth(limit);
        let mut query = RecursiveQuery::new(
            cte_table(),
            "idxSeq",
            start(0),
            counter(1, depth as i64),
            settings,
        );
        let outcome = query.evaluate();
        if depth < limit {
            prop_assert_eq!(outcome.unwrap().row_count(), depth + 1);
        } else {
            let is_evaluation_error = matches!(outcome, Err(Error::Evaluation { .. }));
            prop_assert!(is_evaluation_error);
        }
    }
}
