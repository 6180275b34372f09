//! Integration tests for views, ALTER VIEW and recursive queries through the
//! public API.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use quarry_core::schema::{Order, Table, TableBuilder, TableKind};
use quarry_core::{DataType, Error, Result, Row, SearchRow, Value};
use quarry_index::{
    read_all, Index, QueryExpression, QueryExpressionIndex, ScanSettings, ValuesQuery,
};
use quarry_query::{scan_working, AlterView, Catalog, QueryCompiler, RecursiveQuery, User, View};

/// Compiler backed by a mutable map, so tests can redefine what a query
/// text produces between compiles.
#[derive(Default)]
struct Definitions {
    outputs: HashMap<String, Vec<Vec<Value>>>,
    compiles: Cell<usize>,
}

impl Definitions {
    fn define(&mut self, sql: &str, rows: Vec<Vec<Value>>) {
        self.outputs.insert(sql.to_string(), rows);
    }

    fn forget(&mut self, sql: &str) {
        self.outputs.remove(sql);
    }
}

impl QueryCompiler for Definitions {
    fn compile(&self, sql: &str, table: &Table) -> Result<Rc<dyn QueryExpression>> {
        self.compiles.set(self.compiles.get() + 1);
        let rows = self.outputs.get(sql).ok_or_else(|| {
            Error::compilation(table.name(), format!("unknown query \"{}\"", sql))
        })?;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Ok(Rc::new(ValuesQuery::new(width, rows.clone())))
    }
}

fn table_t() -> Table {
    TableBuilder::new("T")
        .unwrap()
        .schema("APP")
        .unwrap()
        .kind(TableKind::View)
        .add_column("a", DataType::Int64)
        .unwrap()
        .add_column("b", DataType::String)
        .unwrap()
        .add_nullable(&["b"])
        .add_query_index("idxA", &[("a", Order::Asc)])
        .unwrap()
        .build()
        .unwrap()
}

fn pairs() -> Vec<Vec<Value>> {
    vec![
        vec![Value::Int64(1), Value::from("x")],
        vec![Value::Int64(2), Value::from("y")],
        vec![Value::Int64(3), Value::from("z")],
    ]
}

fn values(rows: &[Row]) -> Vec<Vec<Value>> {
    rows.iter().map(|r| r.values().to_vec()).collect()
}

fn create(defs: &Definitions, sql: &str) -> Result<View> {
    View::create(table_t(), "idxA", sql, defs, ScanSettings::new(), false)
}

fn scan(view: &View, lower: Option<&SearchRow>) -> Result<Vec<Row>> {
    let mut cursor = view.index().scan(lower, None)?;
    read_all(cursor.as_mut())
}

#[test]
fn test_view_lower_bound_scan() {
    let mut defs = Definitions::default();
    defs.define("SELECT a, b FROM s", pairs());
    let view = create(&defs, "SELECT a, b FROM s").unwrap();

    let lo = SearchRow::prefix(2, [2i64]);
    let rows = scan(&view, Some(&lo)).unwrap();
    assert_eq!(values(&rows), &pairs()[1..]);
}

#[test]
fn test_view_pads_missing_columns() {
    let mut defs = Definitions::default();
    defs.define(
        "SELECT a FROM s",
        (1..=3).map(|i| vec![Value::Int64(i)]).collect(),
    );
    let view = create(&defs, "SELECT a FROM s").unwrap();

    let rows = scan(&view, None).unwrap();
    assert_eq!(
        values(&rows),
        vec![
            vec![Value::Int64(1), Value::Null],
            vec![Value::Int64(2), Value::Null],
            vec![Value::Int64(3), Value::Null],
        ]
    );
}

#[test]
fn test_alter_view_lifecycle() {
    let mut defs = Definitions::default();
    defs.define("SELECT a, b FROM s", pairs());
    let view = create(&defs, "SELECT a, b FROM s").unwrap();
    let mut catalog = Catalog::new();
    catalog.add_view(view).unwrap();

    let owner = User::new("app").with_schema("APP");
    let stranger = User::new("guest");
    let alter = AlterView::new("T");

    // Underlying definition changes, recompile picks it up.
    defs.define("SELECT a, b FROM s", pairs()[..1].to_vec());
    assert_eq!(alter.update(&mut catalog, &owner, &defs).unwrap(), 0);
    assert_eq!(scan(catalog.get_view("T").unwrap(), None).unwrap().len(), 1);

    // Only the schema owner may recompile.
    let compiles = defs.compiles.get();
    assert!(matches!(
        alter.update(&mut catalog, &stranger, &defs),
        Err(Error::AccessDenied { .. })
    ));
    assert_eq!(defs.compiles.get(), compiles);

    // A dependency disappears: the command fails and scans are refused.
    defs.forget("SELECT a, b FROM s");
    assert!(matches!(
        alter.update(&mut catalog, &owner, &defs),
        Err(Error::Compilation { .. })
    ));
    let view = catalog.get_view("T").unwrap();
    assert!(!view.is_valid());
    assert!(matches!(scan(view, None), Err(Error::Compilation { .. })));

    // It comes back.
    defs.define("SELECT a, b FROM s", pairs());
    alter.update(&mut catalog, &User::admin("SA"), &defs).unwrap();
    assert_eq!(scan(catalog.get_view("T").unwrap(), None).unwrap().len(), 3);
}

#[test]
fn test_alter_missing_view() {
    let defs = Definitions::default();
    let mut catalog = Catalog::new();
    let admin = User::admin("SA");
    assert!(matches!(
        AlterView::new("nope").update(&mut catalog, &admin, &defs),
        Err(Error::ViewNotFound { .. })
    ));
    assert_eq!(
        AlterView::new("nope")
            .if_exists(true)
            .update(&mut catalog, &admin, &defs)
            .unwrap(),
        0
    );
}

fn tree_table() -> Table {
    TableBuilder::new("reach")
        .unwrap()
        .kind(TableKind::RecursiveCte)
        .add_column("node", DataType::Int64)
        .unwrap()
        .add_query_index("idxNode", &[("node", Order::Asc)])
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn test_recursive_reachability() {
    // Edges of a small graph with a cycle 3 -> 1.
    let edges: Vec<(i64, i64)> = vec![(1, 2), (1, 3), (2, 4), (3, 1), (4, 5), (6, 7)];
    let step = Box::new(move |working: &QueryExpressionIndex| -> Result<Vec<Vec<Value>>> {
        let mut next = Vec::new();
        for row in scan_working(working)? {
            let from = row[0].as_i64();
            for (a, b) in &edges {
                if Some(*a) == from {
                    next.push(vec![Value::Int64(*b)]);
                }
            }
        }
        Ok(next)
    });
    let anchor: Rc<dyn QueryExpression> = Rc::new(ValuesQuery::new(1, vec![vec![Value::Int64(1)]]));
    let mut query =
        RecursiveQuery::new(tree_table(), "idxNode", anchor, step, ScanSettings::new())
            .union_all(false);

    let result = query.evaluate().unwrap();
    let mut reached: Vec<i64> = result.rows().iter().filter_map(|r| r[0].as_i64()).collect();
    reached.sort_unstable();
    assert_eq!(reached, vec![1, 2, 3, 4, 5]);
}
