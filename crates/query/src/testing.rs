//! Shared fixtures for unit tests.

use crate::view::QueryCompiler;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;
use quarry_core::schema::{Order, Table, TableBuilder, TableKind};
use quarry_core::{DataType, Error, Result, Value};
use quarry_index::{QueryExpression, ValuesQuery};

/// A view `v(a BIGINT, b VARCHAR NULL)` with query index `idxV` on `a`.
pub fn view_table() -> Table {
    TableBuilder::new("v")
        .unwrap()
        .kind(TableKind::View)
        .add_column("a", DataType::Int64)
        .unwrap()
        .add_column("b", DataType::String)
        .unwrap()
        .add_nullable(&["b"])
        .add_query_index("idxV", &[("a", Order::Asc)])
        .unwrap()
        .build()
        .unwrap()
}

/// Compiles query text by looking it up in a fixed table of outputs.
#[derive(Default)]
pub struct MapCompiler {
    outputs: HashMap<String, Vec<Vec<Value>>>,
}

impl MapCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sql: &str, rows: Vec<Vec<Value>>) -> Self {
        self.outputs.insert(String::from(sql), rows);
        self
    }
}

impl QueryCompiler for MapCompiler {
    fn compile(&self, sql: &str, table: &Table) -> Result<Rc<dyn QueryExpression>> {
        match self.outputs.get(sql) {
            Some(rows) => {
                let width = rows.iter().map(Vec::len).max().unwrap_or(0);
                Ok(Rc::new(ValuesQuery::new(width, rows.clone())))
            }
            None => Err(Error::compilation(
                table.name(),
                format!("syntax error in \"{}\"", sql),
            )),
        }
    }
}
