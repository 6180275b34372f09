//! Table definitions.

use super::column::Column;
use super::index::{IndexDef, IndexType, IndexedColumn, Order};
use crate::error::{Error, Result};
use crate::row::Row;
use crate::types::DataType;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// Schema new tables land in unless one is given.
pub const DEFAULT_SCHEMA: &str = "PUBLIC";

/// Where a table's rows come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TableKind {
    /// Rows are stored.
    #[default]
    Base,
    /// Rows come from a stored, named query.
    View,
    /// Rows come from a subquery in a FROM clause.
    Derived,
    /// Rows come from the working table of a recursive common table expression.
    RecursiveCte,
}

impl TableKind {
    /// Returns true if rows are produced by a query rather than read from storage.
    pub fn is_query_backed(&self) -> bool {
        !matches!(self, TableKind::Base)
    }
}

/// A table definition: its row shape and its index definitions.
#[derive(Clone, Debug)]
pub struct Table {
    name: String,
    schema: String,
    kind: TableKind,
    columns: Vec<Column>,
    indices: Vec<IndexDef>,
}

impl Table {
    /// Creates a base table in the default schema with the given columns.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.with_index(i))
            .collect();
        Self {
            name: name.into(),
            schema: String::from(DEFAULT_SCHEMA),
            kind: TableKind::Base,
            columns,
            indices: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns `schema.name`, used in diagnostics.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    #[inline]
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the declared column count of the row shape.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Creates an empty row with this table's shape; every cell is NULL.
    pub fn template_row(&self) -> Row {
        Row::template(self.columns.len())
    }

    #[inline]
    pub fn indices(&self) -> &[IndexDef] {
        &self.indices
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn get_index(&self, name: &str) -> Option<&IndexDef> {
        self.indices.iter().find(|i| i.name() == name)
    }

    /// Looks up an index definition, failing with `IndexNotFound`.
    pub fn require_index(&self, name: &str) -> Result<&IndexDef> {
        self.get_index(name)
            .ok_or_else(|| Error::index_not_found(self.name.as_str(), name))
    }

    /// Resolves an index's key columns to (position, order) pairs.
    pub fn key_columns(&self, index: &IndexDef) -> Result<Vec<(usize, Order)>> {
        index
            .columns()
            .iter()
            .map(|col| {
                self.get_column_index(&col.name)
                    .map(|pos| (pos, col.order))
                    .ok_or_else(|| Error::column_not_found(self.name.as_str(), col.name.as_str()))
            })
            .collect()
    }

    /// Checks a row against the table shape and column types.
    pub fn validate_row(&self, row: &Row) -> Result<()> {
        if row.column_count() != self.columns.len() {
            return Err(Error::invalid_schema(format!(
                "row has {} columns, table {} has {}",
                row.column_count(),
                self.name,
                self.columns.len()
            )));
        }
        for (column, value) in self.columns.iter().zip(row.values()) {
            column.validate(value)?;
        }
        Ok(())
    }
}

/// Builder for creating table definitions.
pub struct TableBuilder {
    name: String,
    schema: String,
    kind: TableKind,
    columns: Vec<Column>,
    indices: Vec<IndexDef>,
}

impl TableBuilder {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        Ok(Self {
            name,
            schema: String::from(DEFAULT_SCHEMA),
            kind: TableKind::Base,
            columns: Vec::new(),
            indices: Vec::new(),
        })
    }

    /// Validates a name follows naming rules.
    fn check_naming_rules(name: &str) -> Result<()> {
        let mut chars = name.chars();
        match chars.next() {
            None => return Err(Error::invalid_schema("Name cannot be empty")),
            Some(first) if !first.is_ascii_alphabetic() && first != '_' => {
                return Err(Error::invalid_schema(format!(
                    "Name must start with letter or underscore: {}",
                    name
                )));
            }
            Some(_) => {}
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_schema(format!(
                "Name contains invalid characters: {}",
                name
            )));
        }
        Ok(())
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Result<Self> {
        let schema = schema.into();
        Self::check_naming_rules(&schema)?;
        self.schema = schema;
        Ok(self)
    }

    pub fn kind(mut self, kind: TableKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn add_column(mut self, name: impl Into<String>, data_type: DataType) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        if self.columns.iter().any(|c| c.name() == name) {
            return Err(Error::invalid_schema(format!("Column already exists: {}", name)));
        }
        self.columns.push(Column::new(name, data_type));
        Ok(self)
    }

    /// Marks existing columns as nullable.
    pub fn add_nullable(mut self, columns: &[&str]) -> Self {
        for name in columns {
            if let Some(col) = self.columns.iter_mut().find(|c| c.name() == *name) {
                *col = col.clone().nullable(true);
            }
        }
        self
    }

    /// Adds the primary key, a unique ascending B-tree index named `pk<Table>`.
    pub fn add_primary_key(self, columns: &[&str]) -> Result<Self> {
        let name = format!("pk{}", capitalize(&self.name));
        self.add_index(name, columns, true)
    }

    /// Adds an ascending B-tree index.
    pub fn add_index(
        self,
        name: impl Into<String>,
        columns: &[&str],
        unique: bool,
    ) -> Result<Self> {
        let ordered: Vec<(&str, Order)> = columns.iter().map(|c| (*c, Order::Asc)).collect();
        self.add_index_of_type(name, &ordered, unique, IndexType::BTree)
    }

    /// Adds a B-tree index with per-column sort orders.
    pub fn add_ordered_index(
        self,
        name: impl Into<String>,
        columns: &[(&str, Order)],
        unique: bool,
    ) -> Result<Self> {
        self.add_index_of_type(name, columns, unique, IndexType::BTree)
    }

    /// Adds a hash index.
    pub fn add_hash_index(
        self,
        name: impl Into<String>,
        columns: &[&str],
        unique: bool,
    ) -> Result<Self> {
        let ordered: Vec<(&str, Order)> = columns.iter().map(|c| (*c, Order::Asc)).collect();
        self.add_index_of_type(name, &ordered, unique, IndexType::Hash)
    }

    /// Adds the index a query-backed table is scanned through.
    pub fn add_query_index(self, name: impl Into<String>, columns: &[(&str, Order)]) -> Result<Self> {
        if !self.kind.is_query_backed() {
            return Err(Error::invalid_schema(format!(
                "Table {} is not query-backed",
                self.name
            )));
        }
        self.add_index_of_type(name, columns, false, IndexType::QueryExpression)
    }

    fn add_index_of_type(
        mut self,
        name: impl Into<String>,
        columns: &[(&str, Order)],
        unique: bool,
        index_type: IndexType,
    ) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        if self.indices.iter().any(|i| i.name() == name) {
            return Err(Error::invalid_schema(format!("Index already exists: {}", name)));
        }

        for (col_name, _) in columns {
            match self.columns.iter().find(|c| c.name() == *col_name) {
                None => {
                    return Err(Error::invalid_schema(format!(
                        "Column not found: {}",
                        col_name
                    )))
                }
                Some(c) if !c.is_indexable() => {
                    return Err(Error::invalid_schema(format!(
                        "Column is not indexable: {}",
                        col_name
                    )))
                }
                Some(_) => {}
            }
        }

        let indexed = columns
            .iter()
            .map(|(n, order)| IndexedColumn::new(*n).order(*order))
            .collect();
        let def = IndexDef::new(name, &self.name, indexed)
            .unique(unique)
            .index_type(index_type);
        self.indices.push(def);
        Ok(self)
    }

    pub fn build(self) -> Result<Table> {
        if self.columns.is_empty() {
            return Err(Error::invalid_schema(format!(
                "Table {} has no columns",
                self.name
            )));
        }
        let mut table = Table::new(self.name, self.columns);
        table.schema = self.schema;
        table.kind = self.kind;
        table.indices = self.indices;
        Ok(table)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars).collect(),
    }
}
