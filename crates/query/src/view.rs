//! Views and their recompilation.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use quarry_core::schema::Table;
use quarry_core::Result;
use quarry_index::{Index, QueryExpression, QueryExpressionIndex, ScanSettings};
use tracing::{debug, warn};

/// Turns stored query text into an executable query for a view's table.
pub trait QueryCompiler {
    fn compile(&self, sql: &str, table: &Table) -> Result<Rc<dyn QueryExpression>>;
}

/// A named stored query, scanned through its query expression index.
#[derive(Debug)]
pub struct View {
    query_text: String,
    index: QueryExpressionIndex,
}

impl View {
    /// Compiles `sql` and creates the view.
    ///
    /// With `force`, a view whose query fails to compile is still created;
    /// scanning it reports the compile error until a recompile succeeds.
    pub fn create(
        table: Table,
        index_name: &str,
        sql: impl Into<String>,
        compiler: &dyn QueryCompiler,
        settings: ScanSettings,
        force: bool,
    ) -> Result<Self> {
        let query_text = sql.into();
        let index = match compiler.compile(&query_text, &table) {
            Ok(query) => QueryExpressionIndex::plain(table, index_name, query, settings)?,
            Err(e) if force => {
                warn!(view = table.name(), error = %e, "view created with an invalid query");
                QueryExpressionIndex::uncompiled(table, index_name, e.to_string(), settings)?
            }
            Err(e) => return Err(e),
        };
        Ok(Self { query_text, index })
    }

    pub fn name(&self) -> &str {
        self.index.table().name()
    }

    pub fn schema(&self) -> &str {
        self.index.table().schema()
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    /// The index every scan of the view goes through.
    pub fn index(&self) -> &QueryExpressionIndex {
        &self.index
    }

    pub fn is_valid(&self) -> bool {
        self.index.is_valid()
    }

    /// Compiles the stored query text again and installs the result.
    ///
    /// On failure the error is returned. A forced recompile also marks the
    /// view invalid, so later scans fail; otherwise the previous query stays.
    pub fn recompile(&mut self, compiler: &dyn QueryCompiler, force: bool) -> Result<()> {
        match compiler.compile(&self.query_text, self.index.table()) {
            Ok(query) => {
                debug!(view = self.name(), sql = %self.query_text, "view recompiled");
                self.index.set_query(query)
            }
            Err(e) => {
                warn!(view = self.name(), error = %e, force, "view recompilation failed");
                if force {
                    self.index.invalidate(e.to_string())?;
                }
                Err(e)
            }
        }
    }

    /// Replaces the stored query text and recompiles. The old text and
    /// query are kept if the new text does not compile.
    pub fn replace_query(
        &mut self,
        sql: impl Into<String>,
        compiler: &dyn QueryCompiler,
    ) -> Result<()> {
        let previous = core::mem::replace(&mut self.query_text, sql.into());
        let outcome = self.recompile(compiler, false);
        if outcome.is_err() {
            self.query_text = previous;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{view_table, MapCompiler};
    use alloc::vec;
    use quarry_core::{Error, SearchRow, Value};
    use quarry_index::read_all;

    fn create(sql: &str, compiler: &MapCompiler, force: bool) -> Result<View> {
        View::create(view_table(), "idxV", sql, compiler, ScanSettings::new(), force)
    }

    fn compiler() -> MapCompiler {
        MapCompiler::new()
            .with("SELECT a FROM t", vec![vec![Value::Int64(1)], vec![Value::Int64(2)]])
            .with("SELECT a FROM t2", vec![vec![Value::Int64(7)]])
    }

    #[test]
    fn test_create_and_scan() {
        let view = create("SELECT a FROM t", &compiler(), false).unwrap();
        assert_eq!(view.name(), "v");
        assert_eq!(view.schema(), "PUBLIC");
        let lo = SearchRow::prefix(2, [2i64]);
        let mut cursor = view.index().scan(Some(&lo), None).unwrap();
        let rows = read_all(cursor.as_mut()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].values(), &[Value::Int64(2), Value::Null]);
    }

    #[test]
    fn test_create_invalid() {
        let err = create("SELEC", &compiler(), false).unwrap_err();
        assert!(matches!(err, Error::Compilation { .. }));

        let view = create("SELEC", &compiler(), true).unwrap();
        assert!(!view.is_valid());
        assert!(matches!(view.index().scan(None, None).err(), Some(Error::Compilation { .. })));
    }

    #[test]
    fn test_recompile_picks_up_new_definition() {
        let mut compiler = compiler();
        let mut view = create("SELECT a FROM t", &compiler, false).unwrap();
        compiler = compiler.with("SELECT a FROM t", vec![vec![Value::Int64(9)]]);
        view.recompile(&compiler, false).unwrap();
        let mut cursor = view.index().scan(None, None).unwrap();
        let rows = read_all(cursor.as_mut()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(0), Some(&Value::Int64(9)));
    }

    #[test]
    fn test_failed_recompile_without_force_keeps_query() {
        let mut view = create("SELECT a FROM t", &compiler(), false).unwrap();
        let broken = MapCompiler::new();
        assert!(view.recompile(&broken, false).is_err());
        assert!(view.is_valid());
        assert!(view.index().scan(None, None).is_ok());

        assert!(view.recompile(&broken, true).is_err());
        assert!(!view.is_valid());
    }

    #[test]
    fn test_replace_query() {
        let compiler = compiler();
        let mut view = create("SELECT a FROM t", &compiler, false).unwrap();
        view.replace_query("SELECT a FROM t2", &compiler).unwrap();
        assert_eq!(view.query_text(), "SELECT a FROM t2");

        assert!(view.replace_query("SELEC", &compiler).is_err());
        assert_eq!(view.query_text(), "SELECT a FROM t2");
        let mut cursor = view.index().scan(None, None).unwrap();
        assert_eq!(read_all(cursor.as_mut()).unwrap()[0].get(0), Some(&Value::Int64(7)));
    }
}
