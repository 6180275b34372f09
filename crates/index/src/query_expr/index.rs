//! Indexes whose rows are computed by a query.

use super::cursor::{QueryExpressionCursor, ResultHandle};
use super::query::QueryExpression;
use super::result::QueryResult;
use crate::comparator::RowComparator;
use crate::settings::ScanSettings;
use crate::stats::IndexStats;
use crate::traits::{Cursor, Index, IndexKind};
use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use core::cell::RefCell;
use quarry_core::schema::{IndexType, Table};
use quarry_core::{Error, Result, SearchRow};
use tracing::{debug, trace, warn};

/// Shared working table of a recursive query.
pub type SharedResult = Rc<RefCell<dyn QueryResult>>;

/// Compile state of a plain index's query.
#[derive(Clone)]
pub enum CompiledQuery {
    Valid(Rc<dyn QueryExpression>),
    /// The last compile failed; scans report the message.
    Invalid { message: String },
}

enum Source {
    /// A fresh evaluator per scan.
    Plain(CompiledQuery),
    /// One evaluator shared by every scan; `None` once the index is closed.
    Recursive(Option<SharedResult>),
}

/// An index over the rows of a view, derived table or recursive query.
///
/// Rows are never stored. Every scan evaluates the query (or rereads the
/// recursive working table) and prunes the output against the scan bounds
/// with the same comparator a physical index would use.
pub struct QueryExpressionIndex {
    name: String,
    table: Table,
    comparator: RowComparator,
    source: Source,
    stats: IndexStats,
}

impl QueryExpressionIndex {
    fn build(
        table: Table,
        index_name: &str,
        settings: ScanSettings,
        source: Source,
    ) -> Result<Self> {
        let def = table.require_index(index_name)?;
        if def.get_index_type() != IndexType::QueryExpression {
            return Err(Error::unsupported(format!(
                "index {} is not a query expression index",
                index_name
            )));
        }
        let comparator = RowComparator::for_index(&table, def, settings.get_null_ordering())?;
        Ok(Self {
            name: index_name.to_string(),
            table,
            comparator,
            source,
            stats: IndexStats::new(),
        })
    }

    /// Creates an index evaluating `query` afresh on every scan.
    pub fn plain(
        table: Table,
        index_name: &str,
        query: Rc<dyn QueryExpression>,
        settings: ScanSettings,
    ) -> Result<Self> {
        let source = Source::Plain(CompiledQuery::Valid(query));
        Self::build(table, index_name, settings, source)
    }

    /// Creates a plain index whose query failed to compile.
    pub fn uncompiled(
        table: Table,
        index_name: &str,
        message: impl Into<String>,
        settings: ScanSettings,
    ) -> Result<Self> {
        let source = Source::Plain(CompiledQuery::Invalid {
            message: message.into(),
        });
        Self::build(table, index_name, settings, source)
    }

    /// Creates an index reading the shared working table of a recursive query.
    pub fn recursive(
        table: Table,
        index_name: &str,
        working: SharedResult,
        settings: ScanSettings,
    ) -> Result<Self> {
        Self::build(table, index_name, settings, Source::Recursive(Some(working)))
    }

    pub fn is_recursive(&self) -> bool {
        matches!(self.source, Source::Recursive(_))
    }

    /// The compiled query of a plain index, if it compiled.
    pub fn query(&self) -> Option<&Rc<dyn QueryExpression>> {
        match &self.source {
            Source::Plain(CompiledQuery::Valid(query)) => Some(query),
            _ => None,
        }
    }

    /// Returns false if the last compile of the query failed.
    pub fn is_valid(&self) -> bool {
        !matches!(self.source, Source::Plain(CompiledQuery::Invalid { .. }))
    }

    /// Installs a newly compiled query. Later scans evaluate it.
    pub fn set_query(&mut self, query: Rc<dyn QueryExpression>) -> Result<()> {
        match &mut self.source {
            Source::Plain(compiled) => {
                debug!(index = %self.name, sql = query.sql(), "query replaced");
                *compiled = CompiledQuery::Valid(query);
                Ok(())
            }
            Source::Recursive(_) => Err(not_plain(&self.name)),
        }
    }

    /// Marks the query as failed to compile. Later scans fail with `message`.
    pub fn invalidate(&mut self, message: impl Into<String>) -> Result<()> {
        match &mut self.source {
            Source::Plain(compiled) => {
                let message = message.into();
                warn!(index = %self.name, %message, "query invalidated");
                *compiled = CompiledQuery::Invalid { message };
                Ok(())
            }
            Source::Recursive(_) => Err(not_plain(&self.name)),
        }
    }

    /// Releases the working table of a recursive index. Scans fail afterwards.
    /// Plain indexes hold no evaluator between scans, so this is a no-op for them.
    pub fn close(&mut self) {
        if let Source::Recursive(slot) = &mut self.source {
            if let Some(working) = slot.take() {
                if let Ok(mut result) = working.try_borrow_mut() {
                    result.close();
                }
                trace!(index = %self.name, "working table released");
            }
        }
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    fn open_result(&self) -> Result<ResultHandle> {
        match &self.source {
            Source::Plain(CompiledQuery::Valid(query)) => {
                Ok(ResultHandle::Owned(query.execute()?))
            }
            Source::Plain(CompiledQuery::Invalid { message }) => {
                warn!(index = %self.name, %message, "scan of an uncompiled query index");
                Err(Error::compilation(self.table.name(), message.as_str()))
            }
            Source::Recursive(Some(working)) => {
                let mut result = working.try_borrow_mut().map_err(|_| {
                    Error::internal(format!("working table of {} is in use", self.name))
                })?;
                result.reset()?;
                drop(result);
                trace!(index = %self.name, "working table reset");
                Ok(ResultHandle::Shared(Rc::clone(working)))
            }
            Source::Recursive(None) => {
                warn!(index = %self.name, "scan of a closed recursive index");
                Err(Error::internal(format!(
                    "recursive index {} is closed",
                    self.name
                )))
            }
        }
    }
}

fn not_plain(name: &str) -> Error {
    Error::unsupported(format!("recursive index {} has no compiled query", name))
}

impl Index for QueryExpressionIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn table(&self) -> &Table {
        &self.table
    }

    fn kind(&self) -> IndexKind {
        if self.is_recursive() {
            IndexKind::Recursive
        } else {
            IndexKind::QueryExpression
        }
    }

    fn comparator(&self) -> &RowComparator {
        &self.comparator
    }

    fn is_ordered(&self) -> bool {
        self.query().is_some_and(|query| query.is_ordered())
    }

    fn scan<'a>(
        &'a self,
        lower: Option<&'a SearchRow>,
        upper: Option<&'a SearchRow>,
    ) -> Result<Box<dyn Cursor + 'a>> {
        debug!(
            index = %self.name,
            kind = ?self.kind(),
            lower = lower.is_some(),
            upper = upper.is_some(),
            "opening scan"
        );
        let result = self.open_result()?;
        self.stats.record_scan();
        Ok(Box::new(QueryExpressionCursor::new(self, result, lower, upper)))
    }
}

impl core::fmt::Debug for QueryExpressionIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QueryExpressionIndex")
            .field("name", &self.name)
            .field("table", &self.table.name())
            .field("kind", &self.kind())
            .field("valid", &self.is_valid())
            .finish()
    }
}
