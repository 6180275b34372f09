//! Cursor over the rows of a query expression index.

use super::index::{QueryExpressionIndex, SharedResult};
use super::result::QueryResult;
use crate::traits::{Cursor, CursorState, Index};
use alloc::boxed::Box;
use alloc::format;
use core::cmp::Ordering;
use quarry_core::{Error, Result, Row, SearchRow};
use tracing::{trace, warn};

/// The evaluator a cursor reads from.
pub(crate) enum ResultHandle {
    /// Exclusively owned; closed when the scan ends.
    Owned(Box<dyn QueryResult>),
    /// The recursive working table; reset when the scan ends.
    Shared(SharedResult),
}

impl ResultHandle {
    fn advance(&mut self) -> Result<bool> {
        match self {
            ResultHandle::Owned(result) => result.next(),
            ResultHandle::Shared(result) => result
                .try_borrow_mut()
                .map_err(|_| Error::internal("working table is in use"))?
                .next(),
        }
    }

    /// Copies the current tuple into `row`, NULL-padding missing cells.
    fn fill(&self, row: &mut Row) -> Result<()> {
        match self {
            ResultHandle::Owned(result) => row.fill_from(result.current_row()),
            ResultHandle::Shared(result) => row.fill_from(
                result
                    .try_borrow()
                    .map_err(|_| Error::internal("working table is in use"))?
                    .current_row(),
            ),
        }
        Ok(())
    }

    /// Ends the scan: an owned result is closed, the shared working table
    /// is reset so the next fixed-point iteration can read it again.
    fn finish(&mut self) -> Result<()> {
        match self {
            ResultHandle::Owned(result) => {
                result.close();
                Ok(())
            }
            ResultHandle::Shared(result) => result
                .try_borrow_mut()
                .map_err(|_| Error::internal("working table is in use"))?
                .reset(),
        }
    }
}

/// Materializes evaluator tuples into table rows and keeps those in range.
///
/// Out-of-range rows are skipped, not treated as the end of the scan: the
/// evaluator's order need not match the index order. At the end of the
/// result a plain index's evaluator is closed; a recursive index's working
/// table is reset so the next fixed-point iteration can read it again.
pub struct QueryExpressionCursor<'a> {
    index: &'a QueryExpressionIndex,
    result: ResultHandle,
    lower: Option<&'a SearchRow>,
    upper: Option<&'a SearchRow>,
    current: Option<Row>,
    state: CursorState,
}

impl<'a> QueryExpressionCursor<'a> {
    pub(crate) fn new(
        index: &'a QueryExpressionIndex,
        result: ResultHandle,
        lower: Option<&'a SearchRow>,
        upper: Option<&'a SearchRow>,
    ) -> Self {
        Self {
            index,
            result,
            lower,
            upper,
            current: None,
            state: CursorState::BeforeFirst,
        }
    }

    fn in_range(&self, row: &Row) -> bool {
        if let Some(lower) = self.lower {
            if self.index.compare_rows(row, lower) == Ordering::Less {
                trace!(index = self.index.name(), row_id = row.id(), "row below lower bound");
                return false;
            }
        }
        if let Some(upper) = self.upper {
            if self.index.compare_rows(row, upper) == Ordering::Greater {
                trace!(index = self.index.name(), row_id = row.id(), "row above upper bound");
                return false;
            }
        }
        true
    }

    fn finish(&mut self) -> Result<()> {
        self.current = None;
        self.state = CursorState::Exhausted;
        trace!(
            index = self.index.name(),
            recursive = self.index.is_recursive(),
            "end of result"
        );
        self.result.finish()
    }
}

impl<'a> Cursor for QueryExpressionCursor<'a> {
    fn next(&mut self) -> Result<bool> {
        if self.state == CursorState::Exhausted && !self.index.is_recursive() {
            warn!(index = self.index.name(), "advance past the end of a closed result");
            return Err(Error::internal(format!(
                "cursor on {} advanced after exhaustion",
                self.index.name()
            )));
        }
        loop {
            if !self.result.advance()? {
                self.finish()?;
                return Ok(false);
            }
            let mut row = self.index.table().template_row();
            self.result.fill(&mut row)?;
            if !self.in_range(&row) {
                continue;
            }
            self.index.stats().record_row();
            self.current = Some(row);
            self.state = CursorState::OnRow;
            return Ok(true);
        }
    }

    fn get(&self) -> Option<&Row> {
        self.current.as_ref()
    }

    fn previous(&mut self) -> Result<bool> {
        Err(Error::unsupported(format!(
            "cursor on {} only moves forward",
            self.index.name()
        )))
    }

    fn state(&self) -> CursorState {
        self.state
    }
}
