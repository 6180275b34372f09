//! Index statistics.

use core::sync::atomic::{AtomicUsize, Ordering};

/// Counters kept by every index.
///
/// Stored indexes track how many row IDs they hold. Every index counts the
/// scans opened on it and the rows those scans returned, which is the only
/// size information a query-backed index has.
#[derive(Debug)]
pub struct IndexStats {
    total_rows: AtomicUsize,
    scans: AtomicUsize,
    rows_returned: AtomicUsize,
}

impl IndexStats {
    pub fn new() -> Self {
        Self {
            total_rows: AtomicUsize::new(0),
            scans: AtomicUsize::new(0),
            rows_returned: AtomicUsize::new(0),
        }
    }

    /// Returns the number of row IDs stored in the index.
    pub fn total_rows(&self) -> usize {
        self.total_rows.load(Ordering::Relaxed)
    }

    pub fn add_rows(&self, count: usize) {
        self.total_rows.fetch_add(count, Ordering::Relaxed);
    }

    pub fn remove_rows(&self, count: usize) {
        self.total_rows.fetch_sub(count, Ordering::Relaxed);
    }

    /// Returns the number of scans opened on the index.
    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::Relaxed)
    }

    pub fn record_scan(&self) {
        self.scans.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of rows yielded by all scans so far.
    pub fn rows_returned(&self) -> usize {
        self.rows_returned.load(Ordering::Relaxed)
    }

    pub fn record_row(&self) {
        self.rows_returned.fetch_add(1, Ordering::Relaxed);
    }

    /// Resets the stored row count. Scan counters are kept.
    pub fn clear(&self) {
        self.total_rows.store(0, Ordering::Relaxed);
    }
}

impl Default for IndexStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for IndexStats {
    fn clone(&self) -> Self {
        Self {
            total_rows: AtomicUsize::new(self.total_rows()),
            scans: AtomicUsize::new(self.scans()),
            rows_returned: AtomicUsize::new(self.rows_returned()),
        }
    }
}
