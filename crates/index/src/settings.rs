//! Scan settings shared by every index built in one engine instance.

use quarry_core::schema::NullOrdering;

/// Default branching factor for B+Tree nodes.
pub const DEFAULT_BTREE_ORDER: usize = 64;

/// Smallest branching factor a B+Tree accepts.
pub const MIN_BTREE_ORDER: usize = 4;

/// Default limit on fixed-point iterations of a recursive query.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 1024;

/// Settings captured by an index when it is constructed.
///
/// ```rust
/// use quarry_core::schema::NullOrdering;
/// use quarry_index::ScanSettings;
///
/// let settings = ScanSettings::new()
///     .null_ordering(NullOrdering::High)
///     .btree_order(16);
/// assert_eq!(settings.get_null_ordering(), NullOrdering::High);
/// assert_eq!(settings.get_btree_order(), 16);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanSettings {
    null_ordering: NullOrdering,
    btree_order: usize,
    max_recursion_depth: usize,
}

impl ScanSettings {
    pub fn new() -> Self {
        Self {
            null_ordering: NullOrdering::default(),
            btree_order: DEFAULT_BTREE_ORDER,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }

    /// Sets where NULL sorts in index key columns.
    pub fn null_ordering(mut self, nulls: NullOrdering) -> Self {
        self.null_ordering = nulls;
        self
    }

    /// Sets the B+Tree branching factor, clamped to `MIN_BTREE_ORDER`.
    pub fn btree_order(mut self, order: usize) -> Self {
        self.btree_order = order.max(MIN_BTREE_ORDER);
        self
    }

    /// Sets how many fixed-point iterations a recursive query may run.
    pub fn max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    #[inline]
    pub fn get_null_ordering(&self) -> NullOrdering {
        self.null_ordering
    }

    #[inline]
    pub fn get_btree_order(&self) -> usize {
        self.btree_order
    }

    #[inline]
    pub fn get_max_recursion_depth(&self) -> usize {
        self.max_recursion_depth
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::new()
    }
}
