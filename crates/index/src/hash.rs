//! Hash index implementation.
//!
//! `HashIndex` maps keys to row IDs for O(1) point queries. `HashRowIndex`
//! stores rows behind one and answers equality scans only.

use crate::comparator::{key_value, RowComparator};
use crate::settings::ScanSettings;
use crate::stats::IndexStats;
use crate::traits::{Cursor, CursorState, Index, IndexError, IndexKind, KeyIndex};
use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::hash::Hash;
use hashbrown::HashMap;
use quarry_core::schema::{IndexType, Table};
use quarry_core::{Error, Result, Row, RowId, SearchRow, Value};
use tracing::debug;

/// A hash-based key index. Supports unique and non-unique keys.
#[derive(Debug)]
pub struct HashIndex<K> {
    map: HashMap<K, Vec<RowId>>,
    unique: bool,
    stats: IndexStats,
}

impl<K: Eq + Hash + Clone> HashIndex<K> {
    pub fn new(unique: bool) -> Self {
        Self {
            map: HashMap::new(),
            unique,
            stats: IndexStats::new(),
        }
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Returns all row IDs in the index, in no particular order.
    pub fn get_all_row_ids(&self) -> Vec<RowId> {
        self.map.values().flatten().copied().collect()
    }
}

impl<K: Eq + Hash + Clone> KeyIndex<K> for HashIndex<K> {
    fn add(&mut self, key: K, value: RowId) -> core::result::Result<(), IndexError> {
        if self.unique && self.map.contains_key(&key) {
            return Err(IndexError::DuplicateKey);
        }
        self.map.entry(key).or_default().push(value);
        self.stats.add_rows(1);
        Ok(())
    }

    fn get(&self, key: &K) -> Vec<RowId> {
        self.map.get(key).cloned().unwrap_or_default()
    }

    fn remove(&mut self, key: &K, value: Option<RowId>) {
        match value {
            Some(v) => {
                if let Some(values) = self.map.get_mut(key) {
                    let original_len = values.len();
                    values.retain(|&x| x != v);
                    self.stats.remove_rows(original_len - values.len());
                    if values.is_empty() {
                        self.map.remove(key);
                    }
                }
            }
            None => {
                if let Some(values) = self.map.remove(key) {
                    self.stats.remove_rows(values.len());
                }
            }
        }
    }

    fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn len(&self) -> usize {
        self.stats.total_rows()
    }

    fn clear(&mut self) {
        self.map.clear();
        self.stats.clear();
    }
}

/// A physical equality index over stored rows.
///
/// Scans must pin every key column to one value; range and full scans are
/// refused since the hash order carries no meaning.
#[derive(Debug)]
pub struct HashRowIndex {
    name: String,
    table: Table,
    comparator: RowComparator,
    map: HashIndex<Vec<Value>>,
    rows: HashMap<RowId, Row>,
}

impl HashRowIndex {
    pub fn new(table: Table, index_name: &str, settings: ScanSettings) -> Result<Self> {
        let def = table.require_index(index_name)?;
        if def.get_index_type() != IndexType::Hash {
            return Err(Error::unsupported(format!(
                "index {} is not a hash index",
                index_name
            )));
        }
        let comparator = RowComparator::for_index(&table, def, settings.get_null_ordering())?;
        let map = HashIndex::new(def.is_unique());
        Ok(Self {
            name: index_name.to_string(),
            table,
            comparator,
            map,
            rows: HashMap::new(),
        })
    }

    pub fn insert(&mut self, row: Row) -> Result<()> {
        self.table.validate_row(&row)?;
        if self.rows.contains_key(&row.id()) {
            return Err(Error::internal(format!(
                "row {} already stored in index {}",
                row.id(),
                self.name
            )));
        }
        let key = self.comparator.key_of(&row);
        self.map
            .add(key.clone(), row.id())
            .map_err(|IndexError::DuplicateKey| {
                Error::duplicate_key(self.name.as_str(), key_value(key))
            })?;
        self.rows.insert(row.id(), row);
        Ok(())
    }

    pub fn remove(&mut self, id: RowId) -> Option<Row> {
        let row = self.rows.remove(&id)?;
        let key = self.comparator.key_of(&row);
        self.map.remove(&key, Some(id));
        Some(row)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn stats(&self) -> &IndexStats {
        self.map.stats()
    }

    /// The single key a scan pins, or `Unsupported` for anything but an
    /// equality scan on the full key.
    fn point_key(
        &self,
        lower: Option<&SearchRow>,
        upper: Option<&SearchRow>,
    ) -> Result<Vec<Value>> {
        let (Some(lower), Some(upper)) = (lower, upper) else {
            return Err(Error::unsupported(format!(
                "hash index {} needs both scan bounds",
                self.name
            )));
        };
        let cmp = &self.comparator;
        let pinned = cmp.covers(lower)
            && cmp.covers(upper)
            && cmp.compare_rows(lower, upper) == Ordering::Equal;
        if !pinned {
            return Err(Error::unsupported(format!(
                "hash index {} supports equality scans on its full key only",
                self.name
            )));
        }
        Ok(cmp.key_of(lower))
    }
}

impl Index for HashRowIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn table(&self) -> &Table {
        &self.table
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Hash
    }

    fn comparator(&self) -> &RowComparator {
        &self.comparator
    }

    fn is_ordered(&self) -> bool {
        false
    }

    fn scan<'a>(
        &'a self,
        lower: Option<&'a SearchRow>,
        upper: Option<&'a SearchRow>,
    ) -> Result<Box<dyn Cursor + 'a>> {
        let key = self.point_key(lower, upper)?;
        debug!(index = %self.name, kind = ?IndexKind::Hash, "opening point scan");
        self.map.stats().record_scan();
        let matches = self
            .map
            .get(&key)
            .into_iter()
            .map(|id| {
                self.rows.get(&id).ok_or_else(|| {
                    Error::internal(format!("index {} references missing row {}", self.name, id))
                })
            })
            .collect::<Result<Vec<&'a Row>>>()?;
        Ok(Box::new(HashCursor {
            stats: self.map.stats(),
            matches,
            next: 0,
            state: CursorState::BeforeFirst,
        }))
    }
}

/// Forward-only cursor over the rows of one hash bucket.
pub struct HashCursor<'a> {
    stats: &'a IndexStats,
    matches: Vec<&'a Row>,
    next: usize,
    state: CursorState,
}

impl<'a> Cursor for HashCursor<'a> {
    fn next(&mut self) -> Result<bool> {
        if self.next < self.matches.len() {
            self.next += 1;
            self.state = CursorState::OnRow;
            self.stats.record_row();
            Ok(true)
        } else {
            self.state = CursorState::Exhausted;
            Ok(false)
        }
    }

    fn get(&self) -> Option<&Row> {
        match self.state {
            CursorState::OnRow => self.matches.get(self.next - 1).copied(),
            _ => None,
        }
    }

    fn previous(&mut self) -> Result<bool> {
        Err(Error::unsupported("hash index cursors only move forward"))
    }

    fn state(&self) -> CursorState {
        self.state
    }
}
