//! Stored rows indexed by a B+Tree on their key columns.

use super::iter::Position;
use super::tree::BTreeIndex;
use crate::comparator::{key_value, RowComparator};
use crate::settings::ScanSettings;
use crate::stats::IndexStats;
use crate::traits::{Cursor, CursorState, Index, IndexError, IndexKind, KeyIndex};
use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;
use hashbrown::HashMap;
use quarry_core::schema::{IndexType, Table};
use quarry_core::{Error, Result, Row, RowId, SearchRow, Value};
use tracing::debug;

/// A physical ordered index over stored rows.
#[derive(Debug)]
pub struct BTreeRowIndex {
    name: String,
    table: Table,
    comparator: RowComparator,
    tree: BTreeIndex<Vec<Value>, RowComparator>,
    rows: HashMap<RowId, Row>,
}

impl BTreeRowIndex {
    /// Creates an empty index for the B-tree index definition `index_name` of `table`.
    pub fn new(table: Table, index_name: &str, settings: ScanSettings) -> Result<Self> {
        let def = table.require_index(index_name)?;
        if def.get_index_type() != IndexType::BTree {
            return Err(Error::unsupported(format!(
                "index {} is not a B-tree index",
                index_name
            )));
        }
        let comparator = RowComparator::for_index(&table, def, settings.get_null_ordering())?;
        let tree = BTreeIndex::with_comparator(
            settings.get_btree_order(),
            def.is_unique(),
            comparator.clone(),
        );
        Ok(Self {
            name: index_name.to_string(),
            table,
            comparator,
            tree,
            rows: HashMap::new(),
        })
    }

    /// Stores a row. Fails on a shape or type mismatch, and on a key
    /// collision in a unique index.
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
        self.tree
            .add(key.clone(), row.id())
            .map_err(|IndexError::DuplicateKey| {
                Error::duplicate_key(self.name.as_str(), key_value(key))
            })?;
        self.rows.insert(row.id(), row);
        Ok(())
    }

    /// Removes the stored row with the given ID, returning it.
    pub fn remove(&mut self, id: RowId) -> Option<Row> {
        let row = self.rows.remove(&id)?;
        let key = self.comparator.key_of(&row);
        self.tree.remove(&key, Some(id));
        Some(row)
    }

    /// Returns the stored rows whose key equals `key` (in key-column order).
    pub fn get(&self, key: &[Value]) -> Vec<&Row> {
        self.tree
            .get(&key.to_vec())
            .iter()
            .filter_map(|id| self.rows.get(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn stats(&self) -> &IndexStats {
        self.tree.stats()
    }

    fn below_lower(&self, key: &[Value], lower: &SearchRow) -> bool {
        self.comparator.compare_key_with(key, lower) == Ordering::Less
    }

    fn above_upper(&self, key: &[Value], upper: &SearchRow) -> bool {
        self.comparator.compare_key_with(key, upper) == Ordering::Greater
    }

    fn row_at(&self, id: RowId) -> Result<&Row> {
        self.rows.get(&id).ok_or_else(|| {
            Error::internal(format!("index {} references missing row {}", self.name, id))
        })
    }
}

impl Index for BTreeRowIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn table(&self) -> &Table {
        &self.table
    }

    fn kind(&self) -> IndexKind {
        IndexKind::BTree
    }

    fn comparator(&self) -> &RowComparator {
        &self.comparator
    }

    fn is_ordered(&self) -> bool {
        true
    }

    fn scan<'a>(
        &'a self,
        lower: Option<&'a SearchRow>,
        upper: Option<&'a SearchRow>,
    ) -> Result<Box<dyn Cursor + 'a>> {
        debug!(
            index = %self.name,
            kind = ?IndexKind::BTree,
            lower = lower.is_some(),
            upper = upper.is_some(),
            "opening scan"
        );
        self.tree.stats().record_scan();
        Ok(Box::new(BTreeCursor {
            index: self,
            lower,
            upper,
            position: None,
            current: None,
            state: CursorState::BeforeFirst,
        }))
    }
}

/// Bidirectional cursor over a key range of a `BTreeRowIndex`.
pub struct BTreeCursor<'a> {
    index: &'a BTreeRowIndex,
    lower: Option<&'a SearchRow>,
    upper: Option<&'a SearchRow>,
    position: Option<Position>,
    current: Option<&'a Row>,
    state: CursorState,
}

impl<'a> BTreeCursor<'a> {
    fn first_in_range(&self) -> Option<Position> {
        let tree = &self.index.tree;
        match self.lower {
            Some(lower) => tree.seek(|k| self.index.below_lower(k, lower)),
            None => tree.first(),
        }
    }

    fn last_in_range(&self) -> Option<Position> {
        let tree = &self.index.tree;
        match self.upper {
            Some(upper) => match tree.seek(|k| !self.index.above_upper(k, upper)) {
                Some(past) => tree.prev_position(past),
                None => tree.last(),
            },
            None => tree.last(),
        }
    }

    fn land(&mut self, position: Option<Position>, state_if_none: CursorState) -> Result<bool> {
        let index = self.index;
        let in_range = position.filter(|&p| {
            let (key, _) = index.tree.entry(p);
            let above = self.upper.is_some_and(|u| index.above_upper(key, u));
            let below = self.lower.is_some_and(|l| index.below_lower(key, l));
            !above && !below
        });
        match in_range {
            Some(p) => {
                let (_, id) = index.tree.entry(p);
                self.current = Some(index.row_at(id)?);
                self.position = Some(p);
                self.state = CursorState::OnRow;
                index.tree.stats().record_row();
                Ok(true)
            }
            None => {
                self.current = None;
                self.position = None;
                self.state = state_if_none;
                Ok(false)
            }
        }
    }
}

impl<'a> Cursor for BTreeCursor<'a> {
    fn next(&mut self) -> Result<bool> {
        let next = match self.state {
            CursorState::BeforeFirst => self.first_in_range(),
            CursorState::OnRow => self
                .position
                .and_then(|p| self.index.tree.next_position(p)),
            CursorState::Exhausted => return Ok(false),
        };
        self.land(next, CursorState::Exhausted)
    }

    fn get(&self) -> Option<&Row> {
        self.current
    }

    fn previous(&mut self) -> Result<bool> {
        let prev = match self.state {
            CursorState::BeforeFirst => return Ok(false),
            CursorState::OnRow => self
                .position
                .and_then(|p| self.index.tree.prev_position(p)),
            CursorState::Exhausted => self.last_in_range(),
        };
        self.land(prev, CursorState::BeforeFirst)
    }

    fn state(&self) -> CursorState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::read_all;
    use alloc::vec;
    use quarry_core::schema::{NullOrdering, Order, TableBuilder};
    use quarry_core::DataType;

    fn people() -> Table {
        TableBuilder::new("people")
            .unwrap()
            .add_column("id", DataType::Int64)
            .unwrap()
            .add_column("name", DataType::String)
            .unwrap()
            .add_column("age", DataType::Int32)
            .unwrap()
            .add_nullable(&["age"])
            .add_primary_key(&["id"])
            .unwrap()
            .add_ordered_index("idxAge", &[("age", Order::Desc)], false)
            .unwrap()
            .build()
            .unwrap()
    }

    fn person(id: i64, name: &str, age: Option<i32>) -> Row {
        Row::new(
            id as RowId,
            vec![Value::Int64(id), Value::from(name), age.map_or(Value::Null, Value::Int32)],
        )
    }

    fn filled(index_name: &str, settings: ScanSettings) -> BTreeRowIndex {
        let mut index = BTreeRowIndex::new(people(), index_name, settings).unwrap();
        for (id, name, age) in [
            (3, "carol", Some(41)),
            (1, "alice", Some(30)),
            (5, "eve", None),
            (2, "bob", Some(25)),
            (4, "dave", Some(30)),
        ] {
            index.insert(person(id, name, age)).unwrap();
        }
        index
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter().map(|r| r.get(0).and_then(Value::as_i64).unwrap()).collect()
    }

    #[test]
    fn test_full_scan_sorted() {
        let index = filled("pkPeople", ScanSettings::new().btree_order(4));
        let mut cursor = index.scan(None, None).unwrap();
        assert_eq!(ids(&read_all(cursor.as_mut()).unwrap()), vec![1, 2, 3, 4, 5]);
        assert_eq!(cursor.state(), CursorState::Exhausted);
        assert!(!cursor.next().unwrap());
    }

    #[test]
    fn test_range_scan() {
        let index = filled("pkPeople", ScanSettings::new().btree_order(4));
        let lo = SearchRow::prefix(3, [2i64]);
        let hi = SearchRow::prefix(3, [4i64]);
        let mut cursor = index.scan(Some(&lo), Some(&hi)).unwrap();
        assert_eq!(ids(&read_all(cursor.as_mut()).unwrap()), vec![2, 3, 4]);
    }

    #[test]
    fn test_descending_key_with_nulls() {
        let index = filled("idxAge", ScanSettings::new());
        let mut cursor = index.scan(None, None).unwrap();
        let rows = read_all(cursor.as_mut()).unwrap();
        // DESC with NULLs low: NULL comes last.
        assert_eq!(ids(&rows), vec![3, 1, 4, 2, 5]);

        let index = filled("idxAge", ScanSettings::new().null_ordering(NullOrdering::First));
        let mut cursor = index.scan(None, None).unwrap();
        assert_eq!(ids(&read_all(cursor.as_mut()).unwrap()), vec![5, 3, 1, 4, 2]);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut index = filled("pkPeople", ScanSettings::new());
        let mut dup = person(1, "again", None);
        dup.set_id(99);
        let err = index.insert(dup).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { .. }));
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_insert_validates_shape() {
        let mut index = BTreeRowIndex::new(people(), "pkPeople", ScanSettings::new()).unwrap();
        let err = index.insert(Row::new(1, vec![Value::Int64(1)])).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema { .. }));
    }

    #[test]
    fn test_remove_and_get() {
        let mut index = filled("idxAge", ScanSettings::new());
        assert_eq!(index.get(&[Value::Int32(30)]).len(), 2);
        let removed = index.remove(1).unwrap();
        assert_eq!(removed.get(1), Some(&Value::from("alice")));
        assert_eq!(index.get(&[Value::Int32(30)]).len(), 1);
        assert!(index.remove(1).is_none());
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_previous_walks_back_within_range() {
        let index = filled("pkPeople", ScanSettings::new().btree_order(4));
        let lo = SearchRow::prefix(3, [2i64]);
        let hi = SearchRow::prefix(3, [4i64]);
        let mut cursor = index.scan(Some(&lo), Some(&hi)).unwrap();
        assert!(!cursor.previous().unwrap());
        while cursor.next().unwrap() {}

        let mut back = Vec::new();
        while cursor.previous().unwrap() {
            back.push(cursor.get().unwrap().get(0).and_then(Value::as_i64).unwrap());
        }
        assert_eq!(back, vec![4, 3, 2]);
        assert_eq!(cursor.state(), CursorState::BeforeFirst);

        assert!(cursor.next().unwrap());
        assert_eq!(cursor.get().unwrap().id(), 2);
    }

    #[test]
    fn test_rejects_non_btree_definition() {
        let table = TableBuilder::new("t")
            .unwrap()
            .add_column("k", DataType::Int64)
            .unwrap()
            .add_hash_index("idxK", &["k"], false)
            .unwrap()
            .build()
            .unwrap();
        let err = BTreeRowIndex::new(table, "idxK", ScanSettings::new()).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
    }

    #[test]
    fn test_scan_counts_stats() {
        let index = filled("pkPeople", ScanSettings::new());
        let mut cursor = index.scan(None, None).unwrap();
        read_all(cursor.as_mut()).unwrap();
        assert_eq!(index.stats().scans(), 1);
        assert_eq!(index.stats().rows_returned(), 5);
        assert_eq!(index.stats().total_rows(), 5);
    }
}
