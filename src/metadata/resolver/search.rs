use std::sync::{Arc, OnceLock};

use strum::{EnumCount, IntoEnumIterator};

use crate::metadata::{
    config::ResolverConfig,
    resolver::{RidList, SortedTable},
    tables::{ColumnReader, TableId},
};

/// How key lookups are answered for a table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStrategy {
    /// The header marks the table sorted; binary search the rows directly
    Sorted,
    /// Search a lazily built [`SortedTable`] instead
    Unsorted,
}

/// Key search over table columns.
///
/// Sorted tables are binary searched in place. Unsorted tables get an auxiliary
/// [`SortedTable`] per table, built on first use and cached for the lifetime of the engine.
/// The cache slot of a table is written once: concurrent first queries may each build an
/// index, but only the first one is published and every caller uses that one.
pub struct TableSearchEngine<R> {
    reader: R,
    strategies: Vec<SearchStrategy>,
    indexes: Vec<OnceLock<Arc<SortedTable>>>,
    generic_param_linear_fallback: bool,
    parallel_sort_threshold: u32,
}

impl<R: ColumnReader> TableSearchEngine<R> {
    /// Create an engine with the default configuration
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, &ResolverConfig::default())
    }

    /// Create an engine
    ///
    /// ## Arguments
    /// * 'reader' - Column source
    /// * 'config' - Fallback and sorting options
    pub fn with_config(reader: R, config: &ResolverConfig) -> Self {
        let strategies = TableId::iter()
            .map(|table| {
                if reader.is_sorted(table) {
                    SearchStrategy::Sorted
                } else {
                    SearchStrategy::Unsorted
                }
            })
            .collect();

        TableSearchEngine {
            reader,
            strategies,
            indexes: (0..TableId::COUNT).map(|_| OnceLock::new()).collect(),
            generic_param_linear_fallback: config.generic_param_linear_fallback,
            parallel_sort_threshold: config.parallel_sort_threshold,
        }
    }

    /// The column source
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// The strategy chosen for `table` from its sortedness bit
    pub fn strategy(&self, table: TableId) -> SearchStrategy {
        self.strategies[table as usize]
    }

    /// Binary search `key_column` of `table` for `key`, assuming ascending keys.
    ///
    /// Returns any matching rid, or 0. A row that cannot be read ends the search. An unsorted
    /// `GenericParam` table is scanned linearly when the binary search finds nothing.
    pub fn binary_search(&self, table: TableId, key_column: usize, key: u32) -> u32 {
        let mut lo = 1_u32;
        let mut hi = self.reader.row_count(table);
        while lo <= hi {
            let mid = lo + (hi - lo) / 2;
            let Some(mid_key) = self.reader.read_column(table, mid, key_column) else {
                return 0;
            };

            match mid_key.cmp(&key) {
                std::cmp::Ordering::Equal => return mid,
                std::cmp::Ordering::Greater => hi = mid - 1,
                std::cmp::Ordering::Less => match mid.checked_add(1) {
                    Some(next) => lo = next,
                    None => break,
                },
            }
        }

        // Older compilers emit GenericParam unsorted
        if table == TableId::GenericParam
            && self.generic_param_linear_fallback
            && !self.reader.is_sorted(table)
        {
            return self.linear_search(table, key_column, key);
        }

        0
    }

    /// First rid, in row order, whose `key_column` equals `key`, or 0.
    ///
    /// The scan stops at the first row that cannot be read.
    pub fn linear_search(&self, table: TableId, key_column: usize, key: u32) -> u32 {
        for rid in 1..=self.reader.row_count(table) {
            match self.reader.read_column(table, rid, key_column) {
                Some(row_key) if row_key == key => return rid,
                Some(_) => {}
                None => break,
            }
        }

        0
    }

    /// Every rid whose `key_column` equals `key`, assuming ascending keys.
    ///
    /// Finds one match with [`TableSearchEngine::binary_search`] and widens the range in both
    /// directions while the key repeats.
    pub fn find_all_rows(&self, table: TableId, key_column: usize, key: u32) -> RidList {
        let hit = self.binary_search(table, key_column, key);
        if hit == 0 {
            return RidList::EMPTY;
        }

        let same_key = |rid: u32| self.reader.read_column(table, rid, key_column) == Some(key);

        let mut start = hit;
        while start > 1 && same_key(start - 1) {
            start -= 1;
        }
        let mut end = hit;
        let row_count = self.reader.row_count(table);
        while end < row_count && same_key(end + 1) {
            end += 1;
        }

        RidList::range(start, end + 1)
    }

    /// Every rid whose `key_column` equals `key`, whether or not the table is sorted.
    ///
    /// Sorted tables are answered by [`TableSearchEngine::find_all_rows`]. Unsorted tables use
    /// the cached auxiliary index and return the matches in ascending rid order.
    pub fn find_all_rows_unsorted(&self, table: TableId, key_column: usize, key: u32) -> RidList {
        match self.strategy(table) {
            SearchStrategy::Sorted => self.find_all_rows(table, key_column, key),
            SearchStrategy::Unsorted => self.find_all_rows_indexed(table, key_column, key),
        }
    }

    /// Like [`TableSearchEngine::find_all_rows_unsorted`], but always through the auxiliary
    /// index, ignoring the sortedness bit.
    pub fn find_all_rows_indexed(&self, table: TableId, key_column: usize, key: u32) -> RidList {
        match self.sorted_index(table, key_column) {
            Some(index) if index.key_column() == key_column => index.find_all(key),
            // Indexed by another column, or truncated: scan the readable rows
            _ => {
                let readable = self.reader.readable_rows(table);
                if readable == 0 {
                    return RidList::EMPTY;
                }

                RidList::Explicit(
                    (1..=readable)
                        .filter(|rid| self.reader.read_column(table, *rid, key_column) == Some(key))
                        .collect(),
                )
            }
        }
    }

    /// The auxiliary index of `table`, building it over `key_column` on first use.
    ///
    /// Returns `None` for empty tables and for tables whose declared rows run past the end of
    /// the data. An index that already exists is returned as is, even if it was built over a
    /// different column.
    pub fn sorted_index(&self, table: TableId, key_column: usize) -> Option<Arc<SortedTable>> {
        let slot = &self.indexes[table as usize];
        if let Some(index) = slot.get() {
            return Some(index.clone());
        }

        let row_count = self.reader.row_count(table);
        if row_count == 0 {
            return None;
        }

        let readable = self.reader.readable_rows(table);
        if readable < row_count {
            log::debug!(
                "Not indexing {:?}: {} of {} rows are readable",
                table,
                readable,
                row_count
            );
            return None;
        }

        let index = Arc::new(SortedTable::build(
            &self.reader,
            table,
            key_column,
            self.parallel_sort_threshold,
        ));
        match slot.set(index) {
            Ok(()) => log::trace!(
                "Built index over {:?} column {} ({} rows)",
                table,
                key_column,
                self.reader.row_count(table)
            ),
            Err(_) => log::trace!("Dropped duplicate index over {:?}", table),
        }

        slot.get().cloned()
    }

    /// The auxiliary index of `table`, if one has been built
    pub fn cached_index(&self, table: TableId) -> Option<Arc<SortedTable>> {
        self.indexes[table as usize].get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{CountingReader, MockTables};

    fn sorted_keys() -> MockTables {
        // ClassLayout.Parent
        MockTables::new()
            .with_rows(
                TableId::ClassLayout,
                &[&[0, 0, 10], &[0, 0, 20], &[0, 0, 20], &[0, 0, 30]],
            )
            .with_sorted(TableId::ClassLayout)
    }

    #[test]
    fn binary_search_sorted() {
        let engine = TableSearchEngine::new(sorted_keys());

        let hit = engine.binary_search(TableId::ClassLayout, 2, 20);
        assert!(hit == 2 || hit == 3);
        assert_eq!(engine.binary_search(TableId::ClassLayout, 2, 10), 1);
        assert_eq!(engine.binary_search(TableId::ClassLayout, 2, 30), 4);
        assert_eq!(engine.binary_search(TableId::ClassLayout, 2, 5), 0);
        assert_eq!(engine.binary_search(TableId::ClassLayout, 2, 35), 0);
        assert_eq!(engine.binary_search(TableId::FieldRVA, 1, 1), 0);
    }

    #[test]
    fn find_all_rows_sorted() {
        let engine = TableSearchEngine::new(sorted_keys());

        assert_eq!(
            engine.find_all_rows(TableId::ClassLayout, 2, 20),
            RidList::Contiguous { start: 2, len: 2 }
        );
        assert_eq!(engine.find_all_rows(TableId::ClassLayout, 2, 10).to_vec(), vec![1]);
        assert!(engine.find_all_rows(TableId::ClassLayout, 2, 25).is_empty());
        assert_eq!(
            engine.find_all_rows_unsorted(TableId::ClassLayout, 2, 20).to_vec(),
            vec![2, 3]
        );
        assert!(engine.cached_index(TableId::ClassLayout).is_none());
    }

    #[test]
    fn linear_search() {
        let tables = MockTables::new().with_column(TableId::InterfaceImpl, &[3, 1, 2, 1]);
        let engine = TableSearchEngine::new(tables);

        assert_eq!(engine.linear_search(TableId::InterfaceImpl, 0, 1), 2);
        assert_eq!(engine.linear_search(TableId::InterfaceImpl, 0, 3), 1);
        assert_eq!(engine.linear_search(TableId::InterfaceImpl, 0, 4), 0);
    }

    #[test]
    fn unreadable_row_stops_search() {
        let tables = MockTables::new()
            .with_column(TableId::FieldLayout, &[1, 2])
            .with_row_count(TableId::FieldLayout, 9)
            .with_sorted(TableId::FieldLayout);
        let engine = TableSearchEngine::new(tables);

        assert_eq!(engine.binary_search(TableId::FieldLayout, 0, 2), 0);
    }

    #[test]
    fn generic_param_fallback() {
        // GenericParam.Owner out of order, sorted bit cleared
        let tables = MockTables::new().with_rows(
            TableId::GenericParam,
            &[&[0, 0, 9], &[0, 0, 1], &[0, 0, 5], &[0, 0, 3]],
        );

        let engine = TableSearchEngine::new(&tables);
        assert_eq!(engine.binary_search(TableId::GenericParam, 2, 3), 4);
        assert_eq!(engine.binary_search(TableId::GenericParam, 2, 7), 0);

        let config = ResolverConfig {
            generic_param_linear_fallback: false,
            ..ResolverConfig::default()
        };
        let engine = TableSearchEngine::with_config(&tables, &config);
        assert_eq!(engine.binary_search(TableId::GenericParam, 2, 3), 0);

        // Only GenericParam gets the fallback
        let tables = MockTables::new().with_column(TableId::NestedClass, &[9, 1, 5, 3]);
        let engine = TableSearchEngine::new(&tables);
        assert_eq!(engine.binary_search(TableId::NestedClass, 0, 3), 0);
        assert_eq!(engine.linear_search(TableId::NestedClass, 0, 3), 4);
    }

    #[test]
    fn unsorted_builds_index_once() {
        let tables = CountingReader::new(
            MockTables::new().with_column(TableId::CustomAttribute, &[30, 10, 20, 10]),
        );
        let engine = TableSearchEngine::new(&tables);
        assert_eq!(engine.strategy(TableId::CustomAttribute), SearchStrategy::Unsorted);

        let first = engine.find_all_rows_unsorted(TableId::CustomAttribute, 0, 10);
        let reads = tables.reads();
        assert_eq!(reads, 4);

        let second = engine.find_all_rows_unsorted(TableId::CustomAttribute, 0, 10);
        assert_eq!(first, second);
        assert_eq!(first.to_vec(), vec![2, 4]);
        assert_eq!(tables.reads(), reads);

        let index = engine.cached_index(TableId::CustomAttribute).unwrap();
        assert!(Arc::ptr_eq(
            &index,
            &engine.sorted_index(TableId::CustomAttribute, 0).unwrap()
        ));
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn index_over_other_column() {
        let tables = MockTables::new().with_rows(
            TableId::MethodImpl,
            &[&[2, 7, 0], &[1, 8, 0], &[2, 7, 0]],
        );
        let engine = TableSearchEngine::new(tables);

        assert_eq!(
            engine.find_all_rows_unsorted(TableId::MethodImpl, 0, 2).to_vec(),
            vec![1, 3]
        );
        assert_eq!(
            engine.find_all_rows_unsorted(TableId::MethodImpl, 1, 8).to_vec(),
            vec![2]
        );
        assert_eq!(
            engine.cached_index(TableId::MethodImpl).unwrap().key_column(),
            0
        );
    }

    #[test]
    fn indexed_ignores_sorted_bit() {
        // EventMap.Parent claimed sorted but is not
        let tables = MockTables::new()
            .with_rows(TableId::EventMap, &[&[5, 1], &[9, 3], &[2, 4]])
            .with_sorted(TableId::EventMap);
        let engine = TableSearchEngine::new(tables);

        assert_eq!(engine.find_all_rows(TableId::EventMap, 0, 2), RidList::EMPTY);
        assert_eq!(
            engine.find_all_rows_indexed(TableId::EventMap, 0, 2).to_vec(),
            vec![3]
        );
    }

    #[test]
    fn concurrent_first_queries_share_index() {
        let keys: Vec<u32> = (0..2000_u32).map(|i| (i * 31) % 17).collect();
        let tables = MockTables::new().with_column(TableId::DeclSecurity, &keys);
        let engine = TableSearchEngine::with_config(tables, &ResolverConfig::sequential());

        let indexes: Vec<Arc<SortedTable>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        let found = engine.find_all_rows_unsorted(TableId::DeclSecurity, 0, 3);
                        assert!(!found.is_empty());
                        engine.sorted_index(TableId::DeclSecurity, 0).unwrap()
                    })
                })
                .collect();

            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for index in &indexes {
            assert!(Arc::ptr_eq(index, &indexes[0]));
        }
    }

    #[test]
    fn garbage_never_panics() {
        let tables = MockTables::new()
            .with_column(TableId::Constant, &[u32::MAX, 0, 7])
            .with_row_count(TableId::Constant, u32::MAX);
        let engine = TableSearchEngine::new(tables);

        assert_eq!(engine.binary_search(TableId::Constant, 0, 1), 0);
        assert_eq!(engine.binary_search(TableId::Constant, 99, 1), 0);
        assert!(engine.find_all_rows(TableId::Constant, 0, 7).is_empty());
    }

    /// Every row readable, every key 0
    struct ZeroKeys;

    impl ColumnReader for ZeroKeys {
        fn row_count(&self, _table: TableId) -> u32 {
            u32::MAX
        }

        fn is_sorted(&self, _table: TableId) -> bool {
            true
        }

        fn column_count(&self, _table: TableId) -> usize {
            3
        }

        fn read_column(&self, _table: TableId, _rid: u32, _column: usize) -> Option<u32> {
            Some(0)
        }
    }

    #[test]
    fn binary_search_past_last_rid() {
        let engine = TableSearchEngine::new(ZeroKeys);

        assert_eq!(engine.binary_search(TableId::ClassLayout, 2, 1), 0);
        assert_eq!(engine.binary_search(TableId::ClassLayout, 2, u32::MAX), 0);
    }

    #[test]
    fn truncated_table_is_scanned() {
        // CustomAttribute declares far more rows than the data holds
        let tables = CountingReader::new(
            MockTables::new()
                .with_column(TableId::CustomAttribute, &[30, 10, 20, 10])
                .with_row_count(TableId::CustomAttribute, 0x00FF_FFFF),
        );
        let engine = TableSearchEngine::new(&tables);

        assert!(engine.sorted_index(TableId::CustomAttribute, 0).is_none());
        assert_eq!(
            engine.find_all_rows_unsorted(TableId::CustomAttribute, 0, 10).to_vec(),
            vec![2, 4]
        );
        assert!(engine
            .find_all_rows_unsorted(TableId::CustomAttribute, 0, 40)
            .is_empty());
        assert!(engine.cached_index(TableId::CustomAttribute).is_none());
        assert_eq!(tables.reads(), 8);
    }
}
