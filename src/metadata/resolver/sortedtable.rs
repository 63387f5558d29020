use rayon::slice::ParallelSliceMut;

use crate::metadata::{
    resolver::RidList,
    tables::{ColumnReader, TableId},
};

/// Auxiliary index over one key column of a table whose rows are not sorted by that key.
///
/// Holds one `(rid, key)` pair per row, ordered by key and then by rid, behind a sentinel at
/// slot 0, so `len() == row_count + 1`. Rows whose key cannot be read are indexed under key 0.
/// Once built the index never changes.
#[derive(Debug)]
pub struct SortedTable {
    table: TableId,
    key_column: usize,
    rows: Vec<(u32, u32)>,
}

impl SortedTable {
    /// Read every key of `table` and sort the pairs.
    ///
    /// ## Arguments
    /// * 'reader'             - Column source
    /// * 'table'              - The table to index
    /// * 'key_column'         - The column to index by
    /// * 'parallel_threshold' - Row count from which the pairs are sorted in parallel
    pub fn build<R: ColumnReader + ?Sized>(
        reader: &R,
        table: TableId,
        key_column: usize,
        parallel_threshold: u32,
    ) -> Self {
        let row_count = reader.row_count(table);

        let mut rows = Vec::with_capacity(row_count as usize + 1);
        rows.push((0, 0));
        rows.extend((1..=row_count).map(|rid| {
            (
                rid,
                reader.read_column(table, rid, key_column).unwrap_or(0),
            )
        }));

        // (key, rid) is unique per row, so the unstable sorts are deterministic
        if row_count >= parallel_threshold {
            rows[1..].par_sort_unstable_by_key(|(rid, key)| (*key, *rid));
        } else {
            rows[1..].sort_unstable_by_key(|(rid, key)| (*key, *rid));
        }

        SortedTable {
            table,
            key_column,
            rows,
        }
    }

    /// The indexed table
    #[must_use]
    pub fn table(&self) -> TableId {
        self.table
    }

    /// The indexed column
    #[must_use]
    pub fn key_column(&self) -> usize {
        self.key_column
    }

    /// Number of slots, including the sentinel
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` if the index holds no rows besides the sentinel
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.len() <= 1
    }

    /// The `(rid, key)` pairs in key order, without the sentinel
    #[must_use]
    pub fn entries(&self) -> &[(u32, u32)] {
        &self.rows[1..]
    }

    /// All rids whose key equals `key`, in ascending rid order
    #[must_use]
    pub fn find_all(&self, key: u32) -> RidList {
        let entries = self.entries();
        let Ok(hit) = entries.binary_search_by_key(&key, |(_, entry_key)| *entry_key) else {
            return RidList::EMPTY;
        };

        let mut first = hit;
        while first > 0 && entries[first - 1].1 == key {
            first -= 1;
        }
        let mut last = hit;
        while last + 1 < entries.len() && entries[last + 1].1 == key {
            last += 1;
        }

        RidList::Explicit(entries[first..=last].iter().map(|(rid, _)| *rid).collect())
    }
}
