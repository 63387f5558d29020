//! Metadata table descriptors and the raw column access seam.
//!
//! This module knows the shape of every table defined by ECMA-335 II.22: its identifier
//! ([`TableId`]), the width of every reference column for a given set of row counts
//! ([`TableInfo`]), and the resulting per-table row layout ([`TableLayout`]). It does not own
//! any table data. Row bytes live in the table stream, which implements [`ColumnReader`].
//!
//! # Key Components
//!
//! - [`TableId`] - Table numbers `0x00..=0x2C`
//! - [`CodedIndexType`] - Coded index kinds with encode / decode helpers
//! - [`TableInfo`] - Row counts and derived index widths
//! - [`TableLayout`] - Column offsets and widths of one table
//! - [`ColumnReader`] - Fixed-width column reads by `(table, rid, column)`
//!
//! # Example
//!
//! ```rust
//! use mdscope::metadata::tables::{CodedIndexType, TableId};
//!
//! let encoded = CodedIndexType::TypeOrMethodDef.encode(TableId::MethodDef, 3);
//! assert_eq!(encoded, Some(0b111));
//! assert_eq!(
//!     CodedIndexType::TypeOrMethodDef.decode(0b111),
//!     Some((TableId::MethodDef, 3))
//! );
//! ```

use std::sync::Arc;

mod attributes;
mod codedindex;
mod schema;
mod tableid;
mod tableinfo;

pub use attributes::*;
pub use codedindex::CodedIndexType;
pub use schema::{column_kinds, column_width, Column, ColumnKind, HeapKind, TableLayout};
pub use tableid::TableId;
pub use tableinfo::{TableInfo, TableInfoRef, TableRowInfo};

/// Raw, fixed-width access to table columns.
///
/// Values of 1, 2 and 4 byte columns are widened to `u32`. Reads never fail loudly: an
/// out-of-range rid, a column index past the end of the row or a row that is not backed by
/// data all yield `None`, and callers treat that as "no data".
///
/// Implementations must be usable from several threads at once.
pub trait ColumnReader: Send + Sync {
    /// Number of rows in `table`
    fn row_count(&self, table: TableId) -> u32;

    /// The header-declared sortedness bit of `table`
    fn is_sorted(&self, table: TableId) -> bool;

    /// Number of columns of `table`
    fn column_count(&self, table: TableId) -> usize;

    /// Read one column of one row.
    ///
    /// ## Arguments
    /// * 'table'  - The table to read from
    /// * 'rid'    - 1-based row id
    /// * 'column' - 0-based column index
    fn read_column(&self, table: TableId, rid: u32, column: usize) -> Option<u32>;

    /// Number of leading rows of `table` that lie entirely inside the backing data.
    ///
    /// Equals [`ColumnReader::row_count`] unless the declared row count runs past the end of
    /// the data.
    fn readable_rows(&self, table: TableId) -> u32 {
        self.row_count(table)
    }

    /// `true` if the table stream may contain logically deleted rows (edit-and-continue)
    fn has_deleted_rows(&self) -> bool {
        false
    }

    /// Read every column of one row
    fn read_row(&self, table: TableId, rid: u32) -> Option<Vec<u32>> {
        (0..self.column_count(table))
            .map(|column| self.read_column(table, rid, column))
            .collect()
    }
}

impl<T: ColumnReader + ?Sized> ColumnReader for Arc<T> {
    fn row_count(&self, table: TableId) -> u32 {
        (**self).row_count(table)
    }

    fn is_sorted(&self, table: TableId) -> bool {
        (**self).is_sorted(table)
    }

    fn column_count(&self, table: TableId) -> usize {
        (**self).column_count(table)
    }

    fn read_column(&self, table: TableId, rid: u32, column: usize) -> Option<u32> {
        (**self).read_column(table, rid, column)
    }

    fn readable_rows(&self, table: TableId) -> u32 {
        (**self).readable_rows(table)
    }

    fn has_deleted_rows(&self) -> bool {
        (**self).has_deleted_rows()
    }

    fn read_row(&self, table: TableId, rid: u32) -> Option<Vec<u32>> {
        (**self).read_row(table, rid)
    }
}

impl<T: ColumnReader + ?Sized> ColumnReader for &T {
    fn row_count(&self, table: TableId) -> u32 {
        (**self).row_count(table)
    }

    fn is_sorted(&self, table: TableId) -> bool {
        (**self).is_sorted(table)
    }

    fn column_count(&self, table: TableId) -> usize {
        (**self).column_count(table)
    }

    fn read_column(&self, table: TableId, rid: u32, column: usize) -> Option<u32> {
        (**self).read_column(table, rid, column)
    }

    fn readable_rows(&self, table: TableId) -> u32 {
        (**self).readable_rows(table)
    }

    fn has_deleted_rows(&self) -> bool {
        (**self).has_deleted_rows()
    }

    fn read_row(&self, table: TableId, rid: u32) -> Option<Vec<u32>> {
        (**self).read_row(table, rid)
    }
}
