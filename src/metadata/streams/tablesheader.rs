//! The table stream (`#~` and `#-`).
//!
//! The stream starts with a fixed header followed by one row count per present table, then the
//! rows of every present table in table-number order. [`TablesStream`] parses the header once,
//! computes the layout of every table and answers column reads through
//! [`crate::metadata::tables::ColumnReader`].
//!
//! # Reference
//! - [ECMA-335 II.24.2.6](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::sync::Arc;

use bitflags::bitflags;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    metadata::{
        streams::{HeapStream, StreamKind},
        tables::{ColumnReader, TableId, TableInfo, TableInfoRef, TableLayout},
    },
    Error::OutOfBounds,
    Result,
};

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    /// The `HeapSizes` byte of the table stream header
    pub struct HeapSizes : u8 {
        /// `#Strings` indexes are 4 bytes wide
        const BIG_STRINGS = 0x01;
        /// `#GUID` indexes are 4 bytes wide
        const BIG_GUID = 0x02;
        /// `#Blob` indexes are 4 bytes wide
        const BIG_BLOB = 0x04;
        /// Padding bit, ignored
        const PADDING = 0x08;
        /// The stream only carries edit-and-continue deltas
        const DELTA_ONLY = 0x20;
        /// An extra 4 byte value follows the row counts
        const EXTRA_DATA = 0x40;
        /// Rows may be marked deleted (`RTSpecialName` + `_Deleted`)
        const HAS_DELETE = 0x80;
    }
}

/// Row counts are 24 bit wide; the upper byte is reserved
const ROW_COUNT_MASK: u32 = 0x00FF_FFFF;

/// Size of the fixed part of the header
const HEADER_SIZE: usize = 24;

/// The parsed table stream.
///
/// Only the header is decoded eagerly. Row data stays in the stream and is read column by
/// column on demand, through the stream's current reader.
pub struct TablesStream {
    stream: Arc<HeapStream>,
    major_version: u8,
    minor_version: u8,
    heap_sizes: HeapSizes,
    valid: u64,
    sorted: u64,
    extra_data: Option<u32>,
    info: TableInfoRef,
    layouts: Vec<TableLayout>,
    offsets: Vec<usize>,
}

impl TablesStream {
    /// Parse the header of a table stream
    ///
    /// # Arguments
    /// * 'stream' - The `#~` or `#-` stream
    ///
    /// # Errors
    /// Returns an error if the stream is not a table stream or its header is truncated
    pub fn new(stream: Arc<HeapStream>) -> Result<TablesStream> {
        if !stream.kind().is_tables() {
            return Err(malformed_error!(
                "Stream '{}' is not a table stream",
                stream.name()
            ));
        }

        let mut reader = stream.create_reader();
        if reader.len() < HEADER_SIZE {
            return Err(OutOfBounds);
        }

        let _reserved = reader.read_le::<u32>()?;
        let major_version = reader.read_le::<u8>()?;
        let minor_version = reader.read_le::<u8>()?;
        let heap_sizes = HeapSizes::from_bits_retain(reader.read_le::<u8>()?);
        let _log2_rid = reader.read_le::<u8>()?;
        let valid = reader.read_le::<u64>()?;
        let sorted = reader.read_le::<u64>()?;

        let mut row_counts = vec![0_u32; TableId::COUNT];
        for bit in 0..64 {
            if valid & (1_u64 << bit) == 0 {
                continue;
            }

            let rows = reader.read_le::<u32>()? & ROW_COUNT_MASK;
            match row_counts.get_mut(bit) {
                Some(count) => *count = rows,
                None => log::warn!(
                    "Ignoring unknown table {:#x} with {} rows",
                    bit,
                    rows
                ),
            }
        }

        let extra_data = if heap_sizes.contains(HeapSizes::EXTRA_DATA) {
            Some(reader.read_le::<u32>()?)
        } else {
            None
        };

        let info = Arc::new(TableInfo::new(
            &row_counts,
            heap_sizes.contains(HeapSizes::BIG_STRINGS),
            heap_sizes.contains(HeapSizes::BIG_GUID),
            heap_sizes.contains(HeapSizes::BIG_BLOB),
        ));

        let generic_param_kind = major_version == 1 && minor_version == 1;
        let mut layouts = Vec::with_capacity(TableId::COUNT);
        let mut offsets = Vec::with_capacity(TableId::COUNT);
        let mut current_offset = reader.position();
        for table in TableId::iter() {
            let layout = TableLayout::new(table, &info, generic_param_kind);
            let size = layout.row_size as usize * info.get(table).rows as usize;

            offsets.push(current_offset);
            layouts.push(layout);
            current_offset = current_offset.saturating_add(size);
        }

        if current_offset > stream.len() {
            log::warn!(
                "Table data ends at {:#x}, beyond the table stream ({:#x}); trailing rows are unreadable",
                current_offset,
                stream.len()
            );
        }

        log::debug!(
            "{} v{}.{}: {} tables, heap sizes {:?}",
            stream.name(),
            major_version,
            minor_version,
            valid.count_ones(),
            heap_sizes
        );

        Ok(TablesStream {
            stream,
            major_version,
            minor_version,
            heap_sizes,
            valid,
            sorted,
            extra_data,
            info,
            layouts,
            offsets,
        })
    }

    /// The underlying stream
    #[must_use]
    pub fn stream(&self) -> &Arc<HeapStream> {
        &self.stream
    }

    /// `#~` or `#-`
    #[must_use]
    pub fn kind(&self) -> StreamKind {
        self.stream.kind()
    }

    /// `true` for the uncompressed `#-` stream
    #[must_use]
    pub fn is_uncompressed(&self) -> bool {
        self.stream.kind() == StreamKind::UncompressedTables
    }

    /// Major version of the table schema
    #[must_use]
    pub fn major_version(&self) -> u8 {
        self.major_version
    }

    /// Minor version of the table schema
    #[must_use]
    pub fn minor_version(&self) -> u8 {
        self.minor_version
    }

    /// The `HeapSizes` flags
    #[must_use]
    pub fn heap_sizes(&self) -> HeapSizes {
        self.heap_sizes
    }

    /// Bit vector of present tables
    #[must_use]
    pub fn valid(&self) -> u64 {
        self.valid
    }

    /// Bit vector of sorted tables
    #[must_use]
    pub fn sorted(&self) -> u64 {
        self.sorted
    }

    /// The extra value following the row counts, if the header announces one
    #[must_use]
    pub fn extra_data(&self) -> Option<u32> {
        self.extra_data
    }

    /// Number of present tables
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// Row counts and index widths
    #[must_use]
    pub fn info(&self) -> &TableInfoRef {
        &self.info
    }

    /// Layout of `table`
    #[must_use]
    pub fn layout(&self, table: TableId) -> &TableLayout {
        &self.layouts[table as usize]
    }

    /// `true` if `table` has at least one row
    #[must_use]
    pub fn has_rows(&self, table: TableId) -> bool {
        self.info.get(table).rows > 0
    }

    /// Offset of the first row of `table`, relative to the stream
    #[must_use]
    pub fn table_offset(&self, table: TableId) -> usize {
        self.offsets[table as usize]
    }

    fn column_offset(&self, table: TableId, rid: u32, column: usize) -> Option<(usize, u8)> {
        if rid == 0 || rid > self.info.get(table).rows {
            return None;
        }

        let layout = &self.layouts[table as usize];
        let column = layout.column(column)?;
        let row_offset = (rid as usize - 1).checked_mul(layout.row_size as usize)?;
        let offset = self.offsets[table as usize]
            .checked_add(row_offset)?
            .checked_add(column.offset as usize)?;

        Some((offset, column.width))
    }
}

impl ColumnReader for TablesStream {
    fn row_count(&self, table: TableId) -> u32 {
        self.info.get(table).rows
    }

    fn is_sorted(&self, table: TableId) -> bool {
        self.sorted & (1_u64 << table as u8) != 0
    }

    fn column_count(&self, table: TableId) -> usize {
        self.layouts[table as usize].columns.len()
    }

    fn read_column(&self, table: TableId, rid: u32, column: usize) -> Option<u32> {
        let (offset, width) = self.column_offset(table, rid, column)?;
        self.stream
            .with_reader(|reader| reader.read_width_at(offset, width).ok())
    }

    fn readable_rows(&self, table: TableId) -> u32 {
        let rows = self.info.get(table).rows;
        let row_size = self.layouts[table as usize].row_size as usize;
        if row_size == 0 {
            return rows;
        }

        let available = self.stream.len().saturating_sub(self.offsets[table as usize]) / row_size;
        u32::try_from(available).map_or(rows, |available| rows.min(available))
    }

    fn has_deleted_rows(&self) -> bool {
        self.heap_sizes.contains(HeapSizes::HAS_DELETE)
    }

    fn read_row(&self, table: TableId, rid: u32) -> Option<Vec<u32>> {
        let layout = &self.layouts[table as usize];
        let (offset, _) = self.column_offset(table, rid, 0)?;

        self.stream.with_reader(|reader| {
            layout
                .columns
                .iter()
                .map(|column| {
                    reader
                        .read_width_at(offset + column.offset as usize, column.width)
                        .ok()
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        file::{Backend, Memory},
        test::MetadataBuilder,
    };

    fn tables(data: Vec<u8>, name: &str) -> Result<TablesStream> {
        let len = data.len();
        let backend: Arc<dyn Backend> = Arc::new(Memory::new(data));
        TablesStream::new(Arc::new(HeapStream::new(backend, name, 0, len)?))
    }

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = vec![
            0x00, 0x00, 0x00, 0x00, // reserved
            0x02, 0x00,             // version 2.0
            0x80,                   // heap sizes: HAS_DELETE
            0x01,                   // reserved
            0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // valid: Field
            0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // sorted: Field
            0x02, 0x00, 0x00, 0x00, // Field rows

            0x06, 0x04, 0x01, 0x00, 0x0A, 0x00, // Field 1
            0x16, 0x00, 0x08, 0x00, 0x0B, 0x00, // Field 2
        ];

        let stream = tables(data, "#~").unwrap();

        assert_eq!(stream.major_version(), 2);
        assert_eq!(stream.table_count(), 1);
        assert!(stream.has_deleted_rows());
        assert!(stream.is_sorted(TableId::Field));
        assert!(!stream.is_sorted(TableId::TypeDef));
        assert_eq!(stream.row_count(TableId::Field), 2);
        assert_eq!(stream.table_offset(TableId::Field), 28);
        assert_eq!(stream.read_column(TableId::Field, 1, 0), Some(0x0406));
        assert_eq!(stream.read_column(TableId::Field, 2, 1), Some(8));
        assert_eq!(stream.read_row(TableId::Field, 2), Some(vec![0x16, 8, 0x0B]));
        assert_eq!(stream.read_column(TableId::Field, 0, 0), None);
        assert_eq!(stream.read_column(TableId::Field, 3, 0), None);
        assert_eq!(stream.read_column(TableId::Field, 1, 3), None);
        assert_eq!(stream.read_column(TableId::TypeDef, 1, 0), None);
    }

    #[test]
    fn unknown_tables_and_extra_data() {
        #[rustfmt::skip]
        let data = vec![
            0x00, 0x00, 0x00, 0x00,
            0x02, 0x00,
            0x40,                   // heap sizes: EXTRA_DATA
            0x01,
            0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, // valid: Module, table 0x3F
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0xFF, // Module rows, upper byte reserved
            0x07, 0x00, 0x00, 0x00, // table 0x3F rows
            0xEF, 0xBE, 0xAD, 0xDE, // extra data

            0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];

        let stream = tables(data, "#-").unwrap();

        assert!(stream.is_uncompressed());
        assert_eq!(stream.extra_data(), Some(0xDEAD_BEEF));
        assert_eq!(stream.row_count(TableId::Module), 1);
        assert_eq!(stream.read_column(TableId::Module, 1, 1), Some(1));
    }

    #[test]
    fn truncated_rows_are_unreadable() {
        #[rustfmt::skip]
        let data = vec![
            0x00, 0x00, 0x00, 0x00,
            0x02, 0x00,
            0x00,
            0x01,
            0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // valid: FieldPtr
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x03, 0x00, 0x00, 0x00,

            0x02, 0x00, 0x01, 0x00,
        ];

        let stream = tables(data, "#~").unwrap();

        assert_eq!(stream.row_count(TableId::FieldPtr), 3);
        assert_eq!(stream.readable_rows(TableId::FieldPtr), 2);
        assert_eq!(stream.readable_rows(TableId::Field), 0);
        assert_eq!(stream.read_column(TableId::FieldPtr, 2, 0), Some(1));
        assert_eq!(stream.read_column(TableId::FieldPtr, 3, 0), None);
        assert_eq!(stream.read_row(TableId::FieldPtr, 3), None);
    }

    #[test]
    fn invalid_header() {
        assert!(tables(vec![0u8; 16], "#~").is_err());
        assert!(tables(vec![0u8; 32], "#Blob").is_err());

        let mut data = vec![0u8; 28];
        data[8] = 0x03;
        assert!(tables(data, "#~").is_err());
    }

    #[test]
    fn generic_param_kind_column() {
        let data = MetadataBuilder::new()
            .with_version(1, 1)
            .with_table(TableId::GenericParam, &[&[0, 0, 2, 0, 5]])
            .build_tables();
        let stream = tables(data, "#~").unwrap();
        assert_eq!(stream.column_count(TableId::GenericParam), 5);
        assert_eq!(stream.read_column(TableId::GenericParam, 1, 4), Some(5));

        let data = MetadataBuilder::new()
            .with_version(2, 0)
            .with_table(TableId::GenericParam, &[&[0, 0, 2, 0]])
            .build_tables();
        let stream = tables(data, "#~").unwrap();
        assert_eq!(stream.column_count(TableId::GenericParam), 4);
        assert_eq!(stream.layout(TableId::GenericParam).row_size, 8);
    }
}
