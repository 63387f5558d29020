//! Column layout of every metadata table.
//!
//! ECMA-335 II.22 fixes the column order of each table; the width of each column depends on
//! heap sizes and on the row counts of the referenced tables (see [`TableInfo`]). A
//! [`TableLayout`] is computed once per table when the table stream is loaded and gives the
//! byte offset and width of every column inside a row.

use crate::metadata::tables::{CodedIndexType, TableId, TableInfo};

/// The heaps a column can point into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeapKind {
    /// `#Strings`
    Strings,
    /// `#GUID`
    Guid,
    /// `#Blob`
    Blob,
}

/// Semantic role of a column
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// A primitive value of the given fixed width (1, 2 or 4 bytes)
    Fixed(u8),
    /// An offset into a heap
    Heap(HeapKind),
    /// A rid into a single table
    Table(TableId),
    /// A coded index into one of several tables
    Coded(CodedIndexType),
}

/// A column descriptor: where a column lives inside a row and what it holds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    /// Column index inside the row
    pub index: usize,
    /// Byte offset inside the row
    pub offset: u32,
    /// Width in bytes
    pub width: u8,
    /// Semantic role
    pub kind: ColumnKind,
}

/// The resolved layout of one table
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableLayout {
    /// Ordered column descriptors
    pub columns: Vec<Column>,
    /// Width of a full row in bytes
    pub row_size: u32,
}

impl TableLayout {
    /// Compute the layout of `table` for the given sizes.
    ///
    /// ## Arguments
    /// * 'table'              - The table to lay out
    /// * 'info'               - Row counts and heap sizes of this table stream
    /// * 'generic_param_kind' - Table stream version 1.1 carries an extra `Kind` column in `GenericParam`
    #[must_use]
    pub fn new(table: TableId, info: &TableInfo, generic_param_kind: bool) -> Self {
        let mut offset = 0_u32;
        let columns = column_kinds(table, generic_param_kind)
            .iter()
            .enumerate()
            .map(|(index, kind)| {
                let width = column_width(*kind, info);
                let column = Column {
                    index,
                    offset,
                    width,
                    kind: *kind,
                };
                offset += u32::from(width);
                column
            })
            .collect();

        TableLayout {
            columns,
            row_size: offset,
        }
    }

    /// Returns the descriptor of a column, if the table has that many columns
    #[must_use]
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }
}

/// Width in bytes of a column of the given kind
#[must_use]
pub fn column_width(kind: ColumnKind, info: &TableInfo) -> u8 {
    match kind {
        ColumnKind::Fixed(width) => width,
        ColumnKind::Heap(HeapKind::Strings) => info.str_bytes(),
        ColumnKind::Heap(HeapKind::Guid) => info.guid_bytes(),
        ColumnKind::Heap(HeapKind::Blob) => info.blob_bytes(),
        ColumnKind::Table(table) => info.table_index_bytes(table),
        ColumnKind::Coded(coded) => info.coded_index_bytes(coded),
    }
}

const U8: ColumnKind = ColumnKind::Fixed(1);
const U16: ColumnKind = ColumnKind::Fixed(2);
const U32: ColumnKind = ColumnKind::Fixed(4);
const STR: ColumnKind = ColumnKind::Heap(HeapKind::Strings);
const GUID: ColumnKind = ColumnKind::Heap(HeapKind::Guid);
const BLOB: ColumnKind = ColumnKind::Heap(HeapKind::Blob);

/// The ordered column kinds of a table (ECMA-335 II.22)
#[must_use]
pub fn column_kinds(table: TableId, generic_param_kind: bool) -> &'static [ColumnKind] {
    use ColumnKind::{Coded, Table};
    use CodedIndexType as Ci;
    use TableId as T;

    match table {
        T::Module => &[U16, STR, GUID, GUID, GUID],
        T::TypeRef => &[Coded(Ci::ResolutionScope), STR, STR],
        T::TypeDef => &[
            U32,
            STR,
            STR,
            Coded(Ci::TypeDefOrRef),
            Table(T::Field),
            Table(T::MethodDef),
        ],
        T::FieldPtr => &[Table(T::Field)],
        T::Field => &[U16, STR, BLOB],
        T::MethodPtr => &[Table(T::MethodDef)],
        T::MethodDef => &[U32, U16, U16, STR, BLOB, Table(T::Param)],
        T::ParamPtr => &[Table(T::Param)],
        T::Param => &[U16, U16, STR],
        T::InterfaceImpl => &[Table(T::TypeDef), Coded(Ci::TypeDefOrRef)],
        T::MemberRef => &[Coded(Ci::MemberRefParent), STR, BLOB],
        T::Constant => &[U8, U8, Coded(Ci::HasConstant), BLOB],
        T::CustomAttribute => &[Coded(Ci::HasCustomAttribute), Coded(Ci::CustomAttributeType), BLOB],
        T::FieldMarshal => &[Coded(Ci::HasFieldMarshal), BLOB],
        T::DeclSecurity => &[U16, Coded(Ci::HasDeclSecurity), BLOB],
        T::ClassLayout => &[U16, U32, Table(T::TypeDef)],
        T::FieldLayout => &[U32, Table(T::Field)],
        T::StandAloneSig => &[BLOB],
        T::EventMap => &[Table(T::TypeDef), Table(T::Event)],
        T::EventPtr => &[Table(T::Event)],
        T::Event => &[U16, STR, Coded(Ci::TypeDefOrRef)],
        T::PropertyMap => &[Table(T::TypeDef), Table(T::Property)],
        T::PropertyPtr => &[Table(T::Property)],
        T::Property => &[U16, STR, BLOB],
        T::MethodSemantics => &[U16, Table(T::MethodDef), Coded(Ci::HasSemantics)],
        T::MethodImpl => &[
            Table(T::TypeDef),
            Coded(Ci::MethodDefOrRef),
            Coded(Ci::MethodDefOrRef),
        ],
        T::ModuleRef => &[STR],
        T::TypeSpec => &[BLOB],
        T::ImplMap => &[U16, Coded(Ci::MemberForwarded), STR, Table(T::ModuleRef)],
        T::FieldRVA => &[U32, Table(T::Field)],
        T::EncLog => &[U32, U32],
        T::EncMap => &[U32],
        T::Assembly => &[U32, U16, U16, U16, U16, U32, BLOB, STR, STR],
        T::AssemblyProcessor => &[U32],
        T::AssemblyOS => &[U32, U32, U32],
        T::AssemblyRef => &[U16, U16, U16, U16, U32, BLOB, STR, STR, BLOB],
        T::AssemblyRefProcessor => &[U32, Table(T::AssemblyRef)],
        T::AssemblyRefOS => &[U32, U32, U32, Table(T::AssemblyRef)],
        T::File => &[U32, STR, BLOB],
        T::ExportedType => &[U32, U32, STR, STR, Coded(Ci::Implementation)],
        T::ManifestResource => &[U32, U32, STR, Coded(Ci::Implementation)],
        T::NestedClass => &[Table(T::TypeDef), Table(T::TypeDef)],
        T::GenericParam => {
            if generic_param_kind {
                &[U16, U16, Coded(Ci::TypeOrMethodDef), STR, Coded(Ci::TypeDefOrRef)]
            } else {
                &[U16, U16, Coded(Ci::TypeOrMethodDef), STR]
            }
        }
        T::MethodSpec => &[Coded(Ci::MethodDefOrRef), BLOB],
        T::GenericParamConstraint => &[Table(T::GenericParam), Coded(Ci::TypeDefOrRef)],
    }
}
