use crate::metadata::tables::{ColumnReader, TableId};

/// An owner-to-member range relation.
///
/// The owner table stores, in `list_column`, the rid of the first member it owns; its list ends
/// where the next owner's list begins. Member lists may be indirected through a pointer table,
/// and members of some kinds can be marked deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberRelation {
    /// Table holding the start column
    pub owner: TableId,
    /// Column of `owner` holding the first member rid
    pub list_column: usize,
    /// Table the list points into
    pub member: TableId,
    /// Pointer table that may indirect `member`
    pub pointer: TableId,
    /// Hide members marked deleted when the table stream tracks deletions
    pub filter_deleted: bool,
    /// Column of `member` holding its flags
    pub flags_column: usize,
    /// Column of `member` holding its name
    pub name_column: usize,
}

impl MemberRelation {
    /// `TypeDef.FieldList` into `Field`
    pub const FIELD: MemberRelation = MemberRelation {
        owner: TableId::TypeDef,
        list_column: 4,
        member: TableId::Field,
        pointer: TableId::FieldPtr,
        filter_deleted: true,
        flags_column: 0,
        name_column: 1,
    };

    /// `TypeDef.MethodList` into `MethodDef`
    pub const METHOD: MemberRelation = MemberRelation {
        owner: TableId::TypeDef,
        list_column: 5,
        member: TableId::MethodDef,
        pointer: TableId::MethodPtr,
        filter_deleted: true,
        flags_column: 2,
        name_column: 3,
    };

    /// `MethodDef.ParamList` into `Param`. Params are never filtered for deletion.
    pub const PARAM: MemberRelation = MemberRelation {
        owner: TableId::MethodDef,
        list_column: 5,
        member: TableId::Param,
        pointer: TableId::ParamPtr,
        filter_deleted: false,
        flags_column: 0,
        name_column: 2,
    };

    /// `EventMap.EventList` into `Event`
    pub const EVENT: MemberRelation = MemberRelation {
        owner: TableId::EventMap,
        list_column: 1,
        member: TableId::Event,
        pointer: TableId::EventPtr,
        filter_deleted: true,
        flags_column: 0,
        name_column: 1,
    };

    /// `PropertyMap.PropertyList` into `Property`
    pub const PROPERTY: MemberRelation = MemberRelation {
        owner: TableId::PropertyMap,
        list_column: 1,
        member: TableId::Property,
        pointer: TableId::PropertyPtr,
        filter_deleted: true,
        flags_column: 0,
        name_column: 1,
    };
}

/// Which member kinds go through their pointer table.
///
/// Fixed at construction: a kind is indirected iff its pointer table has at least one row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct IndirectionFlags {
    /// `FieldPtr` is present
    pub field: bool,
    /// `MethodPtr` is present
    pub method: bool,
    /// `ParamPtr` is present
    pub param: bool,
    /// `EventPtr` is present
    pub event: bool,
    /// `PropertyPtr` is present
    pub property: bool,
}

impl IndirectionFlags {
    /// Read the flags from the row counts of the pointer tables
    #[must_use]
    pub fn from_reader<R: ColumnReader + ?Sized>(reader: &R) -> Self {
        IndirectionFlags {
            field: reader.row_count(TableId::FieldPtr) > 0,
            method: reader.row_count(TableId::MethodPtr) > 0,
            param: reader.row_count(TableId::ParamPtr) > 0,
            event: reader.row_count(TableId::EventPtr) > 0,
            property: reader.row_count(TableId::PropertyPtr) > 0,
        }
    }

    /// `true` if `member` goes through its pointer table
    #[must_use]
    pub fn is_indirect(&self, member: TableId) -> bool {
        match member {
            TableId::Field => self.field,
            TableId::MethodDef => self.method,
            TableId::Param => self.param,
            TableId::Event => self.event,
            TableId::Property => self.property,
            _ => false,
        }
    }

    /// `true` if any member kind is indirected
    #[must_use]
    pub fn any(&self) -> bool {
        self.field || self.method || self.param || self.event || self.property
    }
}
