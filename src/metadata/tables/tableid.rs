use strum::{EnumCount, EnumIter};

/// Identifiers of every metadata table defined by ECMA-335 II.22, including the pointer and
/// edit-and-continue tables that only appear in uncompressed (`#-`) table streams.
///
/// The discriminant is the table number used in tokens and in the `valid`/`sorted` bit vectors
/// of the table stream header. The values are contiguous, so `table as usize` doubles as an
/// index into per-table arrays of length [`TableId::COUNT`].
#[derive(Clone, Copy, PartialEq, Debug, EnumIter, EnumCount, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TableId {
    /// `Module`, the current module
    Module = 0x00,
    /// `TypeRef`, references to types defined elsewhere
    TypeRef = 0x01,
    /// `TypeDef`, types defined in this module
    TypeDef = 0x02,
    /// `FieldPtr`, logical to physical `Field` mapping
    FieldPtr = 0x03,
    /// `Field`
    Field = 0x04,
    /// `MethodPtr`, logical to physical `MethodDef` mapping
    MethodPtr = 0x05,
    /// `MethodDef`
    MethodDef = 0x06,
    /// `ParamPtr`, logical to physical `Param` mapping
    ParamPtr = 0x07,
    /// `Param`
    Param = 0x08,
    /// `InterfaceImpl`
    InterfaceImpl = 0x09,
    /// `MemberRef`
    MemberRef = 0x0A,
    /// `Constant`
    Constant = 0x0B,
    /// `CustomAttribute`
    CustomAttribute = 0x0C,
    /// `FieldMarshal`
    FieldMarshal = 0x0D,
    /// `DeclSecurity`
    DeclSecurity = 0x0E,
    /// `ClassLayout`
    ClassLayout = 0x0F,
    /// `FieldLayout`
    FieldLayout = 0x10,
    /// `StandAloneSig`
    StandAloneSig = 0x11,
    /// `EventMap`
    EventMap = 0x12,
    /// `EventPtr`, logical to physical `Event` mapping
    EventPtr = 0x13,
    /// `Event`
    Event = 0x14,
    /// `PropertyMap`
    PropertyMap = 0x15,
    /// `PropertyPtr`, logical to physical `Property` mapping
    PropertyPtr = 0x16,
    /// `Property`
    Property = 0x17,
    /// `MethodSemantics`
    MethodSemantics = 0x18,
    /// `MethodImpl`
    MethodImpl = 0x19,
    /// `ModuleRef`
    ModuleRef = 0x1A,
    /// `TypeSpec`
    TypeSpec = 0x1B,
    /// `ImplMap`
    ImplMap = 0x1C,
    /// `FieldRVA`
    FieldRVA = 0x1D,
    /// `ENCLog`, edit-and-continue log
    EncLog = 0x1E,
    /// `ENCMap`, edit-and-continue token map
    EncMap = 0x1F,
    /// `Assembly`
    Assembly = 0x20,
    /// `AssemblyProcessor`
    AssemblyProcessor = 0x21,
    /// `AssemblyOS`
    AssemblyOS = 0x22,
    /// `AssemblyRef`
    AssemblyRef = 0x23,
    /// `AssemblyRefProcessor`
    AssemblyRefProcessor = 0x24,
    /// `AssemblyRefOS`
    AssemblyRefOS = 0x25,
    /// `File`
    File = 0x26,
    /// `ExportedType`
    ExportedType = 0x27,
    /// `ManifestResource`
    ManifestResource = 0x28,
    /// `NestedClass`
    NestedClass = 0x29,
    /// `GenericParam`
    GenericParam = 0x2A,
    /// `MethodSpec`
    MethodSpec = 0x2B,
    /// `GenericParamConstraint`
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// Returns the table for a table number, if it is one this crate knows the layout of.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<TableId> {
        use strum::IntoEnumIterator;
        TableId::iter().find(|table| *table as u8 == value)
    }

    /// The pointer table that indirects this table, if the format defines one.
    #[must_use]
    pub fn pointer_table(self) -> Option<TableId> {
        match self {
            TableId::Field => Some(TableId::FieldPtr),
            TableId::MethodDef => Some(TableId::MethodPtr),
            TableId::Param => Some(TableId::ParamPtr),
            TableId::Event => Some(TableId::EventPtr),
            TableId::Property => Some(TableId::PropertyPtr),
            _ => None,
        }
    }
}
