use bitflags::bitflags;

use crate::metadata::tables::TableId;

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    /// The naming related flags of `FieldAttributes`
    pub struct FieldAttributes : u32 {
        /// Field is special
        const SPECIAL_NAME = 0x0200;
        /// CLI provides 'special' behavior, depending upon the name of the field
        const RTSPECIAL_NAME = 0x0400;
    }
}

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    /// The naming related flags of `MethodAttributes`
    pub struct MethodAttributes : u32 {
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// CLI provides 'special' behavior, depending upon the name of the method
        const RTSPECIAL_NAME = 0x1000;
    }
}

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    /// The naming related flags of `EventAttributes`
    pub struct EventAttributes : u32 {
        /// Event is special
        const SPECIAL_NAME = 0x0200;
        /// CLI provides 'special' behavior, depending upon the name of the event
        const RTSPECIAL_NAME = 0x0400;
    }
}

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    /// The naming related flags of `PropertyAttributes`
    pub struct PropertyAttributes : u32 {
        /// Property is special
        const SPECIAL_NAME = 0x0200;
        /// Runtime (metadata internal APIs) should check name encoding
        const RTSPECIAL_NAME = 0x0400;
    }
}

/// Returns `true` if the raw flags column of a row in `table` carries the table's
/// `RTSpecialName` bit. Tables without such a bit never match.
#[must_use]
pub fn has_rtspecial_name(table: TableId, flags: u32) -> bool {
    match table {
        TableId::Field => FieldAttributes::from_bits_retain(flags)
            .contains(FieldAttributes::RTSPECIAL_NAME),
        TableId::MethodDef => MethodAttributes::from_bits_retain(flags)
            .contains(MethodAttributes::RTSPECIAL_NAME),
        TableId::Event => EventAttributes::from_bits_retain(flags)
            .contains(EventAttributes::RTSPECIAL_NAME),
        TableId::Property => PropertyAttributes::from_bits_retain(flags)
            .contains(PropertyAttributes::RTSPECIAL_NAME),
        _ => false,
    }
}
