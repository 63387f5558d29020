#![no_main]

use libfuzzer_sys::fuzz_target;
use mdscope::metadata::{
    resolver::MemberRelation,
    tables::{ColumnReader, TableId},
    view::MetadataView,
};

fuzz_target!(|data: &[u8]| {
    let Ok(view) = MetadataView::from_bytes(data.to_vec()) else {
        return;
    };
    let resolver = view.resolver();
    let tables = view.tables();

    // every owner plus one past the end, and a few garbage rids
    let owners = |table: TableId| {
        (0..=tables.row_count(table).min(512).saturating_add(1))
            .chain([u32::MAX - 1, u32::MAX])
    };

    for relation in [
        MemberRelation::FIELD,
        MemberRelation::METHOD,
        MemberRelation::PARAM,
        MemberRelation::EVENT,
        MemberRelation::PROPERTY,
    ] {
        for owner in owners(relation.owner) {
            let members = resolver.resolve_members(owner, &relation);
            for rid in &members {
                assert!(rid >= 1 && rid <= tables.row_count(relation.member));
            }
        }
    }

    for type_def in owners(TableId::TypeDef) {
        let _ = resolver.interface_impl_rid_list(type_def);
        let _ = resolver.method_impl_rid_list(type_def);
        let _ = resolver.nested_class_rid_list(type_def);
        let _ = resolver.nested_class_rid(type_def);
        let _ = resolver.class_layout_rid(type_def);
        let _ = resolver.event_map_rid(type_def);
        let _ = resolver.property_map_rid(type_def);
        let _ = resolver.generic_param_rid_list(TableId::TypeDef, type_def);
        let _ = resolver.custom_attribute_rid_list(TableId::TypeDef, type_def);
        let _ = resolver.decl_security_rid_list(TableId::TypeDef, type_def);
    }
    for field in owners(TableId::Field) {
        let _ = resolver.field_layout_rid(field);
        let _ = resolver.field_rva_rid(field);
        let _ = resolver.field_marshal_rid(TableId::Field, field);
        let _ = resolver.impl_map_rid(TableId::Field, field);
        let _ = resolver.constant_rid(TableId::Field, field);
    }
    for generic_param in owners(TableId::GenericParam) {
        let _ = resolver.generic_param_constraint_rid_list(generic_param);
    }
    for property in owners(TableId::Property) {
        let _ = resolver.method_semantics_rid_list(TableId::Property, property);
    }

    if let Some(strings) = view.strings() {
        let _ = strings.get(1);
    }
});
