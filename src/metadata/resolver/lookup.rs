//! Owner-keyed lookups.
//!
//! Tables like `CustomAttribute` or `InterfaceImpl` point back at their owner instead of being
//! owned through a range column. Finding the rows of one owner is a key search over that back
//! reference; coded owners are encoded once and searched as raw column values.

use crate::metadata::{
    resolver::{RidList, RidListResolver},
    tables::{CodedIndexType, ColumnReader, TableId},
};

impl<R: ColumnReader> RidListResolver<R> {
    fn rows_of(&self, table: TableId, key_column: usize, owner_rid: u32) -> RidList {
        if owner_rid == 0 {
            return RidList::EMPTY;
        }

        self.search()
            .find_all_rows_unsorted(table, key_column, owner_rid)
    }

    fn rows_of_coded(
        &self,
        table: TableId,
        key_column: usize,
        coded: CodedIndexType,
        owner_table: TableId,
        owner_rid: u32,
    ) -> RidList {
        if owner_rid == 0 {
            return RidList::EMPTY;
        }

        match coded.encode(owner_table, owner_rid) {
            Some(key) => self.search().find_all_rows_unsorted(table, key_column, key),
            None => RidList::EMPTY,
        }
    }

    /// `InterfaceImpl` rows of a `TypeDef`
    pub fn interface_impl_rid_list(&self, type_def_rid: u32) -> RidList {
        self.rows_of(TableId::InterfaceImpl, 0, type_def_rid)
    }

    /// `MethodImpl` rows of a `TypeDef`
    pub fn method_impl_rid_list(&self, type_def_rid: u32) -> RidList {
        self.rows_of(TableId::MethodImpl, 0, type_def_rid)
    }

    /// `GenericParam` rows of a `TypeDef` or `MethodDef`
    pub fn generic_param_rid_list(&self, owner_table: TableId, owner_rid: u32) -> RidList {
        self.rows_of_coded(
            TableId::GenericParam,
            2,
            CodedIndexType::TypeOrMethodDef,
            owner_table,
            owner_rid,
        )
    }

    /// `GenericParamConstraint` rows of a `GenericParam`
    pub fn generic_param_constraint_rid_list(&self, generic_param_rid: u32) -> RidList {
        self.rows_of(TableId::GenericParamConstraint, 0, generic_param_rid)
    }

    /// `CustomAttribute` rows attached to any row that can carry custom attributes
    pub fn custom_attribute_rid_list(&self, owner_table: TableId, owner_rid: u32) -> RidList {
        self.rows_of_coded(
            TableId::CustomAttribute,
            0,
            CodedIndexType::HasCustomAttribute,
            owner_table,
            owner_rid,
        )
    }

    /// `DeclSecurity` rows of a `TypeDef`, `MethodDef` or `Assembly`
    pub fn decl_security_rid_list(&self, owner_table: TableId, owner_rid: u32) -> RidList {
        self.rows_of_coded(
            TableId::DeclSecurity,
            1,
            CodedIndexType::HasDeclSecurity,
            owner_table,
            owner_rid,
        )
    }

    /// `MethodSemantics` rows of an `Event` or `Property`
    pub fn method_semantics_rid_list(&self, owner_table: TableId, owner_rid: u32) -> RidList {
        self.rows_of_coded(
            TableId::MethodSemantics,
            2,
            CodedIndexType::HasSemantics,
            owner_table,
            owner_rid,
        )
    }

    /// `TypeDef` rids of the types nested directly inside `enclosing_type_def_rid`.
    ///
    /// Nested types whose `NestedClass` column is not a valid `TypeDef` rid are left out.
    pub fn nested_class_rid_list(&self, enclosing_type_def_rid: u32) -> RidList {
        let rows = self.rows_of(TableId::NestedClass, 1, enclosing_type_def_rid);
        if rows.is_empty() {
            return rows;
        }

        let reader = self.reader();
        let type_defs = reader.row_count(TableId::TypeDef);
        RidList::Explicit(
            rows.iter()
                .filter_map(|row| reader.read_column(TableId::NestedClass, row, 0))
                .filter(|rid| *rid != 0 && *rid <= type_defs)
                .collect(),
        )
    }

    /// `NestedClass` row of a nested `TypeDef`, or 0
    pub fn nested_class_rid(&self, type_def_rid: u32) -> u32 {
        self.rows_of(TableId::NestedClass, 0, type_def_rid)
            .first()
            .unwrap_or(0)
    }

    /// `ClassLayout` row of a `TypeDef`, or 0
    pub fn class_layout_rid(&self, type_def_rid: u32) -> u32 {
        self.rows_of(TableId::ClassLayout, 2, type_def_rid)
            .first()
            .unwrap_or(0)
    }

    /// `FieldLayout` row of a `Field`, or 0
    pub fn field_layout_rid(&self, field_rid: u32) -> u32 {
        self.rows_of(TableId::FieldLayout, 1, field_rid)
            .first()
            .unwrap_or(0)
    }

    /// `FieldRVA` row of a `Field`, or 0
    pub fn field_rva_rid(&self, field_rid: u32) -> u32 {
        self.rows_of(TableId::FieldRVA, 1, field_rid)
            .first()
            .unwrap_or(0)
    }

    /// `FieldMarshal` row of a `Field` or `Param`, or 0
    pub fn field_marshal_rid(&self, owner_table: TableId, owner_rid: u32) -> u32 {
        self.rows_of_coded(
            TableId::FieldMarshal,
            0,
            CodedIndexType::HasFieldMarshal,
            owner_table,
            owner_rid,
        )
        .first()
        .unwrap_or(0)
    }

    /// `ImplMap` row of a `Field` or `MethodDef`, or 0
    pub fn impl_map_rid(&self, owner_table: TableId, owner_rid: u32) -> u32 {
        self.rows_of_coded(
            TableId::ImplMap,
            1,
            CodedIndexType::MemberForwarded,
            owner_table,
            owner_rid,
        )
        .first()
        .unwrap_or(0)
    }

    /// `Constant` row of a `Field`, `Param` or `Property`, or 0
    pub fn constant_rid(&self, owner_table: TableId, owner_rid: u32) -> u32 {
        self.rows_of_coded(
            TableId::Constant,
            2,
            CodedIndexType::HasConstant,
            owner_table,
            owner_rid,
        )
        .first()
        .unwrap_or(0)
    }

    /// `EventMap` row of a `TypeDef`, or 0.
    ///
    /// Always answered through the auxiliary index: the sortedness bit of `EventMap` is not
    /// reliable.
    pub fn event_map_rid(&self, type_def_rid: u32) -> u32 {
        if type_def_rid == 0 {
            return 0;
        }

        self.search()
            .find_all_rows_indexed(TableId::EventMap, 0, type_def_rid)
            .first()
            .unwrap_or(0)
    }

    /// `PropertyMap` row of a `TypeDef`, or 0.
    ///
    /// Always answered through the auxiliary index: the sortedness bit of `PropertyMap` is not
    /// reliable.
    pub fn property_map_rid(&self, type_def_rid: u32) -> u32 {
        if type_def_rid == 0 {
            return 0;
        }

        self.search()
            .find_all_rows_indexed(TableId::PropertyMap, 0, type_def_rid)
            .first()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::MockTables;

    fn encode(coded: CodedIndexType, table: TableId, rid: u32) -> u32 {
        coded.encode(table, rid).unwrap()
    }

    #[test]
    fn plain_owner_columns() {
        let tables = MockTables::new()
            .with_rows(TableId::InterfaceImpl, &[&[2, 5], &[1, 6], &[2, 7]])
            .with_rows(TableId::MethodImpl, &[&[3, 0, 0]])
            .with_rows(TableId::GenericParamConstraint, &[&[1, 0], &[1, 0]])
            .with_sorted(TableId::GenericParamConstraint);
        let resolver = RidListResolver::new(tables, None);

        assert_eq!(resolver.interface_impl_rid_list(2).to_vec(), vec![1, 3]);
        assert_eq!(resolver.interface_impl_rid_list(1).to_vec(), vec![2]);
        assert!(resolver.interface_impl_rid_list(0).is_empty());
        assert_eq!(resolver.method_impl_rid_list(3).to_vec(), vec![1]);
        assert_eq!(
            resolver.generic_param_constraint_rid_list(1),
            RidList::range(1, 3)
        );
    }

    #[test]
    fn coded_owner_columns() {
        let ca = CodedIndexType::HasCustomAttribute;
        let tables = MockTables::new()
            .with_column(
                TableId::CustomAttribute,
                &[
                    encode(ca, TableId::TypeDef, 1),
                    encode(ca, TableId::MethodDef, 1),
                    encode(ca, TableId::TypeDef, 1),
                ],
            )
            .with_rows(
                TableId::GenericParam,
                &[
                    &[0, 0, encode(CodedIndexType::TypeOrMethodDef, TableId::MethodDef, 2)],
                    &[1, 0, encode(CodedIndexType::TypeOrMethodDef, TableId::MethodDef, 2)],
                ],
            )
            .with_rows(
                TableId::MethodSemantics,
                &[&[1, 4, encode(CodedIndexType::HasSemantics, TableId::Property, 1)]],
            )
            .with_rows(
                TableId::DeclSecurity,
                &[&[0, encode(CodedIndexType::HasDeclSecurity, TableId::Assembly, 1)]],
            );
        let resolver = RidListResolver::new(tables, None);

        assert_eq!(
            resolver
                .custom_attribute_rid_list(TableId::TypeDef, 1)
                .to_vec(),
            vec![1, 3]
        );
        assert_eq!(
            resolver
                .custom_attribute_rid_list(TableId::MethodDef, 1)
                .to_vec(),
            vec![2]
        );
        assert_eq!(
            resolver
                .generic_param_rid_list(TableId::MethodDef, 2)
                .to_vec(),
            vec![1, 2]
        );
        assert!(resolver
            .generic_param_rid_list(TableId::TypeDef, 2)
            .is_empty());
        assert_eq!(
            resolver
                .method_semantics_rid_list(TableId::Property, 1)
                .to_vec(),
            vec![1]
        );
        assert_eq!(
            resolver
                .decl_security_rid_list(TableId::Assembly, 1)
                .to_vec(),
            vec![1]
        );
    }

    #[test]
    fn owner_outside_coded_index() {
        let tables = MockTables::new().with_column(TableId::CustomAttribute, &[0]);
        let resolver = RidListResolver::new(tables, None);

        assert!(resolver
            .custom_attribute_rid_list(TableId::EncLog, 1)
            .is_empty());
        assert!(resolver
            .method_semantics_rid_list(TableId::Field, 1)
            .is_empty());
        assert_eq!(resolver.constant_rid(TableId::TypeDef, 1), 0);
        // rid too large for the tag bits
        assert!(resolver
            .custom_attribute_rid_list(TableId::TypeDef, u32::MAX)
            .is_empty());
    }

    #[test]
    fn single_row_lookups() {
        let tables = MockTables::new()
            .with_rows(TableId::ClassLayout, &[&[8, 16, 3], &[4, 0, 5]])
            .with_sorted(TableId::ClassLayout)
            .with_rows(TableId::FieldLayout, &[&[0, 2]])
            .with_rows(TableId::FieldRVA, &[&[0x2050, 7]])
            .with_column(
                TableId::FieldMarshal,
                &[encode(CodedIndexType::HasFieldMarshal, TableId::Param, 3)],
            )
            .with_rows(
                TableId::ImplMap,
                &[&[0, encode(CodedIndexType::MemberForwarded, TableId::MethodDef, 9), 0, 1]],
            )
            .with_rows(
                TableId::Constant,
                &[&[8, 0, encode(CodedIndexType::HasConstant, TableId::Field, 2), 0]],
            );
        let resolver = RidListResolver::new(tables, None);

        assert_eq!(resolver.class_layout_rid(5), 2);
        assert_eq!(resolver.class_layout_rid(4), 0);
        assert_eq!(resolver.field_layout_rid(2), 1);
        assert_eq!(resolver.field_rva_rid(7), 1);
        assert_eq!(resolver.field_marshal_rid(TableId::Param, 3), 1);
        assert_eq!(resolver.field_marshal_rid(TableId::Field, 3), 0);
        assert_eq!(resolver.impl_map_rid(TableId::MethodDef, 9), 1);
        assert_eq!(resolver.constant_rid(TableId::Field, 2), 1);
        assert_eq!(resolver.constant_rid(TableId::Field, 0), 0);
    }

    #[test]
    fn nested_classes() {
        // NestedClass: (nested, enclosing); type 9 does not exist
        let tables = MockTables::new()
            .with_rows(TableId::TypeDef, &[&[0_u32; 6] as &[u32]; 4])
            .with_rows(
                TableId::NestedClass,
                &[&[3, 1], &[2, 1], &[9, 1], &[4, 3]],
            );
        let resolver = RidListResolver::new(tables, None);

        assert_eq!(resolver.nested_class_rid_list(1).to_vec(), vec![3, 2]);
        assert_eq!(resolver.nested_class_rid_list(3).to_vec(), vec![4]);
        assert!(resolver.nested_class_rid_list(2).is_empty());
        assert_eq!(resolver.nested_class_rid(4), 4);
        assert_eq!(resolver.nested_class_rid(2), 2);
        assert_eq!(resolver.nested_class_rid(1), 0);
    }

    #[test]
    fn event_and_property_maps_ignore_sorted_bit() {
        let tables = MockTables::new()
            .with_rows(TableId::EventMap, &[&[5, 1], &[9, 2], &[2, 3]])
            .with_sorted(TableId::EventMap)
            .with_rows(TableId::PropertyMap, &[&[7, 1], &[3, 1]])
            .with_sorted(TableId::PropertyMap);
        let resolver = RidListResolver::new(tables, None);

        assert_eq!(resolver.event_map_rid(2), 3);
        assert_eq!(resolver.event_map_rid(5), 1);
        assert_eq!(resolver.event_map_rid(0), 0);
        assert_eq!(resolver.property_map_rid(3), 2);
        assert_eq!(resolver.property_map_rid(4), 0);
    }
}
