use crate::metadata::{
    config::ResolverConfig,
    resolver::{IndirectionFlags, MemberRelation, RidList, TableSearchEngine},
    streams::Strings,
    tables::{has_rtspecial_name, ColumnReader},
};

/// Resolves owner-to-member relations into rid lists.
///
/// Owner tables such as `TypeDef` name only the first member they own; the list ends where the
/// next owner's list starts, or at the end of the member table for the last owner. On top of
/// that range the resolver applies pointer-table indirection (`FieldPtr`, `MethodPtr`, ...)
/// and hides rows that edit-and-continue marked deleted.
///
/// Nothing in here fails: malformed ranges are clamped, rids outside their table are dropped,
/// and unreadable rows end up as empty results. Owner-keyed lookups through the search engine
/// live alongside (`interface_impl_rid_list`, `custom_attribute_rid_list`, ...).
///
/// # Examples
///
/// ```rust,no_run
/// use mdscope::metadata::view::MetadataView;
///
/// let view = MetadataView::from_bytes(std::fs::read("metadata.bin")?)?;
/// let resolver = view.resolver();
/// for method in resolver.method_rid_list(2) {
///     println!("method {}: {} params", method, resolver.param_rid_list(method).len());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RidListResolver<R> {
    search: TableSearchEngine<R>,
    strings: Option<Strings>,
    indirection: IndirectionFlags,
    deleted_rows: bool,
    config: ResolverConfig,
}

impl<R: ColumnReader> RidListResolver<R> {
    /// Create a resolver with the default configuration
    ///
    /// ## Arguments
    /// * 'reader'  - Column source, usually a [`crate::metadata::streams::TablesStream`]
    /// * 'strings' - The `#Strings` heap, needed to recognize deleted rows
    pub fn new(reader: R, strings: Option<Strings>) -> Self {
        Self::with_config(reader, strings, ResolverConfig::default())
    }

    /// Create a resolver
    ///
    /// ## Arguments
    /// * 'reader'  - Column source, usually a [`crate::metadata::streams::TablesStream`]
    /// * 'strings' - The `#Strings` heap, needed to recognize deleted rows
    /// * 'config'  - Resolver options
    pub fn with_config(reader: R, strings: Option<Strings>, config: ResolverConfig) -> Self {
        let indirection = if config.honor_pointer_tables {
            IndirectionFlags::from_reader(&reader)
        } else {
            IndirectionFlags::default()
        };
        let deleted_rows = reader.has_deleted_rows();

        log::debug!(
            "Resolver ready: indirection {:?}, deletion tracking {}",
            indirection,
            deleted_rows
        );

        RidListResolver {
            search: TableSearchEngine::with_config(reader, &config),
            strings,
            indirection,
            deleted_rows,
            config,
        }
    }

    /// The search engine the owner-keyed lookups run on
    pub fn search(&self) -> &TableSearchEngine<R> {
        &self.search
    }

    /// The column source
    pub fn reader(&self) -> &R {
        self.search.reader()
    }

    /// Which member kinds are read through their pointer table
    pub fn indirection(&self) -> IndirectionFlags {
        self.indirection
    }

    /// `true` if the table stream tracks deleted rows
    pub fn tracks_deleted_rows(&self) -> bool {
        self.deleted_rows
    }

    /// The options this resolver was created with
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The members owned by `owner_rid` under `relation`.
    ///
    /// Returns a contiguous list when no pointer table is involved and no deleted rows have to
    /// be hidden, an explicit list otherwise. Explicit lists keep pointer-table order,
    /// duplicates included.
    ///
    /// ## Arguments
    /// * 'owner_rid' - Row of the owner table
    /// * 'relation'  - The owner-to-member relation to follow
    pub fn resolve_members(&self, owner_rid: u32, relation: &MemberRelation) -> RidList {
        let reader = self.search.reader();
        let Some(start) = reader.read_column(relation.owner, owner_rid, relation.list_column)
        else {
            return RidList::EMPTY;
        };

        let member_rows = reader.row_count(relation.member);
        let sentinel = member_rows.saturating_add(1);
        let mut end = match owner_rid
            .checked_add(1)
            .and_then(|next| reader.read_column(relation.owner, next, relation.list_column))
        {
            Some(0) | None => sentinel,
            Some(next) => next,
        };

        if start == 0 || start >= sentinel {
            return RidList::EMPTY;
        }
        end = end.clamp(start, sentinel);

        let indirect = self.indirection.is_indirect(relation.member);
        let filter = relation.filter_deleted && self.deleted_rows;
        if !indirect && !filter {
            return RidList::range(start, end);
        }

        let rids = (start..end)
            .map(|index| {
                if indirect {
                    reader.read_column(relation.pointer, index, 0).unwrap_or(0)
                } else {
                    index
                }
            })
            .filter(|rid| *rid != 0 && *rid <= member_rows)
            .filter(|rid| !filter || !self.is_deleted(relation, *rid))
            .collect();

        RidList::Explicit(rids)
    }

    /// Fields of a `TypeDef`
    pub fn field_rid_list(&self, type_def_rid: u32) -> RidList {
        self.resolve_members(type_def_rid, &MemberRelation::FIELD)
    }

    /// Methods of a `TypeDef`
    pub fn method_rid_list(&self, type_def_rid: u32) -> RidList {
        self.resolve_members(type_def_rid, &MemberRelation::METHOD)
    }

    /// Parameters of a `MethodDef`. Parameters are never hidden as deleted.
    pub fn param_rid_list(&self, method_rid: u32) -> RidList {
        self.resolve_members(method_rid, &MemberRelation::PARAM)
    }

    /// Events of an `EventMap` row
    pub fn event_rid_list(&self, event_map_rid: u32) -> RidList {
        self.resolve_members(event_map_rid, &MemberRelation::EVENT)
    }

    /// Properties of a `PropertyMap` row
    pub fn property_rid_list(&self, property_map_rid: u32) -> RidList {
        self.resolve_members(property_map_rid, &MemberRelation::PROPERTY)
    }

    /// `RTSpecialName` set and named like the deleted-row marker
    fn is_deleted(&self, relation: &MemberRelation, rid: u32) -> bool {
        let Some(strings) = &self.strings else {
            return false;
        };
        let Some(row) = self.search.reader().read_row(relation.member, rid) else {
            return false;
        };

        match (row.get(relation.flags_column), row.get(relation.name_column)) {
            (Some(flags), Some(name)) => {
                has_rtspecial_name(relation.member, *flags)
                    && strings.equals(*name, self.config.deleted_name.as_bytes())
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        file::{Backend, Memory},
        metadata::{streams::HeapStream, tables::TableId},
        test::MockTables,
    };

    /// `#Strings` with "_Deleted" at 1 and "Keep" at 10
    fn strings() -> Strings {
        let data = b"\0_Deleted\0Keep\0".to_vec();
        let len = data.len();
        let backend: Arc<dyn Backend> = Arc::new(Memory::new(data));
        Strings::new(Arc::new(
            HeapStream::new(backend, "#Strings", 0, len).unwrap(),
        ))
    }

    fn type_defs(field_lists: &[u32]) -> Vec<Vec<u32>> {
        field_lists.iter().map(|list| vec![0, 0, 0, 0, *list, 1]).collect()
    }

    fn with_type_defs(tables: MockTables, field_lists: &[u32]) -> MockTables {
        let rows = type_defs(field_lists);
        let rows: Vec<&[u32]> = rows.iter().map(Vec::as_slice).collect();
        tables.with_rows(TableId::TypeDef, &rows)
    }

    #[test]
    fn contiguous_ranges() {
        let tables = with_type_defs(MockTables::new(), &[1, 3, 3, 6])
            .with_rows(TableId::Field, &[&[0_u32, 10, 0] as &[u32]; 7]);
        let resolver = RidListResolver::new(tables, None);

        assert_eq!(resolver.field_rid_list(1), RidList::range(1, 3));
        assert!(resolver.field_rid_list(2).is_empty());
        assert_eq!(resolver.field_rid_list(3).to_vec(), vec![3, 4, 5]);
        // last owner runs to the end of the member table
        assert_eq!(resolver.field_rid_list(4).to_vec(), vec![6, 7]);
        assert!(matches!(
            resolver.field_rid_list(1),
            RidList::Contiguous { .. }
        ));
    }

    #[test]
    fn invalid_ranges_are_clamped() {
        // starts past the end, descending, and beyond the member table
        let tables = with_type_defs(MockTables::new(), &[4, 2, 0, 3, 99])
            .with_rows(TableId::Field, &[&[0_u32, 10, 0] as &[u32]; 5]);
        let resolver = RidListResolver::new(tables, None);

        assert!(resolver.field_rid_list(1).is_empty());
        assert_eq!(resolver.field_rid_list(2).to_vec(), vec![2, 3, 4, 5]);
        assert!(resolver.field_rid_list(3).is_empty());
        assert_eq!(resolver.field_rid_list(4).to_vec(), vec![3, 4, 5]);
        assert!(resolver.field_rid_list(5).is_empty());
    }

    #[test]
    fn garbage_owner_rids() {
        let tables = with_type_defs(MockTables::new(), &[1, 2])
            .with_rows(TableId::Field, &[&[0_u32, 10, 0] as &[u32]; 2])
            .with_column(TableId::FieldPtr, &[2, 1]);
        let resolver = RidListResolver::new(tables, None);

        for owner in [0, 3, 1000, u32::MAX - 1, u32::MAX] {
            assert!(resolver.field_rid_list(owner).is_empty());
            assert!(resolver.method_rid_list(owner).is_empty());
            assert!(resolver.param_rid_list(owner).is_empty());
            assert!(resolver.event_rid_list(owner).is_empty());
            assert!(resolver.property_rid_list(owner).is_empty());
        }
    }

    #[test]
    fn pointer_table_order_and_duplicates() {
        let tables = with_type_defs(MockTables::new(), &[1, 4])
            .with_rows(TableId::Field, &[&[0_u32, 10, 0] as &[u32]; 5])
            .with_column(TableId::FieldPtr, &[3, 1, 3, 4, 0]);
        let resolver = RidListResolver::new(tables, None);

        assert!(resolver.indirection().field);
        assert_eq!(resolver.field_rid_list(1).to_vec(), vec![3, 1, 3]);
        // rid 0 from the pointer table is dropped
        assert_eq!(resolver.field_rid_list(2).to_vec(), vec![4]);
    }

    #[test]
    fn pointer_rids_outside_member_table() {
        let tables = MockTables::new()
            .with_rows(TableId::EventMap, &[&[1, 1]])
            .with_rows(TableId::Event, &[&[0_u32, 10, 0] as &[u32]; 3])
            .with_column(TableId::EventPtr, &[2, 9, 1]);
        let resolver = RidListResolver::new(tables, None);

        assert_eq!(resolver.event_rid_list(1).to_vec(), vec![2, 1]);
    }

    #[test]
    fn raw_physical_ignores_pointer_tables() {
        let tables = with_type_defs(MockTables::new(), &[1, 3])
            .with_rows(TableId::Field, &[&[0_u32, 10, 0] as &[u32]; 3])
            .with_column(TableId::FieldPtr, &[3, 2, 1]);
        let resolver = RidListResolver::with_config(tables, None, ResolverConfig::raw_physical());

        assert!(!resolver.indirection().any());
        assert_eq!(resolver.field_rid_list(1), RidList::range(1, 3));
    }

    #[test]
    fn deleted_rows_need_tracking() {
        // Field 2 is RTSpecialName + "_Deleted", field 3 only has the name
        let fields: &[&[u32]] = &[&[0x0006, 10, 0], &[0x0400, 1, 0], &[0x0000, 1, 0]];

        let tables = with_type_defs(MockTables::new(), &[1]).with_rows(TableId::Field, fields);
        let resolver = RidListResolver::new(tables, Some(strings()));
        assert_eq!(resolver.field_rid_list(1).to_vec(), vec![1, 2, 3]);

        let tables = with_type_defs(MockTables::new(), &[1])
            .with_rows(TableId::Field, fields)
            .with_deleted_rows();
        let resolver = RidListResolver::new(tables, Some(strings()));
        assert!(resolver.tracks_deleted_rows());
        assert_eq!(resolver.field_rid_list(1).to_vec(), vec![1, 3]);
        assert!(matches!(
            resolver.field_rid_list(1),
            RidList::Explicit(_)
        ));

        // without a string heap nothing is recognized as deleted
        let tables = with_type_defs(MockTables::new(), &[1])
            .with_rows(TableId::Field, fields)
            .with_deleted_rows();
        let resolver = RidListResolver::new(tables, None);
        assert_eq!(resolver.field_rid_list(1).to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn deleted_name_is_configurable() {
        let tables = with_type_defs(MockTables::new(), &[1])
            .with_rows(TableId::Field, &[&[0x0400, 1, 0], &[0x0400, 10, 0]])
            .with_deleted_rows();
        let config = ResolverConfig {
            deleted_name: "Keep".to_string(),
            ..ResolverConfig::default()
        };
        let resolver = RidListResolver::with_config(tables, Some(strings()), config);

        assert_eq!(resolver.field_rid_list(1).to_vec(), vec![1]);
    }

    #[test]
    fn params_are_never_filtered() {
        // MethodDef: RVA, ImplFlags, Flags, Name, Signature, ParamList
        let tables = MockTables::new()
            .with_rows(TableId::MethodDef, &[&[0, 0, 0x1000, 1, 0, 1]])
            .with_rows(TableId::Param, &[&[0x0400, 1, 1], &[0x1000, 2, 1]])
            .with_deleted_rows();
        let resolver = RidListResolver::new(tables, Some(strings()));

        assert_eq!(resolver.param_rid_list(1), RidList::range(1, 3));
    }

    #[test]
    fn deleted_methods_events_and_properties() {
        let tables = MockTables::new()
            .with_rows(TableId::TypeDef, &[&[0, 0, 0, 0, 1, 1]])
            .with_rows(
                TableId::MethodDef,
                &[&[0, 0, 0x1000, 1, 0, 1], &[0, 0, 0x0400, 1, 0, 1]],
            )
            .with_rows(TableId::EventMap, &[&[1, 1]])
            .with_rows(TableId::Event, &[&[0x0400, 1, 0], &[0x0200, 1, 0]])
            .with_rows(TableId::PropertyMap, &[&[1, 1]])
            .with_rows(TableId::Property, &[&[0x0400, 10, 0], &[0x0400, 1, 0]])
            .with_deleted_rows();
        let resolver = RidListResolver::new(tables, Some(strings()));

        assert_eq!(resolver.method_rid_list(1).to_vec(), vec![2]);
        assert_eq!(resolver.event_rid_list(1).to_vec(), vec![2]);
        assert_eq!(resolver.property_rid_list(1).to_vec(), vec![1]);
    }
}
