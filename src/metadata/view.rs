//! Ready-to-query metadata.
//!
//! [`MetadataView`] ties the pieces together: it parses the metadata root, creates every stream,
//! parses the table stream and sets up a [`RidListResolver`] over it. Construction either
//! yields a complete view or an error; there is no partially loaded state.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mdscope::metadata::view::MetadataView;
//!
//! let view = MetadataView::from_bytes(std::fs::read("metadata.bin")?)?;
//! println!("{} streams", view.streams().streams().len());
//! println!("fields of type 2: {:?}", view.field_rid_list(2).to_vec());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::Arc;

use crate::{
    file::{Backend, Memory},
    metadata::{
        config::ResolverConfig,
        resolver::{RidList, RidListResolver},
        root::Root,
        streams::{StreamManager, Strings, TablesStream},
    },
    Result,
};

/// Parsed metadata root, its streams and a resolver over its tables
pub struct MetadataView {
    root: Root,
    streams: StreamManager,
    tables: Arc<TablesStream>,
    resolver: RidListResolver<Arc<TablesStream>>,
}

impl MetadataView {
    /// Load metadata that starts at offset 0 of `data`
    ///
    /// # Errors
    /// Returns an error if the metadata root or the table stream is malformed
    pub fn from_bytes(data: Vec<u8>) -> Result<MetadataView> {
        Self::new(Arc::new(Memory::new(data)), 0)
    }

    /// Load metadata with the default [`ResolverConfig`]
    ///
    /// ## Arguments
    /// * 'backend'     - The byte source
    /// * 'root_offset' - Absolute offset of the metadata root (`BSJB`) inside `backend`
    ///
    /// # Errors
    /// Returns an error if the metadata root or the table stream is malformed
    pub fn new(backend: Arc<dyn Backend>, root_offset: usize) -> Result<MetadataView> {
        Self::with_config(backend, root_offset, ResolverConfig::default())
    }

    /// Load metadata
    ///
    /// ## Arguments
    /// * 'backend'     - The byte source
    /// * 'root_offset' - Absolute offset of the metadata root (`BSJB`) inside `backend`
    /// * 'config'      - Resolver options
    ///
    /// # Errors
    /// Returns an error if the metadata root is malformed, a stream lies outside the byte
    /// source, or the table stream is missing or malformed
    pub fn with_config(
        backend: Arc<dyn Backend>,
        root_offset: usize,
        config: ResolverConfig,
    ) -> Result<MetadataView> {
        let Some(root_len) = backend.len().checked_sub(root_offset) else {
            return Err(malformed_error!(
                "Metadata root offset {} is past the end of the input ({} bytes)",
                root_offset,
                backend.len()
            ));
        };
        let root = Root::read(backend.data_slice(root_offset, root_len)?)?;

        let streams = StreamManager::new(backend, root_offset, &root)?;
        let Some(tables_stream) = streams.tables() else {
            return Err(malformed_error!("No table stream present"));
        };
        let tables = Arc::new(TablesStream::new(tables_stream.clone())?);
        let strings = streams.strings().cloned().map(Strings::new);

        log::debug!(
            "Metadata '{}' loaded: {} streams, {} table stream v{}.{}, {} tables",
            root.version,
            streams.streams().len(),
            tables.stream().name(),
            tables.major_version(),
            tables.minor_version(),
            tables.table_count()
        );

        let resolver = RidListResolver::with_config(tables.clone(), strings, config);

        Ok(MetadataView {
            root,
            streams,
            tables,
            resolver,
        })
    }

    /// The metadata root and its stream directory
    pub fn root(&self) -> &Root {
        &self.root
    }

    /// Every stream of the root
    pub fn streams(&self) -> &StreamManager {
        &self.streams
    }

    /// The parsed table stream
    pub fn tables(&self) -> &Arc<TablesStream> {
        &self.tables
    }

    /// The `#Strings` heap, if present
    pub fn strings(&self) -> Option<Strings> {
        self.streams.strings().cloned().map(Strings::new)
    }

    /// Resolver over the table stream
    pub fn resolver(&self) -> &RidListResolver<Arc<TablesStream>> {
        &self.resolver
    }

    /// Point every stream at a new byte source holding the same layout.
    ///
    /// ## Arguments
    /// * 'backend' - The new byte source; the metadata root must sit at the same offset
    ///
    /// # Errors
    /// Returns an error if a stream window does not fit `backend`; the view is unchanged then
    pub fn invalidate(&self, backend: Arc<dyn Backend>) -> Result<()> {
        self.streams.invalidate(backend)
    }

    /// Fields of a `TypeDef`
    pub fn field_rid_list(&self, type_def_rid: u32) -> RidList {
        self.resolver.field_rid_list(type_def_rid)
    }

    /// Methods of a `TypeDef`
    pub fn method_rid_list(&self, type_def_rid: u32) -> RidList {
        self.resolver.method_rid_list(type_def_rid)
    }

    /// Parameters of a `MethodDef`
    pub fn param_rid_list(&self, method_rid: u32) -> RidList {
        self.resolver.param_rid_list(method_rid)
    }

    /// Events of an `EventMap` row
    pub fn event_rid_list(&self, event_map_rid: u32) -> RidList {
        self.resolver.event_rid_list(event_map_rid)
    }

    /// Properties of a `PropertyMap` row
    pub fn property_rid_list(&self, property_map_rid: u32) -> RidList {
        self.resolver.property_rid_list(property_map_rid)
    }
}
