use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, RwLock,
};

use crate::{
    file::Backend,
    metadata::{
        root::Root,
        streams::{HeapStream, StreamKind},
    },
    Result,
};

/// Owns the byte source and every stream of one metadata root.
///
/// Streams are created once from the stream directory. The first stream carrying a known name
/// is the one used for that role; later duplicates stay in [`StreamManager::streams`] but are
/// never returned by the typed accessors.
///
/// [`StreamManager::invalidate`] swaps the byte source. Every stream then recreates its reader
/// over the same window of the new source; stream headers are not parsed again.
pub struct StreamManager {
    backend: RwLock<Arc<dyn Backend>>,
    root_offset: usize,
    streams: Vec<Arc<HeapStream>>,
    tables: Option<usize>,
    strings: Option<usize>,
    user_strings: Option<usize>,
    blob: Option<usize>,
    guid: Option<usize>,
    generation: AtomicU64,
}

impl StreamManager {
    /// Create every stream named by `root`.
    ///
    /// ## Arguments
    /// * 'backend'     - The byte source
    /// * 'root_offset' - Absolute offset of the metadata root inside `backend`
    /// * 'root'        - The parsed metadata root
    ///
    /// # Errors
    /// Returns an error if a stream window lies outside the byte source, or if there is no
    /// table stream (`#~` or `#-`)
    pub fn new(backend: Arc<dyn Backend>, root_offset: usize, root: &Root) -> Result<Self> {
        let mut manager = StreamManager {
            backend: RwLock::new(backend.clone()),
            root_offset,
            streams: Vec::with_capacity(root.stream_headers.len()),
            tables: None,
            strings: None,
            user_strings: None,
            blob: None,
            guid: None,
            generation: AtomicU64::new(0),
        };

        for header in &root.stream_headers {
            let stream = HeapStream::from_header(backend.clone(), root_offset, header)?;
            let index = manager.streams.len();

            let slot = match stream.kind() {
                StreamKind::Tables | StreamKind::UncompressedTables => &mut manager.tables,
                StreamKind::Strings => &mut manager.strings,
                StreamKind::UserStrings => &mut manager.user_strings,
                StreamKind::Blob => &mut manager.blob,
                StreamKind::Guid => &mut manager.guid,
                StreamKind::Other => {
                    log::warn!(
                        "Unknown metadata stream '{}' kept as an opaque range",
                        stream.name()
                    );
                    manager.streams.push(Arc::new(stream));
                    continue;
                }
            };

            if slot.is_some() {
                log::warn!(
                    "Duplicate metadata stream '{}' at {:#x} ignored",
                    stream.name(),
                    stream.start_offset()
                );
            } else {
                *slot = Some(index);
            }

            manager.streams.push(Arc::new(stream));
        }

        if manager.tables.is_none() {
            return Err(malformed_error!("No table stream ('#~' or '#-') present"));
        }

        log::debug!(
            "Loaded {} metadata streams from root at {:#x}",
            manager.streams.len(),
            root_offset
        );

        Ok(manager)
    }

    fn stream_at(&self, index: Option<usize>) -> Option<&Arc<HeapStream>> {
        index.and_then(|index| self.streams.get(index))
    }

    /// The table stream (`#~` or `#-`)
    #[must_use]
    pub fn tables(&self) -> Option<&Arc<HeapStream>> {
        self.stream_at(self.tables)
    }

    /// The `#Strings` heap
    #[must_use]
    pub fn strings(&self) -> Option<&Arc<HeapStream>> {
        self.stream_at(self.strings)
    }

    /// The `#US` heap
    #[must_use]
    pub fn user_strings(&self) -> Option<&Arc<HeapStream>> {
        self.stream_at(self.user_strings)
    }

    /// The `#Blob` heap
    #[must_use]
    pub fn blob(&self) -> Option<&Arc<HeapStream>> {
        self.stream_at(self.blob)
    }

    /// The `#GUID` heap
    #[must_use]
    pub fn guid(&self) -> Option<&Arc<HeapStream>> {
        self.stream_at(self.guid)
    }

    /// Every stream, in directory order, including duplicates and unknown names
    #[must_use]
    pub fn streams(&self) -> &[Arc<HeapStream>] {
        &self.streams
    }

    /// The first stream called `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<HeapStream>> {
        self.streams.iter().find(|stream| stream.name() == name)
    }

    /// Absolute offset of the metadata root
    #[must_use]
    pub fn root_offset(&self) -> usize {
        self.root_offset
    }

    /// The current byte source
    #[must_use]
    pub fn backend(&self) -> Arc<dyn Backend> {
        read_lock!(self.backend).clone()
    }

    /// Number of completed invalidations
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Replace the byte source and recreate the reader of every stream over its existing
    /// window.
    ///
    /// Must not race with reads that are in progress.
    ///
    /// # Errors
    /// Returns an error if a stream window does not lie inside `backend`. Nothing is changed in
    /// that case.
    pub fn invalidate(&self, backend: Arc<dyn Backend>) -> Result<()> {
        if let Some(stream) = self
            .streams
            .iter()
            .find(|stream| backend.data_slice(stream.start_offset(), stream.len()).is_err())
        {
            return Err(malformed_error!(
                "Stream '{}' does not fit the new byte source",
                stream.name()
            ));
        }

        for stream in &self.streams {
            stream.recreate_reader(&backend)?;
        }
        *write_lock!(self.backend) = backend;

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        log::debug!("Stream readers recreated, generation {}", generation);

        Ok(())
    }
}
