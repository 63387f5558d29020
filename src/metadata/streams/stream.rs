use std::{
    fmt,
    sync::{Arc, RwLock},
};

use crate::{
    file::Backend,
    metadata::streams::{DataReader, StreamHeader},
    Result,
};

/// What a stream is used for, derived from its name
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// `#~`, the compressed table stream
    Tables,
    /// `#-`, the uncompressed (edit-and-continue) table stream
    UncompressedTables,
    /// `#Strings`
    Strings,
    /// `#US`
    UserStrings,
    /// `#Blob`
    Blob,
    /// `#GUID`
    Guid,
    /// Any other name, kept as an opaque byte range
    Other,
}

impl StreamKind {
    /// Classify a stream by its name. Names are case sensitive.
    #[must_use]
    pub fn from_name(name: &str) -> StreamKind {
        match name {
            "#~" => StreamKind::Tables,
            "#-" => StreamKind::UncompressedTables,
            "#Strings" => StreamKind::Strings,
            "#US" => StreamKind::UserStrings,
            "#Blob" => StreamKind::Blob,
            "#GUID" => StreamKind::Guid,
            _ => StreamKind::Other,
        }
    }

    /// `true` for `#~` and `#-`
    #[must_use]
    pub fn is_tables(self) -> bool {
        matches!(self, StreamKind::Tables | StreamKind::UncompressedTables)
    }
}

/// One metadata stream: a named byte window inside the byte source.
///
/// The window (`start_offset`, `len`) is fixed when the stream directory is read. The reader
/// over that window is replaced by [`HeapStream::recreate_reader`] when the byte source
/// changes; readers handed out earlier keep pointing at the old bytes.
pub struct HeapStream {
    name: String,
    kind: StreamKind,
    start: usize,
    len: usize,
    reader: RwLock<DataReader>,
}

impl fmt::Debug for HeapStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapStream")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("start", &self.start)
            .field("len", &self.len)
            .finish()
    }
}

impl HeapStream {
    /// Create a stream over `[start, start + len)` of `backend`
    ///
    /// ## Arguments
    /// * 'backend' - The byte source
    /// * 'name'    - Stream name as found in the stream directory
    /// * 'start'   - Absolute offset of the stream
    /// * 'len'     - Stream length
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the window does not lie inside the backend
    pub fn new(backend: Arc<dyn Backend>, name: &str, start: usize, len: usize) -> Result<Self> {
        Ok(HeapStream {
            name: name.to_string(),
            kind: StreamKind::from_name(name),
            start,
            len,
            reader: RwLock::new(DataReader::new(backend, start, len)?),
        })
    }

    /// Create a stream from its header, relative to the metadata root at `root_offset`
    ///
    /// # Errors
    /// Returns an error if the window overflows or does not lie inside the backend
    pub fn from_header(
        backend: Arc<dyn Backend>,
        root_offset: usize,
        header: &StreamHeader,
    ) -> Result<Self> {
        let Some(start) = root_offset.checked_add(header.offset as usize) else {
            return Err(malformed_error!(
                "Stream '{}' offset overflows - {} + {}",
                header.name,
                root_offset,
                header.offset
            ));
        };

        HeapStream::new(backend, &header.name, start, header.size as usize)
            .map_err(|_| malformed_error!("Stream '{}' lies outside the image", header.name))
    }

    /// Stream name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stream kind
    #[must_use]
    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Absolute offset of the stream
    #[must_use]
    pub fn start_offset(&self) -> usize {
        self.start
    }

    /// Absolute offset one past the end of the stream
    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.start + self.len
    }

    /// Stream length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if the stream holds no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` if `offset` points into the stream. Offset 0 is always valid: it is the
    /// conventional "no entry" offset of every heap.
    #[must_use]
    pub fn is_valid_offset(&self, offset: u32) -> bool {
        offset == 0 || (offset as usize) < self.len
    }

    /// `true` if `size` bytes at `offset` lie inside the stream. A size of 0 checks the offset
    /// alone.
    #[must_use]
    pub fn is_valid_offset_size(&self, offset: u32, size: u32) -> bool {
        if size == 0 {
            return self.is_valid_offset(offset);
        }

        (offset as usize)
            .checked_add(size as usize)
            .is_some_and(|end| end <= self.len)
    }

    /// `true` if `index` is a valid heap index. For byte-addressed heaps this is
    /// [`HeapStream::is_valid_offset`].
    #[must_use]
    pub fn is_valid_index(&self, index: u32) -> bool {
        self.is_valid_offset(index)
    }

    /// A new reader positioned at the start of the stream
    #[must_use]
    pub fn create_reader(&self) -> DataReader {
        read_lock!(self.reader).clone()
    }

    /// Run `f` against the current reader without cloning it
    pub fn with_reader<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&DataReader) -> R,
    {
        f(&read_lock!(self.reader))
    }

    /// Replace the reader with one over the same window of `backend`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the window does not lie inside `backend`; the
    /// current reader is kept in that case
    pub fn recreate_reader(&self, backend: &Arc<dyn Backend>) -> Result<()> {
        let reader = DataReader::new(backend.clone(), self.start, self.len)?;
        *write_lock!(self.reader) = reader;

        Ok(())
    }
}
