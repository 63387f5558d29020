//! Byte sources backing the metadata streams.
//!
//! Locating the metadata root inside a PE image is the job of the image loader; this crate only
//! needs random access to the bytes once the loader has found them. The [`Backend`] trait is
//! that seam. [`Memory`] is the in-memory implementation used by
//! [`crate::metadata::view::MetadataView::from_bytes`]; loaders that keep the image elsewhere
//! (a memory map, a process snapshot) implement [`Backend`] themselves.
//!
//! Backends are shared as `Arc<dyn Backend>`. When the underlying bytes move (for example after
//! an image is re-mapped), hand the new backend to
//! [`crate::metadata::streams::StreamManager::invalidate`] and every stream recreates its reader
//! over the same window.

pub mod io;
mod memory;

pub use memory::Memory;

use crate::Result;

/// Backend trait for byte sources.
///
/// Implementations must be `Send + Sync`; readers created from a backend are handed out to
/// multiple threads.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;

    /// Returns `true` if the backend holds no data.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
