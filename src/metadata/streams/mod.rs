//! Metadata streams.
//!
//! A metadata root names a set of streams, each a byte window of the image. This module owns
//! those windows and their readers:
//!
//! - **`#~` / `#-`** - The table stream, compressed or uncompressed. Parsed by
//!   [`TablesStream`], which is the crate's [`crate::metadata::tables::ColumnReader`].
//! - **`#Strings`** - NUL terminated UTF-8 identifiers, read through [`Strings`].
//! - **`#US`**, **`#Blob`**, **`#GUID`** and any unknown name - kept as plain [`HeapStream`]
//!   byte ranges; their contents are not decoded.
//!
//! [`StreamManager`] creates every stream from the stream directory and can swap the byte
//! source underneath all of them at once.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use mdscope::{
//!     file::{Backend, Memory},
//!     metadata::streams::HeapStream,
//! };
//!
//! let backend: Arc<dyn Backend> = Arc::new(Memory::new(vec![0u8; 32]));
//! let blob = HeapStream::new(backend, "#Blob", 16, 8)?;
//!
//! assert!(blob.is_valid_offset(0));
//! assert!(blob.is_valid_offset_size(4, 4));
//! assert!(!blob.is_valid_offset_size(5, 4));
//! # Ok::<(), mdscope::Error>(())
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 24.2.2 - Stream Headers
//! - ECMA-335 6th Edition, Partition II, Section 24.2.6 - `#~` stream

/// The header of a stream, indicates location + size + name
mod streamheader;
pub use streamheader::{StreamHeader, MAX_STREAM_NAME};

/// Positioned readers over byte windows
mod reader;
pub use reader::DataReader;

/// Named byte windows
mod stream;
pub use stream::{HeapStream, StreamKind};

/// The '#String' heap implementation
mod strings;
pub use strings::Strings;

/// Stream lifecycle and byte source invalidation
mod manager;
pub use manager::StreamManager;

/// The '#~' and '#-' implementation
mod tablesheader;
pub use tablesheader::{HeapSizes, TablesStream};
