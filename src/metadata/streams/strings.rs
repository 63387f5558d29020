//! String Heap (`#Strings`) for .NET Metadata
//!
//! Provides access to the ECMA-335 `#Strings` heap, which stores identifier strings in UTF-8
//! encoding. Entries are addressed by byte offset and terminated by a NUL byte; offset 0 is the
//! empty string.
//!
//! # Reference
//! - [ECMA-335 II.24.2.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::{ffi::CStr, sync::Arc};

use crate::{metadata::streams::HeapStream, Error::OutOfBounds, Result};

/// View over the `#Strings` heap.
///
/// The view reads through the heap's current reader on every call, so it follows
/// [`crate::metadata::streams::StreamManager::invalidate`].
#[derive(Clone, Debug)]
pub struct Strings {
    stream: Arc<HeapStream>,
}

impl Strings {
    /// Create a view over a `#Strings` stream
    ///
    /// # Arguments
    /// * 'stream' - The heap stream to read from
    #[must_use]
    pub fn new(stream: Arc<HeapStream>) -> Strings {
        Strings { stream }
    }

    /// The underlying stream
    #[must_use]
    pub fn stream(&self) -> &Arc<HeapStream> {
        &self.stream
    }

    /// Get the string at `offset`.
    ///
    /// # Arguments
    /// * 'offset' - Byte offset into the heap
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an offset outside the heap, or a
    /// [`crate::Error::Malformed`] if the entry is unterminated or not valid UTF-8
    pub fn get(&self, offset: u32) -> Result<String> {
        if !self.stream.is_valid_offset(offset) {
            return Err(OutOfBounds);
        }

        self.stream.with_reader(|reader| {
            let tail = reader.data().get(offset as usize..).unwrap_or_default();
            if tail.is_empty() {
                // offset 0 of an empty heap
                return Ok(String::new());
            }

            match CStr::from_bytes_until_nul(tail) {
                Ok(result) => match result.to_str() {
                    Ok(result) => Ok(result.to_string()),
                    Err(_) => Err(malformed_error!("Invalid string at index - {}", offset)),
                },
                Err(_) => Err(malformed_error!("Invalid string at index - {}", offset)),
            }
        })
    }

    /// Compare the entry at `offset` against `expected` without decoding it.
    ///
    /// Returns `false` for invalid offsets and unterminated entries.
    #[must_use]
    pub fn equals(&self, offset: u32, expected: &[u8]) -> bool {
        if !self.stream.is_valid_offset(offset) {
            return false;
        }

        self.stream.with_reader(|reader| match reader.read_cstr_at(offset as usize) {
            Ok(entry) => entry == expected,
            Err(_) => offset == 0 && expected.is_empty(),
        })
    }
}
