//! Stream headers of the metadata root.
//!
//! Each header names one stream and gives its position and size relative to the start of the
//! metadata root. Names are NUL terminated, at most 32 bytes including the terminator, and
//! padded to the next 4 byte boundary.
//!
//! # Reference
//! - [ECMA-335 II.24.2.2](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{file::io::read_le, Error::OutOfBounds, Result};

/// Maximum length of a stream name, including the NUL terminator
pub const MAX_STREAM_NAME: usize = 32;

/// A stream header provides the names, and the position and length of a particular table or heap. Note that the
/// length of a Stream header structure is not fixed, but depends on the length of its name field (a variable
/// length null-terminated string).
///
/// Any name is accepted here; deciding what a stream is used for is left to
/// [`crate::metadata::streams::StreamKind::from_name`].
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.2
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamHeader {
    /// Memory offset with start of the stream, relative to the metadata root
    pub offset: u32,
    /// Size of this stream in bytes, shall be a multiple of 4
    pub size: u32,
    /// Name of Stream\0 max 32char, one `char` per name byte
    pub name: String,
    /// Length of the name on disk in bytes, without the terminator
    pub name_len: usize,
}

impl StreamHeader {
    /// Create a `StreamHeader` object from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data' - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is too short or the name is not terminated within 32 bytes
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        if data.len() < 9 {
            return Err(OutOfBounds);
        }

        let name_area = &data[8..std::cmp::min(data.len(), 8 + MAX_STREAM_NAME)];
        let Some(name_len) = name_area.iter().position(|byte| *byte == 0) else {
            return Err(malformed_error!("Stream header name is not terminated"));
        };

        let name = name_area[..name_len]
            .iter()
            .map(|byte| char::from(*byte))
            .collect();

        Ok(StreamHeader {
            offset: read_le::<u32>(data)?,
            size: read_le::<u32>(&data[4..])?,
            name,
            name_len,
        })
    }

    /// Size of this header on disk, including the padded name
    #[must_use]
    pub fn header_size(&self) -> usize {
        8 + ((self.name_len + 1 + 3) & !3)
    }
}
