//! Positioned byte-range reader over a window of a [`Backend`].

use std::{fmt, sync::Arc};

use crate::{
    file::{
        io::{read_le_at, read_le_at_dyn, read_le_at_width, CilIO},
        Backend,
    },
    Error::OutOfBounds,
    Result,
};

/// A reader over the byte window `[start, start + len)` of a backend.
///
/// `DataReader` is a value: cloning it copies the window and the cursor, and the clone moves
/// its cursor independently. All `*_at` methods take offsets relative to the window start and
/// leave the cursor untouched.
#[derive(Clone)]
pub struct DataReader {
    backend: Arc<dyn Backend>,
    start: usize,
    len: usize,
    position: usize,
}

impl fmt::Debug for DataReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataReader")
            .field("start", &self.start)
            .field("len", &self.len)
            .field("position", &self.position)
            .finish()
    }
}

impl DataReader {
    /// Create a reader over a window of `backend`.
    ///
    /// ## Arguments
    /// * 'backend' - The byte source
    /// * 'start'   - Absolute offset of the window
    /// * 'len'     - Length of the window
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the window does not lie inside the backend
    pub fn new(backend: Arc<dyn Backend>, start: usize, len: usize) -> Result<Self> {
        backend.data_slice(start, len)?;

        Ok(DataReader {
            backend,
            start,
            len,
            position: 0,
        })
    }

    /// The bytes of the window
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.backend
            .data_slice(self.start, self.len)
            .unwrap_or_default()
    }

    /// Length of the window
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if the window is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Absolute offset of the first byte of the window
    #[must_use]
    pub fn start_offset(&self) -> usize {
        self.start
    }

    /// Absolute offset one past the last byte of the window
    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.start + self.len
    }

    /// Current cursor, relative to the window start
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `position` lies past the end of the window
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        if position > self.len {
            return Err(OutOfBounds);
        }

        self.position = position;
        Ok(())
    }

    /// Bytes left between the cursor and the end of the window
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.len - self.position
    }

    /// Read a value at the cursor and advance it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the read would leave the window
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        let mut position = self.position;
        let value = read_le_at::<T>(self.data(), &mut position)?;
        self.position = position;

        Ok(value)
    }

    /// Read a value at `offset` without moving the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the read would leave the window
    pub fn read_le_at<T: CilIO>(&self, offset: usize) -> Result<T> {
        let mut offset = offset;
        read_le_at::<T>(self.data(), &mut offset)
    }

    /// Read a 2 or 4 byte index at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the read would leave the window
    pub fn read_dyn_at(&self, offset: usize, is_large: bool) -> Result<u32> {
        let mut offset = offset;
        read_le_at_dyn(self.data(), &mut offset, is_large)
    }

    /// Read a 1, 2 or 4 byte value at `offset`, widened to `u32`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the read would leave the window, or
    /// [`crate::Error::NotSupported`] for any other width
    pub fn read_width_at(&self, offset: usize, width: u8) -> Result<u32> {
        let mut offset = offset;
        read_le_at_width(self.data(), &mut offset, width)
    }

    /// Borrow `len` bytes at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range leaves the window
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(end) = offset.checked_add(len) else {
            return Err(OutOfBounds);
        };

        self.data().get(offset..end).ok_or(OutOfBounds)
    }

    /// Borrow the bytes at `offset` up to, not including, the next NUL byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `offset` is outside the window, or a
    /// [`crate::Error::Malformed`] if no terminator exists before the end of the window
    pub fn read_cstr_at(&self, offset: usize) -> Result<&[u8]> {
        let Some(tail) = self.data().get(offset..) else {
            return Err(OutOfBounds);
        };

        match tail.iter().position(|byte| *byte == 0) {
            Some(end) => Ok(&tail[..end]),
            None => Err(malformed_error!("Unterminated string at offset - {}", offset)),
        }
    }
}
