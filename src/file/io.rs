//! Low-level little-endian reading utilities for metadata parsing.
//!
//! Every metadata structure this crate touches (the metadata root, stream headers, the table
//! stream header and the fixed-width table rows) is little-endian. The helpers here perform
//! bounds-checked reads of primitive integers from byte slices and report
//! [`crate::Error::OutOfBounds`] instead of panicking when the buffer is too short.
//!
//! # Key Components
//!
//! - [`CilIO`] - Trait mapping a primitive type to its fixed-size byte representation
//! - [`read_le`] - Read a value from the start of a buffer
//! - [`read_le_at`] - Read a value at an offset and advance the offset
//! - [`read_le_at_dyn`] - Read a 2 or 4 byte index, depending on the `is_large` flag
//! - [`read_le_at_width`] - Read a 1, 2 or 4 byte column and widen it to `u32`
//!
//! # Examples
//!
//! ```rust
//! use mdscope::file::io::{read_le, read_le_at, read_le_at_dyn};
//!
//! let data = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00];
//! assert_eq!(read_le::<u16>(&data)?, 1);
//!
//! let mut offset = 2;
//! assert_eq!(read_le_at::<u16>(&data, &mut offset)?, 2);
//! assert_eq!(read_le_at_dyn(&data, &mut offset, true)?, 3);
//! assert_eq!(offset, 8);
//! # Ok::<(), mdscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! All functions are pure and operate on borrowed data only.

use crate::{Error::OutOfBounds, Result};

/// Trait for type-specific safe binary data reading operations.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array required for that particular type (e.g., `[u8; 4]` for `u32`).
pub trait CilIO: Sized {
    /// Associated type for the fixed-size byte array of this type
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

// Implement CilIO support for u64
impl CilIO for u64 {
    type Bytes = [u8; 8];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u64::from_le_bytes(bytes)
    }
}

// Implement CilIO support for u32
impl CilIO for u32 {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u32::from_le_bytes(bytes)
    }
}

// Implement CilIO support from u16
impl CilIO for u16 {
    type Bytes = [u8; 2];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u16::from_le_bytes(bytes)
    }
}

// Implement CilIO support from u8
impl CilIO for u8 {
    type Bytes = [u8; 1];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u8::from_le_bytes(bytes)
    }
}

/// Safely reads a value of type `T` in little-endian byte order from the start of a buffer.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too short
pub fn read_le<T: CilIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads a value of type `T` in little-endian byte order at `offset`, advancing the
/// offset by the size of `T` on success.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the read would exceed the buffer
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Reads a heap or table index that is either 2 or 4 bytes wide.
///
/// ## Arguments
/// * 'data'     - The buffer to read from
/// * 'offset'   - The offset to read at, advanced on success
/// * 'is_large' - `true` for a 4 byte index, `false` for a 2 byte index
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the read would exceed the buffer
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, is_large: bool) -> Result<u32> {
    let res = if is_large {
        read_le_at::<u32>(data, offset)?
    } else {
        u32::from(read_le_at::<u16>(data, offset)?)
    };

    Ok(res)
}

/// Reads a 1, 2 or 4 byte little-endian column and widens it to `u32`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the read would exceed the buffer, or
/// [`crate::Error::NotSupported`] for any other width
pub fn read_le_at_width(data: &[u8], offset: &mut usize, width: u8) -> Result<u32> {
    match width {
        1 => Ok(u32::from(read_le_at::<u8>(data, offset)?)),
        2 => Ok(u32::from(read_le_at::<u16>(data, offset)?)),
        4 => read_le_at::<u32>(data, offset),
        _ => Err(crate::Error::NotSupported),
    }
}
