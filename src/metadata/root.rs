//! Metadata root header and stream directory.
//!
//! The metadata root is the entry point of every metadata container. It carries the version
//! string and the stream directory, which locates the table stream (`#~` or `#-`) and the heaps
//! relative to the start of the root.
//!
//! # Example
//!
//! ```rust
//! use mdscope::metadata::root::Root;
//! let root = Root::read(&[
//!            0x42, 0x53, 0x4A, 0x42,
//!            0x01, 0x00,
//!            0x01, 0x00,
//!            0x00, 0x00, 0x00, 0x00,
//!            0x04, 0x00, 0x00, 0x00,
//!            b'v', b'1', 0x00, 0x00,
//!            0x00, 0x00,
//!            0x01, 0x00,
//!            0x20, 0x00, 0x00, 0x00, // StreamHeader
//!            0x00, 0x00, 0x00, 0x00,
//!            0x23, 0x2D, 0x00, 0x00,
//!        ])?;
//! assert_eq!(root.version, "v1");
//! assert_eq!(root.stream_headers[0].name, "#-");
//! # Ok::<(), mdscope::Error>(())
//! ```
//!
//! # References
//!
//! - [ECMA-335 II.24.2.1: Metadata root](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{
    file::io::{read_le, read_le_at},
    metadata::streams::StreamHeader,
    Error::OutOfBounds,
    Result,
};

/// The MAGIC value indicating the CIL header
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// The header of the present Metadata, providing necessary information for parsing.
///
/// Stream offsets in [`Root::stream_headers`] are relative to the first byte of the root.
#[derive(Clone, Debug)]
pub struct Root {
    /// Magic signature for physical metadata : 0x424A5342.
    pub signature: u32,
    /// Major version, 1 (ignore on read)
    pub major_version: u16,
    /// Minor version, 1 (ignore on read)
    pub minor_version: u16,
    /// Reserved, always 0
    pub reserved: u32,
    /// Number of bytes allocated to hold the version string, rounded up to a multiple of four
    pub length: u32,
    /// Version string, with the trailing padding removed
    pub version: String,
    /// Reserved, always 0
    pub flags: u16,
    /// Number of streams
    pub stream_number: u16,
    /// Stream headers, in directory order
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Read the metadata root from a byte slice that starts at the root
    ///
    /// # Arguments
    /// * 'data' - The bytes of the metadata root, up to the end of the image
    ///
    /// # Errors
    /// Returns an error if the signature is wrong, the header is truncated, or a stream lies
    /// outside of `data`
    pub fn read(data: &[u8]) -> Result<Root> {
        if data.len() < 20 {
            return Err(OutOfBounds);
        }

        let signature = read_le::<u32>(data)?;
        if signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "CIL_HEADER_MAGIC does not match - {}",
                signature
            ));
        }

        let version_string_length = read_le_at::<u32>(data, &mut 12)?;
        let Some(str_end) = (version_string_length as usize).checked_add(16) else {
            return Err(malformed_error!(
                "Version string length causing integer overflow - {} + {}",
                version_string_length,
                16
            ));
        };
        if str_end.saturating_add(4) > data.len() {
            return Err(OutOfBounds);
        }

        let version = data[16..str_end]
            .iter()
            .take_while(|byte| **byte != 0)
            .map(|byte| char::from(*byte))
            .collect::<String>();

        let mut offset = str_end;
        let flags = read_le_at::<u16>(data, &mut offset)?;
        let stream_count = read_le_at::<u16>(data, &mut offset)?;
        if stream_count == 0 || stream_count as usize * 9 > data.len() - offset {
            // 9 - min size that a valid StreamHeader can be
            return Err(malformed_error!("Invalid stream count - {}", stream_count));
        }

        let mut streams = Vec::with_capacity(stream_count as usize);
        for _ in 0..stream_count {
            if offset >= data.len() {
                return Err(OutOfBounds);
            }

            let new_stream = StreamHeader::from(&data[offset..])?;
            match u32::checked_add(new_stream.offset, new_stream.size) {
                Some(range) => {
                    if range as usize > data.len() {
                        return Err(malformed_error!(
                            "Stream '{}' exceeds the metadata - {} + {}",
                            new_stream.name,
                            new_stream.offset,
                            new_stream.size
                        ));
                    }
                }
                None => {
                    return Err(malformed_error!(
                        "Stream offset and size cause integer overflow - {} + {}",
                        new_stream.offset,
                        new_stream.size
                    ))
                }
            }

            offset += new_stream.header_size();
            streams.push(new_stream);
        }

        Ok(Root {
            signature,
            major_version: read_le::<u16>(&data[4..])?,
            minor_version: read_le::<u16>(&data[6..])?,
            reserved: read_le::<u32>(&data[8..])?,
            length: version_string_length,
            version,
            flags,
            stream_number: stream_count,
            stream_headers: streams,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x42, 0x53, 0x4A, 0x42,
            0x00, 0x20,
            0x00, 0x30,
            0x00, 0x00, 0x00, 0x40,
            0x05, 0x00, 0x00, 0x00,
            b'H', b'E', b'L', b'L', b'O',
            0x00, 0x60,
            0x02, 0x00,

            0x1, 0x00, 0x00, 0x00, // StreamHeader
            0x5, 0x00, 0x00, 0x00,
            0x23, 0x7E, 0x00, 0x00,

            0x2, 0x00, 0x00, 0x00, // StreamHeader, unknown name
            0x4, 0x00, 0x00, 0x00,
            b'#', b'J', b'T', b'D', 0x00, 0x00, 0x00, 0x00,
        ];

        let parsed_header = Root::read(&header_bytes).unwrap();

        assert_eq!(parsed_header.signature, CIL_HEADER_MAGIC);
        assert_eq!(parsed_header.major_version, 0x2000);
        assert_eq!(parsed_header.minor_version, 0x3000);
        assert_eq!(parsed_header.reserved, 0x40000000);
        assert_eq!(parsed_header.length, 5);
        assert_eq!(parsed_header.version, "HELLO");
        assert_eq!(parsed_header.flags, 0x6000);
        assert_eq!(parsed_header.stream_number, 2);
        assert_eq!(parsed_header.stream_headers.len(), 2);
        assert_eq!(parsed_header.stream_headers[0].offset, 0x1);
        assert_eq!(parsed_header.stream_headers[0].size, 0x5);
        assert_eq!(parsed_header.stream_headers[0].name, "#~");
        assert_eq!(parsed_header.stream_headers[1].name, "#JTD");
    }

    #[test]
    fn high_byte_stream_name() {
        #[rustfmt::skip]
        let header_bytes = [
            0x42, 0x53, 0x4A, 0x42,
            0x01, 0x00,
            0x01, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
            0x02, 0x00,

            0x2C, 0x00, 0x00, 0x00, // StreamHeader, name 0xC0 "ab"
            0x04, 0x00, 0x00, 0x00,
            0xC0, b'a', b'b', 0x00,

            0x2C, 0x00, 0x00, 0x00, // StreamHeader
            0x04, 0x00, 0x00, 0x00,
            0x23, 0x7E, 0x00, 0x00,

            0x00, 0x00, 0x00, 0x00,
        ];

        let parsed_header = Root::read(&header_bytes).unwrap();

        assert_eq!(parsed_header.stream_headers.len(), 2);
        assert_eq!(parsed_header.stream_headers[0].name, "\u{C0}ab");
        assert_eq!(parsed_header.stream_headers[1].name, "#~");
        assert_eq!(parsed_header.stream_headers[1].offset, 0x2C);
        assert_eq!(parsed_header.stream_headers[1].size, 4);
    }

    #[test]
    fn bad_signature() {
        let mut data = vec![0u8; 64];
        data[0..4].copy_from_slice(b"BSJA");

        match Root::read(&data) {
            Err(crate::Error::Malformed { .. }) => {}
            _ => panic!("This should not work!"),
        }
    }

    #[test]
    fn stream_outside_metadata() {
        #[rustfmt::skip]
        let header_bytes = [
            0x42, 0x53, 0x4A, 0x42,
            0x01, 0x00,
            0x01, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
            0x01, 0x00,
            0x10, 0x00, 0x00, 0x00,
            0x40, 0x00, 0x00, 0x00,
            0x23, 0x7E, 0x00, 0x00,
        ];

        if Root::read(&header_bytes).is_ok() {
            panic!("This should not work!")
        }
    }

    #[test]
    fn truncated() {
        assert!(Root::read(&[0x42, 0x53, 0x4A, 0x42]).is_err());

        let mut data = vec![0u8; 24];
        data[0..4].copy_from_slice(&CIL_HEADER_MAGIC.to_le_bytes());
        data[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(Root::read(&data).is_err());
    }
}
