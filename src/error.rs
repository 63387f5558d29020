use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors are only ever produced while building the engine (parsing the metadata root, the
/// stream directory and the table stream header) or by the byte-level primitives. Every query
/// on an already constructed [`crate::metadata::view::MetadataView`] degrades to fewer or zero
/// results instead of failing.
///
/// # Error Categories
///
/// - [`Error::Malformed`] - Corrupted or invalid structure, including a missing table stream
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a byte source or stream
/// - [`Error::NotSupported`] - Unsupported format feature
///
/// # Examples
///
/// ```rust
/// use mdscope::{metadata::view::MetadataView, Error};
///
/// match MetadataView::from_bytes(vec![0u8; 8]) {
///     Ok(_) => unreachable!(),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed metadata: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The metadata is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// This format feature is not supported.
    #[error("This format is not supported")]
    NotSupported,
}
