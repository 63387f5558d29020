//! Test factories shared by the unit tests of this crate.
//!
//! [`MetadataBuilder`] assembles complete metadata roots (stream directory, table stream and
//! `#Strings` heap) from row values, so tests can describe the rows they need instead of
//! carrying opaque byte dumps.


pub use builder::{MetadataBuilder, ROOT_OFFSET};
pub use reader::{CountingReader, MockTables};
