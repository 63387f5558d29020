//! # mdscope Prelude
//!
//! The types needed for everyday queries, for glob import.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all mdscope operations
pub use crate::Error;

/// The result type used throughout mdscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Parsed metadata, ready to query
pub use crate::metadata::view::MetadataView;

/// Resolver options
pub use crate::metadata::config::ResolverConfig;

/// Byte sources
pub use crate::file::{Backend, Memory};

// ================================================================================================
// Resolution
// ================================================================================================

/// Rid lists and the engines producing them
pub use crate::metadata::resolver::{
    MemberRelation, RidList, RidListResolver, SearchStrategy, TableSearchEngine,
};

// ================================================================================================
// Tables and Streams
// ================================================================================================

/// Table identity and column access
pub use crate::metadata::tables::{CodedIndexType, ColumnReader, TableId};

/// Streams of the metadata root
pub use crate::metadata::streams::{HeapStream, StreamManager, Strings, TablesStream};
