//! ECMA-335 metadata: root, streams, tables and row-list resolution.
//!
//! # Key Components
//!
//! - [`root`] - The `BSJB` metadata root and its stream directory
//! - [`streams`] - Stream readers over the byte source, the `#Strings` heap and the table stream
//! - [`tables`] - Table identifiers, column layouts, coded indexes and the column reader seam
//! - [`resolver`] - Member lists, owner-keyed lookups and key searches
//! - [`view`] - Everything assembled behind one constructor
//!
//! # Examples
//!
//! ```rust,no_run
//! use mdscope::metadata::{tables::TableId, view::MetadataView};
//!
//! let view = MetadataView::from_bytes(std::fs::read("metadata.bin")?)?;
//! let resolver = view.resolver();
//!
//! println!("nested in type 2: {:?}", resolver.nested_class_rid_list(2).to_vec());
//! println!(
//!     "attributes on method 1: {:?}",
//!     resolver.custom_attribute_rid_list(TableId::MethodDef, 1).to_vec()
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Resolver configuration
pub mod config;
/// Row-list resolution and key search
pub mod resolver;
/// Implementation of the Root of the Metadata
pub mod root;
/// Implementation of the metadata streams
pub mod streams;
/// Table identifiers, layouts and column access
pub mod tables;
/// Parsed metadata, ready to query
pub mod view;
