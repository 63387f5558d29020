//! Row-list resolution over the metadata tables.
//!
//! ECMA-335 links tables in two ways. Owner tables such as `TypeDef` store the first row of a
//! member range (`FieldList`, `MethodList`, ...), optionally indirected through a pointer table
//! in uncompressed streams. Dependent tables such as `CustomAttribute` store a back reference to
//! their owner, which is only cheap to follow when the table is sorted by it.
//!
//! - [`RidListResolver`] turns both kinds of relation into [`RidList`]s
//! - [`TableSearchEngine`] runs the key searches, building a [`SortedTable`] per unsorted table
//!   on first use
//! - [`MemberRelation`] describes the five owner-to-member range relations
//!
//! # Examples
//!
//! ```rust,no_run
//! use mdscope::metadata::{tables::TableId, view::MetadataView};
//!
//! let view = MetadataView::from_bytes(std::fs::read("metadata.bin")?)?;
//! let resolver = view.resolver();
//!
//! for type_def in 1..=view.tables().info().get(TableId::TypeDef).rows {
//!     let fields = resolver.field_rid_list(type_def);
//!     let attributes = resolver.custom_attribute_rid_list(TableId::TypeDef, type_def);
//!     println!("{}: {} fields, {} attributes", type_def, fields.len(), attributes.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod lookup;
mod members;
mod relation;
mod ridlist;
mod search;
mod sortedtable;

pub use members::RidListResolver;
pub use relation::{IndirectionFlags, MemberRelation};
pub use ridlist::{IntoIter, Iter, RidList};
pub use search::{SearchStrategy, TableSearchEngine};
pub use sortedtable::SortedTable;
