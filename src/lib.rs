// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # mdscope
//!
//! Row-list resolution and key search over ECMA-335 (.NET) metadata tables.
//!
//! Given the metadata root of a .NET module, `mdscope` answers the structural questions every
//! metadata consumer asks over and over: which fields and methods a type owns, which
//! parameters a method has, which custom attributes, generic parameters or interface
//! implementations belong to a row. It handles the parts of the format that make these
//! questions awkward:
//!
//! - **Pointer tables** (`FieldPtr`, `MethodPtr`, ...) in uncompressed `#-` table streams
//! - **Deleted rows** left behind by edit-and-continue
//! - **Unsorted tables**, searched through an auxiliary index built once on first use
//! - **Malformed input**, which degrades to empty results instead of panics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mdscope::prelude::*;
//!
//! // The metadata root (`BSJB`) as located by a PE loader
//! let view = MetadataView::from_bytes(std::fs::read("metadata.bin")?)?;
//!
//! let type_defs = view.tables().info().get(TableId::TypeDef).rows;
//! for type_def in 1..=type_defs {
//!     println!(
//!         "type {}: {} fields, {} methods",
//!         type_def,
//!         view.field_rid_list(type_def).len(),
//!         view.method_rid_list(type_def).len()
//!     );
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`file`] - Byte sources ([`file::Backend`], [`file::Memory`]) and little-endian reads
//! - [`metadata::root`] - The metadata root and its stream directory
//! - [`metadata::streams`] - Stream readers, the `#Strings` heap and the table stream
//! - [`metadata::tables`] - Table identifiers, column layouts and coded indexes
//! - [`metadata::resolver`] - [`metadata::resolver::RidListResolver`] and
//!   [`metadata::resolver::TableSearchEngine`]
//! - [`metadata::view`] - [`metadata::view::MetadataView`], everything assembled
//!
//! ## Standards Compliance
//!
//! `mdscope` follows the **ECMA-335 specification** (6th edition), Partition II, for the
//! physical metadata layout.
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//!
//! # Fuzzing
//! cargo +nightly fuzz run view --release
//! ```

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Byte sources backing the metadata streams
pub mod file;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use mdscope::prelude::*;
///
/// let view = MetadataView::from_bytes(std::fs::read("metadata.bin")?)?;
/// let params: RidList = view.param_rid_list(1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod prelude;

/// Metadata root, streams, tables and the resolver built on top of them
///
/// # Key Components
///
/// - [`metadata::root`] - Metadata root and stream directory
/// - [`metadata::streams`] - [`metadata::streams::StreamManager`],
///   [`metadata::streams::HeapStream`], [`metadata::streams::TablesStream`]
/// - [`metadata::tables`] - [`metadata::tables::TableId`], [`metadata::tables::ColumnReader`]
/// - [`metadata::resolver`] - Rid lists and key searches
/// - [`metadata::config`] - [`metadata::config::ResolverConfig`]
pub mod metadata;

/// `mdscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// Only construction and byte-level reads are fallible; queries never return a `Result`.
pub type Result<T> = std::result::Result<T, Error>;

/// `mdscope` Error type
///
/// # Examples
///
/// ```rust,no_run
/// use mdscope::{metadata::view::MetadataView, Error};
///
/// match MetadataView::from_bytes(std::fs::read("metadata.bin")?) {
///     Ok(view) => println!("{} streams", view.streams().streams().len()),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub use error::Error;

pub use metadata::view::MetadataView;
