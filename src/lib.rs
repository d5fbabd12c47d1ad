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

//! # sigscope
//!
//! Signature, token and custom attribute decoding for ECMA-335 (.NET) metadata.
//!
//! `sigscope` turns the compact binary encodings found in the `#Blob` heap into structured
//! type descriptors, resolves metadata tokens to type, method and field definitions across
//! loaded assemblies, and applies custom attribute blobs to objects of a caller-provided
//! runtime.
//!
//! ## Features
//!
//! - **Compressed integers** - 1 to 3 byte unsigned and sign-rotated signed encodings
//! - **Type signatures** - every element type, custom modifiers, arrays with shapes, generic
//!   instantiations and generic parameters bound to their containers
//! - **Method, field, local, `MethodSpec` and standalone signatures**, including vararg
//!   call sites
//! - **Token resolution** - `TypeDef`, `TypeRef` (across assemblies and into nested types)
//!   and `TypeSpec`; `MemberRef` and `MethodSpec` to their definitions
//! - **Custom attributes** - fixed and named arguments, enums, boxed objects, null strings
//!   and arrays
//! - **Bounded decoding** - recursion depth, `MethodSpec` argument count and the number of
//!   loaded images are capped, and no input makes the decoder panic
//!
//! ## Quick Start
//!
//! ```rust
//! use sigscope::prelude::*;
//!
//! // A base library with System.Object, and an application referencing it
//! let mut core = ImageBuilder::new("Core");
//! core.add_type("System", "Object");
//!
//! let mut app = ImageBuilder::new("App");
//! let scope = app.add_assembly_ref("Core");
//! let object = app.add_type_ref(scope, "System", "Object")?;
//! // class System.Object[]
//! let mut elements = vec![ELEMENT_TYPE::SZARRAY, ELEMENT_TYPE::CLASS];
//! write_type_def_or_ref(TableId::TypeRef, object.row(), &mut elements)?;
//! let sig = app.add_blob(&elements)?;
//!
//! let registry = AssemblyRegistry::default();
//! let core = registry.load(core)?;
//! let app = registry.load(app)?;
//!
//! let resolver = MetadataResolver::new(&app, &registry);
//! let mut reader = decode_blob(&app, sig)?;
//! let ty = resolver.read_type(&mut reader, &GenericContext::none())?;
//! let TypeKind::SzArray(element) = ty.kind else { unreachable!() };
//! assert_eq!(element.type_handle(), Some(core.type_handle(0)));
//! # Ok::<(), sigscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`file`] - bounds-checked byte cursor and compressed integer reads
//! - [`metadata::tables`] / [`metadata::streams`] - raw rows, coded indices and heaps
//! - [`metadata::typesystem`] - descriptors, definitions and generic contexts
//! - [`metadata::image`] / [`metadata::builder`] / [`metadata::registry`] - images and the
//!   set of loaded assemblies
//! - [`metadata::signatures`] - blob cursor and the signature readers
//! - [`metadata::resolver`] - token and member resolution
//! - [`metadata::customattributes`] - attribute construction
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Every failure maps to exactly one
//! [`Error`] variant; [`Error::is_malformed`] groups bad input, and
//! [`Error::is_resolution_failure`] groups references that do not resolve.
//!
//! ## Logging
//!
//! Resolution steps are reported through the [`log`](https://docs.rs/log) facade at `debug`
//! level, element-by-element signature decoding at `trace` level.

#[macro_use]
pub(crate) mod error;

/// Byte-level decoding primitives
pub mod file;

/// Metadata model, signature readers, resolution and custom attributes
pub mod metadata;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use sigscope::prelude::*;
///
/// let registry = AssemblyRegistry::default();
/// let image = registry.load(ImageBuilder::new("Empty"))?;
/// assert_eq!(image.name(), "Empty");
/// # Ok::<(), sigscope::Error>(())
/// ```
pub mod prelude;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// `sigscope` Result type.
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `sigscope` Error type.
pub use error::Error;

/// Cursor over a byte slice with compressed integer support.
pub use file::parser::Parser;
