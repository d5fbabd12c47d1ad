//! Signature blobs and the readers that decode them.
//!
//! Signatures are stored in the `#Blob` heap, each prefixed by its compressed length. They
//! describe types, method parameters and calling conventions in a compact binary format
//! defined by ECMA-335 Partition II, Section 23.2.
//!
//! # Signature Kinds
//!
//! - **Type** - one element type tree, read by [`crate::metadata::resolver::MetadataResolver::read_type`]
//! - **Field** - `0x06` followed by a type
//! - **Method** - flags, optional generic count, parameter count, return type, parameters;
//!   definitions are bound to their [`crate::metadata::typesystem::MethodDefinition`],
//!   references keep vararg parameters apart
//! - **`MethodSpec`** - `0x0A`, argument count, arguments
//! - **`LocalVarSig`** - `0x07`, local count, locals
//! - **`StandAloneSig`** - a call-site method signature
//!
//! # Binary Format
//!
//! - Counts, row numbers and coded indices are compressed unsigned integers (1 to 3 bytes)
//! - Array lower bounds are compressed signed integers
//! - Types are a prefix-encoded tree of element type tags; custom modifiers are transparent
//!   prefixes that only leave a count behind
//!
//! # Examples
//!
//! ```rust
//! use sigscope::metadata::{
//!     builder::ImageBuilder, registry::AssemblyRegistry, resolver::MetadataResolver,
//!     signatures::decode_blob, typesystem::{GenericContext, TypeKind},
//! };
//!
//! let mut builder = ImageBuilder::new("Demo");
//! // static int32 M(string)
//! let offset = builder.add_blob(&[0x00, 0x01, 0x08, 0x0E])?;
//!
//! let registry = AssemblyRegistry::default();
//! let image = registry.load(builder)?;
//! let resolver = MetadataResolver::new(&image, &registry);
//!
//! let mut reader = decode_blob(&image, offset)?;
//! let sig = resolver.read_method_ref_sig(&mut reader, &GenericContext::none())?;
//! assert_eq!(sig.return_type.kind, TypeKind::I4);
//! assert_eq!(sig.params[0].kind, TypeKind::String);
//! # Ok::<(), sigscope::Error>(())
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.2 - Blobs and Signatures

mod encoders;
mod parser;
mod reader;
mod types;

pub use encoders::*;
pub use reader::{decode_blob, BlobReader};
pub use types::*;
