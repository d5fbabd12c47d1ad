//! Metadata model and signature decoding for .NET images.
//!
//! An [`image::Image`] holds the heaps, the reference tables and the definitions of one
//! assembly. Images are collected with an [`builder::ImageBuilder`] and registered in an
//! [`registry::AssemblyRegistry`], which decodes every method and field signature on load.
//! All decoding goes through a [`resolver::MetadataResolver`] bound to one image and the
//! registry.
//!
//! # Key Components
//!
//! - [`signatures`] - blob readers, signature shapes and the compressed integer encoders
//! - [`resolver`] - token, `TypeRef` and member resolution
//! - [`customattributes`] - attribute blob decoding against a runtime
//! - [`typesystem`] - type descriptors, definitions and generic contexts
//! - [`tables`] / [`streams`] - the raw rows and heaps signatures point into
//!
//! # Examples
//!
//! ```rust
//! use sigscope::metadata::{
//!     builder::ImageBuilder, registry::AssemblyRegistry, resolver::MetadataResolver,
//!     tables::TableId, typesystem::GenericContext,
//! };
//!
//! let mut builder = ImageBuilder::new("Core");
//! builder.add_type("System", "Object");
//!
//! let registry = AssemblyRegistry::default();
//! let image = registry.load(builder)?;
//! let resolver = MetadataResolver::new(&image, &registry);
//!
//! let object = resolver.read_type_from_token(&GenericContext::none(), TableId::TypeDef, 1)?;
//! assert_eq!(object.type_handle(), Some(image.type_handle(0)));
//! # Ok::<(), sigscope::Error>(())
//! ```

/// Collects heaps, rows and definitions into an image
pub mod builder;
/// Decoder limits
pub mod config;
/// Custom attribute construction
pub mod customattributes;
/// A loaded image
pub mod image;
/// The set of loaded images
pub mod registry;
/// Token and member resolution
pub mod resolver;
/// Signature blobs and their readers
pub mod signatures;
/// `#Strings` and `#Blob` heaps
pub mod streams;
/// Raw metadata rows and coded indices
pub mod tables;
/// Metadata tokens
pub mod token;
/// Type descriptors, definitions and generics
pub mod typesystem;
