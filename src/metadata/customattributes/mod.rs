//! Custom attribute construction from `CustomAttribute` blobs.
//!
//! An attribute blob is decoded against the already resolved constructor and applied to a
//! target object through an [`AttributeRuntime`]: the runtime creates strings, arrays and
//! boxes, runs the constructor and assigns named fields and properties.
//!
//! # Custom Attribute Format
//!
//! - **Prolog** - `0x0001`
//! - **Fixed Arguments** - one value per constructor parameter, in declaration order
//! - **Named Argument Count** - little-endian `u16`
//! - **Named Arguments** - `0x53` (field) or `0x54` (property), a serialization type, the
//!   member name and the value
//!
//! Primitives are stored little-endian at their natural width and enums at the width of
//! their underlying type. Strings are compressed-length UTF-8 with `0xFF` for null; arrays
//! carry a `u32` count with `0xFFFFFFFF` for null. `object` parameters are preceded by the
//! serialization type of the actual value.
//!
//! # Examples
//!
//! ```rust
//! use std::cell::RefCell;
//! use sigscope::{
//!     metadata::{
//!         builder::ImageBuilder,
//!         customattributes::{AttributeRuntime, ManagedValue},
//!         registry::AssemblyRegistry,
//!         resolver::MetadataResolver,
//!         signatures::decode_blob,
//!         typesystem::{MethodHandle, TypeDescriptor},
//!     },
//!     Result,
//! };
//!
//! #[derive(Default)]
//! struct Strings(RefCell<Vec<String>>);
//!
//! impl AttributeRuntime for Strings {
//!     type Object = String;
//!     fn new_string(&self, value: &str) -> Result<String> { Ok(value.to_string()) }
//!     fn new_array(&self, _: &TypeDescriptor, _: Vec<ManagedValue<String>>) -> Result<String> {
//!         Ok("[..]".to_string())
//!     }
//!     fn box_value(&self, _: &TypeDescriptor, _: ManagedValue<String>) -> Result<String> {
//!         Ok("box".to_string())
//!     }
//!     fn invoke(&self, _: MethodHandle, _: &String, args: Vec<ManagedValue<String>>) -> Result<()> {
//!         for arg in args {
//!             if let ManagedValue::Object(s) = arg { self.0.borrow_mut().push(s); }
//!         }
//!         Ok(())
//!     }
//!     fn set_field(&self, _: &String, _: &str, _: ManagedValue<String>) -> Result<()> { Ok(()) }
//!     fn set_property(&self, _: &String, _: &str, _: ManagedValue<String>) -> Result<()> { Ok(()) }
//! }
//!
//! let mut builder = ImageBuilder::new("Demo");
//! let attribute = builder.add_type("Demo", "NoteAttribute");
//! // instance void .ctor(string)
//! builder.add_method(attribute, ".ctor", &[0x20, 0x01, 0x01, 0x0E], &["text"])?;
//! let blob = builder.add_blob(&[0x01, 0x00, 0x05, b'h', b'e', b'l', b'l', b'o', 0x00, 0x00])?;
//!
//! let registry = AssemblyRegistry::default();
//! let image = registry.load(builder)?;
//! let resolver = MetadataResolver::new(&image, &registry);
//! let runtime = Strings::default();
//!
//! let mut reader = decode_blob(&image, blob)?;
//! resolver.construct_custom_attribute(&mut reader, &runtime, &String::new(), image.method_handle(0))?;
//! assert_eq!(runtime.0.borrow().as_slice(), ["hello"]);
//! # Ok::<(), sigscope::Error>(())
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.3 - Custom Attributes

mod parser;
mod types;

pub use types::*;
