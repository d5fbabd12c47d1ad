//! Byte-level decoding primitives.
//!
//! - [`crate::file::io`] - Bounds-checked little-endian primitive reads
//! - [`crate::file::parser::Parser`] - Cursor over a byte slice with compressed integer support
//!
//! Everything above this module (blob cursors, signature readers, the custom attribute
//! decoder) reads its input through a [`crate::file::parser::Parser`].

pub mod io;
pub mod parser;
