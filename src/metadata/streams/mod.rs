//! Metadata heaps addressed by raw offset from table rows.
//!
//! - [`Strings`] - `#Strings`, NUL-terminated identifiers
//! - [`Blob`] - `#Blob`, length-prefixed signatures and attribute payloads

mod blob;
mod strings;

pub use blob::Blob;
pub use strings::Strings;
