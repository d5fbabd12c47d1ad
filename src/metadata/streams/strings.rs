//! String heap (`#Strings`).
//!
//! Identifiers referenced from metadata tables, stored as NUL-terminated UTF-8. Offset 0 is
//! always the empty string.
//!
//! # Reference
//! - [ECMA-335 II.24.2.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::ffi::CStr;

use crate::{Error::OutOfBounds, Result};

/// '#Strings' holds the identifiers (type names, namespaces, member names, assembly names)
/// referenced from the metadata tables.
///
/// # Examples
///
/// ```rust
/// use sigscope::metadata::streams::Strings;
///
/// let strings = Strings::from(vec![0u8, b'H', b'e', b'l', b'l', b'o', 0u8])?;
/// assert_eq!(strings.get(1)?, "Hello");
/// assert_eq!(strings.get(0)?, "");
/// # Ok::<(), sigscope::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Strings {
    data: Vec<u8>,
}

impl Strings {
    /// Create a `Strings` heap from its bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap is empty or does not start with the
    /// empty string.
    pub fn from(data: Vec<u8>) -> Result<Strings> {
        if data.first() != Some(&0) {
            return Err(malformed_error!("Provided #Strings heap is empty"));
        }

        Ok(Strings { data })
    }

    /// Get the string starting at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an offset past the heap and
    /// [`crate::Error::Malformed`] for an unterminated or non UTF-8 string.
    pub fn get(&self, index: usize) -> Result<&str> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        match CStr::from_bytes_until_nul(&self.data[index..]) {
            Ok(result) => result
                .to_str()
                .map_err(|_| malformed_error!("Invalid string at index - {}", index)),
            Err(_) => Err(malformed_error!("Unterminated string at index - {}", index)),
        }
    }

    /// Size of the heap in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the heap only holds the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() <= 1
    }

    pub(crate) fn push(&mut self, value: &str) -> u32 {
        if value.is_empty() {
            return 0;
        }

        let offset = u32::try_from(self.data.len()).unwrap_or(u32::MAX);
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        offset
    }
}

impl Default for Strings {
    fn default() -> Self {
        Strings { data: vec![0] }
    }
}
