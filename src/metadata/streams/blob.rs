//! Blob heap (`#Blob`).
//!
//! Every blob is prefixed with its length as a compressed unsigned integer. Offset 0 is the
//! empty blob.
//!
//! # Reference
//! - [ECMA-335 II.24.2.4](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{
    file::parser::Parser,
    metadata::signatures::encode_compressed_uint,
    Error::OutOfBounds,
    Result,
};

/// '#Blob' holds signatures, custom attribute payloads and other variable length data
/// referenced from the metadata tables.
///
/// # Examples
///
/// ```rust
/// use sigscope::metadata::streams::Blob;
///
/// let blob = Blob::from(vec![0u8, 0x03, 0x41, 0x42, 0x43])?;
/// assert_eq!(blob.get(1)?, &[0x41, 0x42, 0x43]);
/// # Ok::<(), sigscope::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Blob {
    data: Vec<u8>,
}

impl Blob {
    /// Create a `Blob` heap from its bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap does not start with the empty blob.
    pub fn from(data: Vec<u8>) -> Result<Blob> {
        if data.first() != Some(&0) {
            return Err(malformed_error!("Provided #Blob heap is empty"));
        }

        Ok(Blob { data })
    }

    /// Get the blob whose length prefix starts at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the prefix or the payload runs past the heap,
    /// and [`crate::Error::Malformed`] for an invalid length prefix.
    pub fn get(&self, index: usize) -> Result<&[u8]> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;
        let skip = parser.pos();

        let Some(data_start) = index.checked_add(skip) else {
            return Err(OutOfBounds);
        };

        let Some(data_end) = data_start.checked_add(len) else {
            return Err(OutOfBounds);
        };

        if data_end > self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.data[data_start..data_end])
    }

    /// Size of the heap in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the heap only holds the empty blob.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() <= 1
    }

    pub(crate) fn push(&mut self, value: &[u8]) -> Result<u32> {
        if value.is_empty() {
            return Ok(0);
        }

        let length = u32::try_from(value.len())
            .map_err(|_| malformed_error!("Blob of {} bytes is too large", value.len()))?;
        let offset = u32::try_from(self.data.len())
            .map_err(|_| malformed_error!("#Blob heap exceeds 4GiB"))?;

        self.data.extend(encode_compressed_uint(length)?);
        self.data.extend_from_slice(value);
        Ok(offset)
    }
}

impl Default for Blob {
    fn default() -> Self {
        Blob { data: vec![0] }
    }
}
