//! Blob cursors bound to their image.

use crate::{
    file::parser::Parser,
    metadata::image::Image,
    Error, Result,
};

/// A cursor over one blob of an image's blob heap.
///
/// The reader only ever sees the bytes of its own blob, so a signature can never read into
/// the next one. Cloning yields an independent position over the same bytes.
#[derive(Clone, Debug)]
pub struct BlobReader<'a> {
    parser: Parser<'a>,
    image: &'a Image,
    depth: usize,
}

impl<'a> BlobReader<'a> {
    /// A reader over `data`, which must belong to `image`'s blob heap.
    #[must_use]
    pub fn new(image: &'a Image, data: &'a [u8]) -> Self {
        BlobReader {
            parser: Parser::new(data),
            image,
            depth: 0,
        }
    }

    /// The image this blob belongs to.
    #[must_use]
    pub fn image(&self) -> &'a Image {
        self.image
    }

    /// The underlying byte cursor.
    pub fn parser(&mut self) -> &mut Parser<'a> {
        &mut self.parser
    }

    /// Returns `true` while unread bytes remain.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.parser.has_more_data()
    }

    /// Current offset within the blob.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.parser.pos()
    }

    /// Read one byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the blob.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.parser.read_le::<u8>()
    }

    /// Peek at the next byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the blob.
    pub fn peek_u8(&self) -> Result<u8> {
        self.parser.peek_byte()
    }

    /// Read a compressed unsigned integer.
    ///
    /// # Errors
    /// See [`Parser::read_compressed_uint`].
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        self.parser.read_compressed_uint()
    }

    /// Read a compressed signed integer.
    ///
    /// # Errors
    /// See [`Parser::read_compressed_int`].
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        self.parser.read_compressed_int()
    }

    /// Nesting depth of the type currently being read.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Continue counting nesting from `depth`, for blobs entered from within another blob.
    #[must_use]
    pub(crate) fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Enter one level of type nesting.
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] once `limit` levels are open.
    pub(crate) fn enter(&mut self, limit: usize) -> Result<()> {
        if self.depth >= limit {
            return Err(Error::RecursionLimit(limit));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Decode the blob whose length prefix starts at `offset` in `image`'s blob heap and
/// return a reader scoped to exactly its bytes.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the blob runs past the heap and
/// [`crate::Error::Malformed`] for an invalid length prefix.
pub fn decode_blob(image: &Image, offset: u32) -> Result<BlobReader<'_>> {
    let data = image.blob().get(offset as usize)?;
    Ok(BlobReader::new(image, data))
}
