//! Metadata table identifiers, coded indices and the decoded rows consumed by the resolver.
//!
//! Reading the physical table stream is done elsewhere; the resolver only sees already
//! decoded rows, addressed by 1-based row index through [`MetadataTable::get`].

mod codedindex;
mod rows;
mod tableid;

pub use codedindex::{CodedIndex, CodedIndexType};
pub use rows::{
    AssemblyRefRaw, CustomAttributeRaw, MemberRefRaw, MethodSpecRaw, StandAloneSigRaw,
    TypeRefRaw, TypeSpecRaw,
};
pub use tableid::TableId;

use crate::{Error::OutOfBounds, Result};

/// The rows of a single table, addressed by 1-based row index.
#[derive(Clone, Debug)]
pub struct MetadataTable<T> {
    rows: Vec<T>,
}

impl<T> MetadataTable<T> {
    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        u32::try_from(self.rows.len()).unwrap_or(u32::MAX)
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fetch the row `rid` (1-based).
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for row 0 and rows past the end of the table.
    pub fn get(&self, rid: u32) -> Result<&T> {
        if rid == 0 {
            return Err(OutOfBounds);
        }

        self.rows.get(rid as usize - 1).ok_or(OutOfBounds)
    }

    /// Iterate over all rows in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub(crate) fn push(&mut self, row: T) {
        self.rows.push(row);
    }

    /// The id the next pushed row will receive.
    pub(crate) fn next_rid(&self) -> u32 {
        self.row_count() + 1
    }
}

impl<T> Default for MetadataTable<T> {
    fn default() -> Self {
        MetadataTable { rows: Vec::new() }
    }
}

/// The decoded tables of one image.
#[derive(Clone, Debug, Default)]
pub struct MetadataTables {
    /// `TypeRef` rows
    pub type_ref: MetadataTable<TypeRefRaw>,
    /// `TypeSpec` rows
    pub type_spec: MetadataTable<TypeSpecRaw>,
    /// `MemberRef` rows
    pub member_ref: MetadataTable<MemberRefRaw>,
    /// `MethodSpec` rows
    pub method_spec: MetadataTable<MethodSpecRaw>,
    /// `AssemblyRef` rows
    pub assembly_ref: MetadataTable<AssemblyRefRaw>,
    /// `StandAloneSig` rows
    pub standalone_sig: MetadataTable<StandAloneSigRaw>,
    /// `CustomAttribute` rows
    pub custom_attribute: MetadataTable<CustomAttributeRaw>,
}
