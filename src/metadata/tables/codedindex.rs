//! Coded index families and their decoding.
//!
//! A coded index packs a table selector into its low bits and a row into the remaining
//! bits. How many low bits select the table depends on the family, so decoding always
//! names the family the caller expects; feeding a `MemberRefParent` value into the
//! `TypeDefOrRef` decoder is a programming error that no data check can detect.
//!
//! ## References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Section II.24.2.6

use strum::{EnumCount, EnumIter};

use crate::{
    metadata::{tables::TableId, token::Token},
    Result,
};

/// The coded index families consumed by the decoder.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
pub enum CodedIndexType {
    /// `TypeDef`, `TypeRef` or `TypeSpec` (2 bits).
    TypeDefOrRef,

    /// Any entity that can carry a custom attribute (5 bits).
    HasCustomAttribute,

    /// Parent of a `MemberRef`: `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef` or
    /// `TypeSpec` (3 bits).
    MemberRefParent,

    /// `MethodDef` or `MemberRef` (1 bit).
    MethodDefOrRef,

    /// Constructor of a custom attribute (3 bits). Tags 0, 1 and 4 are reserved.
    CustomAttributeType,

    /// Scope of a `TypeRef`: `Module`, `ModuleRef`, `AssemblyRef` or `TypeRef` (2 bits).
    ResolutionScope,
}

impl CodedIndexType {
    /// The tables selectable by this family, in tag order. `None` marks a reserved tag.
    #[must_use]
    pub fn tables(&self) -> &'static [Option<TableId>] {
        match self {
            CodedIndexType::TypeDefOrRef => &[
                Some(TableId::TypeDef),
                Some(TableId::TypeRef),
                Some(TableId::TypeSpec),
            ],
            CodedIndexType::HasCustomAttribute => &[
                Some(TableId::MethodDef),
                Some(TableId::Field),
                Some(TableId::TypeRef),
                Some(TableId::TypeDef),
                Some(TableId::Param),
                Some(TableId::InterfaceImpl),
                Some(TableId::MemberRef),
                Some(TableId::Module),
                Some(TableId::DeclSecurity),
                Some(TableId::Property),
                Some(TableId::Event),
                Some(TableId::StandAloneSig),
                Some(TableId::ModuleRef),
                Some(TableId::TypeSpec),
                Some(TableId::Assembly),
                Some(TableId::AssemblyRef),
                Some(TableId::File),
                Some(TableId::ExportedType),
                Some(TableId::ManifestResource),
                Some(TableId::GenericParam),
                Some(TableId::GenericParamConstraint),
                Some(TableId::MethodSpec),
            ],
            CodedIndexType::MemberRefParent => &[
                Some(TableId::TypeDef),
                Some(TableId::TypeRef),
                Some(TableId::ModuleRef),
                Some(TableId::MethodDef),
                Some(TableId::TypeSpec),
            ],
            CodedIndexType::MethodDefOrRef => &[Some(TableId::MethodDef), Some(TableId::MemberRef)],
            CodedIndexType::CustomAttributeType => &[
                None,
                None,
                Some(TableId::MethodDef),
                Some(TableId::MemberRef),
                None,
            ],
            CodedIndexType::ResolutionScope => &[
                Some(TableId::Module),
                Some(TableId::ModuleRef),
                Some(TableId::AssemblyRef),
                Some(TableId::TypeRef),
            ],
        }
    }

    /// Width of the table selector in bits.
    #[must_use]
    pub fn tag_bits(&self) -> u32 {
        match self {
            CodedIndexType::MethodDefOrRef => 1,
            CodedIndexType::TypeDefOrRef | CodedIndexType::ResolutionScope => 2,
            CodedIndexType::MemberRefParent | CodedIndexType::CustomAttributeType => 3,
            CodedIndexType::HasCustomAttribute => 5,
        }
    }

    /// Split a raw coded index into `(table, row)`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the tag selects no table in this family.
    pub fn decode(&self, raw: u32) -> Result<(TableId, u32)> {
        let bits = self.tag_bits();
        let tag = (raw & ((1 << bits) - 1)) as usize;
        let row = raw >> bits;

        match self.tables().get(tag).copied().flatten() {
            Some(table) => Ok((table, row)),
            None => Err(malformed_error!(
                "Invalid {:?} coded index tag {} in 0x{:08X}",
                self,
                tag,
                raw
            )),
        }
    }

    /// Pack `(table, row)` into this family's encoding.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `table` is not a member of this family.
    pub fn encode(&self, table: TableId, row: u32) -> Result<u32> {
        let Some(tag) = self.tables().iter().position(|t| *t == Some(table)) else {
            return Err(malformed_error!("{} is not part of {:?}", table, self));
        };

        #[allow(clippy::cast_possible_truncation)]
        Ok((row << self.tag_bits()) | tag as u32)
    }
}

/// A decoded coded index: the referenced table, the 1-based row and the matching token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodedIndex {
    /// The table this index refers to
    pub tag: TableId,
    /// 1-based row; 0 is the null reference
    pub row: u32,
    /// Token form of `(tag, row)`
    pub token: Token,
}

impl CodedIndex {
    /// Create a `CodedIndex` from its parts.
    #[must_use]
    pub fn new(tag: TableId, row: u32) -> CodedIndex {
        CodedIndex {
            tag,
            row,
            token: Token::from_parts(tag, row),
        }
    }

    /// Decode a raw value of the given family.
    ///
    /// # Errors
    /// See [`CodedIndexType::decode`].
    pub fn decode(raw: u32, ci_type: CodedIndexType) -> Result<CodedIndex> {
        let (tag, row) = ci_type.decode(raw)?;
        Ok(CodedIndex::new(tag, row))
    }
}
