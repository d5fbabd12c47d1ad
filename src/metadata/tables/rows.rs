//! Decoded rows of the tables the signature engine consumes.
//!
//! Rows keep heap references as raw offsets and coded indices as the raw packed value.
//! Splitting a coded index is left to the resolver, which knows which family it expects.

use crate::metadata::token::Token;

/// A row of the `TypeRef` table (II.22.38).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRefRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `ResolutionScope` coded index
    pub resolution_scope: u32,
    /// Offset of the name in the string heap
    pub type_name: u32,
    /// Offset of the namespace in the string heap
    pub type_namespace: u32,
}

/// A row of the `TypeSpec` table (II.22.39).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSpecRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Offset of the type signature in the blob heap
    pub signature: u32,
}

/// A row of the `MemberRef` table (II.22.25).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRefRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `MemberRefParent` coded index
    pub class: u32,
    /// Offset of the member name in the string heap
    pub name: u32,
    /// Offset of the field or method signature in the blob heap
    pub signature: u32,
}

/// A row of the `MethodSpec` table (II.22.29).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSpecRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `MethodDefOrRef` coded index of the generic method
    pub method: u32,
    /// Offset of the instantiation signature in the blob heap
    pub instantiation: u32,
}

/// A row of the `AssemblyRef` table (II.22.5).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyRefRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Major version
    pub major_version: u16,
    /// Minor version
    pub minor_version: u16,
    /// Build number
    pub build_number: u16,
    /// Revision number
    pub revision_number: u16,
    /// Offset of the simple assembly name in the string heap
    pub name: u32,
    /// Offset of the culture in the string heap, 0 for neutral
    pub culture: u32,
}

/// A row of the `StandAloneSig` table (II.22.36).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StandAloneSigRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Offset of the signature in the blob heap
    pub signature: u32,
}

/// A row of the `CustomAttribute` table (II.22.10).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomAttributeRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `HasCustomAttribute` coded index of the decorated entity
    pub parent: u32,
    /// `CustomAttributeType` coded index of the constructor
    pub constructor: u32,
    /// Offset of the argument blob in the blob heap
    pub value: u32,
}
