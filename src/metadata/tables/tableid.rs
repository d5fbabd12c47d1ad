use strum::{Display, EnumCount, EnumIter, FromRepr};

/// Identifiers of the ECMA-335 metadata tables (Partition II, Section 22).
///
/// The discriminant equals the table number used in the high byte of a
/// [`crate::metadata::token::Token`]. Only a handful of tables are consumed by the decoder
/// (`TypeRef`, `TypeSpec`, `MemberRef`, `MethodSpec`, `AssemblyRef`, `StandAloneSig`,
/// `CustomAttribute`), the rest appear as tags inside coded indices.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumIter, EnumCount, FromRepr)]
#[repr(u8)]
pub enum TableId {
    /// `Module` table (0x00)
    Module = 0x00,
    /// `TypeRef` table (0x01)
    TypeRef = 0x01,
    /// `TypeDef` table (0x02)
    TypeDef = 0x02,
    /// `FieldPtr` table (0x03)
    FieldPtr = 0x03,
    /// `Field` table (0x04)
    Field = 0x04,
    /// `MethodPtr` table (0x05)
    MethodPtr = 0x05,
    /// `MethodDef` table (0x06)
    MethodDef = 0x06,
    /// `ParamPtr` table (0x07)
    ParamPtr = 0x07,
    /// `Param` table (0x08)
    Param = 0x08,
    /// `InterfaceImpl` table (0x09)
    InterfaceImpl = 0x09,
    /// `MemberRef` table (0x0A)
    MemberRef = 0x0A,
    /// `Constant` table (0x0B)
    Constant = 0x0B,
    /// `CustomAttribute` table (0x0C)
    CustomAttribute = 0x0C,
    /// `FieldMarshal` table (0x0D)
    FieldMarshal = 0x0D,
    /// `DeclSecurity` table (0x0E)
    DeclSecurity = 0x0E,
    /// `ClassLayout` table (0x0F)
    ClassLayout = 0x0F,
    /// `FieldLayout` table (0x10)
    FieldLayout = 0x10,
    /// `StandAloneSig` table (0x11)
    StandAloneSig = 0x11,
    /// `EventMap` table (0x12)
    EventMap = 0x12,
    /// `EventPtr` table (0x13)
    EventPtr = 0x13,
    /// `Event` table (0x14)
    Event = 0x14,
    /// `PropertyMap` table (0x15)
    PropertyMap = 0x15,
    /// `PropertyPtr` table (0x16)
    PropertyPtr = 0x16,
    /// `Property` table (0x17)
    Property = 0x17,
    /// `MethodSemantics` table (0x18)
    MethodSemantics = 0x18,
    /// `MethodImpl` table (0x19)
    MethodImpl = 0x19,
    /// `ModuleRef` table (0x1A)
    ModuleRef = 0x1A,
    /// `TypeSpec` table (0x1B)
    TypeSpec = 0x1B,
    /// `ImplMap` table (0x1C)
    ImplMap = 0x1C,
    /// `FieldRVA` table (0x1D)
    FieldRVA = 0x1D,
    /// `Assembly` table (0x20)
    Assembly = 0x20,
    /// `AssemblyRef` table (0x23)
    AssemblyRef = 0x23,
    /// `File` table (0x26)
    File = 0x26,
    /// `ExportedType` table (0x27)
    ExportedType = 0x27,
    /// `ManifestResource` table (0x28)
    ManifestResource = 0x28,
    /// `NestedClass` table (0x29)
    NestedClass = 0x29,
    /// `GenericParam` table (0x2A)
    GenericParam = 0x2A,
    /// `MethodSpec` table (0x2B)
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` table (0x2C)
    GenericParamConstraint = 0x2C,
}
