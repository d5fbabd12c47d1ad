//! Decoded signature shapes and the header constants they are introduced by.

use bitflags::bitflags;

use crate::metadata::typesystem::TypeDescriptor;

/// Bitmask for the calling convention kind in the low nibble of a signature header
pub const CALLING_CONVENTION_MASK: u8 = 0x0F;

#[allow(non_snake_case, dead_code)]
/// Calling convention kinds stored in the low nibble of a signature header (II.23.2.3)
pub mod CALLING_CONVENTION {
    /// Managed default
    pub const DEFAULT: u8 = 0x00;
    /// Unmanaged cdecl
    pub const C: u8 = 0x01;
    /// Unmanaged stdcall
    pub const STDCALL: u8 = 0x02;
    /// Unmanaged thiscall
    pub const THISCALL: u8 = 0x03;
    /// Unmanaged fastcall
    pub const FASTCALL: u8 = 0x04;
    /// Managed vararg
    pub const VARARG: u8 = 0x05;
}

#[allow(non_snake_case, dead_code)]
/// Leading bytes of the signature kinds that are not method signatures
pub mod SIGNATURE_HEADER {
    /// `FieldSig`
    pub const FIELD: u8 = 0x06;
    /// `LocalVarSig`
    pub const LOCAL_SIG: u8 = 0x07;
    /// `PropertySig`
    pub const PROPERTY: u8 = 0x08;
    /// `MethodSpec` instantiation
    pub const GENERIC_INST: u8 = 0x0A;
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    /// Flag bits of a method signature header; the low nibble is the calling convention
    pub struct SignatureFlags: u8 {
        /// A generic parameter count follows the header
        const GENERIC = 0x10;
        /// Instance method
        const HAS_THIS = 0x20;
        /// `this` is passed as an explicit first parameter
        const EXPLICIT_THIS = 0x40;
    }
}

impl SignatureFlags {
    /// Extract the flag bits from a raw header byte.
    #[must_use]
    pub fn from_header(header: u8) -> Self {
        Self::from_bits_truncate(header)
    }
}

/// The calling convention kind of a raw header byte.
#[must_use]
pub fn calling_convention(header: u8) -> u8 {
    header & CALLING_CONVENTION_MASK
}

/// A method signature as found in a `MemberRef` (II.23.2.2).
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRefSignature {
    /// The raw header byte
    pub header: u8,
    /// Number of generic parameters, 0 for non-generic methods
    pub generic_param_count: u32,
    /// Return type
    pub return_type: TypeDescriptor,
    /// Fixed parameters, the sentinel excluded
    pub params: Vec<TypeDescriptor>,
    /// Parameters after the sentinel of a vararg call site
    pub vararg_params: Vec<TypeDescriptor>,
}

impl MethodRefSignature {
    /// Flag bits of the header.
    #[must_use]
    pub fn flags(&self) -> SignatureFlags {
        SignatureFlags::from_header(self.header)
    }

    /// Returns `true` for the vararg calling convention.
    #[must_use]
    pub fn is_vararg(&self) -> bool {
        calling_convention(self.header) == CALLING_CONVENTION::VARARG
    }
}

/// A `StandAloneSig` blob that describes a call site (II.23.2.3).
#[derive(Debug, Clone, PartialEq)]
pub struct StandAloneSignature {
    /// The raw header byte
    pub header: u8,
    /// Return type
    pub return_type: TypeDescriptor,
    /// Fixed parameters, the sentinel excluded
    pub params: Vec<TypeDescriptor>,
    /// Parameters after the sentinel of a vararg call site
    pub vararg_params: Vec<TypeDescriptor>,
}

/// A field or method signature read from a `MemberRef`, discriminated by its header.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberRefSignature {
    /// A `FieldSig`
    Field(TypeDescriptor),
    /// A `MethodRefSig`
    Method(MethodRefSignature),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_parts() {
        let header = 0x30;
        let flags = SignatureFlags::from_header(header);
        assert!(flags.contains(SignatureFlags::GENERIC | SignatureFlags::HAS_THIS));
        assert!(!flags.contains(SignatureFlags::EXPLICIT_THIS));
        assert_eq!(calling_convention(header), CALLING_CONVENTION::DEFAULT);
        assert_eq!(calling_convention(0x25), CALLING_CONVENTION::VARARG);
    }
}
