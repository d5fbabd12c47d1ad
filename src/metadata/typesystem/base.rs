//! Type descriptors produced by the signature decoder.
//!
//! A [`TypeDescriptor`] is a [`TypeKind`] plus the two pieces of state that custom
//! modifiers and `BYREF` leave behind: the number of modifiers that prefixed the type and
//! whether it is passed by reference. Every recursive payload is boxed and owned by its
//! parent; array bounds and generic arguments are owned vectors.

use std::fmt;

use crate::metadata::typesystem::{GenericParamRef, TypeHandle};

#[allow(non_snake_case, dead_code, missing_docs)]
/// Element type tags used in signature blobs (II.23.1.16)
pub mod ELEMENT_TYPE {
    // Marks end of a list
    pub const END: u8 = 0x00;
    pub const VOID: u8 = 0x01;
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0a;
    pub const U8: u8 = 0x0b;
    pub const R4: u8 = 0x0c;
    pub const R8: u8 = 0x0d;
    pub const STRING: u8 = 0x0e;
    // Followed by type
    pub const PTR: u8 = 0x0f;
    // Followed by type
    pub const BYREF: u8 = 0x10;
    // Followed by TypeDefOrRefOrSpec coded index
    pub const VALUETYPE: u8 = 0x11;
    // Followed by TypeDefOrRefOrSpec coded index
    pub const CLASS: u8 = 0x12;
    // Generic parameter of a type, followed by its number
    pub const VAR: u8 = 0x13;
    // type rank boundsCount bound1 … loCount lo1 …
    pub const ARRAY: u8 = 0x14;
    // Followed by type type-arg-count type-1 ... type-n
    pub const GENERICINST: u8 = 0x15;
    pub const TYPEDBYREF: u8 = 0x16;
    // System.IntPtr
    pub const I: u8 = 0x18;
    // System.UIntPtr
    pub const U: u8 = 0x19;
    // Followed by full method signature
    pub const FNPTR: u8 = 0x1b;
    // System.Object
    pub const OBJECT: u8 = 0x1c;
    // Single-dim array with 0 lower bound
    pub const SZARRAY: u8 = 0x1d;
    // Generic parameter of a method, followed by its number
    pub const MVAR: u8 = 0x1e;
    // Required modifier, followed by a TypeDefOrRef coded index
    pub const CMOD_REQD: u8 = 0x1f;
    // Optional modifier, followed by a TypeDefOrRef coded index
    pub const CMOD_OPT: u8 = 0x20;
    // Implemented within the CLI
    pub const INTERNAL: u8 = 0x21;
    // Or'd with following element types
    pub const MODIFIER: u8 = 0x40;
    // Sentinel for vararg method signature
    pub const SENTINEL: u8 = 0x41;
    // Denotes a local variable that points at a pinned object
    pub const PINNED: u8 = 0x45;
}

/// Shape of a general (`ARRAY`) array.
///
/// `sizes` and `lower_bounds` may hold fewer entries than `rank`; missing entries are
/// unspecified. An absent list is always empty, never `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayShape {
    /// Element type
    pub element: Box<TypeDescriptor>,
    /// Number of dimensions
    pub rank: u32,
    /// Explicit sizes, in dimension order
    pub sizes: Vec<u32>,
    /// Explicit lower bounds, in dimension order
    pub lower_bounds: Vec<i32>,
}

/// A generic instantiation such as `List<int>`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericInstType {
    /// The generic type definition, always a class or value type
    pub base: Box<TypeDescriptor>,
    /// Type arguments in declaration order
    pub args: Vec<TypeDescriptor>,
}

/// The shape of a decoded type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// void
    Void,
    /// bool
    Boolean,
    /// UTF-16 code unit
    Char,
    /// signed 8bit integer
    I1,
    /// unsigned 8bit integer
    U1,
    /// signed 16bit integer
    I2,
    /// unsigned 16bit integer
    U2,
    /// signed 32bit integer
    I4,
    /// unsigned 32bit integer
    U4,
    /// signed 64bit integer
    I8,
    /// unsigned 64bit integer
    U8,
    /// 32bit floating-point
    R4,
    /// 64bit floating-point
    R8,
    /// System.String
    String,
    /// Unmanaged pointer
    Ptr(Box<TypeDescriptor>),
    /// A value type definition
    ValueType(TypeHandle),
    /// A class definition
    Class(TypeHandle),
    /// Generic parameter of the enclosing type
    Var(GenericParamRef),
    /// Multi dimensional array
    Array(ArrayShape),
    /// Generic instantiation
    GenericInst(GenericInstType),
    /// System.TypedReference
    TypedByRef,
    /// Native signed integer
    I,
    /// Native unsigned integer
    U,
    /// System.Object
    Object,
    /// Single dimension, zero based array
    SzArray(Box<TypeDescriptor>),
    /// Generic parameter of the enclosing method
    MVar(GenericParamRef),
    /// Boundary between fixed and vararg parameters
    Sentinel,
    /// Pinned local
    Pinned(Box<TypeDescriptor>),
}

impl TypeKind {
    /// Map a primitive element type tag to its kind, `None` for tags with a payload.
    #[must_use]
    pub fn from_primitive(tag: u8) -> Option<TypeKind> {
        Some(match tag {
            ELEMENT_TYPE::VOID => TypeKind::Void,
            ELEMENT_TYPE::BOOLEAN => TypeKind::Boolean,
            ELEMENT_TYPE::CHAR => TypeKind::Char,
            ELEMENT_TYPE::I1 => TypeKind::I1,
            ELEMENT_TYPE::U1 => TypeKind::U1,
            ELEMENT_TYPE::I2 => TypeKind::I2,
            ELEMENT_TYPE::U2 => TypeKind::U2,
            ELEMENT_TYPE::I4 => TypeKind::I4,
            ELEMENT_TYPE::U4 => TypeKind::U4,
            ELEMENT_TYPE::I8 => TypeKind::I8,
            ELEMENT_TYPE::U8 => TypeKind::U8,
            ELEMENT_TYPE::R4 => TypeKind::R4,
            ELEMENT_TYPE::R8 => TypeKind::R8,
            ELEMENT_TYPE::STRING => TypeKind::String,
            ELEMENT_TYPE::TYPEDBYREF => TypeKind::TypedByRef,
            ELEMENT_TYPE::I => TypeKind::I,
            ELEMENT_TYPE::U => TypeKind::U,
            ELEMENT_TYPE::OBJECT => TypeKind::Object,
            _ => return None,
        })
    }

    /// The element type tag this kind is encoded with.
    #[must_use]
    pub fn element_type(&self) -> u8 {
        match self {
            TypeKind::Void => ELEMENT_TYPE::VOID,
            TypeKind::Boolean => ELEMENT_TYPE::BOOLEAN,
            TypeKind::Char => ELEMENT_TYPE::CHAR,
            TypeKind::I1 => ELEMENT_TYPE::I1,
            TypeKind::U1 => ELEMENT_TYPE::U1,
            TypeKind::I2 => ELEMENT_TYPE::I2,
            TypeKind::U2 => ELEMENT_TYPE::U2,
            TypeKind::I4 => ELEMENT_TYPE::I4,
            TypeKind::U4 => ELEMENT_TYPE::U4,
            TypeKind::I8 => ELEMENT_TYPE::I8,
            TypeKind::U8 => ELEMENT_TYPE::U8,
            TypeKind::R4 => ELEMENT_TYPE::R4,
            TypeKind::R8 => ELEMENT_TYPE::R8,
            TypeKind::String => ELEMENT_TYPE::STRING,
            TypeKind::Ptr(_) => ELEMENT_TYPE::PTR,
            TypeKind::ValueType(_) => ELEMENT_TYPE::VALUETYPE,
            TypeKind::Class(_) => ELEMENT_TYPE::CLASS,
            TypeKind::Var(_) => ELEMENT_TYPE::VAR,
            TypeKind::Array(_) => ELEMENT_TYPE::ARRAY,
            TypeKind::GenericInst(_) => ELEMENT_TYPE::GENERICINST,
            TypeKind::TypedByRef => ELEMENT_TYPE::TYPEDBYREF,
            TypeKind::I => ELEMENT_TYPE::I,
            TypeKind::U => ELEMENT_TYPE::U,
            TypeKind::Object => ELEMENT_TYPE::OBJECT,
            TypeKind::SzArray(_) => ELEMENT_TYPE::SZARRAY,
            TypeKind::MVar(_) => ELEMENT_TYPE::MVAR,
            TypeKind::Sentinel => ELEMENT_TYPE::SENTINEL,
            TypeKind::Pinned(_) => ELEMENT_TYPE::PINNED,
        }
    }
}

/// A decoded type: its shape, the by-reference flag and the custom modifier count.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// The shape of the type
    pub kind: TypeKind,
    /// Passed by reference (`BYREF` prefix)
    pub by_ref: bool,
    /// Number of `CMOD_REQD`/`CMOD_OPT` prefixes that preceded the type
    pub modifiers: u32,
}

impl TypeDescriptor {
    /// A by-value descriptor without modifiers.
    #[must_use]
    pub fn new(kind: TypeKind) -> Self {
        TypeDescriptor {
            kind,
            by_ref: false,
            modifiers: 0,
        }
    }

    /// Returns `true` for the vararg boundary marker.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        matches!(self.kind, TypeKind::Sentinel)
    }

    /// The type definition this descriptor names, looking through a generic instantiation.
    #[must_use]
    pub fn type_handle(&self) -> Option<TypeHandle> {
        match &self.kind {
            TypeKind::Class(handle) | TypeKind::ValueType(handle) => Some(*handle),
            TypeKind::GenericInst(inst) => inst.base.type_handle(),
            _ => None,
        }
    }

    /// Structural equality as used when matching a member reference against a definition.
    ///
    /// Generic parameters compare by kind (`VAR` vs `MVAR`) and position only, so a
    /// reference decoded without a generic context matches the resolved definition.
    /// Custom modifier counts are not compared.
    #[must_use]
    pub fn signature_eq(&self, other: &TypeDescriptor) -> bool {
        if self.by_ref != other.by_ref {
            return false;
        }

        match (&self.kind, &other.kind) {
            (TypeKind::Var(a), TypeKind::Var(b)) | (TypeKind::MVar(a), TypeKind::MVar(b)) => {
                a.number() == b.number()
            }
            (TypeKind::Ptr(a), TypeKind::Ptr(b))
            | (TypeKind::SzArray(a), TypeKind::SzArray(b))
            | (TypeKind::Pinned(a), TypeKind::Pinned(b)) => a.signature_eq(b),
            (TypeKind::Array(a), TypeKind::Array(b)) => {
                a.rank == b.rank
                    && a.sizes == b.sizes
                    && a.lower_bounds == b.lower_bounds
                    && a.element.signature_eq(&b.element)
            }
            (TypeKind::GenericInst(a), TypeKind::GenericInst(b)) => {
                a.base.signature_eq(&b.base)
                    && a.args.len() == b.args.len()
                    && a.args.iter().zip(&b.args).all(|(x, y)| x.signature_eq(y))
            }
            (a, b) => a == b,
        }
    }
}

impl From<TypeKind> for TypeDescriptor {
    fn from(kind: TypeKind) -> Self {
        TypeDescriptor::new(kind)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Void => write!(f, "void")?,
            TypeKind::Boolean => write!(f, "bool")?,
            TypeKind::Char => write!(f, "char")?,
            TypeKind::I1 => write!(f, "int8")?,
            TypeKind::U1 => write!(f, "uint8")?,
            TypeKind::I2 => write!(f, "int16")?,
            TypeKind::U2 => write!(f, "uint16")?,
            TypeKind::I4 => write!(f, "int32")?,
            TypeKind::U4 => write!(f, "uint32")?,
            TypeKind::I8 => write!(f, "int64")?,
            TypeKind::U8 => write!(f, "uint64")?,
            TypeKind::R4 => write!(f, "float32")?,
            TypeKind::R8 => write!(f, "float64")?,
            TypeKind::String => write!(f, "string")?,
            TypeKind::Ptr(inner) => write!(f, "{inner}*")?,
            TypeKind::ValueType(handle) => write!(f, "valuetype {handle}")?,
            TypeKind::Class(handle) => write!(f, "class {handle}")?,
            TypeKind::Var(param) => write!(f, "!{}", param.number())?,
            TypeKind::MVar(param) => write!(f, "!!{}", param.number())?,
            TypeKind::Array(shape) => write!(f, "{}[rank {}]", shape.element, shape.rank)?,
            TypeKind::GenericInst(inst) => {
                write!(f, "{}<", inst.base)?;
                for (i, arg) in inst.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")?;
            }
            TypeKind::TypedByRef => write!(f, "typedref")?,
            TypeKind::I => write!(f, "native int")?,
            TypeKind::U => write!(f, "native uint")?,
            TypeKind::Object => write!(f, "object")?,
            TypeKind::SzArray(inner) => write!(f, "{inner}[]")?,
            TypeKind::Sentinel => write!(f, "...")?,
            TypeKind::Pinned(inner) => write!(f, "{inner} pinned")?,
        }

        if self.by_ref {
            write!(f, "&")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::typesystem::{GenericContainerHandle, GenericParamHandle, ImageId};

    #[test]
    fn primitive_tags_round_trip() {
        for tag in 0x01..=0x1c_u8 {
            if let Some(kind) = TypeKind::from_primitive(tag) {
                assert_eq!(kind.element_type(), tag);
            }
        }
        assert_eq!(TypeKind::from_primitive(ELEMENT_TYPE::CLASS), None);
        assert_eq!(TypeKind::from_primitive(ELEMENT_TYPE::SZARRAY), None);
    }

    #[test]
    fn signature_eq_ignores_generic_binding() {
        let resolved = TypeDescriptor::new(TypeKind::Var(GenericParamRef::Resolved(
            GenericParamHandle {
                container: GenericContainerHandle {
                    image: ImageId(1),
                    index: 0,
                },
                number: 1,
            },
        )));
        let pending = TypeDescriptor::new(TypeKind::Var(GenericParamRef::Unresolved(1)));
        let other = TypeDescriptor::new(TypeKind::MVar(GenericParamRef::Unresolved(1)));

        assert!(resolved.signature_eq(&pending));
        assert!(!resolved.signature_eq(&other));
        assert_ne!(resolved, pending);
    }

    #[test]
    fn signature_eq_checks_by_ref_and_structure() {
        let int_array = TypeDescriptor::new(TypeKind::SzArray(Box::new(TypeKind::I4.into())));
        let uint_array = TypeDescriptor::new(TypeKind::SzArray(Box::new(TypeKind::U4.into())));
        assert!(int_array.signature_eq(&int_array.clone()));
        assert!(!int_array.signature_eq(&uint_array));

        let mut by_ref = int_array.clone();
        by_ref.by_ref = true;
        assert!(!int_array.signature_eq(&by_ref));

        let mut modified = int_array.clone();
        modified.modifiers = 2;
        assert!(int_array.signature_eq(&modified));
    }

    #[test]
    fn display() {
        let mut ty = TypeDescriptor::new(TypeKind::SzArray(Box::new(TypeKind::String.into())));
        ty.by_ref = true;
        assert_eq!(ty.to_string(), "string[]&");
    }
}
