//! Handles and already-loaded definitions of an image.
//!
//! Definitions are built by the loader before any signature is decoded. Their signature
//! slots (`return_type`, `ParamDetail::parameter_type`, `field_type`) start out empty and
//! are filled with indices into the owning image's type cache by the signature readers.

use std::fmt;

use crate::metadata::{token::Token, typesystem::TypeKind};

/// Identifier of a loaded image, allocated by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u32);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image#{}", self.0)
    }
}

/// A type definition, addressed by image and 0-based `TypeDef` index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeHandle {
    /// Owning image
    pub image: ImageId,
    /// 0-based index into the image's type definitions
    pub index: u32,
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:type#{}", self.image, self.index)
    }
}

/// A method definition, addressed by image and 0-based `MethodDef` index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MethodHandle {
    /// Owning image
    pub image: ImageId,
    /// 0-based index into the image's method definitions
    pub index: u32,
}

impl fmt::Display for MethodHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:method#{}", self.image, self.index)
    }
}

/// A field definition, addressed by image and 0-based `Field` index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldHandle {
    /// Owning image
    pub image: ImageId,
    /// 0-based index into the image's field definitions
    pub index: u32,
}

/// A type defined in an image.
#[derive(Clone, Debug)]
pub struct TypeDefinition {
    /// `TypeDef` token
    pub token: Token,
    /// Simple name
    pub name: String,
    /// Namespace, empty for nested types
    pub namespace: String,
    /// Derives from `System.ValueType` or `System.Enum`
    pub is_value_type: bool,
    /// Underlying primitive for enums
    pub enum_underlying: Option<TypeKind>,
    /// Index of the enclosing type for nested types
    pub enclosing: Option<u32>,
    /// Indices of the nested types, in declaration order
    pub nested_types: Vec<u32>,
    /// Indices of the declared methods
    pub methods: Vec<u32>,
    /// Indices of the declared fields
    pub fields: Vec<u32>,
    /// Index of the generic container, if the type is generic
    pub generic_container: Option<u32>,
    /// Type cache index of the by-value descriptor of this type
    pub byval_type: usize,
}

impl TypeDefinition {
    /// `Namespace.Name`, or just `Name` without a namespace.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

/// A parameter slot of a method definition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamDetail {
    /// Parameter name
    pub name: String,
    /// 0-based position; assigned when the signature is read
    pub index: u32,
    /// Type cache index of the parameter type; `None` until the signature is read
    pub parameter_type: Option<usize>,
}

/// A method defined in an image.
#[derive(Clone, Debug)]
pub struct MethodDefinition {
    /// `MethodDef` token
    pub token: Token,
    /// Method name
    pub name: String,
    /// Index of the declaring type
    pub declaring_type: u32,
    /// Offset of the `MethodDefSig` in the blob heap
    pub signature: u32,
    /// Number of parameters recorded in the `Param` table
    pub parameter_count: u32,
    /// Index of the generic container, if the method is generic
    pub generic_container: Option<u32>,
    /// Type cache index of the return type; `None` until the signature is read
    pub return_type: Option<usize>,
    /// Parameter slots
    pub params: Vec<ParamDetail>,
}

/// A field defined in an image.
#[derive(Clone, Debug)]
pub struct FieldDefinition {
    /// `Field` token
    pub token: Token,
    /// Field name
    pub name: String,
    /// Index of the declaring type
    pub declaring_type: u32,
    /// Offset of the `FieldSig` in the blob heap
    pub signature: u32,
    /// Type cache index of the field type; `None` until the signature is read
    pub field_type: Option<usize>,
}
