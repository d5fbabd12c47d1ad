//! The type model shared by the decoder, the resolvers and the custom attribute decoder.
//!
//! - [`TypeDescriptor`] / [`TypeKind`] - decoded type trees
//! - [`GenericContext`] / [`GenericParamRef`] - generic parameter binding
//! - [`TypeDefinition`], [`MethodDefinition`], [`FieldDefinition`] - already-loaded
//!   definitions that tokens resolve to
//! - [`ELEMENT_TYPE`] - signature element type tags

mod base;
mod definitions;
mod generics;

pub use base::{ArrayShape, GenericInstType, TypeDescriptor, TypeKind, ELEMENT_TYPE};
pub use definitions::{
    FieldDefinition, FieldHandle, ImageId, MethodDefinition, MethodHandle, ParamDetail,
    TypeDefinition, TypeHandle,
};
pub use generics::{
    bind_generic_params, GenericContainer, GenericContainerHandle, GenericContext, GenericOwner,
    GenericParamHandle, GenericParamRef,
};
