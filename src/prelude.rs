//! # sigscope Prelude
//!
//! The types needed to load images, decode signatures, resolve tokens and construct custom
//! attributes, importable with a single glob.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all sigscope operations
pub use crate::Error;

/// The result type used throughout sigscope
pub use crate::Result;

/// Low-level byte cursor
pub use crate::Parser;

// ================================================================================================
// Images and Loading
// ================================================================================================

pub use crate::metadata::{
    builder::ImageBuilder, config::DecoderConfig, image::Image, registry::AssemblyRegistry,
};

// ================================================================================================
// Tables and Tokens
// ================================================================================================

pub use crate::metadata::{
    tables::{CodedIndexType, TableId},
    token::Token,
};

// ================================================================================================
// Type System
// ================================================================================================

pub use crate::metadata::typesystem::{
    ArrayShape, GenericContext, GenericInstType, GenericParamRef, ImageId, MethodHandle,
    TypeDescriptor, TypeHandle, TypeKind, ELEMENT_TYPE,
};

// ================================================================================================
// Signatures and Resolution
// ================================================================================================

pub use crate::metadata::{
    resolver::{FieldRefInfo, MetadataResolver, MethodRefInfo},
    signatures::{
        decode_blob, write_compressed_int, write_compressed_uint, write_type_def_or_ref,
        BlobReader, MemberRefSignature, MethodRefSignature, SignatureFlags,
        StandAloneSignature,
    },
};

// ================================================================================================
// Custom Attributes
// ================================================================================================

pub use crate::metadata::customattributes::{AttributeRuntime, ManagedValue};
