//! Values handed to and objects created by the runtime during attribute construction.

use crate::{
    metadata::typesystem::{MethodHandle, TypeDescriptor},
    Result,
};

/// One decoded argument: a primitive in its natural width, a reference to a runtime
/// object, or a null reference.
///
/// Enum arguments arrive as their underlying integral value.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagedValue<O> {
    /// bool
    Boolean(bool),
    /// UTF-16 code unit
    Char(u16),
    /// signed 8bit integer
    I1(i8),
    /// unsigned 8bit integer
    U1(u8),
    /// signed 16bit integer
    I2(i16),
    /// unsigned 16bit integer
    U2(u16),
    /// signed 32bit integer
    I4(i32),
    /// unsigned 32bit integer
    U4(u32),
    /// signed 64bit integer
    I8(i64),
    /// unsigned 64bit integer
    U8(u64),
    /// 32bit floating-point
    R4(f32),
    /// 64bit floating-point
    R8(f64),
    /// A string, array or boxed value created by the runtime
    Object(O),
    /// A null string or null array
    Null,
}

/// The object model attribute construction runs against.
///
/// The decoder only decodes the blob; creating strings, arrays and boxes, running the
/// constructor and assigning named members is up to the implementor. Every failure an
/// implementor reports is propagated unchanged.
pub trait AttributeRuntime {
    /// Handle of a runtime object
    type Object: Clone;

    /// Create a string object.
    ///
    /// # Errors
    /// Implementation defined.
    fn new_string(&self, value: &str) -> Result<Self::Object>;

    /// Create a single-dimension array of `element` holding `items`.
    ///
    /// # Errors
    /// Implementation defined.
    fn new_array(
        &self,
        element: &TypeDescriptor,
        items: Vec<ManagedValue<Self::Object>>,
    ) -> Result<Self::Object>;

    /// Box a primitive argument of an `object`-typed parameter.
    ///
    /// # Errors
    /// Implementation defined.
    fn box_value(
        &self,
        ty: &TypeDescriptor,
        value: ManagedValue<Self::Object>,
    ) -> Result<Self::Object>;

    /// Run the attribute constructor on `target`.
    ///
    /// # Errors
    /// Implementation defined.
    fn invoke(
        &self,
        ctor: MethodHandle,
        target: &Self::Object,
        args: Vec<ManagedValue<Self::Object>>,
    ) -> Result<()>;

    /// Assign a named field argument.
    ///
    /// # Errors
    /// Implementation defined, typically [`crate::Error::Runtime`] for an unknown field.
    fn set_field(
        &self,
        target: &Self::Object,
        name: &str,
        value: ManagedValue<Self::Object>,
    ) -> Result<()>;

    /// Assign a named property argument.
    ///
    /// # Errors
    /// Implementation defined, typically [`crate::Error::Runtime`] for an unknown property.
    fn set_property(
        &self,
        target: &Self::Object,
        name: &str,
        value: ManagedValue<Self::Object>,
    ) -> Result<()>;
}

/// Leading two bytes of every attribute blob
pub const CUSTOM_ATTRIBUTE_PROLOG: u16 = 0x0001;

/// Null marker of a serialized string
pub const NULL_STRING: u8 = 0xFF;

/// Null marker of a serialized array count
pub const NULL_ARRAY: u32 = 0xFFFF_FFFF;

#[allow(non_snake_case)]
/// Discriminator of a named argument
pub mod NAMED_ARG {
    /// Assigns a field
    pub const FIELD: u8 = 0x53;
    /// Assigns a property
    pub const PROPERTY: u8 = 0x54;
}

/// `CorSerializationType` tags of named and boxed arguments (II.23.3)
#[allow(non_snake_case, missing_docs)]
pub mod SERIALIZATION_TYPE {
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0A;
    pub const U8: u8 = 0x0B;
    pub const R4: u8 = 0x0C;
    pub const R8: u8 = 0x0D;
    pub const STRING: u8 = 0x0E;
    pub const SZARRAY: u8 = 0x1D;
    pub const TYPE: u8 = 0x50;
    pub const TAGGED_OBJECT: u8 = 0x51;
    pub const ENUM: u8 = 0x55;
}
