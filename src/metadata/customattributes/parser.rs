//! Decoding of custom attribute blobs against a constructor signature.
//!
//! The fixed arguments are typed by the constructor's decoded parameters; named arguments
//! and `object`-typed values carry their own serialization tags. Values are materialized
//! through an [`AttributeRuntime`] as they are read, so nothing is buffered beyond one
//! argument list.

use log::{debug, trace};

use crate::{
    metadata::{
        customattributes::types::{
            AttributeRuntime, ManagedValue, CUSTOM_ATTRIBUTE_PROLOG, NAMED_ARG, NULL_ARRAY,
            NULL_STRING, SERIALIZATION_TYPE,
        },
        resolver::MetadataResolver,
        signatures::{decode_blob, BlobReader},
        typesystem::{MethodHandle, TypeDescriptor, TypeKind},
    },
    Result,
};

/// How one argument is laid out in the blob.
#[derive(Debug, Clone)]
enum ArgEncoding {
    /// Fixed-width little-endian value; enums use their underlying type
    Primitive(TypeKind),
    /// `SerString`
    String,
    /// Serialization tag followed by the value
    Boxed,
    /// `u32` count (or null marker) followed by the elements
    SzArray(Box<ArgType>),
}

/// The declared type of an argument and its encoding.
#[derive(Debug, Clone)]
struct ArgType {
    descriptor: TypeDescriptor,
    encoding: ArgEncoding,
}

impl ArgType {
    fn primitive(kind: TypeKind) -> Self {
        ArgType {
            descriptor: TypeDescriptor::new(kind.clone()),
            encoding: ArgEncoding::Primitive(kind),
        }
    }

    fn string() -> Self {
        ArgType {
            descriptor: TypeDescriptor::new(TypeKind::String),
            encoding: ArgEncoding::String,
        }
    }

    fn boxed() -> Self {
        ArgType {
            descriptor: TypeDescriptor::new(TypeKind::Object),
            encoding: ArgEncoding::Boxed,
        }
    }

    fn sz_array(element: ArgType) -> Self {
        ArgType {
            descriptor: TypeDescriptor::new(TypeKind::SzArray(Box::new(element.descriptor.clone()))),
            encoding: ArgEncoding::SzArray(Box::new(element)),
        }
    }
}

fn is_primitive_tag(tag: u8) -> bool {
    (SERIALIZATION_TYPE::BOOLEAN..=SERIALIZATION_TYPE::R8).contains(&tag)
}

/// Read a `SerString`; `None` for the null marker.
fn read_ser_string(reader: &mut BlobReader<'_>) -> Result<Option<String>> {
    if reader.peek_u8()? == NULL_STRING {
        reader.read_u8()?;
        return Ok(None);
    }

    reader.parser().read_compressed_string_utf8().map(Some)
}

fn read_primitive<O>(reader: &mut BlobReader<'_>, kind: &TypeKind) -> Result<ManagedValue<O>> {
    let parser = reader.parser();
    let value = match kind {
        TypeKind::Boolean => ManagedValue::Boolean(parser.read_le::<u8>()? != 0),
        TypeKind::Char => ManagedValue::Char(parser.read_le::<u16>()?),
        TypeKind::I1 => ManagedValue::I1(parser.read_le::<i8>()?),
        TypeKind::U1 => ManagedValue::U1(parser.read_le::<u8>()?),
        TypeKind::I2 => ManagedValue::I2(parser.read_le::<i16>()?),
        TypeKind::U2 => ManagedValue::U2(parser.read_le::<u16>()?),
        TypeKind::I4 => ManagedValue::I4(parser.read_le::<i32>()?),
        TypeKind::U4 => ManagedValue::U4(parser.read_le::<u32>()?),
        TypeKind::I8 => ManagedValue::I8(parser.read_le::<i64>()?),
        TypeKind::U8 => ManagedValue::U8(parser.read_le::<u64>()?),
        TypeKind::R4 => ManagedValue::R4(parser.read_le::<f32>()?),
        TypeKind::R8 => ManagedValue::R8(parser.read_le::<f64>()?),
        other => {
            return Err(not_supported_error!(
                "Attribute argument of type {}",
                TypeDescriptor::new(other.clone())
            ))
        }
    };
    Ok(value)
}

/// Split `Namespace.Name, Assembly, Version=...` into the type name and the assembly name.
fn split_type_name(name: &str) -> (&str, Option<&str>) {
    match name.split_once(',') {
        Some((type_name, rest)) => (
            type_name.trim(),
            rest.split(',').next().map(str::trim).filter(|s| !s.is_empty()),
        ),
        None => (name.trim(), None),
    }
}

impl MetadataResolver<'_> {
    /// Decode an attribute blob and apply it to `target`.
    ///
    /// The blob must start with the `0x0001` prolog. The fixed arguments are read according
    /// to the parameter types of `ctor` and passed to [`AttributeRuntime::invoke`]; after the
    /// constructor ran, each named argument is decoded and assigned through
    /// [`AttributeRuntime::set_field`] or [`AttributeRuntime::set_property`].
    ///
    /// # Errors
    /// - [`crate::Error::Malformed`] for a bad prolog, an unknown tag or discriminator, or a
    ///   null member name
    /// - [`crate::Error::OutOfBounds`] if the blob ends early
    /// - [`crate::Error::NotSupported`] for class-typed or `System.Type` arguments
    /// - [`crate::Error::Unresolved`] if the constructor signature was never decoded, or a
    ///   named enum type cannot be found
    /// - Every error the runtime reports
    pub fn construct_custom_attribute<R: AttributeRuntime>(
        &self,
        reader: &mut BlobReader<'_>,
        runtime: &R,
        target: &R::Object,
        ctor: MethodHandle,
    ) -> Result<()> {
        let prolog = reader.parser().read_le::<u16>()?;
        if prolog != CUSTOM_ATTRIBUTE_PROLOG {
            return Err(malformed_error!(
                "Invalid custom attribute prolog 0x{:04X}",
                prolog
            ));
        }

        let owner = self.image_for(ctor.image)?;
        let method = owner.method_def(ctor.index)?;

        let mut args = Vec::with_capacity(method.params.len());
        for param in &method.params {
            let type_index = param.parameter_type.ok_or_else(|| {
                unresolved_error!("Signature of {} was never decoded", method.name)
            })?;
            let arg_type = self.arg_type_for(owner.type_at(type_index)?)?;
            args.push(self.read_argument(reader, runtime, &arg_type)?);
        }

        debug!(
            "Invoking {} {} with {} fixed arguments",
            ctor,
            method.name,
            args.len()
        );
        runtime.invoke(ctor, target, args)?;

        let named_count = reader.parser().read_le::<u16>()?;
        for _ in 0..named_count {
            let kind = reader.read_u8()?;
            if kind != NAMED_ARG::FIELD && kind != NAMED_ARG::PROPERTY {
                return Err(malformed_error!(
                    "Invalid named argument discriminator 0x{:02X}",
                    kind
                ));
            }

            let tag = reader.read_u8()?;
            let arg_type = self.arg_type_from_tag(reader, tag, false)?;
            let name = read_ser_string(reader)?
                .ok_or_else(|| malformed_error!("Named argument without a name"))?;
            let value = self.read_argument(reader, runtime, &arg_type)?;

            trace!("Named argument {} ({})", name, arg_type.descriptor);
            if kind == NAMED_ARG::FIELD {
                runtime.set_field(target, &name, value)?;
            } else {
                runtime.set_property(target, &name, value)?;
            }
        }

        Ok(())
    }

    /// Apply the `CustomAttribute` row `row` of this image to `target`.
    ///
    /// Resolves the constructor, then runs
    /// [`MetadataResolver::construct_custom_attribute`] over the row's blob.
    ///
    /// # Errors
    /// Propagates constructor resolution and blob decoding failures.
    pub fn construct_custom_attribute_row<R: AttributeRuntime>(
        &self,
        row: u32,
        runtime: &R,
        target: &R::Object,
    ) -> Result<MethodHandle> {
        let attribute = self.image().tables().custom_attribute.get(row)?;
        let ctor = self.read_attribute_constructor(attribute.constructor)?.method;

        let mut reader = decode_blob(self.image(), attribute.value)?;
        self.construct_custom_attribute(&mut reader, runtime, target, ctor)?;
        Ok(ctor)
    }

    /// Map a constructor parameter type to its blob encoding.
    fn arg_type_for(&self, ty: &TypeDescriptor) -> Result<ArgType> {
        if ty.by_ref {
            return Err(not_supported_error!("By-ref attribute argument {}", ty));
        }

        match &ty.kind {
            TypeKind::Boolean
            | TypeKind::Char
            | TypeKind::I1
            | TypeKind::U1
            | TypeKind::I2
            | TypeKind::U2
            | TypeKind::I4
            | TypeKind::U4
            | TypeKind::I8
            | TypeKind::U8
            | TypeKind::R4
            | TypeKind::R8 => Ok(ArgType::primitive(ty.kind.clone())),
            TypeKind::String => Ok(ArgType::string()),
            TypeKind::Object => Ok(ArgType::boxed()),
            TypeKind::SzArray(element) => {
                let element = self.arg_type_for(element)?;
                if matches!(element.encoding, ArgEncoding::SzArray(_)) {
                    return Err(malformed_error!("Nested array attribute argument {}", ty));
                }
                Ok(ArgType::sz_array(element))
            }
            TypeKind::ValueType(handle) => {
                let image = self.image_for(handle.image)?;
                let definition = image.type_def(handle.index)?;
                match &definition.enum_underlying {
                    Some(underlying) => Ok(ArgType {
                        descriptor: ty.clone(),
                        encoding: ArgEncoding::Primitive(underlying.clone()),
                    }),
                    None => Err(not_supported_error!(
                        "Value type attribute argument {}",
                        definition.full_name()
                    )),
                }
            }
            _ => Err(not_supported_error!("Attribute argument of type {}", ty)),
        }
    }

    /// Map a serialization tag to an argument type, reading any trailing element tag or
    /// enum name. `boxed` is set when the tag follows a `TAGGED_OBJECT` value.
    fn arg_type_from_tag(
        &self,
        reader: &mut BlobReader<'_>,
        tag: u8,
        boxed: bool,
    ) -> Result<ArgType> {
        if is_primitive_tag(tag) {
            if let Some(kind) = TypeKind::from_primitive(tag) {
                return Ok(ArgType::primitive(kind));
            }
        }

        match tag {
            SERIALIZATION_TYPE::STRING => Ok(ArgType::string()),
            SERIALIZATION_TYPE::SZARRAY => {
                let element_tag = reader.read_u8()?;
                let element = match element_tag {
                    SERIALIZATION_TYPE::SZARRAY => {
                        return Err(malformed_error!("Nested array serialization type"))
                    }
                    SERIALIZATION_TYPE::TAGGED_OBJECT => ArgType::boxed(),
                    _ => self.arg_type_from_tag(reader, element_tag, boxed)?,
                };
                Ok(ArgType::sz_array(element))
            }
            SERIALIZATION_TYPE::TAGGED_OBJECT if !boxed => Ok(ArgType::boxed()),
            SERIALIZATION_TYPE::ENUM => {
                let name = read_ser_string(reader)?
                    .ok_or_else(|| malformed_error!("Enum argument without a type name"))?;
                self.enum_arg_type(&name)
            }
            SERIALIZATION_TYPE::TYPE => Err(not_supported_error!(
                "Serialization type 0x{:02X} in attribute argument",
                tag
            )),
            _ => Err(malformed_error!("Invalid serialization type 0x{:02X}", tag)),
        }
    }

    /// Look up the enum named by a serialized type name.
    fn enum_arg_type(&self, name: &str) -> Result<ArgType> {
        let (type_name, assembly) = split_type_name(name);
        if type_name.contains('+') {
            return Err(unresolved_error!("Nested enum type {}", type_name));
        }

        let handle = match assembly {
            Some(assembly) if assembly == self.image().name() => {
                self.image().find_type_by_full_name(type_name)
            }
            Some(assembly) => self
                .registry()
                .get_by_name(assembly)
                .ok_or_else(|| unresolved_error!("Assembly {} is not loaded", assembly))?
                .find_type_by_full_name(type_name),
            None => self
                .image()
                .find_type_by_full_name(type_name)
                .or_else(|| self.registry().find_type_by_full_name(type_name)),
        }
        .ok_or_else(|| unresolved_error!("Enum type {}", name))?;

        let image = self.image_for(handle.image)?;
        if image.type_def(handle.index)?.enum_underlying.is_none() {
            return Err(malformed_error!("{} is not an enum", type_name));
        }
        self.arg_type_for(&TypeDescriptor::new(TypeKind::ValueType(handle)))
    }

    fn read_argument<R: AttributeRuntime>(
        &self,
        reader: &mut BlobReader<'_>,
        runtime: &R,
        arg_type: &ArgType,
    ) -> Result<ManagedValue<R::Object>> {
        match &arg_type.encoding {
            ArgEncoding::Primitive(kind) => read_primitive(reader, kind),
            ArgEncoding::String => match read_ser_string(reader)? {
                Some(value) => Ok(ManagedValue::Object(runtime.new_string(&value)?)),
                None => Ok(ManagedValue::Null),
            },
            ArgEncoding::SzArray(element) => {
                let count = reader.parser().read_le::<u32>()?;
                if count == NULL_ARRAY {
                    return Ok(ManagedValue::Null);
                }

                let capacity = (count as usize).min(reader.parser().remaining());
                let mut items = Vec::with_capacity(capacity);
                for _ in 0..count {
                    items.push(self.read_argument(reader, runtime, element)?);
                }
                Ok(ManagedValue::Object(
                    runtime.new_array(&element.descriptor, items)?,
                ))
            }
            ArgEncoding::Boxed => {
                let tag = reader.read_u8()?;
                let inner = self.arg_type_from_tag(reader, tag, true)?;
                let value = self.read_argument(reader, runtime, &inner)?;
                match inner.encoding {
                    ArgEncoding::Primitive(_) => Ok(ManagedValue::Object(
                        runtime.box_value(&inner.descriptor, value)?,
                    )),
                    _ => Ok(value),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::registry::AssemblyRegistry,
        test::factories::metadata::customattributes::{
            attribute_image, Call, MockObject, MockRuntime, SAMPLE_CTOR_ENUM, SAMPLE_CTOR_INTS,
            SAMPLE_CTOR_NONE, SAMPLE_CTOR_OBJECT, SAMPLE_CTOR_STRING, SAMPLE_CTOR_TYPE,
        },
        Error,
    };

    fn construct(ctor: u32, blob: &[u8]) -> (Result<()>, Vec<Call>) {
        let registry = AssemblyRegistry::default();
        let (image, offset) = attribute_image(&registry, blob);
        let resolver = MetadataResolver::new(&image, &registry);
        let runtime = MockRuntime::default();

        let result = decode_blob(&image, offset).and_then(|mut reader| {
            resolver.construct_custom_attribute(
                &mut reader,
                &runtime,
                &MockObject::Target,
                image.method_handle(ctor),
            )
        });
        (result, runtime.calls())
    }

    #[test]
    fn string_constructor() {
        let (result, calls) = construct(
            SAMPLE_CTOR_STRING,
            &[0x01, 0x00, 0x05, b'h', b'e', b'l', b'l', b'o', 0x00, 0x00],
        );
        result.unwrap();
        assert_eq!(calls.len(), 1);
        let Call::Invoke(_, args) = &calls[0] else {
            panic!("expected invoke, got {:?}", calls[0]);
        };
        assert_eq!(
            args,
            &vec![ManagedValue::Object(MockObject::Str("hello".into()))]
        );
    }

    #[test]
    fn null_and_empty_strings() {
        let (result, calls) = construct(SAMPLE_CTOR_STRING, &[0x01, 0x00, 0xFF, 0x00, 0x00]);
        result.unwrap();
        assert_eq!(calls, vec![Call::Invoke(SAMPLE_CTOR_STRING, vec![ManagedValue::Null])]);

        let (result, calls) = construct(SAMPLE_CTOR_STRING, &[0x01, 0x00, 0x00, 0x00, 0x00]);
        result.unwrap();
        assert_eq!(
            calls,
            vec![Call::Invoke(
                SAMPLE_CTOR_STRING,
                vec![ManagedValue::Object(MockObject::Str(String::new()))]
            )]
        );
    }

    #[test]
    fn null_and_empty_arrays() {
        let (result, calls) = construct(
            SAMPLE_CTOR_INTS,
            &[0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00],
        );
        result.unwrap();
        assert_eq!(calls, vec![Call::Invoke(SAMPLE_CTOR_INTS, vec![ManagedValue::Null])]);

        let (result, calls) = construct(
            SAMPLE_CTOR_INTS,
            &[0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        );
        result.unwrap();
        assert_eq!(
            calls,
            vec![Call::Invoke(
                SAMPLE_CTOR_INTS,
                vec![ManagedValue::Object(MockObject::Array(Vec::new()))]
            )]
        );

        let (result, calls) = construct(
            SAMPLE_CTOR_INTS,
            &[
                0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0xFE, 0xFF, 0xFF,
                0xFF, 0x00, 0x00,
            ],
        );
        result.unwrap();
        assert_eq!(
            calls,
            vec![Call::Invoke(
                SAMPLE_CTOR_INTS,
                vec![ManagedValue::Object(MockObject::Array(vec![
                    ManagedValue::I4(7),
                    ManagedValue::I4(-2)
                ]))]
            )]
        );
    }

    #[test]
    fn enum_uses_underlying_width() {
        // AttributeTargets is an int32 enum
        let (result, calls) = construct(
            SAMPLE_CTOR_ENUM,
            &[0x01, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00],
        );
        result.unwrap();
        assert_eq!(calls, vec![Call::Invoke(SAMPLE_CTOR_ENUM, vec![ManagedValue::I4(4)])]);

        let (result, _) = construct(SAMPLE_CTOR_ENUM, &[0x01, 0x00, 0x04, 0x00]);
        assert!(matches!(result, Err(Error::OutOfBounds)));
    }

    #[test]
    fn object_arguments_are_boxed() {
        let (result, calls) = construct(
            SAMPLE_CTOR_OBJECT,
            &[0x01, 0x00, 0x08, 0x2A, 0x00, 0x00, 0x00, 0x00, 0x00],
        );
        result.unwrap();
        assert_eq!(
            calls,
            vec![Call::Invoke(
                SAMPLE_CTOR_OBJECT,
                vec![ManagedValue::Object(MockObject::Boxed(Box::new(
                    ManagedValue::I4(42)
                )))]
            )]
        );

        // Strings stay references
        let (result, calls) = construct(
            SAMPLE_CTOR_OBJECT,
            &[0x01, 0x00, 0x0E, 0x01, b'x', 0x00, 0x00],
        );
        result.unwrap();
        assert_eq!(
            calls,
            vec![Call::Invoke(
                SAMPLE_CTOR_OBJECT,
                vec![ManagedValue::Object(MockObject::Str("x".into()))]
            )]
        );

        let (result, _) = construct(SAMPLE_CTOR_OBJECT, &[0x01, 0x00, 0x50, 0x00, 0x00, 0x00]);
        assert!(result.unwrap_err().is_not_supported());
        let (result, _) = construct(SAMPLE_CTOR_OBJECT, &[0x01, 0x00, 0x51, 0x08, 0x00]);
        assert!(result.unwrap_err().is_malformed());
    }

    #[test]
    fn boxed_enum_argument() {
        // (object)Sample.Mode 3
        let mut blob = vec![0x01, 0x00, 0x55, 0x0B];
        blob.extend_from_slice(b"Sample.Mode");
        blob.extend_from_slice(&[0x03, 0x00, 0x00]);

        let (result, calls) = construct(SAMPLE_CTOR_OBJECT, &blob);
        result.unwrap();
        assert_eq!(
            calls,
            vec![Call::Invoke(
                SAMPLE_CTOR_OBJECT,
                vec![ManagedValue::Object(MockObject::Boxed(Box::new(
                    ManagedValue::U1(3)
                )))]
            )]
        );

        // (object)new Sample.Mode[] { 1, 2 }
        let mut blob = vec![0x01, 0x00, 0x1D, 0x55, 0x0B];
        blob.extend_from_slice(b"Sample.Mode");
        blob.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x01, 0x02, 0x00, 0x00]);
        let (result, calls) = construct(SAMPLE_CTOR_OBJECT, &blob);
        result.unwrap();
        let Call::Invoke(_, args) = &calls[0] else {
            panic!("expected invoke, got {:?}", calls[0]);
        };
        assert_eq!(
            args[0],
            ManagedValue::Object(MockObject::Array(vec![
                ManagedValue::U1(1),
                ManagedValue::U1(2)
            ]))
        );
    }

    #[test]
    fn named_arguments_are_written_back() {
        let mut blob = vec![0x01, 0x00, 0x03, 0x00];
        // field int32 Level = 3
        blob.extend_from_slice(&[0x53, 0x08, 0x05, b'L', b'e', b'v', b'e', b'l']);
        blob.extend_from_slice(&[0x03, 0x00, 0x00, 0x00]);
        // property string Text = "t"
        blob.extend_from_slice(&[0x54, 0x0E, 0x04, b'T', b'e', b'x', b't', 0x01, b't']);
        // property Sample.Mode Mode = 2
        blob.extend_from_slice(&[0x54, 0x55, 0x0B]);
        blob.extend_from_slice(b"Sample.Mode");
        blob.extend_from_slice(&[0x04, b'M', b'o', b'd', b'e', 0x02]);

        let (result, calls) = construct(SAMPLE_CTOR_NONE, &blob);
        result.unwrap();
        assert_eq!(
            calls,
            vec![
                Call::Invoke(SAMPLE_CTOR_NONE, Vec::new()),
                Call::Field("Level".into(), ManagedValue::I4(3)),
                Call::Property(
                    "Text".into(),
                    ManagedValue::Object(MockObject::Str("t".into()))
                ),
                Call::Property("Mode".into(), ManagedValue::U1(2)),
            ]
        );
    }

    #[test]
    fn named_enum_from_another_assembly() {
        let mut blob = vec![0x01, 0x00, 0x01, 0x00, 0x53, 0x55];
        let name = b"System.AttributeTargets, mscorlib, Version=4.0.0.0";
        blob.push(u8::try_from(name.len()).unwrap());
        blob.extend_from_slice(name);
        blob.extend_from_slice(&[0x01, b'T', 0x08, 0x00, 0x00, 0x00]);

        let (result, calls) = construct(SAMPLE_CTOR_NONE, &blob);
        result.unwrap();
        assert_eq!(calls[1], Call::Field("T".into(), ManagedValue::I4(8)));

        let mut blob = vec![0x01, 0x00, 0x01, 0x00, 0x53, 0x55, 0x0C];
        blob.extend_from_slice(b"Outer+Nested");
        let (result, _) = construct(SAMPLE_CTOR_NONE, &blob);
        assert!(matches!(result, Err(Error::Unresolved(_))));
    }

    #[test]
    fn runtime_failures_propagate() {
        let mut blob = vec![0x01, 0x00, 0x01, 0x00];
        blob.extend_from_slice(&[0x54, 0x02, 0x07, b'M', b'i', b's', b's', b'i', b'n', b'g', 0x01]);
        let (result, _) = construct(SAMPLE_CTOR_NONE, &blob);
        assert!(matches!(result, Err(Error::Runtime(_))));
    }

    #[test]
    fn malformed_blobs() {
        let (result, calls) = construct(SAMPLE_CTOR_NONE, &[0x02, 0x00, 0x00, 0x00]);
        assert!(result.unwrap_err().is_malformed());
        assert!(calls.is_empty());

        // unknown discriminator
        let (result, _) = construct(SAMPLE_CTOR_NONE, &[0x01, 0x00, 0x01, 0x00, 0x52, 0x08]);
        assert!(result.unwrap_err().is_malformed());

        // null member name
        let (result, _) = construct(
            SAMPLE_CTOR_NONE,
            &[0x01, 0x00, 0x01, 0x00, 0x53, 0x08, 0xFF, 0x00, 0x00, 0x00, 0x00],
        );
        assert!(result.unwrap_err().is_malformed());

        // missing named argument count
        let (result, _) = construct(SAMPLE_CTOR_NONE, &[0x01, 0x00]);
        assert!(matches!(result, Err(Error::OutOfBounds)));
    }

    #[test]
    fn class_arguments_are_not_supported() {
        let (result, calls) = construct(SAMPLE_CTOR_TYPE, &[0x01, 0x00, 0x00, 0x00, 0x00]);
        assert!(result.unwrap_err().is_not_supported());
        assert!(calls.is_empty());
    }

    #[test]
    fn construct_from_row() {
        let registry = AssemblyRegistry::default();
        let (image, _) = attribute_image(&registry, &[]);
        let resolver = MetadataResolver::new(&image, &registry);
        let runtime = MockRuntime::default();

        // Row 1 applies ObsoleteAttribute("old") through a MemberRef into mscorlib
        let ctor = resolver
            .construct_custom_attribute_row(1, &runtime, &MockObject::Target)
            .unwrap();
        assert_eq!(ctor.index, 6);
        assert_ne!(ctor.image, image.id());
        assert_eq!(
            runtime.calls(),
            vec![Call::Invoke(
                6,
                vec![ManagedValue::Object(MockObject::Str("old".into()))]
            )]
        );

        assert!(resolver
            .construct_custom_attribute_row(9, &runtime, &MockObject::Target)
            .is_err());
    }
}
