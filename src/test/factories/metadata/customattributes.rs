//! Factory methods for custom attribute test data.
//!
//! `Attrs` declares `Sample.SampleAttribute` with one constructor per argument shape, an
//! unsigned 8bit enum `Sample.Mode`, and one `CustomAttribute` row that applies
//! `System.ObsoleteAttribute("old")` from the crafted base library.

use std::{cell::RefCell, sync::Arc};

use crate::{
    metadata::{
        customattributes::{AttributeRuntime, ManagedValue},
        image::Image,
        registry::AssemblyRegistry,
        signatures::write_type_def_or_ref,
        tables::TableId,
        typesystem::{MethodHandle, TypeDescriptor, TypeKind},
    },
    test::factories::metadata::images::{app, load_corlib},
    Error, Result,
};

/// `.ctor(string)`
pub const SAMPLE_CTOR_STRING: u32 = 0;
/// `.ctor(int32[])`
pub const SAMPLE_CTOR_INTS: u32 = 1;
/// `.ctor(object)`
pub const SAMPLE_CTOR_OBJECT: u32 = 2;
/// `.ctor(System.AttributeTargets)`
pub const SAMPLE_CTOR_ENUM: u32 = 3;
/// `.ctor()`
pub const SAMPLE_CTOR_NONE: u32 = 4;
/// `.ctor(class System.Object)`
pub const SAMPLE_CTOR_TYPE: u32 = 5;

/// Load mscorlib and the `Attrs` image into `registry`, adding `blob` to its blob heap.
///
/// Returns the image and the heap offset of `blob`.
pub fn attribute_image(registry: &AssemblyRegistry, blob: &[u8]) -> (Arc<Image>, u32) {
    load_corlib(registry);

    let (mut builder, mscorlib) = app("Attrs");
    let targets = builder
        .add_type_ref(mscorlib, "System", "AttributeTargets")
        .unwrap();
    let object = builder.add_type_ref(mscorlib, "System", "Object").unwrap();
    let obsolete = builder
        .add_type_ref(mscorlib, "System", "ObsoleteAttribute")
        .unwrap();

    let sample = builder.add_type("Sample", "SampleAttribute");
    builder
        .add_method(sample, ".ctor", &[0x20, 0x01, 0x01, 0x0E], &["message"])
        .unwrap();
    builder
        .add_method(sample, ".ctor", &[0x20, 0x01, 0x01, 0x1D, 0x08], &["values"])
        .unwrap();
    builder
        .add_method(sample, ".ctor", &[0x20, 0x01, 0x01, 0x1C], &["value"])
        .unwrap();

    let mut enum_sig = vec![0x20, 0x01, 0x01, 0x11];
    write_type_def_or_ref(TableId::TypeRef, targets.row(), &mut enum_sig).unwrap();
    builder
        .add_method(sample, ".ctor", &enum_sig, &["targets"])
        .unwrap();

    builder
        .add_method(sample, ".ctor", &[0x20, 0x00, 0x01], &[])
        .unwrap();

    let mut class_sig = vec![0x20, 0x01, 0x01, 0x12];
    write_type_def_or_ref(TableId::TypeRef, object.row(), &mut class_sig).unwrap();
    builder
        .add_method(sample, ".ctor", &class_sig, &["type"])
        .unwrap();

    builder.add_enum("Sample", "Mode", TypeKind::U1).unwrap();

    let obsolete_ctor = builder
        .add_member_ref(obsolete, ".ctor", &[0x20, 0x01, 0x01, 0x0E])
        .unwrap();
    builder
        .add_custom_attribute(
            sample,
            obsolete_ctor,
            &[0x01, 0x00, 0x03, b'o', b'l', b'd', 0x00, 0x00],
        )
        .unwrap();

    let offset = builder.add_blob(blob).unwrap();
    (registry.load(builder).unwrap(), offset)
}

/// Objects handed out by [`MockRuntime`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockObject {
    /// The attribute instance under construction
    Target,
    /// A created string
    Str(String),
    /// A created array
    Array(Vec<ManagedValue<MockObject>>),
    /// A boxed primitive
    Boxed(Box<ManagedValue<MockObject>>),
}

/// One observable runtime action.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// Constructor invocation, by method index
    Invoke(u32, Vec<ManagedValue<MockObject>>),
    /// Field assignment
    Field(String, ManagedValue<MockObject>),
    /// Property assignment
    Property(String, ManagedValue<MockObject>),
}

/// Records constructor invocations and member writes; rejects a property named `Missing`.
#[derive(Debug, Default)]
pub struct MockRuntime {
    calls: RefCell<Vec<Call>>,
}

impl MockRuntime {
    /// Everything recorded so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl AttributeRuntime for MockRuntime {
    type Object = MockObject;

    fn new_string(&self, value: &str) -> Result<MockObject> {
        Ok(MockObject::Str(value.to_string()))
    }

    fn new_array(
        &self,
        _element: &TypeDescriptor,
        items: Vec<ManagedValue<MockObject>>,
    ) -> Result<MockObject> {
        Ok(MockObject::Array(items))
    }

    fn box_value(
        &self,
        _ty: &TypeDescriptor,
        value: ManagedValue<MockObject>,
    ) -> Result<MockObject> {
        Ok(MockObject::Boxed(Box::new(value)))
    }

    fn invoke(
        &self,
        ctor: MethodHandle,
        _target: &MockObject,
        args: Vec<ManagedValue<MockObject>>,
    ) -> Result<()> {
        self.calls.borrow_mut().push(Call::Invoke(ctor.index, args));
        Ok(())
    }

    fn set_field(
        &self,
        _target: &MockObject,
        name: &str,
        value: ManagedValue<MockObject>,
    ) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(Call::Field(name.to_string(), value));
        Ok(())
    }

    fn set_property(
        &self,
        _target: &MockObject,
        name: &str,
        value: ManagedValue<MockObject>,
    ) -> Result<()> {
        if name == "Missing" {
            return Err(Error::Runtime(format!("No property {name}")));
        }
        self.calls
            .borrow_mut()
            .push(Call::Property(name.to_string(), value));
        Ok(())
    }
}
