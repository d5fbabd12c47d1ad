//! Factory methods for crafted images.
//!
//! `mscorlib` carries just enough of the base library for resolution tests: the types a
//! `TypeRef` usually points at, one generic type with a nested type, an overload set, a
//! generic method, an enum and an attribute with a string constructor.

use std::sync::Arc;

use crate::metadata::{
    builder::ImageBuilder, image::Image, registry::AssemblyRegistry, token::Token,
    typesystem::TypeKind,
};

/// Simple name of the crafted base library
pub const CORLIB: &str = "mscorlib";

/// Build the crafted base library.
pub fn corlib() -> ImageBuilder {
    let mut builder = ImageBuilder::new(CORLIB);

    builder.add_type("System", "Object");
    builder.add_type("System", "ValueType");
    builder.add_type("System", "Enum");
    builder.add_type("System", "String");
    builder.add_value_type("System", "Int32");

    let thread_static = builder.add_type("System", "ThreadStaticAttribute");
    builder
        .add_method(thread_static, ".ctor", &[0x20, 0x00, 0x01], &[])
        .unwrap();

    // List`1<T> { .ctor(); void Add(!0); int32 _size; !0[] _items; struct Enumerator }
    let list = builder.add_type("System.Collections.Generic", "List`1");
    builder.add_type_generic_params(list, &["T"]).unwrap();
    builder
        .add_method(list, ".ctor", &[0x20, 0x00, 0x01], &[])
        .unwrap();
    builder
        .add_method(list, "Add", &[0x20, 0x01, 0x01, 0x13, 0x00], &["item"])
        .unwrap();
    builder.add_field(list, "_size", &[0x06, 0x08]).unwrap();
    builder
        .add_field(list, "_items", &[0x06, 0x1D, 0x13, 0x00])
        .unwrap();
    builder.add_nested_type(list, "Enumerator", true).unwrap();

    let console = builder.add_type("System", "Console");
    builder
        .add_method(console, "WriteLine", &[0x00, 0x01, 0x01, 0x0E], &["value"])
        .unwrap();
    builder
        .add_method(console, "WriteLine", &[0x00, 0x01, 0x01, 0x08], &["value"])
        .unwrap();

    // static !!0[] Empty<T>()
    let array = builder.add_type("System", "Array");
    let empty = builder
        .add_method(array, "Empty", &[0x10, 0x01, 0x00, 0x1D, 0x1E, 0x00], &[])
        .unwrap();
    builder.add_method_generic_params(empty, &["T"]).unwrap();

    builder
        .add_enum("System", "AttributeTargets", TypeKind::I4)
        .unwrap();

    let obsolete = builder.add_type("System", "ObsoleteAttribute");
    builder
        .add_method(obsolete, ".ctor", &[0x20, 0x01, 0x01, 0x0E], &["message"])
        .unwrap();

    builder
}

/// Load the crafted base library into `registry`.
pub fn load_corlib(registry: &AssemblyRegistry) -> Arc<Image> {
    registry.load(corlib()).unwrap()
}

/// An empty image named `name` that references the crafted base library.
///
/// Returns the builder and its `AssemblyRef` token for `mscorlib`.
pub fn app(name: &str) -> (ImageBuilder, Token) {
    let mut builder = ImageBuilder::new(name);
    let corlib = builder.add_assembly_ref(CORLIB);
    (builder, corlib)
}
