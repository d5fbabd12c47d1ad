//! Benchmarks for signature decoding.
//!
//! Measures the readers over crafted images:
//! - Method reference signatures (primitives, instance, vararg)
//! - Field signatures
//! - Local variable signatures
//! - Type specifications resolved from a `TypeSpec` token
//! - Method specification instantiations
//! - Cross-assembly `TypeRef` resolution

extern crate sigscope;

use criterion::{criterion_group, criterion_main, Criterion};
use sigscope::prelude::*;
use std::{hint::black_box, sync::Arc};

/// Load a base library plus an image holding `blob`; returns the registry, the image and
/// the blob offset.
fn setup(blob: &[u8]) -> (AssemblyRegistry, Arc<Image>, u32) {
    let registry = AssemblyRegistry::default();

    let mut core = ImageBuilder::new("Core");
    core.add_type("System", "Object");
    let list = core.add_type("System.Collections.Generic", "List`1");
    core.add_type_generic_params(list, &["T"]).unwrap();
    registry.load(core).unwrap();

    let mut app = ImageBuilder::new("App");
    let scope = app.add_assembly_ref("Core");
    app.add_type_ref(scope, "System", "Object").unwrap();
    app.add_type_ref(scope, "System.Collections.Generic", "List`1")
        .unwrap();
    let offset = app.add_blob(blob).unwrap();
    let image = registry.load(app).unwrap();

    (registry, image, offset)
}

/// Benchmark a simple void method with no parameters.
/// Signature: void Method()
fn bench_method_signature_void_no_params(c: &mut Criterion) {
    let (registry, image, offset) = setup(&[0x00, 0x00, 0x01]);
    let resolver = MetadataResolver::new(&image, &registry);

    c.bench_function("sig_method_void_no_params", |b| {
        b.iter(|| {
            let mut reader = decode_blob(&image, black_box(offset)).unwrap();
            let sig = resolver
                .read_method_ref_sig(&mut reader, &GenericContext::none())
                .unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark a method with primitive parameters.
/// Signature: int Method(int a, string b, bool c)
fn bench_method_signature_primitives(c: &mut Criterion) {
    let (registry, image, offset) = setup(&[0x00, 0x03, 0x08, 0x08, 0x0E, 0x02]);
    let resolver = MetadataResolver::new(&image, &registry);

    c.bench_function("sig_method_primitives", |b| {
        b.iter(|| {
            let mut reader = decode_blob(&image, black_box(offset)).unwrap();
            let sig = resolver
                .read_method_ref_sig(&mut reader, &GenericContext::none())
                .unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark a vararg call site.
/// Signature: vararg void Method(int32, ..., string, float64)
fn bench_method_signature_vararg(c: &mut Criterion) {
    let (registry, image, offset) = setup(&[0x05, 0x03, 0x01, 0x08, 0x41, 0x0E, 0x0D]);
    let resolver = MetadataResolver::new(&image, &registry);

    c.bench_function("sig_method_vararg", |b| {
        b.iter(|| {
            let mut reader = decode_blob(&image, black_box(offset)).unwrap();
            let sig = resolver
                .read_method_ref_sig(&mut reader, &GenericContext::none())
                .unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark a field whose type is a cross-assembly class.
/// Signature: class System.Object
fn bench_field_signature_class(c: &mut Criterion) {
    let (registry, image, offset) = setup(&[0x06, 0x12, 0x05]);
    let resolver = MetadataResolver::new(&image, &registry);

    c.bench_function("sig_field_class", |b| {
        b.iter(|| {
            let mut reader = decode_blob(&image, black_box(offset)).unwrap();
            let ty = resolver
                .read_field_ref_sig(&mut reader, &GenericContext::none())
                .unwrap();
            black_box(ty)
        });
    });
}

/// Benchmark a generic instantiation with a nested instantiation.
/// Signature: List`1<List`1<int32>>
fn bench_type_generic_inst_nested(c: &mut Criterion) {
    let (registry, image, offset) = setup(&[
        0x15, 0x12, 0x09, 0x01, 0x15, 0x12, 0x09, 0x01, 0x08,
    ]);
    let resolver = MetadataResolver::new(&image, &registry);

    c.bench_function("sig_type_generic_inst_nested", |b| {
        b.iter(|| {
            let mut reader = decode_blob(&image, black_box(offset)).unwrap();
            let ty = resolver
                .read_type(&mut reader, &GenericContext::none())
                .unwrap();
            black_box(ty)
        });
    });
}

/// Benchmark a multi-dimensional array with sizes and lower bounds.
/// Signature: int32[0..3, 0..5]
fn bench_type_array_shape(c: &mut Criterion) {
    let (registry, image, offset) = setup(&[0x14, 0x08, 0x02, 0x02, 0x03, 0x05, 0x02, 0x00, 0x00]);
    let resolver = MetadataResolver::new(&image, &registry);

    c.bench_function("sig_type_array_shape", |b| {
        b.iter(|| {
            let mut reader = decode_blob(&image, black_box(offset)).unwrap();
            let ty = resolver
                .read_type(&mut reader, &GenericContext::none())
                .unwrap();
            black_box(ty)
        });
    });
}

/// Benchmark a local variable signature with modifiers, pinned and by-ref locals.
/// Signature: LOCAL_SIG int32, string&, uint8* pinned, modopt(Object) object
fn bench_local_var_signature(c: &mut Criterion) {
    let (registry, image, offset) = setup(&[
        0x07, 0x04, 0x08, 0x10, 0x0E, 0x45, 0x0F, 0x05, 0x20, 0x05, 0x1C,
    ]);
    let resolver = MetadataResolver::new(&image, &registry);

    c.bench_function("sig_local_var", |b| {
        b.iter(|| {
            let mut reader = decode_blob(&image, black_box(offset)).unwrap();
            let locals = resolver
                .read_local_var_sig(&mut reader, &GenericContext::none())
                .unwrap();
            black_box(locals)
        });
    });
}

/// Benchmark a method specification instantiation.
/// Signature: GENERICINST <int32, string, object>
fn bench_method_spec_signature(c: &mut Criterion) {
    let (registry, image, offset) = setup(&[0x0A, 0x03, 0x08, 0x0E, 0x1C]);
    let resolver = MetadataResolver::new(&image, &registry);

    c.bench_function("sig_method_spec", |b| {
        b.iter(|| {
            let mut reader = decode_blob(&image, black_box(offset)).unwrap();
            let args = resolver
                .read_method_spec_instantiation(&mut reader, &GenericContext::none())
                .unwrap();
            black_box(args)
        });
    });
}

/// Benchmark resolving a `TypeRef` into another assembly.
fn bench_resolve_type_ref(c: &mut Criterion) {
    let (registry, image, _) = setup(&[]);
    let resolver = MetadataResolver::new(&image, &registry);

    c.bench_function("resolve_type_ref", |b| {
        b.iter(|| {
            let handle = resolver.resolve_type_ref(black_box(2)).unwrap();
            black_box(handle)
        });
    });
}

criterion_group!(
    benches,
    bench_method_signature_void_no_params,
    bench_method_signature_primitives,
    bench_method_signature_vararg,
    bench_field_signature_class,
    bench_type_generic_inst_nested,
    bench_type_array_shape,
    bench_local_var_signature,
    bench_method_spec_signature,
    bench_resolve_type_ref,
);
criterion_main!(benches);
