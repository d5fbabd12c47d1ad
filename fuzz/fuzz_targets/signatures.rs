#![no_main]

use libfuzzer_sys::fuzz_target;
use sigscope::prelude::*;

// Every reader must reject arbitrary input with an error, never a panic.
fuzz_target!(|data: &[u8]| {
    let mut builder = ImageBuilder::new("Fuzz");
    builder.add_type("Fuzz", "Holder");
    let Ok(offset) = builder.add_blob(data) else {
        return;
    };

    let registry = AssemblyRegistry::default();
    let Ok(image) = registry.load(builder) else {
        return;
    };
    let resolver = MetadataResolver::new(&image, &registry);
    let ctx = GenericContext::none();

    if let Ok(mut reader) = decode_blob(&image, offset) {
        let _ = resolver.read_type(&mut reader.clone(), &ctx);
        let _ = resolver.read_member_ref_sig(&mut reader.clone(), &ctx);
        let _ = resolver.read_local_var_sig(&mut reader.clone(), &ctx);
        let _ = resolver.read_standalone_sig(&mut reader.clone(), &ctx);
        let _ = resolver.read_method_spec_instantiation(&mut reader, &ctx);
    }
});
