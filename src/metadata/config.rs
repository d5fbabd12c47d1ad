//! Limits applied while decoding signatures and loading images.

/// Limits the decoder enforces on untrusted metadata.
///
/// The registry owns one configuration and every resolver created against it reads the
/// limits from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum nesting of type descriptors (default: 50)
    pub max_recursion_depth: usize,

    /// Exclusive upper bound on the number of `MethodSpec` instantiation arguments
    /// (default: 100)
    pub max_method_spec_args: u32,

    /// Maximum number of images the registry hands out ids for (default: 0x3FFF)
    pub max_loaded_images: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: 50,
            max_method_spec_args: 100,
            max_loaded_images: 0x3FFF,
        }
    }
}

impl DecoderConfig {
    /// Tighter limits for metadata from untrusted sources.
    ///
    /// Deeply nested generic instantiations that real compilers emit still fit.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_recursion_depth: 24,
            max_method_spec_args: 32,
            max_loaded_images: 256,
        }
    }
}
