//! Resolution of tokens, coded indices and member references into descriptors and handles.
//!
//! A [`MetadataResolver`] pairs the image a token belongs to with the registry that holds
//! every other loaded image. The signature readers in [`crate::metadata::signatures`] and
//! the custom attribute decoder are implemented on it as well, so that any step of a decode
//! can turn a token into a type without further plumbing.
//!
//! # Example
//!
//! ```rust
//! use sigscope::metadata::{
//!     builder::ImageBuilder, registry::AssemblyRegistry, resolver::MetadataResolver,
//!     tables::TableId, typesystem::{GenericContext, TypeKind},
//! };
//!
//! let registry = AssemblyRegistry::default();
//! let mut builder = ImageBuilder::new("Demo");
//! let point = builder.add_value_type("Demo", "Point");
//! let image = registry.load(builder)?;
//!
//! let resolver = MetadataResolver::new(&image, &registry);
//! let ty = resolver.read_type_from_token(&GenericContext::none(), TableId::TypeDef, point.row())?;
//! assert!(matches!(ty.kind, TypeKind::ValueType(_)));
//! # Ok::<(), sigscope::Error>(())
//! ```

mod member;
mod token;

pub use member::{FieldRefInfo, MethodRefInfo, ResolvedMemberRef};

use std::{ops::Deref, sync::Arc};

use crate::{
    metadata::{image::Image, registry::AssemblyRegistry, typesystem::ImageId},
    Result,
};

/// Resolves metadata references of one image.
#[derive(Clone, Copy, Debug)]
pub struct MetadataResolver<'a> {
    image: &'a Image,
    registry: &'a AssemblyRegistry,
}

/// An image that is either the resolver's own or one shared out of the registry.
#[derive(Debug)]
pub enum ImageRef<'a> {
    /// The image currently being resolved against
    Borrowed(&'a Image),
    /// Another loaded image
    Shared(Arc<Image>),
}

impl Deref for ImageRef<'_> {
    type Target = Image;

    fn deref(&self) -> &Image {
        match self {
            ImageRef::Borrowed(image) => image,
            ImageRef::Shared(image) => image,
        }
    }
}

impl<'a> MetadataResolver<'a> {
    /// A resolver for tokens of `image`.
    ///
    /// `image` does not need to be registered yet; an image resolves its own signatures
    /// while it is being loaded.
    #[must_use]
    pub fn new(image: &'a Image, registry: &'a AssemblyRegistry) -> Self {
        MetadataResolver { image, registry }
    }

    /// The image tokens are resolved against.
    #[must_use]
    pub fn image(&self) -> &'a Image {
        self.image
    }

    /// The registry of loaded images.
    #[must_use]
    pub fn registry(&self) -> &'a AssemblyRegistry {
        self.registry
    }

    /// The same resolver, resolving against `image` instead.
    #[must_use]
    pub fn rebind<'b>(&'b self, image: &'b Image) -> MetadataResolver<'b> {
        MetadataResolver {
            image,
            registry: self.registry,
        }
    }

    /// The image with the given id, the resolver's own one included.
    ///
    /// # Errors
    /// Returns [`crate::Error::Unresolved`] if no such image is loaded.
    pub fn image_for(&self, id: ImageId) -> Result<ImageRef<'a>> {
        if id == self.image.id() {
            return Ok(ImageRef::Borrowed(self.image));
        }

        self.registry
            .get(id)
            .map(ImageRef::Shared)
            .ok_or_else(|| unresolved_error!("No image loaded as {}", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::builder::ImageBuilder;

    #[test]
    fn image_for_own_and_loaded() {
        let registry = AssemblyRegistry::default();
        let core = registry.load(ImageBuilder::new("Core")).unwrap();
        let app = ImageBuilder::new("App").build(ImageId(50));

        let resolver = MetadataResolver::new(&app, &registry);
        assert!(matches!(resolver.image_for(ImageId(50)).unwrap(), ImageRef::Borrowed(_)));
        assert_eq!(resolver.image_for(core.id()).unwrap().name(), "Core");
        assert!(resolver
            .image_for(ImageId(9))
            .unwrap_err()
            .is_resolution_failure());

        let rebound = resolver.rebind(&core);
        assert_eq!(rebound.image().name(), "Core");
    }
}
