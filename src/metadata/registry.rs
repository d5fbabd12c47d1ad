//! The set of loaded images.
//!
//! Cross-assembly `TypeRef` resolution looks images up here by their simple assembly name;
//! resolved handles carry an [`ImageId`] that is looked up here again later. Lookups go
//! through `DashMap` so that resolvers running on different threads can share one registry.

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use dashmap::{mapref::entry::Entry, DashMap};
use log::debug;

use crate::{
    metadata::{
        builder::ImageBuilder,
        config::DecoderConfig,
        image::Image,
        typesystem::{ImageId, TypeHandle},
    },
    Error, Result,
};

/// Already loaded images, keyed by id and by assembly name.
pub struct AssemblyRegistry {
    config: DecoderConfig,
    images: DashMap<ImageId, Arc<Image>>,
    by_name: DashMap<String, ImageId>,
    next_id: AtomicU32,
}

impl AssemblyRegistry {
    /// An empty registry with the given limits.
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        AssemblyRegistry {
            config,
            images: DashMap::new(),
            by_name: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// The limits every resolver over this registry applies.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Hand out the next image id.
    ///
    /// Ids start at 1 and are never reused.
    ///
    /// # Errors
    /// Returns [`crate::Error::ImageLimit`] once `max_loaded_images` ids were allocated.
    pub fn allocate_image_id(&self) -> Result<ImageId> {
        let limit = self.config.max_loaded_images;
        self.next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| {
                (id <= limit).then_some(id + 1)
            })
            .map(ImageId)
            .map_err(|_| Error::ImageLimit(limit))
    }

    /// Build, decode and register the image collected by `builder`.
    ///
    /// Method and field signatures are decoded before the image becomes visible, so every
    /// assembly it references must already be loaded.
    ///
    /// # Errors
    /// Returns [`crate::Error::DuplicateImage`] or [`crate::Error::ImageLimit`] before any
    /// decoding, and propagates signature decoding failures.
    pub fn load(&self, builder: ImageBuilder) -> Result<Arc<Image>> {
        if self.by_name.contains_key(builder.name()) {
            return Err(Error::DuplicateImage(builder.name().to_string()));
        }

        let id = self.allocate_image_id()?;
        let mut image = builder.build(id);
        image.load_signatures(self)?;
        self.register(image)
    }

    /// Make an already decoded image visible to resolvers.
    ///
    /// # Errors
    /// Returns [`crate::Error::DuplicateImage`] if the name or the id is taken.
    pub fn register(&self, image: Image) -> Result<Arc<Image>> {
        if self.images.contains_key(&image.id()) {
            return Err(Error::DuplicateImage(format!("{} ({})", image.name(), image.id())));
        }

        match self.by_name.entry(image.name().to_string()) {
            Entry::Occupied(_) => Err(Error::DuplicateImage(image.name().to_string())),
            Entry::Vacant(entry) => {
                let id = image.id();
                let image = Arc::new(image);
                self.images.insert(id, image.clone());
                entry.insert(id);
                debug!("Registered {} as {}", image.name(), id);
                Ok(image)
            }
        }
    }

    /// The image with the given id.
    #[must_use]
    pub fn get(&self, id: ImageId) -> Option<Arc<Image>> {
        self.images.get(&id).map(|entry| entry.value().clone())
    }

    /// The image of the assembly with the given simple name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Arc<Image>> {
        let id = *self.by_name.get(name)?;
        self.get(id)
    }

    /// Look up a top-level type by `Namespace.Name` across all images, lowest id first.
    #[must_use]
    pub fn find_type_by_full_name(&self, full_name: &str) -> Option<TypeHandle> {
        let mut ids: Vec<ImageId> = self.images.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();

        ids.into_iter()
            .filter_map(|id| self.get(id))
            .find_map(|image| image.find_type_by_full_name(full_name))
    }

    /// Number of registered images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns `true` if no image is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl Default for AssemblyRegistry {
    fn default() -> Self {
        AssemblyRegistry::new(DecoderConfig::default())
    }
}

impl std::fmt::Debug for AssemblyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssemblyRegistry")
            .field("config", &self.config)
            .field("images", &self.images.len())
            .field("next_id", &self.next_id.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_lists_loaded_count() {
        let registry = AssemblyRegistry::default();
        registry.load(ImageBuilder::new("Core")).unwrap();
        let text = format!("{registry:?}");
        assert!(text.starts_with("AssemblyRegistry"));
        assert!(text.contains("images: 1"));
    }

    #[test]
    fn load_and_lookup() {
        let registry = AssemblyRegistry::default();
        assert!(registry.is_empty());

        let image = registry.load(ImageBuilder::new("Core")).unwrap();
        assert_eq!(image.id(), ImageId(1));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_by_name("Core").unwrap().id(), ImageId(1));
        assert!(registry.get(ImageId(1)).is_some());
        assert!(registry.get_by_name("Missing").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let registry = AssemblyRegistry::default();
        registry.load(ImageBuilder::new("Core")).unwrap();
        assert!(matches!(
            registry.load(ImageBuilder::new("Core")),
            Err(Error::DuplicateImage(_))
        ));
        // The rejected load did not consume an id.
        let next = registry.load(ImageBuilder::new("Other")).unwrap();
        assert_eq!(next.id(), ImageId(2));
    }

    #[test]
    fn image_limit() {
        let config = DecoderConfig {
            max_loaded_images: 2,
            ..DecoderConfig::default()
        };
        let registry = AssemblyRegistry::new(config);
        assert_eq!(registry.allocate_image_id().unwrap(), ImageId(1));
        assert_eq!(registry.allocate_image_id().unwrap(), ImageId(2));
        assert!(matches!(
            registry.allocate_image_id(),
            Err(Error::ImageLimit(2))
        ));
    }
}
