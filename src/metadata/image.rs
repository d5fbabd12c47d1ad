//! A loaded metadata image.
//!
//! An [`Image`] owns the heaps, the decoded tables and the definitions of one assembly, plus
//! the append-only type cache signature readers write into. Byte offsets and row indices
//! are always relative to one image.

use log::debug;

use crate::{
    metadata::{
        registry::AssemblyRegistry,
        resolver::MetadataResolver,
        signatures::decode_blob,
        streams::{Blob, Strings},
        tables::MetadataTables,
        typesystem::{
            FieldDefinition, GenericContainer, GenericContext, ImageId, MethodDefinition,
            MethodHandle, TypeDefinition, TypeDescriptor, TypeHandle,
        },
    },
    Error::OutOfBounds,
    Result,
};

/// The decoded container of one assembly's metadata.
///
/// Created by [`crate::metadata::builder::ImageBuilder`] and owned by the
/// [`AssemblyRegistry`] once loaded. The type cache is a `boxcar::Vec`, so readers append
/// through a shared reference; indices handed out stay valid for the image's lifetime.
pub struct Image {
    pub(crate) id: ImageId,
    pub(crate) name: String,
    pub(crate) strings: Strings,
    pub(crate) blob: Blob,
    pub(crate) tables: MetadataTables,
    pub(crate) types: Vec<TypeDefinition>,
    pub(crate) methods: Vec<MethodDefinition>,
    pub(crate) fields: Vec<FieldDefinition>,
    pub(crate) generic_containers: Vec<GenericContainer>,
    pub(crate) type_cache: boxcar::Vec<TypeDescriptor>,
}

impl Image {
    /// Id allocated by the registry.
    #[must_use]
    pub fn id(&self) -> ImageId {
        self.id
    }

    /// Simple assembly name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `#Strings` heap.
    #[must_use]
    pub fn strings(&self) -> &Strings {
        &self.strings
    }

    /// The `#Blob` heap.
    #[must_use]
    pub fn blob(&self) -> &Blob {
        &self.blob
    }

    /// The decoded tables.
    #[must_use]
    pub fn tables(&self) -> &MetadataTables {
        &self.tables
    }

    /// String heap lookup by raw offset.
    ///
    /// # Errors
    /// See [`Strings::get`].
    pub fn get_string(&self, index: u32) -> Result<&str> {
        self.strings.get(index as usize)
    }

    /// All type definitions.
    #[must_use]
    pub fn types(&self) -> &[TypeDefinition] {
        &self.types
    }

    /// All method definitions.
    #[must_use]
    pub fn methods(&self) -> &[MethodDefinition] {
        &self.methods
    }

    /// All field definitions.
    #[must_use]
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// The type definition at a 0-based index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an index past the `TypeDef` table.
    pub fn type_def(&self, index: u32) -> Result<&TypeDefinition> {
        self.types.get(index as usize).ok_or(OutOfBounds)
    }

    /// The method definition at a 0-based index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an index past the `MethodDef` table.
    pub fn method_def(&self, index: u32) -> Result<&MethodDefinition> {
        self.methods.get(index as usize).ok_or(OutOfBounds)
    }

    /// The field definition at a 0-based index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an index past the `Field` table.
    pub fn field_def(&self, index: u32) -> Result<&FieldDefinition> {
        self.fields.get(index as usize).ok_or(OutOfBounds)
    }

    /// The generic container at a 0-based index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an unknown container.
    pub fn generic_container(&self, index: u32) -> Result<&GenericContainer> {
        self.generic_containers
            .get(index as usize)
            .ok_or(OutOfBounds)
    }

    /// Handle of the type at a 0-based index.
    #[must_use]
    pub fn type_handle(&self, index: u32) -> TypeHandle {
        TypeHandle {
            image: self.id,
            index,
        }
    }

    /// Handle of the method at a 0-based index.
    #[must_use]
    pub fn method_handle(&self, index: u32) -> MethodHandle {
        MethodHandle {
            image: self.id,
            index,
        }
    }

    /// Look up a top-level type by namespace and name.
    #[must_use]
    pub fn find_type(&self, namespace: &str, name: &str) -> Option<TypeHandle> {
        self.types
            .iter()
            .position(|t| t.enclosing.is_none() && t.namespace == namespace && t.name == name)
            .and_then(|index| u32::try_from(index).ok())
            .map(|index| self.type_handle(index))
    }

    /// Look up a top-level type by `Namespace.Name`.
    #[must_use]
    pub fn find_type_by_full_name(&self, full_name: &str) -> Option<TypeHandle> {
        match full_name.rsplit_once('.') {
            Some((namespace, name)) => self.find_type(namespace, name),
            None => self.find_type("", full_name),
        }
    }

    /// Append a descriptor to the type cache and return its index.
    pub fn add_type_cache(&self, ty: TypeDescriptor) -> usize {
        self.type_cache.push(ty)
    }

    /// The cached descriptor at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an index that was never handed out.
    pub fn type_at(&self, index: usize) -> Result<&TypeDescriptor> {
        self.type_cache.get(index).ok_or(OutOfBounds)
    }

    /// Number of cached descriptors.
    #[must_use]
    pub fn type_cache_len(&self) -> usize {
        self.type_cache.count()
    }

    /// The by-value descriptor of the type at a 0-based index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an unknown type.
    pub fn byval_type(&self, index: u32) -> Result<&TypeDescriptor> {
        self.type_at(self.type_def(index)?.byval_type)
    }

    /// The generic context of a type's members: the type's own container, if any.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an unknown type or container.
    pub fn type_context(&self, index: u32) -> Result<GenericContext<'_>> {
        let class = match self.type_def(index)?.generic_container {
            Some(container) => Some(self.generic_container(container)?),
            None => None,
        };

        Ok(GenericContext::new(class, None))
    }

    /// The generic context inside a method body: its declaring type's container and its own.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an unknown method, type or container.
    pub fn method_context(&self, index: u32) -> Result<GenericContext<'_>> {
        let method = self.method_def(index)?;
        let mut ctx = self.type_context(method.declaring_type)?;
        if let Some(container) = method.generic_container {
            ctx.method = Some(self.generic_container(container)?);
        }

        Ok(ctx)
    }

    /// Generic arity of a method, 0 if it is not generic.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an unknown method or container.
    pub fn method_generic_arity(&self, index: u32) -> Result<u32> {
        match self.method_def(index)?.generic_container {
            Some(container) => Ok(self.generic_container(container)?.arity()),
            None => Ok(0),
        }
    }

    /// Decode the `MethodDefSig` and `FieldSig` of every definition in this image.
    ///
    /// Runs once while loading, before the image is shared. Types referenced from other
    /// assemblies must already be registered.
    ///
    /// # Errors
    /// Propagates the first decoding or resolution failure.
    pub(crate) fn load_signatures(&mut self, registry: &AssemblyRegistry) -> Result<()> {
        for index in 0..self.methods.len() {
            #[allow(clippy::cast_possible_truncation)]
            let method_index = index as u32;
            let mut method = self.methods[index].clone();
            let mut params = std::mem::take(&mut method.params);
            {
                let resolver = MetadataResolver::new(self, registry);
                let ctx = self.method_context(method_index)?;
                let mut reader = decode_blob(self, method.signature)?;
                resolver.read_method_def_sig(&mut reader, &ctx, &mut method, &mut params)?;
            }
            method.params = params;
            self.methods[index] = method;
        }

        for index in 0..self.fields.len() {
            let field = &self.fields[index];
            let field_type = {
                let resolver = MetadataResolver::new(self, registry);
                let ctx = self.type_context(field.declaring_type)?;
                let mut reader = decode_blob(self, field.signature)?;
                let ty = resolver.read_field_ref_sig(&mut reader, &ctx)?;
                self.add_type_cache(ty)
            };
            self.fields[index].field_type = Some(field_type);
        }

        debug!(
            "{}: decoded {} method and {} field signatures",
            self.name,
            self.methods.len(),
            self.fields.len()
        );
        Ok(())
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("types", &self.types.len())
            .field("methods", &self.methods.len())
            .field("fields", &self.fields.len())
            .field("type_cache", &self.type_cache.count())
            .finish_non_exhaustive()
    }
}
