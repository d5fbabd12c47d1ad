//! Turning `TypeDef`, `TypeRef` and `TypeSpec` tokens into type descriptors.
//!
//! `TypeDef` rows map to the by-value descriptor cached when the image was built. `TypeRef`
//! rows are followed through their resolution scope, across images for `AssemblyRef`
//! scopes and into the enclosing type for nested types. `TypeSpec` rows are decoded from
//! their signature blob with the caller's generic context.

use log::debug;

use crate::{
    metadata::{
        resolver::MetadataResolver,
        signatures::decode_blob,
        tables::{CodedIndexType, TableId},
        typesystem::{GenericContext, TypeDescriptor, TypeHandle},
    },
    Error, Result,
};

fn row_index(table: TableId, row: u32) -> Result<u32> {
    row.checked_sub(1)
        .ok_or_else(|| malformed_error!("Null {} token", table))
}

impl MetadataResolver<'_> {
    /// Resolve a type token of this image to its descriptor.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a table that does not hold types,
    /// [`crate::Error::Unresolved`] for an unknown `TypeRef` target and
    /// [`crate::Error::NotSupported`] for `Module`/`ModuleRef` scopes.
    pub fn read_type_from_token(
        &self,
        ctx: &GenericContext<'_>,
        table: TableId,
        row: u32,
    ) -> Result<TypeDescriptor> {
        self.type_from_token(ctx, table, row, 0)
    }

    /// Resolve a coded index of `family` to a type descriptor.
    ///
    /// # Errors
    /// See [`MetadataResolver::read_type_from_token`]; an invalid tag is
    /// [`crate::Error::Malformed`].
    pub fn read_type_from_coded_index(
        &self,
        ctx: &GenericContext<'_>,
        family: CodedIndexType,
        raw: u32,
    ) -> Result<TypeDescriptor> {
        let (table, row) = family.decode(raw)?;
        self.read_type_from_token(ctx, table, row)
    }

    /// Resolve a type token while already `depth` levels deep in a type.
    pub(crate) fn type_from_token(
        &self,
        ctx: &GenericContext<'_>,
        table: TableId,
        row: u32,
        depth: usize,
    ) -> Result<TypeDescriptor> {
        match table {
            TableId::TypeDef => Ok(self.image().byval_type(row_index(table, row)?)?.clone()),
            TableId::TypeRef => {
                let handle = self.resolve_type_ref_at(row, depth)?;
                let owner = self.image_for(handle.image)?;
                Ok(owner.byval_type(handle.index)?.clone())
            }
            TableId::TypeSpec => {
                let spec = self.image().tables().type_spec.get(row)?;
                let mut reader = decode_blob(self.image(), spec.signature)?.with_depth(depth);
                self.read_type(&mut reader, ctx)
            }
            _ => Err(malformed_error!("{} does not hold types", table)),
        }
    }

    /// Resolve a `TypeRef` row to the type definition it names.
    ///
    /// # Errors
    /// Returns [`crate::Error::Unresolved`] if the assembly is not loaded or holds no such
    /// type, [`crate::Error::NotSupported`] for `Module`/`ModuleRef` scopes and
    /// [`crate::Error::Malformed`] for a nested `TypeRef` with a namespace.
    pub fn resolve_type_ref(&self, row: u32) -> Result<TypeHandle> {
        self.resolve_type_ref_at(row, 0)
    }

    fn resolve_type_ref_at(&self, row: u32, depth: usize) -> Result<TypeHandle> {
        let limit = self.registry().config().max_recursion_depth;
        if depth >= limit {
            return Err(Error::RecursionLimit(limit));
        }

        let image = self.image();
        let type_ref = image.tables().type_ref.get(row)?;
        let name = image.get_string(type_ref.type_name)?;
        let namespace = image.get_string(type_ref.type_namespace)?;
        let (scope, scope_row) =
            CodedIndexType::ResolutionScope.decode(type_ref.resolution_scope)?;

        match scope {
            TableId::AssemblyRef => {
                let assembly_ref = image.tables().assembly_ref.get(scope_row)?;
                let assembly = image.get_string(assembly_ref.name)?;
                let target = self
                    .registry()
                    .get_by_name(assembly)
                    .ok_or_else(|| unresolved_error!("Assembly {} is not loaded", assembly))?;

                let handle = target.find_type(namespace, name).ok_or_else(|| {
                    unresolved_error!("{}.{} not found in {}", namespace, name, assembly)
                })?;
                debug!(
                    "{}: TypeRef {} {}.{} -> {} in {}",
                    image.name(),
                    row,
                    namespace,
                    name,
                    handle,
                    assembly
                );
                Ok(handle)
            }
            TableId::TypeRef => {
                if !namespace.is_empty() {
                    return Err(malformed_error!(
                        "Nested TypeRef {} has namespace {}",
                        name,
                        namespace
                    ));
                }

                let enclosing = self.resolve_type_ref_at(scope_row, depth + 1)?;
                let owner = self.image_for(enclosing.image)?;
                let outer = owner.type_def(enclosing.index)?;
                for &nested in &outer.nested_types {
                    if owner.type_def(nested)?.name == name {
                        return Ok(owner.type_handle(nested));
                    }
                }

                Err(unresolved_error!(
                    "Nested type {} not found in {}",
                    name,
                    outer.full_name()
                ))
            }
            TableId::Module | TableId::ModuleRef => Err(not_supported_error!(
                "{} resolution scope of {}.{}",
                scope,
                namespace,
                name
            )),
            _ => Err(malformed_error!("Invalid resolution scope {}", scope)),
        }
    }

    /// Resolve the parent of a `MemberRef` to the type that declares the member.
    ///
    /// # Errors
    /// Returns [`crate::Error::NotSupported`] for `MethodDef` and `ModuleRef` parents.
    pub fn read_member_ref_parent(
        &self,
        ctx: &GenericContext<'_>,
        table: TableId,
        row: u32,
    ) -> Result<TypeDescriptor> {
        match table {
            TableId::TypeDef | TableId::TypeRef | TableId::TypeSpec => {
                self.read_type_from_token(ctx, table, row)
            }
            TableId::MethodDef | TableId::ModuleRef => {
                Err(not_supported_error!("{} parent of a MemberRef", table))
            }
            _ => Err(malformed_error!("Invalid MemberRef parent {}", table)),
        }
    }

    /// Returns `true` for a `TypeRef` to `System.ValueType` or `System.Enum`, the base
    /// types that make a type definition a value type.
    ///
    /// Only the names are compared; the reference is not resolved.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for a row or string outside the image.
    pub fn is_value_type_from_token(&self, table: TableId, row: u32) -> Result<bool> {
        if table != TableId::TypeRef {
            return Ok(false);
        }

        let image = self.image();
        let type_ref = image.tables().type_ref.get(row)?;
        if image.get_string(type_ref.type_namespace)? != "System" {
            return Ok(false);
        }

        let name = image.get_string(type_ref.type_name)?;
        Ok(name == "ValueType" || name == "Enum")
    }

    /// Returns `true` for a `MemberRef` constructor on a `TypeRef` that resolves to
    /// `System.ThreadStaticAttribute`.
    ///
    /// # Errors
    /// Propagates failures to resolve the parent `TypeRef`.
    pub fn is_thread_static_ctor_token(&self, table: TableId, row: u32) -> Result<bool> {
        if table != TableId::MemberRef {
            return Ok(false);
        }

        let member_ref = self.image().tables().member_ref.get(row)?;
        let (parent, parent_row) = CodedIndexType::MemberRefParent.decode(member_ref.class)?;
        if parent != TableId::TypeRef {
            return Ok(false);
        }

        let handle = self.resolve_type_ref(parent_row)?;
        let owner = self.image_for(handle.image)?;
        let definition = owner.type_def(handle.index)?;
        Ok(definition.namespace == "System" && definition.name == "ThreadStaticAttribute")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            registry::AssemblyRegistry, token::Token, typesystem::{ImageId, TypeKind},
        },
        test::factories::metadata::images::{app, load_corlib},
    };

    #[test]
    fn typedef_uses_cached_descriptor() {
        let registry = AssemblyRegistry::default();
        let corlib = load_corlib(&registry);
        let resolver = MetadataResolver::new(&corlib, &registry);

        let int32 = resolver
            .read_type_from_token(&GenericContext::none(), TableId::TypeDef, 5)
            .unwrap();
        assert!(matches!(int32.kind, TypeKind::ValueType(handle) if handle.index == 4));

        assert!(resolver
            .read_type_from_token(&GenericContext::none(), TableId::TypeDef, 0)
            .unwrap_err()
            .is_malformed());
        assert!(resolver
            .read_type_from_token(&GenericContext::none(), TableId::TypeDef, 500)
            .unwrap_err()
            .is_malformed());
        assert!(resolver
            .read_type_from_token(&GenericContext::none(), TableId::Field, 1)
            .unwrap_err()
            .is_malformed());
    }

    #[test]
    fn typeref_across_assemblies() {
        let registry = AssemblyRegistry::default();
        let corlib = load_corlib(&registry);

        let (mut builder, mscorlib) = app("App");
        let object = builder.add_type_ref(mscorlib, "System", "Object").unwrap();
        let list = builder
            .add_type_ref(mscorlib, "System.Collections.Generic", "List`1")
            .unwrap();
        let enumerator = builder.add_type_ref(list, "", "Enumerator").unwrap();
        let missing_nested = builder.add_type_ref(list, "", "KeyCollection").unwrap();
        let missing = builder.add_type_ref(mscorlib, "System", "Missing").unwrap();
        let elsewhere = builder.add_assembly_ref("System.Core");
        let unloaded = builder.add_type_ref(elsewhere, "System.Linq", "Enumerable").unwrap();
        let module = builder
            .add_type_ref(Token::from_parts(TableId::Module, 1), "", "Local")
            .unwrap();
        let image = registry.load(builder).unwrap();
        let resolver = MetadataResolver::new(&image, &registry);
        let ctx = GenericContext::none();

        let ty = resolver
            .read_type_from_token(&ctx, TableId::TypeRef, object.row())
            .unwrap();
        assert_eq!(ty.type_handle(), corlib.find_type("System", "Object"));

        let ty = resolver
            .read_type_from_token(&ctx, TableId::TypeRef, enumerator.row())
            .unwrap();
        let TypeKind::ValueType(handle) = ty.kind else {
            panic!("expected a value type");
        };
        assert_eq!(handle.image, corlib.id());
        assert_eq!(corlib.type_def(handle.index).unwrap().name, "Enumerator");

        for token in [missing_nested, missing, unloaded] {
            assert!(matches!(
                resolver.read_type_from_token(&ctx, TableId::TypeRef, token.row()),
                Err(Error::Unresolved(_))
            ));
        }
        assert!(resolver
            .read_type_from_token(&ctx, TableId::TypeRef, module.row())
            .unwrap_err()
            .is_not_supported());
    }

    #[test]
    fn typespec_and_coded_index() {
        let registry = AssemblyRegistry::default();
        load_corlib(&registry);

        let (mut builder, mscorlib) = app("App");
        let list = builder
            .add_type_ref(mscorlib, "System.Collections.Generic", "List`1")
            .unwrap();
        // List`1<int32>, TypeRef row 1 is coded as 0x05
        let spec = builder.add_type_spec(&[0x15, 0x12, 0x05, 0x01, 0x08]).unwrap();
        // a TypeSpec that names itself: CLASS TypeSpec row 2 (0x0A)
        let cyclic = builder.add_type_spec(&[0x12, 0x0A]).unwrap();
        let image = registry.load(builder).unwrap();
        let resolver = MetadataResolver::new(&image, &registry);
        let ctx = GenericContext::none();

        let raw = CodedIndexType::TypeDefOrRef
            .encode(TableId::TypeSpec, spec.row())
            .unwrap();
        let ty = resolver
            .read_type_from_coded_index(&ctx, CodedIndexType::TypeDefOrRef, raw)
            .unwrap();
        let TypeKind::GenericInst(inst) = &ty.kind else {
            panic!("expected generic instantiation");
        };
        assert_eq!(inst.args[0].kind, TypeKind::I4);
        assert_eq!(ty.type_handle(), Some(resolver.resolve_type_ref(list.row()).unwrap()));

        assert_eq!(cyclic.row(), 2);
        assert!(matches!(
            resolver.read_type_from_token(&ctx, TableId::TypeSpec, cyclic.row()),
            Err(Error::RecursionLimit(_))
        ));
        assert!(resolver
            .read_type_from_coded_index(&ctx, CodedIndexType::TypeDefOrRef, 0x03)
            .unwrap_err()
            .is_malformed());
    }

    #[test]
    fn member_ref_parents() {
        let registry = AssemblyRegistry::default();
        load_corlib(&registry);
        let (builder, _) = app("App");
        let image = builder.build(ImageId(90));
        let resolver = MetadataResolver::new(&image, &registry);
        let ctx = GenericContext::none();

        assert!(resolver
            .read_member_ref_parent(&ctx, TableId::MethodDef, 1)
            .unwrap_err()
            .is_not_supported());
        assert!(resolver
            .read_member_ref_parent(&ctx, TableId::ModuleRef, 1)
            .unwrap_err()
            .is_not_supported());
    }

    #[test]
    fn value_type_and_thread_static_detection() {
        let registry = AssemblyRegistry::default();
        load_corlib(&registry);

        let (mut builder, mscorlib) = app("App");
        let value_type = builder.add_type_ref(mscorlib, "System", "ValueType").unwrap();
        let enum_type = builder.add_type_ref(mscorlib, "System", "Enum").unwrap();
        let object = builder.add_type_ref(mscorlib, "System", "Object").unwrap();
        let thread_static = builder
            .add_type_ref(mscorlib, "System", "ThreadStaticAttribute")
            .unwrap();
        let ctor = builder
            .add_member_ref(thread_static, ".ctor", &[0x20, 0x00, 0x01])
            .unwrap();
        let other_ctor = builder
            .add_member_ref(object, ".ctor", &[0x20, 0x00, 0x01])
            .unwrap();
        let image = registry.load(builder).unwrap();
        let resolver = MetadataResolver::new(&image, &registry);

        assert!(resolver.is_value_type_from_token(TableId::TypeRef, value_type.row()).unwrap());
        assert!(resolver.is_value_type_from_token(TableId::TypeRef, enum_type.row()).unwrap());
        assert!(!resolver.is_value_type_from_token(TableId::TypeRef, object.row()).unwrap());
        assert!(!resolver.is_value_type_from_token(TableId::TypeDef, 1).unwrap());

        assert!(resolver.is_thread_static_ctor_token(TableId::MemberRef, ctor.row()).unwrap());
        assert!(!resolver
            .is_thread_static_ctor_token(TableId::MemberRef, other_ctor.row())
            .unwrap());
        assert!(!resolver.is_thread_static_ctor_token(TableId::MethodDef, 1).unwrap());
    }
}
