//! Assembles an [`Image`] from already decoded heaps, rows and definitions.
//!
//! The physical file format is read elsewhere; the builder receives its results and lays
//! them out the way the resolvers expect. Every `add_*` call returns the token of the new
//! row, which later calls use to refer back to it.
//!
//! ```rust
//! use sigscope::metadata::{builder::ImageBuilder, registry::AssemblyRegistry};
//!
//! let mut builder = ImageBuilder::new("Demo");
//! let program = builder.add_type("Demo", "Program");
//! // static void Main()
//! builder.add_method(program, "Main", &[0x00, 0x00, 0x01], &[])?;
//!
//! let registry = AssemblyRegistry::default();
//! let image = registry.load(builder)?;
//! assert!(image.find_type("Demo", "Program").is_some());
//! # Ok::<(), sigscope::Error>(())
//! ```

use crate::{
    metadata::{
        image::Image,
        streams::{Blob, Strings},
        tables::{
            AssemblyRefRaw, CodedIndexType, CustomAttributeRaw, MemberRefRaw, MetadataTables,
            MethodSpecRaw, StandAloneSigRaw, TableId, TypeRefRaw, TypeSpecRaw,
        },
        token::Token,
        typesystem::{
            FieldDefinition, GenericContainer, GenericContainerHandle, GenericOwner, ImageId,
            MethodDefinition, ParamDetail, TypeDefinition, TypeDescriptor, TypeKind,
        },
    },
    Result,
};

/// Collects the contents of one image before it is loaded.
#[derive(Debug, Default)]
pub struct ImageBuilder {
    name: String,
    strings: Strings,
    blob: Blob,
    tables: MetadataTables,
    types: Vec<TypeDefinition>,
    methods: Vec<MethodDefinition>,
    fields: Vec<FieldDefinition>,
    generic_containers: Vec<(GenericOwner, Vec<String>)>,
}

fn row_index(token: Token, table: TableId) -> Result<u32> {
    if token.table() != table as u8 || token.row() == 0 {
        return Err(malformed_error!("Expected a {} token, got {}", table, token));
    }

    Ok(token.row() - 1)
}

#[allow(clippy::cast_possible_truncation)]
fn next_token(table: TableId, len: usize) -> Token {
    Token::from_parts(table, len as u32 + 1)
}

impl ImageBuilder {
    /// Start an image for the assembly `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        ImageBuilder {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The assembly name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a string to the string heap and return its offset.
    pub fn add_string(&mut self, value: &str) -> u32 {
        self.strings.push(value)
    }

    /// Append a blob to the blob heap and return its offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the blob is too large for a length prefix.
    pub fn add_blob(&mut self, value: &[u8]) -> Result<u32> {
        self.blob.push(value)
    }

    /// Add an `AssemblyRef` row.
    pub fn add_assembly_ref(&mut self, name: &str) -> Token {
        let name = self.add_string(name);
        let rid = self.tables.assembly_ref.next_rid();
        let token = Token::from_parts(TableId::AssemblyRef, rid);
        self.tables.assembly_ref.push(AssemblyRefRaw {
            rid,
            token,
            major_version: 0,
            minor_version: 0,
            build_number: 0,
            revision_number: 0,
            name,
            culture: 0,
        });
        token
    }

    /// Add a `TypeRef` row resolved through `scope` (an `AssemblyRef`, `TypeRef`,
    /// `Module` or `ModuleRef` token).
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `scope` is not a resolution scope.
    pub fn add_type_ref(&mut self, scope: Token, namespace: &str, name: &str) -> Result<Token> {
        let scope_table = TableId::from_repr(scope.table())
            .ok_or_else(|| malformed_error!("Invalid resolution scope {}", scope))?;
        let resolution_scope = CodedIndexType::ResolutionScope.encode(scope_table, scope.row())?;
        let type_name = self.add_string(name);
        let type_namespace = self.add_string(namespace);

        let rid = self.tables.type_ref.next_rid();
        let token = Token::from_parts(TableId::TypeRef, rid);
        self.tables.type_ref.push(TypeRefRaw {
            rid,
            token,
            resolution_scope,
            type_name,
            type_namespace,
        });
        Ok(token)
    }

    /// Add a `TypeSpec` row with the given type signature.
    ///
    /// # Errors
    /// See [`ImageBuilder::add_blob`].
    pub fn add_type_spec(&mut self, signature: &[u8]) -> Result<Token> {
        let signature = self.add_blob(signature)?;
        let rid = self.tables.type_spec.next_rid();
        let token = Token::from_parts(TableId::TypeSpec, rid);
        self.tables.type_spec.push(TypeSpecRaw {
            rid,
            token,
            signature,
        });
        Ok(token)
    }

    /// Add a `MemberRef` row on `parent` (a `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef` or
    /// `TypeSpec` token).
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `parent` is not a `MemberRefParent`.
    pub fn add_member_ref(&mut self, parent: Token, name: &str, signature: &[u8]) -> Result<Token> {
        let parent_table = TableId::from_repr(parent.table())
            .ok_or_else(|| malformed_error!("Invalid MemberRef parent {}", parent))?;
        let class = CodedIndexType::MemberRefParent.encode(parent_table, parent.row())?;
        let name = self.add_string(name);
        let signature = self.add_blob(signature)?;

        let rid = self.tables.member_ref.next_rid();
        let token = Token::from_parts(TableId::MemberRef, rid);
        self.tables.member_ref.push(MemberRefRaw {
            rid,
            token,
            class,
            name,
            signature,
        });
        Ok(token)
    }

    /// Add a `MethodSpec` row instantiating `method` (a `MethodDef` or `MemberRef` token).
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `method` is not a `MethodDefOrRef`.
    pub fn add_method_spec(&mut self, method: Token, instantiation: &[u8]) -> Result<Token> {
        let method_table = TableId::from_repr(method.table())
            .ok_or_else(|| malformed_error!("Invalid MethodSpec method {}", method))?;
        let method = CodedIndexType::MethodDefOrRef.encode(method_table, method.row())?;
        let instantiation = self.add_blob(instantiation)?;

        let rid = self.tables.method_spec.next_rid();
        let token = Token::from_parts(TableId::MethodSpec, rid);
        self.tables.method_spec.push(MethodSpecRaw {
            rid,
            token,
            method,
            instantiation,
        });
        Ok(token)
    }

    /// Add a `StandAloneSig` row.
    ///
    /// # Errors
    /// See [`ImageBuilder::add_blob`].
    pub fn add_standalone_sig(&mut self, signature: &[u8]) -> Result<Token> {
        let signature = self.add_blob(signature)?;
        let rid = self.tables.standalone_sig.next_rid();
        let token = Token::from_parts(TableId::StandAloneSig, rid);
        self.tables.standalone_sig.push(StandAloneSigRaw {
            rid,
            token,
            signature,
        });
        Ok(token)
    }

    /// Add a `CustomAttribute` row attaching `constructor` (a `MethodDef` or `MemberRef`)
    /// with the argument blob `value` to `parent`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for tokens outside their coded index families.
    pub fn add_custom_attribute(
        &mut self,
        parent: Token,
        constructor: Token,
        value: &[u8],
    ) -> Result<Token> {
        let parent_table = TableId::from_repr(parent.table())
            .ok_or_else(|| malformed_error!("Invalid attribute parent {}", parent))?;
        let ctor_table = TableId::from_repr(constructor.table())
            .ok_or_else(|| malformed_error!("Invalid attribute constructor {}", constructor))?;
        let parent = CodedIndexType::HasCustomAttribute.encode(parent_table, parent.row())?;
        let constructor =
            CodedIndexType::CustomAttributeType.encode(ctor_table, constructor.row())?;
        let value = self.add_blob(value)?;

        let rid = self.tables.custom_attribute.next_rid();
        let token = Token::from_parts(TableId::CustomAttribute, rid);
        self.tables.custom_attribute.push(CustomAttributeRaw {
            rid,
            token,
            parent,
            constructor,
            value,
        });
        Ok(token)
    }

    fn push_type(&mut self, namespace: &str, name: &str, is_value_type: bool) -> Token {
        let token = next_token(TableId::TypeDef, self.types.len());
        self.types.push(TypeDefinition {
            token,
            name: name.to_string(),
            namespace: namespace.to_string(),
            is_value_type,
            enum_underlying: None,
            enclosing: None,
            nested_types: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            generic_container: None,
            byval_type: 0,
        });
        token
    }

    /// Define a class.
    pub fn add_type(&mut self, namespace: &str, name: &str) -> Token {
        self.push_type(namespace, name, false)
    }

    /// Define a value type.
    pub fn add_value_type(&mut self, namespace: &str, name: &str) -> Token {
        self.push_type(namespace, name, true)
    }

    /// Define an enum with the given underlying integral type.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `underlying` is not an integral primitive.
    pub fn add_enum(&mut self, namespace: &str, name: &str, underlying: TypeKind) -> Result<Token> {
        if !matches!(
            underlying,
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
        ) {
            return Err(malformed_error!("Invalid enum underlying type {:?}", underlying));
        }

        let token = self.push_type(namespace, name, true);
        if let Some(ty) = self.types.last_mut() {
            ty.enum_underlying = Some(underlying);
        }
        Ok(token)
    }

    /// Define a type nested in `enclosing`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `enclosing` is not a `TypeDef` of this builder.
    pub fn add_nested_type(
        &mut self,
        enclosing: Token,
        name: &str,
        is_value_type: bool,
    ) -> Result<Token> {
        let outer = self.type_index(enclosing)?;
        let token = self.push_type("", name, is_value_type);
        let inner = token.row() - 1;
        self.types[inner as usize].enclosing = Some(outer);
        self.types[outer as usize].nested_types.push(inner);
        Ok(token)
    }

    /// Declare the generic parameters of a type.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `ty` is not a `TypeDef` of this builder.
    pub fn add_type_generic_params(&mut self, ty: Token, names: &[&str]) -> Result<()> {
        let index = self.type_index(ty)?;
        let container = self.push_container(GenericOwner::Type(index), names);
        self.types[index as usize].generic_container = Some(container);
        Ok(())
    }

    /// Define a method on `ty` with its `MethodDefSig` and parameter names.
    ///
    /// The parameter count recorded on the definition is the number of names.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `ty` is not a `TypeDef` of this builder.
    pub fn add_method(
        &mut self,
        ty: Token,
        name: &str,
        signature: &[u8],
        param_names: &[&str],
    ) -> Result<Token> {
        let declaring_type = self.type_index(ty)?;
        let signature = self.add_blob(signature)?;
        let token = next_token(TableId::MethodDef, self.methods.len());
        let params = param_names
            .iter()
            .map(|name| ParamDetail {
                name: (*name).to_string(),
                ..Default::default()
            })
            .collect::<Vec<_>>();

        self.methods.push(MethodDefinition {
            token,
            name: name.to_string(),
            declaring_type,
            signature,
            parameter_count: u32::try_from(params.len())
                .map_err(|_| malformed_error!("Too many parameters on {}", name))?,
            generic_container: None,
            return_type: None,
            params,
        });
        self.types[declaring_type as usize]
            .methods
            .push(token.row() - 1);
        Ok(token)
    }

    /// Declare the generic parameters of a method.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `method` is not a `MethodDef` of this builder.
    pub fn add_method_generic_params(&mut self, method: Token, names: &[&str]) -> Result<()> {
        let index = row_index(method, TableId::MethodDef)?;
        if index as usize >= self.methods.len() {
            return Err(malformed_error!("Unknown method {}", method));
        }

        let container = self.push_container(GenericOwner::Method(index), names);
        self.methods[index as usize].generic_container = Some(container);
        Ok(())
    }

    /// Define a field on `ty` with its `FieldSig`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `ty` is not a `TypeDef` of this builder.
    pub fn add_field(&mut self, ty: Token, name: &str, signature: &[u8]) -> Result<Token> {
        let declaring_type = self.type_index(ty)?;
        let signature = self.add_blob(signature)?;
        let token = next_token(TableId::Field, self.fields.len());
        self.fields.push(FieldDefinition {
            token,
            name: name.to_string(),
            declaring_type,
            signature,
            field_type: None,
        });
        self.types[declaring_type as usize]
            .fields
            .push(token.row() - 1);
        Ok(token)
    }

    fn type_index(&self, token: Token) -> Result<u32> {
        let index = row_index(token, TableId::TypeDef)?;
        if index as usize >= self.types.len() {
            return Err(malformed_error!("Unknown type {}", token));
        }
        Ok(index)
    }

    fn push_container(&mut self, owner: GenericOwner, names: &[&str]) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let index = self.generic_containers.len() as u32;
        self.generic_containers
            .push((owner, names.iter().map(|n| (*n).to_string()).collect()));
        index
    }

    /// Lay out the image under `id` and cache the by-value descriptor of every type.
    ///
    /// Method and field signatures are decoded later by the registry, once the image can
    /// resolve types against other loaded images.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(self, id: ImageId) -> Image {
        let generic_containers = self
            .generic_containers
            .into_iter()
            .enumerate()
            .map(|(index, (owner, params))| GenericContainer {
                handle: GenericContainerHandle {
                    image: id,
                    index: index as u32,
                },
                owner,
                params,
            })
            .collect();

        let mut image = Image {
            id,
            name: self.name,
            strings: self.strings,
            blob: self.blob,
            tables: self.tables,
            types: self.types,
            methods: self.methods,
            fields: self.fields,
            generic_containers,
            type_cache: boxcar::Vec::new(),
        };

        for index in 0..image.types.len() {
            let handle = image.type_handle(index as u32);
            let kind = if image.types[index].is_value_type {
                TypeKind::ValueType(handle)
            } else {
                TypeKind::Class(handle)
            };
            image.types[index].byval_type = image.add_type_cache(TypeDescriptor::new(kind));
        }

        image
    }
}
