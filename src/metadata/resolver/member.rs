//! Resolution of method and field references to their definitions.
//!
//! A `MemberRef` names its target by parent type, name and signature. The signature is
//! read without a generic context, so generic parameters in it stay positional and are
//! matched against the candidate definitions by kind and number. Exactly one definition
//! must match.

use log::debug;

use crate::{
    metadata::{
        resolver::MetadataResolver,
        signatures::{decode_blob, MemberRefSignature, MethodRefSignature},
        tables::{CodedIndexType, TableId},
        typesystem::{
            FieldHandle, GenericContext, MethodHandle, TypeDescriptor, TypeHandle,
        },
    },
    Error, Result,
};

/// A `MemberRef` row with its parent and signature decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMemberRef {
    /// The type the member is looked up on
    pub parent: TypeDescriptor,
    /// Member name
    pub name: String,
    /// Field or method signature
    pub signature: MemberRefSignature,
}

/// The target of a method token.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRefInfo {
    /// The type the method was referenced through, possibly a generic instantiation
    pub container_type: TypeDescriptor,
    /// The resolved method definition
    pub method: MethodHandle,
    /// Method type arguments of a `MethodSpec`
    pub instantiation: Option<Vec<TypeDescriptor>>,
}

/// The target of a field token.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRefInfo {
    /// The type the field was referenced through, possibly a generic instantiation
    pub container_type: TypeDescriptor,
    /// The resolved field definition
    pub field: FieldHandle,
}

fn definition_index(table: TableId, row: u32) -> Result<u32> {
    row.checked_sub(1)
        .ok_or_else(|| malformed_error!("Null {} token", table))
}

fn instantiation_len(instantiation: Option<&Vec<TypeDescriptor>>) -> u32 {
    instantiation.map_or(0, |args| u32::try_from(args.len()).unwrap_or(u32::MAX))
}

impl MetadataResolver<'_> {
    /// Decode the parent, name and signature of a `MemberRef` row.
    ///
    /// The parent is resolved with `ctx`; the signature is read without a generic context.
    ///
    /// # Errors
    /// Propagates parent resolution and signature decoding failures.
    pub fn resolve_member_ref(
        &self,
        ctx: &GenericContext<'_>,
        row: u32,
    ) -> Result<ResolvedMemberRef> {
        let image = self.image();
        let member_ref = image.tables().member_ref.get(row)?;
        let name = image.get_string(member_ref.name)?.to_string();

        let (parent_table, parent_row) = CodedIndexType::MemberRefParent.decode(member_ref.class)?;
        let parent = self.read_member_ref_parent(ctx, parent_table, parent_row)?;

        let mut reader = decode_blob(image, member_ref.signature)?;
        let signature = self.read_member_ref_sig(&mut reader, &GenericContext::none())?;

        Ok(ResolvedMemberRef {
            parent,
            name,
            signature,
        })
    }

    /// Resolve a `MethodDef`, `MemberRef` or `MethodSpec` token to its method definition.
    ///
    /// For a `MethodSpec` the instantiation is read with `ctx` and must supply exactly as
    /// many arguments as the method declares generic parameters.
    ///
    /// # Errors
    /// - [`crate::Error::MemberNotFound`] / [`crate::Error::AmbiguousMember`] if not exactly
    ///   one definition matches a `MemberRef`
    /// - [`crate::Error::SignatureMismatch`] for a `MethodSpec` of the wrong arity
    /// - [`crate::Error::Malformed`] for any other table, or a `MemberRef` with a field
    ///   signature
    pub fn read_method_ref_info_from_token(
        &self,
        ctx: &GenericContext<'_>,
        table: TableId,
        row: u32,
    ) -> Result<MethodRefInfo> {
        match table {
            TableId::MethodDef => {
                let index = definition_index(table, row)?;
                let method = self.image().method_def(index)?;
                Ok(MethodRefInfo {
                    container_type: self.image().byval_type(method.declaring_type)?.clone(),
                    method: self.image().method_handle(index),
                    instantiation: None,
                })
            }
            TableId::MemberRef => self.method_from_member_ref(ctx, row),
            TableId::MethodSpec => {
                let spec = self.image().tables().method_spec.get(row)?;
                let mut reader = decode_blob(self.image(), spec.instantiation)?;
                let instantiation = self.read_method_spec_instantiation(&mut reader, ctx)?;

                let (method_table, method_row) =
                    CodedIndexType::MethodDefOrRef.decode(spec.method)?;
                let mut info = self.read_method_ref_info_from_token(ctx, method_table, method_row)?;

                let arity = self
                    .image_for(info.method.image)?
                    .method_generic_arity(info.method.index)?;
                let found = instantiation_len(instantiation.as_ref());
                if found != arity {
                    return Err(Error::SignatureMismatch {
                        what: "generic argument count",
                        expected: arity,
                        found,
                    });
                }

                info.instantiation = instantiation;
                Ok(info)
            }
            _ => Err(malformed_error!("{} does not hold methods", table)),
        }
    }

    /// Resolve a `Field` or `MemberRef` token to its field definition.
    ///
    /// # Errors
    /// - [`crate::Error::MemberNotFound`] / [`crate::Error::AmbiguousMember`] if not exactly
    ///   one definition matches a `MemberRef`
    /// - [`crate::Error::Malformed`] for any other table, or a `MemberRef` with a method
    ///   signature
    pub fn read_field_ref_info_from_token(
        &self,
        ctx: &GenericContext<'_>,
        table: TableId,
        row: u32,
    ) -> Result<FieldRefInfo> {
        match table {
            TableId::Field => {
                let index = definition_index(table, row)?;
                let field = self.image().field_def(index)?;
                Ok(FieldRefInfo {
                    container_type: self.image().byval_type(field.declaring_type)?.clone(),
                    field: FieldHandle {
                        image: self.image().id(),
                        index,
                    },
                })
            }
            TableId::MemberRef => {
                let member = self.resolve_member_ref(ctx, row)?;
                let MemberRefSignature::Field(field_type) = &member.signature else {
                    return Err(malformed_error!(
                        "MemberRef {} is a method, expected a field",
                        member.name
                    ));
                };

                let owner = self.member_owner(&member.parent, &member.name)?;
                let field = self.find_field(owner, &member.name, field_type)?;
                Ok(FieldRefInfo {
                    container_type: member.parent,
                    field,
                })
            }
            _ => Err(malformed_error!("{} does not hold fields", table)),
        }
    }

    /// Resolve the `CustomAttributeType` coded index of an attribute to its constructor.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a reserved tag, plus everything
    /// [`MetadataResolver::read_method_ref_info_from_token`] fails with.
    pub fn read_attribute_constructor(&self, raw: u32) -> Result<MethodRefInfo> {
        let (table, row) = CodedIndexType::CustomAttributeType.decode(raw)?;
        self.read_method_ref_info_from_token(&GenericContext::none(), table, row)
    }

    fn method_from_member_ref(&self, ctx: &GenericContext<'_>, row: u32) -> Result<MethodRefInfo> {
        let member = self.resolve_member_ref(ctx, row)?;
        let MemberRefSignature::Method(signature) = &member.signature else {
            return Err(malformed_error!(
                "MemberRef {} is a field, expected a method",
                member.name
            ));
        };

        let owner = self.member_owner(&member.parent, &member.name)?;
        let method = self.find_method(owner, &member.name, signature)?;
        Ok(MethodRefInfo {
            container_type: member.parent,
            method,
            instantiation: None,
        })
    }

    fn member_owner(&self, parent: &TypeDescriptor, name: &str) -> Result<TypeHandle> {
        parent
            .type_handle()
            .ok_or_else(|| not_supported_error!("Member {} on {} has no type definition", name, parent))
    }

    /// Find the single method of `owner` matching a reference signature.
    ///
    /// # Errors
    /// Returns [`crate::Error::MemberNotFound`] or [`crate::Error::AmbiguousMember`] unless
    /// exactly one method matches, and [`crate::Error::Unresolved`] if a candidate's
    /// signature was never decoded.
    pub fn find_method(
        &self,
        owner: TypeHandle,
        name: &str,
        signature: &MethodRefSignature,
    ) -> Result<MethodHandle> {
        let image = self.image_for(owner.image)?;
        let definition = image.type_def(owner.index)?;

        let mut matches = Vec::new();
        for &index in &definition.methods {
            let method = image.method_def(index)?;
            if method.name != name
                || image.method_generic_arity(index)? != signature.generic_param_count
                || method.params.len() != signature.params.len()
            {
                continue;
            }

            let return_type = method
                .return_type
                .ok_or_else(|| unresolved_error!("Signature of {} was not decoded", method.name))?;
            if !image.type_at(return_type)?.signature_eq(&signature.return_type) {
                continue;
            }

            let mut params_match = true;
            for (param, expected) in method.params.iter().zip(&signature.params) {
                let ty = param.parameter_type.ok_or_else(|| {
                    unresolved_error!("Parameter {} of {} was not decoded", param.name, method.name)
                })?;
                if !image.type_at(ty)?.signature_eq(expected) {
                    params_match = false;
                    break;
                }
            }

            if params_match {
                matches.push(index);
            }
        }

        match matches.as_slice() {
            [index] => {
                debug!(
                    "{}: {}::{} -> {}",
                    self.image().name(),
                    definition.full_name(),
                    name,
                    image.method_def(*index)?.token
                );
                Ok(image.method_handle(*index))
            }
            [] => Err(Error::MemberNotFound(format!(
                "{}::{}",
                definition.full_name(),
                name
            ))),
            _ => Err(Error::AmbiguousMember(format!(
                "{}::{} matches {} methods",
                definition.full_name(),
                name,
                matches.len()
            ))),
        }
    }

    /// Find the single field of `owner` with the given name and type.
    ///
    /// # Errors
    /// Returns [`crate::Error::MemberNotFound`] or [`crate::Error::AmbiguousMember`] unless
    /// exactly one field matches.
    pub fn find_field(
        &self,
        owner: TypeHandle,
        name: &str,
        field_type: &TypeDescriptor,
    ) -> Result<FieldHandle> {
        let image = self.image_for(owner.image)?;
        let definition = image.type_def(owner.index)?;

        let mut matches = Vec::new();
        for &index in &definition.fields {
            let field = image.field_def(index)?;
            if field.name != name {
                continue;
            }

            let ty = field
                .field_type
                .ok_or_else(|| unresolved_error!("Signature of {} was not decoded", field.name))?;
            if image.type_at(ty)?.signature_eq(field_type) {
                matches.push(index);
            }
        }

        match matches.as_slice() {
            [index] => {
                debug!(
                    "{}: {}::{} -> field {}",
                    self.image().name(),
                    definition.full_name(),
                    name,
                    index
                );
                Ok(FieldHandle {
                    image: image.id(),
                    index: *index,
                })
            }
            [] => Err(Error::MemberNotFound(format!(
                "{}::{}",
                definition.full_name(),
                name
            ))),
            _ => Err(Error::AmbiguousMember(format!(
                "{}::{} matches {} fields",
                definition.full_name(),
                name,
                matches.len()
            ))),
        }
    }
}
