//! Recursive-descent readers for type descriptors and the signature kinds built from them.
//!
//! Every reader takes the [`BlobReader`] positioned at the start of its production and a
//! [`GenericContext`] that `VAR`/`MVAR` are bound against. Tokens found inside a blob are
//! resolved against the image the blob belongs to.

use log::trace;

use crate::{
    metadata::{
        resolver::MetadataResolver,
        signatures::{
            calling_convention, BlobReader, MemberRefSignature, MethodRefSignature,
            SignatureFlags, StandAloneSignature, CALLING_CONVENTION, SIGNATURE_HEADER,
        },
        tables::CodedIndexType,
        typesystem::{
            ArrayShape, GenericContext, GenericInstType, MethodDefinition, ParamDetail,
            TypeDescriptor, TypeKind, ELEMENT_TYPE,
        },
    },
    Error, Result,
};

/// Largest element count of a `LocalVarSig` or call-site signature
const MAX_SIGNATURE_ELEMENTS: u32 = 0xFFFE;

fn require_header(found: u8, expected: u8, what: &str) -> Result<()> {
    if calling_convention(found) != expected {
        return Err(malformed_error!(
            "Invalid {} header - {:#04x}",
            what,
            found
        ));
    }
    Ok(())
}

/// Rejects the headers of the non-method signature kinds. Any other calling convention,
/// unmanaged ones included, is accepted.
fn require_method_header(header: u8) -> Result<()> {
    match calling_convention(header) {
        SIGNATURE_HEADER::FIELD
        | SIGNATURE_HEADER::LOCAL_SIG
        | SIGNATURE_HEADER::PROPERTY
        | SIGNATURE_HEADER::GENERIC_INST => Err(malformed_error!(
            "Invalid method signature header - {:#04x}",
            header
        )),
        _ => Ok(()),
    }
}

fn reject_sentinel(ty: TypeDescriptor, position: &str) -> Result<TypeDescriptor> {
    if ty.is_sentinel() {
        return Err(malformed_error!("Sentinel in {}", position));
    }
    Ok(ty)
}

impl MetadataResolver<'_> {
    /// Read one type descriptor.
    ///
    /// A `SENTINEL` is returned as a descriptor of its own here; it is only rejected when it
    /// shows up nested inside another type.
    ///
    /// # Errors
    /// - [`crate::Error::Malformed`] / [`crate::Error::OutOfBounds`] for bad or truncated
    ///   encodings and structurally invalid types
    /// - [`crate::Error::NotSupported`] for `FNPTR`, `INTERNAL` and `MODIFIER`
    /// - [`crate::Error::GenericContext`] for a generic parameter bound against the wrong
    ///   container kind
    /// - [`crate::Error::RecursionLimit`] when nesting exceeds the configured depth
    /// - resolution errors from the tokens of `CLASS`, `VALUETYPE` and custom modifiers
    pub fn read_type(
        &self,
        reader: &mut BlobReader<'_>,
        ctx: &GenericContext<'_>,
    ) -> Result<TypeDescriptor> {
        self.read_type_at(reader, ctx, true)
    }

    fn read_nested_type(
        &self,
        reader: &mut BlobReader<'_>,
        ctx: &GenericContext<'_>,
    ) -> Result<TypeDescriptor> {
        self.read_type_at(reader, ctx, false)
    }

    fn read_type_at(
        &self,
        reader: &mut BlobReader<'_>,
        ctx: &GenericContext<'_>,
        top_level: bool,
    ) -> Result<TypeDescriptor> {
        reader.enter(self.registry().config().max_recursion_depth)?;
        let result = self.read_type_body(reader, ctx, top_level);
        reader.leave();
        result
    }

    fn read_type_body(
        &self,
        reader: &mut BlobReader<'_>,
        ctx: &GenericContext<'_>,
        top_level: bool,
    ) -> Result<TypeDescriptor> {
        let mut modifiers = 0_u32;

        loop {
            let offset = reader.pos();
            let tag = reader.read_u8()?;
            trace!("element type {:#04x} at offset {}", tag, offset);

            if let Some(kind) = TypeKind::from_primitive(tag) {
                return Ok(TypeDescriptor {
                    kind,
                    by_ref: false,
                    modifiers,
                });
            }

            let kind = match tag {
                ELEMENT_TYPE::CMOD_REQD | ELEMENT_TYPE::CMOD_OPT => {
                    // the modifier type is validated but not resolved
                    let raw = reader.read_compressed_uint()?;
                    CodedIndexType::TypeDefOrRef.decode(raw)?;
                    modifiers += 1;
                    continue;
                }
                ELEMENT_TYPE::BYREF => {
                    let mut inner = self.read_nested_type(reader, ctx)?;
                    inner.by_ref = true;
                    inner.modifiers += modifiers;
                    return Ok(inner);
                }
                ELEMENT_TYPE::PTR => TypeKind::Ptr(Box::new(self.read_nested_type(reader, ctx)?)),
                ELEMENT_TYPE::SZARRAY => {
                    TypeKind::SzArray(Box::new(self.read_nested_type(reader, ctx)?))
                }
                ELEMENT_TYPE::PINNED => {
                    TypeKind::Pinned(Box::new(self.read_nested_type(reader, ctx)?))
                }
                ELEMENT_TYPE::CLASS | ELEMENT_TYPE::VALUETYPE => {
                    let raw = reader.read_compressed_uint()?;
                    let (table, row) = CodedIndexType::TypeDefOrRef.decode(raw)?;
                    let resolved = self.rebind(reader.image()).type_from_token(
                        ctx,
                        table,
                        row,
                        reader.depth(),
                    )?;
                    resolved.kind
                }
                ELEMENT_TYPE::ARRAY => TypeKind::Array(self.read_array_shape(reader, ctx)?),
                ELEMENT_TYPE::GENERICINST => {
                    TypeKind::GenericInst(self.read_generic_inst(reader, ctx)?)
                }
                ELEMENT_TYPE::VAR => TypeKind::Var(ctx.resolve_var(reader.read_compressed_uint()?)?),
                ELEMENT_TYPE::MVAR => {
                    TypeKind::MVar(ctx.resolve_mvar(reader.read_compressed_uint()?)?)
                }
                ELEMENT_TYPE::SENTINEL => {
                    if !top_level {
                        return Err(malformed_error!("Nested sentinel at offset {}", offset));
                    }
                    TypeKind::Sentinel
                }
                ELEMENT_TYPE::FNPTR => return Err(not_supported_error!("FNPTR at offset {}", offset)),
                ELEMENT_TYPE::INTERNAL => {
                    return Err(not_supported_error!("INTERNAL at offset {}", offset))
                }
                ELEMENT_TYPE::MODIFIER => {
                    return Err(not_supported_error!("MODIFIER at offset {}", offset))
                }
                _ => {
                    return Err(malformed_error!(
                        "Unknown element type {:#04x} at offset {}",
                        tag,
                        offset
                    ))
                }
            };

            return Ok(TypeDescriptor {
                kind,
                by_ref: false,
                modifiers,
            });
        }
    }

    fn read_array_shape(
        &self,
        reader: &mut BlobReader<'_>,
        ctx: &GenericContext<'_>,
    ) -> Result<ArrayShape> {
        let element = self.read_nested_type(reader, ctx)?;
        let rank = reader.read_compressed_uint()?;

        let num_sizes = reader.read_compressed_uint()?;
        let mut sizes = Vec::new();
        for _ in 0..num_sizes {
            sizes.push(reader.read_compressed_uint()?);
        }

        let num_lo_bounds = reader.read_compressed_uint()?;
        let mut lower_bounds = Vec::new();
        for _ in 0..num_lo_bounds {
            lower_bounds.push(reader.read_compressed_int()?);
        }

        Ok(ArrayShape {
            element: Box::new(element),
            rank,
            sizes,
            lower_bounds,
        })
    }

    fn read_generic_inst(
        &self,
        reader: &mut BlobReader<'_>,
        ctx: &GenericContext<'_>,
    ) -> Result<GenericInstType> {
        let base = self.read_nested_type(reader, ctx)?;
        if !matches!(base.kind, TypeKind::Class(_) | TypeKind::ValueType(_)) {
            return Err(malformed_error!(
                "GENERICINST base must be a class or value type, got {}",
                base
            ));
        }

        let arg_count = reader.read_compressed_uint()?;
        if arg_count == 0 {
            return Err(malformed_error!("GENERICINST of {} without arguments", base));
        }

        let mut args = Vec::new();
        for _ in 0..arg_count {
            args.push(self.read_nested_type(reader, ctx)?);
        }

        Ok(GenericInstType {
            base: Box::new(base),
            args,
        })
    }

    /// Read parameters of a call site, splitting them at an optional sentinel.
    ///
    /// The sentinel does not count towards `count`.
    fn read_call_site_params(
        &self,
        reader: &mut BlobReader<'_>,
        ctx: &GenericContext<'_>,
        header: u8,
        count: u32,
    ) -> Result<(Vec<TypeDescriptor>, Vec<TypeDescriptor>)> {
        let mut params = Vec::new();
        let mut vararg_params = Vec::new();
        let mut seen_sentinel = false;

        let mut read = 0;
        while read < count {
            let ty = self.read_type(reader, ctx)?;
            if ty.is_sentinel() {
                if calling_convention(header) != CALLING_CONVENTION::VARARG {
                    return Err(malformed_error!(
                        "Sentinel in a non-vararg signature - {:#04x}",
                        header
                    ));
                }
                if seen_sentinel {
                    return Err(malformed_error!("Second sentinel in a vararg signature"));
                }
                seen_sentinel = true;
                continue;
            }

            if seen_sentinel {
                vararg_params.push(ty);
            } else {
                params.push(ty);
            }
            read += 1;
        }

        Ok((params, vararg_params))
    }

    /// Read a `FieldSig`. Only the class container of `ctx` applies to fields.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a header other than `FIELD`, plus everything
    /// [`MetadataResolver::read_type`] fails with.
    pub fn read_field_ref_sig(
        &self,
        reader: &mut BlobReader<'_>,
        ctx: &GenericContext<'_>,
    ) -> Result<TypeDescriptor> {
        require_header(reader.read_u8()?, SIGNATURE_HEADER::FIELD, "field signature")?;
        let ty = self.read_type(reader, &ctx.class_only())?;
        reject_sentinel(ty, "a field signature")
    }

    /// Read a `MethodRefSig` as found in a `MemberRef` row.
    ///
    /// Parameters that follow a sentinel are kept in
    /// [`MethodRefSignature::vararg_params`].
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a non-method header or a sentinel outside a
    /// vararg signature, plus everything [`MetadataResolver::read_type`] fails with.
    pub fn read_method_ref_sig(
        &self,
        reader: &mut BlobReader<'_>,
        ctx: &GenericContext<'_>,
    ) -> Result<MethodRefSignature> {
        let header = reader.read_u8()?;
        require_method_header(header)?;

        let generic_param_count = if SignatureFlags::from_header(header).contains(SignatureFlags::GENERIC) {
            reader.read_compressed_uint()?
        } else {
            0
        };
        let param_count = reader.read_compressed_uint()?;
        let return_type = reject_sentinel(self.read_type(reader, ctx)?, "a return type")?;
        let (params, vararg_params) = self.read_call_site_params(reader, ctx, header, param_count)?;

        Ok(MethodRefSignature {
            header,
            generic_param_count,
            return_type,
            params,
            vararg_params,
        })
    }

    /// Read the `MethodDefSig` of `method` and record its types in the image type cache.
    ///
    /// The return type index is written to `method.return_type` and every parameter type
    /// index to the matching slot of `params`, in declaration order. Parameters are read
    /// until the blob is exhausted.
    ///
    /// # Errors
    /// Returns [`crate::Error::SignatureMismatch`] if the generic count differs from the
    /// method's generic arity, the declared parameter count differs from
    /// `method.parameter_count`, or the blob holds a different number of parameters than it
    /// declares or `params` has slots for.
    pub fn read_method_def_sig(
        &self,
        reader: &mut BlobReader<'_>,
        ctx: &GenericContext<'_>,
        method: &mut MethodDefinition,
        params: &mut [ParamDetail],
    ) -> Result<()> {
        let image = reader.image();
        let header = reader.read_u8()?;
        require_method_header(header)?;

        let arity = match method.generic_container {
            Some(container) => image.generic_container(container)?.arity(),
            None => 0,
        };
        let generic_count = if SignatureFlags::from_header(header).contains(SignatureFlags::GENERIC) {
            reader.read_compressed_uint()?
        } else {
            0
        };
        if generic_count != arity {
            return Err(Error::SignatureMismatch {
                what: "generic parameter count",
                expected: arity,
                found: generic_count,
            });
        }

        let param_count = reader.read_compressed_uint()?;
        if param_count != method.parameter_count {
            return Err(Error::SignatureMismatch {
                what: "parameter count",
                expected: method.parameter_count,
                found: param_count,
            });
        }

        let return_type = reject_sentinel(self.read_type(reader, ctx)?, "a return type")?;
        method.return_type = Some(image.add_type_cache(return_type));

        let mut read = 0_u32;
        while reader.has_more_data() {
            let Some(slot) = params.get_mut(read as usize) else {
                return Err(Error::SignatureMismatch {
                    what: "parameter slots",
                    expected: u32::try_from(params.len()).unwrap_or(u32::MAX),
                    found: read + 1,
                });
            };

            let ty = reject_sentinel(self.read_type(reader, ctx)?, "a method definition")?;
            slot.index = read;
            slot.parameter_type = Some(image.add_type_cache(ty));
            read += 1;
        }

        if read != param_count {
            return Err(Error::SignatureMismatch {
                what: "parameters in signature",
                expected: param_count,
                found: read,
            });
        }

        trace!(
            "{}: {} parameters, generic arity {}",
            method.name,
            param_count,
            arity
        );
        Ok(())
    }

    /// Read a `MethodSpec` instantiation blob.
    ///
    /// Returns `None` for an instantiation without arguments.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a header other than `GENERIC_INST` or an
    /// argument count of `max_method_spec_args` or more.
    pub fn read_method_spec_instantiation(
        &self,
        reader: &mut BlobReader<'_>,
        ctx: &GenericContext<'_>,
    ) -> Result<Option<Vec<TypeDescriptor>>> {
        let header = reader.read_u8()?;
        if header != SIGNATURE_HEADER::GENERIC_INST {
            return Err(malformed_error!("Invalid MethodSpec header - {:#04x}", header));
        }

        let arg_count = reader.read_compressed_uint()?;
        let limit = self.registry().config().max_method_spec_args;
        if arg_count >= limit {
            return Err(malformed_error!(
                "MethodSpec with {} arguments, limit is {}",
                arg_count,
                limit
            ));
        }
        if arg_count == 0 {
            return Ok(None);
        }

        let mut args = Vec::new();
        for _ in 0..arg_count {
            args.push(reject_sentinel(self.read_type(reader, ctx)?, "a MethodSpec")?);
        }
        Ok(Some(args))
    }

    /// Read a `LocalVarSig`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a header other than `LOCAL_SIG` or a count
    /// outside `1..=0xFFFE`.
    pub fn read_local_var_sig(
        &self,
        reader: &mut BlobReader<'_>,
        ctx: &GenericContext<'_>,
    ) -> Result<Vec<TypeDescriptor>> {
        let header = reader.read_u8()?;
        if header != SIGNATURE_HEADER::LOCAL_SIG {
            return Err(malformed_error!("Invalid LocalVarSig header - {:#04x}", header));
        }

        let count = reader.read_compressed_uint()?;
        if !(1..=MAX_SIGNATURE_ELEMENTS).contains(&count) {
            return Err(malformed_error!("LocalVarSig with {} locals", count));
        }

        let mut locals = Vec::new();
        for _ in 0..count {
            locals.push(reject_sentinel(self.read_type(reader, ctx)?, "a LocalVarSig")?);
        }
        Ok(locals)
    }

    /// Read a call-site signature from the `StandAloneSig` table.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a parameter count outside `1..=0xFFFE`.
    /// The leading byte is kept as flags and not validated.
    pub fn read_standalone_sig(
        &self,
        reader: &mut BlobReader<'_>,
        ctx: &GenericContext<'_>,
    ) -> Result<StandAloneSignature> {
        let header = reader.read_u8()?;

        let param_count = reader.read_compressed_uint()?;
        if !(1..=MAX_SIGNATURE_ELEMENTS).contains(&param_count) {
            return Err(malformed_error!(
                "StandAloneSig with {} parameters",
                param_count
            ));
        }

        let return_type = reject_sentinel(self.read_type(reader, ctx)?, "a return type")?;
        let (params, vararg_params) = self.read_call_site_params(reader, ctx, header, param_count)?;

        Ok(StandAloneSignature {
            header,
            return_type,
            params,
            vararg_params,
        })
    }

    /// Read the signature of a `MemberRef`, dispatching on its header.
    ///
    /// # Errors
    /// See [`MetadataResolver::read_field_ref_sig`] and
    /// [`MetadataResolver::read_method_ref_sig`].
    pub fn read_member_ref_sig(
        &self,
        reader: &mut BlobReader<'_>,
        ctx: &GenericContext<'_>,
    ) -> Result<MemberRefSignature> {
        if calling_convention(reader.peek_u8()?) == SIGNATURE_HEADER::FIELD {
            Ok(MemberRefSignature::Field(self.read_field_ref_sig(reader, ctx)?))
        } else {
            Ok(MemberRefSignature::Method(self.read_method_ref_sig(reader, ctx)?))
        }
    }
}
