//! Generic containers and the context `VAR`/`MVAR` are decoded against.
//!
//! A generic parameter seen while decoding is either bound to a container that is already
//! known ([`GenericParamRef::Resolved`]) or kept as its raw number
//! ([`GenericParamRef::Unresolved`]) when the signature is read without a context, for
//! example a `MemberRef` signature read before its parent is known. Turning pending numbers
//! into handles later is done explicitly with [`bind_generic_params`].

use crate::{
    metadata::typesystem::{ImageId, TypeDescriptor, TypeKind},
    Error, Result,
};

/// A generic container, addressed by image and 0-based index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GenericContainerHandle {
    /// Owning image
    pub image: ImageId,
    /// 0-based index into the image's generic containers
    pub index: u32,
}

/// A generic parameter of a known container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GenericParamHandle {
    /// The owning container
    pub container: GenericContainerHandle,
    /// 0-based position within the container
    pub number: u32,
}

/// A generic parameter reference inside a [`TypeDescriptor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenericParamRef {
    /// Decoded without a matching container; holds the raw position
    Unresolved(u32),
    /// Bound to a container
    Resolved(GenericParamHandle),
}

impl GenericParamRef {
    /// The 0-based position, bound or not.
    #[must_use]
    pub fn number(&self) -> u32 {
        match self {
            GenericParamRef::Unresolved(number) => *number,
            GenericParamRef::Resolved(handle) => handle.number,
        }
    }
}

/// Owner of a generic container: a type or a method, by 0-based index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenericOwner {
    /// A generic type definition
    Type(u32),
    /// A generic method definition
    Method(u32),
}

/// The generic parameters declared by one type or method.
#[derive(Clone, Debug)]
pub struct GenericContainer {
    /// Handle of this container
    pub handle: GenericContainerHandle,
    /// Declaring type or method
    pub owner: GenericOwner,
    /// Parameter names in declaration order
    pub params: Vec<String>,
}

impl GenericContainer {
    /// Returns `true` if the container belongs to a method.
    #[must_use]
    pub fn is_method(&self) -> bool {
        matches!(self.owner, GenericOwner::Method(_))
    }

    /// Number of generic parameters.
    #[must_use]
    pub fn arity(&self) -> u32 {
        u32::try_from(self.params.len()).unwrap_or(u32::MAX)
    }

    /// Handle of the parameter at `number`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the container has no such parameter.
    pub fn param(&self, number: u32) -> Result<GenericParamHandle> {
        if number >= self.arity() {
            return Err(malformed_error!(
                "Generic parameter {} outside a container of {} parameters",
                number,
                self.arity()
            ));
        }

        Ok(GenericParamHandle {
            container: self.handle,
            number,
        })
    }
}

/// The containers `VAR` and `MVAR` resolve against while decoding.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenericContext<'a> {
    /// Container of the enclosing type
    pub class: Option<&'a GenericContainer>,
    /// Container of the enclosing method
    pub method: Option<&'a GenericContainer>,
}

impl<'a> GenericContext<'a> {
    /// A context with the given containers.
    #[must_use]
    pub fn new(
        class: Option<&'a GenericContainer>,
        method: Option<&'a GenericContainer>,
    ) -> Self {
        GenericContext { class, method }
    }

    /// A context without containers; generic parameters stay unresolved.
    #[must_use]
    pub fn none() -> Self {
        GenericContext::default()
    }

    /// Only the class container, used for field signatures.
    #[must_use]
    pub fn class_only(&self) -> Self {
        GenericContext {
            class: self.class,
            method: None,
        }
    }

    /// Resolve a `VAR` number.
    ///
    /// # Errors
    /// Returns [`crate::Error::GenericContext`] if the class slot holds a method container.
    pub fn resolve_var(&self, number: u32) -> Result<GenericParamRef> {
        match self.class {
            Some(container) if container.is_method() => Err(Error::GenericContext(format!(
                "VAR {number} decoded against a method container"
            ))),
            Some(container) => Ok(GenericParamRef::Resolved(container.param(number)?)),
            None => Ok(GenericParamRef::Unresolved(number)),
        }
    }

    /// Resolve an `MVAR` number.
    ///
    /// # Errors
    /// Returns [`crate::Error::GenericContext`] if the method slot holds a class container.
    pub fn resolve_mvar(&self, number: u32) -> Result<GenericParamRef> {
        match self.method {
            Some(container) if !container.is_method() => Err(Error::GenericContext(format!(
                "MVAR {number} decoded against a class container"
            ))),
            Some(container) => Ok(GenericParamRef::Resolved(container.param(number)?)),
            None => Ok(GenericParamRef::Unresolved(number)),
        }
    }
}

/// Bind every pending generic parameter in `ty` against `ctx`.
///
/// Parameters that are already resolved are left untouched, as are pending ones whose
/// container is still missing from `ctx`.
///
/// # Errors
/// Fails like [`GenericContext::resolve_var`] and [`GenericContext::resolve_mvar`].
pub fn bind_generic_params(ty: &TypeDescriptor, ctx: &GenericContext) -> Result<TypeDescriptor> {
    let bind = |inner: &TypeDescriptor| -> Result<Box<TypeDescriptor>> {
        Ok(Box::new(bind_generic_params(inner, ctx)?))
    };

    let kind = match &ty.kind {
        TypeKind::Var(GenericParamRef::Unresolved(number)) => TypeKind::Var(ctx.resolve_var(*number)?),
        TypeKind::MVar(GenericParamRef::Unresolved(number)) => {
            TypeKind::MVar(ctx.resolve_mvar(*number)?)
        }
        TypeKind::Ptr(inner) => TypeKind::Ptr(bind(inner)?),
        TypeKind::SzArray(inner) => TypeKind::SzArray(bind(inner)?),
        TypeKind::Pinned(inner) => TypeKind::Pinned(bind(inner)?),
        TypeKind::Array(shape) => {
            let mut shape = shape.clone();
            shape.element = bind(&shape.element)?;
            TypeKind::Array(shape)
        }
        TypeKind::GenericInst(inst) => {
            let mut inst = inst.clone();
            inst.base = bind(&inst.base)?;
            inst.args = inst
                .args
                .iter()
                .map(|arg| bind_generic_params(arg, ctx))
                .collect::<Result<Vec<_>>>()?;
            TypeKind::GenericInst(inst)
        }
        other => other.clone(),
    };

    Ok(TypeDescriptor {
        kind,
        by_ref: ty.by_ref,
        modifiers: ty.modifiers,
    })
}
