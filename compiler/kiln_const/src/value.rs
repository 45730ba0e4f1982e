//! `ConstValue`: a compile-time value or an explicit marker that it is not
//! one (`Runtime`, `Undef`, `Zeroes`).
//!
//! Nested payloads are owned by their container. Pointers reference an
//! aggregate in the [`ConstArena`](crate::ConstArena) by ID.

use std::fmt;

use kiln_ir::{FnId, Name, TypeId};
use num_bigint::BigInt;

use crate::ConstId;

/// Status tag of a [`ConstValue`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConstStatus {
    Runtime,
    Static,
    Undef,
    Zeroes,
}

/// A compile-time value together with its type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConstValue {
    pub ty: TypeId,
    pub kind: ConstKind,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConstKind {
    /// Not known until execution.
    Runtime,
    /// Undefined bits. Poisons everything computed from it.
    Undef,
    /// Bulk zero-fill. Distinct from an explicit zero so large zeroed
    /// aggregates are never materialized unless read.
    Zeroes,
    Static(ConstPayload),
}

/// Payload of a `Static` value.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConstPayload {
    Int(BigInt),
    /// `f64` bits. `f32` values are stored widened.
    Float(u64),
    Bool(bool),
    Void,
    Fn(FnId),
    /// A type used as a value.
    Type(TypeId),
    Optional(Option<Box<ConstValue>>),
    ErrorUnion(ErrorUnionValue),
    Enum {
        tag: BigInt,
        payload: Option<Box<ConstValue>>,
    },
    Struct(Vec<ConstValue>),
    Array(ConstArray),
    Pointer(ConstPtr),
}

/// `!T` value: either an error identity or a payload.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorUnionValue {
    pub error: Option<Name>,
    pub payload: Option<Box<ConstValue>>,
}

/// Owned array elements with the array's explicit size.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ConstArray {
    elems: Vec<ConstValue>,
    len: u64,
}

impl ConstArray {
    pub fn new(elems: Vec<ConstValue>) -> Self {
        let len = elems.len() as u64;
        ConstArray { elems, len }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn elems(&self) -> &[ConstValue] {
        &self.elems
    }

    pub fn into_elems(self) -> Vec<ConstValue> {
        self.elems
    }
}

/// Non-owning pointer into an aggregate stored in the [`ConstArena`](crate::ConstArena).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConstPtr {
    pub base: ConstId,
    /// Element offset into the base aggregate.
    pub index: u64,
    /// Denotes a NUL-terminated string; concatenation keeps the terminator.
    pub is_c_str: bool,
}

impl ConstValue {
    // ── Markers ──

    pub fn runtime(ty: TypeId) -> Self {
        ConstValue {
            ty,
            kind: ConstKind::Runtime,
        }
    }

    pub fn undef(ty: TypeId) -> Self {
        ConstValue {
            ty,
            kind: ConstKind::Undef,
        }
    }

    pub fn zeroes(ty: TypeId) -> Self {
        ConstValue {
            ty,
            kind: ConstKind::Zeroes,
        }
    }

    // ── Static constructors ──

    pub fn new_static(ty: TypeId, payload: ConstPayload) -> Self {
        ConstValue {
            ty,
            kind: ConstKind::Static(payload),
        }
    }

    pub fn int(ty: TypeId, value: impl Into<BigInt>) -> Self {
        Self::new_static(ty, ConstPayload::Int(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Self::new_static(TypeId::BOOL, ConstPayload::Bool(value))
    }

    pub fn float(ty: TypeId, value: f64) -> Self {
        Self::new_static(ty, ConstPayload::Float(value.to_bits()))
    }

    pub fn void() -> Self {
        Self::new_static(TypeId::VOID, ConstPayload::Void)
    }

    pub fn type_value(ty: TypeId) -> Self {
        Self::new_static(TypeId::TYPE, ConstPayload::Type(ty))
    }

    pub fn fn_ref(ty: TypeId, func: FnId) -> Self {
        Self::new_static(ty, ConstPayload::Fn(func))
    }

    pub fn optional(ty: TypeId, payload: Option<ConstValue>) -> Self {
        Self::new_static(ty, ConstPayload::Optional(payload.map(Box::new)))
    }

    pub fn error_union_ok(ty: TypeId, payload: ConstValue) -> Self {
        Self::new_static(
            ty,
            ConstPayload::ErrorUnion(ErrorUnionValue {
                error: None,
                payload: Some(Box::new(payload)),
            }),
        )
    }

    pub fn error_union_err(ty: TypeId, error: Name) -> Self {
        Self::new_static(
            ty,
            ConstPayload::ErrorUnion(ErrorUnionValue {
                error: Some(error),
                payload: None,
            }),
        )
    }

    pub fn enum_value(ty: TypeId, tag: impl Into<BigInt>) -> Self {
        Self::new_static(
            ty,
            ConstPayload::Enum {
                tag: tag.into(),
                payload: None,
            },
        )
    }

    pub fn struct_value(ty: TypeId, fields: Vec<ConstValue>) -> Self {
        Self::new_static(ty, ConstPayload::Struct(fields))
    }

    pub fn array(ty: TypeId, elems: Vec<ConstValue>) -> Self {
        Self::new_static(ty, ConstPayload::Array(ConstArray::new(elems)))
    }

    pub fn pointer(ty: TypeId, ptr: ConstPtr) -> Self {
        Self::new_static(ty, ConstPayload::Pointer(ptr))
    }

    // ── Queries ──

    pub fn status(&self) -> ConstStatus {
        match self.kind {
            ConstKind::Runtime => ConstStatus::Runtime,
            ConstKind::Undef => ConstStatus::Undef,
            ConstKind::Zeroes => ConstStatus::Zeroes,
            ConstKind::Static(_) => ConstStatus::Static,
        }
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self.kind, ConstKind::Runtime)
    }

    pub fn is_undef(&self) -> bool {
        matches!(self.kind, ConstKind::Undef)
    }

    /// Known at compile time (anything but `Runtime`).
    pub fn is_comptime(&self) -> bool {
        !self.is_runtime()
    }

    pub fn payload(&self) -> Option<&ConstPayload> {
        match &self.kind {
            ConstKind::Static(p) => Some(p),
            _ => None,
        }
    }

    /// Integer value, reading `Zeroes` as zero.
    pub fn as_int(&self) -> Option<BigInt> {
        match &self.kind {
            ConstKind::Static(ConstPayload::Int(v)) => Some(v.clone()),
            ConstKind::Static(ConstPayload::Enum { tag, .. }) => Some(tag.clone()),
            ConstKind::Zeroes => Some(BigInt::from(0)),
            _ => None,
        }
    }

    /// Boolean value, reading `Zeroes` as `false`.
    pub fn as_bool(&self) -> Option<bool> {
        match &self.kind {
            ConstKind::Static(ConstPayload::Bool(b)) => Some(*b),
            ConstKind::Zeroes => Some(false),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<TypeId> {
        match &self.kind {
            ConstKind::Static(ConstPayload::Type(t)) => Some(*t),
            _ => None,
        }
    }

    pub fn as_ptr(&self) -> Option<ConstPtr> {
        match &self.kind {
            ConstKind::Static(ConstPayload::Pointer(p)) => Some(*p),
            _ => None,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConstKind::Runtime => f.write_str("<runtime>"),
            ConstKind::Undef => f.write_str("undefined"),
            ConstKind::Zeroes => f.write_str("zeroes"),
            ConstKind::Static(p) => write!(f, "{p}"),
        }
    }
}

impl fmt::Display for ConstPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstPayload::Int(v) => write!(f, "{v}"),
            ConstPayload::Float(bits) => write!(f, "{:?}", f64::from_bits(*bits)),
            ConstPayload::Bool(b) => write!(f, "{b}"),
            ConstPayload::Void => f.write_str("{}"),
            ConstPayload::Fn(id) => write!(f, "{id:?}"),
            ConstPayload::Type(t) => write!(f, "{t:?}"),
            ConstPayload::Optional(None) => f.write_str("null"),
            ConstPayload::Optional(Some(v)) => write!(f, "{v}"),
            ConstPayload::ErrorUnion(eu) => match (&eu.error, &eu.payload) {
                (Some(e), _) => write!(f, "error({})", e.raw()),
                (None, Some(v)) => write!(f, "{v}"),
                (None, None) => f.write_str("{}"),
            },
            ConstPayload::Enum { tag, .. } => write!(f, "tag({tag})"),
            ConstPayload::Struct(fields) => {
                f.write_str(".{")?;
                for (i, v) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("}")
            }
            ConstPayload::Array(arr) => {
                f.write_str("[")?;
                for (i, v) in arr.elems().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            ConstPayload::Pointer(p) => {
                write!(f, "&{:?}[{}]", p.base, p.index)?;
                if p.is_c_str {
                    f.write_str(" c\"\"")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests;
