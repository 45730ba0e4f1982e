//! Reads out of aggregate constants.
//!
//! `Zeroes` aggregates are never expanded eagerly: reading a field yields
//! the zero of the field type, which is itself `Zeroes` when the field is
//! an aggregate. `Undef` aggregates yield `Undef` fields; `Runtime` yields
//! `Runtime`.

use kiln_ir::TypeId;
use num_bigint::BigInt;

use crate::{ConstArena, ConstError, ConstKind, ConstPayload, ConstPtr, ConstValue};

/// Layout of a type as far as constant values care.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Shape {
    /// A scalar whose zero is the given payload.
    Scalar(ConstPayload),
    /// `?T`, zero is `null`.
    Optional(TypeId),
    /// Struct or union field types in declaration order.
    Struct(Vec<TypeId>),
    Array { elem: TypeId, len: u64 },
    /// No concrete zero (pointers, functions); stays `Zeroes`.
    Opaque,
}

/// Type information needed to read and materialize constants.
///
/// Implemented by the type table.
pub trait ValueShape {
    fn shape(&self, ty: TypeId) -> Shape;
}

impl ConstValue {
    /// Zero value of `ty`: concrete for scalars, `Zeroes` for aggregates.
    pub fn zero_of(ty: TypeId, shapes: &dyn ValueShape) -> ConstValue {
        match shapes.shape(ty) {
            Shape::Scalar(payload) => ConstValue::new_static(ty, payload),
            Shape::Optional(_) => ConstValue::optional(ty, None),
            Shape::Struct(_) | Shape::Array { .. } | Shape::Opaque => ConstValue::zeroes(ty),
        }
    }

    /// Read field `index` of a struct value.
    pub fn field(&self, index: usize, shapes: &dyn ValueShape) -> Result<ConstValue, ConstError> {
        let field_ty = match shapes.shape(self.ty) {
            Shape::Struct(fields) => *fields.get(index).ok_or(ConstError::IndexOutOfBounds {
                index: index as u64,
                len: fields.len() as u64,
            })?,
            _ => return Err(ConstError::NotAggregate),
        };
        match &self.kind {
            ConstKind::Runtime => Ok(ConstValue::runtime(field_ty)),
            ConstKind::Undef => Ok(ConstValue::undef(field_ty)),
            ConstKind::Zeroes => Ok(ConstValue::zero_of(field_ty, shapes)),
            ConstKind::Static(ConstPayload::Struct(fields)) => {
                fields.get(index).cloned().ok_or(ConstError::IndexOutOfBounds {
                    index: index as u64,
                    len: fields.len() as u64,
                })
            }
            ConstKind::Static(_) => Err(ConstError::NotAggregate),
        }
    }

    /// Read element `index` of an array value.
    pub fn element(&self, index: u64, shapes: &dyn ValueShape) -> Result<ConstValue, ConstError> {
        let Shape::Array { elem, len } = shapes.shape(self.ty) else {
            return Err(ConstError::NotAggregate);
        };
        if index >= len {
            return Err(ConstError::IndexOutOfBounds { index, len });
        }
        match &self.kind {
            ConstKind::Runtime => Ok(ConstValue::runtime(elem)),
            ConstKind::Undef => Ok(ConstValue::undef(elem)),
            ConstKind::Zeroes => Ok(ConstValue::zero_of(elem, shapes)),
            ConstKind::Static(ConstPayload::Array(arr)) => usize::try_from(index)
                .ok()
                .and_then(|i| arr.elems().get(i))
                .cloned()
                .ok_or(ConstError::IndexOutOfBounds { index, len }),
            ConstKind::Static(_) => Err(ConstError::NotAggregate),
        }
    }

    /// Payload of an optional: `Ok(None)` for `null`.
    pub fn optional_payload(
        &self,
        shapes: &dyn ValueShape,
    ) -> Result<Option<ConstValue>, ConstError> {
        let Shape::Optional(child) = shapes.shape(self.ty) else {
            return Err(ConstError::NotAggregate);
        };
        match &self.kind {
            ConstKind::Runtime => Ok(Some(ConstValue::runtime(child))),
            ConstKind::Undef => Err(ConstError::Undefined),
            ConstKind::Zeroes => Ok(None),
            ConstKind::Static(ConstPayload::Optional(p)) => Ok(p.as_deref().cloned()),
            ConstKind::Static(_) => Err(ConstError::NotAggregate),
        }
    }

    /// Recursively replace `Zeroes` with explicit zero values.
    ///
    /// `Opaque` types keep their `Zeroes` marker. Fails with
    /// [`ConstError::TooLarge`] instead of expanding more than
    /// [`MATERIALIZE_LIMIT`] values.
    pub fn materialize(&self, shapes: &dyn ValueShape) -> Result<ConstValue, ConstError> {
        let mut budget = MATERIALIZE_LIMIT;
        self.materialize_within(shapes, &mut budget)
    }

    fn materialize_within(
        &self,
        shapes: &dyn ValueShape,
        budget: &mut u64,
    ) -> Result<ConstValue, ConstError> {
        match &self.kind {
            ConstKind::Zeroes => {
                let size = zeroes_size(self.ty, shapes)
                    .filter(|&n| n <= *budget)
                    .ok_or(ConstError::TooLarge {
                        limit: MATERIALIZE_LIMIT,
                    })?;
                *budget -= size;
                Ok(expand_zeroes(self.ty, shapes))
            }
            ConstKind::Static(ConstPayload::Struct(fields)) => {
                let mut out = Vec::with_capacity(fields.len());
                for f in fields {
                    out.push(f.materialize_within(shapes, budget)?);
                }
                Ok(ConstValue::struct_value(self.ty, out))
            }
            ConstKind::Static(ConstPayload::Array(arr)) => {
                let mut out = Vec::with_capacity(arr.elems().len());
                for e in arr.elems() {
                    out.push(e.materialize_within(shapes, budget)?);
                }
                Ok(ConstValue::array(self.ty, out))
            }
            _ => Ok(self.clone()),
        }
    }
}

/// Most values a single [`ConstValue::materialize`] expands `Zeroes` into.
pub const MATERIALIZE_LIMIT: u64 = 1 << 20;

/// Values created by expanding a `Zeroes` of `ty`, counting each
/// aggregate and each leaf. `None` on overflow.
fn zeroes_size(ty: TypeId, shapes: &dyn ValueShape) -> Option<u64> {
    match shapes.shape(ty) {
        Shape::Scalar(_) | Shape::Optional(_) | Shape::Opaque => Some(1),
        Shape::Struct(fields) => fields
            .into_iter()
            .try_fold(1u64, |acc, f| acc.checked_add(zeroes_size(f, shapes)?)),
        Shape::Array { elem, len } => {
            // An empty array never expands its element.
            if len == 0 {
                return Some(1);
            }
            len.checked_mul(zeroes_size(elem, shapes)?)?.checked_add(1)
        }
    }
}

/// Explicit zero of `ty`. Callers bound the size with [`zeroes_size`].
fn expand_zeroes(ty: TypeId, shapes: &dyn ValueShape) -> ConstValue {
    match shapes.shape(ty) {
        Shape::Scalar(payload) => ConstValue::new_static(ty, payload),
        Shape::Optional(_) => ConstValue::optional(ty, None),
        Shape::Struct(fields) => ConstValue::struct_value(
            ty,
            fields
                .into_iter()
                .map(|f| expand_zeroes(f, shapes))
                .collect(),
        ),
        Shape::Array { elem, len } => {
            let zero = expand_zeroes(elem, shapes);
            let count = usize::try_from(len).unwrap_or(0);
            ConstValue::array(ty, vec![zero; count])
        }
        Shape::Opaque => ConstValue::zeroes(ty),
    }
}

/// Elements of one `++` operand, without a C-string terminator.
fn concat_operand(
    value: &ConstValue,
    arena: &ConstArena,
    shapes: &dyn ValueShape,
) -> Result<(Vec<ConstValue>, bool), ConstError> {
    match &value.kind {
        ConstKind::Runtime => Err(ConstError::NotComptime),
        ConstKind::Undef => Err(ConstError::Undefined),
        ConstKind::Zeroes => match value.materialize(shapes)?.kind {
            ConstKind::Static(ConstPayload::Array(arr)) => Ok((arr.into_elems(), false)),
            _ => Err(ConstError::InvalidOperands { op: "++" }),
        },
        ConstKind::Static(ConstPayload::Array(arr)) => Ok((arr.elems().to_vec(), false)),
        ConstKind::Static(ConstPayload::Pointer(ptr)) if ptr.is_c_str => {
            let mut elems = arena.pointee_elems(*ptr)?.to_vec();
            if elems
                .last()
                .and_then(ConstValue::as_int)
                .is_some_and(|v| v == BigInt::from(0))
            {
                elems.pop();
            }
            Ok((elems, true))
        }
        ConstKind::Static(_) => Err(ConstError::InvalidOperands { op: "++" }),
    }
}

/// Compile-time `lhs ++ rhs`.
///
/// Arrays concatenate into a new array of type `array_of(len)`. When either
/// side is a C-string pointer the result is a C-string pointer (of that
/// side's pointer type) to a fresh arena array that ends in exactly one NUL.
pub fn concat(
    arena: &mut ConstArena,
    shapes: &dyn ValueShape,
    lhs: &ConstValue,
    rhs: &ConstValue,
    array_of: impl FnOnce(u64) -> TypeId,
) -> Result<ConstValue, ConstError> {
    let (mut elems, l_cstr) = concat_operand(lhs, arena, shapes)?;
    let (tail, r_cstr) = concat_operand(rhs, arena, shapes)?;
    elems.extend(tail);

    if !(l_cstr || r_cstr) {
        let ty = array_of(elems.len() as u64);
        return Ok(ConstValue::array(ty, elems));
    }

    elems.push(ConstValue::int(TypeId::U8, 0));
    let array_ty = array_of(elems.len() as u64);
    let ptr_ty = if l_cstr { lhs.ty } else { rhs.ty };
    let base = arena.alloc(ConstValue::array(array_ty, elems));
    Ok(ConstValue::pointer(
        ptr_ty,
        ConstPtr {
            base,
            index: 0,
            is_c_str: true,
        },
    ))
}
