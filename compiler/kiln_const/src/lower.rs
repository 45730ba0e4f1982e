//! Handing constants to the native-code backend.
//!
//! The backend implements [`ConstLowering`] for its own constant handle
//! type; [`lower_const`] walks a value bottom-up and calls one hook per
//! node. `Zeroes` and `Undef` have dedicated hooks so a backend can emit a
//! zero-initializer or an undef constant without materializing the
//! aggregate.

use kiln_ir::{FnId, Name, TypeId};
use num_bigint::BigInt;

use crate::{ConstArena, ConstError, ConstId, ConstKind, ConstPayload, ConstValue};

/// Backend constant construction hooks.
pub trait ConstLowering {
    type Value;

    fn lower_int(&mut self, ty: TypeId, value: &BigInt) -> Self::Value;
    fn lower_float(&mut self, ty: TypeId, value: f64) -> Self::Value;
    fn lower_bool(&mut self, ty: TypeId, value: bool) -> Self::Value;
    fn lower_void(&mut self, ty: TypeId) -> Self::Value;
    fn lower_fn(&mut self, ty: TypeId, func: FnId) -> Self::Value;
    fn lower_undef(&mut self, ty: TypeId) -> Self::Value;
    fn lower_zeroes(&mut self, ty: TypeId) -> Self::Value;
    fn lower_optional(&mut self, ty: TypeId, payload: Option<Self::Value>) -> Self::Value;
    fn lower_error_union(
        &mut self,
        ty: TypeId,
        error: Option<Name>,
        payload: Option<Self::Value>,
    ) -> Self::Value;
    fn lower_enum(&mut self, ty: TypeId, tag: &BigInt, payload: Option<Self::Value>)
        -> Self::Value;
    fn lower_struct(&mut self, ty: TypeId, fields: Vec<Self::Value>) -> Self::Value;
    fn lower_array(&mut self, ty: TypeId, elems: Vec<Self::Value>) -> Self::Value;
    /// `base` is the already lowered pointee; `base_id` identifies it so the
    /// backend can share one global per arena entry.
    fn lower_pointer(
        &mut self,
        ty: TypeId,
        base_id: ConstId,
        base: Self::Value,
        index: u64,
        is_c_str: bool,
    ) -> Self::Value;
}

/// Lower `value` through `backend`.
///
/// Fails with [`ConstError::NotComptime`] for `Runtime` values and with
/// [`ConstError::ComptimeOnly`] for values that have no runtime
/// representation (types).
pub fn lower_const<L: ConstLowering>(
    value: &ConstValue,
    arena: &ConstArena,
    backend: &mut L,
) -> Result<L::Value, ConstError> {
    let ty = value.ty;
    let payload = match &value.kind {
        ConstKind::Runtime => return Err(ConstError::NotComptime),
        ConstKind::Undef => return Ok(backend.lower_undef(ty)),
        ConstKind::Zeroes => return Ok(backend.lower_zeroes(ty)),
        ConstKind::Static(p) => p,
    };

    let lowered = match payload {
        ConstPayload::Int(v) => backend.lower_int(ty, v),
        ConstPayload::Float(bits) => backend.lower_float(ty, f64::from_bits(*bits)),
        ConstPayload::Bool(b) => backend.lower_bool(ty, *b),
        ConstPayload::Void => backend.lower_void(ty),
        ConstPayload::Fn(f) => backend.lower_fn(ty, *f),
        ConstPayload::Type(_) => return Err(ConstError::ComptimeOnly),
        ConstPayload::Optional(p) => {
            let inner = p
                .as_deref()
                .map(|v| lower_const(v, arena, backend))
                .transpose()?;
            backend.lower_optional(ty, inner)
        }
        ConstPayload::ErrorUnion(eu) => {
            let inner = eu
                .payload
                .as_deref()
                .map(|v| lower_const(v, arena, backend))
                .transpose()?;
            backend.lower_error_union(ty, eu.error, inner)
        }
        ConstPayload::Enum { tag, payload } => {
            let inner = payload
                .as_deref()
                .map(|v| lower_const(v, arena, backend))
                .transpose()?;
            backend.lower_enum(ty, tag, inner)
        }
        ConstPayload::Struct(fields) => {
            let lowered = fields
                .iter()
                .map(|f| lower_const(f, arena, backend))
                .collect::<Result<Vec<_>, _>>()?;
            backend.lower_struct(ty, lowered)
        }
        ConstPayload::Array(arr) => {
            let lowered = arr
                .elems()
                .iter()
                .map(|e| lower_const(e, arena, backend))
                .collect::<Result<Vec<_>, _>>()?;
            backend.lower_array(ty, lowered)
        }
        ConstPayload::Pointer(ptr) => {
            let base = lower_const(arena.get(ptr.base), arena, backend)?;
            backend.lower_pointer(ty, ptr.base, base, ptr.index, ptr.is_c_str)
        }
    };
    Ok(lowered)
}
