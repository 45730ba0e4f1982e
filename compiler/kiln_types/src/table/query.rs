//! Read-only queries over interned types.

use kiln_const::{int_range, ConstPayload, ConstValue, NumKind, Shape, ValueShape};
use kiln_ir::{Name, TypeId};
use num_bigint::BigInt;
use num_traits::Zero;

use super::TypeTable;
use crate::{EnumType, FnSig, IntInfo, StructType, TypeData, TypeFlags};

impl TypeTable {
    /// Follow type aliases to the underlying type.
    pub fn canonical(&self, mut id: TypeId) -> TypeId {
        while let TypeData::TypeDecl { canonical, .. } = self.data(id) {
            id = *canonical;
        }
        id
    }

    /// Data of the canonical type.
    pub fn resolved(&self, id: TypeId) -> &TypeData {
        self.data(self.canonical(id))
    }

    /// Width and signedness of a fixed-size integer type.
    ///
    /// `usize`/`isize` use the target pointer width.
    pub fn int_info(&self, id: TypeId) -> Option<IntInfo> {
        match self.resolved(id) {
            TypeData::Int(info) => Some(*info),
            TypeData::Usize => Some(IntInfo {
                signed: false,
                bits: self.pointer_bits,
            }),
            TypeData::Isize => Some(IntInfo {
                signed: true,
                bits: self.pointer_bits,
            }),
            _ => None,
        }
    }

    /// Integer type, including `comptime_int`.
    pub fn is_int(&self, id: TypeId) -> bool {
        self.flags(self.canonical(id)).contains(TypeFlags::IS_INT)
    }

    pub fn is_float(&self, id: TypeId) -> bool {
        self.flags(self.canonical(id)).contains(TypeFlags::IS_FLOAT)
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        self.is_int(id) || self.is_float(id)
    }

    pub fn is_comptime_only(&self, id: TypeId) -> bool {
        self.flags(self.canonical(id)).contains(TypeFlags::COMPTIME_ONLY)
    }

    pub fn is_zero_sized(&self, id: TypeId) -> bool {
        self.flags(self.canonical(id)).contains(TypeFlags::ZERO_SIZED)
    }

    /// How compile-time arithmetic on this type behaves.
    pub fn num_kind(&self, id: TypeId) -> NumKind {
        match self.resolved(id) {
            TypeData::ComptimeInt => NumKind::ComptimeInt,
            TypeData::ComptimeFloat => NumKind::ComptimeFloat,
            TypeData::Float { bits } => NumKind::Float { bits: *bits },
            TypeData::Bool => NumKind::Bool,
            _ => match self.int_info(id) {
                Some(IntInfo { signed, bits }) => NumKind::Int { signed, bits },
                None => NumKind::Other,
            },
        }
    }

    /// Inclusive value range of an integer or `bool` type.
    pub fn int_range(&self, id: TypeId) -> Option<(BigInt, BigInt)> {
        if matches!(self.resolved(id), TypeData::Bool) {
            return Some((BigInt::from(0), BigInt::from(1)));
        }
        self.int_info(id).map(|info| int_range(info.signed, info.bits))
    }

    pub fn struct_type(&self, id: TypeId) -> Option<&StructType> {
        match self.resolved(id) {
            TypeData::Struct(st) | TypeData::Union(st) => Some(st),
            _ => None,
        }
    }

    /// Source index and type of the field called `name`.
    pub fn field_index(&self, id: TypeId, name: Name) -> Option<(usize, TypeId)> {
        let st = self.struct_type(id)?;
        st.fields
            .iter()
            .position(|f| f.name == name)
            .map(|i| (i, st.fields[i].ty))
    }

    pub fn enum_type(&self, id: TypeId) -> Option<&EnumType> {
        match self.resolved(id) {
            TypeData::Enum(en) => Some(en),
            _ => None,
        }
    }

    pub fn fn_sig(&self, id: TypeId) -> Option<&FnSig> {
        match self.resolved(id) {
            TypeData::Fn(sig) => Some(sig),
            _ => None,
        }
    }

    /// Child of a pointer type and its constness.
    pub fn pointer_child(&self, id: TypeId) -> Option<(TypeId, bool)> {
        match self.resolved(id) {
            TypeData::Pointer { child, is_const } => Some((*child, *is_const)),
            _ => None,
        }
    }

    /// Element type and length of an array type.
    pub fn array_info(&self, id: TypeId) -> Option<(TypeId, u64)> {
        match self.resolved(id) {
            TypeData::Array { child, len } => Some((*child, *len)),
            _ => None,
        }
    }

    pub fn optional_child(&self, id: TypeId) -> Option<TypeId> {
        match self.resolved(id) {
            TypeData::Optional(child) => Some(*child),
            _ => None,
        }
    }

    /// Element type reached by indexing: arrays, slices, pointers to
    /// arrays, and many-item pointers (`*T` indexes as `T`).
    pub fn index_elem(&self, id: TypeId) -> Option<TypeId> {
        match self.resolved(id) {
            TypeData::Array { child, .. } | TypeData::Slice { child, .. } => Some(*child),
            TypeData::Pointer { child, .. } => {
                Some(self.array_info(*child).map_or(*child, |(elem, _)| elem))
            }
            _ => None,
        }
    }

    /// Zero value of `id`: concrete for scalars, `Zeroes` for aggregates.
    pub fn zero_value(&self, id: TypeId) -> ConstValue {
        ConstValue::zero_of(id, self)
    }

    /// An enum reached by zero-filling `id` that has no variant with tag 0.
    ///
    /// Walks struct fields and non-empty array elements. Optionals zero to
    /// null and unions stay opaque, so neither is entered.
    pub fn enum_without_zero(&self, id: TypeId) -> Option<TypeId> {
        let mut seen = Vec::new();
        self.find_enum_without_zero(id, &mut seen)
    }

    fn find_enum_without_zero(&self, id: TypeId, seen: &mut Vec<TypeId>) -> Option<TypeId> {
        let id = self.canonical(id);
        if seen.contains(&id) {
            return None;
        }
        seen.push(id);
        match self.data(id) {
            TypeData::Enum(en) => (!en.fields.iter().any(|f| f.value.is_zero())).then_some(id),
            TypeData::Struct(st) => st
                .fields
                .iter()
                .find_map(|f| self.find_enum_without_zero(f.ty, seen)),
            TypeData::Array { child, len } if *len > 0 => self.find_enum_without_zero(*child, seen),
            _ => None,
        }
    }
}

impl ValueShape for TypeTable {
    fn shape(&self, ty: TypeId) -> Shape {
        match self.resolved(ty) {
            TypeData::ComptimeInt | TypeData::Int(_) | TypeData::Usize | TypeData::Isize => {
                Shape::Scalar(ConstPayload::Int(BigInt::from(0)))
            }
            TypeData::Bool => Shape::Scalar(ConstPayload::Bool(false)),
            TypeData::Float { .. } | TypeData::ComptimeFloat => {
                Shape::Scalar(ConstPayload::Float(0f64.to_bits()))
            }
            TypeData::Void => Shape::Scalar(ConstPayload::Void),
            TypeData::Enum(_) => Shape::Scalar(ConstPayload::Enum {
                tag: BigInt::from(0),
                payload: None,
            }),
            TypeData::Optional(child) => Shape::Optional(*child),
            TypeData::Struct(st) => Shape::Struct(st.fields.iter().map(|f| f.ty).collect()),
            TypeData::Array { child, len } => Shape::Array {
                elem: *child,
                len: *len,
            },
            TypeData::NoReturn
            | TypeData::Type
            | TypeData::Invalid
            | TypeData::Undefined
            | TypeData::Pointer { .. }
            | TypeData::Slice { .. }
            | TypeData::Union(_)
            | TypeData::Fn(_)
            | TypeData::ErrorUnion(_)
            | TypeData::GenericFn { .. }
            | TypeData::TypeDecl { .. } => Shape::Opaque,
        }
    }
}
