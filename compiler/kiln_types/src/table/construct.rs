//! Structural type constructors.
//!
//! Every constructor canonicalizes its children first, so `*Alias` and
//! `*Target` are one type.

use kiln_ir::TypeId;

use super::TypeTable;
use crate::{FnSig, IntInfo, TypeData, TypeFlags};

impl TypeTable {
    /// `*T` / `*const T`.
    pub fn get_pointer(&mut self, child: TypeId, is_const: bool) -> TypeId {
        let child = self.canonical(child);
        if child.is_invalid() {
            return TypeId::INVALID;
        }
        if let Some(&id) = self.pointers.get(&(child, is_const)) {
            return id;
        }
        let flags = self.flags(child).propagated();
        let id = self.push(TypeData::Pointer { child, is_const }, flags);
        self.pointers.insert((child, is_const), id);
        id
    }

    /// `[len]T`, cached per child type by length.
    pub fn get_array(&mut self, child: TypeId, len: u64) -> TypeId {
        let child = self.canonical(child);
        if child.is_invalid() {
            return TypeId::INVALID;
        }
        if let Some(&id) = self.arrays.get(&child).and_then(|by_len| by_len.get(&len)) {
            return id;
        }
        let mut flags = self.flags(child).propagated();
        if len == 0 || self.flags(child).contains(TypeFlags::ZERO_SIZED) {
            flags |= TypeFlags::ZERO_SIZED;
        }
        let id = self.push(TypeData::Array { child, len }, flags);
        self.arrays.entry(child).or_default().insert(len, id);
        id
    }

    /// `[]T` / `[]const T`.
    pub fn get_slice(&mut self, child: TypeId, is_const: bool) -> TypeId {
        let child = self.canonical(child);
        if child.is_invalid() {
            return TypeId::INVALID;
        }
        if let Some(&id) = self.slices.get(&(child, is_const)) {
            return id;
        }
        let flags = self.flags(child).propagated();
        let id = self.push(TypeData::Slice { child, is_const }, flags);
        self.slices.insert((child, is_const), id);
        id
    }

    /// `?T`.
    pub fn get_optional(&mut self, child: TypeId) -> TypeId {
        let child = self.canonical(child);
        if child.is_invalid() {
            return TypeId::INVALID;
        }
        if let Some(&id) = self.optionals.get(&child) {
            return id;
        }
        let flags = self.flags(child).propagated();
        let id = self.push(TypeData::Optional(child), flags);
        self.optionals.insert(child, id);
        id
    }

    /// `!T`.
    pub fn get_error_union(&mut self, child: TypeId) -> TypeId {
        let child = self.canonical(child);
        if child.is_invalid() {
            return TypeId::INVALID;
        }
        if let Some(&id) = self.error_unions.get(&child) {
            return id;
        }
        let flags = self.flags(child).propagated();
        let id = self.push(TypeData::ErrorUnion(child), flags);
        self.error_unions.insert(child, id);
        id
    }

    /// `iN` / `uN`. The eight standard widths resolve to their primitive IDs.
    pub fn get_int(&mut self, signed: bool, bits: u16) -> TypeId {
        let info = IntInfo { signed, bits };
        if let Some(&id) = self.ints.get(&info) {
            return id;
        }
        let mut flags = TypeFlags::IS_INT;
        if bits == 0 {
            flags |= TypeFlags::ZERO_SIZED;
        }
        let id = self.push(TypeData::Int(info), flags);
        self.ints.insert(info, id);
        id
    }

    /// Function type for `sig`.
    ///
    /// Structurally equal signatures built independently return the same
    /// identity.
    pub fn get_fn(&mut self, mut sig: FnSig) -> TypeId {
        for p in &mut sig.params {
            *p = self.canonical(*p);
        }
        sig.ret = self.canonical(sig.ret);
        if sig.ret.is_invalid() || sig.params.iter().any(|p| p.is_invalid()) {
            return TypeId::INVALID;
        }
        if let Some(&id) = self.fns.get(&sig) {
            return id;
        }
        let id = self.push(TypeData::Fn(sig.clone()), TypeFlags::empty());
        self.fns.insert(sig, id);
        id
    }
}
