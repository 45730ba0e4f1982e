//! The interning arena.
//!
//! Entries are addressed by [`TypeId`]. Each structural kind has its own
//! lookup map keyed on exactly the fields that define identity:
//!
//! | Kind | Key |
//! |------|-----|
//! | pointer | `(child, is_const)` |
//! | array | per-child map keyed by length |
//! | slice | `(child, is_const)` |
//! | optional, error union | child |
//! | int | `(signed, bits)` |
//! | fn | [`FnSig`] (ordered params, return, flags, calling convention) |
//! | struct, union, enum, alias, generic fn | declaring `DeclId` |

mod construct;
mod format;
mod nominal;
mod query;

use kiln_ir::{BackendHandle, DeclId, TypeId};
use rustc_hash::FxHashMap;

use crate::{FnSig, IntInfo, TypeData, TypeFlags};

struct TypeEntry {
    data: TypeData,
    flags: TypeFlags,
    backend: Option<BackendHandle>,
}

/// Arena of interned types.
///
/// Owned by the compilation context and lives for the whole compilation.
/// An entry's key fields never change after it is interned.
pub struct TypeTable {
    entries: Vec<TypeEntry>,
    /// Width of `usize`/`isize`.
    pointer_bits: u16,

    pointers: FxHashMap<(TypeId, bool), TypeId>,
    arrays: FxHashMap<TypeId, FxHashMap<u64, TypeId>>,
    slices: FxHashMap<(TypeId, bool), TypeId>,
    optionals: FxHashMap<TypeId, TypeId>,
    error_unions: FxHashMap<TypeId, TypeId>,
    ints: FxHashMap<IntInfo, TypeId>,
    fns: FxHashMap<FnSig, TypeId>,
    nominals: FxHashMap<DeclId, TypeId>,
}

impl TypeTable {
    /// Create a table for a target with `pointer_bits`-wide pointers.
    pub fn new(pointer_bits: u16) -> Self {
        let mut table = TypeTable {
            entries: Vec::with_capacity(256),
            pointer_bits,
            pointers: FxHashMap::default(),
            arrays: FxHashMap::default(),
            slices: FxHashMap::default(),
            optionals: FxHashMap::default(),
            error_unions: FxHashMap::default(),
            ints: FxHashMap::default(),
            fns: FxHashMap::default(),
            nominals: FxHashMap::default(),
        };
        table.init_primitives();
        table
    }

    fn init_primitives(&mut self) {
        let int = |signed, bits| TypeData::Int(IntInfo { signed, bits });
        let primitives = [
            (TypeData::Void, TypeFlags::ZERO_SIZED),
            (TypeData::Bool, TypeFlags::empty()),
            (TypeData::NoReturn, TypeFlags::ZERO_SIZED),
            (TypeData::Type, TypeFlags::COMPTIME_ONLY),
            (TypeData::Invalid, TypeFlags::HAS_INVALID),
            (
                TypeData::ComptimeInt,
                TypeFlags::COMPTIME_ONLY | TypeFlags::IS_INT,
            ),
            (
                TypeData::ComptimeFloat,
                TypeFlags::COMPTIME_ONLY | TypeFlags::IS_FLOAT,
            ),
            (TypeData::Undefined, TypeFlags::COMPTIME_ONLY),
            (int(false, 8), TypeFlags::IS_INT),
            (int(true, 8), TypeFlags::IS_INT),
            (int(false, 16), TypeFlags::IS_INT),
            (int(true, 16), TypeFlags::IS_INT),
            (int(false, 32), TypeFlags::IS_INT),
            (int(true, 32), TypeFlags::IS_INT),
            (int(false, 64), TypeFlags::IS_INT),
            (int(true, 64), TypeFlags::IS_INT),
            (TypeData::Usize, TypeFlags::IS_INT),
            (TypeData::Isize, TypeFlags::IS_INT),
            (TypeData::Float { bits: 32 }, TypeFlags::IS_FLOAT),
            (TypeData::Float { bits: 64 }, TypeFlags::IS_FLOAT),
        ];
        for (data, flags) in primitives {
            if let TypeData::Int(info) = data {
                let id = self.next_id();
                self.ints.insert(info, id);
            }
            self.entries.push(TypeEntry {
                data,
                flags,
                backend: None,
            });
        }
        debug_assert_eq!(self.entries.len() as u32, TypeId::PRIMITIVE_COUNT);

        // Reserved slots up to FIRST_DYNAMIC.
        while self.entries.len() < TypeId::FIRST_DYNAMIC as usize {
            self.entries.push(TypeEntry {
                data: TypeData::Invalid,
                flags: TypeFlags::HAS_INVALID,
                backend: None,
            });
        }
    }

    fn next_id(&self) -> TypeId {
        let raw = u32::try_from(self.entries.len())
            .unwrap_or_else(|_| panic!("type table exceeded u32::MAX entries"));
        TypeId::from_raw(raw)
    }

    /// Append a new entry. Callers record it in the matching lookup map.
    fn push(&mut self, data: TypeData, flags: TypeFlags) -> TypeId {
        let id = self.next_id();
        tracing::debug!(?id, ?data, "interned type");
        self.entries.push(TypeEntry {
            data,
            flags,
            backend: None,
        });
        id
    }

    /// # Panics
    /// Panics if `id` did not come from this table.
    #[inline]
    pub fn data(&self, id: TypeId) -> &TypeData {
        &self.entries[id.raw() as usize].data
    }

    #[inline]
    pub fn flags(&self, id: TypeId) -> TypeFlags {
        self.entries[id.raw() as usize].flags
    }

    pub fn pointer_bits(&self) -> u16 {
        self.pointer_bits
    }

    /// Number of entries, including the reserved primitive range.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    // ── Backend handles ──

    /// Attach the backend's handle for `id`.
    pub fn set_backend_handle(&mut self, id: TypeId, handle: BackendHandle) {
        self.entries[id.raw() as usize].backend = Some(handle);
    }

    pub fn backend_handle(&self, id: TypeId) -> Option<BackendHandle> {
        self.entries[id.raw() as usize].backend
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests;
