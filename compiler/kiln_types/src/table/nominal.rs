//! Nominal types: identity is the declaring `DeclId`.
//!
//! Declaration and completion are split so bodies can refer to their own
//! type (`next: *Node`) and to types declared later in the module.

use kiln_const::{fits, NumKind};
use kiln_ir::{DeclId, Name, TypeId};
use num_bigint::BigInt;
use num_traits::Signed;

use super::TypeTable;
use crate::{EnumField, EnumType, StructField, StructType, TypeData, TypeFlags};

impl TypeTable {
    fn declare_nominal(
        &mut self,
        decl: DeclId,
        make: impl FnOnce() -> TypeData,
        flags: TypeFlags,
    ) -> TypeId {
        if let Some(&id) = self.nominals.get(&decl) {
            return id;
        }
        let id = self.push(make(), flags);
        self.nominals.insert(decl, id);
        id
    }

    /// The struct type introduced by `decl` (created on first request).
    pub fn declare_struct(&mut self, decl: DeclId, name: Name) -> TypeId {
        self.declare_nominal(
            decl,
            || {
                TypeData::Struct(StructType {
                    name,
                    decl,
                    fields: Vec::new(),
                    complete: false,
                })
            },
            TypeFlags::IS_NOMINAL,
        )
    }

    pub fn declare_union(&mut self, decl: DeclId, name: Name) -> TypeId {
        self.declare_nominal(
            decl,
            || {
                TypeData::Union(StructType {
                    name,
                    decl,
                    fields: Vec::new(),
                    complete: false,
                })
            },
            TypeFlags::IS_NOMINAL,
        )
    }

    pub fn declare_enum(&mut self, decl: DeclId, name: Name) -> TypeId {
        self.declare_nominal(
            decl,
            || {
                TypeData::Enum(EnumType {
                    name,
                    decl,
                    tag_type: TypeId::VOID,
                    fields: Vec::new(),
                    complete: false,
                })
            },
            TypeFlags::IS_NOMINAL,
        )
    }

    /// `const name = canonical;`
    pub fn declare_type_alias(&mut self, decl: DeclId, name: Name, canonical: TypeId) -> TypeId {
        let canonical = self.canonical(canonical);
        let flags = self.flags(canonical);
        self.declare_nominal(
            decl,
            || TypeData::TypeDecl {
                name,
                decl,
                canonical,
            },
            flags,
        )
    }

    /// Placeholder type of the generic function `decl`.
    pub fn get_generic_fn(&mut self, decl: DeclId, name: Name) -> TypeId {
        self.declare_nominal(
            decl,
            || TypeData::GenericFn { decl, name },
            TypeFlags::COMPTIME_ONLY | TypeFlags::IS_NOMINAL,
        )
    }

    /// Type previously declared for `decl`.
    pub fn decl_type(&self, decl: DeclId) -> Option<TypeId> {
        self.nominals.get(&decl).copied()
    }

    /// Fill in the fields of a declared struct.
    ///
    /// # Panics
    /// Panics if `id` is not a struct or was already completed.
    pub fn complete_struct(&mut self, id: TypeId, fields: Vec<(Name, TypeId)>) {
        let (fields, flags) = self.layout_fields(fields, false);
        let entry = &mut self.entries[id.raw() as usize];
        let TypeData::Struct(st) = &mut entry.data else {
            panic!("complete_struct on non-struct type {id:?}");
        };
        assert!(!st.complete, "struct {id:?} completed twice");
        st.fields = fields;
        st.complete = true;
        entry.flags |= flags;
    }

    /// Fill in the fields of a declared union.
    ///
    /// # Panics
    /// Panics if `id` is not a union or was already completed.
    pub fn complete_union(&mut self, id: TypeId, fields: Vec<(Name, TypeId)>) {
        let (fields, flags) = self.layout_fields(fields, true);
        let entry = &mut self.entries[id.raw() as usize];
        let TypeData::Union(st) = &mut entry.data else {
            panic!("complete_union on non-union type {id:?}");
        };
        assert!(!st.complete, "union {id:?} completed twice");
        st.fields = fields;
        st.complete = true;
        entry.flags |= flags;
    }

    /// Assign source and generated indices. Zero-sized fields get no
    /// generated index.
    fn layout_fields(
        &self,
        fields: Vec<(Name, TypeId)>,
        is_union: bool,
    ) -> (Vec<StructField>, TypeFlags) {
        let mut flags = TypeFlags::ZERO_SIZED;
        let mut gen = 0u32;
        let mut out = Vec::with_capacity(fields.len());
        for (src_index, (name, ty)) in (0u32..).zip(fields) {
            let ty = self.canonical(ty);
            let field_flags = self.flags(ty);
            flags |= field_flags.propagated();
            let gen_index = if field_flags.contains(TypeFlags::ZERO_SIZED) {
                None
            } else {
                flags.remove(TypeFlags::ZERO_SIZED);
                let idx = gen;
                if !is_union {
                    gen += 1;
                }
                Some(idx)
            };
            out.push(StructField {
                name,
                ty,
                src_index,
                gen_index,
            });
        }
        (out, flags)
    }

    /// Fill in an enum's variants and choose its tag type.
    ///
    /// Without an explicit `tag_type` the tag is the smallest integer that
    /// holds every value (unsigned unless some value is negative). Returns
    /// the tag type used.
    ///
    /// # Panics
    /// Panics if `id` is not an enum or was already completed.
    pub fn complete_enum(
        &mut self,
        id: TypeId,
        tag_type: Option<TypeId>,
        fields: Vec<(Name, BigInt)>,
    ) -> TypeId {
        let tag_type = match tag_type {
            Some(t) => self.canonical(t),
            None => self.smallest_int_holding(fields.iter().map(|(_, v)| v)),
        };
        let mut flags = self.flags(tag_type).propagated();
        if self.flags(tag_type).contains(TypeFlags::ZERO_SIZED) {
            flags |= TypeFlags::ZERO_SIZED;
        }
        let entry = &mut self.entries[id.raw() as usize];
        let TypeData::Enum(en) = &mut entry.data else {
            panic!("complete_enum on non-enum type {id:?}");
        };
        assert!(!en.complete, "enum {id:?} completed twice");
        en.tag_type = tag_type;
        en.fields = fields
            .into_iter()
            .map(|(name, value)| EnumField { name, value })
            .collect();
        en.complete = true;
        entry.flags |= flags;
        tag_type
    }

    fn smallest_int_holding<'a>(&mut self, values: impl Iterator<Item = &'a BigInt> + Clone) -> TypeId {
        let signed = values.clone().any(Signed::is_negative);
        let mut bits: u16 = 0;
        while bits < u16::MAX && !values.clone().all(|v| fits(v, NumKind::Int { signed, bits })) {
            bits += 1;
        }
        self.get_int(signed, bits)
    }
}
