//! Type descriptions stored in the table.

use kiln_ir::{DeclId, Name, TypeId};
use num_bigint::BigInt;

use crate::FnFlags;

/// Width and signedness of a fixed-size integer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct IntInfo {
    pub signed: bool,
    pub bits: u16,
}

/// Calling convention of a function type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum CallConv {
    #[default]
    Kiln,
    C,
    Naked,
}

/// Structural key of a function type.
///
/// Two signatures are the same type iff parameters (in order), return
/// type, flags and calling convention are all equal.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FnSig {
    pub params: Vec<TypeId>,
    pub ret: TypeId,
    pub flags: FnFlags,
    pub cc: CallConv,
}

impl FnSig {
    pub fn new(params: Vec<TypeId>, ret: TypeId) -> Self {
        FnSig {
            params,
            ret,
            flags: FnFlags::empty(),
            cc: CallConv::Kiln,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: FnFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_cc(mut self, cc: CallConv) -> Self {
        self.cc = cc;
        self
    }
}

/// Field of a struct or union.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct StructField {
    pub name: Name,
    pub ty: TypeId,
    /// Position in the source declaration.
    pub src_index: u32,
    /// Position in the generated layout; `None` for zero-sized fields.
    pub gen_index: Option<u32>,
}

/// Body of a struct or union type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct StructType {
    pub name: Name,
    pub decl: DeclId,
    pub fields: Vec<StructField>,
    /// Fields have been filled in.
    pub complete: bool,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumField {
    pub name: Name,
    pub value: BigInt,
}

/// Body of an enum type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumType {
    pub name: Name,
    pub decl: DeclId,
    /// Backing integer type of the tag.
    pub tag_type: TypeId,
    pub fields: Vec<EnumField>,
    pub complete: bool,
}

impl EnumType {
    pub fn field(&self, name: Name) -> Option<&EnumField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One entry of the type table.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeData {
    Void,
    Bool,
    NoReturn,
    Type,
    Invalid,
    ComptimeInt,
    ComptimeFloat,
    Undefined,
    Int(IntInfo),
    /// Pointer-sized; width comes from the table's target configuration.
    Usize,
    Isize,
    Float { bits: u16 },
    Pointer { child: TypeId, is_const: bool },
    Array { child: TypeId, len: u64 },
    Slice { child: TypeId, is_const: bool },
    Struct(StructType),
    Union(StructType),
    Enum(EnumType),
    Fn(FnSig),
    Optional(TypeId),
    ErrorUnion(TypeId),
    /// Placeholder type of a generic function before instantiation.
    GenericFn { decl: DeclId, name: Name },
    /// Named alias wrapping a canonical type.
    TypeDecl {
        name: Name,
        decl: DeclId,
        canonical: TypeId,
    },
}
