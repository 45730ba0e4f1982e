//! Module-level declarations.

use bitflags::bitflags;
use num_bigint::BigInt;

use crate::{DeclId, ExprId, Name, ParsedType, Span};

/// Function parameter. `comptime` parameters make the function generic.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub name: Name,
    pub ty: ParsedType,
    pub is_comptime: bool,
    pub span: Span,
}

bitflags! {
    /// Modifiers written on a function declaration.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FnDeclFlags: u8 {
        const PUB = 1 << 0;
        const EXPORT = 1 << 1;
        const EXTERN = 1 << 2;
        const INLINE = 1 << 3;
        const NAKED = 1 << 4;
        const VAR_ARGS = 1 << 5;
    }
}

/// `fn name(params) ret { body }`
///
/// `body` is `None` for `extern` prototypes.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FnDecl {
    pub name: Name,
    pub params: Vec<Param>,
    pub ret: ParsedType,
    pub body: Option<ExprId>,
    pub flags: FnDeclFlags,
}

impl FnDecl {
    /// A function with at least one `comptime` parameter.
    pub fn is_generic(&self) -> bool {
        self.params.iter().any(|p| p.is_comptime)
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: ParsedType,
    pub span: Span,
}

/// Body shared by `struct` and `union` declarations.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct StructDecl {
    pub name: Name,
    pub fields: Vec<FieldDecl>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumVariantDecl {
    pub name: Name,
    /// Explicit tag value; implicit values continue from the previous one.
    pub value: Option<BigInt>,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumDecl {
    pub name: Name,
    pub tag_type: Option<ParsedType>,
    pub variants: Vec<EnumVariantDecl>,
}

/// `const Name = T;`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeAliasDecl {
    pub name: Name,
    pub target: ParsedType,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ItemKind {
    Fn(FnDecl),
    Struct(StructDecl),
    Union(StructDecl),
    Enum(EnumDecl),
    TypeAlias(TypeAliasDecl),
}

/// A top-level declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Item {
    pub id: DeclId,
    pub kind: ItemKind,
    pub span: Span,
}

impl Item {
    pub fn name(&self) -> Name {
        match &self.kind {
            ItemKind::Fn(f) => f.name,
            ItemKind::Struct(s) | ItemKind::Union(s) => s.name,
            ItemKind::Enum(e) => e.name,
            ItemKind::TypeAlias(a) => a.name,
        }
    }
}

/// A parsed source file.
#[derive(Clone, Default, Debug)]
pub struct Module {
    pub items: Vec<Item>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item, assigning the next `DeclId`.
    ///
    /// # Panics
    /// Panics if the module exceeds `u32::MAX` items.
    pub fn push(&mut self, kind: ItemKind, span: Span) -> DeclId {
        let idx = u32::try_from(self.items.len())
            .unwrap_or_else(|_| panic!("module exceeded u32::MAX items"));
        let id = DeclId::new(idx);
        self.items.push(Item { id, kind, span });
        id
    }

    /// # Panics
    /// Panics if `id` does not belong to this module.
    pub fn item(&self, id: DeclId) -> &Item {
        &self.items[id.index()]
    }
}
