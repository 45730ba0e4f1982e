//! AST construction helpers for tests.
//!
//! There is no parser in this workspace, so tests build modules directly.
//! Every node gets a distinct span, which lets assertions tell apart the
//! labels of a diagnostic.

use std::sync::Arc;

use kiln_const::ConstValue;
use kiln_diagnostic::{ErrorCode, ErrorGuaranteed};
use kiln_ir::{
    ArrayInit, BinaryOp, DeclId, EnumDecl, EnumVariantDecl, ExprArena, ExprId, ExprKind,
    FieldDecl, FieldInit, FnDecl, FnDeclFlags, ItemKind, Module, Name, Param, ParsedType, Span,
    Stmt, StringInterner, StructDecl, SwitchItem, SwitchProng, TypeAliasDecl, TypeId, UnaryOp,
};
use kiln_ssa::{InstrKind, IrFunction};
use num_bigint::BigInt;

use crate::{analyze_module, CompilationContext, SemaConfig};

/// Builds a [`Module`] and its [`ExprArena`] node by node.
pub struct AstBuilder {
    pub interner: Arc<StringInterner>,
    pub arena: ExprArena,
    pub module: Module,
    next_offset: u32,
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AstBuilder {
    pub fn new() -> Self {
        AstBuilder {
            interner: Arc::new(StringInterner::new()),
            arena: ExprArena::new(),
            module: Module::new(),
            next_offset: 0,
        }
    }

    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// A span not used by any earlier node.
    pub fn span(&mut self) -> Span {
        let start = self.next_offset;
        self.next_offset += 4;
        Span::new(start, start + 3)
    }

    pub fn named(&self, s: &str) -> ParsedType {
        ParsedType::Named(self.name(s))
    }

    // ── Expressions ─────────────────────────────────────────────────

    pub fn expr(&mut self, kind: ExprKind) -> ExprId {
        let span = self.span();
        self.arena.alloc(kind, span)
    }

    pub fn int(&mut self, value: impl Into<BigInt>) -> ExprId {
        self.expr(ExprKind::Int {
            value: value.into(),
            overflowed: false,
        })
    }

    pub fn overflowed_int(&mut self) -> ExprId {
        self.expr(ExprKind::Int {
            value: BigInt::from(0),
            overflowed: true,
        })
    }

    pub fn float(&mut self, value: f64) -> ExprId {
        self.expr(ExprKind::Float(value.to_bits()))
    }

    pub fn bool(&mut self, value: bool) -> ExprId {
        self.expr(ExprKind::Bool(value))
    }

    pub fn string(&mut self, s: &str) -> ExprId {
        self.expr(ExprKind::Str {
            bytes: s.as_bytes().to_vec(),
            c_str: false,
        })
    }

    pub fn c_string(&mut self, s: &str) -> ExprId {
        self.expr(ExprKind::Str {
            bytes: s.as_bytes().to_vec(),
            c_str: true,
        })
    }

    pub fn undefined(&mut self) -> ExprId {
        self.expr(ExprKind::Undefined)
    }

    pub fn zeroes(&mut self, ty: ParsedType) -> ExprId {
        self.expr(ExprKind::ZeroInit(ty))
    }

    pub fn type_expr(&mut self, ty: ParsedType) -> ExprId {
        self.expr(ExprKind::TypeExpr(ty))
    }

    pub fn ident(&mut self, s: &str) -> ExprId {
        let name = self.name(s);
        self.expr(ExprKind::Ident(name))
    }

    pub fn enum_value(&mut self, ty: &str, variant: &str) -> ExprId {
        let (ty, variant) = (self.name(ty), self.name(variant));
        self.expr(ExprKind::EnumValue { ty, variant })
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { op, lhs, rhs })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Unary { op, operand })
    }

    pub fn cast(&mut self, expr: ExprId, ty: ParsedType) -> ExprId {
        self.expr(ExprKind::Cast { expr, ty })
    }

    pub fn field(&mut self, base: ExprId, field: &str) -> ExprId {
        let field = self.name(field);
        self.expr(ExprKind::Field { base, field })
    }

    pub fn index(&mut self, base: ExprId, index: ExprId) -> ExprId {
        self.expr(ExprKind::Index { base, index })
    }

    pub fn struct_init(&mut self, ty: &str, fields: &[(&str, ExprId)]) -> ExprId {
        let ty = self.named(ty);
        let fields = fields
            .iter()
            .map(|&(name, value)| FieldInit {
                name: self.name(name),
                value,
                span: self.span(),
            })
            .collect();
        self.expr(ExprKind::StructInit { ty, fields })
    }

    pub fn array_init(&mut self, elem_ty: ParsedType, elems: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::ArrayInit(ArrayInit { elem_ty, elems }))
    }

    pub fn call(&mut self, callee: &str, args: Vec<ExprId>) -> ExprId {
        let callee = self.name(callee);
        self.expr(ExprKind::Call { callee, args })
    }

    pub fn if_else(&mut self, cond: ExprId, then_branch: ExprId, else_branch: Option<ExprId>) -> ExprId {
        self.expr(ExprKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn switch(&mut self, subject: ExprId, prongs: Vec<SwitchProng>) -> ExprId {
        self.expr(ExprKind::Switch { subject, prongs })
    }

    pub fn prong(&mut self, items: Vec<SwitchItem>, body: ExprId) -> SwitchProng {
        SwitchProng {
            items,
            is_else: false,
            body,
            span: self.span(),
        }
    }

    pub fn else_prong(&mut self, body: ExprId) -> SwitchProng {
        SwitchProng {
            items: Vec::new(),
            is_else: true,
            body,
            span: self.span(),
        }
    }

    pub fn while_loop(&mut self, label: Option<&str>, cond: ExprId, body: ExprId) -> ExprId {
        let label = label.map(|l| self.name(l));
        self.expr(ExprKind::While { label, cond, body })
    }

    pub fn break_(&mut self, label: Option<&str>) -> ExprId {
        let label = label.map(|l| self.name(l));
        self.expr(ExprKind::Break { label })
    }

    pub fn continue_(&mut self, label: Option<&str>) -> ExprId {
        let label = label.map(|l| self.name(l));
        self.expr(ExprKind::Continue { label })
    }

    pub fn block(&mut self, stmts: Vec<Stmt>, result: Option<ExprId>) -> ExprId {
        self.expr(ExprKind::Block { stmts, result })
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> ExprId {
        self.expr(ExprKind::Return(value))
    }

    pub fn unreachable(&mut self) -> ExprId {
        self.expr(ExprKind::Unreachable)
    }

    // ── Statements ──────────────────────────────────────────────────

    pub fn let_(&mut self, name: &str, ty: Option<ParsedType>, init: ExprId) -> Stmt {
        Stmt::Let {
            name: self.name(name),
            mutable: false,
            ty,
            init,
            span: self.span(),
        }
    }

    pub fn var(&mut self, name: &str, ty: Option<ParsedType>, init: ExprId) -> Stmt {
        Stmt::Let {
            name: self.name(name),
            mutable: true,
            ty,
            init,
            span: self.span(),
        }
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId) -> Stmt {
        Stmt::Assign {
            target,
            value,
            span: self.span(),
        }
    }

    // ── Items ───────────────────────────────────────────────────────

    pub fn param(&mut self, name: &str, ty: ParsedType) -> Param {
        Param {
            name: self.name(name),
            ty,
            is_comptime: false,
            span: self.span(),
        }
    }

    pub fn comptime_param(&mut self, name: &str, ty: ParsedType) -> Param {
        Param {
            is_comptime: true,
            ..self.param(name, ty)
        }
    }

    pub fn func(&mut self, name: &str, params: Vec<Param>, ret: ParsedType, body: ExprId) -> DeclId {
        self.fn_decl(name, params, ret, Some(body), FnDeclFlags::empty())
    }

    /// `extern fn` prototype without a body.
    pub fn extern_fn(&mut self, name: &str, params: Vec<Param>, ret: ParsedType, var_args: bool) -> DeclId {
        let mut flags = FnDeclFlags::EXTERN;
        flags.set(FnDeclFlags::VAR_ARGS, var_args);
        self.fn_decl(name, params, ret, None, flags)
    }

    pub fn fn_decl(
        &mut self,
        name: &str,
        params: Vec<Param>,
        ret: ParsedType,
        body: Option<ExprId>,
        flags: FnDeclFlags,
    ) -> DeclId {
        let decl = FnDecl {
            name: self.name(name),
            params,
            ret,
            body,
            flags,
        };
        let span = self.span();
        self.module.push(ItemKind::Fn(decl), span)
    }

    pub fn struct_decl(&mut self, name: &str, fields: &[(&str, ParsedType)]) -> DeclId {
        let decl = self.struct_body(name, fields);
        let span = self.span();
        self.module.push(ItemKind::Struct(decl), span)
    }

    pub fn union_decl(&mut self, name: &str, fields: &[(&str, ParsedType)]) -> DeclId {
        let decl = self.struct_body(name, fields);
        let span = self.span();
        self.module.push(ItemKind::Union(decl), span)
    }

    fn struct_body(&mut self, name: &str, fields: &[(&str, ParsedType)]) -> StructDecl {
        StructDecl {
            name: self.name(name),
            fields: fields
                .iter()
                .map(|(field, ty)| FieldDecl {
                    name: self.name(field),
                    ty: ty.clone(),
                    span: self.span(),
                })
                .collect(),
        }
    }

    pub fn enum_decl(
        &mut self,
        name: &str,
        tag_type: Option<ParsedType>,
        variants: &[(&str, Option<i64>)],
    ) -> DeclId {
        let decl = EnumDecl {
            name: self.name(name),
            tag_type,
            variants: variants
                .iter()
                .map(|&(variant, value)| EnumVariantDecl {
                    name: self.name(variant),
                    value: value.map(BigInt::from),
                    span: self.span(),
                })
                .collect(),
        };
        let span = self.span();
        self.module.push(ItemKind::Enum(decl), span)
    }

    pub fn alias(&mut self, name: &str, target: ParsedType) -> DeclId {
        let decl = TypeAliasDecl {
            name: self.name(name),
            target,
        };
        let span = self.span();
        self.module.push(ItemKind::TypeAlias(decl), span)
    }

    // ── Analysis ────────────────────────────────────────────────────

    /// Analyse the module with test settings.
    pub fn analyze(&self) -> (CompilationContext, Result<(), ErrorGuaranteed>) {
        self.analyze_with(SemaConfig::for_tests())
    }

    pub fn analyze_with(
        &self,
        config: SemaConfig,
    ) -> (CompilationContext, Result<(), ErrorGuaranteed>) {
        let mut ctx = CompilationContext::new(Arc::clone(&self.interner), config);
        let result = analyze_module(&mut ctx, &self.module, &self.arena);
        (ctx, result)
    }
}

/// `ParsedType` of a primitive type.
pub fn prim(ty: TypeId) -> ParsedType {
    ParsedType::Primitive(ty)
}

// ── Inspection ──────────────────────────────────────────────────────

/// Codes of every diagnostic reported so far, in source order.
pub fn codes(ctx: &mut CompilationContext) -> Vec<ErrorCode> {
    ctx.take_diagnostics().into_iter().map(|d| d.code).collect()
}

/// Lowered body of the non-generic function `name`.
pub fn body<'a>(ctx: &'a CompilationContext, name: &str) -> Option<&'a IrFunction> {
    ctx.function_named(name)?.ir.as_ref()
}

/// Kinds of the instructions still placed in `func`, in block order.
pub fn placed(func: &IrFunction) -> Vec<&InstrKind> {
    func.placed_instrs().map(|id| &func.instr(id).kind).collect()
}

/// Number of placed instructions matching `pred`.
pub fn count(func: &IrFunction, pred: impl Fn(&InstrKind) -> bool) -> usize {
    placed(func).into_iter().filter(|k| pred(k)).count()
}

/// The constant returned by the first `ret` of `func`, if it returns one.
pub fn returned_const(func: &IrFunction) -> Option<&ConstValue> {
    placed(func).into_iter().find_map(|kind| match kind {
        InstrKind::Return { value: Some(v) } => match &func.instr(*v).kind {
            InstrKind::Const(c) => Some(c),
            _ => None,
        },
        _ => None,
    })
}

/// Name hints of the blocks of `func`.
pub fn block_names(func: &IrFunction) -> Vec<&'static str> {
    func.blocks.iter().map(|b| b.name_hint).collect()
}
