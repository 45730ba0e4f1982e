//! Places, field/element access and aggregate initializers.
//!
//! A place is a pointer to storage: a `var` slot, or a field or element
//! reached from one. Reads through a place load only the accessed part.
//! Reads from compile-time aggregates fold. Runtime aggregates that are
//! not places are spilled to a fresh slot first.

use kiln_const::ConstValue;
use kiln_ir::{ArrayInit, ExprId, ExprKind, FieldInit, Name, ParsedType, Span, TypeId};
use kiln_ssa::InstrId;
use kiln_types::TypeData;
use num_traits::ToPrimitive;
use rustc_hash::FxHashMap;

use super::{Lowerer, Operand, OperandKind};
use crate::problem::LowerProblem;
use crate::scope::Binding;

/// Pointer to storage holding a `ty`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Place {
    pub(crate) ptr: InstrId,
    pub(crate) ty: TypeId,
}

/// How the base of an access was lowered.
enum Base {
    Place(Place),
    Value(Operand),
}

impl Lowerer<'_> {
    // ── Places ─────────────────────────────────────────────────────

    /// Whether `id` names storage without evaluating anything.
    fn is_place(&self, id: ExprId) -> bool {
        match self.arena.kind(id) {
            ExprKind::Ident(name) => matches!(
                self.ctx.scopes.lookup_var(self.scope, *name),
                Some(entry) if matches!(entry.binding, Binding::Slot { .. })
            ),
            ExprKind::Field { base, .. } | ExprKind::Index { base, .. } => self.is_place(*base),
            _ => false,
        }
    }

    /// Storage denoted by an assignment target. `None` after a reported
    /// error.
    pub(crate) fn lower_place(&mut self, id: ExprId) -> Option<Place> {
        let arena = self.arena;
        let span = arena.span(id);
        match arena.kind(id) {
            ExprKind::Ident(name) => {
                match self.ctx.scopes.lookup_var(self.scope, *name).map(|e| e.binding.clone()) {
                    Some(Binding::Slot { ptr, ty }) => Some(Place { ptr, ty }),
                    Some(Binding::Value(_)) => {
                        self.report(LowerProblem::AssignToImmutable { span, name: *name });
                        None
                    }
                    None => {
                        self.report(LowerProblem::UnknownIdent { span, name: *name });
                        None
                    }
                }
            }
            ExprKind::Field { base, field } => match self.lower_base(*base, true)? {
                Base::Place(place) => self.field_place(place, *field, span),
                Base::Value(_) => {
                    self.report(LowerProblem::NotAssignable { span });
                    None
                }
            },
            ExprKind::Index { base, index } => match self.lower_base(*base, false)? {
                Base::Place(place) => self.elem_place(place, *index, span),
                Base::Value(_) => {
                    self.report(LowerProblem::NotAssignable { span });
                    None
                }
            },
            _ => {
                self.report(LowerProblem::NotAssignable { span });
                None
            }
        }
    }

    /// Lower the base of a field or index access. Runtime pointers become
    /// places; with `deref_all`, a pointer held in a place is loaded and
    /// followed too.
    fn lower_base(&mut self, base: ExprId, deref_all: bool) -> Option<Base> {
        if self.is_place(base) {
            let mut place = self.lower_place(base)?;
            if deref_all {
                if let Some((child, _)) = self.ctx.types.pointer_child(place.ty) {
                    let ptr = self.builder.emit_load(place.ptr, place.ty, Some(self.span(base)));
                    place = Place { ptr, ty: child };
                }
            }
            return Some(Base::Place(place));
        }
        let value = self.lower_expr(base);
        if !value.is_usable() {
            return match value.kind {
                OperandKind::Diverged => Some(Base::Value(value)),
                _ => None,
            };
        }
        if let OperandKind::Runtime(id) = value.kind {
            if let Some((child, _)) = self.ctx.types.pointer_child(value.ty) {
                if deref_all || self.ctx.types.array_info(child).is_some() {
                    return Some(Base::Place(Place { ptr: id, ty: child }));
                }
                // Many-item pointer: index through a slot holding it.
                let span = self.span(base);
                return self.spill(&value, span).map(Base::Place);
            }
        }
        Some(Base::Value(value))
    }

    fn field_place(&mut self, place: Place, field: Name, span: Span) -> Option<Place> {
        let Some((index, field_ty)) = self.ctx.types.field_index(place.ty, field) else {
            self.report(LowerProblem::NoSuchMember {
                span,
                ty: place.ty,
                name: field,
            });
            return None;
        };
        // Zero-sized fields have no layout slot; their address is never read.
        let layout_index = self
            .ctx
            .types
            .struct_type(place.ty)
            .and_then(|st| st.fields[index].gen_index)
            .unwrap_or(0);
        let ptr_ty = self.ctx.types.get_pointer(field_ty, false);
        let ptr = self
            .builder
            .emit_field_ptr(place.ptr, layout_index, ptr_ty, Some(span));
        Some(Place { ptr, ty: field_ty })
    }

    /// Element `index` of the array or many-item pointer in `place`.
    fn elem_place(&mut self, place: Place, index: ExprId, span: Span) -> Option<Place> {
        let types = &self.ctx.types;
        let (base_ptr, elem, len) = if let Some((elem, len)) = types.array_info(place.ty) {
            (place.ptr, elem, Some(len))
        } else if let Some((child, _)) = types.pointer_child(place.ty) {
            // The place holds a pointer; index through its value.
            let array = types.array_info(child);
            let ptr = self.builder.emit_load(place.ptr, place.ty, Some(span));
            match array {
                Some((elem, len)) => (ptr, elem, Some(len)),
                None => (ptr, child, None),
            }
        } else {
            let ty = place.ty;
            self.report(LowerProblem::UnsupportedOp { span, op: "[]", ty });
            return None;
        };

        let idx = self.lower_index_value(index, len)?;
        if let (Some(len), OperandKind::Runtime(id)) = (len, &idx.kind) {
            if self.safety_on() {
                self.emit_bounds_check(*id, len, span);
            }
        }
        let idx_id = self.materialize(&idx, span)?;
        let ptr_ty = self.ctx.types.get_pointer(elem, false);
        let ptr = self.builder.emit_elem_ptr(base_ptr, idx_id, ptr_ty, Some(span));
        Some(Place { ptr, ty: elem })
    }

    /// Lower an index as `usize`, checking compile-time indices against
    /// `len`.
    fn lower_index_value(&mut self, index: ExprId, len: Option<u64>) -> Option<Operand> {
        let span = self.span(index);
        let idx = self.lower_expr(index);
        let idx = self.coerce(idx, TypeId::USIZE, span);
        if !idx.is_usable() {
            return None;
        }
        if let (Some(len), Some(value)) = (len, idx.as_comptime()) {
            if value.is_undef() {
                self.report(LowerProblem::UseOfUndefined { span });
                return None;
            }
            let i = value.as_int().and_then(|v| v.to_u64()).unwrap_or(u64::MAX);
            if i >= len {
                self.report(LowerProblem::IndexOutOfBounds { span, index: i, len });
                return None;
            }
        }
        Some(idx)
    }

    /// Trap unless `index < len`.
    fn emit_bounds_check(&mut self, index: InstrId, len: u64, span: Span) {
        let len = self
            .builder
            .emit_const(ConstValue::int(TypeId::USIZE, len), Some(span));
        let in_bounds =
            self.builder
                .emit_binop(kiln_ir::BinaryOp::Lt, index, len, TypeId::BOOL, Some(span));
        let ok = self.builder.new_block("bounds_ok");
        let fail = self.builder.new_block("bounds_fail");
        self.builder.cond_br(in_bounds, ok, fail, Some(span));
        self.builder.position_at(fail);
        self.builder.unreachable(Some(span));
        self.builder.position_at(ok);
    }

    /// Copy a runtime aggregate into a fresh slot.
    fn spill(&mut self, value: &Operand, span: Span) -> Option<Place> {
        let id = self.materialize(value, span)?;
        let ptr_ty = self.ctx.types.get_pointer(value.ty, false);
        let ptr = self.builder.emit_alloca(None, ptr_ty, Some(span));
        self.builder.emit_store(ptr, id, Some(span));
        Some(Place { ptr, ty: value.ty })
    }

    fn load(&mut self, place: Place, span: Span) -> Operand {
        let id = self.builder.emit_load(place.ptr, place.ty, Some(span));
        Operand::runtime(id, place.ty)
    }

    // ── Field access ───────────────────────────────────────────────

    pub(crate) fn lower_field(&mut self, base: ExprId, field: Name, span: Span) -> Operand {
        if let Some(len) = self.array_len_access(base, field) {
            return Operand::comptime(ConstValue::int(TypeId::USIZE, len));
        }
        let Some(base) = self.lower_base(base, true) else {
            return Operand::invalid();
        };
        match base {
            Base::Place(place) => match self.field_place(place, field, span) {
                Some(p) => self.load(p, span),
                None => Operand::invalid(),
            },
            Base::Value(value) => self.field_of_value(value, field, span),
        }
    }

    /// `.len` of an array-typed base, known from its type alone.
    fn array_len_access(&mut self, base: ExprId, field: Name) -> Option<u64> {
        if self.ctx.interner.lookup(field) != "len" || !self.is_place(base) {
            return None;
        }
        let ty = self.place_type(base)?;
        let ty = self
            .ctx
            .types
            .pointer_child(ty)
            .map_or(ty, |(child, _)| child);
        self.ctx.types.array_info(ty).map(|(_, len)| len)
    }

    /// Static type of a place expression, without emitting anything.
    fn place_type(&self, id: ExprId) -> Option<TypeId> {
        let types = &self.ctx.types;
        match self.arena.kind(id) {
            ExprKind::Ident(name) => match self.ctx.scopes.lookup_var(self.scope, *name)?.binding {
                Binding::Slot { ty, .. } => Some(ty),
                Binding::Value(_) => None,
            },
            ExprKind::Field { base, field } => {
                let base = self.place_type(*base)?;
                let base = types.pointer_child(base).map_or(base, |(child, _)| child);
                types.field_index(base, *field).map(|(_, ty)| ty)
            }
            ExprKind::Index { base, .. } => types.index_elem(self.place_type(*base)?),
            _ => None,
        }
    }

    fn field_of_value(&mut self, value: Operand, field: Name, span: Span) -> Operand {
        if value.is_diverged() {
            return value;
        }
        let ty = value.ty;
        if let Some(enum_ty) = value.as_type() {
            return self.enum_variant(enum_ty, field, span);
        }
        if let Some((_, len)) = self.ctx.types.array_info(ty) {
            if self.ctx.interner.lookup(field) == "len" {
                return Operand::comptime(ConstValue::int(TypeId::USIZE, len));
            }
        }
        let Some((index, _)) = self.ctx.types.field_index(ty, field) else {
            return self.report(LowerProblem::NoSuchMember { span, ty, name: field });
        };
        if let Some(v) = value.as_comptime() {
            return match v.field(index, &self.ctx.types) {
                Ok(f) => Operand::comptime(f),
                Err(err) => self.report(LowerProblem::from_const_error(err, span)),
            };
        }
        let Some(place) = self.spill(&value, span) else {
            return Operand::diverged();
        };
        match self.field_place(place, field, span) {
            Some(p) => self.load(p, span),
            None => Operand::invalid(),
        }
    }

    // ── Element access ─────────────────────────────────────────────

    pub(crate) fn lower_index(&mut self, base: ExprId, index: ExprId, span: Span) -> Operand {
        let Some(base) = self.lower_base(base, false) else {
            return Operand::invalid();
        };
        let place = match base {
            Base::Place(place) => place,
            Base::Value(value) => match self.index_value(value, index, span) {
                Ok(result) => return result,
                Err(place) => place,
            },
        };
        match self.elem_place(place, index, span) {
            Some(p) => self.load(p, span),
            None => Operand::invalid(),
        }
    }

    /// Index a non-place value. Folds compile-time reads; otherwise
    /// returns the slot the value was spilled to.
    fn index_value(&mut self, value: Operand, index: ExprId, span: Span) -> Result<Operand, Place> {
        if value.is_diverged() {
            return Ok(value);
        }
        let ty = value.ty;
        let array_len = self.ctx.types.array_info(ty).map(|(_, len)| len);
        let c_str = value.as_comptime().and_then(ConstValue::as_ptr);
        if array_len.is_none() && c_str.is_none() {
            return Ok(self.report(LowerProblem::UnsupportedOp { span, op: "[]", ty }));
        }

        if let Some(v) = value.as_comptime().cloned() {
            let Some(idx) = self.lower_index_value(index, array_len) else {
                return Ok(Operand::invalid());
            };
            if let Some(i) = idx.as_comptime().and_then(ConstValue::as_int) {
                let i = i.to_u64().unwrap_or(u64::MAX);
                let read = match c_str {
                    Some(ptr) => self.ctx.consts.load(ptr, i),
                    None => v.element(i, &self.ctx.types),
                };
                return Ok(match read {
                    Ok(elem) => Operand::comptime(elem),
                    Err(err) => self.report(LowerProblem::from_const_error(err, span)),
                });
            }
            if c_str.is_some() {
                return Ok(self.report(LowerProblem::NotComptime {
                    span,
                    what: "index into a compile-time pointer",
                }));
            }
        }
        match self.spill(&value, span) {
            Some(place) => Err(place),
            None => Ok(Operand::diverged()),
        }
    }

    // ── Aggregate initializers ─────────────────────────────────────

    pub(crate) fn lower_struct_init(
        &mut self,
        ty: &ParsedType,
        fields: &[FieldInit],
        span: Span,
    ) -> Operand {
        let ty = self.resolve(ty, span);
        if ty.is_invalid() {
            return Operand::invalid();
        }
        let Some(st) = self.ctx.types.struct_type(ty).cloned() else {
            return self.report(LowerProblem::Mismatch {
                span,
                expected: ty,
                found: TypeId::VOID,
            });
        };
        let is_union = matches!(self.ctx.types.resolved(ty), TypeData::Union(_));

        // Source order, then arranged by declaration order.
        let mut seen: FxHashMap<Name, Span> = FxHashMap::default();
        let mut values: Vec<Option<Operand>> = vec![None; st.fields.len()];
        let mut ok = true;
        for init in fields {
            if let Some(&previous) = seen.get(&init.name) {
                self.report(LowerProblem::DuplicateFieldInit {
                    span: init.span,
                    name: init.name,
                    previous,
                });
                ok = false;
                continue;
            }
            seen.insert(init.name, init.span);
            let Some(index) = st.fields.iter().position(|f| f.name == init.name) else {
                self.report(LowerProblem::NoSuchMember {
                    span: init.span,
                    ty,
                    name: init.name,
                });
                ok = false;
                continue;
            };
            let value = self.lower_expr(init.value);
            if value.is_diverged() {
                return value;
            }
            let value = self.coerce(value, st.fields[index].ty, self.span(init.value));
            ok &= !value.is_invalid();
            values[index] = Some(value);
        }

        if is_union {
            if fields.len() != 1 {
                return self.report(LowerProblem::UnionInitCount {
                    span,
                    found: fields.len(),
                });
            }
        } else {
            for (field, value) in st.fields.iter().zip(&values) {
                if value.is_none() && ok {
                    self.report(LowerProblem::MissingField {
                        span,
                        ty,
                        name: field.name,
                    });
                    ok = false;
                }
            }
        }
        if !ok {
            return Operand::invalid();
        }

        if !is_union && values.iter().flatten().all(|v| v.as_comptime().is_some()) {
            let consts = values
                .into_iter()
                .flatten()
                .filter_map(|v| v.as_comptime().cloned())
                .collect();
            return Operand::comptime(ConstValue::struct_value(ty, consts));
        }

        let ptr_ty = self.ctx.types.get_pointer(ty, false);
        let slot = self.builder.emit_alloca(None, ptr_ty, Some(span));
        let place = Place { ptr: slot, ty };
        for (field, value) in st.fields.iter().zip(values) {
            let Some(value) = value else { continue };
            let Some(field_place) = self.field_place(place, field.name, span) else {
                return Operand::invalid();
            };
            let Some(id) = self.materialize(&value, span) else {
                return Operand::diverged();
            };
            self.builder.emit_store(field_place.ptr, id, Some(span));
        }
        self.load(place, span)
    }

    pub(crate) fn lower_array_init(&mut self, init: &ArrayInit, span: Span) -> Operand {
        let elem = self.resolve(&init.elem_ty, span);
        if elem.is_invalid() {
            return Operand::invalid();
        }
        let array_ty = self.ctx.types.get_array(elem, init.elems.len() as u64);

        let mut values = Vec::with_capacity(init.elems.len());
        for &e in &init.elems {
            let value = self.lower_expr(e);
            if value.is_diverged() {
                return value;
            }
            values.push(self.coerce(value, elem, self.span(e)));
        }
        if values.iter().any(Operand::is_invalid) {
            return Operand::invalid();
        }
        if values.iter().all(|v| v.as_comptime().is_some()) {
            let consts = values
                .into_iter()
                .filter_map(|v| v.as_comptime().cloned())
                .collect();
            return Operand::comptime(ConstValue::array(array_ty, consts));
        }

        let ptr_ty = self.ctx.types.get_pointer(array_ty, false);
        let elem_ptr_ty = self.ctx.types.get_pointer(elem, false);
        let slot = self.builder.emit_alloca(None, ptr_ty, Some(span));
        for (i, value) in (0u64..).zip(&values) {
            let index = self
                .builder
                .emit_const(ConstValue::int(TypeId::USIZE, i), Some(span));
            let ptr = self.builder.emit_elem_ptr(slot, index, elem_ptr_ty, Some(span));
            let Some(id) = self.materialize(value, span) else {
                return Operand::diverged();
            };
            self.builder.emit_store(ptr, id, Some(span));
        }
        self.load(Place { ptr: slot, ty: array_ty }, span)
    }
}
