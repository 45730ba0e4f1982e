//! Lexical scope tree.
//!
//! Every module, function body, block and loop gets a [`BlockContext`] in
//! one arena addressed by [`ScopeId`]. Parent links are IDs, so the tree
//! stays alive for the whole compilation (generic instances lowered later
//! still resolve names through their declaring scopes) without any
//! ownership cycles.
//!
//! Lookups:
//! - declarations walk to the module root
//! - variables and loop labels stop at the enclosing function boundary

use kiln_ir::{DeclId, Name, Span, TypeId};
use kiln_ssa::{BlockId, InstrId};
use rustc_hash::FxHashMap;

use crate::lower::Operand;

/// Index into the [`ScopeTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
    Loop,
}

/// What a local name is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    /// Immutable `let`, function parameter, or comptime parameter.
    Value(Operand),
    /// `var`: a stack slot holding a `ty`.
    Slot { ptr: InstrId, ty: TypeId },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarEntry {
    pub binding: Binding,
    pub span: Span,
}

/// Jump targets of a loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopTargets {
    pub break_block: BlockId,
    pub continue_block: BlockId,
}

/// One node of the scope tree.
#[derive(Clone, Debug)]
pub struct BlockContext {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    decls: FxHashMap<Name, (DeclId, Span)>,
    vars: FxHashMap<Name, VarEntry>,
    labels: FxHashMap<Name, ScopeId>,
    /// Nearest enclosing loop scope (this scope itself for loops).
    pub loop_scope: Option<ScopeId>,
    loop_targets: Option<LoopTargets>,
    /// Runtime safety checks disabled.
    pub safety_off: bool,
}

/// Arena of all scopes of a compilation.
#[derive(Clone, Debug)]
pub struct ScopeTree {
    scopes: Vec<BlockContext>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Tree with a single module root.
    pub fn new() -> Self {
        Self {
            scopes: vec![BlockContext {
                parent: None,
                kind: ScopeKind::Module,
                decls: FxHashMap::default(),
                vars: FxHashMap::default(),
                labels: FxHashMap::default(),
                loop_scope: None,
                loop_targets: None,
                safety_off: false,
            }],
        }
    }

    #[inline]
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    #[inline]
    pub fn get(&self, id: ScopeId) -> &BlockContext {
        &self.scopes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Drop every scope opened since the tree held `len` scopes. No
    /// `ScopeId` of a dropped scope may be used afterwards. The root is
    /// always kept.
    pub fn truncate(&mut self, len: usize) {
        self.scopes.truncate(len.max(1));
    }

    /// Open a child scope. It inherits the parent's loop and safety flag;
    /// a function boundary resets the loop.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "scope counts never exceed u32"
    )]
    pub fn push(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let p = self.get(parent);
        let loop_scope = if kind == ScopeKind::Function {
            None
        } else {
            p.loop_scope
        };
        let safety_off = p.safety_off;
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(BlockContext {
            parent: Some(parent),
            kind,
            decls: FxHashMap::default(),
            vars: FxHashMap::default(),
            labels: FxHashMap::default(),
            loop_scope,
            loop_targets: None,
            safety_off,
        });
        id
    }

    /// Open a loop scope with its jump targets and optional label.
    pub fn push_loop(
        &mut self,
        parent: ScopeId,
        targets: LoopTargets,
        label: Option<Name>,
    ) -> ScopeId {
        let id = self.push(parent, ScopeKind::Loop);
        let scope = &mut self.scopes[id.index()];
        scope.loop_scope = Some(id);
        scope.loop_targets = Some(targets);
        if let Some(label) = label {
            scope.labels.insert(label, id);
        }
        id
    }

    pub fn set_safety_off(&mut self, scope: ScopeId, off: bool) {
        self.scopes[scope.index()].safety_off = off;
    }

    #[inline]
    pub fn safety_off(&self, scope: ScopeId) -> bool {
        self.get(scope).safety_off
    }

    // ── Declarations ────────────────────────────────────────────────

    /// Register a declaration. Returns the earlier span on redeclaration
    /// within the same scope.
    pub fn add_decl(
        &mut self,
        scope: ScopeId,
        name: Name,
        decl: DeclId,
        span: Span,
    ) -> Result<(), Span> {
        let decls = &mut self.scopes[scope.index()].decls;
        if let Some(&(_, prev)) = decls.get(&name) {
            return Err(prev);
        }
        decls.insert(name, (decl, span));
        Ok(())
    }

    /// Find a declaration, walking out to the module root.
    pub fn lookup_decl(&self, scope: ScopeId, name: Name) -> Option<DeclId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let ctx = self.get(id);
            if let Some(&(decl, _)) = ctx.decls.get(&name) {
                return Some(decl);
            }
            current = ctx.parent;
        }
        None
    }

    // ── Variables ───────────────────────────────────────────────────

    /// Bind a local. Returns the earlier span on redeclaration within the
    /// same scope; shadowing an outer scope is allowed.
    pub fn add_var(
        &mut self,
        scope: ScopeId,
        name: Name,
        binding: Binding,
        span: Span,
    ) -> Result<(), Span> {
        let vars = &mut self.scopes[scope.index()].vars;
        if let Some(prev) = vars.get(&name) {
            return Err(prev.span);
        }
        vars.insert(name, VarEntry { binding, span });
        Ok(())
    }

    /// Find a local, stopping at the enclosing function scope.
    pub fn lookup_var(&self, scope: ScopeId, name: Name) -> Option<&VarEntry> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let ctx = self.get(id);
            if let Some(entry) = ctx.vars.get(&name) {
                return Some(entry);
            }
            if matches!(ctx.kind, ScopeKind::Function | ScopeKind::Module) {
                return None;
            }
            current = ctx.parent;
        }
        None
    }

    // ── Loops ───────────────────────────────────────────────────────

    /// Targets of the loop labelled `label`, within the current function.
    pub fn lookup_label(&self, scope: ScopeId, label: Name) -> Option<LoopTargets> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let ctx = self.get(id);
            if let Some(&loop_id) = ctx.labels.get(&label) {
                return self.get(loop_id).loop_targets;
            }
            if matches!(ctx.kind, ScopeKind::Function | ScopeKind::Module) {
                return None;
            }
            current = ctx.parent;
        }
        None
    }

    /// Targets of the innermost enclosing loop.
    pub fn enclosing_loop(&self, scope: ScopeId) -> Option<LoopTargets> {
        let loop_id = self.get(scope).loop_scope?;
        self.get(loop_id).loop_targets
    }
}

#[cfg(test)]
mod tests;
