//! Per-compilation state.
//!
//! One [`CompilationContext`] owns everything a compilation accumulates:
//! interned types, the constant arena, the scope tree, analysed functions
//! and diagnostics. Analysis passes receive it as `&mut` instead of
//! reaching for process-wide state, so several compilations can run side
//! by side in one process.

use kiln_const::ConstArena;
use kiln_diagnostic::{Diagnostic, DiagnosticQueue, ErrorGuaranteed};
use kiln_ir::{DeclId, FnId, Name, SharedInterner, TypeId};
use kiln_ssa::IrFunction;
use kiln_types::{GenericArg, InstantiationCache, TypeTable};
use rustc_hash::FxHashMap;

use crate::problem::{LowerProblem, TypeProblem};
use crate::scope::ScopeTree;
use crate::SemaConfig;

/// Analysis state of a declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeclState {
    /// Being resolved; seeing it again means a cycle.
    InProgress,
    Valid,
    /// Analysis reported errors. Codegen skips it.
    Invalid,
}

/// One analysed function body: a plain function, or one instantiation of
/// a generic function.
#[derive(Clone, Debug)]
pub struct FnEntry {
    pub fn_id: FnId,
    pub decl: DeclId,
    pub name: Name,
    /// Function type (`TypeId::INVALID` if the signature failed).
    pub ty: TypeId,
    /// Bound comptime parameters, empty for non-generic functions.
    pub generic_args: Vec<GenericArg>,
    /// Lowered body; `None` for `extern` prototypes and failed bodies.
    pub ir: Option<IrFunction>,
    pub invalid: bool,
}

pub struct CompilationContext {
    pub interner: SharedInterner,
    pub config: SemaConfig,
    pub types: TypeTable,
    pub consts: ConstArena,
    pub scopes: ScopeTree,
    pub diagnostics: DiagnosticQueue,
    fns: Vec<FnEntry>,
    decl_fns: FxHashMap<DeclId, FnId>,
    decl_states: FxHashMap<DeclId, DeclState>,
    instances: InstantiationCache<FnId>,
    /// Errors reported, including ones the queue filtered out.
    errors_reported: usize,
}

impl CompilationContext {
    pub fn new(interner: SharedInterner, config: SemaConfig) -> Self {
        let mut scopes = ScopeTree::new();
        let root = scopes.root();
        scopes.set_safety_off(root, !config.safety_checks);
        CompilationContext {
            interner,
            types: TypeTable::new(config.pointer_bits),
            consts: ConstArena::new(),
            scopes,
            diagnostics: DiagnosticQueue::with_config(config.diagnostics.clone()),
            config,
            fns: Vec::new(),
            decl_fns: FxHashMap::default(),
            decl_states: FxHashMap::default(),
            instances: InstantiationCache::new(),
            errors_reported: 0,
        }
    }

    // ── Functions ───────────────────────────────────────────────────

    /// Register a function and assign it the next `FnId`.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` functions are registered.
    pub(crate) fn alloc_fn(
        &mut self,
        decl: DeclId,
        name: Name,
        ty: TypeId,
        generic_args: Vec<GenericArg>,
    ) -> FnId {
        let raw = u32::try_from(self.fns.len())
            .unwrap_or_else(|_| panic!("function table exceeded u32::MAX entries"));
        let fn_id = FnId::new(raw);
        self.fns.push(FnEntry {
            fn_id,
            decl,
            name,
            ty,
            generic_args,
            ir: None,
            invalid: ty.is_invalid(),
        });
        fn_id
    }

    pub fn functions(&self) -> &[FnEntry] {
        &self.fns
    }

    /// # Panics
    /// Panics if `fn_id` was not allocated by this context.
    pub fn function(&self, fn_id: FnId) -> &FnEntry {
        &self.fns[fn_id.index()]
    }

    pub(crate) fn function_mut(&mut self, fn_id: FnId) -> &mut FnEntry {
        &mut self.fns[fn_id.index()]
    }

    /// Lowered bodies of every valid function, in `FnId` order.
    pub fn lowered(&self) -> impl Iterator<Item = &IrFunction> {
        self.fns
            .iter()
            .filter(|f| !f.invalid)
            .filter_map(|f| f.ir.as_ref())
    }

    /// The non-generic function declared by `decl`.
    pub fn fn_for_decl(&self, decl: DeclId) -> Option<FnId> {
        self.decl_fns.get(&decl).copied()
    }

    pub(crate) fn bind_decl_fn(&mut self, decl: DeclId, fn_id: FnId) {
        self.decl_fns.insert(decl, fn_id);
    }

    /// Function by source name, for callers that only know the name.
    pub fn function_named(&self, name: &str) -> Option<&FnEntry> {
        let name = self.interner.intern(name);
        self.fns
            .iter()
            .find(|f| f.name == name && f.generic_args.is_empty())
    }

    // ── Generic instances ───────────────────────────────────────────

    pub(crate) fn instance(&self, decl: DeclId, args: &[GenericArg]) -> Option<FnId> {
        self.instances.get(decl, args).copied()
    }

    pub(crate) fn record_instance(&mut self, decl: DeclId, args: Vec<GenericArg>, fn_id: FnId) {
        self.instances.insert(decl, args, fn_id);
    }

    /// Number of distinct generic instantiations so far.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    // ── Declaration states ──────────────────────────────────────────

    pub fn decl_state(&self, decl: DeclId) -> Option<DeclState> {
        self.decl_states.get(&decl).copied()
    }

    pub(crate) fn set_decl_state(&mut self, decl: DeclId, state: DeclState) {
        self.decl_states.insert(decl, state);
    }

    pub fn is_invalid(&self, decl: DeclId) -> bool {
        self.decl_state(decl) == Some(DeclState::Invalid)
    }

    // ── Diagnostics ─────────────────────────────────────────────────

    pub(crate) fn report_type(&mut self, problem: &TypeProblem) {
        let diag = problem.into_diagnostic(&self.interner, &self.types);
        self.errors_reported += 1;
        self.diagnostics.add(diag);
    }

    pub(crate) fn report_lower(&mut self, problem: &LowerProblem) {
        let diag = problem.into_diagnostic(&self.interner, &self.types);
        if diag.is_error() {
            self.errors_reported += 1;
        }
        self.diagnostics.add(diag);
    }

    /// Running error count, unaffected by queue limits and flushing.
    pub(crate) fn errors_reported(&self) -> usize {
        self.errors_reported
    }

    /// Proof that an error was reported at some point in this compilation.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.errors_reported)
    }

    /// Drain every diagnostic reported so far.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.flush()
    }
}
