use kiln_const::ConstValue;
use kiln_ir::{DeclId, Name, Span, TypeId};
use kiln_ssa::{BlockId, InstrId};

use crate::lower::Operand;

use super::*;

fn n(raw: u32) -> Name {
    Name::from_raw(raw)
}

fn value(v: i64) -> Binding {
    Binding::Value(Operand::comptime(ConstValue::int(TypeId::COMPTIME_INT, v)))
}

fn targets(brk: u32, cont: u32) -> LoopTargets {
    LoopTargets {
        break_block: BlockId::new(brk),
        continue_block: BlockId::new(cont),
    }
}

#[test]
fn redeclaration_reports_previous_span() {
    let mut tree = ScopeTree::new();
    let root = tree.root();
    assert_eq!(tree.add_decl(root, n(1), DeclId::new(0), Span::new(0, 3)), Ok(()));
    assert_eq!(
        tree.add_decl(root, n(1), DeclId::new(1), Span::new(10, 13)),
        Err(Span::new(0, 3))
    );
}

#[test]
fn decls_are_found_from_nested_scopes() {
    let mut tree = ScopeTree::new();
    let root = tree.root();
    tree.add_decl(root, n(1), DeclId::new(4), Span::DUMMY).ok();
    let func = tree.push(root, ScopeKind::Function);
    let block = tree.push(func, ScopeKind::Block);
    assert_eq!(tree.lookup_decl(block, n(1)), Some(DeclId::new(4)));
    assert_eq!(tree.lookup_decl(block, n(2)), None);
}

#[test]
fn vars_shadow_outer_scopes_but_not_siblings() {
    let mut tree = ScopeTree::new();
    let func = tree.push(tree.root(), ScopeKind::Function);
    tree.add_var(func, n(1), value(1), Span::new(0, 1)).ok();

    let inner = tree.push(func, ScopeKind::Block);
    assert_eq!(tree.add_var(inner, n(1), value(2), Span::new(5, 6)), Ok(()));
    assert_eq!(
        tree.lookup_var(inner, n(1)).map(|e| e.span),
        Some(Span::new(5, 6))
    );
    assert_eq!(
        tree.add_var(inner, n(1), value(3), Span::new(9, 10)),
        Err(Span::new(5, 6))
    );

    let sibling = tree.push(func, ScopeKind::Block);
    assert_eq!(
        tree.lookup_var(sibling, n(1)).map(|e| e.span),
        Some(Span::new(0, 1))
    );
}

#[test]
fn var_lookup_stops_at_function_boundary() {
    let mut tree = ScopeTree::new();
    let outer = tree.push(tree.root(), ScopeKind::Function);
    tree.add_var(
        outer,
        n(1),
        Binding::Slot {
            ptr: InstrId::new(0),
            ty: TypeId::U32,
        },
        Span::DUMMY,
    )
    .ok();
    let inner_fn = tree.push(outer, ScopeKind::Function);
    assert!(tree.lookup_var(inner_fn, n(1)).is_none());
}

#[test]
fn loops_are_inherited_by_blocks_not_functions() {
    let mut tree = ScopeTree::new();
    let func = tree.push(tree.root(), ScopeKind::Function);
    assert_eq!(tree.enclosing_loop(func), None);

    let lp = tree.push_loop(func, targets(2, 1), Some(n(7)));
    let body = tree.push(lp, ScopeKind::Block);
    assert_eq!(tree.enclosing_loop(body), Some(targets(2, 1)));
    assert_eq!(tree.lookup_label(body, n(7)), Some(targets(2, 1)));

    let inner = tree.push_loop(body, targets(5, 4), None);
    assert_eq!(tree.enclosing_loop(inner), Some(targets(5, 4)));
    assert_eq!(tree.lookup_label(inner, n(7)), Some(targets(2, 1)));

    let nested_fn = tree.push(inner, ScopeKind::Function);
    assert_eq!(tree.enclosing_loop(nested_fn), None);
    assert_eq!(tree.lookup_label(nested_fn, n(7)), None);
}

#[test]
fn safety_flag_is_inherited_unless_overridden() {
    let mut tree = ScopeTree::new();
    let root = tree.root();
    tree.set_safety_off(root, true);
    let func = tree.push(root, ScopeKind::Function);
    assert!(tree.safety_off(func));

    tree.set_safety_off(func, false);
    let block = tree.push(func, ScopeKind::Block);
    assert!(!tree.safety_off(block));
    assert!(tree.safety_off(root));
}

#[test]
fn truncate_drops_later_scopes_and_keeps_the_root() {
    let mut tree = ScopeTree::new();
    let mark = tree.len();
    let func = tree.push(tree.root(), ScopeKind::Function);
    tree.push(func, ScopeKind::Block);
    assert_eq!(tree.len(), mark + 2);

    tree.truncate(mark);
    assert_eq!(tree.len(), mark);
    tree.truncate(0);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.get(tree.root()).kind, ScopeKind::Module);
}
