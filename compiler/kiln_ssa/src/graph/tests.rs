use kiln_const::ConstValue;
use kiln_ir::TypeId;

use crate::builder::IrBuilder;
use crate::ir::SwitchCase;
use crate::test_helpers::{b, diamond, finish};

use super::*;

#[test]
fn diamond_predecessors() {
    let func = diamond();
    let preds = predecessors(&func);
    assert!(preds[0].is_empty());
    assert_eq!(preds[1], vec![b(0)]);
    assert_eq!(preds[2], vec![b(0)]);
    assert_eq!(preds[3], vec![b(1), b(2)]);
}

#[test]
fn repeated_edges_count_once() {
    let mut builder = IrBuilder::new();
    let target = builder.new_block("target");
    let subject = builder.emit_param(0, TypeId::U8, None);
    builder.switch_br(
        subject,
        vec![SwitchCase {
            value: ConstValue::int(TypeId::U8, 3),
            target,
        }],
        target,
        None,
    );
    builder.position_at(target);
    builder.ret(None, None);
    let func = finish(builder, TypeId::VOID);

    assert_eq!(successors(&func, b(0)).as_slice(), &[b(1), b(1)]);
    assert_eq!(predecessors(&func)[1], vec![b(0)]);
}

#[test]
fn reverse_postorder_starts_at_entry() {
    let func = diamond();
    let rpo = reachable_blocks(&func);
    assert_eq!(rpo.first(), Some(&b(0)));
    assert_eq!(rpo.last(), Some(&b(3)));
    assert_eq!(rpo.len(), 4);
}

#[test]
fn unreachable_blocks_are_not_visited() {
    let mut builder = IrBuilder::new();
    let dead = builder.new_block("dead");
    let live = builder.new_block("live");
    builder.br(live, None);
    builder.position_at(live);
    builder.ret(None, None);
    builder.position_at(dead);
    builder.br(live, None);
    let func = finish(builder, TypeId::VOID);

    assert_eq!(reachable_blocks(&func), vec![b(0), b(2)]);
    assert_eq!(reachability(&func), vec![true, false, true]);
}

#[test]
fn loops_terminate() {
    let mut builder = IrBuilder::new();
    let header = builder.new_block("loop");
    let exit = builder.new_block("exit");
    builder.br(header, None);
    builder.position_at(header);
    let c = builder.emit_param(0, TypeId::BOOL, None);
    builder.cond_br(c, header, exit, None);
    builder.position_at(exit);
    builder.ret(None, None);
    let func = finish(builder, TypeId::VOID);

    assert_eq!(postorder(&func), vec![b(2), b(1), b(0)]);
    assert_eq!(predecessors(&func)[1], vec![b(0), b(1)]);
}
