//! Textual IR dump.
//!
//! ```text
//! fn fn#0(u32) u32 {
//! bb0 entry:
//!   %0 = param u32 0
//!   %1 = const u32 7
//!   %2 = add u32 %0, %1
//!   ret %2
//! }
//! ```
//!
//! `Display` names primitive types only and prints other types as `t<N>`.
//! [`IrFunction::pretty`] resolves every type and the function name.

use std::fmt::{self, Write};

use kiln_ir::{StringInterner, TypeId};
use kiln_types::TypeTable;

use crate::ir::{InstrId, InstrKind, IrFunction};

impl IrFunction {
    /// Render with full type names from `types`.
    pub fn pretty(&self, types: &TypeTable, interner: &StringInterner) -> String {
        let mut out = String::new();
        let _ = write_function(
            &mut out,
            self,
            interner.lookup(self.name),
            &|ty: TypeId| types.display(ty, interner),
        );
        out
    }
}

impl fmt::Display for IrFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{:?}", self.fn_id);
        write_function(f, self, &name, &|ty: TypeId| match ty.primitive_name() {
            Some(name) => name.to_owned(),
            None => format!("t{}", ty.raw()),
        })
    }
}

fn write_function(
    out: &mut impl Write,
    func: &IrFunction,
    name: &str,
    ty_name: &dyn Fn(TypeId) -> String,
) -> fmt::Result {
    write!(out, "fn {name}(")?;
    for (idx, param) in func.params.iter().enumerate() {
        if idx > 0 {
            out.write_str(", ")?;
        }
        out.write_str(&ty_name(param.ty))?;
    }
    writeln!(out, ") {} {{", ty_name(func.return_type))?;

    for block in &func.blocks {
        writeln!(out, "bb{} {}:", block.id.raw(), block.name_hint)?;
        for &id in &block.instrs {
            out.write_str("  ")?;
            write_instr(out, func, id, ty_name)?;
            out.write_char('\n')?;
        }
    }
    out.write_str("}\n")
}

fn write_instr(
    out: &mut impl Write,
    func: &IrFunction,
    id: InstrId,
    ty_name: &dyn Fn(TypeId) -> String,
) -> fmt::Result {
    let instr = func.instr(id);
    let mnemonic = instr.kind.mnemonic();
    let ty = ty_name(instr.ty);

    match &instr.kind {
        InstrKind::Const(value) => write!(out, "%{} = {mnemonic} {ty} {value}", id.raw()),
        InstrKind::Param { index } => write!(out, "%{} = {mnemonic} {ty} {index}", id.raw()),
        InstrKind::BinOp { lhs, rhs, .. } => write!(
            out,
            "%{} = {mnemonic} {ty} %{}, %{}",
            id.raw(),
            lhs.raw(),
            rhs.raw()
        ),
        InstrKind::UnOp { operand: value, .. }
        | InstrKind::Cast { value }
        | InstrKind::Load { ptr: value } => {
            write!(out, "%{} = {mnemonic} {ty} %{}", id.raw(), value.raw())
        }
        InstrKind::Call { callee, args } => {
            write!(out, "%{} = {mnemonic} {ty} {callee:?}(", id.raw())?;
            for (idx, arg) in args.iter().enumerate() {
                if idx > 0 {
                    out.write_str(", ")?;
                }
                write!(out, "%{}", arg.raw())?;
            }
            out.write_char(')')
        }
        InstrKind::Alloca { .. } => write!(out, "%{} = {mnemonic} {ty}", id.raw()),
        InstrKind::Store { ptr, value } => {
            write!(out, "{mnemonic} %{}, %{}", ptr.raw(), value.raw())
        }
        InstrKind::FieldPtr { base, field } => write!(
            out,
            "%{} = {mnemonic} {ty} %{}, {field}",
            id.raw(),
            base.raw()
        ),
        InstrKind::ElemPtr { base, index } => write!(
            out,
            "%{} = {mnemonic} {ty} %{}, %{}",
            id.raw(),
            base.raw(),
            index.raw()
        ),
        InstrKind::Phi { incoming } => {
            write!(out, "%{} = {mnemonic} {ty}", id.raw())?;
            for (idx, inc) in incoming.iter().enumerate() {
                let sep = if idx == 0 { " " } else { ", " };
                write!(out, "{sep}[bb{}: %{}]", inc.block.raw(), inc.value.raw())?;
            }
            Ok(())
        }
        InstrKind::Br { target } => write!(out, "{mnemonic} bb{}", target.raw()),
        InstrKind::CondBr {
            cond,
            then_block,
            else_block,
        } => write!(
            out,
            "{mnemonic} %{}, bb{}, bb{}",
            cond.raw(),
            then_block.raw(),
            else_block.raw()
        ),
        InstrKind::SwitchBr {
            subject,
            cases,
            default,
        } => {
            write!(out, "{mnemonic} %{} [", subject.raw())?;
            for (idx, case) in cases.iter().enumerate() {
                if idx > 0 {
                    out.write_str(", ")?;
                }
                write!(out, "{} => bb{}", case.value, case.target.raw())?;
            }
            write!(out, "], default bb{}", default.raw())
        }
        InstrKind::Return { value: Some(value) } => write!(out, "{mnemonic} %{}", value.raw()),
        InstrKind::Return { value: None } => write!(out, "{mnemonic} void"),
        InstrKind::Unreachable => out.write_str(mnemonic),
    }
}

#[cfg(test)]
mod tests;
