//! Type formatting for diagnostics and IR dumps.

use std::fmt::Write as _;

use kiln_ir::{StringInterner, TypeId};

use super::TypeTable;
use crate::{FnFlags, TypeData};

impl TypeTable {
    /// Render a type the way it is written in source.
    pub fn display(&self, id: TypeId, interner: &StringInterner) -> String {
        let mut buf = String::new();
        self.display_into(id, interner, &mut buf);
        buf
    }

    fn display_into(&self, id: TypeId, interner: &StringInterner, buf: &mut String) {
        if let Some(name) = id.primitive_name() {
            buf.push_str(name);
            return;
        }
        match self.data(id) {
            TypeData::Int(info) => {
                let _ = write!(buf, "{}{}", if info.signed { 'i' } else { 'u' }, info.bits);
            }
            TypeData::Pointer { child, is_const } => {
                buf.push('*');
                if *is_const {
                    buf.push_str("const ");
                }
                self.display_into(*child, interner, buf);
            }
            TypeData::Array { child, len } => {
                let _ = write!(buf, "[{len}]");
                self.display_into(*child, interner, buf);
            }
            TypeData::Slice { child, is_const } => {
                buf.push_str("[]");
                if *is_const {
                    buf.push_str("const ");
                }
                self.display_into(*child, interner, buf);
            }
            TypeData::Optional(child) => {
                buf.push('?');
                self.display_into(*child, interner, buf);
            }
            TypeData::ErrorUnion(child) => {
                buf.push('!');
                self.display_into(*child, interner, buf);
            }
            TypeData::Fn(sig) => {
                buf.push_str("fn(");
                for (i, p) in sig.params.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    self.display_into(*p, interner, buf);
                }
                if sig.flags.contains(FnFlags::VAR_ARGS) {
                    buf.push_str(if sig.params.is_empty() { "..." } else { ", ..." });
                }
                buf.push_str(") ");
                self.display_into(sig.ret, interner, buf);
            }
            TypeData::Struct(st) | TypeData::Union(st) => buf.push_str(interner.lookup(st.name)),
            TypeData::Enum(en) => buf.push_str(interner.lookup(en.name)),
            TypeData::GenericFn { name, .. } | TypeData::TypeDecl { name, .. } => {
                buf.push_str(interner.lookup(*name));
            }
            // Primitive data outside the primitive range cannot occur.
            other => {
                let _ = write!(buf, "{other:?}");
            }
        }
    }
}
