use kiln_const::{ConstStatus, ConstValue, NumKind};
use kiln_ir::{BackendHandle, DeclId, Name, StringInterner};
use num_bigint::BigInt;
use pretty_assertions::assert_eq;

use super::*;
use crate::{CallConv, FnFlags};

// ── Uniquing ──

#[test]
fn pointers_are_unique_per_child_and_constness() {
    let mut t = TypeTable::default();
    let a = t.get_pointer(TypeId::U8, true);
    let b = t.get_pointer(TypeId::U8, true);
    let c = t.get_pointer(TypeId::U8, false);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(t.pointer_child(a), Some((TypeId::U8, true)));
}

#[test]
fn arrays_are_unique_per_child_and_length() {
    let mut t = TypeTable::default();
    let a4 = t.get_array(TypeId::U8, 4);
    let a4_again = t.get_array(TypeId::U8, 4);
    let a5 = t.get_array(TypeId::U8, 5);
    let i4 = t.get_array(TypeId::I8, 4);
    assert_eq!(a4, a4_again);
    assert_ne!(a4, a5);
    assert_ne!(a4, i4);
    assert_eq!(t.array_info(a5), Some((TypeId::U8, 5)));
}

#[test]
fn fn_types_are_structural() {
    let mut t = TypeTable::default();
    // Two signatures built independently, as from two separate source texts.
    let s1 = FnSig::new(vec![TypeId::U32, TypeId::BOOL], TypeId::U8);
    let s2 = FnSig::new(vec![TypeId::U32, TypeId::BOOL], TypeId::U8);
    let f1 = t.get_fn(s1);
    let f2 = t.get_fn(s2);
    assert_eq!(f1, f2);

    let swapped = t.get_fn(FnSig::new(vec![TypeId::BOOL, TypeId::U32], TypeId::U8));
    assert_ne!(f1, swapped);

    let var_args = t.get_fn(
        FnSig::new(vec![TypeId::U32, TypeId::BOOL], TypeId::U8).with_flags(FnFlags::VAR_ARGS),
    );
    assert_ne!(f1, var_args);

    let c_conv = t.get_fn(FnSig::new(vec![TypeId::U32, TypeId::BOOL], TypeId::U8).with_cc(CallConv::C));
    assert_ne!(f1, c_conv);
}

#[test]
fn wrapper_types_are_unique() {
    let mut t = TypeTable::default();
    assert_eq!(t.get_optional(TypeId::U8), t.get_optional(TypeId::U8));
    assert_eq!(t.get_error_union(TypeId::U8), t.get_error_union(TypeId::U8));
    assert_eq!(t.get_slice(TypeId::U8, true), t.get_slice(TypeId::U8, true));
    assert_ne!(t.get_slice(TypeId::U8, true), t.get_slice(TypeId::U8, false));
}

#[test]
fn standard_int_widths_are_primitives() {
    let mut t = TypeTable::default();
    assert_eq!(t.get_int(false, 8), TypeId::U8);
    assert_eq!(t.get_int(true, 64), TypeId::I64);
    let u7 = t.get_int(false, 7);
    assert!(!u7.is_primitive());
    assert_eq!(t.get_int(false, 7), u7);
}

// ── Invalid propagation ──

#[test]
fn invalid_children_propagate() {
    let mut t = TypeTable::default();
    let before = t.len();
    assert_eq!(t.get_pointer(TypeId::INVALID, false), TypeId::INVALID);
    assert_eq!(t.get_array(TypeId::INVALID, 3), TypeId::INVALID);
    assert_eq!(t.get_optional(TypeId::INVALID), TypeId::INVALID);
    assert_eq!(
        t.get_fn(FnSig::new(vec![TypeId::INVALID], TypeId::VOID)),
        TypeId::INVALID
    );
    assert_eq!(t.len(), before);
}

#[test]
fn struct_with_invalid_field_is_flagged() {
    let mut t = TypeTable::default();
    let s = t.declare_struct(DeclId::new(0), Name::from_raw(1));
    t.complete_struct(s, vec![(Name::from_raw(2), TypeId::INVALID)]);
    assert!(t.flags(s).contains(TypeFlags::HAS_INVALID));
    // The struct itself is still usable as a child.
    assert_ne!(t.get_pointer(s, false), TypeId::INVALID);
}

// ── Nominal types ──

#[test]
fn nominal_structs_are_distinct_per_declaration() {
    let mut t = TypeTable::default();
    let a = t.declare_struct(DeclId::new(0), Name::from_raw(1));
    let b = t.declare_struct(DeclId::new(1), Name::from_raw(1));
    t.complete_struct(a, vec![(Name::from_raw(2), TypeId::U8)]);
    t.complete_struct(b, vec![(Name::from_raw(2), TypeId::U8)]);
    assert_ne!(a, b);
    assert_eq!(t.declare_struct(DeclId::new(0), Name::from_raw(1)), a);
    assert_eq!(t.decl_type(DeclId::new(1)), Some(b));
}

#[test]
fn zero_sized_fields_get_no_generated_index() {
    let mut t = TypeTable::default();
    let s = t.declare_struct(DeclId::new(0), Name::from_raw(1));
    t.complete_struct(
        s,
        vec![
            (Name::from_raw(2), TypeId::U8),
            (Name::from_raw(3), TypeId::VOID),
            (Name::from_raw(4), TypeId::U32),
        ],
    );
    let st = t.struct_type(s).map(|st| st.fields.clone()).unwrap_or_default();
    let gen: Vec<_> = st.iter().map(|f| f.gen_index).collect();
    let src: Vec<_> = st.iter().map(|f| f.src_index).collect();
    assert_eq!(gen, vec![Some(0), None, Some(1)]);
    assert_eq!(src, vec![0, 1, 2]);
    assert_eq!(t.field_index(s, Name::from_raw(4)), Some((2, TypeId::U32)));
    assert!(!t.is_zero_sized(s));
}

#[test]
fn struct_of_void_fields_is_zero_sized() {
    let mut t = TypeTable::default();
    let s = t.declare_struct(DeclId::new(0), Name::from_raw(1));
    t.complete_struct(s, vec![(Name::from_raw(2), TypeId::VOID)]);
    assert!(t.is_zero_sized(s));
}

#[test]
fn enum_default_tag_is_smallest_unsigned() {
    let mut t = TypeTable::default();
    let e = t.declare_enum(DeclId::new(0), Name::from_raw(1));
    let variants = (0..5)
        .map(|i| (Name::from_raw(10 + i), BigInt::from(i)))
        .collect();
    let tag = t.complete_enum(e, None, variants);
    assert_eq!(t.int_info(tag), Some(IntInfo { signed: false, bits: 3 }));
    assert_eq!(t.enum_type(e).map(|en| en.fields.len()), Some(5));
}

#[test]
fn enum_with_negative_value_gets_signed_tag() {
    let mut t = TypeTable::default();
    let e = t.declare_enum(DeclId::new(0), Name::from_raw(1));
    let tag = t.complete_enum(
        e,
        None,
        vec![
            (Name::from_raw(2), BigInt::from(-1)),
            (Name::from_raw(3), BigInt::from(1)),
        ],
    );
    assert_eq!(t.int_info(tag), Some(IntInfo { signed: true, bits: 2 }));
}

#[test]
fn enum_explicit_tag_type_is_kept() {
    let mut t = TypeTable::default();
    let e = t.declare_enum(DeclId::new(0), Name::from_raw(1));
    let tag = t.complete_enum(e, Some(TypeId::U8), vec![(Name::from_raw(2), BigInt::from(0))]);
    assert_eq!(tag, TypeId::U8);
}

#[test]
fn aliases_canonicalize_children() {
    let mut t = TypeTable::default();
    let alias = t.declare_type_alias(DeclId::new(0), Name::from_raw(1), TypeId::U8);
    assert_ne!(alias, TypeId::U8);
    assert_eq!(t.canonical(alias), TypeId::U8);
    assert_eq!(t.get_pointer(alias, false), t.get_pointer(TypeId::U8, false));
    assert!(t.is_int(alias));
}

#[test]
fn generic_fn_placeholder_is_memoized() {
    let mut t = TypeTable::default();
    let g = t.get_generic_fn(DeclId::new(3), Name::from_raw(1));
    assert_eq!(t.get_generic_fn(DeclId::new(3), Name::from_raw(1)), g);
    assert!(t.is_comptime_only(g));
}

// ── Queries ──

#[test]
fn pointer_sized_ints_follow_target() {
    let t = TypeTable::new(32);
    assert_eq!(t.int_info(TypeId::USIZE), Some(IntInfo { signed: false, bits: 32 }));
    assert_eq!(
        t.num_kind(TypeId::ISIZE),
        NumKind::Int {
            signed: true,
            bits: 32
        }
    );
    assert_eq!(
        t.int_range(TypeId::ISIZE),
        Some((BigInt::from(i32::MIN), BigInt::from(i32::MAX)))
    );
}

#[test]
fn bool_range_is_zero_to_one() {
    let t = TypeTable::default();
    assert_eq!(t.int_range(TypeId::BOOL), Some((BigInt::from(0), BigInt::from(1))));
    assert_eq!(t.int_range(TypeId::F32), None);
}

#[test]
fn zero_value_is_lazy_for_aggregates() {
    let mut t = TypeTable::default();
    assert_eq!(t.zero_value(TypeId::U16), ConstValue::int(TypeId::U16, 0));
    let arr = t.get_array(TypeId::U8, 1024);
    assert_eq!(t.zero_value(arr).status(), ConstStatus::Zeroes);
    let opt = t.get_optional(TypeId::U8);
    assert_eq!(t.zero_value(opt), ConstValue::optional(opt, None));
}

#[test]
fn enum_without_zero_variant_is_found_through_aggregates() {
    let mut t = TypeTable::default();
    let e = t.declare_enum(DeclId::new(0), Name::from_raw(1));
    t.complete_enum(
        e,
        None,
        vec![
            (Name::from_raw(2), BigInt::from(5)),
            (Name::from_raw(3), BigInt::from(6)),
        ],
    );
    let s = t.declare_struct(DeclId::new(1), Name::from_raw(4));
    t.complete_struct(s, vec![(Name::from_raw(5), TypeId::U8), (Name::from_raw(6), e)]);
    let arr = t.get_array(s, 3);
    let empty = t.get_array(e, 0);
    let opt = t.get_optional(e);

    assert_eq!(t.enum_without_zero(e), Some(e));
    assert_eq!(t.enum_without_zero(s), Some(e));
    assert_eq!(t.enum_without_zero(arr), Some(e));
    assert_eq!(t.enum_without_zero(empty), None);
    assert_eq!(t.enum_without_zero(opt), None);
    assert_eq!(t.enum_without_zero(TypeId::U32), None);
}

#[test]
fn enum_with_zero_variant_has_a_zero_value() {
    let mut t = TypeTable::default();
    let e = t.declare_enum(DeclId::new(0), Name::from_raw(1));
    t.complete_enum(
        e,
        None,
        vec![
            (Name::from_raw(2), BigInt::from(3)),
            (Name::from_raw(3), BigInt::from(0)),
        ],
    );
    assert_eq!(t.enum_without_zero(e), None);
}

#[test]
fn self_referencing_struct_terminates() {
    let mut t = TypeTable::default();
    let s = t.declare_struct(DeclId::new(0), Name::from_raw(1));
    let arr = t.get_array(s, 2);
    t.complete_struct(s, vec![(Name::from_raw(2), arr)]);
    assert_eq!(t.enum_without_zero(s), None);
}

#[test]
fn backend_handles_round_trip() {
    let mut t = TypeTable::default();
    assert_eq!(t.backend_handle(TypeId::U8), None);
    t.set_backend_handle(TypeId::U8, BackendHandle(0xdead));
    assert_eq!(t.backend_handle(TypeId::U8), Some(BackendHandle(0xdead)));
}

// ── Display ──

#[test]
fn display_renders_source_syntax() {
    let interner = StringInterner::new();
    let mut t = TypeTable::default();
    let p = t.get_pointer(TypeId::U8, true);
    let a = t.get_array(TypeId::U8, 4);
    let o = t.get_optional(p);
    let e = t.get_error_union(TypeId::I32);
    let f = t.get_fn(FnSig::new(vec![TypeId::U32, TypeId::BOOL], TypeId::U8));
    let s = t.declare_struct(DeclId::new(0), interner.intern("Point"));
    let u7 = t.get_int(false, 7);

    assert_eq!(t.display(p, &interner), "*const u8");
    assert_eq!(t.display(a, &interner), "[4]u8");
    assert_eq!(t.display(o, &interner), "?*const u8");
    assert_eq!(t.display(e, &interner), "!i32");
    assert_eq!(t.display(f, &interner), "fn(u32, bool) u8");
    assert_eq!(t.display(s, &interner), "Point");
    assert_eq!(t.display(u7, &interner), "u7");
}
