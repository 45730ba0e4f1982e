use num_bigint::BigInt;
use pretty_assertions::assert_eq;

use super::*;

#[test]
fn status_reports_each_marker() {
    assert_eq!(ConstValue::runtime(TypeId::U8).status(), ConstStatus::Runtime);
    assert_eq!(ConstValue::undef(TypeId::U8).status(), ConstStatus::Undef);
    assert_eq!(ConstValue::zeroes(TypeId::U8).status(), ConstStatus::Zeroes);
    assert_eq!(ConstValue::int(TypeId::U8, 3).status(), ConstStatus::Static);
}

#[test]
fn zeroes_reads_as_zero_scalar() {
    assert_eq!(ConstValue::zeroes(TypeId::I32).as_int(), Some(BigInt::from(0)));
    assert_eq!(ConstValue::zeroes(TypeId::BOOL).as_bool(), Some(false));
    assert_eq!(ConstValue::undef(TypeId::I32).as_int(), None);
}

#[test]
fn enum_tag_reads_as_int() {
    let v = ConstValue::enum_value(TypeId::from_raw(40), 2);
    assert_eq!(v.as_int(), Some(BigInt::from(2)));
}

#[test]
fn display_formats_values() {
    let s = ConstValue::struct_value(
        TypeId::from_raw(40),
        vec![ConstValue::int(TypeId::U8, 1), ConstValue::bool(true)],
    );
    assert_eq!(s.to_string(), ".{1, true}");
    assert_eq!(ConstValue::undef(TypeId::U8).to_string(), "undefined");
    assert_eq!(
        ConstValue::optional(TypeId::from_raw(41), None).to_string(),
        "null"
    );
}

#[test]
fn comptime_excludes_only_runtime() {
    assert!(ConstValue::undef(TypeId::U8).is_comptime());
    assert!(ConstValue::zeroes(TypeId::U8).is_comptime());
    assert!(!ConstValue::runtime(TypeId::U8).is_comptime());
}

#[test]
fn array_payload_records_its_length() {
    let elems = vec![ConstValue::int(TypeId::U8, 1), ConstValue::int(TypeId::U8, 2)];
    let value = ConstValue::array(TypeId::from_raw(40), elems.clone());
    let Some(ConstPayload::Array(arr)) = value.payload() else {
        panic!("expected an array payload");
    };
    assert_eq!(arr.len(), 2);
    assert!(!arr.is_empty());
    assert_eq!(arr.elems(), elems.as_slice());
    assert!(ConstArray::default().is_empty());
}
