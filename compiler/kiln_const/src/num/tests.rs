use num_bigint::BigInt;
use pretty_assertions::assert_eq;

use super::*;

fn big(v: i64) -> BigInt {
    BigInt::from(v)
}

#[test]
fn ranges_of_common_widths() {
    assert_eq!(int_range(false, 8), (big(0), big(255)));
    assert_eq!(int_range(true, 8), (big(-128), big(127)));
    assert_eq!(int_range(true, 1), (big(-1), big(0)));
    assert_eq!(int_range(false, 0), (big(0), big(0)));
}

#[test]
fn wrap_unsigned() {
    assert_eq!(wrap_int(&big(256), false, 8), big(0));
    assert_eq!(wrap_int(&big(-1), false, 8), big(255));
    assert_eq!(wrap_int(&big(300), false, 8), big(44));
}

#[test]
fn wrap_signed() {
    assert_eq!(wrap_int(&big(128), true, 8), big(-128));
    assert_eq!(wrap_int(&big(-129), true, 8), big(127));
    assert_eq!(wrap_int(&big(-5), true, 8), big(-5));
}

#[test]
fn fits_checks_range_without_wrapping() {
    let u8k = NumKind::Int {
        signed: false,
        bits: 8,
    };
    assert!(fits(&big(255), u8k));
    assert!(!fits(&big(256), u8k));
    assert!(!fits(&big(-1), u8k));
    assert!(fits(&big(1_000_000), NumKind::ComptimeInt));
    assert!(!fits(&big(0), NumKind::Bool));
}
