#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use kiln_ir::TypeId;
use num_bigint::BigInt;
use pretty_assertions::assert_eq;

use super::*;

const ARR4: TypeId = TypeId::from_raw(40);
const PTR: TypeId = TypeId::from_raw(41);

#[test]
fn c_string_appends_nul() {
    let mut arena = ConstArena::new();
    let p = arena.c_string(b"abc", ARR4, PTR);
    let ptr = p.as_ptr().unwrap();
    assert!(ptr.is_c_str);
    let elems = arena.pointee_elems(ptr).unwrap();
    assert_eq!(elems.len(), 4);
    assert_eq!(elems[3].as_int(), Some(BigInt::from(0)));
    assert_eq!(arena.c_str_bytes(ptr).unwrap(), b"abc".to_vec());
}

#[test]
fn load_is_bounds_checked() {
    let mut arena = ConstArena::new();
    let p = arena.c_string(b"hi", ARR4, PTR).as_ptr().unwrap();
    assert_eq!(arena.load(p, 1).unwrap().as_int(), Some(BigInt::from(b'i')));
    assert_eq!(
        arena.load(p, 3),
        Err(ConstError::IndexOutOfBounds { index: 3, len: 3 })
    );
}

#[test]
fn offset_pointer_sees_tail() {
    let mut arena = ConstArena::new();
    let base = arena.c_string(b"xyz", ARR4, PTR).as_ptr().unwrap();
    let tail = ConstPtr { index: 1, ..base };
    assert_eq!(arena.c_str_bytes(tail).unwrap(), b"yz".to_vec());
}

#[test]
fn get_mut_updates_in_place() {
    let mut arena = ConstArena::new();
    let id = arena.alloc(ConstValue::undef(TypeId::U8));
    *arena.get_mut(id) = ConstValue::int(TypeId::U8, 9);
    assert_eq!(arena.get(id).as_int(), Some(BigInt::from(9)));
    assert_eq!(arena.len(), 1);
}
