use super::*;

#[test]
fn primitive_indices_are_dense() {
    let all = [
        TypeId::VOID,
        TypeId::BOOL,
        TypeId::NORETURN,
        TypeId::TYPE,
        TypeId::INVALID,
        TypeId::COMPTIME_INT,
        TypeId::COMPTIME_FLOAT,
        TypeId::UNDEFINED,
        TypeId::U8,
        TypeId::I8,
        TypeId::U16,
        TypeId::I16,
        TypeId::U32,
        TypeId::I32,
        TypeId::U64,
        TypeId::I64,
        TypeId::USIZE,
        TypeId::ISIZE,
        TypeId::F32,
        TypeId::F64,
    ];
    for (i, ty) in all.iter().enumerate() {
        assert_eq!(ty.raw() as usize, i);
        assert!(ty.is_primitive());
        assert!(ty.primitive_name().is_some());
    }
    assert_eq!(all.len() as u32, TypeId::PRIMITIVE_COUNT);
}

#[test]
fn dynamic_ids_have_no_primitive_name() {
    let ty = TypeId::from_raw(TypeId::FIRST_DYNAMIC);
    assert!(!ty.is_primitive());
    assert_eq!(ty.primitive_name(), None);
}

#[test]
fn invalid_marker() {
    assert!(TypeId::INVALID.is_invalid());
    assert!(!TypeId::U8.is_invalid());
}

#[test]
fn debug_uses_primitive_names() {
    assert_eq!(format!("{:?}", TypeId::U32), "TypeId(u32)");
    assert_eq!(format!("{:?}", TypeId::from_raw(40)), "TypeId(40)");
}
