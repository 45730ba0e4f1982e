use super::*;

#[test]
fn display_matches_as_str() {
    assert_eq!(ErrorCode::E2001.to_string(), "E2001");
    assert_eq!(ErrorCode::E3002.to_string(), "E3002");
    assert_eq!(ErrorCode::E9001.to_string(), "E9001");
}

#[test]
fn phase_predicates() {
    assert!(ErrorCode::E2006.is_type_error());
    assert!(!ErrorCode::E2006.is_switch_error());
    assert!(ErrorCode::E3001.is_switch_error());
    assert!(ErrorCode::E4001.is_comptime_error());
    assert!(ErrorCode::E4006.is_comptime_error());
    assert!(ErrorCode::E9001.is_internal_error());
}

#[test]
fn only_unreachable_code_is_a_warning() {
    assert!(ErrorCode::E3006.is_warning());
    assert!(!ErrorCode::E3005.is_warning());
}
