use super::*;

#[test]
fn test_name_empty() {
    assert_eq!(Name::EMPTY.raw(), 0);
    assert_eq!(Name::default(), Name::EMPTY);
}

#[test]
fn test_name_hash() {
    use std::collections::HashSet;
    let mut set = HashSet::new();
    set.insert(Name::from_raw(1));
    set.insert(Name::from_raw(1)); // duplicate
    set.insert(Name::from_raw(2));
    assert_eq!(set.len(), 2);
}

#[test]
fn test_name_ord() {
    assert!(Name::from_raw(1) < Name::from_raw(2));
}
