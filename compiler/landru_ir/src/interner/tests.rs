use super::*;

#[test]
fn test_intern_is_idempotent() {
    let mut interner = StringInterner::new();
    let a = interner.intern("machine");
    let b = interner.intern("machine");
    assert_eq!(a, b);
    assert_eq!(interner.lookup(a), "machine");
}

#[test]
fn test_empty_is_preinterned() {
    let mut interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
    assert_eq!(interner.len(), 1);
}

#[test]
fn test_get_does_not_intern() {
    let mut interner = StringInterner::new();
    assert_eq!(interner.get("state"), None);
    let state = interner.intern("state");
    assert_eq!(interner.get("state"), Some(state));
}

#[test]
fn test_foreign_name_resolves_empty() {
    let interner = StringInterner::new();
    assert_eq!(interner.lookup(Name::from_raw(99)), "");
}
