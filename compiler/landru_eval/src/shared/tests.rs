use super::*;

fn key(n: u32) -> SharedKey {
    (ExemplarId::new(1), Name::from_raw(n))
}

#[test]
fn test_first_reference_creates() {
    let mut cells = SharedCells::new();
    assert!(!cells.retain(key(1)));
    cells.create(key(1), Value::Float(3.0));
    assert_eq!(cells.refcount(key(1)), 1);
    assert!(cells.retain(key(1)));
    assert_eq!(cells.refcount(key(1)), 2);
}

#[test]
fn test_last_release_frees() {
    let mut cells = SharedCells::new();
    cells.create(key(1), Value::Int(0));
    cells.retain(key(1));
    assert!(!cells.release(key(1)));
    assert!(cells.contains(key(1)));
    assert!(cells.release(key(1)));
    assert!(!cells.contains(key(1)));
    assert!(!cells.release(key(1)));
}

#[test]
fn test_set_only_touches_live_cells() {
    let mut cells = SharedCells::new();
    assert!(!cells.set(key(2), Value::Int(5)));
    cells.create(key(2), Value::Int(1));
    assert!(cells.set(key(2), Value::Int(5)));
    assert_eq!(cells.get(key(2)), Some(&Value::Int(5)));
    assert!(!cells.contains(key(1)));
}
