use super::*;

/// Mimics the compiler: one guarded frame per nesting level.
fn nested_depth(levels: u32) -> u32 {
    ensure_sufficient_stack(|| if levels == 0 { 0 } else { nested_depth(levels - 1) + 1 })
}

#[test]
fn test_shallow_nesting() {
    assert_eq!(nested_depth(16), 16);
}

#[test]
fn test_deep_nesting_grows_stack() {
    assert_eq!(nested_depth(100_000), 100_000);
}

#[test]
fn test_passes_results_through() {
    let result: Result<u8, &str> = ensure_sufficient_stack(|| Err("not properly closed"));
    assert_eq!(result, Err("not properly closed"));
}
