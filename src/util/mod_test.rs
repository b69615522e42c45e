// Tests for the util module's public API

use super::*;

#[test]
fn test_run_async_exported() {
    let result = run_async(async { 42 }).unwrap();
    assert_eq!(result, 42);
}

#[test]
fn test_text_helpers_exported() {
    assert_eq!(text::char_len("héllo"), 5);
}
