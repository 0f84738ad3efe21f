// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn file_paths_collects_single_path() {
    let v = ContextValue::path("/tmp/a.txt");
    assert_eq!(v.file_paths(), vec![Path::new("/tmp/a.txt")]);
}

#[test]
fn file_paths_collects_paths_bag() {
    let v = ContextValue::Paths(vec![PathBuf::from("a"), PathBuf::from("b")]);
    assert_eq!(v.file_paths(), vec![Path::new("a"), Path::new("b")]);
}

#[test]
fn file_paths_recurses_into_lists() {
    let v = ContextValue::List(vec![
        ContextValue::path("a"),
        ContextValue::List(vec![ContextValue::path("b")]),
        ContextValue::text("not a path"),
    ]);
    assert_eq!(v.file_paths(), vec![Path::new("a"), Path::new("b")]);
}

#[test]
fn flatten_leaves_recursively_flattens_nested_lists() {
    let v = ContextValue::List(vec![
        ContextValue::Integer(1),
        ContextValue::List(vec![ContextValue::Integer(2), ContextValue::Integer(3)]),
    ]);
    assert_eq!(
        v.flatten_leaves(),
        vec![
            ContextValue::Integer(1),
            ContextValue::Integer(2),
            ContextValue::Integer(3)
        ]
    );
}

#[test]
fn flatten_leaves_on_scalar_returns_itself() {
    let v = ContextValue::text("x");
    assert_eq!(v.flatten_leaves(), vec![ContextValue::text("x")]);
}

#[test]
fn canonical_text_renders_scalars() {
    assert_eq!(ContextValue::text("hi").canonical_text(), "hi");
    assert_eq!(ContextValue::Integer(42).canonical_text(), "42");
    assert_eq!(ContextValue::Boolean(true).canonical_text(), "true");
}

#[test]
fn canonical_text_sorts_paths_bag_for_order_invariance() {
    let a = ContextValue::Paths(vec![PathBuf::from("b"), PathBuf::from("a")]);
    let b = ContextValue::Paths(vec![PathBuf::from("a"), PathBuf::from("b")]);
    assert_eq!(a.canonical_text(), b.canonical_text());
}

#[test]
fn serde_roundtrip_preserves_value() {
    let v = ContextValue::List(vec![ContextValue::Integer(1), ContextValue::path("x")]);
    let json = serde_json::to_string(&v).unwrap();
    let back: ContextValue = serde_json::from_str(&json).unwrap();
    assert_eq!(v, back);
}
