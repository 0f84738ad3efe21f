// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

struct MapContext(std::collections::HashMap<&'static str, FieldValue>);

impl FilterContext for MapContext {
    fn field(&self, name: &str) -> FieldValue {
        self.0.get(name).cloned().unwrap_or(FieldValue::Missing)
    }
}

#[test]
fn exit_equals_zero_matches_only_successful_records() {
    let expr = compile("exit == 0").unwrap();
    let ok = MapContext(std::collections::HashMap::from([("exit", FieldValue::Number(0.0))]));
    let failed = MapContext(std::collections::HashMap::from([("exit", FieldValue::Number(1.0))]));
    assert!(eval(&expr, &ok));
    assert!(!eval(&expr, &failed));
}

#[test]
fn and_or_and_not_compose() {
    let expr = compile("exit == 0 && process == 'align' || !(exit == 2)").unwrap();
    let matching = MapContext(std::collections::HashMap::from([
        ("exit", FieldValue::Number(0.0)),
        ("process", FieldValue::Text("align".to_string())),
    ]));
    assert!(eval(&expr, &matching));
}

#[test]
fn missing_field_is_not_equal_to_anything() {
    let expr = compile("process != 'align'").unwrap();
    let ctx = MapContext(std::collections::HashMap::new());
    assert!(eval(&expr, &ctx));
}

#[test]
fn text_field_can_be_compared_against_a_bare_word() {
    let expr = compile("process == align").unwrap();
    let ctx = MapContext(std::collections::HashMap::from([("process", FieldValue::Text("align".to_string()))]));
    assert!(eval(&expr, &ctx));
}

#[test]
fn trailing_garbage_is_a_parse_error() {
    assert!(compile("exit == 0 extra").is_err());
}

#[test]
fn unknown_operator_character_is_a_parse_error() {
    assert!(compile("exit ~ 0").is_err());
}
