// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rflow_core::InputDef;
use std::io::Write;
use tempfile::tempdir;

fn scalar_input(name: &str, text: &str) -> (InputDef, ContextValue) {
    (InputDef::value(name), ContextValue::text(text))
}

fn inputs_of<'a>(defs_and_values: &'a [(InputDef, ContextValue)]) -> Vec<DeclaredInput<'a>> {
    defs_and_values
        .iter()
        .map(|(def, value)| DeclaredInput { def, value })
        .collect()
}

#[test]
fn identical_bindings_produce_identical_fingerprints() {
    let declared = [scalar_input("sample", "a")];
    let inputs = FingerprintInputs {
        session_unique_id: "sess-1",
        processor_name: "align",
        source_text: "echo hi",
        declared_inputs: &inputs_of(&declared),
        free_variables: &[],
        hash_mode: HashMode::Standard,
    };
    let a = compute_fingerprint(&inputs).unwrap();
    let b = compute_fingerprint(&inputs).unwrap();
    assert_eq!(a, b);
}

#[test]
fn changing_a_declared_input_value_changes_the_fingerprint() {
    let declared_a = [scalar_input("sample", "a")];
    let declared_b = [scalar_input("sample", "b")];
    let base = FingerprintInputs {
        session_unique_id: "sess-1",
        processor_name: "align",
        source_text: "echo hi",
        declared_inputs: &inputs_of(&declared_a),
        free_variables: &[],
        hash_mode: HashMode::Standard,
    };
    let changed = FingerprintInputs {
        declared_inputs: &inputs_of(&declared_b),
        ..base_with(&base)
    };
    let fp_a = compute_fingerprint(&base).unwrap();
    let fp_b = compute_fingerprint(&changed).unwrap();
    assert_ne!(fp_a, fp_b);
}

fn base_with<'a>(inputs: &FingerprintInputs<'a>) -> FingerprintInputs<'a> {
    FingerprintInputs {
        session_unique_id: inputs.session_unique_id,
        processor_name: inputs.processor_name,
        source_text: inputs.source_text,
        declared_inputs: inputs.declared_inputs,
        free_variables: inputs.free_variables,
        hash_mode: inputs.hash_mode,
    }
}

#[test]
fn changing_session_id_or_processor_name_or_source_changes_the_fingerprint() {
    let declared = [scalar_input("sample", "a")];
    let values = inputs_of(&declared);
    let base = FingerprintInputs {
        session_unique_id: "sess-1",
        processor_name: "align",
        source_text: "echo hi",
        declared_inputs: &values,
        free_variables: &[],
        hash_mode: HashMode::Standard,
    };
    let base_fp = compute_fingerprint(&base).unwrap();

    let diff_session = FingerprintInputs { session_unique_id: "sess-2", ..base_with(&base) };
    assert_ne!(compute_fingerprint(&diff_session).unwrap(), base_fp);

    let diff_name = FingerprintInputs { processor_name: "trim", ..base_with(&base) };
    assert_ne!(compute_fingerprint(&diff_name).unwrap(), base_fp);

    let diff_source = FingerprintInputs { source_text: "echo bye", ..base_with(&base) };
    assert_ne!(compute_fingerprint(&diff_source).unwrap(), base_fp);
}

#[test]
fn file_input_order_does_not_affect_the_fingerprint() {
    let dir = tempdir().unwrap();
    let a_path = dir.path().join("a.txt");
    let b_path = dir.path().join("b.txt");
    std::fs::File::create(&a_path).unwrap().write_all(b"aaa").unwrap();
    std::fs::File::create(&b_path).unwrap().write_all(b"bbb").unwrap();

    let def = InputDef::file("reads");
    let forward = ContextValue::Paths(vec![a_path.clone(), b_path.clone()]);
    let reversed = ContextValue::Paths(vec![b_path, a_path]);

    let declared_forward = [DeclaredInput { def: &def, value: &forward }];
    let declared_reversed = [DeclaredInput { def: &def, value: &reversed }];

    let forward_inputs = FingerprintInputs {
        session_unique_id: "sess-1",
        processor_name: "align",
        source_text: "echo hi",
        declared_inputs: &declared_forward,
        free_variables: &[],
        hash_mode: HashMode::Deep,
    };
    let reversed_inputs = FingerprintInputs {
        declared_inputs: &declared_reversed,
        ..base_with(&forward_inputs)
    };

    assert_eq!(
        compute_fingerprint(&forward_inputs).unwrap(),
        compute_fingerprint(&reversed_inputs).unwrap()
    );
}

#[test]
fn rehash_is_deterministic_and_varies_by_try_count() {
    let fp = Fingerprint::from_bytes([7u8; 16]);
    let r1 = rehash(fp, 1);
    let r1_again = rehash(fp, 1);
    let r2 = rehash(fp, 2);
    assert_eq!(r1, r1_again);
    assert_ne!(r1, r2);
    assert_ne!(r1, fp);
}
