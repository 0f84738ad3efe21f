// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Renders one `log` output line per cache record, either as a
//! comma-separated field list or through a `$name`/`${name}` template.

use rflow_core::{trace_fields, TraceValue};

fn value_to_string(value: Option<&TraceValue>) -> String {
    match value {
        None => String::new(),
        Some(TraceValue::Text(s)) => s.clone(),
        Some(TraceValue::Integer(n)) => n.to_string(),
        Some(TraceValue::Float(f)) => f.to_string(),
        Some(TraceValue::Path(p)) => p.display().to_string(),
    }
}

/// `log`'s default field when neither `-fields` nor `-template` is given.
pub const DEFAULT_FIELD: &str = trace_fields::FOLDER;

pub fn render_fields(record: &rflow_core::TraceRecord, fields: &[&str], sep: &str) -> String {
    fields
        .iter()
        .map(|name| value_to_string(record.get(name)))
        .collect::<Vec<_>>()
        .join(sep)
}

/// Substitute every `$name` or `${name}` occurrence with the record's field
/// value, leaving unresolved names blank.
pub fn render_template(record: &rflow_core::TraceRecord, template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let chars: Vec<char> = template.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '$' && i + 1 < chars.len() {
            if chars[i + 1] == '{' {
                if let Some(end) = chars[i + 2..].iter().position(|&c| c == '}') {
                    let name: String = chars[i + 2..i + 2 + end].iter().collect();
                    out.push_str(&value_to_string(record.get(&name)));
                    i += 2 + end + 1;
                    continue;
                }
            } else if chars[i + 1].is_alphanumeric() || chars[i + 1] == '_' || chars[i + 1] == '%' {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_' || chars[end] == '%') {
                    end += 1;
                }
                let name: String = chars[start..end].iter().collect();
                out.push_str(&value_to_string(record.get(&name)));
                i = end;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
