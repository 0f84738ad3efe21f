// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The forwarding operator: expands one raw input tuple into the tuples
//! implied by its `each` positions, by computing the Cartesian product of
//! the iterable values bound at those positions. A fixed arithmetic
//! combinator standing in for the runtime code generation the original
//! forwarding closure relied on.

use rflow_core::ContextValue;

/// Expand `values` (one value per formal input, in declaration order)
/// against the positions declared `each`. Positions not in
/// `each_positions` are held fixed; positions in it contribute every
/// element of their iterable value to the product.
pub fn expand_each(values: &[ContextValue], each_positions: &[usize]) -> Vec<Vec<ContextValue>> {
    if each_positions.is_empty() {
        return vec![values.to_vec()];
    }

    let mut combinations: Vec<Vec<ContextValue>> = vec![Vec::new()];
    for (i, value) in values.iter().enumerate() {
        let options = if each_positions.contains(&i) {
            iterable_items(value)
        } else {
            vec![value.clone()]
        };
        let mut next = Vec::with_capacity(combinations.len() * options.len());
        for combo in &combinations {
            for opt in &options {
                let mut extended = combo.clone();
                extended.push(opt.clone());
                next.push(extended);
            }
        }
        combinations = next;
    }
    combinations
}

fn iterable_items(value: &ContextValue) -> Vec<ContextValue> {
    match value {
        ContextValue::List(items) => items.clone(),
        ContextValue::Paths(paths) => paths.iter().cloned().map(ContextValue::Path).collect(),
        other => vec![other.clone()],
    }
}

#[cfg(test)]
#[path = "forwarding_tests.rs"]
mod tests;
