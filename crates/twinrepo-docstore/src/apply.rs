//! Locator resolution and update application against a document.

use serde_json::Value;

use crate::expr::{ArrayFilter, Step, TargetPath, UpdateOp};

// ── Resolution ────────────────────────────────────────────────────────────

/// Every value the locator resolves to inside `doc`.
pub fn find_in<'a>(doc: &'a Value, target: &TargetPath) -> Vec<&'a Value> {
    let mut out = Vec::new();
    collect(doc, &target.steps, target, &mut out);
    out
}

fn collect<'a>(value: &'a Value, steps: &[Step], target: &TargetPath, out: &mut Vec<&'a Value>) {
    let Some((step, rest)) = steps.split_first() else {
        out.push(value);
        return;
    };
    match step {
        Step::Field(name) => {
            if let Some(inner) = value.get(name) {
                collect(inner, rest, target, out);
            }
        }
        Step::At(index) => {
            if let Some(inner) = value.get(index) {
                collect(inner, rest, target, out);
            }
        }
        Step::Filtered(placeholder) => {
            let Some(filter) = target.filter_for(placeholder) else {
                return;
            };
            if let Value::Array(items) = value {
                for item in items {
                    if matches_filter(item, filter) {
                        collect(item, rest, target, out);
                    }
                }
            }
        }
        Step::Guard { field, any_of } => {
            if guard_passes(value, field, any_of) {
                collect(value, rest, target, out);
            }
        }
    }
}

// ── Application ───────────────────────────────────────────────────────────

/// Applies `op` at every target the locator resolves to; returns how many
/// targets were written.
pub fn update_in(doc: &mut Value, target: &TargetPath, op: &UpdateOp) -> usize {
    apply(doc, &target.steps, target, op)
}

fn apply(value: &mut Value, steps: &[Step], target: &TargetPath, op: &UpdateOp) -> usize {
    let Some((step, rest)) = steps.split_first() else {
        return apply_op(value, op);
    };
    match step {
        Step::Field(name) => value
            .get_mut(name)
            .map_or(0, |inner| apply(inner, rest, target, op)),
        Step::At(index) => value
            .get_mut(*index)
            .map_or(0, |inner| apply(inner, rest, target, op)),
        Step::Filtered(placeholder) => {
            let Some(filter) = target.filter_for(placeholder) else {
                return 0;
            };
            match value {
                Value::Array(items) => items
                    .iter_mut()
                    .filter(|item| matches_filter(item, filter))
                    .map(|item| apply(item, rest, target, op))
                    .sum(),
                _ => 0,
            }
        }
        Step::Guard { field, any_of } => {
            if guard_passes(value, field, any_of) {
                apply(value, rest, target, op)
            } else {
                0
            }
        }
    }
}

fn apply_op(value: &mut Value, op: &UpdateOp) -> usize {
    match op {
        UpdateOp::Set(new_value) => {
            *value = new_value.clone();
            1
        }
        UpdateOp::Push(item) => match value {
            Value::Array(items) => {
                items.push(item.clone());
                1
            }
            _ => 0,
        },
        UpdateOp::Pull { field, equals } => match value {
            Value::Array(items) => {
                let before = items.len();
                items.retain(|item| item.get(field.as_str()) != Some(equals));
                before - items.len()
            }
            _ => 0,
        },
        UpdateOp::RemoveAt(index) => match value {
            Value::Array(items) => {
                if *index < items.len() {
                    items.remove(*index);
                    1
                } else {
                    0
                }
            }
            _ => 0,
        },
    }
}

fn matches_filter(item: &Value, filter: &ArrayFilter) -> bool {
    item.get(filter.field.as_str()) == Some(&filter.equals)
}

fn guard_passes(value: &Value, field: &str, any_of: &[Value]) -> bool {
    value.get(field).is_some_and(|v| any_of.contains(v))
}
