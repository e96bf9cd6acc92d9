use std::cmp::Ordering;

use serde_json::Value;

use crate::error::LogicError;
use crate::model::rule::{Condition, Operator};
use crate::responses::{Responses, is_blank};

/// Evaluates a single condition against the current responses.
///
/// Absent keys and JSON `null` are both treated as "no answer", so conditions that point at
/// components the survey does not define behave as unanswered.
pub fn evaluate(condition: &Condition, responses: &Responses) -> Result<bool, LogicError> {
    let answer = responses
        .get(&condition.component)
        .filter(|value| !value.is_null());
    let operand = &condition.value;

    let outcome = match &condition.operator {
        Operator::Equals => equals(answer, operand),
        Operator::NotEquals => !equals(answer, operand),
        Operator::In => member_of(answer, operand),
        Operator::NotIn => !member_of(answer, operand),
        Operator::GreaterThan => compare(answer, operand) == Some(Ordering::Greater),
        Operator::LessThan => compare(answer, operand) == Some(Ordering::Less),
        Operator::IsAnswered => answer.is_some_and(|value| !is_blank(value)),
        Operator::IsEmpty => answer.is_none_or(is_blank),
        Operator::Contains => contains(answer, operand),
        Operator::Unsupported(name) => {
            return Err(LogicError::UnsupportedOperator {
                component: condition.component.clone(),
                operator: name.clone(),
            });
        }
    };
    Ok(outcome)
}

fn equals(answer: Option<&Value>, operand: &Value) -> bool {
    match answer {
        Some(value) => values_equal(value, operand),
        None => operand.is_null(),
    }
}

fn member_of(answer: Option<&Value>, operand: &Value) -> bool {
    let Some(answer) = answer else {
        return false;
    };
    let candidates: &[Value] = match operand {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    };
    match answer {
        Value::Array(selected) => selected
            .iter()
            .any(|item| candidates.iter().any(|candidate| values_equal(item, candidate))),
        scalar => candidates
            .iter()
            .any(|candidate| values_equal(scalar, candidate)),
    }
}

fn compare(answer: Option<&Value>, operand: &Value) -> Option<Ordering> {
    let left = as_number(answer?)?;
    let right = as_number(operand)?;
    left.partial_cmp(&right)
}

/// Substring match for scalar answers, membership for lists.
///
/// Numbers and booleans are matched on their text form, so `42` contains `"4"`.
fn contains(answer: Option<&Value>, operand: &Value) -> bool {
    let haystack = match answer {
        Some(Value::Array(items)) => return items.iter().any(|item| values_equal(item, operand)),
        Some(Value::String(text)) => text.clone(),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => scalar.to_string(),
        _ => return false,
    };
    let needle = match operand {
        Value::String(needle) => needle.clone(),
        Value::Null => return false,
        other => other.to_string(),
    };
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// JSON equality, except numbers compare by value so `1` matches `1.0`.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => left == right,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
