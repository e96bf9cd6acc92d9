use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LogicError;
use crate::model::component::{Component, Constraint, QuestionKind};
use crate::model::page::Page;
use crate::responses::{Responses, is_blank};
use crate::visibility::visible_components;

/// A single answer that does not satisfy its component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    pub component_id: String,
    pub message: String,
    pub code: String,
}

/// Outcome of the gating check for one page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct PageValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_required: Vec<String>,
}

/// Validates the visible components of `page`. Hidden components are never checked.
pub fn validate_page(page: &Page, responses: &Responses) -> Result<PageValidation, LogicError> {
    let mut errors = Vec::new();
    let mut missing_required = Vec::new();

    for component in visible_components(page, responses)? {
        match responses.get(&component.id).filter(|value| !is_blank(value)) {
            None => {
                if component.required {
                    missing_required.push(component.id.clone());
                }
            }
            Some(value) => {
                if let Some(error) = validate_value(component, value) {
                    errors.push(error);
                }
            }
        }
    }

    Ok(PageValidation {
        valid: errors.is_empty() && missing_required.is_empty(),
        errors,
        missing_required,
    })
}

/// Checks a non-empty answer against the component's kind, options and constraint.
pub fn validate_value(component: &Component, value: &Value) -> Option<ValidationError> {
    if !matches_kind(component.kind, value) {
        return Some(base_error(component, "answer does not match question kind", "type_mismatch"));
    }

    if let Some(error) = check_options(component, value) {
        return Some(error);
    }

    if let Some(constraint) = &component.constraint
        && let Some(error) = enforce_constraint(component, value, constraint)
    {
        return Some(error);
    }

    None
}

fn matches_kind(kind: QuestionKind, value: &Value) -> bool {
    match kind {
        QuestionKind::ShortText | QuestionKind::LongText | QuestionKind::SingleChoice => {
            value.is_string()
        }
        QuestionKind::MultiChoice => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
        QuestionKind::Rating => value.is_number(),
        QuestionKind::YesNo => match value {
            Value::Bool(_) => true,
            Value::String(text) => matches!(text.as_str(), "yes" | "no"),
            _ => false,
        },
    }
}

fn check_options(component: &Component, value: &Value) -> Option<ValidationError> {
    if component.options.is_empty() {
        return None;
    }
    let allowed = |text: &str| component.options.iter().any(|option| option == text);
    let valid = match (component.kind, value) {
        (QuestionKind::SingleChoice, Value::String(text)) => allowed(text),
        (QuestionKind::MultiChoice, Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .all(allowed),
        _ => true,
    };
    if valid {
        None
    } else {
        Some(base_error(component, "invalid option selected", "invalid_option"))
    }
}

fn enforce_constraint(
    component: &Component,
    value: &Value,
    constraint: &Constraint,
) -> Option<ValidationError> {
    if let Some(pattern) = &constraint.pattern
        && let Some(text) = value.as_str()
        && let Ok(regex) = Regex::new(pattern)
        && !regex.is_match(text)
    {
        return Some(base_error(component, "value does not match pattern", "pattern_mismatch"));
    }

    if let Some(text) = value.as_str() {
        let length = text.chars().count();
        if let Some(min_length) = constraint.min_length
            && length < min_length
        {
            return Some(base_error(
                component,
                &format!("please enter at least {min_length} characters"),
                "min_length",
            ));
        }
        if let Some(max_length) = constraint.max_length
            && length > max_length
        {
            return Some(base_error(
                component,
                &format!("please enter no more than {max_length} characters"),
                "max_length",
            ));
        }
    }

    if let Some(number) = value.as_f64() {
        if let Some(min) = constraint.min
            && number < min
        {
            return Some(base_error(component, &format!("value must be at least {min}"), "min"));
        }
        if let Some(max) = constraint.max
            && number > max
        {
            return Some(base_error(
                component,
                &format!("value must be no more than {max}"),
                "max",
            ));
        }
    }

    if let Some(items) = value.as_array() {
        if let Some(min_selections) = constraint.min_selections
            && items.len() < min_selections
        {
            return Some(base_error(
                component,
                &format!("select at least {min_selections} option(s)"),
                "min_selections",
            ));
        }
        if let Some(max_selections) = constraint.max_selections
            && items.len() > max_selections
        {
            return Some(base_error(
                component,
                &format!("select no more than {max_selections} option(s)"),
                "max_selections",
            ));
        }
    }

    None
}

fn base_error(component: &Component, message: &str, code: &str) -> ValidationError {
    ValidationError {
        component_id: component.id.clone(),
        message: message.into(),
        code: code.into(),
    }
}
