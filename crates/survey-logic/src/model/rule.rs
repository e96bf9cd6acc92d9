use std::borrow::Cow;
use std::fmt;

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the conditions of a rule are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

/// Comparison applied by a single condition.
///
/// Operators outside the supported set are kept as [`Operator::Unsupported`] so
/// a malformed rule still loads and is reported when it is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    GreaterThan,
    LessThan,
    IsAnswered,
    IsEmpty,
    Contains,
    Unsupported(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::IsAnswered => "is_answered",
            Operator::IsEmpty => "is_empty",
            Operator::Contains => "contains",
            Operator::Unsupported(name) => name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Operator::Unsupported(_))
    }
}

impl From<String> for Operator {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "equals" => Operator::Equals,
            "not_equals" => Operator::NotEquals,
            "in" => Operator::In,
            "not_in" => Operator::NotIn,
            "greater_than" => Operator::GreaterThan,
            "less_than" => Operator::LessThan,
            "is_answered" => Operator::IsAnswered,
            "is_empty" => Operator::IsEmpty,
            "contains" => Operator::Contains,
            _ => Operator::Unsupported(raw),
        }
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        operator.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JsonSchema for Operator {
    fn schema_name() -> Cow<'static, str> {
        "Operator".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        <String as JsonSchema>::json_schema(generator)
    }
}

/// Single predicate over one component's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Condition {
    pub component: String,
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
}

impl Condition {
    pub fn new(component: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            component: component.into(),
            operator,
            value,
        }
    }
}

/// Conditions combined with AND/OR. Used directly for visibility and embedded in branch rules.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Rule {
    #[serde(default)]
    pub combinator: Combinator,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Rule {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            combinator: Combinator::And,
            conditions,
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            combinator: Combinator::Or,
            conditions,
        }
    }
}
