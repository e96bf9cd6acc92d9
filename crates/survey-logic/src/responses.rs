use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Respondent answers keyed by component id.
///
/// Ordered so exported state and CLI output are deterministic; lookup order carries no meaning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Responses {
    values: BTreeMap<String, Value>,
}

impl Responses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `component_id`, returning the previous answer.
    pub fn insert(&mut self, component_id: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(component_id.into(), value)
    }

    pub fn get(&self, component_id: &str) -> Option<&Value> {
        self.values.get(component_id)
    }

    pub fn contains(&self, component_id: &str) -> bool {
        self.values.contains_key(component_id)
    }

    /// True when an answer exists and is not empty (see [`is_blank`]).
    pub fn is_answered(&self, component_id: &str) -> bool {
        self.get(component_id).is_some_and(|value| !is_blank(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Responses {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }
}

impl IntoIterator for Responses {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Null, whitespace-only strings, empty lists and empty objects count as "no answer".
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
