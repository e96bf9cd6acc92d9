use crate::model::component::Component;
use crate::model::rule::{Condition, Rule};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identifier for survey pages.
pub type PageId = String;

/// Where a matching branch rule sends the respondent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BranchTarget {
    Page(PageId),
    EndSurvey,
}

/// Conditional jump evaluated when leaving a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BranchRule {
    #[serde(flatten)]
    pub rule: Rule,
    pub target: BranchTarget,
}

impl BranchRule {
    pub fn to_page(target: impl Into<PageId>, conditions: Vec<Condition>) -> Self {
        Self {
            rule: Rule::all(conditions),
            target: BranchTarget::Page(target.into()),
        }
    }

    pub fn end_survey(conditions: Vec<Condition>) -> Self {
        Self {
            rule: Rule::all(conditions),
            target: BranchTarget::EndSurvey,
        }
    }
}

/// An ordered group of components shown together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Page {
    pub id: PageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branch_rules: Vec<BranchRule>,
    #[serde(default)]
    pub is_terminal: bool,
}

impl Page {
    pub fn new(id: impl Into<PageId>, components: Vec<Component>) -> Self {
        Self {
            id: id.into(),
            title: None,
            components,
            branch_rules: Vec::new(),
            is_terminal: false,
        }
    }

    pub fn with_branch(mut self, rule: BranchRule) -> Self {
        self.branch_rules.push(rule);
        self
    }

    pub fn terminal(mut self) -> Self {
        self.is_terminal = true;
        self
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|component| component.id == id)
    }
}
