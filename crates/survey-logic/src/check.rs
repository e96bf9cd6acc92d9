use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::component::{Component, QuestionKind};
use crate::model::page::{BranchTarget, Page};
use crate::model::rule::Rule;
use crate::model::survey::Survey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// One finding from [`check_survey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SurveyIssue {
    pub severity: Severity,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    pub message: String,
}

impl SurveyIssue {
    fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            page_id: None,
            component_id: None,
            message: message.into(),
        }
    }

    fn warning(code: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    fn on_page(mut self, page: &Page) -> Self {
        self.page_id = Some(page.id.clone());
        self
    }

    fn on_component(mut self, component: &Component) -> Self {
        self.component_id = Some(component.id.clone());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for SurveyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{level}[{}]", self.code)?;
        match (&self.page_id, &self.component_id) {
            (Some(page), Some(component)) => write!(f, " {page}/{component}")?,
            (Some(page), None) => write!(f, " {page}")?,
            (None, Some(component)) => write!(f, " {component}")?,
            (None, None) => {}
        }
        write!(f, ": {}", self.message)
    }
}

/// Structural lint of a survey definition.
///
/// Errors make the survey unusable by the engine; warnings flag definitions that load but are
/// likely mistakes (dangling condition targets, loop-backs, unreachable pages).
pub fn check_survey(survey: &Survey) -> Vec<SurveyIssue> {
    let mut issues = Vec::new();

    if survey.pages.is_empty() {
        issues.push(SurveyIssue::error("empty_survey", "survey has no pages"));
        return issues;
    }

    let mut page_ids = BTreeMap::new();
    for (index, page) in survey.pages.iter().enumerate() {
        if page_ids.insert(page.id.as_str(), index).is_some() {
            issues.push(
                SurveyIssue::error(
                    "duplicate_page",
                    format!("page id '{}' is declared twice", page.id),
                )
                .on_page(page),
            );
        }
    }

    let mut component_ids = BTreeSet::new();
    for page in &survey.pages {
        for component in &page.components {
            if !component_ids.insert(component.id.as_str()) {
                issues.push(
                    SurveyIssue::error(
                        "duplicate_component",
                        format!("component id '{}' is declared twice", component.id),
                    )
                    .on_page(page)
                    .on_component(component),
                );
            }
        }
    }

    for (index, page) in survey.pages.iter().enumerate() {
        for component in &page.components {
            check_component(page, component, &component_ids, &mut issues);
        }

        if page.is_terminal && !page.branch_rules.is_empty() {
            issues.push(
                SurveyIssue::warning(
                    "terminal_branches",
                    "branch rules on a terminal page are never evaluated",
                )
                .on_page(page),
            );
        }

        for branch in &page.branch_rules {
            check_rule(page, None, &branch.rule, &component_ids, &mut issues);
            if let BranchTarget::Page(target) = &branch.target {
                match page_ids.get(target.as_str()) {
                    None => issues.push(
                        SurveyIssue::error(
                            "unknown_branch_target",
                            format!("branch targets unknown page '{target}'"),
                        )
                        .on_page(page),
                    ),
                    Some(target_index) if *target_index <= index => issues.push(
                        SurveyIssue::warning(
                            "loop_back",
                            format!("branch loops back to page '{target}'"),
                        )
                        .on_page(page),
                    ),
                    Some(_) => {}
                }
            }
        }
    }

    for page in unreachable_pages(survey) {
        issues.push(
            SurveyIssue::warning("unreachable_page", "page cannot be reached from the first page")
                .on_page(page),
        );
    }

    issues
}

fn check_component(
    page: &Page,
    component: &Component,
    component_ids: &BTreeSet<&str>,
    issues: &mut Vec<SurveyIssue>,
) {
    if let Some(rule) = &component.visibility {
        check_rule(page, Some(component), rule, component_ids, issues);
    }

    if matches!(component.kind, QuestionKind::SingleChoice | QuestionKind::MultiChoice)
        && component.options.is_empty()
    {
        issues.push(
            SurveyIssue::warning("missing_options", "choice question declares no options")
                .on_page(page)
                .on_component(component),
        );
    }

    let Some(constraint) = &component.constraint else {
        return;
    };
    if let Some(pattern) = &constraint.pattern
        && let Err(err) = Regex::new(pattern)
    {
        issues.push(
            SurveyIssue::error("invalid_pattern", format!("pattern does not compile: {err}"))
                .on_page(page)
                .on_component(component),
        );
    }
    let ranges = [
        ("min/max", constraint.min.zip(constraint.max).is_some_and(|(lo, hi)| lo > hi)),
        (
            "min_length/max_length",
            constraint
                .min_length
                .zip(constraint.max_length)
                .is_some_and(|(lo, hi)| lo > hi),
        ),
        (
            "min_selections/max_selections",
            constraint
                .min_selections
                .zip(constraint.max_selections)
                .is_some_and(|(lo, hi)| lo > hi),
        ),
    ];
    for (name, inverted) in ranges {
        if inverted {
            issues.push(
                SurveyIssue::error("empty_range", format!("{name} bounds admit no value"))
                    .on_page(page)
                    .on_component(component),
            );
        }
    }

    let texty = matches!(
        component.kind,
        QuestionKind::ShortText | QuestionKind::LongText | QuestionKind::SingleChoice
    );
    let ignored = [
        (
            "min/max",
            component.kind != QuestionKind::Rating
                && (constraint.min.is_some() || constraint.max.is_some()),
        ),
        ("pattern", !texty && constraint.pattern.is_some()),
        (
            "min_length/max_length",
            !texty && (constraint.min_length.is_some() || constraint.max_length.is_some()),
        ),
        (
            "min_selections/max_selections",
            component.kind != QuestionKind::MultiChoice
                && (constraint.min_selections.is_some() || constraint.max_selections.is_some()),
        ),
    ];
    for (name, set) in ignored {
        if set {
            issues.push(
                SurveyIssue::warning(
                    "constraint_not_applicable",
                    format!("{name} is never checked for {:?} questions", component.kind),
                )
                .on_page(page)
                .on_component(component),
            );
        }
    }
}

fn check_rule(
    page: &Page,
    component: Option<&Component>,
    rule: &Rule,
    component_ids: &BTreeSet<&str>,
    issues: &mut Vec<SurveyIssue>,
) {
    for condition in &rule.conditions {
        let mut found = Vec::new();
        if !condition.operator.is_supported() {
            found.push(SurveyIssue::error(
                "unsupported_operator",
                format!(
                    "operator '{}' in condition on '{}' is not supported",
                    condition.operator, condition.component
                ),
            ));
        }
        if !component_ids.contains(condition.component.as_str()) {
            found.push(SurveyIssue::warning(
                "dangling_reference",
                format!(
                    "condition references unknown component '{}' and will treat it as unanswered",
                    condition.component
                ),
            ));
        }
        for issue in found {
            let issue = issue.on_page(page);
            issues.push(match component {
                Some(component) => issue.on_component(component),
                None => issue,
            });
        }
    }
}

/// Pages not reachable from the first page through default or branch transitions.
fn unreachable_pages(survey: &Survey) -> Vec<&Page> {
    let mut reached = BTreeSet::new();
    let mut queue = vec![0usize];

    while let Some(index) = queue.pop() {
        if !reached.insert(index) {
            continue;
        }
        let page = &survey.pages[index];
        if page.is_terminal {
            continue;
        }
        if index + 1 < survey.pages.len() {
            queue.push(index + 1);
        }
        for branch in &page.branch_rules {
            if let BranchTarget::Page(target) = &branch.target
                && let Some(target_index) = survey.page_index(target)
            {
                queue.push(target_index);
            }
        }
    }

    survey
        .pages
        .iter()
        .enumerate()
        .filter(|(index, _)| !reached.contains(index))
        .map(|(_, page)| page)
        .collect()
}
