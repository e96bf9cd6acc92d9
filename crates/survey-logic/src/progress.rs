use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::history::History;
use crate::model::page::Page;
use crate::model::survey::Survey;
use crate::navigation::{NextStep, branch_step, default_step};
use crate::resolve::resolve;
use crate::responses::Responses;

/// Progress counters for the current session.
///
/// `estimated_total` is a hint: with response-dependent branching the remaining path is only
/// known once the respondent reaches each branch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Progress {
    pub current: usize,
    pub estimated_total: usize,
    pub percentage: u8,
}

/// Estimates progress by walking forward from the current page.
pub fn estimate_progress(
    survey: &Survey,
    history: &History,
    responses: &Responses,
    complete: bool,
) -> Progress {
    let current = history.len();
    let remaining = remaining_pages(survey, history.current(), responses);
    let estimated_total = (current - 1 + remaining).max(current);

    let percentage = if complete {
        100
    } else {
        let done = (current - 1) as f64 / estimated_total as f64;
        (done * 100.0).round().clamp(0.0, 100.0) as u8
    };

    Progress {
        current,
        estimated_total,
        percentage,
    }
}

/// Number of pages on the predicted path starting at (and including) `start`.
fn remaining_pages(survey: &Survey, start: &str, responses: &Responses) -> usize {
    let mut seen = BTreeSet::new();
    let mut cursor = survey.page(start);

    while let Some(page) = cursor {
        if !seen.insert(page.id.as_str()) || page.is_terminal {
            break;
        }
        cursor = match predicted_step(survey, page, responses) {
            NextStep::Page(id) => survey.page(&id),
            NextStep::Complete => None,
        };
    }

    seen.len().max(1)
}

/// Uses a branch target only when exactly one branch rule currently holds.
fn predicted_step(survey: &Survey, page: &Page, responses: &Responses) -> NextStep {
    let mut matched = page
        .branch_rules
        .iter()
        .filter(|branch| resolve(&branch.rule, responses).unwrap_or(false));

    match (matched.next(), matched.next()) {
        (Some(only), None) => {
            branch_step(survey, &only.target).unwrap_or_else(|_| default_step(survey, page))
        }
        _ => default_step(survey, page),
    }
}
