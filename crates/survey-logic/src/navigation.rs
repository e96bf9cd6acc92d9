use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LogicError;
use crate::model::page::{BranchTarget, Page, PageId};
use crate::model::survey::Survey;
use crate::resolve::resolve;
use crate::responses::Responses;
use crate::validate::PageValidation;

/// Result of resolving the transition out of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "step", content = "page", rename_all = "snake_case")]
pub enum NextStep {
    Page(PageId),
    Complete,
}

impl NextStep {
    pub fn page_id(&self) -> Option<&str> {
        match self {
            NextStep::Page(id) => Some(id),
            NextStep::Complete => None,
        }
    }
}

/// Outcome of a forward navigation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Navigation {
    Advanced { from: PageId, to: PageId },
    Completed { from: PageId },
    /// Gating failed; nothing changed.
    Blocked { validation: PageValidation },
    /// The resolved target would repeat a back-and-forth cycle; nothing changed.
    LoopDetected { from: PageId, to: PageId },
    AlreadyComplete,
}

impl Navigation {
    /// Whether the request moved the session (the boolean form of the navigation contract).
    pub fn is_success(&self) -> bool {
        matches!(self, Navigation::Advanced { .. } | Navigation::Completed { .. })
    }
}

/// Resolves where the respondent goes after `page`.
///
/// Terminal pages complete the survey. Otherwise the first branch rule that resolves true
/// wins; with no match the next page in declared order is used, and the last page completes.
pub fn resolve_next(
    survey: &Survey,
    page: &Page,
    responses: &Responses,
) -> Result<NextStep, LogicError> {
    if page.is_terminal {
        debug!(page = %page.id, "terminal page reached");
        return Ok(NextStep::Complete);
    }

    for (index, branch) in page.branch_rules.iter().enumerate() {
        if resolve(&branch.rule, responses)? {
            debug!(page = %page.id, rule = index, target = ?branch.target, "branch rule matched");
            return branch_step(survey, &branch.target);
        }
    }

    Ok(default_step(survey, page))
}

/// The linear successor of `page`, ignoring branch rules.
pub fn default_step(survey: &Survey, page: &Page) -> NextStep {
    match survey.page_after(&page.id) {
        Some(next) => NextStep::Page(next.id.clone()),
        None => NextStep::Complete,
    }
}

pub(crate) fn branch_step(survey: &Survey, target: &BranchTarget) -> Result<NextStep, LogicError> {
    match target {
        BranchTarget::Page(id) => {
            if survey.page(id).is_none() {
                return Err(LogicError::UnknownPage(id.clone()));
            }
            Ok(NextStep::Page(id.clone()))
        }
        BranchTarget::EndSurvey => Ok(NextStep::Complete),
    }
}
