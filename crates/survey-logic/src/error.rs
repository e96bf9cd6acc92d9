use thiserror::Error;

use crate::check::SurveyIssue;

/// Structural and configuration failures surfaced by the engine.
///
/// Respondent-driven refusals (failed gating, detected loops) are not errors; they are
/// reported through [`crate::Navigation`].
#[derive(Debug, Error)]
pub enum LogicError {
    #[error("unsupported operator '{operator}' in condition on '{component}'")]
    UnsupportedOperator { component: String, operator: String },
    #[error("unknown page '{0}'")]
    UnknownPage(String),
    #[error("unknown component '{0}'")]
    UnknownComponent(String),
    #[error("stale engine state: {reason}")]
    StaleState { reason: String },
    #[error("survey session is already complete")]
    SessionComplete,
    #[error("invalid survey definition: {}", summarize(.issues))]
    InvalidSurvey { issues: Vec<SurveyIssue> },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cbor error: {0}")]
    Cbor(String),
}

impl LogicError {
    pub(crate) fn stale(reason: impl Into<String>) -> Self {
        Self::StaleState {
            reason: reason.into(),
        }
    }
}

fn summarize(issues: &[SurveyIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
