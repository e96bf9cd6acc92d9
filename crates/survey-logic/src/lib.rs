#![allow(missing_docs)]
//! Navigation, branching, visibility and progress for multi-page surveys.
//!
//! [`SurveyEngine`] owns a respondent's session: answers go in through
//! [`SurveyEngine::update_response`], the current page's visible components and the
//! gating check are recomputed on demand, and forward navigation follows the first
//! matching branch rule or the declared page order. Sessions can be exported and resumed
//! through [`EngineState`].

pub mod check;
pub mod condition;
pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod model;
pub mod navigation;
pub mod progress;
pub mod resolve;
pub mod responses;
pub mod schema;
pub mod state;
pub mod validate;
pub mod visibility;

pub use check::{Severity, SurveyIssue, check_survey};
pub use condition::evaluate;
pub use engine::{PageView, SurveyEngine};
pub use error::LogicError;
pub use events::{CompletionListener, SurveyCompleted};
pub use history::History;
pub use model::{
    BranchRule, BranchTarget, Combinator, Component, Condition, Constraint, Operator, Page,
    PageId, QuestionKind, Rule, Survey, SurveySettings,
};
pub use navigation::{Navigation, NextStep, default_step, resolve_next};
pub use progress::{Progress, estimate_progress};
pub use resolve::{resolve, resolve_optional};
pub use responses::Responses;
pub use state::EngineState;
pub use validate::{PageValidation, ValidationError, validate_page};
pub use visibility::{VisibilityMap, resolve_visibility, visible_components};
