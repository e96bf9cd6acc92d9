use std::fmt;

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info, warn};

use crate::check::check_survey;
use crate::error::LogicError;
use crate::events::{CompletionListener, SurveyCompleted};
use crate::history::History;
use crate::model::component::Component;
use crate::model::page::{Page, PageId};
use crate::model::survey::Survey;
use crate::navigation::{Navigation, NextStep, resolve_next};
use crate::progress::{Progress, estimate_progress};
use crate::responses::Responses;
use crate::state::EngineState;
use crate::validate::{PageValidation, validate_page};
use crate::visibility::visible_components;

/// What the UI needs to redraw the current page after an answer changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub page_id: PageId,
    pub visible: Vec<String>,
    pub progress: Progress,
}

/// Drives one respondent's pass through a survey.
///
/// Owns the responses, the visited-page history and the completion flag. Every method runs to
/// completion synchronously, and any refused navigation leaves the session untouched.
pub struct SurveyEngine {
    survey: Survey,
    responses: Responses,
    history: History,
    complete: bool,
    revision: u64,
    listeners: Vec<Box<dyn CompletionListener>>,
}

impl SurveyEngine {
    /// Starts a fresh session on the first page.
    pub fn new(survey: Survey) -> Result<Self, LogicError> {
        let issues = check_survey(&survey);
        let (errors, warnings): (Vec<_>, Vec<_>) =
            issues.into_iter().partition(|issue| issue.is_error());
        for issue in &warnings {
            warn!(survey = %survey.id, "{issue}");
        }
        if !errors.is_empty() {
            return Err(LogicError::InvalidSurvey { issues: errors });
        }

        let first = survey
            .first_page()
            .map(|page| page.id.clone())
            .ok_or_else(|| LogicError::InvalidSurvey { issues: Vec::new() })?;
        debug!(survey = %survey.id, page = %first, "survey session started");

        Ok(Self {
            survey,
            responses: Responses::new(),
            history: History::new(first),
            complete: false,
            revision: 0,
            listeners: Vec::new(),
        })
    }

    /// Restores a session previously captured with [`SurveyEngine::export_state`].
    pub fn resume(survey: Survey, state: EngineState) -> Result<Self, LogicError> {
        let mut engine = Self::new(survey)?;
        engine.import_state(state)?;
        Ok(engine)
    }

    /// Registers an observer for the completion event.
    pub fn subscribe(&mut self, listener: impl CompletionListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn survey(&self) -> &Survey {
        &self.survey
    }

    pub fn responses(&self) -> &Responses {
        &self.responses
    }

    pub fn history(&self) -> &[PageId] {
        self.history.entries()
    }

    pub fn current_page_id(&self) -> &str {
        self.history.current()
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.survey.page(self.history.current())
    }

    pub fn is_survey_complete(&self) -> bool {
        self.complete
    }

    /// Components of `page_id` visible under the current responses.
    pub fn visible_components(&self, page_id: &str) -> Result<Vec<&Component>, LogicError> {
        visible_components(self.page(page_id)?, &self.responses)
    }

    pub fn progress(&self) -> Progress {
        estimate_progress(&self.survey, &self.history, &self.responses, self.complete)
    }

    pub fn page_view(&self) -> Result<PageView, LogicError> {
        let page = self.page(self.history.current())?;
        let visible = visible_components(page, &self.responses)?
            .into_iter()
            .map(|component| component.id.clone())
            .collect();
        Ok(PageView {
            page_id: page.id.clone(),
            visible,
            progress: self.progress(),
        })
    }

    /// Records an answer, overwriting any previous one. Never navigates.
    ///
    /// Writing the value a component already holds is a no-op.
    pub fn update_response(
        &mut self,
        component_id: &str,
        value: Value,
    ) -> Result<PageView, LogicError> {
        let Some(component) = self.survey.component(component_id) else {
            return Err(LogicError::UnknownComponent(component_id.to_string()));
        };
        let value = component.normalize_answer(value);
        if self.responses.get(component_id) != Some(&value) {
            self.responses.insert(component_id, value);
            self.revision += 1;
            debug!(component = component_id, revision = self.revision, "response updated");
        }
        self.page_view()
    }

    pub fn validate_current_page(&self) -> Result<PageValidation, LogicError> {
        validate_page(self.page(self.history.current())?, &self.responses)
    }

    /// Gating check: every visible required component is answered and every answer is valid.
    pub fn can_navigate_to_next_page(&self) -> Result<bool, LogicError> {
        if self.complete {
            return Ok(false);
        }
        Ok(self.validate_current_page()?.valid)
    }

    pub fn navigate_to_next_page(&mut self) -> Result<Navigation, LogicError> {
        if self.complete {
            return Ok(Navigation::AlreadyComplete);
        }

        let page = self.page(self.history.current())?;
        let validation = validate_page(page, &self.responses)?;
        if !validation.valid {
            debug!(
                page = %page.id,
                missing = ?validation.missing_required,
                errors = validation.errors.len(),
                "navigation blocked by gating"
            );
            return Ok(Navigation::Blocked { validation });
        }

        let from = page.id.clone();
        match resolve_next(&self.survey, page, &self.responses)? {
            NextStep::Complete => {
                self.mark_complete();
                Ok(Navigation::Completed { from })
            }
            NextStep::Page(to) => {
                if self.history.would_loop(&to, self.revision) {
                    warn!(from = %from, to = %to, "branch loop detected; navigation refused");
                    return Ok(Navigation::LoopDetected { from, to });
                }
                self.history.push(to.clone(), self.revision);
                debug!(from = %from, to = %to, "advanced");
                Ok(Navigation::Advanced { from, to })
            }
        }
    }

    /// Steps back along the recorded history. Answers on the page being left are kept.
    pub fn navigate_to_previous_page(&mut self) -> bool {
        if self.complete || !self.survey.settings.allow_back {
            return false;
        }
        match self.history.pop() {
            Some(page) => {
                debug!(page = %page, "navigated back");
                true
            }
            None => false,
        }
    }

    /// Jumps to an already visited page, discarding the history recorded after it.
    pub fn navigate_to_page(&mut self, page_id: &str) -> bool {
        if self.complete || !self.history.contains(page_id) {
            return false;
        }
        if self.history.current() == page_id {
            return true;
        }
        if !self.survey.settings.allow_back {
            return false;
        }
        let moved = self.history.rewind_to(page_id);
        debug!(page = page_id, "jumped to visited page");
        moved
    }

    pub fn export_state(&self) -> EngineState {
        EngineState {
            survey_id: self.survey.id.clone(),
            current_page_id: self.history.current().to_string(),
            history: self.history.entries().to_vec(),
            responses: self.responses.clone(),
            is_complete: self.complete,
            revision: self.revision,
            history_revisions: self.history.revisions().to_vec(),
            exported_at: OffsetDateTime::now_utc().format(&Rfc3339).ok(),
        }
    }

    /// Replaces the session with `state` after checking it still fits this survey.
    ///
    /// Nothing is applied unless every check passes. Restoring an already completed session
    /// does not raise the completion event again.
    pub fn import_state(&mut self, state: EngineState) -> Result<(), LogicError> {
        if state.survey_id != self.survey.id {
            return Err(LogicError::stale(format!(
                "state belongs to survey '{}', not '{}'",
                state.survey_id, self.survey.id
            )));
        }
        if let Some(missing) = state
            .history
            .iter()
            .find(|page_id| self.survey.page(page_id).is_none())
        {
            return Err(LogicError::stale(format!(
                "history references page '{missing}' which no longer exists"
            )));
        }
        if self.survey.page(&state.current_page_id).is_none() {
            return Err(LogicError::stale(format!(
                "current page '{}' no longer exists",
                state.current_page_id
            )));
        }
        if state.history_revisions.iter().any(|stamp| *stamp > state.revision) {
            return Err(LogicError::stale("history revision is newer than the session revision"));
        }
        let rebuilt = if state.history_revisions.is_empty() {
            History::from_entries(state.history, state.revision)
        } else {
            History::from_parts(state.history, state.history_revisions)
        };
        let history = rebuilt.ok_or_else(|| {
            LogicError::stale("history is empty, repeats a page consecutively or is misaligned")
        })?;
        if history.current() != state.current_page_id {
            return Err(LogicError::stale(format!(
                "current page '{}' is not the last history entry '{}'",
                state.current_page_id,
                history.current()
            )));
        }
        if self.complete && !state.is_complete {
            return Err(LogicError::SessionComplete);
        }

        let mut responses = Responses::new();
        for (component_id, value) in state.responses {
            let value = match self.survey.component(&component_id) {
                Some(component) => component.normalize_answer(value),
                None => {
                    warn!(component = %component_id, "keeping response for unknown component");
                    value
                }
            };
            responses.insert(component_id, value);
        }

        self.history = history;
        self.responses = responses;
        self.complete = state.is_complete;
        self.revision = state.revision;
        debug!(page = %self.history.current(), "state imported");
        Ok(())
    }

    fn page(&self, page_id: &str) -> Result<&Page, LogicError> {
        self.survey
            .page(page_id)
            .ok_or_else(|| LogicError::UnknownPage(page_id.to_string()))
    }

    fn mark_complete(&mut self) {
        if self.complete {
            return;
        }
        self.complete = true;
        info!(survey = %self.survey.id, responses = self.responses.len(), "survey completed");

        let event = SurveyCompleted {
            survey_id: self.survey.id.clone(),
            responses: self.responses.clone(),
            completed_at: OffsetDateTime::now_utc(),
        };
        for listener in &mut self.listeners {
            listener.on_complete(&event);
        }
    }
}

impl fmt::Debug for SurveyEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurveyEngine")
            .field("survey", &self.survey.id)
            .field("history", &self.history)
            .field("responses", &self.responses)
            .field("complete", &self.complete)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
