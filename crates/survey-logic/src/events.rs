use serde::Serialize;
use time::OffsetDateTime;

use crate::responses::Responses;

/// Raised once, when a session transitions to complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyCompleted {
    pub survey_id: String,
    pub responses: Responses,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
}

/// Observer notified when a survey session completes.
pub trait CompletionListener {
    fn on_complete(&mut self, event: &SurveyCompleted);
}

impl<F> CompletionListener for F
where
    F: FnMut(&SurveyCompleted),
{
    fn on_complete(&mut self, event: &SurveyCompleted) {
        self(event)
    }
}
