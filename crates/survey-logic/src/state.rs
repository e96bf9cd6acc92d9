use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::LogicError;
use crate::model::page::PageId;
use crate::responses::Responses;

/// Serializable snapshot of a survey session, used to resume it later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EngineState {
    pub survey_id: String,
    pub current_page_id: PageId,
    pub history: Vec<PageId>,
    #[serde(default)]
    pub responses: Responses,
    #[serde(default)]
    pub is_complete: bool,
    /// Response revision at export time.
    #[serde(default)]
    pub revision: u64,
    /// Revision each history entry was entered at. Older snapshots omit it, in which case every
    /// entry counts as entered at `revision`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history_revisions: Vec<u64>,
    /// RFC 3339 timestamp of the export; informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
}

impl EngineState {
    pub fn to_json_pretty(&self) -> Result<String, LogicError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, LogicError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Encodes the snapshot as CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>, LogicError> {
        let mut out = Vec::new();
        ciborium::into_writer(self, &mut out).map_err(|err| LogicError::Cbor(err.to_string()))?;
        Ok(out)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, LogicError> {
        ciborium::from_reader(bytes).map_err(|err| LogicError::Cbor(err.to_string()))
    }

    /// Same session, ignoring export metadata.
    pub fn same_session(&self, other: &EngineState) -> bool {
        self.survey_id == other.survey_id
            && self.current_page_id == other.current_page_id
            && self.history == other.history
            && self.responses == other.responses
            && self.is_complete == other.is_complete
            && self.revision == other.revision
            && self.history_revisions == other.history_revisions
    }
}
