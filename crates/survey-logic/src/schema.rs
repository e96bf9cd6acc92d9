use schemars::{Schema, schema_for};

use crate::model::survey::Survey;
use crate::state::EngineState;

/// JSON Schema for survey definitions.
pub fn survey_schema() -> Schema {
    schema_for!(Survey)
}

/// JSON Schema for exported engine state.
pub fn state_schema() -> Schema {
    schema_for!(EngineState)
}
