//! Command-line front end for the `survey-logic` engine: definition checks, scripted replays
//! and JSON Schema export.

pub mod cli;
pub mod cmd;
pub mod config;
