use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use survey_logic::Survey;

/// Optional TOML configuration for the command-line front end.
///
/// ```toml
/// [engine]
/// allow_back = false
///
/// [log]
/// filter = "survey_logic=debug"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub engine: EngineConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Overrides the survey's own `settings.allow_back`.
    pub allow_back: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing-subscriber` filter directive used when no environment filter is set.
    pub filter: Option<String>,
}

impl CliConfig {
    /// Loads the file at `path`, or the defaults when no file was given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply(&self, survey: &mut Survey) {
        if let Some(allow_back) = self.engine.allow_back {
            survey.settings.allow_back = allow_back;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_uses_defaults() {
        let config = CliConfig::load(None).expect("defaults");
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn reads_engine_and_log_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey-logic.toml");
        fs::write(
            &path,
            "[engine]\nallow_back = false\n\n[log]\nfilter = \"survey_logic=trace\"\n",
        )
        .unwrap();

        let config = CliConfig::load(Some(path.as_path())).expect("config should load");
        assert_eq!(config.engine.allow_back, Some(false));
        assert_eq!(config.log.filter.as_deref(), Some("survey_logic=trace"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CliConfig::from_toml_str("[engine]\nallow_forward = true\n").is_err());
    }

    #[test]
    fn override_only_when_set() {
        let mut survey = Survey::new("s", "S", Vec::new());
        CliConfig::default().apply(&mut survey);
        assert!(survey.settings.allow_back);

        let config = CliConfig::from_toml_str("[engine]\nallow_back = false\n").unwrap();
        config.apply(&mut survey);
        assert!(!survey.settings.allow_back);
    }
}
