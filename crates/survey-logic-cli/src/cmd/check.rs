use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use serde::Serialize;
use survey_logic::{Survey, SurveyIssue, check_survey};

use crate::cmd::load_survey;

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Survey definition to check
    #[arg(value_name = "survey.json")]
    pub survey: PathBuf,
    /// Print the report as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub survey_id: String,
    pub errors: usize,
    pub warnings: usize,
    pub issues: Vec<SurveyIssue>,
}

impl CheckReport {
    pub fn for_survey(survey: &Survey) -> Self {
        let issues = check_survey(survey);
        let errors = issues.iter().filter(|issue| issue.is_error()).count();
        Self {
            survey_id: survey.id.clone(),
            errors,
            warnings: issues.len() - errors,
            issues,
        }
    }
}

pub fn run(args: &CheckArgs) -> Result<()> {
    let survey = load_survey(&args.survey)?;
    let report = CheckReport::for_survey(&survey);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for issue in &report.issues {
            println!("{issue}");
        }
        println!(
            "{}: {} error(s), {} warning(s)",
            report.survey_id, report.errors, report.warnings
        );
    }

    if report.errors > 0 {
        bail!(
            "survey '{}' failed checks with {} error(s)",
            report.survey_id,
            report.errors
        );
    }
    Ok(())
}
