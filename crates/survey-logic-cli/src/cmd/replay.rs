use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use survey_logic::{
    EngineState, Navigation, PageId, Progress, Survey, SurveyCompleted, SurveyEngine,
};
use tracing::{debug, info};

use crate::cmd::{is_cbor, load_survey, write_output};
use crate::config::CliConfig;

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Survey definition to drive
    #[arg(value_name = "survey.json")]
    pub survey: PathBuf,
    /// JSON array of steps to apply
    #[arg(long = "script", value_name = "script.json")]
    pub script: PathBuf,
    /// Resume from an exported state (.json or .cbor)
    #[arg(long = "state", value_name = "state.json")]
    pub state: Option<PathBuf>,
    /// Write the final state here (.json or .cbor)
    #[arg(long = "state-out", value_name = "state.json")]
    pub state_out: Option<PathBuf>,
    /// Print the replay report as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

/// One scripted respondent action.
///
/// ```json
/// [{"answer": {"q1": "yes"}}, "next", "back", {"goto": "page1"}]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Answer(BTreeMap<String, Value>),
    Next,
    Back,
    Goto(PageId),
}

#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepResult {
    Answered,
    Navigation(Navigation),
    Moved { moved: bool },
}

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub step: Step,
    pub result: StepResult,
    pub page_id: PageId,
    pub visible: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub survey_id: String,
    pub steps: Vec<StepReport>,
    pub current_page_id: PageId,
    pub history: Vec<PageId>,
    pub progress: Progress,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<SurveyCompleted>,
}

pub fn run(args: &ReplayArgs, config: &CliConfig) -> Result<()> {
    let mut survey = load_survey(&args.survey)?;
    config.apply(&mut survey);
    let steps = load_script(&args.script)?;
    let state = args.state.as_deref().map(load_state).transpose()?;

    let (report, final_state) = replay(survey, state, &steps)?;

    if let Some(path) = &args.state_out {
        let payload = if is_cbor(path) {
            final_state.to_cbor()?
        } else {
            final_state.to_json_pretty()?.into_bytes()
        };
        write_output(path, &payload)?;
        debug!(path = %path.display(), "state written");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_human(&report);
    }
    Ok(())
}

/// Applies `steps` to a fresh or resumed engine and reports every outcome.
pub fn replay(
    survey: Survey,
    state: Option<EngineState>,
    steps: &[Step],
) -> Result<(ReplayReport, EngineState)> {
    let mut engine = match state {
        Some(state) => SurveyEngine::resume(survey, state).context("failed to resume state")?,
        None => SurveyEngine::new(survey).context("survey cannot be driven")?,
    };

    let completed = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&completed);
    engine.subscribe(move |event: &SurveyCompleted| {
        *sink.borrow_mut() = Some(event.clone());
    });

    let mut reports = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        let result = apply(&mut engine, step)
            .with_context(|| format!("step {} ({step:?}) failed", index + 1))?;
        let view = engine.page_view()?;
        reports.push(StepReport {
            index: index + 1,
            step: step.clone(),
            result,
            page_id: view.page_id,
            visible: view.visible,
        });
    }

    if engine.is_survey_complete() {
        info!(survey = %engine.survey().id, "replay finished a complete session");
    }

    let report = ReplayReport {
        survey_id: engine.survey().id.clone(),
        steps: reports,
        current_page_id: engine.current_page_id().to_string(),
        history: engine.history().to_vec(),
        progress: engine.progress(),
        complete: engine.is_survey_complete(),
        completed: completed.borrow_mut().take(),
    };
    Ok((report, engine.export_state()))
}

fn apply(engine: &mut SurveyEngine, step: &Step) -> Result<StepResult> {
    Ok(match step {
        Step::Answer(answers) => {
            for (component_id, value) in answers {
                engine.update_response(component_id, value.clone())?;
            }
            StepResult::Answered
        }
        Step::Next => StepResult::Navigation(engine.navigate_to_next_page()?),
        Step::Back => StepResult::Moved {
            moved: engine.navigate_to_previous_page(),
        },
        Step::Goto(page_id) => StepResult::Moved {
            moved: engine.navigate_to_page(page_id),
        },
    })
}

pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse script {}", path.display()))
}

fn load_state(path: &Path) -> Result<EngineState> {
    let state = if is_cbor(path) {
        let bytes =
            fs::read(path).with_context(|| format!("failed to read state {}", path.display()))?;
        EngineState::from_cbor(&bytes)
    } else {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read state {}", path.display()))?;
        EngineState::from_json(&raw)
    };
    state.with_context(|| format!("failed to decode state {}", path.display()))
}

fn print_human(report: &ReplayReport) {
    for step in &report.steps {
        let outcome = match &step.result {
            StepResult::Answered => "answered".to_string(),
            StepResult::Navigation(navigation) => describe(navigation),
            StepResult::Moved { moved: true } => "moved".to_string(),
            StepResult::Moved { moved: false } => "refused".to_string(),
        };
        println!(
            "[{}] {}: {}; on {} [{}]",
            step.index,
            step_name(&step.step),
            outcome,
            step.page_id,
            step.visible.join(", ")
        );
    }
    println!(
        "page {} ({} of ~{}, {}%)",
        report.current_page_id,
        report.progress.current,
        report.progress.estimated_total,
        report.progress.percentage
    );
    println!("history: {}", report.history.join(" > "));
    println!("complete: {}", if report.complete { "yes" } else { "no" });
}

fn step_name(step: &Step) -> String {
    match step {
        Step::Answer(answers) => {
            let ids: Vec<&str> = answers.keys().map(String::as_str).collect();
            format!("answer {}", ids.join(","))
        }
        Step::Next => "next".into(),
        Step::Back => "back".into(),
        Step::Goto(page_id) => format!("goto {page_id}"),
    }
}

fn describe(navigation: &Navigation) -> String {
    match navigation {
        Navigation::Advanced { from, to } => format!("advanced {from} -> {to}"),
        Navigation::Completed { from } => format!("completed from {from}"),
        Navigation::Blocked { validation } => {
            let mut reasons: Vec<String> = validation
                .missing_required
                .iter()
                .map(|id| format!("{id} required"))
                .collect();
            reasons.extend(
                validation
                    .errors
                    .iter()
                    .map(|error| format!("{} {}", error.component_id, error.code)),
            );
            format!("blocked ({})", reasons.join("; "))
        }
        Navigation::LoopDetected { from, to } => format!("loop refused {from} -> {to}"),
        Navigation::AlreadyComplete => "already complete".into(),
    }
}
