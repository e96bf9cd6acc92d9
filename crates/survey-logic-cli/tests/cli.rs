use std::path::PathBuf;

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn survey_logic() -> Command {
    let mut cmd = Command::cargo_bin("survey-logic").expect("binary should build");
    cmd.env_remove("SURVEY_LOGIC_LOG");
    cmd
}

#[test]
fn check_accepts_clean_survey() {
    survey_logic()
        .arg("check")
        .arg(fixture("branching_survey.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "customer-feedback: 0 error(s), 0 warning(s)",
        ));
}

#[test]
fn check_fails_on_broken_survey() {
    survey_logic()
        .arg("check")
        .arg(fixture("invalid_survey.json"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("error[duplicate_page] p1"))
        .stdout(predicate::str::contains("warning[missing_options]"))
        .stderr(predicate::str::contains("failed checks"));
}

#[test]
fn check_json_lists_issue_codes() {
    let output = survey_logic()
        .args(["check", "--json"])
        .arg(fixture("invalid_survey.json"))
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).expect("json report");
    assert_eq!(report["survey_id"], "broken");
    let codes: Vec<&str> = report["issues"]
        .as_array()
        .expect("issues")
        .iter()
        .filter_map(|issue| issue["code"].as_str())
        .collect();
    assert!(codes.contains(&"unsupported_operator"));
    assert!(codes.contains(&"unknown_branch_target"));
}

#[test]
fn check_reports_missing_file() {
    survey_logic()
        .args(["check", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read survey"));
}

#[test]
fn replay_follows_branch_to_completion() {
    let temp = TempDir::new().unwrap();
    let script = temp.child("script.json");
    script
        .write_str(r#"[{"answer": {"q1": "yes"}}, "next", {"answer": {"q4": 4}}, "next"]"#)
        .unwrap();

    survey_logic()
        .arg("replay")
        .arg(fixture("branching_survey.json"))
        .arg("--script")
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("advanced page1 -> page3"))
        .stdout(predicate::str::contains("completed from page3"))
        .stdout(predicate::str::contains("history: page1 > page3"))
        .stdout(predicate::str::contains("complete: yes"));
}

#[test]
fn replay_shows_blocked_gating() {
    let temp = TempDir::new().unwrap();
    let script = temp.child("script.json");
    script.write_str(r#"["next"]"#).unwrap();

    survey_logic()
        .arg("replay")
        .arg(fixture("branching_survey.json"))
        .arg("--script")
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("blocked (q1 required)"))
        .stdout(predicate::str::contains("complete: no"));
}

#[test]
fn replay_json_report() {
    let temp = TempDir::new().unwrap();
    let script = temp.child("script.json");
    script
        .write_str(r#"[{"answer": {"q1": "no"}}, "next", "back", {"goto": "page1"}]"#)
        .unwrap();

    let output = survey_logic()
        .arg("replay")
        .arg(fixture("branching_survey.json"))
        .arg("--script")
        .arg(script.path())
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).expect("json report");
    assert_eq!(report["steps"][1]["result"]["outcome"], "advanced");
    assert_eq!(report["steps"][1]["page_id"], "page2");
    assert_eq!(report["steps"][2]["result"]["moved"], true);
    assert_eq!(report["current_page_id"], "page1");
    assert_eq!(report["complete"], false);
    assert!(report.get("completed").is_none());
}

#[test]
fn replay_saves_and_resumes_json_state() {
    let temp = TempDir::new().unwrap();
    let first = temp.child("first.json");
    first
        .write_str(r#"[{"answer": {"q1": "no"}}, "next"]"#)
        .unwrap();
    let state = temp.child("nested/state.json");

    survey_logic()
        .arg("replay")
        .arg(fixture("branching_survey.json"))
        .arg("--script")
        .arg(first.path())
        .arg("--state-out")
        .arg(state.path())
        .assert()
        .success();
    state.assert(predicate::str::contains(r#""current_page_id": "page2""#));

    let second = temp.child("second.json");
    second.write_str(r#"["next", "next"]"#).unwrap();
    survey_logic()
        .arg("replay")
        .arg(fixture("branching_survey.json"))
        .arg("--script")
        .arg(second.path())
        .arg("--state")
        .arg(state.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("history: page1 > page2 > page3"))
        .stdout(predicate::str::contains("complete: yes"));
}

#[test]
fn replay_round_trips_cbor_state() {
    let temp = TempDir::new().unwrap();
    let first = temp.child("first.json");
    first
        .write_str(r#"[{"answer": {"q1": "yes"}}, "next"]"#)
        .unwrap();
    let state = temp.child("state.cbor");

    survey_logic()
        .arg("replay")
        .arg(fixture("branching_survey.json"))
        .arg("--script")
        .arg(first.path())
        .arg("--state-out")
        .arg(state.path())
        .assert()
        .success();
    state.assert(predicate::path::exists());

    let second = temp.child("second.json");
    second.write_str(r#"["back"]"#).unwrap();
    survey_logic()
        .arg("replay")
        .arg(fixture("branching_survey.json"))
        .arg("--script")
        .arg(second.path())
        .arg("--state")
        .arg(state.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("back: moved; on page1"));
}

#[test]
fn config_can_disable_back_navigation() {
    let temp = TempDir::new().unwrap();
    let config = temp.child("survey-logic.toml");
    config.write_str("[engine]\nallow_back = false\n").unwrap();
    let script = temp.child("script.json");
    script
        .write_str(r#"[{"answer": {"q1": "no"}}, "next", "back"]"#)
        .unwrap();

    survey_logic()
        .arg("--config")
        .arg(config.path())
        .arg("replay")
        .arg(fixture("branching_survey.json"))
        .arg("--script")
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("back: refused; on page2"));
}

#[test]
fn replay_rejects_unknown_component() {
    let temp = TempDir::new().unwrap();
    let script = temp.child("script.json");
    script.write_str(r#"[{"answer": {"nope": 1}}]"#).unwrap();

    survey_logic()
        .arg("replay")
        .arg(fixture("branching_survey.json"))
        .arg("--script")
        .arg(script.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("step 1"))
        .stderr(predicate::str::contains("unknown component 'nope'"));
}

#[test]
fn schema_prints_state_schema() {
    survey_logic()
        .args(["schema", "state"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"survey_id\""))
        .stdout(predicate::str::contains("\"current_page_id\""));
}
