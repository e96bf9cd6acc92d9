use serde_json::{Value, json};

use survey_logic::validate::validate_value;
use survey_logic::{Component, Constraint, Page, QuestionKind, Responses, validate_page};

fn code(component: &Component, value: Value) -> Option<String> {
    validate_value(component, &value).map(|error| error.code)
}

#[test]
fn text_constraints() {
    let zip = Component::new("zip", QuestionKind::ShortText).with_constraint(Constraint {
        pattern: Some(r"^\d{5}$".into()),
        ..Constraint::default()
    });
    assert_eq!(code(&zip, json!("12345")), None);
    assert_eq!(code(&zip, json!("12a45")).as_deref(), Some("pattern_mismatch"));

    let bio = Component::new("bio", QuestionKind::LongText).with_constraint(Constraint {
        min_length: Some(3),
        max_length: Some(5),
        ..Constraint::default()
    });
    assert_eq!(code(&bio, json!("ab")).as_deref(), Some("min_length"));
    assert_eq!(code(&bio, json!("abcdef")).as_deref(), Some("max_length"));
    assert_eq!(code(&bio, json!("héllo")), None);
}

#[test]
fn numeric_bounds() {
    let rating = Component::new("rating", QuestionKind::Rating).with_constraint(Constraint {
        min: Some(1.0),
        max: Some(5.0),
        ..Constraint::default()
    });
    assert_eq!(code(&rating, json!(0)).as_deref(), Some("min"));
    assert_eq!(code(&rating, json!(6)).as_deref(), Some("max"));
    assert_eq!(code(&rating, json!(4.5)), None);
    assert_eq!(code(&rating, json!("4")).as_deref(), Some("type_mismatch"));
}

#[test]
fn choice_options_and_selection_counts() {
    let colors = Component::new("colors", QuestionKind::MultiChoice)
        .with_options(["red", "green", "blue"])
        .with_constraint(Constraint {
            min_selections: Some(1),
            max_selections: Some(2),
            ..Constraint::default()
        });
    assert_eq!(code(&colors, json!(["red"])), None);
    assert_eq!(code(&colors, json!(["red", "pink"])).as_deref(), Some("invalid_option"));
    assert_eq!(
        code(&colors, json!(["red", "green", "blue"])).as_deref(),
        Some("max_selections")
    );
    assert_eq!(code(&colors, json!("red")).as_deref(), Some("type_mismatch"));

    let size = Component::new("size", QuestionKind::SingleChoice).with_options(["s", "m"]);
    assert_eq!(code(&size, json!("m")), None);
    assert_eq!(code(&size, json!("xl")).as_deref(), Some("invalid_option"));
}

#[test]
fn yes_no_accepts_bool_or_words() {
    let consent = Component::new("consent", QuestionKind::YesNo);
    assert_eq!(code(&consent, json!(true)), None);
    assert_eq!(code(&consent, json!("no")), None);
    assert_eq!(code(&consent, json!("No")).as_deref(), Some("type_mismatch"));
    assert_eq!(code(&consent, json!("maybe")).as_deref(), Some("type_mismatch"));
}

#[test]
fn broken_pattern_is_ignored_at_runtime() {
    let text = Component::new("text", QuestionKind::ShortText).with_constraint(Constraint {
        pattern: Some("([a-z".into()),
        ..Constraint::default()
    });
    assert_eq!(code(&text, json!("anything")), None);
}

#[test]
fn optional_invalid_answer_still_fails_the_page() {
    let page = Page::new(
        "p1",
        vec![
            Component::new("email", QuestionKind::ShortText).with_constraint(Constraint {
                pattern: Some("@".into()),
                ..Constraint::default()
            }),
        ],
    );
    let empty = validate_page(&page, &Responses::new()).unwrap();
    assert!(empty.valid);

    let responses: Responses = [("email".to_string(), json!("nope"))].into_iter().collect();
    let result = validate_page(&page, &responses).unwrap();
    assert!(!result.valid);
    assert_eq!(result.errors[0].component_id, "email");
    assert!(result.missing_required.is_empty());
}

#[test]
fn blank_answers_count_as_missing() {
    let page = Page::new(
        "p1",
        vec![
            Component::new("name", QuestionKind::ShortText).required(),
            Component::new("tags", QuestionKind::MultiChoice)
                .with_options(["a"])
                .required(),
        ],
    );
    let responses: Responses = [
        ("name".to_string(), json!("   ")),
        ("tags".to_string(), json!([])),
    ]
    .into_iter()
    .collect();
    let result = validate_page(&page, &responses).unwrap();
    assert_eq!(result.missing_required, vec!["name", "tags"]);
    assert!(result.errors.is_empty());
}
