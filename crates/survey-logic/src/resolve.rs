use crate::condition::evaluate;
use crate::error::LogicError;
use crate::model::rule::{Combinator, Rule};
use crate::responses::Responses;

/// Resolves a rule to a boolean.
///
/// An empty rule is `true`. Conditions run in declared order and stop at the first deciding
/// result, so an invalid condition is only reported when evaluation reaches it.
pub fn resolve(rule: &Rule, responses: &Responses) -> Result<bool, LogicError> {
    match rule.combinator {
        Combinator::And => {
            for condition in &rule.conditions {
                if !evaluate(condition, responses)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Combinator::Or => {
            if rule.conditions.is_empty() {
                return Ok(true);
            }
            for condition in &rule.conditions {
                if evaluate(condition, responses)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

/// Resolves an optional rule; components or pages without one always pass.
pub fn resolve_optional(rule: Option<&Rule>, responses: &Responses) -> Result<bool, LogicError> {
    match rule {
        Some(rule) => resolve(rule, responses),
        None => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rule::{Condition, Operator};
    use serde_json::json;

    fn responses() -> Responses {
        [("q1", json!("yes")), ("q2", json!(5))].into_iter().collect()
    }

    fn bogus() -> Condition {
        Condition::new("q1", Operator::from("regex".to_string()), json!("x"))
    }

    #[test]
    fn empty_rules_resolve_true() {
        assert!(resolve(&Rule::all(vec![]), &responses()).unwrap());
        assert!(resolve(&Rule::any(vec![]), &responses()).unwrap());
        assert!(resolve_optional(None, &responses()).unwrap());
    }

    #[test]
    fn and_short_circuits_before_invalid_condition() {
        let rule = Rule::all(vec![
            Condition::new("q1", Operator::Equals, json!("no")),
            bogus(),
        ]);
        assert!(!resolve(&rule, &responses()).unwrap());
    }

    #[test]
    fn or_short_circuits_before_invalid_condition() {
        let rule = Rule::any(vec![
            Condition::new("q2", Operator::GreaterThan, json!(1)),
            bogus(),
        ]);
        assert!(resolve(&rule, &responses()).unwrap());
    }

    #[test]
    fn invalid_condition_reached_is_reported() {
        let rule = Rule::all(vec![
            Condition::new("q1", Operator::Equals, json!("yes")),
            bogus(),
        ]);
        assert!(resolve(&rule, &responses()).is_err());
    }
}
