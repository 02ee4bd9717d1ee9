use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use branch_spec::{
    AnswerError, Answers, EvaluationError, QuestionSpec, Rule, SurveySpec, audit,
    eligible_source_questions, eligible_target_questions, next_step, options_for,
    validate_rule as check_rule, walk as walk_survey,
};

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("no survey definition supplied in config")]
    SurveyMissing,
    #[error("failed to parse survey: {0}")]
    SurveyParse(#[source] serde_json::Error),
    #[error("failed to parse rule: {0}")]
    RuleParse(#[source] serde_json::Error),
    #[error("failed to parse answers: {0}")]
    AnswersParse(#[source] serde_json::Error),
    #[error("question '{0}' is not part of the survey")]
    QuestionUnavailable(String),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error(transparent)]
    Answers(#[from] AnswerError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    survey_json: Option<String>,
}

fn load_survey(config_json: &str) -> Result<SurveySpec, ComponentError> {
    let config = if config_json.trim().is_empty() {
        ComponentConfig::default()
    } else {
        serde_json::from_str::<ComponentConfig>(config_json).map_err(ComponentError::ConfigParse)?
    };
    let survey_json = config
        .survey_json
        .as_deref()
        .ok_or(ComponentError::SurveyMissing)?;
    serde_json::from_str(survey_json).map_err(ComponentError::SurveyParse)
}

fn parse_answers(survey: &SurveySpec, answers_json: &str) -> Result<Answers, ComponentError> {
    let raw = if answers_json.trim().is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str(answers_json).map_err(ComponentError::AnswersParse)?
    };
    Ok(Answers::from_json(&survey.questions, &raw)?)
}

fn ensure_question(survey: &SurveySpec, question_id: &str) -> Result<(), ComponentError> {
    if survey.questions.contains(question_id) {
        Ok(())
    } else {
        Err(ComponentError::QuestionUnavailable(question_id.to_string()))
    }
}

fn summarize(question: &QuestionSpec) -> Value {
    json!({
        "id": question.id,
        "type": question.kind.as_str(),
        "title": question.title,
    })
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => {
            tracing::debug!(error = %err, "component call failed");
            json!({ "error": err.to_string() }).to_string()
        }
    }
}

/// Returns the parsed survey definition.
pub fn describe(config_json: &str) -> String {
    respond(load_survey(config_json).and_then(|survey| {
        serde_json::to_value(survey).map_err(ComponentError::JsonEncode)
    }))
}

/// Pick-list of questions a condition may read.
pub fn eligible_sources(config_json: &str) -> String {
    respond(load_survey(config_json).map(|survey| {
        let questions = eligible_source_questions(&survey.questions)
            .into_iter()
            .map(summarize)
            .collect::<Vec<_>>();
        json!({ "questions": questions })
    }))
}

/// Pick-list of questions a rule owned by `question_id` may jump to.
pub fn eligible_targets(config_json: &str, question_id: &str) -> String {
    respond(load_survey(config_json).and_then(|survey| {
        ensure_question(&survey, question_id)?;
        let questions = eligible_target_questions(&survey.questions, question_id)
            .into_iter()
            .map(summarize)
            .collect::<Vec<_>>();
        Ok(json!({ "owner": question_id, "questions": questions }))
    }))
}

/// Option labels for a condition source; empty disables the option picker.
pub fn options(config_json: &str, question_id: &str) -> String {
    respond(load_survey(config_json).map(|survey| {
        let options = options_for(&survey.questions, question_id);
        json!({ "question_id": question_id, "options": options })
    }))
}

/// Validates a single draft rule owned by `question_id`.
pub fn validate_rule(config_json: &str, question_id: &str, rule_json: &str) -> String {
    respond(load_survey(config_json).and_then(|survey| {
        let rule: Rule = serde_json::from_str(rule_json).map_err(ComponentError::RuleParse)?;
        let validation = check_rule(&survey.questions, question_id, &rule);
        serde_json::to_value(validation).map_err(ComponentError::JsonEncode)
    }))
}

/// Flags every stored rule that no longer holds.
pub fn audit_rules(config_json: &str) -> String {
    respond(load_survey(config_json).and_then(|survey| {
        let findings = audit(&survey.questions, &survey.rules);
        Ok(json!({
            "valid": findings.is_empty(),
            "findings": serde_json::to_value(findings).map_err(ComponentError::JsonEncode)?,
        }))
    }))
}

/// Navigation decision after `question_id` for the answers so far.
pub fn next(config_json: &str, question_id: &str, answers_json: &str) -> String {
    respond(load_survey(config_json).and_then(|survey| {
        let answers = parse_answers(&survey, answers_json)?;
        let navigation = next_step(&survey.questions, &survey.rules, question_id, &answers)?;
        serde_json::to_value(navigation).map_err(ComponentError::JsonEncode)
    }))
}

/// Full sequence of questions presented for the given answers.
pub fn walk(config_json: &str, answers_json: &str) -> String {
    respond(load_survey(config_json).and_then(|survey| {
        let answers = parse_answers(&survey, answers_json)?;
        let path = walk_survey(&survey.questions, &survey.rules, &answers)?;
        let presented = path.len();
        Ok(json!({
            "survey_id": survey.id,
            "path": path,
            "presented": presented,
            "total": survey.questions.len(),
        }))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> String {
        let survey = json!({
            "id": "s",
            "title": "S",
            "version": "1",
            "questions": [
                { "id": "A", "type": "single_select", "options": ["Yes", "No"] },
                { "id": "B", "type": "text_question_short" },
                { "id": "C", "type": "single_select", "options": ["1", "2"] }
            ],
            "rules": {
                "A": [{
                    "id": "r1",
                    "conditions": [{ "id": "c1", "source_question_id": "A", "source_option": "No" }],
                    "target_question_id": "C"
                }]
            }
        });
        json!({ "survey_json": survey.to_string() }).to_string()
    }

    fn call(response: String) -> Value {
        serde_json::from_str(&response).expect("component returns json")
    }

    #[test]
    fn missing_survey_is_reported() {
        let response = call(describe(""));
        assert_eq!(response["error"], "no survey definition supplied in config");
    }

    #[test]
    fn next_returns_jump_for_matching_answer() {
        let response = call(next(&config(), "A", r#"{"A":"No"}"#));
        assert_eq!(response, json!({ "kind": "jump", "question_id": "C" }));
        let response = call(next(&config(), "A", r#"{"A":"Yes"}"#));
        assert_eq!(response, json!({ "kind": "next", "question_id": "B" }));
    }

    #[test]
    fn next_rejects_options_not_offered() {
        let response = call(next(&config(), "A", r#"{"A":"Maybe"}"#));
        assert!(response["error"].as_str().unwrap().contains("Maybe"));
    }

    #[test]
    fn targets_exclude_owner() {
        let response = call(eligible_targets(&config(), "A"));
        let ids = response["questions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["id"].as_str().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["B", "C"]);
        assert!(call(eligible_targets(&config(), "Z"))["error"].is_string());
    }

    #[test]
    fn sources_and_options() {
        let response = call(eligible_sources(&config()));
        assert_eq!(response["questions"].as_array().unwrap().len(), 2);
        let response = call(options(&config(), "B"));
        assert_eq!(response["options"], json!([]));
    }

    #[test]
    fn validate_rule_reports_reason_codes() {
        let rule = r#"{"id":"r2","conditions":[{"id":"c1","source_question_id":"A"}]}"#;
        let response = call(validate_rule(&config(), "A", rule));
        assert_eq!(response["valid"], false);
        let codes = response["reasons"]
            .as_array()
            .unwrap()
            .iter()
            .map(|reason| reason["code"].as_str().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(codes, vec!["missing_target", "unselected_option"]);
    }

    #[test]
    fn walk_and_audit() {
        let response = call(walk(&config(), r#"{"A":"No"}"#));
        assert_eq!(response["path"], json!(["A", "C"]));
        let response = call(audit_rules(&config()));
        assert_eq!(response["valid"], true);
    }
}
