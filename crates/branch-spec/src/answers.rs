use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::registry::QuestionRegistry;
use crate::spec::question::QuestionSpec;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerError {
    #[error("answers must be a JSON object keyed by question id")]
    NotAnObject,
    #[error("question '{question_id}' of type {kind} has no selectable options")]
    NotEnumerable {
        question_id: String,
        kind: &'static str,
    },
    #[error("question '{question_id}' expects {expected}")]
    TypeMismatch {
        question_id: String,
        expected: &'static str,
    },
    #[error("question '{question_id}' has no option '{option}'")]
    UnknownOption { question_id: String, option: String },
}

/// Selected option labels recorded per question. A single-select answer is a
/// one-element set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Answers {
    selections: BTreeMap<String, BTreeSet<String>>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (or overwrites) the selection for a question.
    pub fn record<I, S>(&mut self, question_id: impl Into<String>, selected: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selections.insert(
            question_id.into(),
            selected.into_iter().map(Into::into).collect(),
        );
    }

    pub fn with<I, S>(mut self, question_id: impl Into<String>, selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record(question_id, selected);
        self
    }

    pub fn clear(&mut self, question_id: &str) {
        self.selections.remove(question_id);
    }

    pub fn selected(&self, question_id: &str) -> Option<&BTreeSet<String>> {
        self.selections.get(question_id)
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.selections.contains_key(question_id)
    }

    pub fn includes(&self, question_id: &str, option: &str) -> bool {
        self.selected(question_id)
            .is_some_and(|selected| selected.contains(option))
    }

    /// Extracts selections from a raw answers object as produced by the
    /// rendering runtime. Unknown and non-enumerable questions are skipped
    /// since they can never drive a condition; `null` means unanswered.
    pub fn from_json(registry: &QuestionRegistry, raw: &Value) -> Result<Self, AnswerError> {
        let object = raw.as_object().ok_or(AnswerError::NotAnObject)?;
        let mut answers = Answers::new();
        for (question_id, value) in object {
            let Some(question) = registry.get(question_id) else {
                continue;
            };
            if !question.kind.is_enumerable() || value.is_null() {
                continue;
            }
            let selected = extract_answer(question, value)?;
            answers.selections.insert(question_id.clone(), selected);
        }
        Ok(answers)
    }
}

/// Reads the selected option labels out of one raw answer value according to
/// the question's type.
pub fn extract_answer(
    question: &QuestionSpec,
    value: &Value,
) -> Result<BTreeSet<String>, AnswerError> {
    if !question.kind.is_enumerable() {
        return Err(AnswerError::NotEnumerable {
            question_id: question.id.clone(),
            kind: question.kind.as_str(),
        });
    }
    if value.is_null() {
        return Ok(BTreeSet::new());
    }

    let labels = if question.kind.is_multi() {
        let items = value.as_array().ok_or_else(|| AnswerError::TypeMismatch {
            question_id: question.id.clone(),
            expected: "an array of options",
        })?;
        items
            .iter()
            .map(|item| option_label(question, item))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        vec![option_label(question, value)?]
    };

    let mut selected = BTreeSet::new();
    for label in labels {
        if !question.has_option(label) {
            return Err(AnswerError::UnknownOption {
                question_id: question.id.clone(),
                option: label.to_string(),
            });
        }
        selected.insert(label.to_string());
    }
    Ok(selected)
}

fn option_label<'a>(question: &QuestionSpec, value: &'a Value) -> Result<&'a str, AnswerError> {
    let label = match value {
        Value::String(text) => Some(text.as_str()),
        Value::Object(map) if question.kind.is_image() => map.get("text").and_then(Value::as_str),
        _ => None,
    };
    label.ok_or_else(|| AnswerError::TypeMismatch {
        question_id: question.id.clone(),
        expected: if question.kind.is_image() {
            "an option label or an object with a `text` label"
        } else {
            "an option label"
        },
    })
}
