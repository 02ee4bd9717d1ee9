use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::question::QuestionSpec;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("question id '{0}' is used more than once")]
    DuplicateQuestionId(String),
    #[error("question '{question_id}' lists option '{option}' more than once")]
    DuplicateOption { question_id: String, option: String },
    #[error("question id cannot be empty")]
    EmptyQuestionId,
}

/// Ordered, read-only view over the survey's questions. Registry order is the
/// only basis for "before" and "after".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<QuestionSpec>", into = "Vec<QuestionSpec>")]
pub struct QuestionRegistry {
    questions: Vec<QuestionSpec>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl QuestionRegistry {
    pub fn new(questions: Vec<QuestionSpec>) -> Result<Self, RegistryError> {
        let mut positions = HashMap::with_capacity(questions.len());
        for (index, question) in questions.iter().enumerate() {
            if question.id.is_empty() {
                return Err(RegistryError::EmptyQuestionId);
            }
            if positions.insert(question.id.clone(), index).is_some() {
                return Err(RegistryError::DuplicateQuestionId(question.id.clone()));
            }
            let mut seen = BTreeSet::new();
            for label in question.option_labels() {
                if !seen.insert(label) {
                    return Err(RegistryError::DuplicateOption {
                        question_id: question.id.clone(),
                        option: label.to_string(),
                    });
                }
            }
        }
        Ok(Self {
            questions,
            positions,
        })
    }

    pub fn questions(&self) -> &[QuestionSpec] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn position(&self, question_id: &str) -> Option<usize> {
        self.positions.get(question_id).copied()
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.positions.contains_key(question_id)
    }

    pub fn get(&self, question_id: &str) -> Option<&QuestionSpec> {
        self.position(question_id)
            .and_then(|index| self.questions.get(index))
    }

    /// First question a respondent is shown.
    pub fn first_presentable(&self) -> Option<&QuestionSpec> {
        self.questions
            .iter()
            .find(|question| question.kind.is_presentable())
    }

    /// The next presentable question after `question_id` in registry order.
    pub fn successor(&self, question_id: &str) -> Option<&QuestionSpec> {
        let position = self.position(question_id)?;
        self.questions[position + 1..]
            .iter()
            .find(|question| question.kind.is_presentable())
    }

    /// Returns a copy without `question_id`, as after an external deletion.
    pub fn without(&self, question_id: &str) -> Self {
        let questions = self
            .questions
            .iter()
            .filter(|question| question.id != question_id)
            .cloned()
            .collect::<Vec<_>>();
        let positions = questions
            .iter()
            .enumerate()
            .map(|(index, question)| (question.id.clone(), index))
            .collect();
        Self {
            questions,
            positions,
        }
    }
}

impl TryFrom<Vec<QuestionSpec>> for QuestionRegistry {
    type Error = RegistryError;

    fn try_from(questions: Vec<QuestionSpec>) -> Result<Self, Self::Error> {
        Self::new(questions)
    }
}

impl From<QuestionRegistry> for Vec<QuestionSpec> {
    fn from(registry: QuestionRegistry) -> Self {
        registry.questions
    }
}

impl JsonSchema for QuestionRegistry {
    fn schema_name() -> Cow<'static, str> {
        "QuestionRegistry".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        <Vec<QuestionSpec>>::json_schema(generator)
    }
}
