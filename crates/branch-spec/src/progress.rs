use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answers::Answers;
use crate::evaluate::{EvaluationError, evaluate_rules};
use crate::registry::QuestionRegistry;
use crate::spec::rule::RuleSet;

/// What the respondent sees after the current question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Navigation {
    /// A rule fired; questions in between are skipped.
    Jump { question_id: String },
    /// No rule fired; continue with the immediate successor.
    Next { question_id: String },
    End,
}

impl Navigation {
    pub fn question_id(&self) -> Option<&str> {
        match self {
            Navigation::Jump { question_id } | Navigation::Next { question_id } => {
                Some(question_id)
            }
            Navigation::End => None,
        }
    }
}

/// One navigation step from `question_id`.
///
/// Rules that cannot be followed (dangling or backward targets) are logged
/// and treated as not firing. Only an unknown current question is an error.
/// The result depends on nothing but the inputs, so repeated calls agree.
pub fn next_step(
    registry: &QuestionRegistry,
    rules: &RuleSet,
    question_id: &str,
    answers: &Answers,
) -> Result<Navigation, EvaluationError> {
    match evaluate_rules(registry, rules, question_id, answers) {
        Ok(Some(target)) => {
            return Ok(Navigation::Jump {
                question_id: target.to_string(),
            });
        }
        Ok(None) => {}
        Err(err @ EvaluationError::UnknownQuestion(_)) => return Err(err),
        Err(err) => {
            tracing::warn!(question = question_id, error = %err, "ignoring unusable branch rule");
        }
    }

    Ok(match registry.successor(question_id) {
        Some(next) => Navigation::Next {
            question_id: next.id.clone(),
        },
        None => Navigation::End,
    })
}

/// Position of a respondent in the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TraversalState {
    AtQuestion { question_id: String },
    AtEnd,
}

/// Forward-only walk through a survey, re-evaluated one step at a time so
/// that later answers still influence branches not yet reached.
#[derive(Debug, Clone)]
pub struct Traversal<'a> {
    registry: &'a QuestionRegistry,
    rules: &'a RuleSet,
    state: TraversalState,
}

impl<'a> Traversal<'a> {
    pub fn start(registry: &'a QuestionRegistry, rules: &'a RuleSet) -> Self {
        let state = match registry.first_presentable() {
            Some(question) => TraversalState::AtQuestion {
                question_id: question.id.clone(),
            },
            None => TraversalState::AtEnd,
        };
        Self {
            registry,
            rules,
            state,
        }
    }

    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    pub fn current(&self) -> Option<&str> {
        match &self.state {
            TraversalState::AtQuestion { question_id } => Some(question_id),
            TraversalState::AtEnd => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == TraversalState::AtEnd
    }

    /// Moves past the current question using the answers recorded so far.
    pub fn advance(&mut self, answers: &Answers) -> Result<&TraversalState, EvaluationError> {
        if let TraversalState::AtQuestion { question_id } = &self.state {
            let navigation = next_step(self.registry, self.rules, question_id, answers)?;
            self.state = match navigation.question_id() {
                Some(next) => self.land_on(next),
                None => TraversalState::AtEnd,
            };
        }
        Ok(&self.state)
    }

    /// A jump may name a group header, which is never presented; the
    /// respondent lands on the first presentable question after it.
    fn land_on(&self, question_id: &str) -> TraversalState {
        let presentable = self
            .registry
            .get(question_id)
            .is_some_and(|question| question.kind.is_presentable());
        if presentable {
            return TraversalState::AtQuestion {
                question_id: question_id.to_string(),
            };
        }
        match self.registry.successor(question_id) {
            Some(next) => TraversalState::AtQuestion {
                question_id: next.id.clone(),
            },
            None => TraversalState::AtEnd,
        }
    }
}

/// Questions presented to a respondent whose final answers are `answers`, in
/// order. Terminates because every step moves strictly forward.
pub fn walk(
    registry: &QuestionRegistry,
    rules: &RuleSet,
    answers: &Answers,
) -> Result<Vec<String>, EvaluationError> {
    let mut traversal = Traversal::start(registry, rules);
    let mut path = Vec::new();
    while let Some(current) = traversal.current() {
        path.push(current.to_string());
        traversal.advance(answers)?;
    }
    Ok(path)
}
