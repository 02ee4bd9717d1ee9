use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::QuestionRegistry;
use crate::spec::question::QuestionSpec;
use crate::spec::rule::Rule;

/// Reasons a rule cannot be saved.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RuleIssue {
    #[error("owning question '{owner}' does not exist")]
    OwnerMissing { owner: String },
    #[error("rule has no target question")]
    MissingTarget,
    #[error("rule has no conditions")]
    EmptyConditionSet,
    #[error("condition '{condition_id}' has no source question")]
    UnsetConditionSource { condition_id: String },
    #[error("condition '{condition_id}' references '{question_id}', which is missing or not selectable")]
    DanglingConditionSource {
        condition_id: String,
        question_id: String,
    },
    #[error("condition '{condition_id}' has no option selected")]
    UnselectedOption { condition_id: String },
    #[error("condition '{condition_id}' selects '{option}', which '{question_id}' no longer offers")]
    UnknownOption {
        condition_id: String,
        question_id: String,
        option: String,
    },
    #[error("target question '{target}' does not exist")]
    DanglingTarget { target: String },
    #[error("target question '{target}' is not after the owning question")]
    TargetNotAfterOwner { target: String },
}

/// Outcome of `validate_rule`; `valid` is true exactly when `reasons` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RuleValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<RuleIssue>,
}

impl RuleValidation {
    fn from_reasons(reasons: Vec<RuleIssue>) -> Self {
        Self {
            valid: reasons.is_empty(),
            reasons,
        }
    }
}

/// Questions that may be picked as a condition source: every enumerable
/// question in the survey, regardless of its position relative to the owner.
pub fn eligible_source_questions(registry: &QuestionRegistry) -> Vec<&QuestionSpec> {
    registry
        .questions()
        .iter()
        .filter(|question| question.kind.is_enumerable())
        .collect()
}

/// Questions that may be picked as a jump target from `owning_question_id`:
/// those strictly after it. Unknown owners get no targets.
pub fn eligible_target_questions<'a>(
    registry: &'a QuestionRegistry,
    owning_question_id: &str,
) -> Vec<&'a QuestionSpec> {
    match registry.position(owning_question_id) {
        Some(position) => registry.questions()[position + 1..].iter().collect(),
        None => Vec::new(),
    }
}

/// Option labels offered by a condition source; empty when the question is
/// unknown or not enumerable.
pub fn options_for(registry: &QuestionRegistry, question_id: &str) -> Vec<String> {
    registry
        .get(question_id)
        .filter(|question| question.kind.is_enumerable())
        .map(|question| question.option_labels().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Checks a rule owned by `owning_question_id` against the registry. Every
/// problem is reported.
pub fn validate_rule(
    registry: &QuestionRegistry,
    owning_question_id: &str,
    rule: &Rule,
) -> RuleValidation {
    let mut reasons = Vec::new();

    if !registry.contains(owning_question_id) {
        reasons.push(RuleIssue::OwnerMissing {
            owner: owning_question_id.to_string(),
        });
    }

    match rule.target() {
        None => reasons.push(RuleIssue::MissingTarget),
        Some(target) => match (
            registry.position(target),
            registry.position(owning_question_id),
        ) {
            (None, _) => reasons.push(RuleIssue::DanglingTarget {
                target: target.to_string(),
            }),
            (Some(target_pos), Some(owner_pos)) if target_pos <= owner_pos => {
                reasons.push(RuleIssue::TargetNotAfterOwner {
                    target: target.to_string(),
                })
            }
            _ => {}
        },
    }

    if rule.conditions.is_empty() {
        reasons.push(RuleIssue::EmptyConditionSet);
    }

    for condition in &rule.conditions {
        let Some(source_id) = condition.source() else {
            reasons.push(RuleIssue::UnsetConditionSource {
                condition_id: condition.id.clone(),
            });
            continue;
        };
        let source = registry
            .get(source_id)
            .filter(|question| question.kind.is_enumerable());
        let Some(source) = source else {
            reasons.push(RuleIssue::DanglingConditionSource {
                condition_id: condition.id.clone(),
                question_id: source_id.to_string(),
            });
            continue;
        };
        match condition.chosen_option() {
            None => reasons.push(RuleIssue::UnselectedOption {
                condition_id: condition.id.clone(),
            }),
            Some(option) if !source.has_option(option) => {
                reasons.push(RuleIssue::UnknownOption {
                    condition_id: condition.id.clone(),
                    question_id: source_id.to_string(),
                    option: option.to_string(),
                })
            }
            Some(_) => {}
        }
    }

    RuleValidation::from_reasons(reasons)
}
