use thiserror::Error;

use crate::answers::Answers;
use crate::registry::QuestionRegistry;
use crate::spec::rule::{Condition, Operator, Rule, RuleSet};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("question '{0}' is not in the registry")]
    UnknownQuestion(String),
    #[error("rule '{rule_id}' targets '{target}', which no longer exists")]
    DanglingTarget { rule_id: String, target: String },
    #[error("rule '{rule_id}' targets '{target}', which is not after '{owner}'")]
    BackwardTarget {
        rule_id: String,
        owner: String,
        target: String,
    },
}

/// Folds `(value, operator)` pairs strictly left to right. The first
/// operator is ignored; there is no AND-before-OR precedence.
pub fn fold_chain<I>(chain: I) -> bool
where
    I: IntoIterator<Item = (bool, Operator)>,
{
    let mut chain = chain.into_iter();
    let Some((first, _)) = chain.next() else {
        return false;
    };
    chain.fold(first, |acc, (value, operator)| operator.apply(acc, value))
}

/// Truth value of one condition. Unset parts, unanswered sources and sources
/// that no longer resolve to a selectable question are all false.
pub fn condition_holds(
    registry: &QuestionRegistry,
    condition: &Condition,
    answers: &Answers,
) -> bool {
    let (Some(source), Some(option)) = (condition.source(), condition.chosen_option()) else {
        return false;
    };
    let resolvable = registry
        .get(source)
        .is_some_and(|question| question.kind.is_enumerable());
    resolvable && answers.includes(source, option)
}

/// Evaluates a rule's condition chain. A rule without conditions never fires.
pub fn chain_holds(registry: &QuestionRegistry, rule: &Rule, answers: &Answers) -> bool {
    fold_chain(rule.conditions.iter().map(|condition| {
        (
            condition_holds(registry, condition, answers),
            condition.operator,
        )
    }))
}

/// First rule of `question_id` (in authored order) whose chain holds.
pub fn winning_rule<'a>(
    registry: &QuestionRegistry,
    rules: &'a RuleSet,
    question_id: &str,
    answers: &Answers,
) -> Option<&'a Rule> {
    rules
        .rules_for(question_id)
        .iter()
        .find(|rule| chain_holds(registry, rule, answers))
}

/// Decides whether a rule of `question_id` fires and returns its target.
///
/// `Ok(None)` means no rule fired. A winning rule whose target is gone from
/// the registry, or no longer after the current question, is an error the
/// caller is expected to recover from.
pub fn evaluate_rules<'a>(
    registry: &'a QuestionRegistry,
    rules: &RuleSet,
    question_id: &str,
    answers: &Answers,
) -> Result<Option<&'a str>, EvaluationError> {
    let current = registry
        .position(question_id)
        .ok_or_else(|| EvaluationError::UnknownQuestion(question_id.to_string()))?;

    let Some(rule) = winning_rule(registry, rules, question_id, answers) else {
        return Ok(None);
    };
    // A winning rule without a target cannot jump anywhere.
    let Some(target) = rule.target() else {
        return Ok(None);
    };

    let Some(target_pos) = registry.position(target) else {
        return Err(EvaluationError::DanglingTarget {
            rule_id: rule.id.clone(),
            target: target.to_string(),
        });
    };
    if target_pos <= current {
        return Err(EvaluationError::BackwardTarget {
            rule_id: rule.id.clone(),
            owner: question_id.to_string(),
            target: target.to_string(),
        });
    }

    tracing::debug!(question = question_id, rule = %rule.id, jump_to = target, "branch rule fired");
    Ok(Some(registry.questions()[target_pos].id.as_str()))
}
