use thiserror::Error;

use crate::registry::QuestionRegistry;
use crate::spec::rule::{Condition, Operator, Rule, RuleSet};
use crate::validate::{
    RuleValidation, eligible_target_questions, options_for, validate_rule,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("question '{0}' is not in the registry")]
    UnknownOwner(String),
    #[error("rule '{0}' is not part of this rule set")]
    UnknownRule(String),
    #[error("condition '{condition_id}' is not part of rule '{rule_id}'")]
    UnknownCondition {
        rule_id: String,
        condition_id: String,
    },
    #[error("rule '{0}' must keep at least one condition")]
    LastCondition(String),
    #[error("question '{0}' cannot be used as a condition source")]
    IneligibleSource(String),
    #[error("condition '{0}' needs a source question before an option can be chosen")]
    SourceNotSet(String),
    #[error("question '{question_id}' has no option '{option}'")]
    UnknownOption { question_id: String, option: String },
    #[error("question '{target}' is not after '{owner}' and cannot be a target")]
    IneligibleTarget { owner: String, target: String },
    #[error("rules {0:?} are not valid; fix them before saving")]
    InvalidRules(Vec<String>),
}

/// Working copy of one question's rules. Nothing reaches the stored rule set
/// until `save` succeeds.
#[derive(Debug, Clone)]
pub struct RuleEditor<'a> {
    registry: &'a QuestionRegistry,
    owner: String,
    rules: Vec<Rule>,
}

impl<'a> RuleEditor<'a> {
    pub fn open(
        registry: &'a QuestionRegistry,
        owner: &str,
        stored: &RuleSet,
    ) -> Result<Self, EditError> {
        if !registry.contains(owner) {
            return Err(EditError::UnknownOwner(owner.to_string()));
        }
        Ok(Self {
            registry,
            owner: owner.to_string(),
            rules: stored.rules_for(owner).to_vec(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == rule_id)
    }

    /// Appends a rule with one blank condition and no target; returns its id.
    pub fn add_rule(&mut self) -> String {
        let rule = Rule::blank();
        let id = rule.id.clone();
        self.rules.push(rule);
        id
    }

    pub fn remove_rule(&mut self, rule_id: &str) -> Result<Rule, EditError> {
        let index = self
            .rules
            .iter()
            .position(|rule| rule.id == rule_id)
            .ok_or_else(|| EditError::UnknownRule(rule_id.to_string()))?;
        Ok(self.rules.remove(index))
    }

    /// Appends a blank `AND` condition; returns its id.
    pub fn add_condition(&mut self, rule_id: &str) -> Result<String, EditError> {
        let rule = self.rule_mut(rule_id)?;
        let condition = Condition::blank();
        let id = condition.id.clone();
        rule.conditions.push(condition);
        Ok(id)
    }

    pub fn remove_condition(
        &mut self,
        rule_id: &str,
        condition_id: &str,
    ) -> Result<Condition, EditError> {
        let rule = self.rule_mut(rule_id)?;
        let index = rule
            .conditions
            .iter()
            .position(|condition| condition.id == condition_id)
            .ok_or_else(|| EditError::UnknownCondition {
                rule_id: rule_id.to_string(),
                condition_id: condition_id.to_string(),
            })?;
        if rule.conditions.len() == 1 {
            return Err(EditError::LastCondition(rule_id.to_string()));
        }
        Ok(rule.conditions.remove(index))
    }

    /// Points a condition at a new source question and clears its option.
    pub fn set_condition_source(
        &mut self,
        rule_id: &str,
        condition_id: &str,
        question_id: &str,
    ) -> Result<(), EditError> {
        let eligible = self
            .registry
            .get(question_id)
            .is_some_and(|question| question.kind.is_enumerable());
        if !eligible {
            return Err(EditError::IneligibleSource(question_id.to_string()));
        }
        let condition = self.condition_mut(rule_id, condition_id)?;
        if condition.source() != Some(question_id) {
            condition.source_question_id = Some(question_id.to_string());
            condition.source_option = None;
        }
        Ok(())
    }

    pub fn set_condition_option(
        &mut self,
        rule_id: &str,
        condition_id: &str,
        option: &str,
    ) -> Result<(), EditError> {
        let registry = self.registry;
        let condition = self.condition_mut(rule_id, condition_id)?;
        let source = condition
            .source()
            .ok_or_else(|| EditError::SourceNotSet(condition_id.to_string()))?
            .to_string();
        if !options_for(registry, &source)
            .iter()
            .any(|candidate| candidate == option)
        {
            return Err(EditError::UnknownOption {
                question_id: source,
                option: option.to_string(),
            });
        }
        condition.source_option = Some(option.to_string());
        Ok(())
    }

    pub fn set_condition_operator(
        &mut self,
        rule_id: &str,
        condition_id: &str,
        operator: Operator,
    ) -> Result<(), EditError> {
        self.condition_mut(rule_id, condition_id)?.operator = operator;
        Ok(())
    }

    pub fn set_target(&mut self, rule_id: &str, target: &str) -> Result<(), EditError> {
        let eligible = eligible_target_questions(self.registry, &self.owner)
            .iter()
            .any(|question| question.id == target);
        if !eligible {
            return Err(EditError::IneligibleTarget {
                owner: self.owner.clone(),
                target: target.to_string(),
            });
        }
        self.rule_mut(rule_id)?.target_question_id = Some(target.to_string());
        Ok(())
    }

    /// Validation of every rule in the working copy, in authored order.
    pub fn validate(&self) -> Vec<(String, RuleValidation)> {
        self.rules
            .iter()
            .map(|rule| {
                (
                    rule.id.clone(),
                    validate_rule(self.registry, &self.owner, rule),
                )
            })
            .collect()
    }

    /// Commits the working copy into `stored` when every rule is valid.
    /// On failure `stored` is left untouched.
    pub fn save(self, stored: &mut RuleSet) -> Result<(), EditError> {
        let invalid = self
            .validate()
            .into_iter()
            .filter(|(_, validation)| !validation.valid)
            .map(|(rule_id, _)| rule_id)
            .collect::<Vec<_>>();
        if !invalid.is_empty() {
            return Err(EditError::InvalidRules(invalid));
        }
        tracing::debug!(owner = %self.owner, rules = self.rules.len(), "saving branch rules");
        stored.replace(self.owner, self.rules);
        Ok(())
    }

    fn rule_mut(&mut self, rule_id: &str) -> Result<&mut Rule, EditError> {
        self.rules
            .iter_mut()
            .find(|rule| rule.id == rule_id)
            .ok_or_else(|| EditError::UnknownRule(rule_id.to_string()))
    }

    fn condition_mut(
        &mut self,
        rule_id: &str,
        condition_id: &str,
    ) -> Result<&mut Condition, EditError> {
        self.rule_mut(rule_id)?
            .condition_mut(condition_id)
            .ok_or_else(|| EditError::UnknownCondition {
                rule_id: rule_id.to_string(),
                condition_id: condition_id.to_string(),
            })
    }
}
