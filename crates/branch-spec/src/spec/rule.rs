use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids;
use crate::registry::QuestionRegistry;

/// How a condition combines with the running result of the conditions
/// before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    #[default]
    And,
    Or,
}

impl Operator {
    pub fn apply(self, acc: bool, value: bool) -> bool {
        match self {
            Operator::And => acc && value,
            Operator::Or => acc || value,
        }
    }
}

/// "The answer to `source_question_id` includes `source_option`".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Condition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_question_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_option: Option<String>,
    /// Ignored on the first condition of a rule.
    #[serde(default)]
    pub operator: Operator,
}

impl Condition {
    /// A condition with no source and no option, as created by the editor.
    pub fn blank() -> Self {
        Self {
            id: ids::new_condition_id(),
            source_question_id: None,
            source_option: None,
            operator: Operator::And,
        }
    }

    pub fn new(
        id: impl Into<String>,
        source_question_id: impl Into<String>,
        source_option: impl Into<String>,
        operator: Operator,
    ) -> Self {
        Self {
            id: id.into(),
            source_question_id: Some(source_question_id.into()),
            source_option: Some(source_option.into()),
            operator,
        }
    }

    /// Chosen option, treating an empty string as unset.
    pub fn chosen_option(&self) -> Option<&str> {
        self.source_option
            .as_deref()
            .filter(|option| !option.is_empty())
    }

    pub fn source(&self) -> Option<&str> {
        self.source_question_id
            .as_deref()
            .filter(|source| !source.is_empty())
    }
}

/// "If the condition chain holds, jump to `target_question_id`".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Rule {
    pub id: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_question_id: Option<String>,
}

impl Rule {
    /// A fresh rule: one blank condition and no target.
    pub fn blank() -> Self {
        Self {
            id: ids::new_rule_id(),
            conditions: vec![Condition::blank()],
            target_question_id: None,
        }
    }

    pub fn new(
        id: impl Into<String>,
        conditions: Vec<Condition>,
        target_question_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            conditions,
            target_question_id: Some(target_question_id.into()),
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.target_question_id
            .as_deref()
            .filter(|target| !target.is_empty())
    }

    pub fn condition(&self, condition_id: &str) -> Option<&Condition> {
        self.conditions
            .iter()
            .find(|condition| condition.id == condition_id)
    }

    pub fn condition_mut(&mut self, condition_id: &str) -> Option<&mut Condition> {
        self.conditions
            .iter_mut()
            .find(|condition| condition.id == condition_id)
    }
}

/// All rules of a survey keyed by the question that owns them. Rules keep
/// their authored order, which is the evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<String, Vec<Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules_for(&self, question_id: &str) -> &[Rule] {
        self.rules
            .get(question_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn push(&mut self, owner: impl Into<String>, rule: Rule) {
        self.rules.entry(owner.into()).or_default().push(rule);
    }

    /// Replaces the owner's rules; an empty list removes the entry.
    pub fn replace(&mut self, owner: impl Into<String>, rules: Vec<Rule>) {
        let owner = owner.into();
        if rules.is_empty() {
            self.rules.remove(&owner);
        } else {
            self.rules.insert(owner, rules);
        }
    }

    pub fn remove_owner(&mut self, owner: &str) -> Vec<Rule> {
        self.rules.remove(owner).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.rules
            .iter()
            .map(|(owner, rules)| (owner.as_str(), rules.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Destroys rules whose owning or target question no longer exists in
    /// the registry. Returns the removed rule ids.
    pub fn prune_orphans(&mut self, registry: &QuestionRegistry) -> Vec<String> {
        let mut removed = Vec::new();
        self.rules.retain(|owner, rules| {
            if !registry.contains(owner) {
                removed.extend(rules.iter().map(|rule| rule.id.clone()));
                return false;
            }
            rules.retain(|rule| match rule.target() {
                Some(target) if !registry.contains(target) => {
                    removed.push(rule.id.clone());
                    false
                }
                _ => true,
            });
            !rules.is_empty()
        });
        removed
    }
}
