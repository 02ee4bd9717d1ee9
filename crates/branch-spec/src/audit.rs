use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::registry::QuestionRegistry;
use crate::spec::rule::RuleSet;
use crate::validate::{RuleIssue, validate_rule};

/// Problem found on a stored rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AuditFinding {
    pub owner: String,
    pub rule_id: String,
    pub issue: RuleIssue,
}

/// Flags every stored rule that no longer holds against the registry, such as
/// conditions left dangling after a question was deleted or changed type.
pub fn audit(registry: &QuestionRegistry, rules: &RuleSet) -> Vec<AuditFinding> {
    rules
        .iter()
        .flat_map(|(owner, owned)| owned.iter().map(move |rule| (owner, rule)))
        .flat_map(|(owner, rule)| {
            validate_rule(registry, owner, rule)
                .reasons
                .into_iter()
                .map(move |issue| AuditFinding {
                    owner: owner.to_string(),
                    rule_id: rule.id.clone(),
                    issue,
                })
        })
        .collect()
}
