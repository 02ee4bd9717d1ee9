use uuid::Uuid;

pub const RULE_ID_PREFIX: &str = "rule-";
pub const CONDITION_ID_PREFIX: &str = "cond-";

/// Fresh identifier for a newly authored rule.
pub fn new_rule_id() -> String {
    format!("{RULE_ID_PREFIX}{}", Uuid::new_v4())
}

/// Fresh identifier for a newly authored condition.
pub fn new_condition_id() -> String {
    format!("{CONDITION_ID_PREFIX}{}", Uuid::new_v4())
}
