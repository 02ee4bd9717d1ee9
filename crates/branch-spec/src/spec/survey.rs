use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_cbor::{to_vec, value::to_value};

use crate::registry::QuestionRegistry;
use crate::spec::rule::RuleSet;

/// Stored survey definition: the ordered questions and every branching rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SurveySpec {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: QuestionRegistry,
    #[serde(default, skip_serializing_if = "RuleSet::is_empty")]
    pub rules: RuleSet,
}

impl SurveySpec {
    /// Serializes the survey as canonical CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        let canonical = to_value(self)?;
        to_vec(&canonical)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, serde_cbor::Error> {
        serde_cbor::from_slice(bytes)
    }
}

/// JSON schema describing a stored survey definition.
pub fn survey_schema() -> Schema {
    schema_for!(SurveySpec)
}
