#![allow(missing_docs)]

pub mod answers;
pub mod audit;
pub mod editor;
pub mod evaluate;
pub mod ids;
pub mod progress;
pub mod registry;
pub mod spec;
pub mod validate;

pub use answers::{AnswerError, Answers, extract_answer};
pub use audit::{AuditFinding, audit};
pub use editor::{EditError, RuleEditor};
pub use evaluate::{EvaluationError, chain_holds, evaluate_rules, fold_chain, winning_rule};
pub use progress::{Navigation, Traversal, TraversalState, next_step, walk};
pub use registry::{QuestionRegistry, RegistryError};
pub use spec::{
    Condition, Operator, QuestionOption, QuestionSpec, QuestionType, Rule, RuleSet, SurveySpec,
    survey_schema,
};
pub use validate::{
    RuleIssue, RuleValidation, eligible_source_questions, eligible_target_questions, options_for,
    validate_rule,
};
