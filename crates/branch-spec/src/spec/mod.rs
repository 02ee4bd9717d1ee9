pub mod question;
pub mod rule;
pub mod survey;

pub use question::{QuestionOption, QuestionSpec, QuestionType};
pub use rule::{Condition, Operator, Rule, RuleSet};
pub use survey::{SurveySpec, survey_schema};
