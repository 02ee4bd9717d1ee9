use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleSelect,
    MultiSelect,
    Dropdown,
    SelectSingleImage,
    SelectMultiImage,
    TextQuestionShort,
    TextQuestionLong,
    Number,
    Date,
    Rating,
    MatrixSingle,
    MatrixMulti,
    QuestionGroup,
    Statement,
}

impl QuestionType {
    /// Kinds whose answer is drawn from a fixed option list. Only these may
    /// act as a condition source.
    pub fn is_enumerable(self) -> bool {
        matches!(
            self,
            QuestionType::SingleSelect
                | QuestionType::MultiSelect
                | QuestionType::Dropdown
                | QuestionType::SelectSingleImage
                | QuestionType::SelectMultiImage
        )
    }

    /// Enumerable kinds that accept more than one selected option.
    pub fn is_multi(self) -> bool {
        matches!(
            self,
            QuestionType::MultiSelect | QuestionType::SelectMultiImage
        )
    }

    /// Kinds whose options carry an image next to their text.
    pub fn is_image(self) -> bool {
        matches!(
            self,
            QuestionType::SelectSingleImage | QuestionType::SelectMultiImage
        )
    }

    /// Group headers are containers; their children are flattened into the
    /// registry and the header itself is never presented.
    pub fn is_presentable(self) -> bool {
        !matches!(self, QuestionType::QuestionGroup)
    }

    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::SingleSelect => "single_select",
            QuestionType::MultiSelect => "multi_select",
            QuestionType::Dropdown => "dropdown",
            QuestionType::SelectSingleImage => "select_single_image",
            QuestionType::SelectMultiImage => "select_multi_image",
            QuestionType::TextQuestionShort => "text_question_short",
            QuestionType::TextQuestionLong => "text_question_long",
            QuestionType::Number => "number",
            QuestionType::Date => "date",
            QuestionType::Rating => "rating",
            QuestionType::MatrixSingle => "matrix_single",
            QuestionType::MatrixMulti => "matrix_multi",
            QuestionType::QuestionGroup => "question_group",
            QuestionType::Statement => "statement",
        }
    }
}

/// One answerable option. Image options are identified by their text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum QuestionOption {
    Label(String),
    Image {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
    },
}

impl QuestionOption {
    /// Text used as the option's identity in answers and conditions.
    pub fn label(&self) -> &str {
        match self {
            QuestionOption::Label(text) => text,
            QuestionOption::Image { text, .. } => text,
        }
    }
}

/// Definition of a single question as supplied by the form editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuestionOption>,
}

impl QuestionSpec {
    /// Question without title or options.
    pub fn new(id: impl Into<String>, kind: QuestionType) -> Self {
        Self {
            id: id.into(),
            kind,
            title: None,
            options: Vec::new(),
        }
    }

    /// Replaces the options with plain labels.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|label| QuestionOption::Label(label.into()))
            .collect();
        self
    }

    /// Option labels in author order; the text projection for image kinds.
    pub fn option_labels(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(QuestionOption::label)
    }

    pub fn has_option(&self, label: &str) -> bool {
        self.option_labels().any(|candidate| candidate == label)
    }
}
