//! `H5P.QuestionSet` parameters and the question-set builder.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::multichoice::{AnswerOption, MultiChoiceParams};
use crate::{LibraryDependency, SchemaError};

/// Library reference used for questions added through the builder.
pub const MULTI_CHOICE_LIBRARY: &str = "H5P.MultiChoice 1.16";

/// Parameters of an `H5P.QuestionSet` content item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSet {
    /// Title shown on the intro page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Intro page text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,
    /// Whether the intro page is shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_intro_page: Option<bool>,
    /// Label of the start button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_button_text: Option<String>,
    /// `textual` or `dots`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_type: Option<String>,
    /// Percentage needed to pass the set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_percentage: Option<i64>,
    /// Background image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<BackgroundImage>,
    /// Questions in order.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Whether the result page is shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_result_page: Option<bool>,
    /// Result page message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Label of the solution button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_button_text: Option<String>,
    /// Score-banded feedback.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overall_feedback: Vec<FeedbackRange>,
    /// Keys this model does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuestionSet {
    /// Parse a question set from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] if the bytes are not a question set.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SchemaError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encode as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] if serialization fails.
    pub fn to_vec_pretty(&self) -> Result<Vec<u8>, SchemaError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// One embedded question: a library reference plus that library's params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Library reference, e.g. `H5P.MultiChoice 1.16`.
    pub library: String,
    /// Parameters for the library, opaque at this level.
    #[serde(default)]
    pub params: Value,
    /// Keys this model does not know about (`subContentId`, `metadata`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Question {
    /// Parsed library reference.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidLibraryRef`] if `library` is malformed.
    pub fn library_ref(&self) -> Result<LibraryDependency, SchemaError> {
        self.library.parse()
    }

    /// Whether the question is driven by a multiple-choice library
    /// (machine name ending in `.MultiChoice`).
    pub fn is_multi_choice(&self) -> bool {
        self.library_ref()
            .is_ok_and(|r| r.machine_name.ends_with(".MultiChoice"))
    }

    /// Params decoded as multiple choice.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] if the params do not have that shape.
    pub fn multi_choice(&self) -> Result<MultiChoiceParams, SchemaError> {
        Ok(MultiChoiceParams::deserialize(&self.params)?)
    }
}

/// Feedback for a score band of a question set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeedbackRange {
    /// Lower bound, percent.
    pub from: i64,
    /// Upper bound, percent.
    pub to: i64,
    /// Message for the band.
    #[serde(default)]
    pub text: String,
}

impl FeedbackRange {
    /// Create a band.
    pub fn new(from: i64, to: i64, text: impl Into<String>) -> Self {
        Self {
            from,
            to,
            text: text.into(),
        }
    }
}

/// Background image of a question set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    /// Path relative to the content directory.
    pub path: String,
    /// MIME type.
    pub mime: String,
    /// Copyright information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<Copyright>,
}

/// Copyright information of a media file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Copyright {
    /// Work title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Work author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// License identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// License version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Source URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Fluent builder for [`QuestionSet`].
///
/// ```
/// use h5p_schema::content::{AnswerOption, QuestionSetBuilder};
///
/// let set = QuestionSetBuilder::new()
///     .title("Geography Quiz")
///     .pass_percentage(60)
///     .add_multiple_choice(
///         "Capital of France?",
///         vec![AnswerOption::new("Paris", true), AnswerOption::new("London", false)],
///     )
///     .build()
///     .unwrap();
/// assert_eq!(set.questions.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct QuestionSetBuilder {
    set: QuestionSet,
    questions: Vec<MultiChoiceParams>,
}

impl QuestionSetBuilder {
    /// Start an empty question set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.set.title = Some(title.into());
        self
    }

    /// Set the introduction and turn the intro page on.
    pub fn introduction(mut self, introduction: impl Into<String>) -> Self {
        self.set.introduction = Some(introduction.into());
        self.set.show_intro_page = Some(true);
        self
    }

    /// Set the start button label.
    pub fn start_button_text(mut self, text: impl Into<String>) -> Self {
        self.set.start_button_text = Some(text.into());
        self
    }

    /// Set the progress indicator type.
    pub fn progress_type(mut self, progress_type: impl Into<String>) -> Self {
        self.set.progress_type = Some(progress_type.into());
        self
    }

    /// Set the pass percentage. Range is checked by validation, not here.
    pub fn pass_percentage(mut self, percentage: i64) -> Self {
        self.set.pass_percentage = Some(percentage);
        self
    }

    /// Set the background image.
    pub fn background_image(mut self, path: impl Into<String>, mime: impl Into<String>) -> Self {
        self.set.background_image = Some(BackgroundImage {
            path: path.into(),
            mime: mime.into(),
            copyright: None,
        });
        self
    }

    /// Append a multiple-choice question.
    pub fn add_multiple_choice(
        mut self,
        question: impl Into<String>,
        answers: Vec<AnswerOption>,
    ) -> Self {
        self.questions.push(MultiChoiceParams::new(question, answers));
        self
    }

    /// Append a multiple-choice question with fully specified params.
    pub fn add_multi_choice_params(mut self, params: MultiChoiceParams) -> Self {
        self.questions.push(params);
        self
    }

    /// Replace the overall feedback bands.
    pub fn overall_feedback(mut self, ranges: Vec<FeedbackRange>) -> Self {
        self.set.overall_feedback = ranges;
        self
    }

    /// Finish the set.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyQuestionSet`] if no question was added,
    /// or [`SchemaError::Json`] if a question's params cannot be encoded.
    pub fn build(self) -> Result<QuestionSet, SchemaError> {
        let Self { mut set, questions } = self;
        if questions.is_empty() {
            return Err(SchemaError::EmptyQuestionSet);
        }
        for params in questions {
            set.questions.push(Question {
                library: MULTI_CHOICE_LIBRARY.to_string(),
                params: serde_json::to_value(&params)?,
                extra: Map::new(),
            });
        }
        Ok(set)
    }
}
