//! `H5P.MultiChoice` parameters

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters of an `H5P.MultiChoice` content item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MultiChoiceParams {
    /// Optional media shown above the question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Value>,
    /// Question text (HTML allowed).
    #[serde(default)]
    pub question: String,
    /// Answer options in display order.
    #[serde(default)]
    pub answers: Vec<AnswerOption>,
    /// Score-banded feedback.
    #[serde(
        default,
        rename = "overallFeedback",
        skip_serializing_if = "Option::is_none"
    )]
    pub overall_feedback: Option<OverallFeedback>,
    /// Behaviour flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behaviour: Option<Behaviour>,
    /// User-interface translations.
    #[serde(default, rename = "UI", skip_serializing_if = "Option::is_none")]
    pub ui: Option<Value>,
    /// Keys this model does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MultiChoiceParams {
    /// Question with the given answers and nothing else set.
    pub fn new(question: impl Into<String>, answers: Vec<AnswerOption>) -> Self {
        Self {
            question: question.into(),
            answers,
            ..Self::default()
        }
    }

    /// Number of answers marked correct.
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.correct).count()
    }
}

/// A single answer choice.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    /// Answer text.
    #[serde(default)]
    pub text: String,
    /// Whether choosing this answer is correct.
    #[serde(default)]
    pub correct: bool,
    /// Per-answer tip and feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips_and_feedback: Option<TipsAndFeedback>,
}

impl AnswerOption {
    /// Answer without feedback.
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            text: text.into(),
            correct,
            tips_and_feedback: None,
        }
    }

    /// Answer with feedback shown when it is chosen.
    pub fn with_feedback(text: impl Into<String>, correct: bool, feedback: impl Into<String>) -> Self {
        Self {
            tips_and_feedback: Some(TipsAndFeedback {
                chosen_feedback: Some(feedback.into()),
                ..TipsAndFeedback::default()
            }),
            ..Self::new(text, correct)
        }
    }
}

/// Hints and feedback attached to an answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipsAndFeedback {
    /// Tip shown before answering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    /// Feedback shown when the answer was chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_feedback: Option<String>,
    /// Feedback shown when the answer was not chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_chosen_feedback: Option<String>,
}

/// Wrapper group around the feedback ranges (mirrors the semantics nesting).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OverallFeedback {
    /// Score bands.
    #[serde(default, rename = "overallFeedback")]
    pub ranges: Vec<ScoreFeedback>,
}

/// Feedback for a score band of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreFeedback {
    /// Lower bound, percent.
    pub from: i64,
    /// Upper bound, percent.
    pub to: i64,
    /// Message for the band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Behaviour settings of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Behaviour {
    /// Show the retry button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_retry: Option<bool>,
    /// Show the solution button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_solutions_button: Option<bool>,
    /// Show the check button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_check_button: Option<bool>,
    /// Selection mode: `auto`, `multi` or `single`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    /// Award a single point for the whole question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_point: Option<bool>,
    /// Shuffle answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_answers: Option<bool>,
    /// Percentage needed to pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_percentage: Option<i64>,
    /// Show points earned per answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_score_points: Option<bool>,
    /// Keys this model does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Allowed values of [`Behaviour::question_type`].
pub const QUESTION_TYPES: [&str; 3] = ["auto", "multi", "single"];
