//! Typed content shapes.
//!
//! The archive layer treats `content/content.json` as an opaque JSON value.
//! These types are the strongly-typed decode step for the two content kinds
//! this toolkit understands.

pub mod multichoice;
pub mod question_set;

pub use multichoice::{
    AnswerOption, Behaviour, MultiChoiceParams, OverallFeedback, QUESTION_TYPES, ScoreFeedback,
    TipsAndFeedback,
};
pub use question_set::{
    BackgroundImage, Copyright, FeedbackRange, MULTI_CHOICE_LIBRARY, Question,
    QuestionSet, QuestionSetBuilder,
};
