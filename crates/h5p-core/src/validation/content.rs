use h5p_schema::content::{MultiChoiceParams, QUESTION_TYPES, QuestionSet};
use serde::Deserialize;
use serde_json::Value;

use super::ValidationReport;

/// Content shapes this crate knows how to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Object with a `questions` list.
    QuestionSet,
    /// Object with `question` and `answers`.
    MultiChoice,
    /// Anything else; accepted without checks.
    Opaque,
}

impl ContentKind {
    /// Guess the content kind from its shape.
    pub fn detect(content: &Value) -> Self {
        let Some(object) = content.as_object() else {
            return Self::Opaque;
        };
        if object.contains_key("questions") {
            Self::QuestionSet
        } else if object.contains_key("question") && object.contains_key("answers") {
            Self::MultiChoice
        } else {
            Self::Opaque
        }
    }
}

/// Check content parameters of any supported kind.
pub fn validate_content(content: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    match ContentKind::detect(content) {
        ContentKind::QuestionSet => match QuestionSet::deserialize(content) {
            Ok(set) => report.merge(validate_question_set(&set)),
            Err(e) => report.violation("content", format!("not a valid question set: {e}")),
        },
        ContentKind::MultiChoice => match MultiChoiceParams::deserialize(content) {
            Ok(params) => report.merge(validate_multi_choice(&params)),
            Err(e) => report.violation("content", format!("not a valid multiple choice question: {e}")),
        },
        ContentKind::Opaque => {}
    }
    report
}

/// Check a multiple-choice question.
pub fn validate_multi_choice(params: &MultiChoiceParams) -> ValidationReport {
    let mut report = ValidationReport::new();

    if params.question.trim().is_empty() {
        report.violation("question", "question text is required");
    }

    if params.answers.is_empty() {
        report.violation("answers", "at least one answer is required");
    } else if params.correct_count() == 0 {
        report.violation("answers", "at least one answer must be marked as correct");
    }
    for (i, answer) in params.answers.iter().enumerate() {
        if answer.text.trim().is_empty() {
            report.violation(format!("answers[{i}].text"), "answer text is required");
        }
    }

    if let Some(behaviour) = &params.behaviour {
        let unknown_type = behaviour
            .question_type
            .as_deref()
            .filter(|t| !QUESTION_TYPES.contains(t));
        if let Some(question_type) = unknown_type {
            report.violation_with_value(
                "behaviour.type",
                format!("must be one of {}", QUESTION_TYPES.join(", ")),
                question_type,
            );
        }
        if let Some(percentage) = behaviour.pass_percentage {
            check_percentage(&mut report, "behaviour.passPercentage", percentage);
        }
    }

    if let Some(feedback) = &params.overall_feedback {
        let ranges: Vec<(i64, i64)> = feedback.ranges.iter().map(|r| (r.from, r.to)).collect();
        check_ranges(&mut report, "overallFeedback.overallFeedback", &ranges);
    }

    report
}

/// Check a question set and every multiple-choice question inside it.
pub fn validate_question_set(set: &QuestionSet) -> ValidationReport {
    let mut report = ValidationReport::new();

    if set.questions.is_empty() {
        report.violation("questions", "at least one question is required");
    }
    if let Some(percentage) = set.pass_percentage {
        check_percentage(&mut report, "passPercentage", percentage);
    }

    let ranges: Vec<(i64, i64)> = set.overall_feedback.iter().map(|r| (r.from, r.to)).collect();
    check_ranges(&mut report, "overallFeedback", &ranges);

    for (i, question) in set.questions.iter().enumerate() {
        if let Err(e) = question.library_ref() {
            report.violation_with_value(
                format!("questions[{i}].library"),
                e.to_string(),
                question.library.as_str(),
            );
            continue;
        }
        if !question.is_multi_choice() {
            continue;
        }
        match question.multi_choice() {
            Ok(params) => {
                report.merge_prefixed(&format!("questions[{i}].params"), validate_multi_choice(&params));
            }
            Err(e) => report.violation(
                format!("questions[{i}].params"),
                format!("not a valid multiple choice question: {e}"),
            ),
        }
    }

    report
}

fn check_percentage(report: &mut ValidationReport, field: &str, percentage: i64) {
    if !(0..=100).contains(&percentage) {
        report.violation_with_value(field, "must be between 0 and 100", percentage);
    }
}

/// `from > to` is a violation; overlapping bands are a warning.
fn check_ranges(report: &mut ValidationReport, field: &str, ranges: &[(i64, i64)]) {
    let mut ordered = Vec::with_capacity(ranges.len());
    for (i, &(from, to)) in ranges.iter().enumerate() {
        if from > to {
            report.violation(
                format!("{field}[{i}]"),
                format!("'from' ({from}) must not be greater than 'to' ({to})"),
            );
        } else {
            ordered.push((i, from, to));
        }
    }

    ordered.sort_by_key(|&(_, from, _)| from);
    for pair in ordered.windows(2) {
        let (prev, _, prev_to) = pair[0];
        let (next, next_from, _) = pair[1];
        if next_from <= prev_to {
            report.warning(format!("{field}[{next}] overlaps {field}[{prev}]"));
        }
    }
}
