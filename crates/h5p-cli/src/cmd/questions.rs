//! Questions command

use std::path::Path;

use anyhow::{Context, Result, bail};
use h5p_core::validate_question_set;
use h5p_schema::content::QuestionSet;

use super::validate::print_report;
use crate::ui::{Output, table};

/// Summarise a question-set content.json and check it
pub fn questions(file: &Path) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let set = QuestionSet::from_slice(&bytes)
        .with_context(|| format!("{} is not a question set", file.display()))?;
    let output = Output::new();

    println!();
    output.field("title", set.title.as_deref().unwrap_or("(untitled)"));
    output.field("questions", &set.questions.len().to_string());
    output.field(
        "pass",
        &set.pass_percentage.map_or_else(|| "-".to_string(), |p| format!("{p}%")),
    );
    println!();

    let mut rows = table(&["#", "Library", "Question", "Answers"]);
    for (i, question) in set.questions.iter().enumerate() {
        let (text, answers) = match question.multi_choice() {
            Ok(params) if question.is_multi_choice() => {
                let answers = format!("{} ({} correct)", params.answers.len(), params.correct_count());
                (params.question, answers)
            }
            _ => (
                question.params["question"].as_str().unwrap_or_default().to_string(),
                "-".to_string(),
            ),
        };
        rows.add_row(vec![(i + 1).to_string(), question.library.clone(), text, answers]);
    }
    println!("{rows}");

    let report = validate_question_set(&set);
    print_report(&report);
    if !report.is_valid() {
        bail!("{} has {} violation(s)", file.display(), report.violations.len());
    }
    output.success("Question set is valid");
    Ok(())
}
