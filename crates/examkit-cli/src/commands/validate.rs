//! The `examkit validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use examkit_core::parser;

pub fn execute(exam_path: PathBuf) -> Result<()> {
    let exam = parser::parse_exam(&exam_path)
        .with_context(|| format!("invalid exam document {}", exam_path.display()))?;
    let multi = exam.questions.iter().filter(|q| q.is_multiple()).count();
    println!(
        "Exam: {} ({} questions, {multi} multi-answer, {} min)",
        exam.title,
        exam.len(),
        exam.duration_minutes
    );

    let content = std::fs::read_to_string(&exam_path)
        .with_context(|| format!("failed to read {}", exam_path.display()))?;
    let warnings = parser::validate_exam(&content)?;
    for w in &warnings {
        let prefix = w
            .question
            .map(|n| format!("  [Q{n}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Exam document valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
