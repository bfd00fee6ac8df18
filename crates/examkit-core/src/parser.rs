//! JSON exam document parser.
//!
//! Loads exam documents from JSON text or files, rejects documents that
//! cannot be scored, and reports non-fatal issues as warnings.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;
use crate::model::{AnswerKey, ExamDocument, Question};

/// Intermediate JSON structure of an exam document.
#[derive(Debug, Deserialize)]
struct JsonExamFile {
    title: String,
    duration: f64,
    questions: Vec<JsonQuestion>,
}

#[derive(Debug, Deserialize)]
struct JsonQuestion {
    #[serde(default)]
    topic: String,
    question: String,
    options: Vec<String>,
    answer: JsonAnswer,
    #[serde(default, rename = "type")]
    kind: Option<JsonQuestionKind>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonAnswer {
    Index(usize),
    Indices(Vec<usize>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum JsonQuestionKind {
    Single,
    Multiple,
}

/// Parse an exam document from a file. The file name becomes the exam id.
pub fn parse_exam(path: &Path) -> Result<ExamDocument, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound(path.display().to_string()),
        _ => LoadError::Network(format!("failed to read {}: {e}", path.display())),
    })?;
    let exam_id = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_exam_str(&content, &exam_id)
}

/// Parse a JSON string into an `ExamDocument`.
pub fn parse_exam_str(content: &str, exam_id: &str) -> Result<ExamDocument, LoadError> {
    let parsed: JsonExamFile = serde_json::from_str(content)
        .map_err(|e| LoadError::Malformed(format!("{exam_id}: {e}")))?;

    if parsed.questions.is_empty() {
        return Err(LoadError::NoQuestions);
    }

    let questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| convert_question(i + 1, q))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExamDocument {
        id: exam_id.to_string(),
        title: parsed.title,
        duration_minutes: parsed.duration,
        questions,
    })
}

fn convert_question(number: usize, q: JsonQuestion) -> Result<Question, LoadError> {
    let option_count = q.options.len();
    if option_count == 0 {
        return Err(LoadError::NoOptions { question: number });
    }

    let check = |index: usize| {
        if index < option_count {
            Ok(index)
        } else {
            Err(LoadError::AnswerOutOfRange {
                question: number,
                index,
                option_count,
            })
        }
    };

    // A question is multi-answer when declared so or when its key is an array.
    let answer_key = match (q.answer, q.kind) {
        (JsonAnswer::Index(i), Some(JsonQuestionKind::Multiple)) => {
            AnswerKey::Multiple(BTreeSet::from([check(i)?]))
        }
        (JsonAnswer::Index(i), _) => AnswerKey::Single(check(i)?),
        (JsonAnswer::Indices(list), _) => {
            if list.is_empty() {
                return Err(LoadError::EmptyAnswerKey { question: number });
            }
            let set = list
                .into_iter()
                .map(check)
                .collect::<Result<BTreeSet<_>, _>>()?;
            AnswerKey::Multiple(set)
        }
    };

    Ok(Question {
        topic: q.topic,
        prompt: q.question,
        options: q.options,
        answer_key,
        explanation: q.explanation.filter(|e| !e.trim().is_empty()),
    })
}

/// A warning from exam document validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based question number (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate an exam document text for issues that do not prevent loading.
///
/// Works on the raw text because some issues (a declared `type` that
/// disagrees with the answer shape, repeated key indices) are normalized
/// away by [`parse_exam_str`].
pub fn validate_exam(content: &str) -> Result<Vec<ValidationWarning>, LoadError> {
    // Reject what cannot load at all before looking for softer issues.
    parse_exam_str(content, "validate")?;
    let raw: JsonExamFile =
        serde_json::from_str(content).map_err(|e| LoadError::Malformed(e.to_string()))?;

    let mut warnings = Vec::new();

    if raw.title.trim().is_empty() {
        warnings.push(ValidationWarning {
            question: None,
            message: "title is empty".into(),
        });
    }
    if raw.duration <= 0.0 {
        warnings.push(ValidationWarning {
            question: None,
            message: "duration is not positive, timed sessions end on the first tick".into(),
        });
    }

    for (i, q) in raw.questions.iter().enumerate() {
        let number = Some(i + 1);

        if q.topic.trim().is_empty() {
            warnings.push(ValidationWarning {
                question: number,
                message: "topic is empty".into(),
            });
        }
        if q.question.trim().is_empty() {
            warnings.push(ValidationWarning {
                question: number,
                message: "question text is empty".into(),
            });
        }

        let mut seen = HashSet::new();
        for option in &q.options {
            if !seen.insert(option.trim()) {
                warnings.push(ValidationWarning {
                    question: number,
                    message: format!("duplicate option: {}", option.trim()),
                });
            }
        }

        match (&q.answer, q.kind) {
            (JsonAnswer::Indices(list), Some(JsonQuestionKind::Single)) => {
                warnings.push(ValidationWarning {
                    question: number,
                    message: format!(
                        "declared single but answer is an array of {}, treated as multiple",
                        list.len()
                    ),
                });
            }
            (JsonAnswer::Indices(list), _) => {
                let unique: BTreeSet<_> = list.iter().collect();
                if unique.len() != list.len() {
                    warnings.push(ValidationWarning {
                        question: number,
                        message: "answer array repeats an index".into(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(warnings)
}
