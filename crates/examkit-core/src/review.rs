//! Post-session review records.

use serde::{Deserialize, Serialize};

use crate::model::{AnswerBuffer, ExamDocument, Response};
use crate::scoring::{is_correct, score, ScoreResult};

/// Per-question review line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    /// 0-based question index.
    pub index: usize,
    pub topic: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub is_multiple: bool,
    pub is_correct: bool,
    pub recorded_response: Response,
    pub correct_indices: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ReviewRecord {
    /// Whether the user picked this option.
    pub fn was_selected(&self, option: usize) -> bool {
        self.recorded_response.indices().contains(&option)
    }

    /// Whether this option belongs to the answer key.
    pub fn is_key(&self, option: usize) -> bool {
        self.correct_indices.contains(&option)
    }
}

/// Full review of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub score: ScoreResult,
    pub records: Vec<ReviewRecord>,
}

impl Review {
    /// Records the user got wrong or left unanswered.
    pub fn mistakes(&self) -> impl Iterator<Item = &ReviewRecord> {
        self.records.iter().filter(|r| !r.is_correct)
    }
}

/// Build the per-question review for a terminal answer buffer.
pub fn build_review(answers: &AnswerBuffer, exam: &ExamDocument) -> Review {
    let records = exam
        .questions
        .iter()
        .enumerate()
        .map(|(index, q)| {
            let recorded_response = answers.response(index);
            ReviewRecord {
                index,
                topic: q.topic.clone(),
                prompt: q.prompt.clone(),
                options: q.options.clone(),
                is_multiple: q.is_multiple(),
                is_correct: is_correct(q, &recorded_response),
                recorded_response,
                correct_indices: q.answer_key.indices(),
                explanation: q.explanation.clone(),
            }
        })
        .collect();

    Review {
        score: score(answers, exam),
        records,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::{AnswerKey, Question};

    fn exam() -> ExamDocument {
        ExamDocument {
            id: "exam5.json".into(),
            title: "Streams".into(),
            duration_minutes: 5.0,
            questions: vec![
                Question {
                    topic: "Streams".into(),
                    prompt: "Terminal ops?".into(),
                    options: vec!["map".into(), "collect".into(), "forEach".into()],
                    answer_key: AnswerKey::Multiple(BTreeSet::from([1, 2])),
                    explanation: Some("collect and forEach end the pipeline".into()),
                },
                Question {
                    topic: "Lists".into(),
                    prompt: "Ordered?".into(),
                    options: vec!["HashSet".into(), "ArrayList".into()],
                    answer_key: AnswerKey::Single(1),
                    explanation: None,
                },
            ],
        }
    }

    #[test]
    fn review_matches_score() {
        let exam = exam();
        let mut answers = AnswerBuffer::new();
        answers.record(0, Response::Multiple(BTreeSet::from([1])));
        answers.record(1, Response::Single(1));

        let review = build_review(&answers, &exam);
        assert_eq!(review.records.len(), 2);
        assert!(!review.records[0].is_correct);
        assert!(review.records[1].is_correct);
        assert_eq!(review.score.correct_count, 1);
        assert_eq!(
            review.records.iter().filter(|r| r.is_correct).count(),
            review.score.correct_count
        );
        assert_eq!(review.records[0].correct_indices, vec![1, 2]);
        assert!(review.records[0].was_selected(1));
        assert!(!review.records[0].was_selected(2));
        assert!(review.records[0].is_key(2));
        assert_eq!(review.mistakes().count(), 1);
    }

    #[test]
    fn unanswered_questions_are_reviewed_as_incorrect() {
        let exam = exam();
        let mut answers = AnswerBuffer::new();
        answers.record(0, Response::Unanswered);

        let review = build_review(&answers, &exam);
        assert!(review.records.iter().all(|r| !r.is_correct));
        assert_eq!(review.records[0].recorded_response, Response::Unanswered);
        assert_eq!(review.records[1].recorded_response, Response::Unanswered);
        assert_eq!(
            review.records[0].explanation.as_deref(),
            Some("collect and forEach end the pipeline")
        );
    }
}
