//! Correctness rule and score computation.
//!
//! [`is_correct`] is the single definition of a correct answer; live training
//! feedback, final scoring and review all go through it.

use serde::{Deserialize, Serialize};

use crate::model::{AnswerBuffer, AnswerKey, ExamDocument, Question, Response};

/// Aggregate score of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub correct_count: usize,
    pub total_count: usize,
    /// Rounded half-up, 0..=100.
    pub percentage: u32,
}

/// Visual classification of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultBand {
    Success,
    Warning,
    Danger,
}

impl ScoreResult {
    /// `Danger` below 67%, `Warning` up to and including 80%, `Success` above.
    pub fn band(&self) -> ResultBand {
        match self.percentage {
            p if p < 67 => ResultBand::Danger,
            p if p <= 80 => ResultBand::Warning,
            _ => ResultBand::Success,
        }
    }
}

/// Whether a recorded response answers a question correctly.
///
/// Single-answer: the response is exactly the key index. Multi-answer: the
/// selected set equals the key set. No partial credit; unanswered is wrong.
pub fn is_correct(question: &Question, response: &Response) -> bool {
    match (&question.answer_key, response) {
        (_, Response::Unanswered) => false,
        (AnswerKey::Single(key), Response::Single(chosen)) => key == chosen,
        (AnswerKey::Multiple(key), Response::Multiple(chosen)) => key == chosen,
        // A lone index against a multi key (or the reverse) only matches when
        // both sides name the same single option.
        (key, other) => other.indices().into_iter().eq(key.indices()),
    }
}

/// Score an answer buffer against an exam's answer keys.
///
/// # Panics
///
/// Panics if the buffer holds an entry for a question or option the exam does
/// not have. The session never produces such a buffer.
pub fn score(answers: &AnswerBuffer, exam: &ExamDocument) -> ScoreResult {
    let total_count = exam.questions.len();
    assert_contained(answers, exam);

    let correct_count = exam
        .questions
        .iter()
        .enumerate()
        .filter(|(i, q)| is_correct(q, &answers.response(*i)))
        .count();

    ScoreResult {
        correct_count,
        total_count,
        percentage: percentage(correct_count, total_count),
    }
}

fn assert_contained(answers: &AnswerBuffer, exam: &ExamDocument) {
    if let Some(max) = answers.max_question() {
        assert!(
            max < exam.questions.len(),
            "answer buffer references question {max} of {}",
            exam.questions.len()
        );
    }
    for (i, response) in answers.iter() {
        if let Some(option) = response.max_index() {
            let count = exam.questions[i].options.len();
            assert!(
                option < count,
                "answer buffer references option {option} of {count} on question {i}"
            );
        }
    }
}

/// `round(100 * correct / total)` with halves rounded up. Zero when
/// `total` is zero.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let (c, t) = (correct as u64, total as u64);
    ((200 * c + t) / (2 * t)) as u32
}

/// Mean of percentages with halves rounded up. Zero for an empty slice.
pub fn mean_percentage(values: &[u32]) -> u32 {
    if values.is_empty() {
        return 0;
    }
    let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
    let n = values.len() as u64;
    ((2 * sum + n) / (2 * n)) as u32
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn single(key: usize) -> Question {
        Question {
            topic: "t".into(),
            prompt: "p".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
            answer_key: AnswerKey::Single(key),
            explanation: None,
        }
    }

    fn multi(key: &[usize]) -> Question {
        Question {
            answer_key: AnswerKey::Multiple(key.iter().copied().collect()),
            ..single(0)
        }
    }

    fn exam(questions: Vec<Question>) -> ExamDocument {
        ExamDocument {
            id: "exam1.json".into(),
            title: "Exam".into(),
            duration_minutes: 10.0,
            questions,
        }
    }

    fn set(items: &[usize]) -> Response {
        Response::Multiple(items.iter().copied().collect::<BTreeSet<_>>())
    }

    #[test]
    fn single_answer_correctness() {
        let q = single(2);
        assert!(is_correct(&q, &Response::Single(2)));
        assert!(!is_correct(&q, &Response::Single(1)));
        assert!(!is_correct(&q, &Response::Unanswered));
    }

    #[test]
    fn multi_answer_requires_exact_set() {
        let q = multi(&[1, 2, 3]);
        assert!(!is_correct(&q, &set(&[1, 2])));
        assert!(is_correct(&q, &set(&[1, 2, 3])));
        assert!(!is_correct(&q, &set(&[1, 2, 3, 4])));
        assert!(!is_correct(&q, &set(&[])));
        assert!(!is_correct(&q, &Response::Unanswered));
    }

    #[test]
    fn mixed_shapes_compare_by_index_set() {
        assert!(is_correct(&multi(&[1]), &Response::Single(1)));
        assert!(!is_correct(&multi(&[1, 2]), &Response::Single(1)));
        assert!(is_correct(&single(0), &set(&[0])));
    }

    #[test]
    fn four_of_five_is_eighty_percent() {
        let exam = exam((0..5).map(single).collect());
        let mut answers = AnswerBuffer::new();
        for i in 0..4 {
            answers.record(i, Response::Single(i));
        }
        answers.record(4, Response::Unanswered);

        let result = score(&answers, &exam);
        assert_eq!(result.correct_count, 4);
        assert_eq!(result.total_count, 5);
        assert_eq!(result.percentage, 80);
        assert_eq!(result.band(), ResultBand::Warning);
    }

    #[test]
    fn missing_entries_score_as_unanswered() {
        let exam = exam(vec![single(0), single(1), multi(&[0, 1])]);
        let result = score(&AnswerBuffer::new(), &exam);
        assert_eq!(result.correct_count, 0);
        assert_eq!(result.percentage, 0);
        assert!(result.correct_count <= result.total_count);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(7, 7), 100);
    }

    #[test]
    fn mean_of_percentages() {
        assert_eq!(mean_percentage(&[40, 80, 100]), 73);
        assert_eq!(mean_percentage(&[60, 50]), 55);
        assert_eq!(mean_percentage(&[50, 51]), 51); // 50.5
        assert_eq!(mean_percentage(&[]), 0);
    }

    #[test]
    fn result_bands() {
        let band = |p| {
            ScoreResult {
                correct_count: 0,
                total_count: 1,
                percentage: p,
            }
            .band()
        };
        assert_eq!(band(66), ResultBand::Danger);
        assert_eq!(band(67), ResultBand::Warning);
        assert_eq!(band(80), ResultBand::Warning);
        assert_eq!(band(81), ResultBand::Success);
    }

    #[test]
    #[should_panic(expected = "answer buffer references question")]
    fn out_of_range_buffer_is_fatal() {
        let exam = exam(vec![single(0)]);
        let mut answers = AnswerBuffer::new();
        answers.record(3, Response::Single(0));
        score(&answers, &exam);
    }
}
