//! Core data model types for examkit.
//!
//! These are the types every other crate uses to represent a loaded exam,
//! its answer keys and the responses captured during a session.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A validated exam definition. Immutable once a session has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamDocument {
    /// Identifier the document was fetched under (usually its file name).
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Time allowed in timed mode, in minutes. May be fractional.
    pub duration_minutes: f64,
    /// The questions, in presentation order. Never empty.
    pub questions: Vec<Question>,
}

impl ExamDocument {
    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always `false` for a document that passed validation.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Countdown length for timed mode, rounded to whole seconds.
    /// Negative durations count as zero.
    pub fn duration_seconds(&self) -> u64 {
        (self.duration_minutes * 60.0).round().max(0.0) as u64
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub topic: String,
    /// Prompt text. May embed `<code>` fragments.
    pub prompt: String,
    pub options: Vec<String>,
    pub answer_key: AnswerKey,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    /// Whether any number of options may be selected.
    pub fn is_multiple(&self) -> bool {
        self.answer_key.is_multiple()
    }
}

/// The authoritative answer for a question.
///
/// Decided once when the document is parsed; nothing downstream re-infers
/// multiplicity from the raw JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "indices", rename_all = "lowercase")]
pub enum AnswerKey {
    Single(usize),
    Multiple(BTreeSet<usize>),
}

impl AnswerKey {
    pub fn is_multiple(&self) -> bool {
        matches!(self, AnswerKey::Multiple(_))
    }

    /// Correct option indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        match self {
            AnswerKey::Single(i) => vec![*i],
            AnswerKey::Multiple(set) => set.iter().copied().collect(),
        }
    }

    pub fn contains(&self, option: usize) -> bool {
        match self {
            AnswerKey::Single(i) => *i == option,
            AnswerKey::Multiple(set) => set.contains(&option),
        }
    }
}

/// Session mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamMode {
    /// Timed, free navigation, no feedback until the end.
    #[default]
    Exam,
    /// Untimed, linear, immediate feedback on every question.
    Train,
}

impl ExamMode {
    pub fn is_timed(self) -> bool {
        self == ExamMode::Exam
    }
}

impl fmt::Display for ExamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamMode::Exam => write!(f, "exam"),
            ExamMode::Train => write!(f, "train"),
        }
    }
}

impl FromStr for ExamMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exam" => Ok(ExamMode::Exam),
            "train" | "training" => Ok(ExamMode::Train),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// What the user recorded for one question.
///
/// Serializes as `null`, a bare index, or an index array, mirroring the exam
/// document's `answer` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    #[default]
    Unanswered,
    Single(usize),
    Multiple(BTreeSet<usize>),
}

impl Response {
    /// Builds the response for a question from the options currently
    /// selected. An empty selection is recorded as `Unanswered`.
    pub fn from_selection(question: &Question, selection: &BTreeSet<usize>) -> Self {
        if selection.is_empty() {
            return Response::Unanswered;
        }
        if question.is_multiple() {
            Response::Multiple(selection.clone())
        } else {
            // single-answer selections hold exactly one index
            selection
                .iter()
                .next()
                .copied()
                .map_or(Response::Unanswered, Response::Single)
        }
    }

    pub fn is_answered(&self) -> bool {
        !matches!(self, Response::Unanswered)
    }

    /// Selected option indices in ascending order.
    pub fn indices(&self) -> BTreeSet<usize> {
        match self {
            Response::Unanswered => BTreeSet::new(),
            Response::Single(i) => BTreeSet::from([*i]),
            Response::Multiple(set) => set.clone(),
        }
    }

    pub(crate) fn max_index(&self) -> Option<usize> {
        match self {
            Response::Unanswered => None,
            Response::Single(i) => Some(*i),
            Response::Multiple(set) => set.iter().next_back().copied(),
        }
    }
}

/// Sparse map from question index to the recorded response.
///
/// A question that was visited and left empty holds an explicit
/// `Response::Unanswered`; a question never visited has no entry. Scoring and
/// review treat both the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerBuffer {
    responses: BTreeMap<usize, Response>,
}

impl AnswerBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (or replaces) the response for a question.
    pub fn record(&mut self, question: usize, response: Response) {
        self.responses.insert(question, response);
    }

    /// The stored entry, if the question was ever recorded.
    pub fn get(&self, question: usize) -> Option<&Response> {
        self.responses.get(&question)
    }

    /// The response for a question, with missing entries read as unanswered.
    pub fn response(&self, question: usize) -> Response {
        self.get(question).cloned().unwrap_or_default()
    }

    pub fn is_answered(&self, question: usize) -> bool {
        self.get(question).is_some_and(Response::is_answered)
    }

    /// Number of questions with a non-empty response.
    pub fn answered_count(&self) -> usize {
        self.responses.values().filter(|r| r.is_answered()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Response)> {
        self.responses.iter().map(|(k, v)| (*k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Highest question index with an entry.
    pub(crate) fn max_question(&self) -> Option<usize> {
        self.responses.keys().next_back().copied()
    }
}
