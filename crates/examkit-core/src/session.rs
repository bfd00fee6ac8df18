//! Exam session state machine.
//!
//! An [`ExamSession`] is created `Active` from a validated document (the
//! `Loading` phase is the fetch performed by [`crate::launch`]) and moves to
//! `Terminated` when the last question is submitted, the countdown runs out
//! or the user ends it. Every user input and timer tick is an [`Action`]
//! passed to [`ExamSession::dispatch`]; observers subscribed with
//! [`ExamSession::subscribe`] are told what changed.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::model::{AnswerBuffer, ExamDocument, ExamMode, Question, Response};
use crate::review::{build_review, Review};
use crate::scoring::{is_correct, ScoreResult};

/// A semantic user or timer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Toggle an option of the current question.
    Select(usize),
    /// Timed mode: go to the next question, or finish on the last one.
    Next,
    /// Timed mode: go to the previous question.
    Previous,
    /// Timed mode: go to any question through the index picker.
    JumpTo(usize),
    /// Untimed mode: submit the selection and show feedback.
    Check,
    /// Untimed mode: dismiss feedback and move on, or finish on the last one.
    Acknowledge,
    /// One second of countdown elapsed.
    Tick,
    /// Finish now.
    End,
}

/// Mutable per-session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub current_index: usize,
    pub mode: ExamMode,
    /// Seconds left on the countdown; `None` in untimed mode.
    pub remaining_seconds: Option<u64>,
    pub answers: AnswerBuffer,
    pub started_at: DateTime<Utc>,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationCause {
    /// The last question was submitted (or its feedback acknowledged).
    Completed,
    /// The countdown reached zero.
    TimeExpired,
    /// The user ended the session early.
    EndedByUser,
}

/// Everything downstream consumers need from a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub session_id: Uuid,
    pub exam_id: String,
    pub mode: ExamMode,
    pub cause: TerminationCause,
    pub score: ScoreResult,
    pub time_spent_seconds: u64,
    pub finished_at: DateTime<Utc>,
    pub review: Review,
}

/// Immediate feedback shown in training mode after `Check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub question: usize,
    pub is_correct: bool,
    pub selected: BTreeSet<usize>,
    pub correct_indices: Vec<usize>,
    pub explanation: Option<String>,
}

/// Marker for the timed-mode question picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionMark {
    Current,
    Answered,
    Unanswered,
}

/// What the current question looks like right now.
#[derive(Debug, Clone, Copy)]
pub struct QuestionView<'a> {
    pub index: usize,
    pub total: usize,
    pub question: &'a Question,
    pub selection: &'a BTreeSet<usize>,
    pub mode: ExamMode,
    pub remaining_seconds: Option<u64>,
}

/// Result of one dispatched action.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    SelectionChanged,
    Moved { from: usize, to: usize },
    Feedback(Feedback),
    Ticked { remaining_seconds: u64 },
    Unchanged,
    Terminated(TerminationCause),
}

/// Subscriber for session changes. Every method defaults to doing nothing.
pub trait SessionObserver {
    fn on_question_shown(&self, _view: &QuestionView<'_>) {}
    fn on_selection_changed(&self, _view: &QuestionView<'_>) {}
    fn on_feedback(&self, _feedback: &Feedback) {}
    fn on_tick(&self, _remaining_seconds: u64) {}
    fn on_terminated(&self, _outcome: &SessionOutcome) {}
}

#[derive(Debug)]
enum Phase {
    Active,
    Terminated(Box<SessionOutcome>),
}

/// One exam-taking session.
pub struct ExamSession {
    id: Uuid,
    exam: ExamDocument,
    state: SessionState,
    /// Options currently selected on screen for `state.current_index`.
    selection: BTreeSet<usize>,
    feedback: Option<Feedback>,
    phase: Phase,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl ExamSession {
    /// Start a session on a validated document.
    pub fn start(exam: ExamDocument, mode: ExamMode, now: DateTime<Utc>) -> Self {
        let remaining_seconds = mode.is_timed().then(|| exam.duration_seconds());
        let id = Uuid::new_v4();
        tracing::info!(
            session = %id,
            exam = %exam.id,
            %mode,
            questions = exam.len(),
            "session started"
        );
        Self {
            id,
            exam,
            state: SessionState {
                current_index: 0,
                mode,
                remaining_seconds,
                answers: AnswerBuffer::new(),
                started_at: now,
            },
            selection: BTreeSet::new(),
            feedback: None,
            phase: Phase::Active,
            observers: Vec::new(),
        }
    }

    /// Register an observer for all following transitions.
    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn exam(&self) -> &ExamDocument {
        &self.exam
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mode(&self) -> ExamMode {
        self.state.mode
    }

    pub fn selection(&self) -> &BTreeSet<usize> {
        &self.selection
    }

    /// Feedback awaiting acknowledgement, in training mode.
    pub fn pending_feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Terminated(_))
    }

    pub fn outcome(&self) -> Option<&SessionOutcome> {
        match &self.phase {
            Phase::Active => None,
            Phase::Terminated(outcome) => Some(outcome),
        }
    }

    pub fn current_view(&self) -> QuestionView<'_> {
        QuestionView {
            index: self.state.current_index,
            total: self.exam.len(),
            question: self.current_question(),
            selection: &self.selection,
            mode: self.state.mode,
            remaining_seconds: self.state.remaining_seconds,
        }
    }

    pub fn is_last_question(&self) -> bool {
        self.state.current_index + 1 == self.exam.len()
    }

    /// Whether `Previous` would move.
    pub fn can_go_back(&self) -> bool {
        self.state.mode.is_timed() && self.state.current_index > 0
    }

    /// Per-question markers for the timed-mode picker.
    pub fn indicator(&self) -> Vec<QuestionMark> {
        (0..self.exam.len())
            .map(|i| {
                if i == self.state.current_index {
                    QuestionMark::Current
                } else if self.state.answers.is_answered(i) {
                    QuestionMark::Answered
                } else {
                    QuestionMark::Unanswered
                }
            })
            .collect()
    }

    /// Apply one action.
    ///
    /// `now` is only read when the action ends the session.
    pub fn dispatch(&mut self, action: Action, now: DateTime<Utc>) -> Result<Step, SessionError> {
        if self.is_terminated() {
            return Err(SessionError::Terminated);
        }
        tracing::debug!(session = %self.id, ?action, index = self.state.current_index, "dispatch");

        match action {
            Action::Select(option) => self.select(option),
            Action::Next => {
                self.require_timed("next")?;
                self.save_current();
                if self.is_last_question() {
                    Ok(self.terminate(TerminationCause::Completed, now))
                } else {
                    Ok(self.move_to(self.state.current_index + 1))
                }
            }
            Action::Previous => {
                self.require_timed("previous")?;
                self.save_current();
                if self.state.current_index == 0 {
                    Ok(Step::Unchanged)
                } else {
                    Ok(self.move_to(self.state.current_index - 1))
                }
            }
            Action::JumpTo(index) => {
                self.require_timed("jump")?;
                let total = self.exam.len();
                if index >= total {
                    return Err(SessionError::QuestionOutOfRange { index, total });
                }
                self.save_current();
                if index == self.state.current_index {
                    Ok(Step::Unchanged)
                } else {
                    Ok(self.move_to(index))
                }
            }
            Action::Check => self.check(),
            Action::Acknowledge => {
                self.require_untimed("acknowledge")?;
                if self.feedback.take().is_none() {
                    return Err(SessionError::FeedbackRequired);
                }
                if self.is_last_question() {
                    Ok(self.terminate(TerminationCause::Completed, now))
                } else {
                    Ok(self.move_to(self.state.current_index + 1))
                }
            }
            Action::Tick => Ok(self.tick(now)),
            Action::End => {
                self.save_current();
                Ok(self.terminate(TerminationCause::EndedByUser, now))
            }
        }
    }

    fn current_question(&self) -> &Question {
        &self.exam.questions[self.state.current_index]
    }

    fn require_timed(&self, action: &'static str) -> Result<(), SessionError> {
        if self.state.mode.is_timed() {
            Ok(())
        } else {
            Err(SessionError::NotAvailableInMode {
                action,
                mode: self.state.mode,
            })
        }
    }

    fn require_untimed(&self, action: &'static str) -> Result<(), SessionError> {
        if self.state.mode.is_timed() {
            Err(SessionError::NotAvailableInMode {
                action,
                mode: self.state.mode,
            })
        } else {
            Ok(())
        }
    }

    fn select(&mut self, option: usize) -> Result<Step, SessionError> {
        let option_count = self.current_question().options.len();
        if option >= option_count {
            return Err(SessionError::OptionOutOfRange {
                option,
                option_count,
            });
        }
        if self.feedback.is_some() {
            return Err(SessionError::FeedbackPending);
        }

        if self.current_question().is_multiple() {
            if !self.selection.remove(&option) {
                self.selection.insert(option);
            }
        } else {
            self.selection.clear();
            self.selection.insert(option);
        }

        let view = self.current_view();
        for observer in &self.observers {
            observer.on_selection_changed(&view);
        }
        Ok(Step::SelectionChanged)
    }

    fn check(&mut self) -> Result<Step, SessionError> {
        self.require_untimed("check")?;
        if self.feedback.is_some() {
            return Err(SessionError::FeedbackPending);
        }
        if self.selection.is_empty() {
            return Err(SessionError::NothingSelected);
        }

        let response = self.save_current();
        let question = self.current_question();
        let feedback = Feedback {
            question: self.state.current_index,
            is_correct: is_correct(question, &response),
            selected: self.selection.clone(),
            correct_indices: question.answer_key.indices(),
            explanation: question.explanation.clone(),
        };
        for observer in &self.observers {
            observer.on_feedback(&feedback);
        }
        self.feedback = Some(feedback.clone());
        Ok(Step::Feedback(feedback))
    }

    fn tick(&mut self, now: DateTime<Utc>) -> Step {
        let Some(remaining) = self.state.remaining_seconds else {
            return Step::Unchanged;
        };
        let remaining = remaining.saturating_sub(1);
        self.state.remaining_seconds = Some(remaining);
        for observer in &self.observers {
            observer.on_tick(remaining);
        }
        if remaining == 0 {
            // Same path as a manual finish: whatever is selected on screen
            // right now is part of the final score.
            self.save_current();
            self.terminate(TerminationCause::TimeExpired, now)
        } else {
            Step::Ticked {
                remaining_seconds: remaining,
            }
        }
    }

    /// Copy the on-screen selection into the answer buffer.
    fn save_current(&mut self) -> Response {
        let response = Response::from_selection(self.current_question(), &self.selection);
        self.state
            .answers
            .record(self.state.current_index, response.clone());
        response
    }

    /// Show another question, restoring its saved selection.
    fn move_to(&mut self, index: usize) -> Step {
        let from = self.state.current_index;
        self.state.current_index = index;
        self.selection = self.state.answers.response(index).indices();

        let view = self.current_view();
        for observer in &self.observers {
            observer.on_question_shown(&view);
        }
        Step::Moved { from, to: index }
    }

    fn terminate(&mut self, cause: TerminationCause, now: DateTime<Utc>) -> Step {
        self.feedback = None;
        let review = build_review(&self.state.answers, &self.exam);
        let time_spent_seconds = (now - self.state.started_at).num_seconds().max(0) as u64;
        let outcome = SessionOutcome {
            session_id: self.id,
            exam_id: self.exam.id.clone(),
            mode: self.state.mode,
            cause,
            score: review.score,
            time_spent_seconds,
            finished_at: now,
            review,
        };
        tracing::info!(
            session = %self.id,
            exam = %outcome.exam_id,
            ?cause,
            correct = outcome.score.correct_count,
            total = outcome.score.total_count,
            percentage = outcome.score.percentage,
            "session terminated"
        );
        for observer in &self.observers {
            observer.on_terminated(&outcome);
        }
        self.phase = Phase::Terminated(Box::new(outcome));
        Step::Terminated(cause)
    }
}

impl std::fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExamSession")
            .field("id", &self.id)
            .field("exam", &self.exam.id)
            .field("state", &self.state)
            .field("selection", &self.selection)
            .field("phase", &self.phase)
            .field("observers", &self.observers.len())
            .finish()
    }
}
