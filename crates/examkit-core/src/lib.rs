//! examkit-core: Exam model, session state machine, scoring and review.
//!
//! This crate defines the exam data model, the document parser, the
//! single-session state machine and the scoring rule shared by live training
//! feedback and end-of-session review.

pub mod error;
pub mod launch;
pub mod model;
pub mod parser;
pub mod review;
pub mod scoring;
pub mod session;
pub mod traits;

pub use error::{LoadError, SessionError};
pub use launch::{launch, LaunchParams};
pub use model::{AnswerBuffer, AnswerKey, ExamDocument, ExamMode, Question, Response};
pub use review::{build_review, Review, ReviewRecord};
pub use scoring::{is_correct, score, ScoreResult};
pub use session::{Action, ExamSession, SessionObserver, SessionOutcome, Step};
