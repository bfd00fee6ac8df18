//! Persisted progress shapes.
//!
//! Field names serialize in camelCase so the stored blob keeps the layout
//! older releases wrote; legacy field names are accepted as aliases.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use examkit_core::ExamMode;

/// Schema version written by this release.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Entries written before versioning carry no `schemaVersion` field.
fn legacy_schema_version() -> u32 {
    1
}

/// One submitted attempt. Appended to the history and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    /// Correct answers.
    pub score: usize,
    pub percentage: u32,
    pub timestamp: DateTime<Utc>,
    pub time_spent_seconds: u64,
}

/// Classification of an exam's progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    #[default]
    New,
    InProgress,
    NeedsReview,
    Passed,
}

impl ProgressStatus {
    /// Human-readable badge label.
    pub fn label(self) -> &'static str {
        match self {
            ProgressStatus::New => "New",
            ProgressStatus::InProgress => "In progress",
            ProgressStatus::NeedsReview => "Needs review",
            ProgressStatus::Passed => "Passed",
        }
    }

    /// Single-character badge marker for compact listings.
    pub fn marker(self) -> char {
        match self {
            ProgressStatus::New => '○',
            ProgressStatus::InProgress => '◐',
            ProgressStatus::NeedsReview => '↻',
            ProgressStatus::Passed => '✓',
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProgressStatus::New => "new",
            ProgressStatus::InProgress => "in-progress",
            ProgressStatus::NeedsReview => "needs-review",
            ProgressStatus::Passed => "passed",
        };
        f.write_str(s)
    }
}

/// Per-exam progress record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamProgress {
    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,
    #[serde(alias = "attempts")]
    pub attempt_count: u32,
    /// Correct answers in the attempt with the best percentage.
    pub best_score: usize,
    pub best_percentage: u32,
    pub last_score: usize,
    pub last_percentage: u32,
    #[serde(default, alias = "lastAttempt")]
    pub last_attempt_timestamp: Option<DateTime<Utc>>,
    #[serde(default, alias = "totalTimeSpent")]
    pub total_time_spent_seconds: u64,
    /// Mean of `all_attempts` percentages, rounded half up.
    #[serde(default)]
    pub average_percentage: u32,
    #[serde(default)]
    pub status: ProgressStatus,
    /// Mode of the latest attempt.
    #[serde(default)]
    pub mode: ExamMode,
    /// Set on the first passing attempt and never cleared.
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub all_attempts: Vec<AttemptRecord>,
}

impl ExamProgress {
    /// Fresh record for an exam that has never been attempted.
    pub fn new(mode: ExamMode) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            attempt_count: 0,
            best_score: 0,
            best_percentage: 0,
            last_score: 0,
            last_percentage: 0,
            last_attempt_timestamp: None,
            total_time_spent_seconds: 0,
            average_percentage: 0,
            status: ProgressStatus::New,
            mode,
            completed: false,
            all_attempts: Vec::new(),
        }
    }
}

/// Aggregate statistics over every stored exam record.
///
/// Derived data: rebuilt from `userProgress` on every write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_exams_attempted: usize,
    pub total_exams_completed: usize,
    /// Mean best percentage across exams.
    pub average_score: u32,
    /// Seconds.
    pub total_study_time: u64,
    /// Highest best percentage across exams.
    pub best_score: u32,
    #[serde(default, alias = "lastActivity")]
    pub last_activity_timestamp: Option<DateTime<Utc>>,
}

/// The single stored blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDocument {
    #[serde(default)]
    pub user_progress: BTreeMap<String, ExamProgress>,
    #[serde(default)]
    pub global_stats: GlobalStats,
}

/// Presentation-ready projection of one exam's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeInfo {
    pub status: ProgressStatus,
    /// Best percentage, `None` for an exam never attempted.
    pub best_score: Option<u32>,
    /// Average percentage, `None` for an exam never attempted.
    pub average_score: Option<u32>,
    pub attempt_count: u32,
    pub last_attempt_timestamp: Option<DateTime<Utc>>,
}

impl BadgeInfo {
    /// The fixed projection for an exam with no record.
    pub fn new_exam() -> Self {
        Self {
            status: ProgressStatus::New,
            best_score: None,
            average_score: None,
            attempt_count: 0,
            last_attempt_timestamp: None,
        }
    }

    pub fn label(&self) -> &'static str {
        self.status.label()
    }
}

impl From<&ExamProgress> for BadgeInfo {
    fn from(progress: &ExamProgress) -> Self {
        Self {
            status: progress.status,
            best_score: Some(progress.best_percentage),
            average_score: Some(progress.average_percentage),
            attempt_count: progress.attempt_count,
            last_attempt_timestamp: progress.last_attempt_timestamp,
        }
    }
}
