//! JSON review export.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use examkit_core::session::TerminationCause;
use examkit_core::{ExamMode, ReviewRecord, ScoreResult, SessionOutcome};

/// Self-contained review artifact for one finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewExport {
    pub exam_id: String,
    pub exam_title: String,
    pub mode: ExamMode,
    pub cause: TerminationCause,
    pub score: ScoreResult,
    pub time_spent_seconds: u64,
    pub finished_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub records: Vec<ReviewRecord>,
}

impl ReviewExport {
    pub fn from_outcome(outcome: &SessionOutcome, exam_title: &str) -> Self {
        Self::from_outcome_at(outcome, exam_title, Utc::now())
    }

    pub fn from_outcome_at(
        outcome: &SessionOutcome,
        exam_title: &str,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            exam_id: outcome.exam_id.clone(),
            exam_title: exam_title.to_string(),
            mode: outcome.mode,
            cause: outcome.cause,
            score: outcome.score,
            time_spent_seconds: outcome.time_spent_seconds,
            finished_at: outcome.finished_at,
            generated_at,
            records: outcome.review.records.clone(),
        }
    }

    /// Number of records answered incorrectly or left empty.
    pub fn mistake_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_correct).count()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize review")
    }

    /// Save the export to a JSON file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write review to {}", path.display()))?;
        Ok(())
    }

    /// Load an export from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read review from {}", path.display()))?;
        let export: ReviewExport =
            serde_json::from_str(&content).context("failed to parse review JSON")?;
        Ok(export)
    }
}
