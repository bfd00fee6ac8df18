//! Progress store operations.
//!
//! Every operation loads the whole [`ProgressDocument`], upgrades legacy
//! records, applies its change and writes the document back in one `set`.
//! Global statistics are rebuilt from all records before each write.

use chrono::{DateTime, Utc};

use examkit_core::scoring::{mean_percentage, percentage};
use examkit_core::ExamMode;

use crate::backend::KeyValueStore;
use crate::error::StoreError;
use crate::migrate;
use crate::model::{
    AttemptRecord, BadgeInfo, ExamProgress, GlobalStats, ProgressDocument, ProgressStatus,
};

/// Key the progress document is stored under.
pub const STORAGE_KEY: &str = "qcm-java-progress";

/// Minimum percentage for an attempt to count as passed.
pub const PASS_THRESHOLD: u32 = 80;

/// Durable per-exam attempt ledger.
pub struct ProgressStore<S> {
    backend: S,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Records a submitted attempt and returns the updated record.
    pub fn record_attempt(
        &mut self,
        exam_id: &str,
        score: usize,
        total: usize,
        time_spent_seconds: u64,
        mode: ExamMode,
    ) -> Result<ExamProgress, StoreError> {
        self.record_attempt_at(exam_id, score, total, time_spent_seconds, mode, Utc::now())
    }

    /// [`record_attempt`](Self::record_attempt) with an explicit clock.
    pub fn record_attempt_at(
        &mut self,
        exam_id: &str,
        score: usize,
        total: usize,
        time_spent_seconds: u64,
        mode: ExamMode,
        now: DateTime<Utc>,
    ) -> Result<ExamProgress, StoreError> {
        let (mut doc, _) = self.load()?;
        let pct = percentage(score, total);

        let progress = doc
            .user_progress
            .entry(exam_id.to_string())
            .or_insert_with(|| ExamProgress::new(mode));

        progress.attempt_count += 1;
        progress.last_score = score;
        progress.last_percentage = pct;
        progress.last_attempt_timestamp = Some(now);
        progress.total_time_spent_seconds += time_spent_seconds;
        progress.mode = mode;
        progress.all_attempts.push(AttemptRecord {
            score,
            percentage: pct,
            timestamp: now,
            time_spent_seconds,
        });

        if pct > progress.best_percentage {
            progress.best_score = score;
            progress.best_percentage = pct;
        }
        let history: Vec<u32> = progress.all_attempts.iter().map(|a| a.percentage).collect();
        progress.average_percentage = mean_percentage(&history);

        if pct >= PASS_THRESHOLD {
            progress.completed = true;
        }
        progress.status = classify(progress.attempt_count, pct);

        let updated = progress.clone();
        tracing::debug!(
            exam_id,
            percentage = pct,
            attempts = updated.attempt_count,
            status = %updated.status,
            "recorded attempt"
        );

        doc.global_stats = recompute_global_stats(&doc, now);
        self.save(&doc)?;
        Ok(updated)
    }

    /// The record for an exam, or `None` if it was never attempted.
    ///
    /// A record written by an older release is upgraded and the upgraded
    /// document is persisted before returning.
    pub fn get_progress(&mut self, exam_id: &str) -> Result<Option<ExamProgress>, StoreError> {
        let doc = self.load_persisting_upgrades()?;
        Ok(doc.user_progress.get(exam_id).cloned())
    }

    /// Every stored record, keyed by exam id.
    pub fn all_progress(
        &mut self,
    ) -> Result<std::collections::BTreeMap<String, ExamProgress>, StoreError> {
        Ok(self.load_persisting_upgrades()?.user_progress)
    }

    pub fn global_stats(&mut self) -> Result<GlobalStats, StoreError> {
        Ok(self.load_persisting_upgrades()?.global_stats)
    }

    /// Deletes one exam's record. Returns `true` if a record existed.
    pub fn reset_exam(&mut self, exam_id: &str) -> Result<bool, StoreError> {
        let (mut doc, upgraded) = self.load()?;
        let removed = doc.user_progress.remove(exam_id).is_some();
        if removed {
            doc.global_stats = recompute_global_stats(&doc, Utc::now());
        }
        if removed || upgraded > 0 {
            self.save(&doc)?;
        }
        tracing::info!(exam_id, removed, "reset exam progress");
        Ok(removed)
    }

    /// Clears the store back to its empty shape.
    pub fn reset_all(&mut self) -> Result<(), StoreError> {
        self.save(&ProgressDocument::default())?;
        tracing::info!("reset all progress");
        Ok(())
    }

    /// Presentation-ready projection of one exam's progress.
    pub fn badge_info(&mut self, exam_id: &str) -> Result<BadgeInfo, StoreError> {
        Ok(self
            .get_progress(exam_id)?
            .as_ref()
            .map_or_else(BadgeInfo::new_exam, BadgeInfo::from))
    }

    fn load(&self) -> Result<(ProgressDocument, usize), StoreError> {
        let mut doc = match self.backend.get(STORAGE_KEY)? {
            Some(value) => {
                serde_json::from_value::<ProgressDocument>(value).map_err(|e| {
                    StoreError::Corrupt {
                        key: STORAGE_KEY.to_string(),
                        source: e,
                    }
                })?
            }
            None => ProgressDocument::default(),
        };
        let upgraded = migrate::upgrade_document(&mut doc);
        Ok((doc, upgraded))
    }

    fn load_persisting_upgrades(&mut self) -> Result<ProgressDocument, StoreError> {
        let (doc, upgraded) = self.load()?;
        if upgraded > 0 {
            tracing::info!(records = upgraded, "migrated legacy progress records");
            self.save(&doc)?;
        }
        Ok(doc)
    }

    fn save(&mut self, doc: &ProgressDocument) -> Result<(), StoreError> {
        let value = serde_json::to_value(doc)?;
        self.backend.set(STORAGE_KEY, value)
    }
}

/// Status for the latest attempt, checked in order: passed, then needs
/// review after repeated attempts, else in progress.
fn classify(attempt_count: u32, last_percentage: u32) -> ProgressStatus {
    if last_percentage >= PASS_THRESHOLD {
        ProgressStatus::Passed
    } else if attempt_count >= 2 {
        ProgressStatus::NeedsReview
    } else {
        ProgressStatus::InProgress
    }
}

/// Rebuilds global statistics from every record.
fn recompute_global_stats(doc: &ProgressDocument, now: DateTime<Utc>) -> GlobalStats {
    if doc.user_progress.is_empty() {
        return GlobalStats::default();
    }
    let records = doc.user_progress.values();
    let bests: Vec<u32> = records.clone().map(|p| p.best_percentage).collect();

    GlobalStats {
        total_exams_attempted: doc.user_progress.len(),
        total_exams_completed: records.clone().filter(|p| p.completed).count(),
        average_score: mean_percentage(&bests),
        total_study_time: records.map(|p| p.total_time_spent_seconds).sum(),
        best_score: bests.iter().copied().max().unwrap_or(0),
        last_activity_timestamp: Some(now),
    }
}

/// Formats a study duration: seconds below a minute, rounded minutes below
/// an hour, rounded hours beyond.
pub fn format_study_time(seconds: u64) -> String {
    if seconds < 60 {
        format!("{seconds}s")
    } else if seconds < 3600 {
        format!("{}min", (seconds + 30) / 60)
    } else {
        format!("{}h", (seconds + 1800) / 3600)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::backend::{FileStore, MemoryStore};

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn store() -> ProgressStore<MemoryStore> {
        ProgressStore::new(MemoryStore::new())
    }

    #[test]
    fn first_passing_attempt() {
        let mut store = store();
        let progress = store
            .record_attempt_at("exam1.json", 4, 5, 300, ExamMode::Exam, ts("2024-05-01T08:00:00Z"))
            .unwrap();

        assert_eq!(progress.last_percentage, 80);
        assert_eq!(progress.status, ProgressStatus::Passed);
        assert!(progress.completed);
        assert_eq!(progress.attempt_count, 1);
        assert_eq!(progress.best_score, 4);
        assert_eq!(progress.all_attempts.len(), 1);
    }

    #[test]
    fn second_failing_attempt_needs_review() {
        let mut store = store();
        store
            .record_attempt_at("exam2.json", 6, 10, 100, ExamMode::Exam, ts("2024-05-01T08:00:00Z"))
            .unwrap();
        let first = store.get_progress("exam2.json").unwrap().unwrap();
        assert_eq!(first.status, ProgressStatus::InProgress);

        let progress = store
            .record_attempt_at("exam2.json", 5, 10, 80, ExamMode::Train, ts("2024-05-02T08:00:00Z"))
            .unwrap();
        assert_eq!(progress.status, ProgressStatus::NeedsReview);
        assert_eq!(progress.best_percentage, 60);
        assert_eq!(progress.best_score, 6);
        assert_eq!(progress.average_percentage, 55);
        assert_eq!(progress.last_percentage, 50);
        assert_eq!(progress.total_time_spent_seconds, 180);
        assert_eq!(progress.mode, ExamMode::Train);
    }

    #[test]
    fn completed_is_sticky() {
        let mut store = store();
        store
            .record_attempt_at("exam3.json", 9, 10, 60, ExamMode::Exam, ts("2024-05-01T08:00:00Z"))
            .unwrap();
        let progress = store
            .record_attempt_at("exam3.json", 3, 10, 60, ExamMode::Exam, ts("2024-05-02T08:00:00Z"))
            .unwrap();

        assert!(progress.completed);
        assert_eq!(progress.status, ProgressStatus::NeedsReview);
        assert_eq!(progress.last_percentage, 30);
        assert_eq!(progress.best_percentage, 90);
    }

    #[test]
    fn average_over_history() {
        let mut store = store();
        for (score, day) in [(2, 1), (4, 2), (5, 3)] {
            store
                .record_attempt_at(
                    "exam4.json",
                    score,
                    5,
                    10,
                    ExamMode::Exam,
                    ts(&format!("2024-05-0{day}T08:00:00Z")),
                )
                .unwrap();
        }
        let progress = store.get_progress("exam4.json").unwrap().unwrap();
        let pcts: Vec<u32> = progress.all_attempts.iter().map(|a| a.percentage).collect();
        assert_eq!(pcts, vec![40, 80, 100]);
        assert_eq!(progress.average_percentage, 73);
        assert_eq!(progress.best_percentage, 100);
    }

    #[test]
    fn each_attempt_is_one_write() {
        let mut store = store();
        store
            .record_attempt("exam1.json", 1, 2, 5, ExamMode::Exam)
            .unwrap();
        store
            .record_attempt("exam2.json", 2, 2, 5, ExamMode::Exam)
            .unwrap();
        assert_eq!(store.backend().write_count(), 2);
    }

    #[test]
    fn global_stats_rebuilt_from_all_records() {
        let mut store = store();
        let now = ts("2024-05-03T08:00:00Z");
        store
            .record_attempt_at("exam1.json", 9, 10, 100, ExamMode::Exam, now)
            .unwrap();
        store
            .record_attempt_at("exam2.json", 4, 10, 50, ExamMode::Exam, now)
            .unwrap();

        let stats = store.global_stats().unwrap();
        assert_eq!(stats.total_exams_attempted, 2);
        assert_eq!(stats.total_exams_completed, 1);
        assert_eq!(stats.average_score, 65);
        assert_eq!(stats.total_study_time, 150);
        assert_eq!(stats.best_score, 90);
        assert_eq!(stats.last_activity_timestamp, Some(now));

        assert!(store.reset_exam("exam1.json").unwrap());
        let stats = store.global_stats().unwrap();
        assert_eq!(stats.total_exams_attempted, 1);
        assert_eq!(stats.best_score, 40);
        assert_eq!(stats.total_study_time, 50);

        assert!(store.reset_exam("exam2.json").unwrap());
        assert_eq!(store.global_stats().unwrap(), GlobalStats::default());
        assert!(!store.reset_exam("exam2.json").unwrap());
    }

    #[test]
    fn empty_store_reads_as_defaults() {
        let mut store = store();
        assert_eq!(store.get_progress("exam1.json").unwrap(), None);
        assert_eq!(store.global_stats().unwrap(), GlobalStats::default());
        assert!(store.all_progress().unwrap().is_empty());
        assert_eq!(store.backend().write_count(), 0);
    }

    #[test]
    fn reset_all_clears_everything() {
        let mut store = store();
        store
            .record_attempt("exam1.json", 1, 2, 5, ExamMode::Exam)
            .unwrap();
        store.reset_all().unwrap();
        assert!(store.all_progress().unwrap().is_empty());
        assert_eq!(store.global_stats().unwrap(), GlobalStats::default());
    }

    fn legacy_blob() -> serde_json::Value {
        json!({
            "userProgress": {
                "exam7.json": {
                    "attempts": 2,
                    "bestScore": 7,
                    "bestPercentage": 70,
                    "lastScore": 5,
                    "lastPercentage": 50,
                    "lastAttempt": "2024-02-10T12:00:00.000Z",
                    "totalTimeSpent": 420,
                    "status": "needs-review",
                    "mode": "exam",
                    "completed": false
                }
            },
            "globalStats": {
                "totalExamsCompleted": 0,
                "totalExamsAttempted": 1,
                "averageScore": 70,
                "totalStudyTime": 420,
                "bestScore": 70,
                "lastActivity": "2024-02-10T12:00:00.000Z"
            }
        })
    }

    #[test]
    fn legacy_record_is_backfilled_and_persisted_once() {
        let mut store = ProgressStore::new(MemoryStore::with_value(STORAGE_KEY, legacy_blob()));

        let first = store.get_progress("exam7.json").unwrap().unwrap();
        assert!(first.all_attempts.is_empty());
        assert_eq!(first.average_percentage, 70);
        assert_eq!(first.attempt_count, 2);
        assert_eq!(store.backend().write_count(), 1);

        let second = store.get_progress("exam7.json").unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(store.backend().write_count(), 1);

        let stored = store.backend().get(STORAGE_KEY).unwrap().unwrap();
        assert_eq!(stored["userProgress"]["exam7.json"]["schemaVersion"], 2);
        assert_eq!(stored["userProgress"]["exam7.json"]["allAttempts"], json!([]));
    }

    #[test]
    fn attempt_on_legacy_record_starts_history() {
        let mut store = ProgressStore::new(MemoryStore::with_value(STORAGE_KEY, legacy_blob()));
        let progress = store
            .record_attempt_at("exam7.json", 9, 10, 60, ExamMode::Exam, ts("2024-05-01T08:00:00Z"))
            .unwrap();

        assert_eq!(progress.attempt_count, 3);
        assert_eq!(progress.all_attempts.len(), 1);
        assert_eq!(progress.average_percentage, 90);
        assert_eq!(progress.best_percentage, 90);
        assert_eq!(progress.status, ProgressStatus::Passed);
        assert_eq!(progress.total_time_spent_seconds, 480);
    }

    #[test]
    fn badge_projection() {
        let mut store = store();
        assert_eq!(store.badge_info("exam1.json").unwrap(), BadgeInfo::new_exam());

        store
            .record_attempt_at("exam1.json", 3, 5, 30, ExamMode::Exam, ts("2024-05-01T08:00:00Z"))
            .unwrap();
        let badge = store.badge_info("exam1.json").unwrap();
        assert_eq!(badge.status, ProgressStatus::InProgress);
        assert_eq!(badge.best_score, Some(60));
        assert_eq!(badge.average_score, Some(60));
        assert_eq!(badge.attempt_count, 1);
        assert_eq!(badge.label(), "In progress");
    }

    #[test]
    fn corrupt_blob_is_an_error() {
        let mut store = ProgressStore::new(MemoryStore::with_value(STORAGE_KEY, json!([1, 2])));
        assert!(matches!(
            store.get_progress("exam1.json"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn reads_document_written_under_browser_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        std::fs::write(
            &path,
            serde_json::to_string(&json!({ "qcm-java-progress": legacy_blob() })).unwrap(),
        )
        .unwrap();

        let mut store = ProgressStore::new(FileStore::new(&path));
        let progress = store.get_progress("exam7.json").unwrap().unwrap();
        assert_eq!(progress.attempt_count, 2);
        assert_eq!(progress.average_percentage, 70);
        assert_eq!(store.badge_info("exam7.json").unwrap().attempt_count, 2);
    }

    #[test]
    fn reset_all_writes_empty_document() {
        let mut store = store();
        store
            .record_attempt("exam1.json", 3, 5, 30, ExamMode::Exam)
            .unwrap();
        store.reset_all().unwrap();

        let stored = store.backend().get(STORAGE_KEY).unwrap().unwrap();
        assert_eq!(stored["userProgress"], json!({}));
        assert_eq!(stored["globalStats"]["totalExamsAttempted"], 0);
    }

    #[test]
    fn file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");

        let mut store = ProgressStore::new(FileStore::new(&path));
        store
            .record_attempt("exam1.json", 5, 5, 42, ExamMode::Train)
            .unwrap();

        let mut reopened = ProgressStore::new(FileStore::new(&path));
        let progress = reopened.get_progress("exam1.json").unwrap().unwrap();
        assert_eq!(progress.best_percentage, 100);
        assert_eq!(progress.mode, ExamMode::Train);
        assert!(progress.completed);
    }

    #[test]
    fn study_time_formatting() {
        assert_eq!(format_study_time(0), "0s");
        assert_eq!(format_study_time(59), "59s");
        assert_eq!(format_study_time(90), "2min");
        assert_eq!(format_study_time(3599), "60min");
        assert_eq!(format_study_time(5400), "2h");
    }
}
