//! Versioned upgrade of stored progress records.
//!
//! Runs on every load. Records already at [`CURRENT_SCHEMA_VERSION`] are left
//! untouched, so a second load after the upgrade was written back is a no-op.

use crate::model::{ExamProgress, ProgressDocument, CURRENT_SCHEMA_VERSION};

/// Upgrades every record in the document. Returns the number of records
/// changed; the caller persists the document when this is non-zero.
pub fn upgrade_document(doc: &mut ProgressDocument) -> usize {
    let mut upgraded = 0;
    for (exam_id, progress) in doc.user_progress.iter_mut() {
        if upgrade(progress) {
            tracing::debug!(exam_id = %exam_id, "upgraded progress record");
            upgraded += 1;
        }
    }
    upgraded
}

/// Brings one record to the current schema. Returns `true` if it changed.
pub fn upgrade(progress: &mut ExamProgress) -> bool {
    if progress.schema_version >= CURRENT_SCHEMA_VERSION {
        return false;
    }
    if progress.schema_version < 2 {
        v1_to_v2(progress);
    }
    true
}

/// v1 records predate the attempt history. Their average is seeded from the
/// best percentage, the only per-attempt figure they kept.
fn v1_to_v2(progress: &mut ExamProgress) {
    progress.all_attempts = Vec::new();
    progress.average_percentage = progress.best_percentage;
    progress.schema_version = 2;
}

#[cfg(test)]
mod tests {
    use super::*;
    use examkit_core::ExamMode;

    fn legacy(best: u32) -> ExamProgress {
        ExamProgress {
            schema_version: 1,
            attempt_count: 1,
            best_percentage: best,
            ..ExamProgress::new(ExamMode::Exam)
        }
    }

    #[test]
    fn v1_backfills_history_and_average() {
        let mut progress = legacy(70);
        assert!(upgrade(&mut progress));
        assert_eq!(progress.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(progress.average_percentage, 70);
        assert!(progress.all_attempts.is_empty());
    }

    #[test]
    fn current_records_are_untouched() {
        let mut progress = ExamProgress::new(ExamMode::Exam);
        progress.average_percentage = 12;
        let before = progress.clone();
        assert!(!upgrade(&mut progress));
        assert_eq!(progress, before);
    }

    #[test]
    fn document_upgrade_counts_changed_records() {
        let mut doc = ProgressDocument::default();
        doc.user_progress.insert("exam1.json".into(), legacy(50));
        doc.user_progress
            .insert("exam2.json".into(), ExamProgress::new(ExamMode::Train));

        assert_eq!(upgrade_document(&mut doc), 1);
        assert_eq!(upgrade_document(&mut doc), 0);
    }
}
