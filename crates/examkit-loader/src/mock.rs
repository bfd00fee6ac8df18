//! Mock source for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use examkit_core::traits::ExamSource;
use examkit_core::LoadError;

/// An in-memory exam source serving fixed documents by id.
pub struct MockSource {
    documents: HashMap<String, String>,
    /// Status returned for every request instead of a document, if set.
    failure_status: Option<u16>,
    call_count: AtomicU32,
}

impl MockSource {
    pub fn new(documents: HashMap<String, String>) -> Self {
        Self {
            documents,
            failure_status: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// A source with a single document.
    pub fn with_document(exam_id: &str, json: &str) -> Self {
        Self::new(HashMap::from([(exam_id.to_string(), json.to_string())]))
    }

    /// A source whose every fetch fails with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            documents: HashMap::new(),
            failure_status: Some(status),
            call_count: AtomicU32::new(0),
        }
    }

    /// Number of fetches made against this source.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ExamSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, exam_id: &str) -> Result<String, LoadError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if let Some(status) = self.failure_status {
            return Err(LoadError::Status {
                exam_id: exam_id.to_string(),
                status,
            });
        }

        self.documents
            .get(exam_id)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(exam_id.to_string()))
    }
}
