//! Core trait definitions for exam sources.
//!
//! Implemented by the `examkit-loader` crate for the file system, HTTP and
//! in-memory backends.

use async_trait::async_trait;

use crate::error::LoadError;
use crate::model::ExamDocument;
use crate::parser::parse_exam_str;

/// A place exam documents are fetched from.
#[async_trait]
pub trait ExamSource: Send + Sync {
    /// Human-readable source name (e.g. "file", "http").
    fn name(&self) -> &str;

    /// Fetch the raw JSON text of an exam document.
    async fn fetch(&self, exam_id: &str) -> Result<String, LoadError>;

    /// Fetch and validate an exam document.
    async fn load(&self, exam_id: &str) -> Result<ExamDocument, LoadError> {
        let body = self.fetch(exam_id).await?;
        parse_exam_str(&body, exam_id)
    }
}
