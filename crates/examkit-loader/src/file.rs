//! Exam documents read from a local directory.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use examkit_core::traits::ExamSource;
use examkit_core::LoadError;

/// Reads `<root>/<exam_id>`.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, exam_id: &str) -> Result<PathBuf, LoadError> {
        let relative = Path::new(exam_id);
        // Exam ids name files under the root, never outside it.
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if exam_id.is_empty() || escapes {
            return Err(LoadError::NotFound(exam_id.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ExamSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, exam_id: &str) -> Result<String, LoadError> {
        let path = self.resolve(exam_id)?;
        tracing::debug!(path = %path.display(), "reading exam document");

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => LoadError::NotFound(exam_id.to_string()),
                _ => LoadError::Network(format!("failed to read {}: {e}", path.display())),
            })
    }
}
