//! Exam documents served over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use examkit_core::traits::ExamSource;
use examkit_core::LoadError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches `GET {base_url}/{exam_id}`.
pub struct HttpSource {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self, LoadError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LoadError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ExamSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch(&self, exam_id: &str) -> Result<String, LoadError> {
        let url = format!("{}/{}", self.base_url, exam_id.trim_start_matches('/'));

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                LoadError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                LoadError::Network(format!("exam server not reachable at {}", self.base_url))
            } else {
                LoadError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(LoadError::NotFound(exam_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(LoadError::Status {
                exam_id: exam_id.to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LoadError::Network(format!("failed to read response body: {e}")))?;
        tracing::debug!(bytes = body.len(), "fetched exam document");
        Ok(body)
    }
}
