//! Session launch: query parameters and the `Loading → Active` transition.

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::model::ExamMode;
use crate::session::ExamSession;
use crate::traits::ExamSource;

/// Exam opened when the launch query names none.
pub const DEFAULT_EXAM_ID: &str = "exam1.json";

/// Which exam to open and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchParams {
    pub exam_id: String,
    pub mode: ExamMode,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            exam_id: DEFAULT_EXAM_ID.to_string(),
            mode: ExamMode::Exam,
        }
    }
}

impl LaunchParams {
    pub fn new(exam_id: impl Into<String>, mode: ExamMode) -> Self {
        Self {
            exam_id: exam_id.into(),
            mode,
        }
    }

    /// Parse a navigation query string such as `?exam=exam5.json&mode=train`.
    ///
    /// Missing or empty values take the defaults; an unknown `mode` falls
    /// back to timed mode.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        let query = query.trim_start_matches('?');

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "exam" => params.exam_id = value.into_owned(),
                "mode" => match value.parse() {
                    Ok(mode) => params.mode = mode,
                    Err(e) => tracing::warn!("{e}, falling back to exam mode"),
                },
                _ => {}
            }
        }

        params
    }
}

/// Fetch the exam named by `params` and start a session on it.
///
/// While this future is pending the session is `Loading`. A fetch or
/// validation failure is returned as-is and no session exists.
pub async fn launch(
    source: &dyn ExamSource,
    params: &LaunchParams,
) -> Result<ExamSession, LoadError> {
    tracing::debug!(source = source.name(), exam = %params.exam_id, "loading exam");
    let exam = source.load(&params.exam_id).await?;
    Ok(ExamSession::start(exam, params.mode, chrono::Utc::now()))
}
