//! Configuration and exam source factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use examkit_core::launch::DEFAULT_EXAM_ID;
use examkit_core::traits::ExamSource;
use examkit_core::ExamMode;

use crate::file::FileSource;
use crate::http::HttpSource;

/// Where exam documents come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    File {
        #[serde(default = "default_data_dir")]
        root: PathBuf,
    },
    Http {
        base_url: String,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::File {
            root: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./exams")
}

/// Top-level examkit configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamkitConfig {
    /// Exam document source.
    #[serde(default)]
    pub source: SourceConfig,
    /// Exam opened when none is named.
    #[serde(default = "default_exam")]
    pub default_exam: String,
    /// Mode used when none is named.
    #[serde(default)]
    pub default_mode: ExamMode,
    /// File holding the progress store.
    #[serde(default = "default_progress_path")]
    pub progress_path: PathBuf,
    /// HTTP request timeout.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_exam() -> String {
    DEFAULT_EXAM_ID.to_string()
}
fn default_progress_path() -> PathBuf {
    PathBuf::from("./examkit-progress.json")
}
fn default_timeout() -> u64 {
    30
}

impl Default for ExamkitConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            default_exam: default_exam(),
            default_mode: ExamMode::default(),
            progress_path: default_progress_path(),
            request_timeout_secs: default_timeout(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied through verbatim and never rescanned.
/// An unterminated `${` is kept as literal text.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + 2 + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + 2 + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examkit.toml` in the current directory
/// 2. `~/.config/examkit/config.toml`
///
/// Environment variable overrides: `EXAMKIT_SOURCE_URL`, `EXAMKIT_DATA_DIR`.
pub fn load_config() -> Result<ExamkitConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamkitConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examkit.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            toml::from_str::<ExamkitConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamkitConfig::default(),
    };

    // Apply env var overrides; a URL wins over a directory.
    if let Ok(dir) = std::env::var("EXAMKIT_DATA_DIR") {
        config.source = SourceConfig::File {
            root: PathBuf::from(dir),
        };
    }
    if let Ok(url) = std::env::var("EXAMKIT_SOURCE_URL") {
        config.source = SourceConfig::Http { base_url: url };
    }

    config.source = match config.source {
        SourceConfig::File { root } => SourceConfig::File {
            root: resolve_path(&root),
        },
        SourceConfig::Http { base_url } => SourceConfig::Http {
            base_url: resolve_env_vars(&base_url),
        },
    };
    config.progress_path = resolve_path(&config.progress_path);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examkit"))
}

/// Create an exam source from configuration.
pub fn create_source(config: &ExamkitConfig) -> Result<Box<dyn ExamSource>> {
    match &config.source {
        SourceConfig::File { root } => Ok(Box::new(FileSource::new(root.clone()))),
        SourceConfig::Http { base_url } => {
            let source = HttpSource::with_timeout(base_url, config.request_timeout_secs)
                .with_context(|| format!("failed to create HTTP source for {base_url}"))?;
            Ok(Box::new(source))
        }
    }
}
