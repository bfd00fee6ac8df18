//! examkit-loader: Exam document sources.
//!
//! Implements the `ExamSource` trait for the local file system, HTTP servers
//! and an in-memory mock, plus the configuration that picks one of them.

pub mod config;
pub mod file;
pub mod http;
pub mod mock;

pub use config::{create_source, load_config, ExamkitConfig, SourceConfig};
pub use examkit_core::LoadError;
pub use file::FileSource;
pub use http::HttpSource;
pub use mock::MockSource;
