//! examkit-store: Durable progress ledger for examkit.
//!
//! Keeps one record per exam (attempt history, best and average scores,
//! status) plus global statistics derived from all records. The whole
//! document is stored as a single blob under one key, so every write
//! replaces it atomically.
//!
//! - `backend` - key-value substrates (in-memory, JSON file)
//! - `model` - persisted shapes and badge projection
//! - `migrate` - versioned upgrade of records written by older releases
//! - `store` - `ProgressStore` operations

pub mod backend;
pub mod error;
pub mod migrate;
pub mod model;
pub mod store;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use error::StoreError;
pub use model::{
    AttemptRecord, BadgeInfo, ExamProgress, GlobalStats, ProgressDocument, ProgressStatus,
};
pub use store::{format_study_time, ProgressStore, PASS_THRESHOLD, STORAGE_KEY};
