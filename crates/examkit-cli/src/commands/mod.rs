pub mod init;
pub mod progress;
pub mod reset;
pub mod take;
pub mod validate;

use examkit_loader::ExamkitConfig;
use examkit_store::{FileStore, ProgressStore};

/// Progress store at the configured path.
pub(crate) fn open_store(config: &ExamkitConfig) -> ProgressStore<FileStore> {
    ProgressStore::new(FileStore::new(&config.progress_path))
}
