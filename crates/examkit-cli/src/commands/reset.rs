//! The `examkit reset` command.

use std::path::PathBuf;

use anyhow::Result;

use examkit_loader::config::load_config_from;

use super::open_store;

pub fn execute(exam: Option<String>, all: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let mut store = open_store(&config);

    if all {
        store.reset_all()?;
        println!("All progress reset.");
        return Ok(());
    }

    if let Some(exam_id) = exam {
        if store.reset_exam(&exam_id)? {
            println!("Progress for {exam_id} reset.");
        } else {
            println!("No progress recorded for {exam_id}.");
        }
    }
    Ok(())
}
