//! The `examkit progress` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examkit_loader::config::load_config_from;
use examkit_store::{format_study_time, BadgeInfo, GlobalStats};

use super::open_store;

pub fn execute(exam: Option<String>, format: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let mut store = open_store(&config);

    if let Some(exam_id) = exam {
        let badge = store.badge_info(&exam_id)?;
        match format.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&badge)?),
            "text" => print_badge(&exam_id, &badge),
            other => anyhow::bail!("unknown format: {other}"),
        }
        return Ok(());
    }

    let all = store.all_progress()?;
    let stats = store.global_stats()?;

    match format.as_str() {
        "json" => {
            let value = serde_json::json!({
                "userProgress": all,
                "globalStats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        "text" => {
            if all.is_empty() {
                println!("No progress recorded yet. Run `examkit take` to start an exam.");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_header(vec![
                "Exam",
                "Status",
                "Best",
                "Average",
                "Attempts",
                "Time",
                "Last attempt",
            ]);
            for (exam_id, progress) in &all {
                let badge = BadgeInfo::from(progress);
                table.add_row(vec![
                    Cell::new(exam_id),
                    Cell::new(format!("{} {}", badge.status.marker(), badge.label())),
                    Cell::new(format!("{}%", progress.best_percentage)),
                    Cell::new(format!("{}%", progress.average_percentage)),
                    Cell::new(progress.attempt_count),
                    Cell::new(format_study_time(progress.total_time_spent_seconds)),
                    Cell::new(
                        progress
                            .last_attempt_timestamp
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                ]);
            }
            println!("{table}");
            print_global_stats(&stats);
        }
        other => anyhow::bail!("unknown format: {other}"),
    }

    Ok(())
}

fn print_badge(exam_id: &str, badge: &BadgeInfo) {
    let score = |v: Option<u32>| v.map_or_else(|| "-".to_string(), |p| format!("{p}%"));
    println!("{exam_id}: {} {}", badge.status.marker(), badge.label());
    println!("  Best score:    {}", score(badge.best_score));
    println!("  Average score: {}", score(badge.average_score));
    println!("  Attempts:      {}", badge.attempt_count);
    if let Some(last) = badge.last_attempt_timestamp {
        println!("  Last attempt:  {}", last.format("%Y-%m-%d %H:%M UTC"));
    }
}

fn print_global_stats(stats: &GlobalStats) {
    println!(
        "\nExams attempted: {} | completed: {} | average: {}% | best: {}% | study time: {}",
        stats.total_exams_attempted,
        stats.total_exams_completed,
        stats.average_score,
        stats.best_score,
        format_study_time(stats.total_study_time)
    );
}
