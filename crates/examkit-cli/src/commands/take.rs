//! The `examkit take` command.
//!
//! Drives one session from stdin lines and a one-second countdown tick,
//! then records the attempt in the progress store.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{Cell, Table};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use examkit_core::session::{Feedback, QuestionMark, QuestionView, TerminationCause};
use examkit_core::{
    launch, Action, ExamMode, ExamSession, LaunchParams, SessionObserver, SessionOutcome,
};
use examkit_loader::config::{create_source, load_config_from, ExamkitConfig};
use examkit_report::{render_fragment, render_review, ReviewExport};
use examkit_store::format_study_time;

use super::open_store;

/// Console renderer for session changes.
struct TerminalRenderer;

impl SessionObserver for TerminalRenderer {
    fn on_question_shown(&self, view: &QuestionView<'_>) {
        print_question(view);
    }

    fn on_selection_changed(&self, view: &QuestionView<'_>) {
        let picked: Vec<String> = view.selection.iter().map(|i| (i + 1).to_string()).collect();
        if picked.is_empty() {
            println!("  Selected: none");
        } else {
            println!("  Selected: {}", picked.join(", "));
        }
    }

    fn on_feedback(&self, feedback: &Feedback) {
        let correct: Vec<String> = feedback
            .correct_indices
            .iter()
            .map(|i| (i + 1).to_string())
            .collect();
        if feedback.is_correct {
            println!("  Correct!");
        } else {
            println!("  Incorrect. Answer: {}", correct.join(", "));
        }
        if let Some(explanation) = &feedback.explanation {
            println!("  {}", render_fragment(explanation));
        }
        println!("  (press Enter to continue)");
    }

    fn on_tick(&self, remaining_seconds: u64) {
        if remaining_seconds % 60 == 0 || remaining_seconds <= 10 {
            println!("  ⏱ {}", format_clock(remaining_seconds));
        }
    }

    fn on_terminated(&self, outcome: &SessionOutcome) {
        println!("\nSession {}.", cause_text(outcome.cause));
    }
}

/// One parsed line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Act(Action),
    Help,
    Map,
    Empty,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim().to_lowercase();
    let parse_number = |s: &str| match s.trim().parse::<usize>() {
        Ok(0) => Err("numbering starts at 1".to_string()),
        Ok(n) => Ok(n - 1),
        Err(_) => Err(format!("not a number: {s}")),
    };

    let input = match line.as_str() {
        "" => Input::Empty,
        "n" | "next" => Input::Act(Action::Next),
        "p" | "prev" | "previous" => Input::Act(Action::Previous),
        "c" | "check" => Input::Act(Action::Check),
        "a" | "ack" | "ok" => Input::Act(Action::Acknowledge),
        "q" | "quit" | "end" | "finish" => Input::Act(Action::End),
        "h" | "help" | "?" => Input::Help,
        "m" | "map" => Input::Map,
        other => {
            if let Some(rest) = other
                .strip_prefix("goto ")
                .or_else(|| other.strip_prefix("j "))
            {
                Input::Act(Action::JumpTo(parse_number(rest)?))
            } else if other.chars().all(|c| c.is_ascii_digit()) {
                Input::Act(Action::Select(parse_number(other)?))
            } else {
                return Err(format!("unknown command: {other} (type `help`)"));
            }
        }
    };
    Ok(input)
}

/// Resolve which exam to open from flags, a launch query and config defaults.
fn launch_params(
    config: &ExamkitConfig,
    exam: Option<String>,
    mode: Option<String>,
    query: Option<String>,
) -> Result<LaunchParams> {
    if let Some(query) = query {
        return Ok(LaunchParams::from_query(&query));
    }
    let mode = match mode {
        Some(m) => m.parse::<ExamMode>().map_err(anyhow::Error::msg)?,
        None => config.default_mode,
    };
    let exam_id = exam.unwrap_or_else(|| config.default_exam.clone());
    Ok(LaunchParams::new(exam_id, mode))
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    exam: Option<String>,
    mode: Option<String>,
    query: Option<String>,
    review: bool,
    export: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "json" | "markdown"),
        "unknown format: {format}"
    );

    let config = load_config_from(config_path.as_deref())?;
    let params = launch_params(&config, exam, mode, query)?;
    let source = create_source(&config)?;

    let mut session = launch(source.as_ref(), &params)
        .await
        .with_context(|| format!("failed to load exam {}", params.exam_id))?;

    let doc = session.exam();
    println!(
        "{} ({} questions, {} mode)",
        doc.title,
        doc.len(),
        session.mode()
    );
    if session.mode().is_timed() {
        println!("Time allowed: {} min", doc.duration_minutes);
    }
    print_help(session.mode());

    let renderer = TerminalRenderer;
    renderer.on_question_shown(&session.current_view());
    session.subscribe(Box::new(renderer));

    drive(&mut session).await?;
    let outcome = session
        .outcome()
        .cloned()
        .context("session ended without an outcome")?;

    print_summary(&session.exam().title, &outcome);

    let mut store = open_store(&config);
    let progress = store.record_attempt(
        &outcome.exam_id,
        outcome.score.correct_count,
        outcome.score.total_count,
        outcome.time_spent_seconds,
        outcome.mode,
    )?;
    println!(
        "Progress: {} {} (best {}%, average {}%, {} attempt(s))",
        progress.status.marker(),
        progress.status.label(),
        progress.best_percentage,
        progress.average_percentage,
        progress.attempt_count
    );

    let artifact = ReviewExport::from_outcome(&outcome, &session.exam().title);
    if review {
        println!("\n{}", render_review(&artifact));
    }
    if let Some(path) = export {
        if format == "markdown" {
            std::fs::write(&path, render_review(&artifact))
                .with_context(|| format!("failed to write review to {}", path.display()))?;
        } else {
            artifact.save_json(&path)?;
        }
        println!("Review written to {}", path.display());
    }

    Ok(())
}

/// Feed stdin lines and countdown ticks to the session until it terminates.
/// Closing stdin ends the session.
async fn drive(session: &mut ExamSession) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;
    let timed = session.mode().is_timed();

    while !session.is_terminated() {
        tokio::select! {
            _ = ticker.tick(), if timed => {
                session.dispatch(Action::Tick, Utc::now())?;
            }
            line = lines.next_line() => {
                match line.context("failed to read input")? {
                    Some(line) => handle_line(session, &line),
                    None => {
                        session.dispatch(Action::End, Utc::now())?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn handle_line(session: &mut ExamSession, line: &str) {
    let action = match parse_input(line) {
        Ok(Input::Act(action)) => action,
        Ok(Input::Empty) if session.pending_feedback().is_some() => Action::Acknowledge,
        Ok(Input::Empty) => return,
        Ok(Input::Help) => {
            print_help(session.mode());
            return;
        }
        Ok(Input::Map) => {
            print_map(session);
            return;
        }
        Err(msg) => {
            println!("  {msg}");
            return;
        }
    };

    if let Err(e) = session.dispatch(action, Utc::now()) {
        println!("  {e}");
    }
}

fn print_question(view: &QuestionView<'_>) {
    let clock = view
        .remaining_seconds
        .map(|s| format!("  ⏱ {}", format_clock(s)))
        .unwrap_or_default();
    println!("\nQuestion {} / {}{clock}", view.index + 1, view.total);
    println!("Topic: {}", view.question.topic);
    println!("{}", render_fragment(&view.question.prompt));

    let multiple = view.question.is_multiple();
    for (i, option) in view.question.options.iter().enumerate() {
        let picked = view.selection.contains(&i);
        let mark = match (multiple, picked) {
            (true, true) => "[x]",
            (true, false) => "[ ]",
            (false, true) => "(•)",
            (false, false) => "( )",
        };
        println!("  {mark} {}. {}", i + 1, render_fragment(option));
    }
    if multiple {
        println!("  (several answers possible)");
    }
}

fn print_help(mode: ExamMode) {
    println!("Commands: <number> toggle option");
    match mode {
        ExamMode::Exam => {
            println!("          n next / finish, p previous, j <n> jump, m question map, q end");
        }
        ExamMode::Train => println!("          c check, Enter continue, q end"),
    }
}

fn print_map(session: &ExamSession) {
    if !session.mode().is_timed() {
        println!("  The question map is only available in exam mode.");
        return;
    }
    let cells: Vec<String> = session
        .indicator()
        .iter()
        .enumerate()
        .map(|(i, mark)| {
            let sign = match mark {
                QuestionMark::Current => '>',
                QuestionMark::Answered => '✓',
                QuestionMark::Unanswered => '·',
            };
            format!("{}{sign}", i + 1)
        })
        .collect();
    println!("  {}", cells.join(" "));
}

fn print_summary(title: &str, outcome: &SessionOutcome) {
    let mut table = Table::new();
    table.set_header(vec!["Exam", "Score", "Percentage", "Time", "Ended"]);
    table.add_row(vec![
        Cell::new(title),
        Cell::new(format!(
            "{}/{}",
            outcome.score.correct_count, outcome.score.total_count
        )),
        Cell::new(format!("{}%", outcome.score.percentage)),
        Cell::new(format_study_time(outcome.time_spent_seconds)),
        Cell::new(cause_text(outcome.cause)),
    ]);
    println!("{table}");
}

fn cause_text(cause: TerminationCause) -> &'static str {
    match cause {
        TerminationCause::Completed => "completed",
        TerminationCause::TimeExpired => "time expired",
        TerminationCause::EndedByUser => "ended early",
    }
}

fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
