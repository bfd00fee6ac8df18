//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn examkit() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("examkit").unwrap();
    cmd.env_remove("EXAMKIT_SOURCE_URL")
        .env_remove("EXAMKIT_DATA_DIR")
        .env_remove("RUST_LOG");
    cmd
}

const EXAM: &str = r#"{
  "title": "Collections Drill",
  "duration": 10,
  "questions": [
    {"topic": "Lists", "question": "Ordered?", "options": ["HashSet", "ArrayList"], "answer": 1},
    {"topic": "Streams", "question": "Terminal ops?", "options": ["map", "collect", "forEach"], "answer": [1, 2]}
  ]
}"#;

/// A workspace with a config, one exam and a progress file location.
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("exams")).unwrap();
    std::fs::write(dir.path().join("exams/drill.json"), EXAM).unwrap();
    std::fs::write(
        dir.path().join("examkit.toml"),
        "default_exam = \"drill.json\"\nprogress_path = \"progress.json\"\n\n[source]\ntype = \"file\"\nroot = \"exams\"\n",
    )
    .unwrap();
    dir
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    examkit()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created examkit.toml"))
        .stdout(predicate::str::contains("Created exams/exam1.json"));

    assert!(dir.path().join("examkit.toml").exists());
    assert!(dir.path().join("exams/exam1.json").exists());

    examkit()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_starter_exam() {
    let dir = TempDir::new().unwrap();
    examkit().current_dir(dir.path()).arg("init").assert().success();

    examkit()
        .current_dir(dir.path())
        .args(["validate", "--exam", "exams/exam1.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 questions, 1 multi-answer"))
        .stdout(predicate::str::contains("Exam document valid"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("warn.json");
    std::fs::write(
        &path,
        r#"{"title":"T","duration":5,"questions":[
            {"topic":"","question":"q","options":["a","a"],"answer":0}
        ]}"#,
    )
    .unwrap();

    examkit()
        .args(["validate", "--exam"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[Q1] WARNING: topic is empty"))
        .stdout(predicate::str::contains("2 warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    examkit()
        .args(["validate", "--exam", "nonexistent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_rejects_empty_exam() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.json");
    std::fs::write(&path, r#"{"title":"T","duration":5,"questions":[]}"#).unwrap();

    examkit()
        .args(["validate", "--exam"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no questions"));
}

#[test]
fn take_training_session_records_progress() {
    let dir = workspace();

    examkit()
        .current_dir(dir.path())
        .args(["take", "--mode", "train"])
        .write_stdin("2\ncheck\n\n2\n3\ncheck\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 1 / 2"))
        .stdout(predicate::str::contains("Correct!"))
        .stdout(predicate::str::contains("Session completed."))
        .stdout(predicate::str::contains("100%"))
        .stdout(predicate::str::contains("Passed"));

    let stored = read_json(&dir.path().join("progress.json"));
    let entry = &stored["qcm-java-progress"]["userProgress"]["drill.json"];
    assert_eq!(entry["attemptCount"], 1);
    assert_eq!(entry["bestPercentage"], 100);
    assert_eq!(entry["status"], "passed");
    assert_eq!(entry["mode"], "train");
    assert_eq!(entry["completed"], true);
}

#[test]
fn take_exam_ended_by_closing_input() {
    let dir = workspace();

    examkit()
        .current_dir(dir.path())
        .args(["take", "--exam", "drill.json", "--mode", "exam"])
        .write_stdin("2\nn\n2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Time allowed: 10 min"))
        .stdout(predicate::str::contains("Session ended early."))
        .stdout(predicate::str::contains("1/2"))
        .stdout(predicate::str::contains("50%"));

    examkit()
        .current_dir(dir.path())
        .args(["progress", "--exam", "drill.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("In progress"))
        .stdout(predicate::str::contains("Best score:    50%"));
}

#[test]
fn take_rejects_navigation_in_training() {
    let dir = workspace();

    examkit()
        .current_dir(dir.path())
        .args(["take", "--query", "exam=drill.json&mode=train"])
        .write_stdin("n\ncheck\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("next is not available in train mode"))
        .stdout(predicate::str::contains("no option selected"));
}

#[test]
fn take_exports_review() {
    let dir = workspace();

    examkit()
        .current_dir(dir.path())
        .args([
            "take",
            "--mode",
            "exam",
            "--export",
            "review.md",
            "--format",
            "markdown",
        ])
        .write_stdin("1\nn\n2\n3\nn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session completed."))
        .stdout(predicate::str::contains("Review written to review.md"));

    let md = std::fs::read_to_string(dir.path().join("review.md")).unwrap();
    assert!(md.starts_with("# Collections Drill"));
    assert!(md.contains("### 1. Lists (incorrect)"));
    assert!(md.contains("### 2. Streams (correct)"));

    examkit()
        .current_dir(dir.path())
        .args(["take", "--mode", "exam", "--export", "review.json"])
        .write_stdin("2\nn\n2\n3\nn\n")
        .assert()
        .success();

    let review = read_json(&dir.path().join("review.json"));
    assert_eq!(review["examTitle"], "Collections Drill");
    assert_eq!(review["score"]["percentage"], 100);
}

#[test]
fn take_missing_exam_fails() {
    let dir = workspace();

    examkit()
        .current_dir(dir.path())
        .args(["take", "--exam", "nope.json"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load exam nope.json"));

    assert!(!dir.path().join("progress.json").exists());
}

#[test]
fn progress_reset_cycle() {
    let dir = workspace();

    examkit()
        .current_dir(dir.path())
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("No progress recorded yet"));

    examkit()
        .current_dir(dir.path())
        .args(["take", "--mode", "train"])
        .write_stdin("1\ncheck\n\nq\n")
        .assert()
        .success();

    examkit()
        .current_dir(dir.path())
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("drill.json"))
        .stdout(predicate::str::contains("Exams attempted: 1"));

    let output = examkit()
        .current_dir(dir.path())
        .args(["progress", "--format", "json"])
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["globalStats"]["totalExamsAttempted"], 1);
    assert_eq!(value["userProgress"]["drill.json"]["lastPercentage"], 0);

    examkit()
        .current_dir(dir.path())
        .args(["reset", "--exam", "drill.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Progress for drill.json reset"));

    examkit()
        .current_dir(dir.path())
        .args(["reset", "--exam", "drill.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No progress recorded"));

    examkit()
        .current_dir(dir.path())
        .args(["reset", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All progress reset"));
}

#[test]
fn progress_for_unknown_exam_is_new() {
    let dir = workspace();

    examkit()
        .current_dir(dir.path())
        .args(["progress", "--exam", "exam42.json", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"new\""))
        .stdout(predicate::str::contains("\"bestScore\": null"));
}

#[test]
fn reset_requires_a_target() {
    examkit().arg("reset").assert().failure();
}
