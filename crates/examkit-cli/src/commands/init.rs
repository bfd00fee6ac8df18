//! The `examkit init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("examkit.toml").exists() {
        println!("examkit.toml already exists, skipping.");
    } else {
        std::fs::write("examkit.toml", SAMPLE_CONFIG)?;
        println!("Created examkit.toml");
    }

    std::fs::create_dir_all("exams")?;
    let example_path = std::path::Path::new("exams/exam1.json");
    if example_path.exists() {
        println!("exams/exam1.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_EXAM)?;
        println!("Created exams/exam1.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: examkit validate --exam exams/exam1.json");
    println!("  2. Run: examkit take --mode train");
    println!("  3. Run: examkit progress");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examkit configuration

default_exam = "exam1.json"
default_mode = "exam"
progress_path = "./examkit-progress.json"
request_timeout_secs = 30

[source]
type = "file"
root = "./exams"

# Fetch exams over HTTP instead:
# [source]
# type = "http"
# base_url = "${EXAMKIT_SOURCE_URL}"
"#;

const EXAMPLE_EXAM: &str = r#"{
  "title": "Java Collections Basics",
  "duration": 5,
  "questions": [
    {
      "topic": "Lists",
      "question": "Which implementation keeps insertion order and allows duplicates?",
      "options": ["HashSet", "ArrayList", "TreeSet", "HashMap"],
      "answer": 1,
      "explanation": "ArrayList is an ordered List and accepts duplicate elements."
    },
    {
      "topic": "Streams",
      "question": "Which operations are terminal?",
      "options": ["map", "collect", "filter", "forEach"],
      "answer": [1, 3],
      "type": "multiple",
      "explanation": "collect and forEach consume the stream; map and filter are intermediate."
    },
    {
      "topic": "Generics",
      "question": "What does <code>List&lt;? extends Number&gt;</code> accept?",
      "options": ["A list of Integer", "A list of Object", "A list of String"],
      "answer": 0,
      "explanation": "An upper-bounded wildcard accepts lists of Number or any subtype."
    }
  ]
}
"#;
