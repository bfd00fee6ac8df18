//! Markdown review rendering.
//!
//! Question prompts may embed `<code>` fragments. A fragment tagged
//! `class='language-x'` becomes a fenced block, any other fragment becomes
//! inline code. HTML entities are decoded everywhere.

use examkit_core::scoring::ResultBand;
use examkit_core::ReviewRecord;

use crate::json::ReviewExport;

/// Decode the entities exam documents use.
fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Language named by a `class='language-x'` attribute, if any.
fn language_of(tag: &str) -> Option<&str> {
    let start = tag.find("language-")? + "language-".len();
    let rest = &tag[start..];
    let end = rest
        .find(|c: char| c == '\'' || c == '"' || c.is_whitespace())
        .unwrap_or(rest.len());
    Some(&rest[..end]).filter(|lang| !lang.is_empty())
}

/// Render prompt or option text with embedded code fragments as Markdown.
pub fn render_fragment(text: &str) -> String {
    let text = text.replace("<pre>", "").replace("</pre>", "");
    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_str();

    while let Some(open) = rest.find("<code") {
        let Some(tag_end) = rest[open..].find('>').map(|i| open + i) else {
            break;
        };
        let Some(close) = rest[tag_end..].find("</code>").map(|i| tag_end + i) else {
            break;
        };

        out.push_str(&decode_entities(&rest[..open]));
        let code = decode_entities(&rest[tag_end + 1..close]);
        match language_of(&rest[open..tag_end]) {
            Some(lang) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&format!("\n```{lang}\n{}\n```\n", code.trim_matches('\n')));
            }
            None => out.push_str(&format!("`{code}`")),
        }
        rest = &rest[close + "</code>".len()..];
    }
    out.push_str(&decode_entities(rest));
    out
}

fn band_label(band: ResultBand) -> &'static str {
    match band {
        ResultBand::Success => "Excellent",
        ResultBand::Warning => "Good",
        ResultBand::Danger => "Keep practicing",
    }
}

fn render_record(md: &mut String, record: &ReviewRecord) {
    let verdict = if record.is_correct { "correct" } else { "incorrect" };
    md.push_str(&format!(
        "### {}. {} ({verdict})\n\n",
        record.index + 1,
        decode_entities(&record.topic)
    ));
    md.push_str(&render_fragment(&record.prompt));
    md.push_str("\n\n");

    for (i, option) in record.options.iter().enumerate() {
        let mark = match (record.is_key(i), record.was_selected(i)) {
            (true, true) => "[x] ✓",
            (true, false) => "[ ] ✓",
            (false, true) => "[x] ✗",
            (false, false) => "[ ]",
        };
        md.push_str(&format!("- {mark} {}\n", render_fragment(option)));
    }
    if !record.recorded_response.is_answered() {
        md.push_str("\n_Not answered._\n");
    }
    if let Some(explanation) = &record.explanation {
        md.push_str(&format!("\n> {}\n", render_fragment(explanation)));
    }
    md.push('\n');
}

/// Render a full review as Markdown.
pub fn render_review(export: &ReviewExport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", decode_entities(&export.exam_title)));
    md.push_str(&format!(
        "**Score:** {}/{} ({}%, {})  \n",
        export.score.correct_count,
        export.score.total_count,
        export.score.percentage,
        band_label(export.score.band())
    ));
    md.push_str(&format!(
        "**Mode:** {} | **Time:** {}s | **Finished:** {}\n\n",
        export.mode,
        export.time_spent_seconds,
        export.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    for record in &export.records {
        render_record(&mut md, record);
    }
    md
}
