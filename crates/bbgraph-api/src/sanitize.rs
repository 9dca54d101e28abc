//! Input cleaning applied before anything reaches the store.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)\s*>").expect("valid regex")
});
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Single-line text: tags stripped, all whitespace runs collapsed to one
/// space, trimmed. Used for titles and tag names.
pub fn text_field(raw: &str) -> String {
    let stripped = strip_markup(raw);
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Multi-line text: tags stripped, line endings normalized, trailing spaces
/// and runs of blank lines removed. Used for topic and reply bodies.
pub fn textarea(raw: &str) -> String {
    let stripped = strip_markup(&raw.replace("\r\n", "\n").replace('\r', "\n"));
    let lines: Vec<&str> = stripped.lines().map(str::trim_end).collect();
    BLANK_LINES.replace_all(&lines.join("\n"), "\n\n").trim().to_string()
}

fn strip_markup(raw: &str) -> String {
    let without_scripts = SCRIPT_BLOCKS.replace_all(raw, "");
    TAGS.replace_all(&without_scripts, "")
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}
