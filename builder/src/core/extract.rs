//! Best-effort text extraction over free-form generated output.
//!
//! Generated text frequently arrives wrapped in code fences, preceded by
//! conversational preamble, or with loosely labeled sections. These helpers
//! are line-scanning heuristics, not parsers: each one has a documented
//! deterministic fallback and none of them can fail a stage.

use std::sync::LazyLock;

use regex::Regex;

static OPENING_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```html?[^\S\n]*\n?").expect("valid regex"));
static BARE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```[^\S\n]*$").expect("valid regex"));
static HTML_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--\s*(.*?)\s*-->").expect("valid regex"));
static FENCED_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid regex"));

/// Strip fences and conversational preamble from generated markup.
///
/// Scans for a recognized document-start marker (`<!doctype` or `<html`,
/// case-insensitive) and drops everything before it. When no marker is
/// found, returns the fence-stripped text verbatim so the review stage can
/// judge it; this function never invents content and never panics.
pub fn clean_markup(raw: &str) -> String {
    let cleaned = OPENING_FENCE_RE.replace_all(raw, "");
    let cleaned = BARE_FENCE_RE.replace_all(&cleaned, "");
    let mut cleaned = cleaned.trim().to_string();
    if let Some(stripped) = cleaned.strip_suffix("```") {
        cleaned = stripped.trim_end().to_string();
    }

    // Both markers are ASCII; ASCII-only lowercasing keeps byte offsets
    // valid for slicing `cleaned` even when the preamble is not ASCII.
    let lower = cleaned.to_ascii_lowercase();
    let start = lower
        .find("<!doctype")
        .or_else(|| lower.find("<html"));
    match start {
        Some(pos) if pos > 0 => cleaned[pos..].to_string(),
        _ => cleaned,
    }
}

/// Collect the lines following a labeled section header.
///
/// The label is matched by case-insensitive substring; collection stops at
/// the next bold/heading-like line (`**...` or `#...` containing a colon),
/// after `max_lines` non-empty lines, or at end of input. Returns an empty
/// vec when the label is absent.
pub fn section_lines(text: &str, label: &str, max_lines: usize) -> Vec<String> {
    let needle = label.to_lowercase();
    let mut found = false;
    let mut collected = Vec::new();

    for line in text.lines() {
        if !found {
            if line.to_lowercase().contains(&needle) {
                found = true;
            }
            continue;
        }
        let trimmed = line.trim();
        if (trimmed.starts_with("**") || trimmed.starts_with('#')) && trimmed.contains(':') {
            break;
        }
        if !trimmed.is_empty() {
            collected.push(trimmed.to_string());
        }
        if collected.len() >= max_lines {
            break;
        }
    }

    collected
}

/// Labeled-section excerpt joined into one line, or `None` when absent.
pub fn extract_section(text: &str, label: &str, max_lines: usize) -> Option<String> {
    let lines = section_lines(text, label, max_lines);
    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

/// Extract up to `max_items` bullet-style lines (`-`, `*`, `•` prefixes).
///
/// Bold heading lines (`**...`) share the `*` prefix and are not bullets;
/// very short bullets are skipped; markers and surrounding whitespace are
/// stripped from the returned items.
pub fn extract_bullets(text: &str, max_items: usize) -> Vec<String> {
    let mut bullets = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.len() <= 5 || trimmed.starts_with("**") {
            continue;
        }
        if trimmed.starts_with('-') || trimmed.starts_with('*') || trimmed.starts_with('•') {
            let item = trimmed
                .trim_start_matches(['-', '*', '•', ' '])
                .trim()
                .to_string();
            if !item.is_empty() {
                bullets.push(item);
            }
        }
        if bullets.len() >= max_items {
            break;
        }
    }
    bullets
}

/// First HTML comment in the document, used as the coder's rationale.
///
/// Only plausibly sized comments qualify; boilerplate one-worders and
/// dumped walls of text are ignored.
pub fn first_comment(markup: &str) -> Option<String> {
    let captures = HTML_COMMENT_RE.captures(markup)?;
    let text = captures.get(1)?.as_str().trim();
    if text.len() > 10 && text.len() < 300 {
        Some(text.to_string())
    } else {
        None
    }
}

/// Replace fenced code blocks with a short placeholder.
///
/// Review analysis must stay prose-only; reviewers occasionally quote whole
/// documents back despite instructions.
pub fn strip_code_blocks(text: &str) -> String {
    FENCED_BLOCK_RE
        .replace_all(text, "[code snippet omitted]")
        .into_owned()
}

/// Keyword-based feature badges for the generated document.
pub fn detect_features(markup: &str) -> Vec<String> {
    let lower = markup.to_lowercase();
    let checks: [(&str, bool); 6] = [
        ("Dark mode", lower.contains("dark")),
        ("Responsive layout", lower.contains("@media")),
        ("Animations", lower.contains("keyframes")),
        ("Data persistence", lower.contains("localstorage")),
        ("Custom theming", lower.contains("--")),
        (
            "Dynamic forms",
            lower.contains("addeventlistener") && lower.contains("submit"),
        ),
    ];
    checks
        .into_iter()
        .filter(|(_, hit)| *hit)
        .map(|(label, _)| label.to_string())
        .collect()
}

/// Truncate to at most `max` characters, safe on multi-byte boundaries.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max).collect()
}
