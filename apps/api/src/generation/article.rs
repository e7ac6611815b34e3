//! Turns raw provider markdown into the fields stored on an article.

use std::sync::OnceLock;

use regex::Regex;

use crate::analysis::keywords::{extract_keywords, KeywordOptions};
use crate::llm_client::strip_markdown_fences;

const EXCERPT_MAX_CHARS: usize = 160;
const WORDS_PER_MINUTE: usize = 200;

/// Derived article fields. The slug is resolved later against the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedArticle {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub read_time: i32,
}

pub fn prepare_article(query: &str, raw_markdown: &str) -> PreparedArticle {
    let content = strip_markdown_fences(raw_markdown).to_string();
    let title = extract_title(&content).unwrap_or_else(|| title_case(query));
    let excerpt = build_excerpt(&content);
    let tags = extract_keywords(&content, &KeywordOptions::blog_tags());
    let read_time = estimate_read_time(&content);

    PreparedArticle {
        title,
        content,
        excerpt,
        tags,
        read_time,
    }
}

/// First level-one heading, with inline markdown removed.
pub fn extract_title(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| strip_inline_markdown(title).trim().to_string())
        .filter(|title| !title.is_empty())
}

pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|w| {
            let mut c = w.chars();
            match c.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().to_string() + c.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// First prose paragraph (headings, code, lists, quotes and tables skipped),
/// cut on a word boundary to at most 160 chars plus `...`.
pub fn build_excerpt(markdown: &str) -> String {
    let mut in_code_block = false;
    let mut paragraph: Vec<&str> = Vec::new();

    for line in markdown.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            continue;
        }
        if trimmed.is_empty() {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        if is_structural_line(trimmed) {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        paragraph.push(trimmed);
    }

    let text = strip_inline_markdown(&paragraph.join(" "));
    truncate_on_word(text.trim(), EXCERPT_MAX_CHARS)
}

/// Minutes at 200 words per minute, rounded up, never less than one.
pub fn estimate_read_time(markdown: &str) -> i32 {
    let words = markdown.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as i32
}

fn is_structural_line(line: &str) -> bool {
    line.starts_with('#')
        || line.starts_with('>')
        || line.starts_with('|')
        || line.starts_with("- ")
        || line.starts_with("* ")
        || line.starts_with("---")
        || line
            .split_once(". ")
            .is_some_and(|(n, _)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("link regex is valid"))
}

fn strip_inline_markdown(text: &str) -> String {
    link_regex()
        .replace_all(text, "$1")
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect()
}

fn truncate_on_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    let cut = match cut.rfind(' ') {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}...", cut.trim_end_matches(|c: char| c.is_ascii_punctuation()))
}
