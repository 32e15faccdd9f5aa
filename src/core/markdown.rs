//! Best-effort scraping of paper metadata out of converted Markdown.
//!
//! Each extractor is an independent pass over the whole text and falls back to
//! a default when its pattern is absent. Truncation counts characters.

use crate::domain::model::Section;
use lazy_static::lazy_static;
use regex::Regex;

pub const TITLE_MAX_CHARS: usize = 200;
pub const ABSTRACT_MAX_CHARS: usize = 1000;
pub const SECTION_CONTENT_MAX_CHARS: usize = 500;
pub const MAX_KEYWORDS: usize = 10;

pub const DEFAULT_TITLE: &str = "Untitled";

lazy_static! {
    // `# Abstract` / `## Abstract` heading, up to and including its line break.
    static ref ABSTRACT_HEADING: Regex = Regex::new(r"(?i)##?\s*abstract\s*\n").unwrap();

    // Where a heading-delimited abstract stops: the next `#` or `##` heading.
    static ref NEXT_HEADING: Regex = Regex::new(r"\n##?\s").unwrap();

    // Inline form: `Abstract: text...`
    static ref ABSTRACT_INLINE: Regex = Regex::new(r"(?i)abstract[:\s]+([^\n]+)").unwrap();

    // A `Label:` line ends an inline abstract.
    static ref LABEL_LINE: Regex = Regex::new(r"(?i)^[a-z][a-z]*:").unwrap();

    static ref KEYWORDS_LINE: Regex = Regex::new(r"(?i)keywords?[:\s]+([^\n]+)").unwrap();

    static ref KEYWORD_SEPARATOR: Regex = Regex::new(r"[,;・]").unwrap();
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// First `# ` heading, else the first non-heading line, else `Untitled`.
pub fn extract_title(text: &str) -> String {
    for line in text.split('\n') {
        let line = line.trim();
        if let Some(title) = line.strip_prefix("# ") {
            return title.trim().to_string();
        }
        if !line.is_empty() && !line.starts_with('#') {
            return truncate_chars(line, TITLE_MAX_CHARS);
        }
    }
    DEFAULT_TITLE.to_string()
}

pub fn extract_abstract(text: &str) -> String {
    let body = abstract_under_heading(text).or_else(|| abstract_inline(text));

    match body {
        Some(body) => truncate_chars(body.trim(), ABSTRACT_MAX_CHARS),
        None => String::new(),
    }
}

fn abstract_under_heading(text: &str) -> Option<&str> {
    let heading = ABSTRACT_HEADING.find(text)?;
    let rest = &text[heading.end()..];
    let end = NEXT_HEADING.find(rest).map_or(rest.len(), |m| m.start());
    Some(&rest[..end])
}

fn abstract_inline(text: &str) -> Option<&str> {
    let caps = ABSTRACT_INLINE.captures(text)?;
    let first = caps.get(1)?;
    let mut end = first.end();

    // Continuation lines: non-empty and not starting with a `Label:`.
    while text[end..].starts_with('\n') {
        let line_start = end + 1;
        let line_end = text[line_start..]
            .find('\n')
            .map_or(text.len(), |offset| line_start + offset);
        let line = &text[line_start..line_end];

        if line.is_empty() || LABEL_LINE.is_match(line) {
            break;
        }
        end = line_end;
    }

    Some(&text[first.start()..end])
}

/// Level-2 and level-3 headings with the text that follows each of them.
pub fn extract_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;

    for line in text.split('\n') {
        let heading = if let Some(title) = line.strip_prefix("## ") {
            Some((2, title))
        } else {
            line.strip_prefix("### ").map(|title| (3, title))
        };

        match heading {
            Some((level, title)) => {
                if let Some(section) = current.take() {
                    sections.push(section);
                }
                current = Some(Section {
                    level,
                    title: title.trim().to_string(),
                    content: String::new(),
                });
            }
            None => {
                if let Some(section) = current.as_mut() {
                    section.content.push_str(line);
                    section.content.push('\n');
                }
            }
        }
    }

    if let Some(section) = current {
        sections.push(section);
    }

    for section in &mut sections {
        section.content = truncate_chars(section.content.trim(), SECTION_CONTENT_MAX_CHARS);
    }

    sections
}

pub fn extract_keywords(text: &str) -> Vec<String> {
    let Some(caps) = KEYWORDS_LINE.captures(text) else {
        return Vec::new();
    };

    KEYWORD_SEPARATOR
        .split(&caps[1])
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn char_count(text: &str) -> usize {
    text.chars().count()
}
