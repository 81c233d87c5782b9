//! Rich-text markup helpers for drafts.
//!
//! # Responsibility
//! - Derive draft titles from serialized markup.
//! - Reduce markup to plain text for orphan detection.
//!
//! # Invariants
//! - Titles come from the first `h1`..`h3`, else the first 30 plain-text
//!   characters, else `UNTITLED_DRAFT`.
//! - Plain text follows DOM `textContent` semantics: tags vanish without
//!   inserting separators.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Placeholder title for drafts without any text.
pub const UNTITLED_DRAFT: &str = "Untitled draft";
/// Editor markup for a document holding one empty line.
pub const EMPTY_PARAGRAPH: &str = "<p><br></p>";
/// Maximum characters taken from plain text when no heading exists.
pub const TITLE_FALLBACK_CHARS: usize = 30;

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h[1-3]\b[^>]*>(.*?)</h[1-3]\s*>").expect("valid heading regex"));
static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid entity regex")
});
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Derives a draft title from `content`.
pub fn extract_title(content: &str) -> String {
    if let Some(caps) = HEADING_RE.captures(content) {
        let heading = text_content(caps.get(1).map_or("", |m| m.as_str()));
        let heading = heading.trim();
        if !heading.is_empty() {
            return heading.to_string();
        }
    }

    let text = plain_text(content);
    if text.is_empty() {
        return UNTITLED_DRAFT.to_string();
    }
    text.chars().take(TITLE_FALLBACK_CHARS).collect()
}

/// Returns the tag-free text of `content` with whitespace collapsed and trimmed.
pub fn plain_text(content: &str) -> String {
    let text = text_content(content);
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Returns whether `content` carries no meaningful text.
///
/// The canonical empty paragraph is a live editor state, not an orphan.
pub fn is_orphan_content(content: &str) -> bool {
    content.trim() != EMPTY_PARAGRAPH && plain_text(content).is_empty()
}

fn text_content(markup: &str) -> String {
    let without_comments = COMMENT_RE.replace_all(markup, "");
    let without_tags = TAG_RE.replace_all(&without_comments, "");
    decode_entities(&without_tags)
}

fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => numeric_entity(name),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn numeric_entity(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::{extract_title, is_orphan_content, plain_text, EMPTY_PARAGRAPH, UNTITLED_DRAFT};

    #[test]
    fn first_heading_in_document_order_wins() {
        let content = "<p>intro</p><h3>Third</h3><h1>First</h1>";
        assert_eq!(extract_title(content), "Third");
    }

    #[test]
    fn heading_markup_and_entities_are_flattened() {
        let content = "<h2 class=\"t\">  <strong>Fish</strong> &amp; Chips </h2>";
        assert_eq!(extract_title(content), "Fish & Chips");
    }

    #[test]
    fn h4_is_not_a_title_source() {
        let content = "<h4>Minor</h4><p>Body text</p>";
        assert_eq!(extract_title(content), "MinorBody text");
    }

    #[test]
    fn empty_heading_falls_back_to_plain_text() {
        let content = "<h1> </h1><p>Hello   world</p>";
        assert_eq!(extract_title(content), "Hello world");
    }

    #[test]
    fn fallback_truncates_by_characters_not_bytes() {
        let content = "<p>写作是一种思考方式，而不仅仅是记录思想的工具，它让模糊的想法变得清晰</p>";
        let title = extract_title(content);
        assert_eq!(title.chars().count(), 30);
        assert!(content.contains(title.as_str()));
    }

    #[test]
    fn textless_content_gets_placeholder() {
        assert_eq!(extract_title(""), UNTITLED_DRAFT);
        assert_eq!(extract_title(EMPTY_PARAGRAPH), UNTITLED_DRAFT);
    }

    #[test]
    fn plain_text_decodes_numeric_entities() {
        assert_eq!(plain_text("<p>a&#33; b&#x21;</p>"), "a! b!");
        assert_eq!(plain_text("<p>&unknown; kept</p>"), "&unknown; kept");
    }

    #[test]
    fn orphan_detection_spares_the_empty_paragraph() {
        assert!(is_orphan_content(""));
        assert!(is_orphan_content("<p></p><div>&nbsp;</div>"));
        assert!(!is_orphan_content(EMPTY_PARAGRAPH));
        assert!(!is_orphan_content("<p>x</p>"));
    }
}
