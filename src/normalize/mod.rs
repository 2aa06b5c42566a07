//! Content normalization
//!
//! Stored article content arrives in heterogeneous shapes: raw markup
//! strings, or serialized page-builder blocks (nested JSON with title and
//! body fields). This module flattens all of them into plain text suitable
//! for chunking and keyword extraction.

use crate::error::{CellitoError, Result};
use regex::Regex;
use serde_json::Value;

/// Fields recognized as a block title, in lookup order
const TITLE_FIELDS: [&str; 3] = ["title", "header", "heading"];

/// Fields recognized as block body content, in lookup order
const BODY_FIELDS: [&str; 3] = ["content", "body", "text"];

/// Canonical text-bearing fields tried before the all-fields fallback
const TEXT_FIELDS: [&str; 5] = ["text", "content", "value", "innerHTML", "innerText"];

/// A recognized shape inside stored structured content
enum ContentBlock<'a> {
    /// Block title (`title`, `header`, `heading`)
    Title(&'a Value),
    /// Block body (`content`, `body`, `text`)
    Body(&'a Value),
    /// Unrecognized shape; text is recovered by walking every field
    Unknown(&'a Value),
}

/// Flattens stored content (markup strings or serialized block structures)
/// into plain text. Parse failures degrade to the plain-markup path; this
/// type never returns an error after construction.
pub struct TextNormalizer {
    tag_re: Regex,
    space_re: Regex,
    line_edge_re: Regex,
    blank_re: Regex,
}

impl TextNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            tag_re: Regex::new(r"<[^>]*>")
                .map_err(|e| CellitoError::Pattern(format!("markup tag pattern: {e}")))?,
            space_re: Regex::new(r"[ \t\r]+")
                .map_err(|e| CellitoError::Pattern(format!("whitespace pattern: {e}")))?,
            line_edge_re: Regex::new(r" ?\n ?")
                .map_err(|e| CellitoError::Pattern(format!("line edge pattern: {e}")))?,
            blank_re: Regex::new(r"\n{3,}")
                .map_err(|e| CellitoError::Pattern(format!("blank line pattern: {e}")))?,
        })
    }

    /// Normalize raw stored content into plain text.
    ///
    /// JSON objects are treated as structured content blocks; anything else
    /// (including malformed JSON) is stripped as markup text.
    pub fn normalize(&self, raw: &str) -> String {
        if raw.trim().is_empty() {
            return String::new();
        }

        match serde_json::from_str::<Value>(raw) {
            Ok(value @ Value::Object(_)) => self.normalize_structured(&value),
            _ => self.strip_markup(raw),
        }
    }

    /// Extract text from a structured content value, title first, blocks
    /// separated by a blank line.
    fn normalize_structured(&self, value: &Value) -> String {
        let parts: Vec<String> = classify_blocks(value)
            .iter()
            .map(|block| self.visit_block(block))
            .filter(|text| !text.is_empty())
            .collect();

        if parts.is_empty() {
            // Known fields existed but held no text; fall back to the
            // generic walk so nested text is not lost.
            return self.visit_block(&ContentBlock::Unknown(value));
        }

        parts.join("\n\n")
    }

    fn visit_block(&self, block: &ContentBlock<'_>) -> String {
        match block {
            ContentBlock::Title(value) | ContentBlock::Body(value) => self.extract_text(value),
            ContentBlock::Unknown(value) => self.extract_text(value),
        }
    }

    /// Recursive text extraction over arbitrary content values.
    ///
    /// Strings are stripped of markup; arrays are joined with newlines;
    /// objects yield their first non-empty canonical text field, or the
    /// concatenation of every field value when no canonical field matches.
    fn extract_text(&self, value: &Value) -> String {
        match value {
            Value::String(s) => self.strip_markup(s),
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| self.extract_text(item))
                    .filter(|text| !text.is_empty())
                    .collect();
                parts.join("\n")
            }
            Value::Object(map) => {
                for field in TEXT_FIELDS {
                    if let Some(inner) = map.get(field) {
                        let text = self.extract_text(inner);
                        if !text.is_empty() {
                            return text;
                        }
                    }
                }
                let parts: Vec<String> = map
                    .values()
                    .map(|inner| self.extract_text(inner))
                    .filter(|text| !text.is_empty())
                    .collect();
                parts.join("\n")
            }
            _ => String::new(),
        }
    }

    /// Remove markup tags, collapse whitespace runs to single spaces and
    /// blank-line runs to one blank line, and trim.
    pub fn strip_markup(&self, input: &str) -> String {
        let no_tags = self.tag_re.replace_all(input, " ");
        let spaced = self.space_re.replace_all(&no_tags, " ");
        let edged = self.line_edge_re.replace_all(&spaced, "\n");
        let collapsed = self.blank_re.replace_all(&edged, "\n\n");
        collapsed.trim().to_string()
    }
}

/// Classify a structured content value into its recognized blocks:
/// first matching title field, then first matching body field, with an
/// unknown-shape fallback when neither group is present.
fn classify_blocks(value: &Value) -> Vec<ContentBlock<'_>> {
    let mut blocks = Vec::new();

    if let Value::Object(map) = value {
        if let Some(title) = TITLE_FIELDS.iter().find_map(|field| map.get(*field)) {
            blocks.push(ContentBlock::Title(title));
        }
        if let Some(body) = BODY_FIELDS.iter().find_map(|field| map.get(*field)) {
            blocks.push(ContentBlock::Body(body));
        }
    }

    if blocks.is_empty() {
        blocks.push(ContentBlock::Unknown(value));
    }

    blocks
}
