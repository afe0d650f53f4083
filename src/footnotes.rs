//! Footnote extraction and restoration.
//!
//! Footnote definitions (`[^id]: text`, plus any indented continuation
//! lines) are lifted out of a document before translation and replaced
//! by inert placeholder tokens, then put back verbatim afterwards.

use crate::error::FootnoteError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Matches the trimmed first line of a footnote definition.
static DEFINITION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\^[^\]]+\]:\s*\S.*$").expect("Invalid DEFINITION_REGEX"));

/// Base tag used for placeholder tokens (`<PLACEHOLDER_0>`).
const BASE_TAG: &str = "PLACEHOLDER";

/// Footnotes lifted out of a document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footnotes {
    /// Tag used to build this document's placeholder tokens.
    tag: String,
    /// Verbatim footnote blocks.
    items: Vec<String>,
}

impl Footnotes {
    /// Footnotes for a document with no definitions.
    pub fn empty() -> Self {
        Self {
            tag: BASE_TAG.to_string(),
            items: Vec::new(),
        }
    }

    /// The extracted footnote blocks.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the placeholder token standing in for footnote `index`.
    pub fn placeholder(&self, index: usize) -> String {
        format!("<{}_{}>", self.tag, index)
    }

    fn token_regex(&self) -> Regex {
        let pattern = format!(r"<{}_(\d+)>", regex::escape(&self.tag));
        Regex::new(&pattern).expect("escaped placeholder pattern is always valid")
    }
}

/// Result of stripping footnotes out of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Document text with each footnote replaced by its placeholder.
    pub text: String,
    /// The footnotes that were removed.
    pub footnotes: Footnotes,
}

impl Extraction {
    /// True when nothing but placeholders and whitespace is left to translate.
    pub fn body_is_empty(&self) -> bool {
        if self.footnotes.is_empty() {
            return self.text.trim().is_empty();
        }
        self.footnotes
            .token_regex()
            .replace_all(&self.text, "")
            .trim()
            .is_empty()
    }
}

/// Picks a placeholder tag that never occurs in `text`.
fn choose_tag(text: &str) -> String {
    if !text.contains(&format!("<{}", BASE_TAG)) {
        return BASE_TAG.to_string();
    }
    (1u64..)
        .map(|salt| format!("{}{}", BASE_TAG, salt))
        .find(|tag| !text.contains(&format!("<{}_", tag)))
        .unwrap_or_else(|| BASE_TAG.to_string())
}

fn is_definition(line: &str) -> bool {
    DEFINITION_REGEX.is_match(line.trim())
}

fn is_continuation(line: &str) -> bool {
    !line.trim().is_empty()
        && !is_definition(line)
        && (line.starts_with("    ") || line.starts_with('\t'))
}

/// Strips every footnote definition out of `text`.
///
/// Lines are split on `\n` and rejoined the same way, so
/// `restore(&e.text, &e.footnotes)` reproduces the input exactly.
pub fn extract(text: &str) -> Extraction {
    let tag = choose_tag(text);
    let lines: Vec<&str> = text.split('\n').collect();
    let mut items: Vec<String> = Vec::new();
    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        if !is_definition(lines[i]) {
            output.push(lines[i].to_string());
            i += 1;
            continue;
        }

        let start = i;
        i += 1;
        while i < lines.len() && is_continuation(lines[i]) {
            i += 1;
        }

        output.push(format!("<{}_{}>", tag, items.len()));
        items.push(lines[start..i].join("\n"));
    }

    Extraction {
        text: output.join("\n"),
        footnotes: Footnotes { tag, items },
    }
}

/// Puts footnotes back in place of their placeholders.
///
/// Every footnote must be claimed by exactly one placeholder; anything
/// else means the text was corrupted in transit.
pub fn restore(text: &str, footnotes: &Footnotes) -> Result<String, FootnoteError> {
    let regex = footnotes.token_regex();
    let expected = footnotes.len();
    let found: Vec<usize> = regex
        .captures_iter(text)
        .map(|caps| caps[1].parse::<usize>().unwrap_or(usize::MAX))
        .collect();

    if found.len() != expected {
        return Err(FootnoteError::MalformedPlaceholder {
            expected,
            found: found.len(),
            detail: "placeholder count does not match footnote count".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for &index in &found {
        if index >= expected {
            return Err(FootnoteError::MalformedPlaceholder {
                expected,
                found: found.len(),
                detail: format!("unknown placeholder index {}", index),
            });
        }
        if !seen.insert(index) {
            return Err(FootnoteError::MalformedPlaceholder {
                expected,
                found: found.len(),
                detail: format!("{} appears more than once", footnotes.placeholder(index)),
            });
        }
    }

    if expected == 0 {
        return Ok(text.to_string());
    }

    let restored = regex.replace_all(text, |caps: &regex::Captures| {
        // Indices were validated above.
        let index: usize = caps[1].parse().unwrap_or_default();
        footnotes.items[index].clone()
    });

    Ok(restored.into_owned())
}
