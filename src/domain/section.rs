//! Heading-scoped slicing of a document.

use regex::{Regex, RegexBuilder};

use crate::domain::text;

/// A heading-delimited span of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// The title of the opening heading.
    pub title: &'a str,
    /// Nesting depth of the opening heading (number of `#`).
    pub depth: usize,
    /// Zero-based line index of the opening heading.
    pub start_line: usize,
    /// The trimmed lines of the section, opening heading included.
    pub lines: Vec<&'a str>,
}

impl Section<'_> {
    /// The lines after the opening heading.
    #[must_use]
    pub fn body(&self) -> &[&str] {
        self.lines.get(1..).unwrap_or_default()
    }

    /// The section joined back into text.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Compiles a case-insensitive heading pattern.
///
/// # Panics
///
/// Panics if `pattern` is not a valid regular expression. Heading patterns
/// are fixed strings in this crate.
#[must_use]
pub fn heading_pattern(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("heading pattern")
}

/// Returns the first section whose heading title matches `pattern`.
///
/// The section runs from the matching heading up to, but excluding, the next
/// heading of equal or shallower depth. Nested sub-headings are included.
/// Heading-like lines inside fenced blocks are treated as content.
#[must_use]
pub fn slice<'a>(text: &'a str, pattern: &Regex) -> Option<Section<'a>> {
    let mut section: Option<Section<'a>> = None;
    let mut in_fence = false;

    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if text::is_fence(trimmed) {
            in_fence = !in_fence;
        }
        let heading = if in_fence || text::is_fence(trimmed) {
            None
        } else {
            text::heading(trimmed)
        };

        match (&mut section, heading) {
            (Some(open), Some((depth, _))) if depth <= open.depth => break,
            (Some(open), _) => open.lines.push(trimmed),
            (None, Some((depth, title))) if pattern.is_match(title) => {
                section = Some(Section {
                    title,
                    depth,
                    start_line: idx,
                    lines: vec![trimmed],
                });
            }
            (None, _) => {}
        }
    }

    section
}
