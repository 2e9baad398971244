//! Line-prefix heuristics for loosely structured markdown.
//!
//! There is no grammar behind the documents we check. Headings, fences,
//! tables and list items are recognised by what a trimmed line starts with,
//! and each heuristic lives here as a small named predicate.

/// Whether the trimmed line opens with a heading marker (`#`).
///
/// This is the loose form used as a block terminator. See [`heading`] for
/// the strict `#{1,6} title` form.
#[must_use]
pub fn is_heading(line: &str) -> bool {
    line.trim().starts_with('#')
}

/// Parses a strict markdown heading: one to six `#` followed by whitespace
/// and a non-empty title.
///
/// Returns the depth (number of `#`) and the title.
#[must_use]
pub fn heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim();
    let depth = trimmed.chars().take_while(|&c| c == '#').count();
    if depth == 0 || depth > 6 {
        return None;
    }
    let rest = &trimmed[depth..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let title = rest.trim();
    (!title.is_empty()).then_some((depth, title))
}

/// Every heading title in document order, in the loose form: any trimmed
/// line starting with `#`, with the markers stripped.
#[must_use]
pub fn heading_titles(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim())
        .collect()
}

/// Whether the trimmed line is a code fence (```` ``` ````).
#[must_use]
pub fn is_fence(line: &str) -> bool {
    line.trim().starts_with("```")
}

/// Whether the trimmed line is a table row.
#[must_use]
pub fn is_table_row(line: &str) -> bool {
    line.trim().starts_with('|')
}

/// Whether the trimmed line is a block quote.
#[must_use]
pub fn is_quote(line: &str) -> bool {
    line.trim().starts_with('>')
}

/// Whether the trimmed line is a bullet (`-`, `*`, `+`) or numbered
/// (`1.`) list item.
#[must_use]
pub fn is_list_item(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.starts_with(['-', '*', '+']) {
        return true;
    }
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && trimmed[digits..].starts_with('.')
}

/// Characters that may lead a definition line before the identifier:
/// bullets, quotes, heading markers and numbering.
#[must_use]
pub const fn is_marker_char(c: char) -> bool {
    matches!(c, '-' | '*' | '>' | '#' | '.') || c.is_ascii_digit()
}

/// Byte offset of the first token after a leading marker run and any
/// following whitespace, if the line starts with markers.
///
/// `"- SEC-HR-001"` gives `Some(2)`, `"### 11.2 Normal"` gives `Some(4)`,
/// `"SCN-001"` gives `None`.
#[must_use]
pub fn after_marker_run(line: &str) -> Option<usize> {
    let markers = line.len() - line.trim_start_matches(is_marker_char).len();
    if markers == 0 {
        return None;
    }
    let rest = &line[markers..];
    Some(markers + (rest.len() - rest.trim_start().len()))
}

/// Byte offset of the first token inside a leading table cell, if the line
/// starts with `|`.
#[must_use]
pub fn after_table_leader(line: &str) -> Option<usize> {
    let rest = line.strip_prefix('|')?;
    Some(1 + (rest.len() - rest.trim_start().len()))
}

/// Truncates to at most `max` characters, respecting char boundaries.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> &str {
    s.char_indices().nth(max).map_or(s, |(idx, _)| &s[..idx])
}

/// The lines from `center - before` to `center + after` inclusive, clamped
/// to the slice bounds.
#[must_use]
pub fn window<'a, 'b>(lines: &'b [&'a str], center: usize, before: usize, after: usize) -> &'b [&'a str] {
    let start = center.saturating_sub(before);
    let end = (center + after + 1).min(lines.len());
    if start >= end {
        return &[];
    }
    &lines[start..end]
}

/// A fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock<'a> {
    /// The lowercase language tag (leading word characters after the fence),
    /// empty when untagged.
    pub lang: String,
    /// Zero-based line index of the opening fence.
    pub open_line: usize,
    /// Zero-based line index of the closing fence, `None` if the block runs
    /// to the end of the document.
    pub close_line: Option<usize>,
    /// The lines between the fences.
    pub body: Vec<&'a str>,
}

/// Extracts all fenced blocks. A fence line toggles between prose and code;
/// the text after an opening fence is its language tag.
#[must_use]
pub fn fenced_blocks(text: &str) -> Vec<FencedBlock<'_>> {
    let mut blocks = Vec::new();
    let mut current: Option<FencedBlock<'_>> = None;

    for (idx, line) in text.lines().enumerate() {
        if is_fence(line) {
            match current.take() {
                Some(mut block) => {
                    block.close_line = Some(idx);
                    blocks.push(block);
                }
                None => {
                    current = Some(FencedBlock {
                        lang: fence_lang(line),
                        open_line: idx,
                        close_line: None,
                        body: Vec::new(),
                    });
                }
            }
        } else if let Some(block) = current.as_mut() {
            block.body.push(line);
        }
    }

    blocks.extend(current);
    blocks
}

fn fence_lang(line: &str) -> String {
    line.trim()
        .trim_start_matches('`')
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase()
}
