//! Trigger declarations.
//!
//! A trigger entry is any line of the trigger section carrying a `YES` or
//! `NO` marker, in table form (`| auth change | YES | Links: SEC-HR-001 |`)
//! or list form (`- auth change: YES (Links: SEC-HR-001)`). `NO` wins when
//! both appear. The `Links:` field may sit on the entry line or on one of
//! the next two lines.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    check::Context,
    domain::{graph, text, CheckResult},
};

static YES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bYES\b").expect("yes pattern"));

static NO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bNO\b").expect("no pattern"));

static LINKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Links?\s*[:：]\s*(.+?)(?:\||$)").expect("links pattern")
});

const EMPTY_LINKS: [&str; 6] = ["", "-", "N/A", "n/a", "\u{2014}", "无"];

const NAME_WIDTH: usize = 60;

/// The declared answer of a trigger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

/// One trigger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub answer: Answer,
    /// The raw `Links:` content, if the field is present.
    pub links: Option<String>,
}

/// Parses the trigger section. `None` if the document has no such section.
pub fn entries(ctx: &Context<'_>) -> Option<Vec<Entry>> {
    let section = ctx.trigger_section()?;
    let body = section.body();

    let entries = body
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .filter_map(|(idx, line)| {
            let answer = if NO.is_match(line) {
                Answer::No
            } else if YES.is_match(line) {
                Answer::Yes
            } else {
                return None;
            };
            let window = text::window(body, idx, 0, 2).join(" ");
            let links = LINKS
                .captures(&window)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string());
            Some(Entry {
                name: text::truncate_chars(line, NAME_WIDTH).replace('|', " ").trim().to_string(),
                answer,
                links,
            })
        })
        .collect();

    Some(entries)
}

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    let Some(entries) = entries(ctx) else {
        result.fail("No trigger declaration section found");
        return;
    };

    if entries.is_empty() {
        result.fail("Trigger section has no YES/NO declarations");
        return;
    }

    for entry in entries.iter().filter(|e| e.answer == Answer::Yes) {
        let name = &entry.name;
        let Some(links) = &entry.links else {
            result.fail(format!("YES trigger missing 'Links:' field: {name}"));
            continue;
        };
        if EMPTY_LINKS.contains(&links.as_str()) {
            result.fail(format!("YES trigger has empty Links: {name}"));
            continue;
        }

        let linked = graph::extract_all(links);
        if linked.is_empty() {
            result.fail(format!("YES trigger Links contains no valid IDs: {name} → '{links}'"));
            continue;
        }

        let undefined: Vec<String> = linked
            .iter()
            .filter(|id| !ctx.graph().is_defined(id))
            .map(ToString::to_string)
            .collect();
        if !undefined.is_empty() {
            result.fail(format!(
                "YES trigger Links references undefined IDs: {} in: {name}",
                undefined.join(", ")
            ));
        }
    }
}
