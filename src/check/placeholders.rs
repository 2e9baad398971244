//! Placeholder residuals such as `TBD` or `<...>`.

use std::sync::LazyLock;

use regex::{Match, Regex};

use crate::{check::Context, domain::CheckResult};

/// `(?<![A-Za-z])` and `(?![A-Za-z])`, which [`ascii_bounded`] already
/// enforces.
static LETTER_GUARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\?<?!\[(?:A-Za-z|a-zA-Z)\]\)").expect("letter guard pattern")
});

/// Compiles a configured placeholder pattern, dropping letter guards.
pub fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&LETTER_GUARD.replace_all(pattern, ""))
}

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    if ctx.placeholders().is_empty() && !ctx.config().placeholder_patterns.is_empty() {
        result.fail("No configured placeholder pattern compiled; placeholder residuals were not checked");
        return;
    }

    for (idx, line) in ctx.lines().iter().enumerate() {
        let mut found: Vec<Match<'_>> = ctx
            .placeholders()
            .iter()
            .flat_map(|pattern| pattern.find_iter(line))
            .filter(|m| !m.is_empty() && ascii_bounded(line, m))
            .collect();
        found.sort_by_key(Match::start);
        found.dedup_by_key(|m| m.start());

        for m in found {
            result.fail(format!("Line {}: placeholder '{}' found", idx + 1, m.as_str()));
        }
    }
}

/// Rejects matches glued to surrounding ASCII letters (`TBDs`, `XXXL`).
///
/// Only ASCII letters count as neighbours, so a marker written directly
/// against CJK text (`这里TBD待定`) is still reported.
fn ascii_bounded(line: &str, m: &Match<'_>) -> bool {
    let matched = m.as_str();
    let before = line[..m.start()].chars().next_back();
    let after = line[m.end()..].chars().next();

    let glued_front = matched.starts_with(|c: char| c.is_ascii_alphabetic())
        && before.is_some_and(|c| c.is_ascii_alphabetic());
    let glued_back = matched.ends_with(|c: char| c.is_ascii_alphabetic())
        && after.is_some_and(|c| c.is_ascii_alphabetic());

    !glued_front && !glued_back
}
