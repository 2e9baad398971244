//! Required sections carry real content.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    check::Context,
    domain::{section, CheckResult},
};

const MIN_CONTENT_LINES: usize = 3;

/// Heading patterns of the sections that must not be empty, with the label
/// used in messages.
static REQUIRED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        ("背景", "背景"),
        ("目标", "目标"),
        ("方案", "方案"),
        ("安全|安全模型", "安全模型"),
        ("可靠|健壮", "可靠性"),
        ("验收", "验收"),
        ("决策|取舍", "决策"),
    ]
    .into_iter()
    .map(|(pattern, label)| (section::heading_pattern(pattern), label))
    .collect()
});

fn is_content(line: &str) -> bool {
    !line.is_empty() && !line.starts_with('#')
}

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    for (pattern, label) in REQUIRED.iter() {
        let Some(found) = section::slice(ctx.text(), pattern) else {
            continue;
        };
        let content = found.body().iter().filter(|line| is_content(line)).count();
        if content < MIN_CONTENT_LINES {
            result.fail(format!(
                "Section '{label}' has only {content} non-whitespace content line(s) (minimum {MIN_CONTENT_LINES})"
            ));
        }
    }
}
