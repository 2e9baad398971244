//! Diagrams sit next to prose.

use crate::{
    check::Context,
    domain::{text, CheckResult},
};

const RADIUS: usize = 10;

fn is_prose(line: &&str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !text::is_fence(trimmed) && !trimmed.starts_with('#')
}

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    let lines = ctx.lines();

    for block in text::fenced_blocks(ctx.text()) {
        let Some(close) = block.close_line else {
            continue;
        };
        if block.lang != "mermaid" {
            continue;
        }
        let open = block.open_line;
        let before = &lines[open.saturating_sub(RADIUS)..open];
        let after = &lines[(close + 1).min(lines.len())..(close + 1 + RADIUS).min(lines.len())];

        if !before.iter().any(is_prose) && !after.iter().any(is_prose) {
            result.warn(format!(
                "Mermaid block at line {} has no prose text within {RADIUS} lines before or after",
                open + 1
            ));
        }
    }
}
