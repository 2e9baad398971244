//! Scenario step layout and paragraph length.

use crate::{
    check::Context,
    domain::{text, CheckResult, DefinitionForm, Identifier, Kind, Role},
};

/// Longest run of plain prose lines allowed.
const MAX_PARAGRAPH: usize = 10;

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    scenario_steps(ctx, result);
    paragraph_length(ctx, result);
}

/// WHEN and THEN must sit on separate lines inside a scenario.
fn scenario_steps(ctx: &Context<'_>, result: &mut CheckResult) {
    let mut current: Option<&Identifier> = None;

    for (idx, line) in ctx.lines().iter().enumerate() {
        let trimmed = line.trim();
        let leading = ctx.graph().leading_definition(idx);

        match leading {
            Some(o) if o.id.kind() == Kind::Scenario && o.role != Role::Definition(DefinitionForm::TableCell) => {
                current = Some(&o.id);
            }
            Some(_) => current = None,
            None if trimmed.is_empty() || text::is_heading(trimmed) => current = None,
            None => {}
        }

        if let Some(id) = current {
            if trimmed.contains("WHEN") && trimmed.contains("THEN") {
                result.fail(format!(
                    "Line {}: {id} has WHEN and THEN on same line (must be separate lines)",
                    idx + 1
                ));
            }
        }
    }
}

/// Plain prose outside fenced blocks must be broken up every ten lines.
fn paragraph_length(ctx: &Context<'_>, result: &mut CheckResult) {
    let mut run = 0;
    let mut in_fence = false;

    for (idx, line) in ctx.lines().iter().enumerate() {
        if text::is_fence(line) {
            in_fence = !in_fence;
            run = 0;
            continue;
        }
        if in_fence {
            continue;
        }
        if is_prose(line) {
            run += 1;
            if run > MAX_PARAGRAPH {
                result.fail(format!(
                    "Line {}: consecutive text paragraph exceeds {MAX_PARAGRAPH} lines (break into list/table)",
                    idx + 1
                ));
                run = 0;
            }
        } else {
            run = 0;
        }
    }
}

fn is_prose(line: &str) -> bool {
    !line.trim().is_empty()
        && !text::is_heading(line)
        && !text::is_list_item(line)
        && !text::is_table_row(line)
        && !text::is_quote(line)
}
