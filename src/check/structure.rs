//! Meta fields, layer headings and template heading coverage.

use crate::{
    check::Context,
    domain::{text, CheckResult},
};

/// Template headings considered for coverage.
const TEMPLATE_HEADINGS: usize = 20;

/// Template headings that may be absent before the check fails.
const MISSING_TOLERANCE: usize = 5;

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    let config = ctx.config();

    for field in &config.meta_fields {
        if !has_field_line(ctx.text(), field) {
            result.fail(format!("Missing meta field: {field}"));
        }
    }

    let headings = text::heading_titles(ctx.text());
    let joined = headings.join(" ");

    if !config.review_keywords.iter().any(|kw| joined.contains(kw.as_str())) {
        result.fail(format!(
            "Missing review layer sections ({})",
            config.review_keywords.join("/")
        ));
    }
    if !config.normative_keywords.iter().any(|kw| joined.contains(kw.as_str())) {
        result.fail(format!(
            "Missing normative layer sections ({})",
            config.normative_keywords.join("/")
        ));
    }

    if let Some(template) = ctx.template() {
        let missing: Vec<&str> = text::heading_titles(template)
            .into_iter()
            .take(TEMPLATE_HEADINGS)
            .filter(|wanted| !wanted.is_empty())
            .filter(|wanted| !headings.iter().any(|have| have.contains(wanted)))
            .collect();
        if missing.len() > MISSING_TOLERANCE {
            result.fail(format!(
                "Multiple template headings missing ({}): {}...",
                missing.len(),
                missing[..MISSING_TOLERANCE].join(", ")
            ));
        }
    }
}

/// Whether some line declares `field` as `field:` (or with a fullwidth
/// colon). Prose that merely mentions the field name does not count.
fn has_field_line(text: &str, field: &str) -> bool {
    text.lines().any(|line| {
        line.trim_start()
            .strip_prefix(field)
            .is_some_and(|rest| rest.trim_start().starts_with([':', '：']))
    })
}
