//! Unresolved items name an owner, an action or a convergence deadline.
//!
//! A line mentioning hard-unresolved items opens a region that runs to the
//! next heading. Every list item inside it is inspected.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    check::Context,
    domain::{text, CheckResult},
};

static REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Hard[- ]?Unresolved|硬性未决|未决事项").expect("unresolved region pattern")
});

static OWNERSHIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)owner|负责人|action|行动|convergence|收敛|deadline|截止|DRI|assignee")
        .expect("ownership pattern")
});

const PREVIEW: usize = 60;

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    let mut in_region = false;

    for (idx, line) in ctx.lines().iter().enumerate() {
        let trimmed = line.trim();
        if REGION.is_match(trimmed) {
            in_region = true;
            continue;
        }
        if !in_region {
            continue;
        }
        if text::is_heading(trimmed) {
            in_region = false;
            continue;
        }
        if text::is_list_item(trimmed) && !OWNERSHIP.is_match(trimmed) {
            result.warn(format!(
                "Unresolved item at line {} lacks owner/action/convergence keywords: {}",
                idx + 1,
                text::truncate_chars(trimmed, PREVIEW)
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::check::test_support::evaluate;

    const KEY: &str = "check_16_unresolved_format";

    #[test]
    fn items_with_owners_pass() {
        let text = "## 12. 未决事项\n- EVD-001 truncated, owner: alice, deadline: 2026-03-01\n1. 收敛：下一轮评审\n";
        assert!(evaluate(KEY, text).warnings.is_empty());
    }

    #[test]
    fn items_without_owners_warn() {
        let text = "## 12. Hard-Unresolved\nContext prose is ignored.\n- cache sizing unknown\n";
        let result = evaluate(KEY, text);
        assert!(result.passed);
        assert_eq!(
            result.warnings,
            ["Unresolved item at line 3 lacks owner/action/convergence keywords: - cache sizing unknown"]
        );
    }

    #[test]
    fn region_ends_at_the_next_heading() {
        let text = "## 12. 硬性未决\n- owner: bob\n## 13. Appendix\n- unrelated bullet\n";
        assert!(evaluate(KEY, text).warnings.is_empty());
    }

    #[test]
    fn long_items_are_truncated() {
        let item = format!("- {}", "x".repeat(100));
        let text = format!("未决事项\n{item}\n");
        let warnings = evaluate(KEY, &text).warnings;
        assert!(warnings[0].ends_with(&item[..60]));
    }
}
