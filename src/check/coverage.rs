//! Scenario category coverage.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

use crate::{
    check::Context,
    domain::{text, CheckResult},
};

static INLINE_CATEGORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SCN-[0-9]{3,}:\s*(\w+)").expect("inline category pattern"));

/// Phrases declaring that a category does not apply to this design.
const INAPPLICABLE: [&str; 2] = ["不适用", "not applicable"];

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    let config = ctx.config();
    let found = found_categories(ctx);

    let has_reject = config.reject_categories.iter().any(|c| found.contains(c));
    let mut missing: BTreeSet<String> = config
        .min_scn_categories
        .iter()
        .filter(|c| !config.reject_categories.contains(c) && !found.contains(*c))
        .filter(|c| !excused(ctx.text(), std::slice::from_ref(*c)))
        .cloned()
        .collect();

    if !config.reject_categories.is_empty()
        && !has_reject
        && !excused(ctx.text(), &config.reject_categories)
    {
        missing.insert(config.reject_categories.join(" or "));
    }

    if !missing.is_empty() {
        result.fail(format!(
            "Missing SCN categories (no DEC justification found): {}",
            missing.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }
}

/// Categories declared inline (`SCN-001: normal`), named on a scenario line
/// or implied by a heading keyword.
fn found_categories(ctx: &Context<'_>) -> BTreeSet<String> {
    let config = ctx.config();
    let mut found: BTreeSet<String> = INLINE_CATEGORY
        .captures_iter(ctx.text())
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .collect();

    for line in ctx.lines() {
        let lower = line.trim().to_lowercase();

        if lower.contains("scn-") {
            found.extend(
                config
                    .min_scn_categories
                    .iter()
                    .filter(|category| lower.contains(category.as_str()))
                    .cloned(),
            );
        }

        if text::is_heading(line) {
            found.extend(
                config
                    .heading_category_map
                    .iter()
                    .filter(|(keyword, _)| lower.contains(keyword.as_str()))
                    .map(|(_, category)| category.clone()),
            );
        }
    }

    found
}

/// A loose escape hatch: an inapplicability phrase anywhere in the document
/// together with one of the category names (underscore or dotted spelling)
/// anywhere in the document.
fn excused(text: &str, categories: &[String]) -> bool {
    let lower = text.to_lowercase();
    INAPPLICABLE.iter().any(|phrase| lower.contains(phrase))
        && categories
            .iter()
            .any(|c| lower.contains(c.as_str()) || lower.contains(&c.replace('_', ".")))
}

#[cfg(test)]
mod tests {
    use crate::check::test_support::evaluate;

    const KEY: &str = "check_6_scn_coverage";

    const ALL_INLINE: &str = "\
SCN-001: normal
SCN-002: reject_authz
SCN-003: limits_quota
SCN-004: dependency_down
SCN-005: abuse
";

    #[test]
    fn inline_declarations_cover_everything() {
        let result = evaluate(KEY, ALL_INLINE);
        assert!(result.passed, "{:?}", result.issues);
    }

    #[test]
    fn headings_map_to_categories() {
        let text = "\
### 12.1 正常路径
### 12.2 越权拒绝
### 12.3 配额边界
### 12.4 依赖故障
### 12.5 滥用
";
        let result = evaluate(KEY, text);
        assert!(result.passed, "{:?}", result.issues);
    }

    #[test]
    fn category_words_on_scenario_lines_count() {
        let text = "\
- SCN-001 (normal) login
- SCN-002 (reject_authn) bad token
- SCN-003 (limits_quota) rate limit
- SCN-004 (dependency_down) db outage
- SCN-005 (abuse) replay
";
        assert!(evaluate(KEY, text).passed);
    }

    #[test]
    fn lists_missing_categories() {
        let result = evaluate(KEY, "SCN-001: normal\nSCN-002: abuse\n");
        assert_eq!(
            result.issues,
            ["Missing SCN categories (no DEC justification found): dependency_down, limits_quota, reject_authn or reject_authz"]
        );
    }

    #[test]
    fn inapplicability_excuses_a_category() {
        let text = ALL_INLINE.replace("SCN-004: dependency_down\n", "")
            + "DEC-009: dependency.down 不适用，服务无外部依赖。\n";
        assert!(evaluate(KEY, &text).passed);
    }
}
