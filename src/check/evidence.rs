//! Evidence cross-check.
//!
//! Four rules tie the document to the evidence store:
//!
//! - every evidence token in the text exists in the store (when the store
//!   has items);
//! - truncated evidence backing a hard rule or requirement is surfaced as an
//!   unresolved item;
//! - every hard rule definition has an evidence token within ten lines, or a
//!   store item linking to it;
//! - implicit hard assertions (a must/never keyword in a boundary or trust
//!   context) away from any hard rule carry an evidence token within five
//!   lines.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

use crate::{
    check::Context,
    domain::{text, CheckResult},
};

/// Evidence tokens are matched without word boundaries so citations glued
/// to CJK text (`依据EVD-001`) are still found.
static EVIDENCE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"EVD-[0-9]{3,}").expect("evidence token pattern"));

static HARD_ASSERTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\b(?:must|forbidden|never|always|only|shall not)\b|(?:必须|禁止|不得|仅允许|不可))")
        .expect("hard assertion pattern")
});

static ASSERTION_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\b(?:boundary|trust|permission|auth|security|limit|threshold|timeout|quota)\b|(?:边界|信任|权限|安全|上限|阈值|超时|配额))",
    )
    .expect("assertion context pattern")
});

static UNRESOLVED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)unresolved|未决").expect("unresolved pattern"));

const MAX_MISSING: usize = 5;
const HARD_RULE_WINDOW: usize = 10;
const ASSERTION_WINDOW: usize = 5;

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    truncated_evidence(ctx, result);
    unknown_evidence(ctx, result);
    unbacked_hard_rules(ctx, result);
    implicit_assertions(ctx, result);
}

fn truncated_evidence(ctx: &Context<'_>, result: &mut CheckResult) {
    if UNRESOLVED.is_match(ctx.text()) {
        return;
    }
    for item in &ctx.evidence().items {
        if item.truncated && item.supports_hard_assertion() {
            result.fail(format!(
                "Truncated evidence {} supports hard assertion but no Unresolved item in the document",
                item.evidence_id
            ));
        }
    }
}

fn unknown_evidence(ctx: &Context<'_>, result: &mut CheckResult) {
    let store = ctx.evidence();
    if store.is_empty() {
        return;
    }
    let referenced: BTreeSet<&str> = EVIDENCE_TOKEN
        .find_iter(ctx.text())
        .map(|m| m.as_str())
        .collect();
    for id in referenced
        .into_iter()
        .filter(|id| !store.contains(id))
        .take(MAX_MISSING)
    {
        result.fail(format!("EVD referenced in document but missing in evidence store: {id}"));
    }
}

fn has_evidence_near(lines: &[&str], center: usize, radius: usize) -> bool {
    text::window(lines, center, radius, radius)
        .iter()
        .any(|line| EVIDENCE_TOKEN.is_match(line))
}

fn unbacked_hard_rules(ctx: &Context<'_>, result: &mut CheckResult) {
    let hard_rules = ctx
        .graph()
        .definitions()
        .filter(|o| o.id.is_hard_rule());
    let mut reported = BTreeSet::new();

    for occurrence in hard_rules {
        let id = occurrence.id.to_string();
        if !has_evidence_near(ctx.lines(), occurrence.line, HARD_RULE_WINDOW)
            && !ctx.evidence().links(&id)
            && reported.insert(occurrence.id.clone())
        {
            result.fail(format!(
                "Hard rule {id} has no EVD reference nearby or linked in evidence store"
            ));
        }
    }
}

fn implicit_assertions(ctx: &Context<'_>, result: &mut CheckResult) {
    let hard_rule_lines: BTreeSet<usize> = ctx
        .graph()
        .definitions()
        .filter(|o| o.id.is_hard_rule())
        .map(|o| o.line)
        .collect();
    let near_hard_rule = |idx: usize| {
        hard_rule_lines
            .range(idx.saturating_sub(ASSERTION_WINDOW)..=idx + ASSERTION_WINDOW)
            .next()
            .is_some()
    };

    let mut detected = 0;
    let mut unbacked = 0;

    for (idx, line) in ctx.lines().iter().enumerate() {
        if hard_rule_lines.contains(&idx) {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || text::is_heading(trimmed) || text::is_fence(trimmed) {
            continue;
        }
        if !(HARD_ASSERTION.is_match(trimmed) && ASSERTION_CONTEXT.is_match(trimmed)) {
            continue;
        }
        detected += 1;
        if !has_evidence_near(ctx.lines(), idx, ASSERTION_WINDOW) && !near_hard_rule(idx) {
            unbacked += 1;
        }
    }

    if unbacked > 0 {
        result.fail(format!(
            "{unbacked} implicit hard assertion(s) (must/forbidden/never in boundary/trust context) lack EVD reference (out of {detected} detected)"
        ));
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        check::test_support::evaluate_with,
        domain::{EvidenceItem, EvidenceStore},
    };

    const KEY: &str = "check_7_evidence";

    fn item(id: &str, truncated: bool, links: &[&str]) -> EvidenceItem {
        EvidenceItem {
            evidence_id: id.to_string(),
            truncated,
            links_to: links.iter().map(ToString::to_string).collect(),
        }
    }

    fn store(items: Vec<EvidenceItem>) -> EvidenceStore {
        EvidenceStore {
            schema_version: Some("v1".to_string()),
            items,
        }
    }

    fn run(text: &str, evidence: &EvidenceStore) -> Vec<String> {
        evaluate_with(KEY, text, evidence, None).issues
    }

    #[test]
    fn unknown_evidence_is_only_checked_against_a_populated_store() {
        let text = "- SEC-HR-001: tokens expire (EVD-001, EVD-002)\n";
        assert!(run(text, &EvidenceStore::default()).is_empty());

        let issues = run(text, &store(vec![item("EVD-001", false, &[])]));
        assert_eq!(issues, ["EVD referenced in document but missing in evidence store: EVD-002"]);
    }

    #[test]
    fn truncated_evidence_needs_an_unresolved_item() {
        let evidence = store(vec![item("EVD-001", true, &["SEC-HR-001"])]);
        let text = "- SEC-HR-001: tokens expire (EVD-001)\n";
        assert_eq!(
            run(text, &evidence),
            ["Truncated evidence EVD-001 supports hard assertion but no Unresolved item in the document"]
        );

        let resolved = format!("{text}\n## 未决事项\n- EVD-001 truncated, owner: alice\n");
        assert!(run(&resolved, &evidence).is_empty());
    }

    #[test]
    fn hard_rules_need_nearby_or_linked_evidence() {
        let text = "- SEC-HR-001: tokens expire\n";
        assert_eq!(
            run(text, &EvidenceStore::default()),
            ["Hard rule SEC-HR-001 has no EVD reference nearby or linked in evidence store"]
        );

        let linked = store(vec![item("EVD-001", false, &["SEC-HR-001"])]);
        assert!(run(text, &linked).is_empty());

        let nearby = format!("{text}{}Source: EVD-001\n", "\n".repeat(9));
        assert!(run(&nearby, &store(vec![item("EVD-001", false, &[])])).is_empty());

        let too_far = format!("{text}{}Source: EVD-001\n", "\n".repeat(10));
        assert_eq!(run(&too_far, &store(vec![item("EVD-001", false, &[])])).len(), 1);
    }

    #[test]
    fn hard_rules_defined_twice_are_reported_once() {
        let text = "- SEC-HR-001: tokens expire\n\n## 附录\n- SEC-HR-001: tokens expire\n";
        assert_eq!(
            run(text, &EvidenceStore::default()),
            ["Hard rule SEC-HR-001 has no EVD reference nearby or linked in evidence store"]
        );
    }

    #[test]
    fn implicit_assertions_need_evidence() {
        let text = "Requests must stay within the quota.\n\nPlain prose.\n";
        assert_eq!(
            run(text, &EvidenceStore::default()),
            ["1 implicit hard assertion(s) (must/forbidden/never in boundary/trust context) lack EVD reference (out of 1 detected)"]
        );

        let cited = "Requests must stay within the quota (依据EVD-003).\n";
        assert!(run(cited, &EvidenceStore::default()).is_empty());
    }

    #[test]
    fn assertions_near_hard_rules_are_covered() {
        let text = "- SEC-HR-001: tokens expire (EVD-001)\n\n\n\n\n\n\n\n\n\n\n\n\n\n调用方必须校验权限边界。\n";
        let issues = run(text, &EvidenceStore::default());
        assert_eq!(issues.len(), 1);

        let close = "- SEC-HR-001: tokens expire\n调用方必须校验权限边界。\n";
        let linked = store(vec![item("EVD-001", false, &["SEC-HR-001"])]);
        assert!(run(close, &linked).is_empty());
    }

    #[test]
    fn keywords_without_context_are_not_assertions() {
        assert!(run("You must read this.\n", &EvidenceStore::default()).is_empty());
    }
}
