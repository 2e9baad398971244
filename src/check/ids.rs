//! Identifier uniqueness and dangling references.

use std::collections::BTreeMap;

use crate::{
    check::Context,
    domain::{CheckResult, DefinitionForm, Identifier, Kind, Occurrence, Role},
};

/// Dangling references reported at most.
const MAX_DANGLING: usize = 10;

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    let graph = ctx.graph();

    let mut counts: BTreeMap<&Identifier, usize> = BTreeMap::new();
    for occurrence in graph.definitions().filter(|o| counts_toward_duplicates(o)) {
        *counts.entry(&occurrence.id).or_default() += 1;
    }
    for (id, count) in counts.into_iter().filter(|(_, count)| *count > 1) {
        result.fail(format!("Duplicate ID definition: {id} (defined {count} times)"));
    }

    let dangling = graph
        .all()
        .iter()
        .filter(|id| id.kind() != Kind::Evidence && !graph.is_defined(id))
        .take(MAX_DANGLING);
    for id in dangling {
        result.fail(format!("Dangling reference: {id} (referenced but not defined)"));
    }
}

/// Line-start definitions always count. Bulleted definitions only count for
/// domain-prefixed hard rules; bulleted generic tokens are usually index
/// entries such as must-pass lists.
fn counts_toward_duplicates(occurrence: &Occurrence) -> bool {
    if occurrence.id.kind() == Kind::Evidence {
        return false;
    }
    match occurrence.role {
        Role::Definition(DefinitionForm::LineStart) => true,
        Role::Definition(DefinitionForm::Marker) => occurrence.id.domain().is_some(),
        Role::Definition(DefinitionForm::TableCell) | Role::Reference => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::check::test_support::evaluate;

    const KEY: &str = "check_2_id_integrity";

    #[test]
    fn flags_line_start_duplicates() {
        let result = evaluate(KEY, "DEC-001: first\nDEC-001: second\n");
        assert!(!result.passed);
        assert_eq!(result.issues, ["Duplicate ID definition: DEC-001 (defined 2 times)"]);
    }

    #[test]
    fn flags_bulleted_domain_rule_duplicates() {
        let result = evaluate(KEY, "- SEC-HR-001: a\n- SEC-HR-001: b\n- SEC-HR-001: c\n");
        assert_eq!(result.issues, ["Duplicate ID definition: SEC-HR-001 (defined 3 times)"]);
    }

    #[test]
    fn index_lists_and_tables_are_not_duplicates() {
        let text = "SCN-001: normal\nmust-pass:\n- SCN-001\n| SCN-001 | normal |\n";
        assert!(evaluate(KEY, text).passed);
    }

    #[test]
    fn flags_dangling_references() {
        let result = evaluate(KEY, "DEC-001: choose\nSee DEC-001 and DEC-999.\n");
        assert_eq!(result.issues, ["Dangling reference: DEC-999 (referenced but not defined)"]);
    }

    #[test]
    fn caps_dangling_references() {
        let text: String = (100..120).map(|n| format!("see SCN-{n}\n")).collect();
        assert_eq!(evaluate(KEY, &text).issues.len(), 10);
    }

    #[test]
    fn evidence_is_resolved_elsewhere() {
        assert!(evaluate(KEY, "Backed by EVD-001.\n").passed);
    }

    #[test]
    fn domain_rule_is_not_a_dangling_generic_rule() {
        let text = "- SEC-HR-001: rule\nSCN-001: normal, covers SEC-HR-001\n";
        assert!(evaluate(KEY, text).passed);
    }
}
