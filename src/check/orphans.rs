//! Scenarios that nothing points at.

use std::collections::BTreeSet;

use crate::{
    check::{triggers, Context},
    domain::{graph, CheckResult, Identifier, Kind},
};

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    let graph = ctx.graph();
    if graph.defined_of(Kind::Scenario).next().is_none() {
        return;
    }

    let mut referenced: BTreeSet<Identifier> = BTreeSet::new();

    let hard_rule_lines: BTreeSet<usize> = graph
        .occurrences()
        .iter()
        .filter(|o| o.id.is_hard_rule())
        .map(|o| o.line)
        .collect();
    for line in hard_rule_lines {
        referenced.extend(
            graph
                .on_line(line)
                .iter()
                .filter(|o| o.id.kind() == Kind::Scenario)
                .map(|o| o.id.clone()),
        );
    }

    if let Some(must_pass) = ctx.must_pass() {
        referenced.extend(must_pass.scenarios);
    }

    for links in triggers::entries(ctx)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| entry.links)
    {
        referenced.extend(
            graph::extract_all(&links)
                .into_iter()
                .filter(|id| id.kind() == Kind::Scenario),
        );
    }

    for id in graph.defined_of(Kind::Scenario).filter(|id| !referenced.contains(*id)) {
        result.warn(format!(
            "Orphan SCN: {id} is not referenced by any HR, must-pass set, or trigger Links"
        ));
    }
}

#[cfg(test)]
mod tests {
    use crate::check::test_support::evaluate;

    const KEY: &str = "check_17_orphan_scn";

    #[test]
    fn no_scenarios_passes() {
        assert!(evaluate(KEY, "# RFC\n").warnings.is_empty());
    }

    #[test]
    fn every_reference_path_counts() {
        let text = "\
- SEC-HR-001: tokens expire, exercised by SCN-001

SCN-001: normal
SCN-002: abuse
SCN-003: failure
SCN-004: recovery

## 11. 验收
must-pass:
- SCN-002

## 14. 门禁触发器
- 权限模型变更: NO (Links: SCN-003)
";
        let result = evaluate(KEY, text);
        assert!(result.passed);
        assert_eq!(
            result.warnings,
            ["Orphan SCN: SCN-004 is not referenced by any HR, must-pass set, or trigger Links"]
        );
    }

    #[test]
    fn plain_acceptance_mentions_do_not_count() {
        let text = "SCN-001: normal\n\n## 11. 验收\nSCN-001 passes.\n";
        assert_eq!(evaluate(KEY, text).warnings.len(), 1);
    }
}
