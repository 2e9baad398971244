//! Scenarios named in the must-pass set are defined.

use std::collections::BTreeSet;

use crate::{
    check::Context,
    domain::{CheckResult, Identifier, Kind},
};

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    let Some(section) = ctx.acceptance_section() else {
        return;
    };
    let graph = ctx.graph();

    if let Some(must_pass) = ctx.must_pass() {
        // A listing in the must-pass block does not define the scenario.
        let defined: BTreeSet<&Identifier> = graph
            .definitions()
            .filter(|o| o.id.kind() == Kind::Scenario && !must_pass.lines.contains(&o.line))
            .map(|o| &o.id)
            .collect();
        for id in must_pass.scenarios.iter().filter(|id| !defined.contains(id)) {
            result.fail(format!("Must-pass SCN {id} is not defined in the document"));
        }
        return;
    }

    let referenced: BTreeSet<&Identifier> = (section.start_line..section.start_line + section.lines.len())
        .flat_map(|idx| graph.on_line(idx))
        .filter(|o| o.id.kind() == Kind::Scenario)
        .map(|o| &o.id)
        .collect();
    for id in referenced.into_iter().filter(|id| !graph.is_defined(id)) {
        result.fail(format!("Must-pass SCN {id} is not defined in the document"));
    }
}
