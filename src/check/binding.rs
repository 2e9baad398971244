//! Every hard rule is exercised by some scenario.

use std::collections::BTreeSet;

use crate::{
    check::Context,
    domain::{CheckResult, Identifier, Kind},
};

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    let graph = ctx.graph();
    if graph.defined_of(Kind::HardRule).next().is_none() {
        return;
    }

    let mut bound: BTreeSet<&Identifier> = BTreeSet::new();

    for (_, block) in ctx.blocks(Kind::Scenario) {
        bound.extend(block.flat_map(|idx| graph.on_line(idx)).map(|o| &o.id));
    }

    let scenario_lines = graph
        .occurrences()
        .iter()
        .filter(|o| o.id.kind() == Kind::Scenario)
        .map(|o| o.line)
        .collect::<BTreeSet<_>>();
    for line in scenario_lines {
        bound.extend(graph.on_line(line).iter().map(|o| &o.id));
    }

    for id in graph.defined_of(Kind::HardRule).filter(|id| !bound.contains(id)) {
        result.fail(format!("HR {id} is not referenced by any SCN block"));
    }
}
