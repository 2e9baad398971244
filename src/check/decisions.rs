//! Decisions record alternatives or justify having none.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

use crate::{
    check::Context,
    domain::{text, CheckResult, Identifier, Kind},
};

static ALTERNATIVES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)替代|备选|alternative|option|trade-off|trade\s*off|方案\s*[A-Z]|方案\s*[一二三四五]")
        .expect("alternatives pattern")
});

static SINGLE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)唯一方案|single[- ]path|no\s+alternative|唯一选择|别无选择|only\s+option")
        .expect("single path pattern")
});

const BEFORE: usize = 5;
const AFTER: usize = 10;

fn justified(lines: &[&str]) -> bool {
    lines
        .iter()
        .any(|line| ALTERNATIVES.is_match(line) || SINGLE_PATH.is_match(line))
}

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    let lines = ctx.lines();
    let mut seen: BTreeSet<&Identifier> = BTreeSet::new();

    for (id, block) in ctx.blocks(Kind::Decision) {
        if !seen.insert(id) {
            continue;
        }
        let start = block.start;
        if justified(&lines[block]) || justified(text::window(lines, start, BEFORE, AFTER)) {
            continue;
        }
        result.fail(format!("{id} lacks alternatives/options or single-path justification"));
    }
}
