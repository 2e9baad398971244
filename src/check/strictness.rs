//! Strictness visibility and the upgrade decision.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    check::Context,
    domain::{CheckResult, Strictness},
};

static UPGRADE_SIGNAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)升级|upgrade|5-role|5\s*个?\s*角色|5\s*roles?").expect("upgrade signal pattern")
});

static UPGRADE_DECISION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)DEC-[0-9]{3,}.*(?:升级|upgrade)").expect("upgrade decision pattern")
});

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    if !Strictness::mentioned(ctx.text()) {
        result.fail("No 'strictness' field found in document");
        return;
    }

    let Some(level) = ctx.strictness() else {
        result.fail(
            "Strictness field exists but no valid value found (expected: light/standard/full or L1/L2/L3)",
        );
        return;
    };

    if level == Strictness::Standard
        && UPGRADE_SIGNAL.is_match(ctx.text())
        && !UPGRADE_DECISION.is_match(ctx.text())
    {
        result.fail("Standard/L2 with upgrade to 5 roles detected but no DEC recording upgrade rationale");
    }
}
