//! Fenced block rules: diagram punctuation, language tags, no implementation
//! code.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    check::Context,
    domain::{text, CheckResult},
};

static DIAGRAM_FORBIDDEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[();]").expect("diagram pattern"));

static IMPLEMENTATION: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"^\s*(?:import |from |#include |package |using )").expect("import pattern"),
        Regex::new(r"^\s*(?:def |class |func |fn |function )").expect("definition pattern"),
    ]
});

const EXCERPT: usize = 60;

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    let allowed = &ctx.config().allowed_lang_tags;
    let shown: Vec<&str> = allowed
        .iter()
        .map(String::as_str)
        .filter(|tag| !tag.is_empty())
        .collect();

    for block in text::fenced_blocks(ctx.text()) {
        if block.lang == "mermaid" {
            for line in block.body.iter().filter(|line| DIAGRAM_FORBIDDEN.is_match(line)) {
                result.fail(format!(
                    "Mermaid block contains forbidden char [();] in: {}",
                    text::truncate_chars(line.trim(), EXCERPT)
                ));
            }
        }

        if allowed.contains(&block.lang) {
            continue;
        }

        result.fail(format!(
            "Fenced block uses non-allowed language tag: '{}' (allowed: {})",
            block.lang,
            shown.join(", ")
        ));

        let code = block
            .body
            .iter()
            .filter(|line| IMPLEMENTATION.iter().any(|pattern| pattern.is_match(line)));
        for line in code {
            result.fail(format!(
                "Implementation code detected in fenced block ({}): {}",
                block.lang,
                text::truncate_chars(line.trim(), EXCERPT)
            ));
        }
    }
}
