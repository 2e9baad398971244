//! Risk to scenario coverage matrix for standard and full documents.

use std::sync::LazyLock;

use regex::Regex;

use crate::{check::Context, domain::CheckResult};

static MATRIX_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\|.*SCN-\d{3,}.*\|").expect("matrix row pattern"));

const RISK_KEYWORDS: [&str; 7] = ["风险", "维度", "risk", "dimension", "category", "路径", "path"];

fn has_matrix(text: &str) -> bool {
    if MATRIX_ROW.is_match(text) {
        return true;
    }
    text.lines().any(|line| {
        let lower = line.to_lowercase();
        lower.contains("scn-") && RISK_KEYWORDS.iter().any(|k| lower.contains(k))
    })
}

pub fn check(ctx: &Context<'_>, result: &mut CheckResult) {
    let Some(level) = ctx.strictness().filter(|s| s.requires_coverage_matrix()) else {
        return;
    };

    let found = [ctx.acceptance_section(), ctx.coverage_section()]
        .into_iter()
        .flatten()
        .any(|section| has_matrix(&section.text()));

    if !found {
        result.fail(format!(
            "Strictness {} requires a risk→SCN coverage matrix in the acceptance section but none found",
            level.canonical()
        ));
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use crate::check::test_support::evaluate;

    const KEY: &str = "check_13_coverage_matrix";

    #[test_case("strictness: light\n"; "light")]
    #[test_case("# RFC\n"; "undeclared")]
    fn not_required(text: &str) {
        assert!(evaluate(KEY, text).passed);
    }

    #[test]
    fn standard_requires_a_matrix() {
        let text = "strictness: standard\n\n## 11. 验收\nAll scenarios pass.\n";
        let result = evaluate(KEY, text);
        assert_eq!(
            result.issues,
            ["Strictness L2 requires a risk→SCN coverage matrix in the acceptance section but none found"]
        );
    }

    #[test]
    fn table_rows_count() {
        let text = "strictness: full\n\n## 11. 验收\n| 风险 | 场景 |\n|---|---|\n| 越权 | SCN-002 |\n";
        assert!(evaluate(KEY, text).passed);
    }

    #[test]
    fn keyword_lines_count() {
        let text = "strictness: standard\n\n## 11. Acceptance\n- Risk: token theft → SCN-003\n";
        assert!(evaluate(KEY, text).passed);
    }

    #[test]
    fn dedicated_coverage_section_counts() {
        let text = "\
strictness: L3

## 11. 验收
See the matrix.

## 12. SCN 覆盖矩阵
| Dimension | Scenarios |
|---|---|
| abuse | SCN-004 |
";
        assert!(evaluate(KEY, text).passed);
    }
}
