//! End-to-end runs of the gate over fixture documents.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use rfc_gate::{
    Config, EvidenceStore, Report, Strictness, Verdict, Workspace,
    storage::{self, RunState},
    validate,
};
use tempfile::TempDir;
use test_case::test_case;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn standard() -> String {
    storage::load_document(&fixture("standard.md"))
        .unwrap()
        .text()
        .to_string()
}

fn evidence() -> EvidenceStore {
    storage::load_evidence(Some(&fixture("evidence.json"))).unwrap()
}

fn run(text: &str) -> Report {
    validate(text, &evidence(), &Config::default(), None)
}

/// Adds a scenario that no hard rule, must-pass entry or trigger points at.
fn with_orphan(text: &str) -> String {
    text.replace(
        "## 8. 决策与取舍",
        "SCN-007: abuse 令牌重放\n- WHEN 攻击者重放旧令牌\n- THEN 网关拒绝请求\n\n## 8. 决策与取舍",
    )
}

fn failed(report: &Report) -> Vec<&str> {
    report.hard_fail.iter().map(String::as_str).collect()
}

#[test]
fn standard_document_passes_every_check() {
    let template = storage::load_template(Some(&fixture("template.md"))).unwrap();
    let report = validate(&standard(), &evidence(), &Config::default(), template.as_deref());

    for result in &report.results {
        assert!(result.passed, "{}: {:?}", result.name, result.issues);
        assert!(result.warnings.is_empty(), "{}: {:?}", result.name, result.warnings);
    }
    assert_eq!(report.overall, Verdict::Pass);
    assert_eq!(report.hard_pass.len(), 14);
    assert_eq!(report.results.len(), 17);
}

#[test_case("light"; "light")]
#[test_case("full"; "full")]
#[test_case("L2"; "canonical spelling")]
fn other_strictness_levels_pass(level: &str) {
    let text = standard().replace("strictness: standard", &format!("strictness: {level}"));
    assert_eq!(run(&text).overall, Verdict::Pass);
}

#[test]
fn coverage_matrix_is_required_above_light() {
    let text = standard();
    let (before, _) = text.split_once("| 风险维度 | 场景 |").unwrap();

    assert_eq!(failed(&run(before)), ["13. Coverage matrix"]);

    let light = before.replace("strictness: standard", "strictness: light");
    assert_eq!(run(&light).overall, Verdict::Pass);
}

#[test]
fn soft_findings_give_warn() {
    let report = run(&with_orphan(&standard()));

    assert_eq!(report.overall, Verdict::Warn);
    assert_eq!(report.soft_warn, ["17. Orphan SCN"]);
    assert!(report.hard_fail.is_empty());
}

#[test]
fn hard_failures_win_over_warnings() {
    let text = with_orphan(&standard()).replace("保持现有客户端兼容。", "保持现有客户端兼容 TBD。");
    let report = run(&text);

    assert_eq!(report.overall, Verdict::Fail);
    assert_eq!(failed(&report), ["3. Placeholder residuals"]);
    assert_eq!(report.soft_warn, ["17. Orphan SCN"]);
}

#[test]
fn flawed_document_fails_across_the_board() {
    let document = storage::load_document(&fixture("flawed.md")).unwrap();
    let report = validate(
        document.text(),
        &EvidenceStore::default(),
        &Config::default(),
        None,
    );

    assert_eq!(report.overall, Verdict::Fail);
    assert_eq!(
        failed(&report),
        [
            "1. Structure & template consistency",
            "2. ID integrity & references",
            "3. Placeholder residuals",
            "5. Readability",
            "6. SCN category coverage",
            "7. Evidence cross-check",
            "9. Trigger declarations",
            "10. HR→SCN binding",
            "11. DEC alternatives",
            "13. Coverage matrix",
            "14. Section non-empty",
        ]
    );
    assert_eq!(report.soft_warn, ["17. Orphan SCN"]);
    assert_eq!(
        report.result("2.").unwrap().issues,
        ["Dangling reference: DEC-404 (referenced but not defined)"]
    );
    assert_eq!(document.strictness(), Some(Strictness::Full));
}

#[test]
fn evidence_store_is_cross_checked() {
    let text = standard().replace("(EVD-002)。", "(EVD-009)。");
    let report = run(&text);

    assert_eq!(
        report.result("7.").unwrap().issues,
        ["EVD referenced in document but missing in evidence store: EVD-009"]
    );
}

#[test]
fn override_file_disables_checks() {
    let config = Config::resolve(Some(&fixture("gate_a_config.json")));
    let text = standard();
    let (before, _) = text.split_once("| 风险维度 | 场景 |").unwrap();

    let report = validate(before, &evidence(), &config, None);
    assert_eq!(report.overall, Verdict::Pass);
    assert_eq!(report.results.len(), 16);
    assert!(report.result("13.").is_none());
}

#[test]
fn runs_are_deterministic() {
    let document = storage::load_document(&fixture("flawed.md")).unwrap();
    let first = run(document.text());
    for _ in 0..8 {
        assert_eq!(run(document.text()), first);
    }
}

#[test]
fn report_serializes_with_verdict_fields() {
    let value = serde_json::to_value(run(&standard())).unwrap();

    assert_eq!(value["overall"], "PASS");
    assert_eq!(value["hard_fail"], serde_json::json!([]));
    assert_eq!(value["results"][0]["name"], "1. Structure & template consistency");
    assert_eq!(value["results"][16]["kind"], "soft");
}

#[test]
fn scaffolded_document_carries_its_meta_fields() {
    let root = TempDir::new().unwrap();
    let template = std::fs::read_to_string(fixture("template.md")).unwrap();
    let state = RunState::new("rfc-20260211-auth-model", Strictness::Standard, chrono::Utc::now());
    let workspace = Workspace::create(root.path(), &state, "认证模型重构", &template).unwrap();

    let document = storage::load_document(&workspace.document()).unwrap();
    let report = validate(document.text(), &EvidenceStore::default(), &Config::default(), Some(&template));

    assert!(document.text().contains("# RFC-20260211：认证模型重构"));
    assert!(report.result("1.").unwrap().passed);
    assert!(report.result("8.").unwrap().passed);
    assert_eq!(report.overall, Verdict::Fail);
}
