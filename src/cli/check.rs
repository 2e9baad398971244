use std::{
    path::{Path, PathBuf},
    process,
};

use anyhow::Context as _;
use clap::Parser;
use rfc_gate::{
    Config, Report, Verdict,
    domain::FrontMatter,
    storage::{self, LoadError},
};
use tracing::instrument;

use super::terminal;

/// Override file looked up next to the document when `--config` is absent.
const CONFIG_FILE: &str = "gate_a_config.json";

const RULE_WIDTH: usize = 60;
const DRY_RUN_PREFIX: &str = "[DRY-RUN] ";

#[derive(Debug, Parser)]
#[command(about = "Run the structural gate over a document")]
pub struct Command {
    /// Path to the document (rfc.md)
    rfc: PathBuf,

    /// Path to the evidence store (evidence.json)
    #[arg(long, short)]
    evidence: Option<PathBuf>,

    /// Path to a template for structure comparison
    #[arg(long, short)]
    template: Option<PathBuf>,

    /// Path to a configuration override (JSON, or TOML by extension)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Report what would fail without failing (exit code always 0)
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Command {
    #[instrument(level = "debug", skip(self), fields(rfc = %self.rfc.display()))]
    pub fn run(self) -> anyhow::Result<()> {
        let document = match storage::load_document(&self.rfc) {
            Ok(document) => document,
            Err(LoadError::NotFound(path)) => {
                eprintln!("Error: {} not found", path.display());
                process::exit(2);
            }
            Err(e) => return Err(e).context("Failed to load document"),
        };
        let evidence =
            storage::load_evidence(self.evidence.as_deref()).context("Failed to load evidence store")?;
        let template =
            storage::load_template(self.template.as_deref()).context("Failed to load template")?;
        let config = Config::resolve(self.config_path().as_deref());

        let report = rfc_gate::validate(document.text(), &evidence, &config, template.as_deref());

        match self.output {
            OutputFormat::Table => {
                let width = terminal::rule_width(RULE_WIDTH);
                print_table(&report, document.front_matter(), width, self.dry_run);
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        }

        if !self.dry_run && report.overall == Verdict::Fail {
            process::exit(1);
        }
        Ok(())
    }

    fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| sibling_config(&self.rfc))
    }
}

fn sibling_config(rfc: &Path) -> Option<PathBuf> {
    let candidate = rfc.parent()?.join(CONFIG_FILE);
    candidate.exists().then_some(candidate)
}

/// A report line, with the status that colours it.
type Line = (Option<Verdict>, String);

fn print_table(report: &Report, front_matter: Option<&FrontMatter>, width: usize, dry_run: bool) {
    let prefix = if dry_run { DRY_RUN_PREFIX } else { "" };
    let mut lines = table_lines(report, front_matter, width);
    lines.push(summary_line(report, dry_run));

    for (status, text) in lines {
        println!("{}", terminal::paint(&format!("{prefix}{text}"), status));
    }
}

fn table_lines(report: &Report, front_matter: Option<&FrontMatter>, width: usize) -> Vec<Line> {
    let rule = "=".repeat(width);
    let mut lines: Vec<Line> = vec![
        (None, rule.clone()),
        (None, "GATE-A: Structural Validation Report".to_string()),
        (None, rule.clone()),
    ];

    if let Some(template_id) = front_matter.and_then(|fm| fm.template_id.as_deref()) {
        let version = front_matter
            .and_then(|fm| fm.template_version.as_deref())
            .unwrap_or("unversioned");
        lines.push((None, format!("Template: {template_id} ({version})")));
    }

    for result in &report.results {
        let status = result.status();
        lines.push((Some(status), format!("  [{status}] {}", result.name)));
        lines.extend(
            result
                .issues
                .iter()
                .map(|issue| (None, format!("         - {issue}"))),
        );
        lines.extend(
            result
                .warnings
                .iter()
                .map(|warning| (None, format!("         - [WARN] {warning}"))),
        );
    }

    lines.push((None, rule));
    lines
}

fn summary_line(report: &Report, dry_run: bool) -> Line {
    let hard_total = report.hard_results().count();
    let text = match (dry_run, report.overall) {
        (true, Verdict::Fail) => format!(
            "DRY-RUN RESULT: WOULD_FAIL ({} HARD failures)",
            report.hard_fail.len()
        ),
        (true, _) => "DRY-RUN RESULT: WOULD_PASS".to_string(),
        (false, Verdict::Pass) => format!("RESULT: PASS (all {hard_total} hard checks passed)"),
        (false, Verdict::Warn) => format!(
            "RESULT: WARN (all hard checks passed, {} soft warning(s))",
            report.soft_warn.len()
        ),
        (false, Verdict::Fail) => format!(
            "RESULT: FAIL ({}/{hard_total} hard checks failed, {} issues)",
            report.hard_fail.len(),
            report.issue_count()
        ),
    };
    (Some(report.overall), text)
}
