//! The check engine.
//!
//! Seventeen independent checks run over one [`Context`]. Checks 1 to 9 are
//! always evaluated; the rest can be switched off through the configuration.
//! No check depends on another's output, so the registry is evaluated in
//! parallel and the results are collected back in registry order.

use std::{collections::BTreeSet, ops::Range, sync::LazyLock};

use rayon::prelude::*;
use regex::Regex;
use tracing::instrument;

use crate::domain::{
    section::{self, Section},
    text, CheckKind, CheckResult, Config, DefinitionForm, EvidenceStore, Identifier,
    IdentifierGraph, Kind, Report, Role, Strictness, ToggleTable,
};

mod binding;
mod coverage;
mod decisions;
mod diagrams;
mod evidence;
mod expression;
mod ids;
mod matrix;
mod must_pass;
mod orphans;
mod placeholders;
mod readability;
mod sections;
mod strictness;
mod structure;
mod triggers;
mod unresolved;

static ACCEPTANCE: LazyLock<Regex> = LazyLock::new(|| section::heading_pattern(r"^(?:§\s*)?11\b|验收|acceptance"));

static COVERAGE_SECTION: LazyLock<Regex> =
    LazyLock::new(|| section::heading_pattern(r"覆盖矩阵|coverage.?matrix|SCN.?覆盖"));

static TRIGGER_SECTION: LazyLock<Regex> =
    LazyLock::new(|| section::heading_pattern("触发器|trigger|门禁触发"));

static MUST_PASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)must[_-]?pass|必须通过|必通过").expect("must-pass pattern"));

/// Everything a check may read. Built once per run and shared by all checks.
#[derive(Debug)]
pub struct Context<'a> {
    text: &'a str,
    lines: Vec<&'a str>,
    graph: IdentifierGraph,
    evidence: &'a EvidenceStore,
    config: &'a Config,
    template: Option<&'a str>,
    placeholders: Vec<Regex>,
    strictness: Option<Strictness>,
}

impl<'a> Context<'a> {
    /// Prepares a run over `text`.
    ///
    /// Placeholder patterns that fail to compile are skipped with a warning.
    /// Lookaround guards against neighbouring ASCII letters are dropped
    /// first, since check 3 enforces those boundaries itself.
    #[must_use]
    pub fn new(
        text: &'a str,
        evidence: &'a EvidenceStore,
        config: &'a Config,
        template: Option<&'a str>,
    ) -> Self {
        let placeholders = config
            .placeholder_patterns
            .iter()
            .filter_map(|pattern| {
                placeholders::compile(pattern)
                    .inspect_err(|e| {
                        tracing::warn!("Skipping invalid placeholder pattern '{pattern}': {e}");
                    })
                    .ok()
            })
            .collect();

        Self {
            text,
            lines: text.lines().collect(),
            graph: IdentifierGraph::build(text),
            evidence,
            config,
            template,
            placeholders,
            strictness: Strictness::detect(text),
        }
    }

    /// The document text.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// The document lines.
    #[must_use]
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// The identifier graph of the document.
    #[must_use]
    pub const fn graph(&self) -> &IdentifierGraph {
        &self.graph
    }

    /// The evidence store.
    #[must_use]
    pub const fn evidence(&self) -> &EvidenceStore {
        self.evidence
    }

    /// The resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        self.config
    }

    /// The template text, if one was supplied.
    #[must_use]
    pub const fn template(&self) -> Option<&'a str> {
        self.template
    }

    /// The strictness declared in the text.
    #[must_use]
    pub const fn strictness(&self) -> Option<Strictness> {
        self.strictness
    }

    /// The compiled placeholder patterns.
    #[must_use]
    pub fn placeholders(&self) -> &[Regex] {
        &self.placeholders
    }

    /// The acceptance section.
    #[must_use]
    pub fn acceptance_section(&self) -> Option<Section<'a>> {
        section::slice(self.text, &ACCEPTANCE)
    }

    /// The dedicated coverage-matrix section.
    #[must_use]
    pub fn coverage_section(&self) -> Option<Section<'a>> {
        section::slice(self.text, &COVERAGE_SECTION)
    }

    /// The trigger declaration section.
    #[must_use]
    pub fn trigger_section(&self) -> Option<Section<'a>> {
        section::slice(self.text, &TRIGGER_SECTION)
    }

    /// Whether `line` opens a block: its leading identifier is a line-start or
    /// marker definition of `kind`.
    fn opens_block(&self, line: usize, kind: Kind) -> Option<&Identifier> {
        self.graph
            .leading_definition(line)
            .filter(|o| o.id.kind() == kind && o.role != Role::Definition(DefinitionForm::TableCell))
            .map(|o| &o.id)
    }

    /// The line range of the block opened at `start`: up to the next heading
    /// or the next line carrying a leading definition.
    fn block_from(&self, start: usize) -> Range<usize> {
        let end = (start + 1..self.lines.len())
            .find(|&idx| {
                text::is_heading(self.lines[idx]) || self.graph.leading_definition(idx).is_some()
            })
            .unwrap_or(self.lines.len());
        start..end
    }

    /// Blocks opened by definitions of `kind`, in document order.
    pub(crate) fn blocks(&self, kind: Kind) -> Vec<(&Identifier, Range<usize>)> {
        (0..self.lines.len())
            .filter_map(|idx| self.opens_block(idx, kind).map(|id| (id, self.block_from(idx))))
            .collect()
    }

    /// The explicit must-pass declaration in the acceptance section.
    pub(crate) fn must_pass(&self) -> Option<MustPass> {
        let section = self.acceptance_section()?;
        let first = section
            .lines
            .iter()
            .position(|line| MUST_PASS.is_match(line))?;
        let rest = &section.lines[first + 1..];
        let lead = rest.iter().take_while(|line| line.is_empty()).count();
        let last = rest[lead..]
            .iter()
            .position(|line| line.is_empty() || text::is_heading(line))
            .map_or(section.lines.len(), |offset| first + 1 + lead + offset);

        let lines = (section.start_line + first)..(section.start_line + last);
        let scenarios = lines
            .clone()
            .flat_map(|idx| self.graph.on_line(idx))
            .filter(|o| o.id.kind() == Kind::Scenario)
            .map(|o| o.id.clone())
            .collect();
        Some(MustPass { lines, scenarios })
    }
}

/// A must-pass declaration: its line range and the scenarios it lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MustPass {
    pub lines: Range<usize>,
    pub scenarios: BTreeSet<Identifier>,
}

/// A registered check.
#[derive(Debug)]
pub struct Check {
    /// Configuration key, e.g. `check_10_hr_scn_binding`.
    pub key: &'static str,
    /// Display name, e.g. `10. HR→SCN binding`.
    pub name: &'static str,
    /// Hard or soft.
    pub kind: CheckKind,
    /// Whether the check ignores the configuration's enable flags.
    pub always_on: bool,
    run: fn(&Context<'_>, &mut CheckResult),
}

impl Check {
    const fn hard(key: &'static str, name: &'static str, run: fn(&Context<'_>, &mut CheckResult)) -> Self {
        Self {
            key,
            name,
            kind: CheckKind::Hard,
            always_on: true,
            run,
        }
    }

    const fn toggleable(self) -> Self {
        Self {
            always_on: false,
            ..self
        }
    }

    const fn soft(key: &'static str, name: &'static str, run: fn(&Context<'_>, &mut CheckResult)) -> Self {
        Self {
            key,
            name,
            kind: CheckKind::Soft,
            always_on: false,
            run,
        }
    }

    /// Whether the check runs under `config`.
    #[must_use]
    pub fn is_enabled(&self, config: &Config) -> bool {
        let table = match self.kind {
            CheckKind::Hard => ToggleTable::Hard,
            CheckKind::Soft => ToggleTable::Soft,
        };
        self.always_on || config.is_enabled(self.key, table)
    }

    /// Runs the check.
    #[must_use]
    pub fn evaluate(&self, ctx: &Context<'_>) -> CheckResult {
        let mut result = match self.kind {
            CheckKind::Hard => CheckResult::hard(self.name),
            CheckKind::Soft => CheckResult::soft(self.name),
        };
        (self.run)(ctx, &mut result);
        result
    }
}

/// Every check, in report order.
pub static REGISTRY: [Check; 17] = [
    Check::hard("check_1_structure", "1. Structure & template consistency", structure::check),
    Check::hard("check_2_id_integrity", "2. ID integrity & references", ids::check),
    Check::hard("check_3_placeholders", "3. Placeholder residuals", placeholders::check),
    Check::hard("check_4_expression_rules", "4. Expression rules", expression::check),
    Check::hard("check_5_readability", "5. Readability", readability::check),
    Check::hard("check_6_scn_coverage", "6. SCN category coverage", coverage::check),
    Check::hard("check_7_evidence", "7. Evidence cross-check", evidence::check),
    Check::hard("check_8_strictness", "8. Strictness visibility", strictness::check),
    Check::hard("check_9_triggers", "9. Trigger declarations", triggers::check),
    Check::hard("check_10_hr_scn_binding", "10. HR→SCN binding", binding::check).toggleable(),
    Check::hard("check_11_dec_alternatives", "11. DEC alternatives", decisions::check).toggleable(),
    Check::hard("check_12_must_pass_validity", "12. Must-pass validity", must_pass::check).toggleable(),
    Check::hard("check_13_coverage_matrix", "13. Coverage matrix", matrix::check).toggleable(),
    Check::hard("check_14_section_non_empty", "14. Section non-empty", sections::check).toggleable(),
    Check::soft("check_15_diagram_text_pairing", "15. Diagram-text pairing", diagrams::check),
    Check::soft("check_16_unresolved_format", "16. Unresolved format", unresolved::check),
    Check::soft("check_17_orphan_scn", "17. Orphan SCN", orphans::check),
];

/// Looks up a registered check by its configuration key.
#[must_use]
pub fn by_key(key: &str) -> Option<&'static Check> {
    REGISTRY.iter().find(|check| check.key == key)
}

/// Runs every enabled check and aggregates the results.
#[instrument(level = "debug", skip_all)]
#[must_use]
pub fn run(ctx: &Context<'_>) -> Report {
    let results: Vec<CheckResult> = REGISTRY
        .par_iter()
        .filter(|check| check.is_enabled(ctx.config))
        .map(|check| check.evaluate(ctx))
        .collect();

    let (hard, soft): (Vec<_>, Vec<_>) = results
        .into_iter()
        .partition(|result| result.kind == CheckKind::Hard);

    tracing::debug!(hard = hard.len(), soft = soft.len(), "Checks evaluated");
    Report::aggregate(hard, soft)
}

/// Validates a document in one call.
#[must_use]
pub fn validate(
    text: &str,
    evidence: &EvidenceStore,
    config: &Config,
    template: Option<&str>,
) -> Report {
    run(&Context::new(text, evidence, config, template))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Runs one registered check with default configuration and no evidence.
    pub fn evaluate(key: &str, text: &str) -> CheckResult {
        evaluate_with(key, text, &EvidenceStore::default(), None)
    }

    /// Runs one registered check with the given evidence and template.
    pub fn evaluate_with(
        key: &str,
        text: &str,
        evidence: &EvidenceStore,
        template: Option<&str>,
    ) -> CheckResult {
        let config = Config::default();
        let ctx = Context::new(text, evidence, &config, template);
        by_key(key).expect("registered check").evaluate(&ctx)
    }

    /// Runs one registered check under `config`.
    pub fn evaluate_config(key: &str, text: &str, config: &Config) -> CheckResult {
        let evidence = EvidenceStore::default();
        let ctx = Context::new(text, &evidence, config, None);
        by_key(key).expect("registered check").evaluate(&ctx)
    }
}
