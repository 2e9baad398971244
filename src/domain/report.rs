use std::fmt;

use serde::Serialize;

/// Whether a check blocks progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    /// Blocking. Communicates through pass/fail and issues.
    Hard,
    /// Advisory. Always passes and communicates through warnings.
    Soft,
}

/// The outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Display name, e.g. `2. ID integrity & references`.
    pub name: String,
    /// Hard or soft.
    pub kind: CheckKind,
    /// Whether the check passed. Soft results always pass.
    pub passed: bool,
    /// Failure messages, in discovery order.
    pub issues: Vec<String>,
    /// Warning messages, in discovery order.
    pub warnings: Vec<String>,
}

impl CheckResult {
    /// A passing hard result with no issues.
    #[must_use]
    pub fn hard(name: impl Into<String>) -> Self {
        Self::new(name, CheckKind::Hard)
    }

    /// A soft result with no warnings.
    #[must_use]
    pub fn soft(name: impl Into<String>) -> Self {
        Self::new(name, CheckKind::Soft)
    }

    fn new(name: impl Into<String>, kind: CheckKind) -> Self {
        Self {
            name: name.into(),
            kind,
            passed: true,
            issues: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Records an issue and marks the result as failed.
    pub fn fail(&mut self, issue: impl Into<String>) {
        self.passed = false;
        self.issues.push(issue.into());
    }

    /// Records a warning.
    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// The per-check status: `PASS`/`FAIL` for hard checks, `PASS`/`WARN`
    /// for soft checks.
    #[must_use]
    pub fn status(&self) -> Verdict {
        match self.kind {
            CheckKind::Hard if !self.passed => Verdict::Fail,
            CheckKind::Soft if !self.warnings.is_empty() => Verdict::Warn,
            _ => Verdict::Pass,
        }
    }
}

/// The three-state outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// All hard checks passed and no soft check warned.
    Pass,
    /// All hard checks passed and at least one soft check warned.
    Warn,
    /// At least one hard check failed.
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        })
    }
}

/// The aggregated outcome of a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Names of hard checks that passed.
    pub hard_pass: Vec<String>,
    /// Names of hard checks that failed.
    pub hard_fail: Vec<String>,
    /// Names of soft checks that warned.
    pub soft_warn: Vec<String>,
    /// The final verdict.
    pub overall: Verdict,
    /// Every result, hard checks first, in registry order.
    pub results: Vec<CheckResult>,
}

impl Report {
    /// Aggregates hard and soft results.
    ///
    /// Any hard failure gives [`Verdict::Fail`] regardless of warnings;
    /// otherwise any soft warning gives [`Verdict::Warn`]; otherwise
    /// [`Verdict::Pass`].
    #[must_use]
    pub fn aggregate(hard: Vec<CheckResult>, soft: Vec<CheckResult>) -> Self {
        fn names(results: &[CheckResult], keep: fn(&CheckResult) -> bool) -> Vec<String> {
            results
                .iter()
                .filter(|r| keep(r))
                .map(|r| r.name.clone())
                .collect()
        }

        let hard_pass = names(&hard, |r| r.passed);
        let hard_fail = names(&hard, |r| !r.passed);
        let soft_warn = names(&soft, |r| !r.warnings.is_empty());

        let overall = if !hard_fail.is_empty() {
            Verdict::Fail
        } else if !soft_warn.is_empty() {
            Verdict::Warn
        } else {
            Verdict::Pass
        };

        let mut results = hard;
        results.extend(soft);

        Self {
            hard_pass,
            hard_fail,
            soft_warn,
            overall,
            results,
        }
    }

    /// The hard results.
    pub fn hard_results(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| r.kind == CheckKind::Hard)
    }

    /// Total number of issues across failed hard checks.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.hard_results()
            .filter(|r| !r.passed)
            .map(|r| r.issues.len())
            .sum()
    }

    /// Looks up a result by name prefix, e.g. `"7."`.
    #[must_use]
    pub fn result(&self, prefix: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.name.starts_with(prefix))
    }
}
