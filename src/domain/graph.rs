//! Recovery of the identifier graph from raw document text.
//!
//! Each line is scanned twice. The first pass collects domain-prefixed hard
//! rules (`SEC-HR-001`) and records their spans; the second pass collects
//! generic tokens (`HR-001`, `SCN-010`, ...) and drops any whose span lies
//! inside a domain-prefixed span, so one logical identifier is never counted
//! as two.

use std::{
    collections::{BTreeMap, BTreeSet},
    ops::Range,
    sync::LazyLock,
};

use regex::Regex;

use crate::domain::{
    identifier::{Identifier, Kind},
    text,
};

static GENERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(HR|DEC|REQ|SCN|CHG|EVD)-([0-9]{3,})\b").expect("generic identifier pattern")
});

static DOMAIN_HR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z]+)-HR-([0-9]{3,})\b").expect("domain identifier pattern")
});

/// How a defining occurrence is positioned on its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionForm {
    /// The identifier is the first token of the trimmed line.
    LineStart,
    /// The identifier follows a leading bullet, quote, heading or numbering
    /// marker run.
    Marker,
    /// The identifier opens the first cell of a table row.
    TableCell,
}

/// Whether an occurrence defines its identifier or refers to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// A defining occurrence.
    Definition(DefinitionForm),
    /// Any other occurrence.
    Reference,
}

/// A single textual occurrence of an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// The identifier.
    pub id: Identifier,
    /// Zero-based line index.
    pub line: usize,
    /// Byte span within the (untrimmed) line.
    pub span: Range<usize>,
    /// Definition or reference.
    pub role: Role,
}

impl Occurrence {
    /// Whether this occurrence defines its identifier.
    #[must_use]
    pub const fn is_definition(&self) -> bool {
        matches!(self.role, Role::Definition(_))
    }
}

/// Scans one line for identifier occurrences, in left-to-right order.
#[must_use]
pub fn scan_line(line: &str, line_index: usize) -> Vec<Occurrence> {
    let trimmed = line.trim();
    let lead = line.len() - line.trim_start().len();

    let mut found: Vec<(Range<usize>, Identifier)> = Vec::new();

    for caps in DOMAIN_HR.captures_iter(trimmed) {
        let (Some(whole), Some(domain), Some(number)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        if let Ok(id) = Identifier::hard_rule_in(domain.as_str(), number.as_str()) {
            found.push((whole.range(), id));
        }
    }

    let priority: Vec<Range<usize>> = found.iter().map(|(span, _)| span.clone()).collect();

    for caps in GENERIC.captures_iter(trimmed) {
        let (Some(whole), Some(kind), Some(number)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let inside_priority = priority
            .iter()
            .any(|span| span.start <= whole.start() && whole.end() <= span.end);
        if inside_priority {
            continue;
        }
        let Some(kind) = Kind::from_prefix(kind.as_str()) else {
            continue;
        };
        if let Ok(id) = Identifier::new(kind, number.as_str()) {
            found.push((whole.range(), id));
        }
    }

    found.sort_by_key(|(span, _)| span.start);

    let marker_start = text::after_marker_run(trimmed);
    let table_start = text::after_table_leader(trimmed);

    found
        .into_iter()
        .map(|(span, id)| {
            let role = if span.start == 0 {
                Role::Definition(DefinitionForm::LineStart)
            } else if Some(span.start) == marker_start {
                Role::Definition(DefinitionForm::Marker)
            } else if Some(span.start) == table_start {
                Role::Definition(DefinitionForm::TableCell)
            } else {
                Role::Reference
            };
            Occurrence {
                id,
                line: line_index,
                span: (span.start + lead)..(span.end + lead),
                role,
            }
        })
        .collect()
}

/// Every identifier that occurs anywhere in `text`.
#[must_use]
pub fn extract_all(text: &str) -> BTreeSet<Identifier> {
    text.lines()
        .enumerate()
        .flat_map(|(idx, line)| scan_line(line, idx))
        .map(|occurrence| occurrence.id)
        .collect()
}

/// The defined identifiers and all identifiers that occur in `text`.
#[must_use]
pub fn extract_definitions(text: &str) -> (BTreeSet<Identifier>, BTreeSet<Identifier>) {
    let graph = IdentifierGraph::build(text);
    (graph.defined, graph.all)
}

/// The identifier graph of a document: every occurrence, indexed by line.
#[derive(Debug, Clone, Default)]
pub struct IdentifierGraph {
    occurrences: Vec<Occurrence>,
    by_line: BTreeMap<usize, Range<usize>>,
    defined: BTreeSet<Identifier>,
    all: BTreeSet<Identifier>,
}

impl IdentifierGraph {
    /// Scans the whole document.
    #[must_use]
    pub fn build(text: &str) -> Self {
        let mut graph = Self::default();
        for (idx, line) in text.lines().enumerate() {
            let occurrences = scan_line(line, idx);
            if occurrences.is_empty() {
                continue;
            }
            let start = graph.occurrences.len();
            for occurrence in occurrences {
                if occurrence.is_definition() {
                    graph.defined.insert(occurrence.id.clone());
                }
                graph.all.insert(occurrence.id.clone());
                graph.occurrences.push(occurrence);
            }
            graph.by_line.insert(idx, start..graph.occurrences.len());
        }
        graph
    }

    /// All occurrences in document order.
    #[must_use]
    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// The occurrences on one line.
    #[must_use]
    pub fn on_line(&self, line: usize) -> &[Occurrence] {
        self.by_line
            .get(&line)
            .map_or(&[], |range| &self.occurrences[range.clone()])
    }

    /// The defining occurrence at the start of a line, if any.
    #[must_use]
    pub fn leading_definition(&self, line: usize) -> Option<&Occurrence> {
        self.on_line(line).iter().find(|o| o.is_definition())
    }

    /// Defining occurrences in document order.
    pub fn definitions(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences.iter().filter(|o| o.is_definition())
    }

    /// Identifiers with at least one definition.
    #[must_use]
    pub const fn defined(&self) -> &BTreeSet<Identifier> {
        &self.defined
    }

    /// Every identifier seen.
    #[must_use]
    pub const fn all(&self) -> &BTreeSet<Identifier> {
        &self.all
    }

    /// Whether `id` has at least one definition.
    #[must_use]
    pub fn is_defined(&self, id: &Identifier) -> bool {
        self.defined.contains(id)
    }

    /// Defined identifiers of one kind, domain-prefixed hard rules included
    /// under [`Kind::HardRule`].
    pub fn defined_of(&self, kind: Kind) -> impl Iterator<Item = &Identifier> {
        self.defined.iter().filter(move |id| id.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn ids(set: &BTreeSet<Identifier>) -> Vec<String> {
        set.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn domain_form_suppresses_generic_match() {
        let all = extract_all("The SEC-HR-001 rule applies.");
        assert_eq!(ids(&all), ["SEC-HR-001"]);
    }

    #[test]
    fn generic_hard_rule_survives_next_to_domain_form() {
        let all = extract_all("SEC-HR-001 refines HR-001");
        assert_eq!(ids(&all), ["HR-001", "SEC-HR-001"]);
    }

    #[test_case("DEC-001: pick a store", DefinitionForm::LineStart; "line start")]
    #[test_case("   DEC-001 indented", DefinitionForm::LineStart; "leading whitespace")]
    #[test_case("- DEC-001 bullet", DefinitionForm::Marker; "bullet")]
    #[test_case("### DEC-001 heading", DefinitionForm::Marker; "heading")]
    #[test_case("> DEC-001 quote", DefinitionForm::Marker; "quote")]
    #[test_case("1. DEC-001 numbered", DefinitionForm::Marker; "numbered")]
    #[test_case("-DEC-001 tight bullet", DefinitionForm::Marker; "no space after marker")]
    #[test_case("| DEC-001 | storage |", DefinitionForm::TableCell; "table cell")]
    fn classifies_definitions(line: &str, form: DefinitionForm) {
        let occurrences = scan_line(line, 0);
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].role, Role::Definition(form));
    }

    #[test_case("See DEC-001 for details"; "prose")]
    #[test_case("- see DEC-001"; "after bullet text")]
    #[test_case("### 3.2 DEC-001"; "after heading numbering")]
    #[test_case("| storage | DEC-001 |"; "second table cell")]
    fn classifies_references(line: &str) {
        let occurrences = scan_line(line, 0);
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].role, Role::Reference);
    }

    #[test]
    fn only_the_leading_token_defines() {
        let occurrences = scan_line("SCN-001: normal (covers SEC-HR-001, DEC-002)", 4);
        let roles: Vec<_> = occurrences.iter().map(|o| o.role).collect();
        assert_eq!(
            roles,
            [
                Role::Definition(DefinitionForm::LineStart),
                Role::Reference,
                Role::Reference
            ]
        );
        assert!(occurrences.iter().all(|o| o.line == 4));
    }

    #[test]
    fn spans_are_relative_to_untrimmed_line() {
        let line = "  - SEC-HR-001 x";
        let occurrences = scan_line(line, 0);
        assert_eq!(&line[occurrences[0].span.clone()], "SEC-HR-001");
        assert_eq!(occurrences[0].role, Role::Definition(DefinitionForm::Marker));
    }

    #[test]
    fn requires_three_digits_and_word_boundaries() {
        assert!(extract_all("SCN-01 and XSCN-001 and SCN-001x").is_empty());
        assert_eq!(ids(&extract_all("SCN-0001")), ["SCN-0001"]);
    }

    #[test]
    fn splits_defined_from_all() {
        let text = "DEC-001: choose\nSee DEC-999 and DEC-001\n- SEC-HR-002 rule";
        let (defined, all) = extract_definitions(text);
        assert_eq!(ids(&defined), ["DEC-001", "SEC-HR-002"]);
        assert_eq!(ids(&all), ["DEC-001", "DEC-999", "SEC-HR-002"]);
    }

    #[test]
    fn indexes_occurrences_by_line() {
        let graph = IdentifierGraph::build("intro\nHR-001 rule\nsee HR-001\n\n- SCN-001 case");
        assert!(graph.on_line(0).is_empty());
        assert_eq!(graph.on_line(2).len(), 1);
        assert_eq!(
            graph.leading_definition(1).map(|o| o.id.to_string()),
            Some("HR-001".to_string())
        );
        assert!(graph.leading_definition(2).is_none());
        assert_eq!(graph.definitions().count(), 2);
        let hard_rules: Vec<_> = graph.defined_of(Kind::HardRule).map(ToString::to_string).collect();
        assert_eq!(hard_rules, ["HR-001"]);
    }
}
