//! Domain models for gate validation.
//!
//! This module contains the values a validation run works with: typed
//! identifiers and the graph recovered from document text, heading-scoped
//! sections, the resolved rule configuration, the evidence store and the
//! aggregated report.

/// Typed identifier tokens (`SCN-001`, `SEC-HR-001`, ...).
pub mod identifier;
pub use identifier::{Error as IdentifierError, Identifier, Kind};

/// Identifier occurrences and definition/reference classification.
pub mod graph;
pub use graph::{DefinitionForm, IdentifierGraph, Occurrence, Role};

/// Heading-scoped section slicing.
pub mod section;
pub use section::Section;

/// Line-prefix predicates for loosely structured markdown.
pub mod text;

mod config;
pub use config::{Config, Toggle, ToggleTable};

mod document;
pub use document::{Document, FrontMatter};

mod evidence;
pub use evidence::{EvidenceItem, EvidenceStore};

mod report;
pub use report::{CheckKind, CheckResult, Report, Verdict};

mod strictness;
pub use strictness::{ParseStrictnessError, Strictness};
