//! Structural gate validation for RFC documents
//!
//! Documents are loosely structured markdown organised around typed
//! identifiers: hard rules (`SEC-HR-001`), decisions (`DEC-001`),
//! requirements, scenarios (`SCN-001`), changes and evidence citations. The
//! gate runs seventeen structural checks over one document and aggregates
//! them into a `PASS`, `WARN` or `FAIL` verdict.

pub mod domain;
pub use domain::{CheckResult, Config, Document, EvidenceStore, Identifier, Kind, Report, Strictness, Verdict};

/// The check registry and engine.
pub mod check;
pub use check::{Context, validate};

/// Filesystem access for documents, evidence stores and workspaces.
pub mod storage;
pub use storage::{InitError, LoadError, Workspace};
