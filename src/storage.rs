//! Filesystem access.
//!
//! Reading a document together with the evidence store and template that
//! accompany it, and scaffolding the workspace of a new document.

mod load;
pub use load::{LoadError, load_document, load_evidence, load_template};

/// Template and run-state schema lookup.
pub mod skill;
pub use skill::{SkillDir, SkillError};

/// Workspace scaffolding for new documents.
pub mod workspace;
pub use workspace::{InitError, RunState, Workspace};
