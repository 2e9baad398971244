//! The per-document working directory.
//!
//! `init` lays out `.ohrfc/<rfc_id>/` under a root directory:
//!
//! ```text
//! .ohrfc/<rfc_id>/
//! ├── .debug/
//! ├── .reviews/
//! ├── rfc.md          front-matter + template skeleton
//! ├── evidence.json   empty evidence store
//! └── state.json      run-state record
//! ```

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::{EvidenceStore, FrontMatter, Strictness};

/// Template identifier written into new documents.
pub const TEMPLATE_ID: &str = "rfc_template_os_service";

/// Template version written into new documents.
pub const TEMPLATE_VERSION: &str = "2026-02-09";

const WORKSPACE_DIR: &str = ".ohrfc";
const SKELETON_MARKER: &str = "# RFC-YYYYMMDD";
const TITLE_PLACEHOLDER: &str = "# RFC-YYYYMMDD：<标题>";

static DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{8}").expect("date pattern"));

/// Errors that can occur when scaffolding a workspace.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// The workspace directory is already there.
    #[error("Workspace already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// The template has no `# RFC-YYYYMMDD` heading to start the skeleton at.
    #[error("Cannot find '# RFC-YYYYMMDD' in the template")]
    MissingSkeleton,

    /// A file or directory could not be written.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A JSON record could not be serialized.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The front-matter could not be serialized.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// The run-state record of a document workspace.
///
/// Only `init` writes it; later phases of the authoring workflow update it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Record format version.
    pub schema_version: String,
    /// The document identifier, e.g. `rfc-20260211-auth-model`.
    pub rfc_id: String,
    /// The workflow phase the document is in.
    pub current_phase: String,
    /// Declared strictness.
    pub strictness: Strictness,
    /// Identifier of the template the document was created from.
    pub template_id: String,
    /// Version of that template.
    pub template_version: String,
    /// Creation time.
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last update time.
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    /// Latest structural gate verdict.
    pub gate_a_result: Option<String>,
    /// Review rounds used so far.
    pub gate_b_round: u32,
    /// Review round budget.
    pub gate_b_max_rounds: u32,
    /// Latest review verdict.
    pub gate_b_result: Option<String>,
    /// Number of reviewers.
    pub reviewer_count: u32,
    /// Reasons recorded for raising the review level.
    pub upgrade_triggers: Vec<String>,
    /// Whether the baseline has been accepted.
    pub baseline_accepted: bool,
    /// Checkpoint counter.
    pub checkpoint_version: u32,
    /// Phase of the last checkpoint.
    pub last_checkpoint_phase: Option<String>,
    /// Progress within the current phase.
    pub sub_step_progress: Option<serde_json::Value>,
    /// Number of detours taken.
    pub detour_count: u32,
    /// Number of rejections received.
    pub rejection_count: u32,
    /// Review mode.
    pub gate_b_mode: Option<String>,
    /// Reviewer assignments.
    pub reviewer_dispatch: BTreeMap<String, serde_json::Value>,
    /// Whether web search is enabled for the authoring agents.
    pub web_search_enabled: bool,
}

impl RunState {
    /// The initial record of a freshly created workspace.
    #[must_use]
    pub fn new(rfc_id: impl Into<String>, strictness: Strictness, now: DateTime<Utc>) -> Self {
        let (gate_b_max_rounds, reviewer_count) = match strictness {
            Strictness::Light => (0, 0),
            Strictness::Standard => (2, 3),
            Strictness::Full => (3, 4),
        };
        Self {
            schema_version: "v2".to_string(),
            rfc_id: rfc_id.into(),
            current_phase: "discover".to_string(),
            strictness,
            template_id: TEMPLATE_ID.to_string(),
            template_version: TEMPLATE_VERSION.to_string(),
            created_at: now,
            updated_at: now,
            gate_a_result: None,
            gate_b_round: 0,
            gate_b_max_rounds,
            gate_b_result: None,
            reviewer_count,
            upgrade_triggers: Vec::new(),
            baseline_accepted: false,
            checkpoint_version: 0,
            last_checkpoint_phase: None,
            sub_step_progress: None,
            detour_count: 0,
            rejection_count: 0,
            gate_b_mode: None,
            reviewer_dispatch: BTreeMap::new(),
            web_search_enabled: false,
        }
    }
}

mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

/// A document workspace on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    /// The workspace directory of `rfc_id` under `root`.
    #[must_use]
    pub fn at(root: &Path, rfc_id: &str) -> Self {
        Self {
            path: root.join(WORKSPACE_DIR).join(rfc_id),
        }
    }

    /// The workspace directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The document.
    #[must_use]
    pub fn document(&self) -> PathBuf {
        self.path.join("rfc.md")
    }

    /// The evidence store.
    #[must_use]
    pub fn evidence(&self) -> PathBuf {
        self.path.join("evidence.json")
    }

    /// The run-state record.
    #[must_use]
    pub fn state(&self) -> PathBuf {
        self.path.join("state.json")
    }

    /// Creates the workspace of the document `state` describes.
    ///
    /// The document starts at the template's `# RFC-YYYYMMDD` heading, with
    /// the title line filled in from the first eight-digit run in the rfc id
    /// (or the creation date) and `title`.
    ///
    /// # Errors
    ///
    /// Fails if the workspace already exists, if the template has no
    /// skeleton heading, or if any file cannot be written.
    #[instrument(level = "debug", skip(state, template), fields(rfc_id = %state.rfc_id))]
    pub fn create(
        root: &Path,
        state: &RunState,
        title: &str,
        template: &str,
    ) -> Result<Self, InitError> {
        let workspace = Self::at(root, &state.rfc_id);
        if workspace.path.exists() {
            return Err(InitError::AlreadyExists(workspace.path));
        }

        let date = DATE.find(&state.rfc_id).map_or_else(
            || state.created_at.format("%Y%m%d").to_string(),
            |m| m.as_str().to_string(),
        );
        let document = render_document(template, title, state.strictness, &date)?;
        let evidence = EvidenceStore {
            schema_version: Some("v1".to_string()),
            items: Vec::new(),
        };

        fs::create_dir_all(workspace.path.join(".debug"))?;
        fs::create_dir_all(workspace.path.join(".reviews"))?;
        fs::write(workspace.document(), document)?;
        fs::write(workspace.evidence(), to_json(&evidence)?)?;
        fs::write(workspace.state(), to_json(state)?)?;

        tracing::info!("Created workspace {}", workspace.path.display());
        Ok(workspace)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string_pretty(value)? + "\n")
}

fn skeleton(template: &str) -> Option<&str> {
    let mut offset = 0;
    for line in template.split_inclusive('\n') {
        if line.starts_with(SKELETON_MARKER) {
            return Some(&template[offset..]);
        }
        offset += line.len();
    }
    None
}

fn render_document(
    template: &str,
    title: &str,
    strictness: Strictness,
    date: &str,
) -> Result<String, InitError> {
    let skeleton = skeleton(template).ok_or(InitError::MissingSkeleton)?;
    let front_matter = FrontMatter {
        template_id: Some(TEMPLATE_ID.to_string()),
        template_version: Some(TEMPLATE_VERSION.to_string()),
        strictness: Some(strictness.name().to_string()),
    };
    let body = skeleton.replacen(TITLE_PLACEHOLDER, &format!("# RFC-{date}：{title}"), 1);
    Ok(format!("{}\n{body}", front_matter.render()?))
}
