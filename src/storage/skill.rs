//! The skill directory that ships the document template and the run-state
//! schema.
//!
//! ```text
//! <skill>/
//! ├── references/rfc_template.md
//! └── assets/schemas/state.schema.json
//! ```

use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::Value;

use super::RunState;

const TEMPLATE: &str = "references/rfc_template.md";
const STATE_SCHEMA: &str = "assets/schemas/state.schema.json";

/// Errors locating a skill directory.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SkillError {
    /// The given directory has no `references/rfc_template.md`.
    #[error("Skill dir not found at {}", .0.display())]
    NotFound(PathBuf),

    /// No candidate directory has a template.
    #[error("Cannot locate skill directory. Use --skill-dir to specify.")]
    Undiscoverable,
}

/// A skill directory holding `references/rfc_template.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillDir {
    root: PathBuf,
}

/// The parts of a JSON schema the run-state check reads.
#[derive(Debug, Deserialize)]
struct StateSchema {
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    properties: BTreeMap<String, PropertySchema>,
}

#[derive(Debug, Deserialize)]
struct PropertySchema {
    #[serde(rename = "const")]
    constant: Option<Value>,
    #[serde(rename = "enum")]
    allowed: Option<Vec<Value>>,
}

impl SkillDir {
    /// The skill directory at `root`.
    ///
    /// # Errors
    ///
    /// Fails if `root` has no `references/rfc_template.md`.
    pub fn at(root: &Path) -> Result<Self, SkillError> {
        if root.join(TEMPLATE).is_file() {
            Ok(Self {
                root: root.to_path_buf(),
            })
        } else {
            Err(SkillError::NotFound(root.to_path_buf()))
        }
    }

    /// Looks for a skill directory next to the installed binary, then in the
    /// working directory.
    ///
    /// # Errors
    ///
    /// Fails if neither place holds a template.
    pub fn discover() -> Result<Self, SkillError> {
        let beside_binary = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent()?.parent().map(Path::to_path_buf));
        Self::first_of(beside_binary.into_iter().chain(env::current_dir().ok()))
    }

    fn first_of(candidates: impl IntoIterator<Item = PathBuf>) -> Result<Self, SkillError> {
        candidates
            .into_iter()
            .find_map(|candidate| Self::at(&candidate).ok())
            .ok_or(SkillError::Undiscoverable)
    }

    /// The directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The document template.
    #[must_use]
    pub fn template(&self) -> PathBuf {
        self.root.join(TEMPLATE)
    }

    /// The run-state JSON schema.
    #[must_use]
    pub fn state_schema(&self) -> PathBuf {
        self.root.join(STATE_SCHEMA)
    }

    /// Compares `state` with the skill's run-state schema.
    ///
    /// Checks required fields and the `const` and `enum` constraints of each
    /// property. A missing schema yields no findings; an unreadable one is
    /// logged and skipped.
    #[must_use]
    pub fn check_state(&self, state: &RunState) -> Vec<String> {
        let path = self.state_schema();
        if !path.exists() {
            return Vec::new();
        }
        let schema = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str::<StateSchema>(&raw).map_err(|e| e.to_string()));
        match schema {
            Ok(schema) => schema.findings(state),
            Err(e) => {
                tracing::warn!("Skipping unreadable state schema {}: {e}", path.display());
                Vec::new()
            }
        }
    }
}

impl StateSchema {
    fn findings(&self, state: &RunState) -> Vec<String> {
        let Ok(Value::Object(fields)) = serde_json::to_value(state) else {
            return Vec::new();
        };

        let mut findings: Vec<String> = self
            .required
            .iter()
            .filter(|field| !fields.contains_key(field.as_str()))
            .map(|field| format!("Missing required field: {field}"))
            .collect();

        for (name, property) in &self.properties {
            let value = fields.get(name).unwrap_or(&Value::Null);
            if let Some(constant) = property.constant.as_ref().filter(|c| *c != value) {
                findings.push(format!(
                    "{name} must be '{}', got '{}'",
                    show(constant),
                    show(value)
                ));
            }
            if let Some(allowed) = property.allowed.as_ref().filter(|a| !a.contains(value)) {
                let allowed: Vec<_> = allowed.iter().map(show).collect();
                findings.push(format!(
                    "{name} '{}' not in [{}]",
                    show(value),
                    allowed.join(", ")
                ));
            }
        }
        findings
    }
}

fn show(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::domain::Strictness;

    fn skill(schema: Option<&str>) -> (TempDir, SkillDir) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("references")).unwrap();
        fs::write(dir.path().join(TEMPLATE), "# RFC-YYYYMMDD：<标题>\n").unwrap();
        if let Some(schema) = schema {
            fs::create_dir_all(dir.path().join("assets/schemas")).unwrap();
            fs::write(dir.path().join(STATE_SCHEMA), schema).unwrap();
        }
        let skill = SkillDir::at(dir.path()).unwrap();
        (dir, skill)
    }

    fn state() -> RunState {
        let now = Utc.with_ymd_and_hms(2026, 2, 11, 8, 30, 0).unwrap();
        RunState::new("rfc-demo", Strictness::Standard, now)
    }

    #[test]
    fn requires_a_template() {
        let empty = TempDir::new().unwrap();
        assert_eq!(
            SkillDir::at(empty.path()),
            Err(SkillError::NotFound(empty.path().to_path_buf()))
        );

        let (dir, skill) = skill(None);
        assert_eq!(skill.template(), dir.path().join("references/rfc_template.md"));
    }

    #[test]
    fn discovery_takes_the_first_candidate_with_a_template() {
        let empty = TempDir::new().unwrap();
        let (dir, _) = skill(None);

        let found =
            SkillDir::first_of([empty.path().to_path_buf(), dir.path().to_path_buf()]).unwrap();
        assert_eq!(found.root(), dir.path());
        assert_eq!(
            SkillDir::first_of([empty.path().to_path_buf()]),
            Err(SkillError::Undiscoverable)
        );
    }

    #[test]
    fn initial_state_satisfies_a_matching_schema() {
        let (_dir, skill) = skill(Some(
            r#"{
                "required": ["schema_version", "rfc_id", "current_phase"],
                "properties": {
                    "schema_version": {"const": "v2"},
                    "strictness": {"enum": ["light", "standard", "full"]},
                    "current_phase": {"enum": ["init", "discover", "draft"]}
                }
            }"#,
        ));
        assert!(skill.check_state(&state()).is_empty());
    }

    #[test]
    fn reports_schema_mismatches() {
        let (_dir, skill) = skill(Some(
            r#"{
                "required": ["schema_version", "owner"],
                "properties": {
                    "schema_version": {"const": "v3"},
                    "strictness": {"enum": ["light", "full"]},
                    "current_phase": {"enum": ["discover"]}
                }
            }"#,
        ));
        assert_eq!(
            skill.check_state(&state()),
            [
                "Missing required field: owner",
                "schema_version must be 'v3', got 'v2'",
                "strictness 'standard' not in [light, full]",
            ]
        );
    }

    #[test]
    fn missing_or_broken_schemas_are_skipped() {
        let (_plain_dir, plain) = skill(None);
        assert!(plain.check_state(&state()).is_empty());

        let (_broken_dir, broken) = skill(Some("{ not json"));
        assert!(broken.check_state(&state()).is_empty());
    }
}
