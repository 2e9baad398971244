use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

/// The resolved rule parameters for one validation run.
///
/// Every value is owned: [`Config::default`] builds fresh collections on
/// each call and [`Config::resolve`] starts from such a fresh copy, so two
/// resolved configurations never share state with each other or with the
/// built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Scenario categories that must all be covered.
    pub min_scn_categories: Vec<String>,

    /// Categories that count as rejection paths. At least one must be
    /// covered.
    pub reject_categories: Vec<String>,

    /// Allowed language tags on fenced blocks. The empty string allows
    /// untagged blocks.
    pub allowed_lang_tags: Vec<String>,

    /// Meta fields that must appear as `field:` lines.
    pub meta_fields: Vec<String>,

    /// Heading keywords that mark the review layer of the document.
    pub review_keywords: Vec<String>,

    /// Heading keywords that mark the normative layer of the document.
    pub normative_keywords: Vec<String>,

    /// Lowercase heading keyword to scenario category.
    pub heading_category_map: BTreeMap<String, String>,

    /// Placeholder regular expressions.
    ///
    /// A match that starts or ends with an ASCII letter is only reported
    /// when the neighbouring character is not an ASCII letter.
    pub placeholder_patterns: Vec<String>,

    /// Enable flags for the configurable hard checks, keyed like
    /// `check_10_hr_scn_binding`.
    pub hard_checks: BTreeMap<String, Toggle>,

    /// Enable flags for the soft checks, keyed like
    /// `check_15_diagram_text_pairing`.
    pub soft_checks: BTreeMap<String, Toggle>,
}

/// An enable flag for a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggle {
    /// Whether the check runs.
    #[serde(default = "enabled")]
    pub enabled: bool,
}

impl Default for Toggle {
    fn default() -> Self {
        Self { enabled: true }
    }
}

const fn enabled() -> bool {
    true
}

const HARD_TOGGLES: [&str; 5] = [
    "check_10_hr_scn_binding",
    "check_11_dec_alternatives",
    "check_12_must_pass_validity",
    "check_13_coverage_matrix",
    "check_14_section_non_empty",
];

const SOFT_TOGGLES: [&str; 3] = [
    "check_15_diagram_text_pairing",
    "check_16_unresolved_format",
    "check_17_orphan_scn",
];

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn toggles(keys: &[&str]) -> BTreeMap<String, Toggle> {
    keys.iter()
        .map(|key| ((*key).to_string(), Toggle::default()))
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        let heading_category_map = [
            ("normal", "normal"),
            ("正常", "normal"),
            ("authn", "reject_authn"),
            ("authz", "reject_authz"),
            ("权限", "reject_authz"),
            ("越权", "reject_authz"),
            ("reject", "reject_authz"),
            ("limits", "limits_quota"),
            ("quota", "limits_quota"),
            ("非法值", "limits_quota"),
            ("边界", "limits_quota"),
            ("dependency", "dependency_down"),
            ("依赖", "dependency_down"),
            ("故障", "dependency_down"),
            ("recovery", "dependency_down"),
            ("abuse", "abuse"),
            ("滥用", "abuse"),
            ("鲁棒", "abuse"),
        ]
        .into_iter()
        .map(|(keyword, category)| (keyword.to_string(), category.to_string()))
        .collect();

        Self {
            min_scn_categories: strings(&[
                "normal",
                "reject_authn",
                "reject_authz",
                "limits_quota",
                "dependency_down",
                "abuse",
            ]),
            reject_categories: strings(&["reject_authn", "reject_authz"]),
            allowed_lang_tags: strings(&["", "text", "contract", "json", "mermaid", "bash"]),
            meta_fields: strings(&["template_id", "template_version", "strictness"]),
            review_keywords: strings(&["背景", "痛点", "目标", "结论", "方案", "影响"]),
            normative_keywords: strings(&["安全", "可靠", "验收", "决策", "可观测"]),
            heading_category_map,
            placeholder_patterns: strings(&["TBD", "XXX", "TODO", "FIXME", r"<\.\.\.>"]),
            hard_checks: toggles(&HARD_TOGGLES),
            soft_checks: toggles(&SOFT_TOGGLES),
        }
    }
}

/// A partial configuration read from an override file.
///
/// Each key that is present replaces the default wholesale. Unknown keys are
/// ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Overrides {
    min_scn_categories: Option<Vec<String>>,
    reject_categories: Option<Vec<String>>,
    allowed_lang_tags: Option<Vec<String>>,
    meta_fields: Option<Vec<String>>,
    review_keywords: Option<Vec<String>>,
    normative_keywords: Option<Vec<String>>,
    heading_category_map: Option<BTreeMap<String, String>>,
    placeholder_patterns: Option<Vec<String>>,
    hard_checks: Option<BTreeMap<String, Toggle>>,
    soft_checks: Option<BTreeMap<String, Toggle>>,
}

/// Which flag table a check key lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleTable {
    /// `hard_checks`
    Hard,
    /// `soft_checks`
    Soft,
}

impl Config {
    /// Resolves the effective configuration from the defaults and an
    /// optional override file.
    ///
    /// The override is parsed as TOML when the path has a `.toml`
    /// extension and as JSON otherwise. A missing, unreadable or malformed
    /// override is logged and ignored: the result is then identical to
    /// `Config::default()`.
    #[must_use]
    pub fn resolve(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Failed to load config: {e}");
                Self::default()
            }
        }
    }

    /// Loads the defaults merged with the override file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let overrides: Overrides = if is_toml {
            toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| format!("Failed to parse config file: {e}"))?
        };
        Ok(Self::default().merged(overrides))
    }

    fn merged(mut self, overrides: Overrides) -> Self {
        fn replace<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        replace(&mut self.min_scn_categories, overrides.min_scn_categories);
        replace(&mut self.reject_categories, overrides.reject_categories);
        replace(&mut self.allowed_lang_tags, overrides.allowed_lang_tags);
        replace(&mut self.meta_fields, overrides.meta_fields);
        replace(&mut self.review_keywords, overrides.review_keywords);
        replace(&mut self.normative_keywords, overrides.normative_keywords);
        replace(&mut self.heading_category_map, overrides.heading_category_map);
        replace(&mut self.placeholder_patterns, overrides.placeholder_patterns);
        replace(&mut self.hard_checks, overrides.hard_checks);
        replace(&mut self.soft_checks, overrides.soft_checks);
        self
    }

    /// Whether the check with the given key is enabled. Absent entries are
    /// enabled.
    #[must_use]
    pub fn is_enabled(&self, key: &str, table: ToggleTable) -> bool {
        let table = match table {
            ToggleTable::Hard => &self.hard_checks,
            ToggleTable::Soft => &self.soft_checks,
        };
        table.get(key).is_none_or(|toggle| toggle.enabled)
    }
}
