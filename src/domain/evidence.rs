use serde::{Deserialize, Serialize};

/// The evidence store: external citations backing hard assertions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceStore {
    /// Store format version, e.g. `v1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,

    /// The evidence items.
    #[serde(default)]
    pub items: Vec<EvidenceItem>,
}

/// One evidence record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// The `EVD-NNN` identifier. Older stores spell the key `evd_id`.
    #[serde(default, alias = "evd_id")]
    pub evidence_id: String,

    /// Whether the evidence is incomplete.
    #[serde(default)]
    pub truncated: bool,

    /// Identifiers this evidence supports.
    #[serde(default, deserialize_with = "one_or_many")]
    pub links_to: Vec<String>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(link) => vec![link],
        OneOrMany::Many(links) => links,
        OneOrMany::Null(()) => Vec::new(),
    })
}

impl EvidenceStore {
    /// Whether the store has no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an item with this evidence identifier exists.
    #[must_use]
    pub fn contains(&self, evidence_id: &str) -> bool {
        self.items.iter().any(|item| item.evidence_id == evidence_id)
    }

    /// Whether any item links to exactly `id`.
    #[must_use]
    pub fn links(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.links_to(id))
    }
}

impl EvidenceItem {
    /// Whether this item links to exactly `id`.
    #[must_use]
    pub fn links_to(&self, id: &str) -> bool {
        self.links_to.iter().any(|link| link.trim() == id)
    }

    /// Whether this item links to a hard rule or a requirement.
    #[must_use]
    pub fn supports_hard_assertion(&self) -> bool {
        self.links_to
            .iter()
            .any(|link| link.contains("HR-") || link.contains("REQ-"))
    }
}
