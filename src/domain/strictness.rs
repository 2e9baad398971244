use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)strictness[）)：:\s]*(light|standard|full|L[123])").expect("strictness field")
});

static LOOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:strictness|严格度)[^\n]{0,20}(light|standard|full|L[123])")
        .expect("strictness mention")
});

/// The three ordered rigor levels of a document.
///
/// Two naming schemes map onto the same levels: `light`/`standard`/`full`
/// and `L1`/`L2`/`L3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// `light` / `L1`
    Light,
    /// `standard` / `L2`
    Standard,
    /// `full` / `L3`
    Full,
}

impl Strictness {
    /// Detects the declared level in document text.
    ///
    /// A `strictness:` field is preferred; otherwise a level word within 20
    /// characters after `strictness` or `严格度` on the same line is
    /// accepted, the furthest one in reach winning.
    #[must_use]
    pub fn detect(text: &str) -> Option<Self> {
        FIELD
            .captures(text)
            .or_else(|| LOOSE.captures(text))
            .and_then(|caps| caps.get(1))
            .and_then(|level| level.as_str().parse().ok())
    }

    /// Whether the text mentions strictness at all.
    #[must_use]
    pub fn mentioned(text: &str) -> bool {
        text.to_lowercase().contains("strictness")
    }

    /// The `L1`/`L2`/`L3` spelling.
    #[must_use]
    pub const fn canonical(self) -> &'static str {
        match self {
            Self::Light => "L1",
            Self::Standard => "L2",
            Self::Full => "L3",
        }
    }

    /// The `light`/`standard`/`full` spelling.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Standard => "standard",
            Self::Full => "full",
        }
    }

    /// Whether a risk to scenario coverage matrix is mandatory.
    #[must_use]
    pub const fn requires_coverage_matrix(self) -> bool {
        !matches!(self, Self::Light)
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unrecognised strictness spelling.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid strictness '{0}': expected light, standard, full, L1, L2 or L3")]
pub struct ParseStrictnessError(String);

impl FromStr for Strictness {
    type Err = ParseStrictnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" | "l1" => Ok(Self::Light),
            "standard" | "l2" => Ok(Self::Standard),
            "full" | "l3" => Ok(Self::Full),
            _ => Err(ParseStrictnessError(s.to_string())),
        }
    }
}
