use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Serialize, Serializer};

/// The entity kind carried by an identifier token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// `HR` - a normative hard rule. The only kind that may carry a domain
    /// prefix.
    HardRule,
    /// `DEC` - a recorded design decision.
    Decision,
    /// `REQ` - a requirement.
    Requirement,
    /// `SCN` - an acceptance scenario.
    Scenario,
    /// `CHG` - a change entry.
    Change,
    /// `EVD` - an evidence citation, tracked in the evidence store.
    Evidence,
}

impl Kind {
    /// Every kind, in canonical order.
    pub const ALL: [Self; 6] = [
        Self::HardRule,
        Self::Decision,
        Self::Requirement,
        Self::Scenario,
        Self::Change,
        Self::Evidence,
    ];

    /// The token prefix used in documents, e.g. `SCN`.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::HardRule => "HR",
            Self::Decision => "DEC",
            Self::Requirement => "REQ",
            Self::Scenario => "SCN",
            Self::Change => "CHG",
            Self::Evidence => "EVD",
        }
    }

    /// Looks up a kind by its token prefix. Matching is exact (uppercase).
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.prefix() == prefix)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A typed identifier token recovered from document text.
///
/// Format:
/// - `{KIND}-{NNN}` for the generic form, e.g. `DEC-001`, `SCN-010`
/// - `{DOMAIN}-HR-{NNN}` for domain-prefixed hard rules, e.g. `SEC-HR-001`
///
/// The number has at least three digits and is kept verbatim, so `SCN-001`
/// and `SCN-0001` are different identifiers. Identifiers order by their
/// canonical string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    domain: Option<String>,
    kind: Kind,
    number: String,
}

impl Identifier {
    /// Minimum number of digits in the numeric segment.
    pub const MIN_DIGITS: usize = 3;

    /// Creates a generic identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Number`] if `number` is not at least
    /// [`Self::MIN_DIGITS`] ASCII digits.
    pub fn new(kind: Kind, number: impl Into<String>) -> Result<Self, Error> {
        let number = number.into();
        validate_number(kind.prefix(), &number)?;
        Ok(Self {
            domain: None,
            kind,
            number,
        })
    }

    /// Creates a domain-prefixed hard rule identifier, e.g. `SEC-HR-001`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Domain`] if the domain is empty or not uppercase
    /// ASCII, and [`Error::Number`] if the number is malformed.
    pub fn hard_rule_in(domain: impl Into<String>, number: impl Into<String>) -> Result<Self, Error> {
        let domain = domain.into();
        if domain.is_empty() || !domain.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::Domain(domain));
        }
        let number = number.into();
        validate_number(&domain, &number)?;
        Ok(Self {
            domain: Some(domain),
            kind: Kind::HardRule,
            number,
        })
    }

    /// Returns the kind segment.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the domain tag of a domain-prefixed hard rule.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Returns the numeric segment exactly as written.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Whether this is a hard rule, generic or domain-prefixed.
    #[must_use]
    pub const fn is_hard_rule(&self) -> bool {
        matches!(self.kind, Kind::HardRule)
    }
}

fn validate_number(context: &str, number: &str) -> Result<(), Error> {
    if number.len() < Identifier::MIN_DIGITS || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Number(context.to_string(), number.to_string()));
    }
    Ok(())
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.domain {
            Some(domain) => write!(f, "{domain}-{}-{}", self.kind, self.number),
            None => write!(f, "{}-{}", self.kind, self.number),
        }
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Errors that can occur while parsing a canonical identifier string.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The string does not have the `KIND-NNN` or `DOMAIN-HR-NNN` shape.
    #[error("Invalid identifier format: {0}")]
    Syntax(String),

    /// The kind segment is not one of the known kinds.
    #[error("Unknown identifier kind '{0}': expected one of HR, DEC, REQ, SCN, CHG, EVD")]
    Kind(String),

    /// The numeric segment has fewer than three digits or is not numeric.
    #[error("Invalid number in identifier '{0}': expected at least 3 digits, got '{1}'")]
    Number(String, String),

    /// The domain tag is malformed or attached to a kind other than `HR`.
    #[error("Invalid domain prefix '{0}': only uppercase tags on HR identifiers are allowed")]
    Domain(String),
}

impl FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err(Error::Syntax(s.to_string()));
        }

        let parts: Vec<&str> = s.split('-').collect();
        match parts.as_slice() {
            [kind, number] => {
                let kind = Kind::from_prefix(kind).ok_or_else(|| Error::Kind((*kind).to_string()))?;
                Self::new(kind, *number)
            }
            [domain, kind, number] => {
                if Kind::from_prefix(kind) != Some(Kind::HardRule) {
                    return Err(Error::Domain(format!("{domain}-{kind}")));
                }
                Self::hard_rule_in(*domain, *number)
            }
            _ => Err(Error::Syntax(s.to_string())),
        }
    }
}

impl TryFrom<&str> for Identifier {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}
