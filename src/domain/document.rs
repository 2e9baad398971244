use serde::{Deserialize, Serialize};

use crate::domain::Strictness;

/// The YAML front-matter block at the top of a document.
///
/// All fields are optional: checks operate on raw text and only the report
/// header and the scaffolding command read these values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Identifier of the template the document was created from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,

    /// Version of that template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_version: Option<String>,

    /// Declared strictness, in either naming scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strictness: Option<String>,
}

/// A document under validation: its full text and the parsed front-matter,
/// if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    front_matter: Option<FrontMatter>,
}

impl Document {
    /// Wraps document text, parsing a leading `---` front-matter block.
    ///
    /// A front-matter block that is not valid YAML is logged and ignored.
    /// The text is kept verbatim either way.
    #[must_use]
    pub fn new(text: String) -> Self {
        let front_matter = split_front_matter(&text).and_then(|yaml| {
            serde_yaml::from_str::<FrontMatter>(yaml)
                .inspect_err(|e| tracing::debug!("Ignoring unparsable front-matter: {e}"))
                .ok()
        });
        Self { text, front_matter }
    }

    /// The full document text, front-matter included.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The parsed front-matter.
    #[must_use]
    pub const fn front_matter(&self) -> Option<&FrontMatter> {
        self.front_matter.as_ref()
    }

    /// The declared strictness: the front-matter value if it parses,
    /// otherwise whatever the text declares.
    #[must_use]
    pub fn strictness(&self) -> Option<Strictness> {
        self.front_matter
            .as_ref()
            .and_then(|fm| fm.strictness.as_deref())
            .and_then(|value| value.parse().ok())
            .or_else(|| Strictness::detect(&self.text))
    }
}

/// Returns the YAML between a leading `---` line and the next `---` line.
fn split_front_matter(text: &str) -> Option<&str> {
    let mut lines = text.split_inclusive('\n');
    if lines.next()?.trim() != "---" {
        return None;
    }
    let start = text.find('\n')? + 1;
    let mut end = start;
    for line in lines {
        if line.trim() == "---" {
            return Some(&text[start..end]);
        }
        end += line.len();
    }
    None
}

impl FrontMatter {
    /// Renders the block, delimiters included.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn render(&self) -> Result<String, serde_yaml::Error> {
        Ok(format!("---\n{}---\n", serde_yaml::to_string(self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_front_matter() {
        let doc = Document::new(
            "---\ntemplate_id: rfc_template_os_service\ntemplate_version: 2026-02-09\nstrictness: L3\n---\n\n# RFC\n"
                .to_string(),
        );
        let fm = doc.front_matter().unwrap();
        assert_eq!(fm.template_id.as_deref(), Some("rfc_template_os_service"));
        assert_eq!(fm.template_version.as_deref(), Some("2026-02-09"));
        assert_eq!(doc.strictness(), Some(Strictness::Full));
    }

    #[test]
    fn falls_back_to_text_detection() {
        let doc = Document::new("# RFC\n\n严格度：standard\n".to_string());
        assert!(doc.front_matter().is_none());
        assert_eq!(doc.strictness(), Some(Strictness::Standard));
    }

    #[test]
    fn ignores_unterminated_or_malformed_blocks() {
        assert!(Document::new("---\ntemplate_id: x\n".to_string()).front_matter().is_none());
        assert!(
            Document::new("---\n: [unbalanced\n---\n".to_string())
                .front_matter()
                .is_none()
        );
    }

    #[test]
    fn renders_round_trippable_block() {
        let fm = FrontMatter {
            template_id: Some("rfc_template_os_service".to_string()),
            template_version: Some("2026-02-09".to_string()),
            strictness: Some("full".to_string()),
        };
        let rendered = fm.render().unwrap();
        assert!(rendered.starts_with("---\ntemplate_id: rfc_template_os_service\n"));
        assert!(rendered.ends_with("strictness: full\n---\n"));
        assert_eq!(Document::new(rendered).front_matter(), Some(&fm));
    }
}
