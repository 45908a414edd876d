// file: src/models/document.rs
// description: section-ordered document model handed to the output writer
// reference: internal data structures

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Section identifiers. Declaration order is document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Header,
    TableOfContents,
    Overview,
    Modules,
    Tree,
    GettingStarted,
    Contributing,
    License,
}

impl SectionKey {
    pub const ALL: [SectionKey; 8] = [
        SectionKey::Header,
        SectionKey::TableOfContents,
        SectionKey::Overview,
        SectionKey::Modules,
        SectionKey::Tree,
        SectionKey::GettingStarted,
        SectionKey::Contributing,
        SectionKey::License,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Header => "header",
            SectionKey::TableOfContents => "toc",
            SectionKey::Overview => "overview",
            SectionKey::Modules => "modules",
            SectionKey::Tree => "tree",
            SectionKey::GettingStarted => "setup",
            SectionKey::Contributing => "contributing",
            SectionKey::License => "license",
        }
    }

    /// Heading shown in the rendered document; the header carries the project title instead.
    pub fn heading(&self) -> Option<&'static str> {
        match self {
            SectionKey::Header => None,
            SectionKey::TableOfContents => Some("Table of Contents"),
            SectionKey::Overview => Some("Overview"),
            SectionKey::Modules => Some("Modules"),
            SectionKey::Tree => Some("Repository Structure"),
            SectionKey::GettingStarted => Some("Getting Started"),
            SectionKey::Contributing => Some("Contributing"),
            SectionKey::License => Some("License"),
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub label: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Fragment {
    Title(String),
    Subheading(String),
    Paragraph(String),
    List(Vec<String>),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Badges(Vec<Badge>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub key: SectionKey,
    pub fragments: Vec<Fragment>,
}

impl DocumentSection {
    pub fn new(key: SectionKey) -> Self {
        Self {
            key,
            fragments: Vec::new(),
        }
    }

    pub fn with(mut self, fragment: Fragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }
}

/// Final artifact. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledDocument {
    sections: Vec<DocumentSection>,
}

impl AssembledDocument {
    pub fn sections(&self) -> &[DocumentSection] {
        &self.sections
    }

    pub fn section(&self, key: SectionKey) -> Option<&DocumentSection> {
        self.sections.iter().find(|s| s.key == key)
    }

    pub fn keys(&self) -> Vec<SectionKey> {
        self.sections.iter().map(|s| s.key).collect()
    }
}

/// Appends sections in fixed order; a completed section is never revisited.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    sections: Vec<DocumentSection>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: DocumentSection) -> Result<()> {
        if let Some(last) = self.sections.last()
            && last.key >= section.key
        {
            return Err(PipelineError::SectionOrder {
                previous: last.key.to_string(),
                section: section.key.to_string(),
            });
        }
        self.sections.push(section);
        Ok(())
    }

    pub fn finish(self) -> AssembledDocument {
        AssembledDocument {
            sections: self.sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_fixed_order() {
        let mut builder = DocumentBuilder::new();
        builder.push(DocumentSection::new(SectionKey::Header)).unwrap();
        builder.push(DocumentSection::new(SectionKey::Overview)).unwrap();
        let err = builder
            .push(DocumentSection::new(SectionKey::TableOfContents))
            .unwrap_err();
        assert!(matches!(err, PipelineError::SectionOrder { .. }));

        let doc = builder.finish();
        assert_eq!(doc.keys(), vec![SectionKey::Header, SectionKey::Overview]);
    }

    #[test]
    fn test_builder_rejects_duplicate_section() {
        let mut builder = DocumentBuilder::new();
        builder.push(DocumentSection::new(SectionKey::Tree)).unwrap();
        assert!(builder.push(DocumentSection::new(SectionKey::Tree)).is_err());
    }

    #[test]
    fn test_fragment_serialization() {
        let json = serde_json::to_string(&Fragment::Paragraph("Hi.".into())).unwrap();
        assert_eq!(json, r#"{"type":"paragraph","value":"Hi."}"#);
    }

    #[test]
    fn test_section_key_order_matches_all() {
        let mut sorted = SectionKey::ALL;
        sorted.sort();
        assert_eq!(sorted, SectionKey::ALL);
    }
}
