// file: src/exporter/writer.rs
// description: persists an assembled document as markdown or json
// reference: https://docs.rs/serde_json

use crate::document::{to_markdown, verify_section_order};
use crate::error::{PipelineError, Result};
use crate::models::AssembledDocument;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Json,
}

impl OutputFormat {
    /// Chosen from the destination's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => Err(PipelineError::Validation(format!(
                "unsupported output format '{}' for {}",
                other,
                path.display()
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentWriter {
    output: PathBuf,
    format: OutputFormat,
}

impl DocumentWriter {
    pub fn new(output: impl Into<PathBuf>) -> Result<Self> {
        let output = output.into();
        let format = OutputFormat::from_path(&output)?;
        Ok(Self { output, format })
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn render(&self, document: &AssembledDocument) -> Result<String> {
        match self.format {
            OutputFormat::Markdown => {
                let markdown = to_markdown(document);
                verify_section_order(document, &markdown)?;
                Ok(markdown)
            }
            OutputFormat::Json => {
                serde_json::to_string_pretty(document).map_err(PipelineError::serialization)
            }
        }
    }

    /// Writes the document verbatim, creating missing parent directories.
    pub fn write(&self, document: &AssembledDocument) -> Result<PathBuf> {
        let contents = self.render(document)?;

        if let Some(parent) = self.output.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| PipelineError::FileOperation {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(&self.output, contents).map_err(|e| PipelineError::FileOperation {
            path: self.output.clone(),
            source: e,
        })?;

        info!("Wrote {}", self.output.display());
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentBuilder, DocumentSection, Fragment, SectionKey};
    use tempfile::tempdir;

    fn document() -> AssembledDocument {
        let mut builder = DocumentBuilder::new();
        builder
            .push(DocumentSection::new(SectionKey::Header).with(Fragment::Title("demo".into())))
            .unwrap();
        builder
            .push(
                DocumentSection::new(SectionKey::Overview)
                    .with(Fragment::Paragraph("Does things.".into())),
            )
            .unwrap();
        builder.finish()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            OutputFormat::from_path(Path::new("README.md")).unwrap(),
            OutputFormat::Markdown
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("out/readme.JSON")).unwrap(),
            OutputFormat::Json
        );
        assert!(OutputFormat::from_path(Path::new("README.txt")).is_err());
        assert!(OutputFormat::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn test_writes_markdown() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docs/README.md");
        DocumentWriter::new(&path).unwrap().write(&document()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "# demo\n\n## Overview\n\nDoes things.\n");
    }

    #[test]
    fn test_writes_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("README.json");
        DocumentWriter::new(&path).unwrap().write(&document()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["sections"][1]["key"], "overview");
        let restored: AssembledDocument = serde_json::from_value(value).unwrap();
        assert_eq!(restored, document());
    }

    #[test]
    fn test_write_failure_carries_path() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let path = blocker.join("README.md");

        let err = DocumentWriter::new(&path).unwrap().write(&document()).unwrap_err();
        assert!(matches!(err, PipelineError::FileOperation { .. }));
    }
}
