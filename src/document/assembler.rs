// file: src/document/assembler.rs
// description: merges classification and summaries into the fixed-order document
// reference: internal data structures

use crate::config::DocumentConfig;
use crate::document::badges::BadgeSelector;
use crate::document::setup::setup_guide;
use crate::document::tree_diagram::render_tree;
use crate::error::Result;
use crate::models::{
    AssembledDocument, DocumentBuilder, DocumentSection, FileNode, Fragment, RepositoryTree,
    SectionKey, SummaryMap,
};
use crate::pipeline::orchestrator::DigestResult;
use crate::repository::Classification;
use crate::utils::{TextTemplate, table_cell};
use lazy_static::lazy_static;
use std::path::Path;
use tracing::debug;

pub const ROOT_GROUP: &str = "__root__";
pub const SUMMARY_PLACEHOLDER: &str = "_Summary unavailable._";
pub const PARTIAL_MARKER: &str = "(partial)";

lazy_static! {
    static ref INTRO_FALLBACK: TextTemplate = TextTemplate::new("{name} is a {language} project.");
    static ref OVERVIEW_FALLBACK: TextTemplate = TextTemplate::new(
        "{name} contains {files} files across {directories} directories, written primarily in \
{language}."
    );
}

/// Everything the assembler reads. Borrowed; assembly performs no I/O.
pub struct AssemblyInput<'a> {
    pub tree: &'a RepositoryTree,
    pub classification: &'a Classification,
    pub summaries: &'a SummaryMap,
    pub digest: &'a DigestResult,
    /// Clone target shown in the setup guide.
    pub source: &'a str,
}

pub struct DocumentAssembler {
    config: DocumentConfig,
}

impl DocumentAssembler {
    pub fn new(config: DocumentConfig) -> Self {
        Self { config }
    }

    pub fn assemble(&self, input: &AssemblyInput<'_>) -> Result<AssembledDocument> {
        let mut builder = DocumentBuilder::new();

        builder.push(self.header(input))?;
        builder.push(table_of_contents())?;
        builder.push(overview(input))?;
        builder.push(modules(input.tree, input.summaries))?;
        builder.push(self.tree_section(input.tree))?;
        builder.push(getting_started(input))?;
        builder.push(contributing())?;
        builder.push(license())?;

        debug!("Assembled document for {}", input.tree.name);
        Ok(builder.finish())
    }

    fn header(&self, input: &AssemblyInput<'_>) -> DocumentSection {
        let title = self
            .config
            .title
            .clone()
            .unwrap_or_else(|| input.tree.name.clone());
        let intro = input.digest.intro.clone().unwrap_or_else(|| {
            INTRO_FALLBACK.render_pairs(&[
                ("name", &input.tree.name),
                ("language", primary_language(input.classification)),
            ])
        });

        let mut section = DocumentSection::new(SectionKey::Header)
            .with(Fragment::Title(title))
            .with(Fragment::Paragraph(intro));

        let badges = BadgeSelector::new(self.config.badge_style.clone()).select(
            &input.classification.ecosystems,
            &input.classification.dependencies,
        );
        if !badges.is_empty() {
            section.push(Fragment::Badges(badges));
        }
        section
    }

    fn tree_section(&self, tree: &RepositoryTree) -> DocumentSection {
        DocumentSection::new(SectionKey::Tree).with(Fragment::CodeBlock {
            language: Some("sh".to_string()),
            code: render_tree(tree, self.config.tree_max_depth),
        })
    }
}

fn primary_language(classification: &Classification) -> &str {
    classification.primary_language().unwrap_or("software")
}

fn table_of_contents() -> DocumentSection {
    let entries = SectionKey::ALL
        .iter()
        .filter(|key| **key > SectionKey::TableOfContents)
        .filter_map(|key| key.heading())
        .map(|heading| format!("[{}](#{})", heading, anchor(heading)))
        .collect();
    DocumentSection::new(SectionKey::TableOfContents).with(Fragment::List(entries))
}

/// GitHub-style heading anchor.
pub fn anchor(heading: &str) -> String {
    heading
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

fn overview(input: &AssemblyInput<'_>) -> DocumentSection {
    let text = input.digest.overview.clone().unwrap_or_else(|| {
        let files = input.tree.file_count().to_string();
        let directories = input.tree.directories().len().to_string();
        OVERVIEW_FALLBACK.render_pairs(&[
            ("name", &input.tree.name),
            ("files", &files),
            ("directories", &directories),
            ("language", primary_language(input.classification)),
        ])
    });
    DocumentSection::new(SectionKey::Overview).with(Fragment::Paragraph(text))
}

/// One table per directory holding files, directories in depth-first first-appearance
/// order, rows sorted by path.
fn modules(tree: &RepositoryTree, summaries: &SummaryMap) -> DocumentSection {
    let mut section = DocumentSection::new(SectionKey::Modules);
    let files = tree.files();

    for dir in tree.directories() {
        let mut members: Vec<&FileNode> = files
            .iter()
            .copied()
            .filter(|f| f.parent() == dir.path)
            .collect();
        if members.is_empty() {
            continue;
        }
        members.sort_by(|a, b| a.path.cmp(&b.path));

        let label = if dir.is_root() {
            ROOT_GROUP.to_string()
        } else {
            dir.path.display().to_string()
        };
        let rows = members
            .iter()
            .map(|file| vec![file.name(), file_summary(file, summaries)])
            .collect();

        section.push(Fragment::Subheading(label));
        section.push(Fragment::Table {
            headers: vec!["File".to_string(), "Summary".to_string()],
            rows,
        });
    }

    if section.fragments.is_empty() {
        section.push(Fragment::Paragraph("_No files found._".to_string()));
    }
    section
}

/// Joins unit summaries of one file in offset order.
pub fn file_summary(file: &FileNode, summaries: &SummaryMap) -> String {
    if let Some(reason) = file.skip {
        return format!("_Not summarized ({})._", reason.describe());
    }
    summary_for_path(&file.path, summaries)
}

fn summary_for_path(path: &Path, summaries: &SummaryMap) -> String {
    let mut texts = Vec::new();
    let mut partial = false;

    for (_, result) in summaries.for_file(path) {
        match result.text() {
            Some(text) => texts.push(table_cell(text)),
            None => partial = true,
        }
        partial |= result.is_truncated();
    }

    if texts.is_empty() {
        return SUMMARY_PLACEHOLDER.to_string();
    }
    let joined = texts.join(" ");
    if partial {
        format!("{} {}", joined, PARTIAL_MARKER)
    } else {
        joined
    }
}

fn getting_started(input: &AssemblyInput<'_>) -> DocumentSection {
    let classification = input.classification;
    let guide = setup_guide(
        &input.tree.name,
        input.source,
        &classification.ecosystems,
        classification.primary_language(),
    );
    let code = |code: String| Fragment::CodeBlock {
        language: Some("sh".to_string()),
        code,
    };

    let mut section = DocumentSection::new(SectionKey::GettingStarted);

    if !classification.dependencies.is_empty() {
        let rows = classification
            .dependencies
            .iter()
            .map(|d| {
                vec![
                    d.name.clone(),
                    d.ecosystem.to_string(),
                    d.version.clone().unwrap_or_else(|| "*".to_string()),
                ]
            })
            .collect();
        section.push(Fragment::Subheading("Dependencies".to_string()));
        section.push(Fragment::Table {
            headers: vec![
                "Name".to_string(),
                "Ecosystem".to_string(),
                "Version".to_string(),
            ],
            rows,
        });
    }

    section.push(Fragment::Subheading("Prerequisites".to_string()));
    section.push(Fragment::List(guide.prerequisites));
    section.push(Fragment::Subheading("Installation".to_string()));
    section.push(code(guide.install));
    section.push(Fragment::Subheading("Usage".to_string()));
    section.push(code(guide.usage));
    section.push(Fragment::Subheading("Testing".to_string()));
    section.push(code(guide.test));
    section
}

fn contributing() -> DocumentSection {
    DocumentSection::new(SectionKey::Contributing)
        .with(Fragment::Paragraph(
            "Contributions are welcome. To propose a change:".to_string(),
        ))
        .with(Fragment::List(vec![
            "Fork the repository and create a feature branch.".to_string(),
            "Commit your changes with clear messages.".to_string(),
            "Open a pull request describing the change.".to_string(),
        ]))
}

fn license() -> DocumentSection {
    DocumentSection::new(SectionKey::License).with(Fragment::Paragraph(
        "This project is distributed under the terms of the license found in the repository. \
Add a LICENSE file if none exists."
            .to_string(),
    ))
}
