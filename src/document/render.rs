// file: src/document/render.rs
// description: markdown rendering of an assembled document
// reference: https://spec.commonmark.org

use crate::models::{AssembledDocument, DocumentSection, Fragment};
use std::fmt::Write;

pub fn to_markdown(document: &AssembledDocument) -> String {
    let blocks: Vec<String> = document.sections().iter().flat_map(render_section).collect();
    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

fn render_section(section: &DocumentSection) -> Vec<String> {
    let mut blocks = Vec::with_capacity(section.fragments.len() + 1);
    if let Some(heading) = section.key.heading() {
        blocks.push(format!("## {}", heading));
    }
    blocks.extend(section.fragments.iter().map(render_fragment));
    blocks
}

fn render_fragment(fragment: &Fragment) -> String {
    match fragment {
        Fragment::Title(text) => format!("# {}", escape_inline(text)),
        Fragment::Subheading(text) => format!("### {}", escape_inline(text)),
        Fragment::Paragraph(text) => text.clone(),
        Fragment::List(items) => items
            .iter()
            .map(|item| format!("- {}", item))
            .collect::<Vec<_>>()
            .join("\n"),
        Fragment::Table { headers, rows } => render_table(headers, rows),
        Fragment::CodeBlock { language, code } => {
            format!("```{}\n{}\n```", language.as_deref().unwrap_or_default(), code)
        }
        Fragment::Badges(badges) => badges
            .iter()
            .map(|b| format!("![{}]({})", b.label, b.image_url))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "| {} |", headers.join(" | "));
    let _ = write!(
        out,
        "|{}",
        headers.iter().map(|_| " --- |").collect::<String>()
    );
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
        let _ = write!(out, "\n| {} |", cells.join(" | "));
    }
    out
}

/// Escapes characters that would otherwise turn a literal name into emphasis or code.
fn escape_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
