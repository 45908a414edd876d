// file: src/document/outline.rs
// description: heading and table outline of rendered markdown
// reference: https://docs.rs/pulldown-cmark

use crate::error::{PipelineError, Result};
use crate::models::AssembledDocument;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    pub headings: Vec<Heading>,
    /// Body rows (header rows excluded) of every table.
    pub table_rows: usize,
}

impl Outline {
    pub fn parse(markdown: &str) -> Self {
        let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);
        let mut outline = Outline::default();
        let mut current_heading: Option<(u32, String)> = None;
        let mut in_table_head = false;

        for event in parser {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    current_heading = Some((level as u32, String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, text)) = current_heading.take() {
                        outline.headings.push(Heading {
                            level,
                            text: text.trim().to_string(),
                        });
                    }
                }
                Event::Start(Tag::TableHead) => in_table_head = true,
                Event::End(TagEnd::TableHead) => in_table_head = false,
                Event::End(TagEnd::TableRow) if !in_table_head => outline.table_rows += 1,
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, ref mut heading_text)) = current_heading {
                        heading_text.push_str(&text);
                    }
                }
                _ => {}
            }
        }

        outline
    }

    /// Texts of the headings at `level`, in document order.
    pub fn headings_at(&self, level: u32) -> Vec<&str> {
        self.headings
            .iter()
            .filter(|h| h.level == level)
            .map(|h| h.text.as_str())
            .collect()
    }
}

/// Confirms the rendered markdown carries the document's section headings in order.
pub fn verify_section_order(document: &AssembledDocument, markdown: &str) -> Result<()> {
    let expected: Vec<&str> = document
        .sections()
        .iter()
        .filter_map(|s| s.key.heading())
        .collect();
    let outline = Outline::parse(markdown);
    let found = outline.headings_at(2);

    if found != expected {
        return Err(PipelineError::Validation(format!(
            "rendered headings {:?} do not match sections {:?}",
            found, expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline() {
        let markdown = "# demo\n\n## Modules\n\n### \\_\\_root\\_\\_\n\n| File | Summary |\n| --- | --- |\n| a.py | A. |\n| b.py | B. |\n";
        let outline = Outline::parse(markdown);
        assert_eq!(outline.headings_at(1), vec!["demo"]);
        assert_eq!(outline.headings_at(2), vec!["Modules"]);
        assert_eq!(outline.headings_at(3), vec!["__root__"]);
        assert_eq!(outline.table_rows, 2);
    }
}
