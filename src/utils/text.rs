// file: src/utils/text.rs
// description: cleanup of generated prose before it lands in the document
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LEADING_NON_LETTERS: Regex = Regex::new(r"^[^a-zA-Z]*").expect("valid regex");
    static ref SPACE_BEFORE_PUNCT: Regex = Regex::new(r"\s+([)'.!,?;:])").expect("valid regex");
    static ref SPACE_AFTER_PAREN: Regex = Regex::new(r"\(\s+").expect("valid regex");
    static ref MULTI_SPACE: Regex = Regex::new(r" {2,}").expect("valid regex");
    static ref HYPHEN_SPACING: Regex = Regex::new(r"\s*-\s*").expect("valid regex");
    static ref TABLE_BREAKS: Regex = Regex::new(r"[\r\n|]+").expect("valid regex");
    static ref BLANK_LINES: Regex = Regex::new(r"\n\s*\n").expect("valid regex");
    static ref BLOCK_PREFIX: Regex = Regex::new(r"^(?:#{1,6}|>)+\s*").expect("valid regex");
    static ref RULE_LINE: Regex = Regex::new(r"^[-=*_\s]+$").expect("valid regex");
}

/// Normalizes a generated sentence: drops leading non-letters, tightens spacing around
/// punctuation and hyphens, collapses repeated spaces and strips wrapping quotes.
pub fn format_sentence(text: &str) -> String {
    let text = LEADING_NON_LETTERS.replace(text, "");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
    let text = SPACE_AFTER_PAREN.replace_all(&text, "(");
    let text = MULTI_SPACE.replace_all(&text, " ");
    let text = HYPHEN_SPACING.replace_all(&text, "-");
    text.trim().trim_matches('"').trim().to_string()
}

/// Flattens text so it fits in a single markdown table cell.
pub fn table_cell(text: &str) -> String {
    let flat = TABLE_BREAKS.replace_all(text.trim(), " ");
    MULTI_SPACE.replace_all(&flat, " ").trim().to_string()
}

/// Reduces generated markdown to plain paragraphs: headings, quotes, fences and rules
/// lose their markup, lines inside a paragraph are joined and `<` is escaped so no
/// block construct can leak into the surrounding document.
pub fn flatten_prose(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    BLANK_LINES
        .split(normalized.trim())
        .filter_map(|block| {
            let lines: Vec<String> = block
                .lines()
                .map(str::trim)
                .filter(|line| !is_fence(line) && !RULE_LINE.is_match(line))
                .map(|line| BLOCK_PREFIX.replace(line, "").trim().to_string())
                .filter(|line| !line.is_empty())
                .collect();
            if lines.is_empty() {
                return None;
            }
            let joined = lines.join(" ").replace('<', "&lt;");
            Some(MULTI_SPACE.replace_all(&joined, " ").into_owned())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn is_fence(line: &str) -> bool {
    line.starts_with("```") || line.starts_with("~~~")
}
