// file: src/utils/template.rs
// description: `{placeholder}` template rendering for prompts and setup guides
// reference: Internal code standards

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct TextTemplate {
    template: String,
}

impl TextTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.template
    }

    /// Substitutes known placeholders in one left-to-right pass; substituted values are
    /// never rescanned.
    pub fn render(&self, values: &HashMap<&str, String>) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            result.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find('}').and_then(|end| values.get(&after[..end]).map(|v| (end, v))) {
                Some((end, value)) => {
                    result.push_str(value);
                    rest = &after[end + 1..];
                }
                None => {
                    result.push('{');
                    rest = after;
                }
            }
        }

        result.push_str(rest);
        result
    }

    pub fn render_pairs(&self, pairs: &[(&str, &str)]) -> String {
        let values: HashMap<&str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        self.render(&values)
    }

    /// Placeholder names still present in the template text.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    if !name.is_empty()
                        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                        && !names.iter().any(|n| n == name)
                    {
                        names.push(name.to_string());
                    }
                    rest = &after[end + 1..];
                }
                None => break,
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pairs() {
        let template = TextTemplate::new("cd {name} && cargo run --bin {name}");
        assert_eq!(
            template.render_pairs(&[("name", "demo")]),
            "cd demo && cargo run --bin demo"
        );
    }

    #[test]
    fn test_unknown_placeholders_survive() {
        let template = TextTemplate::new("{a} {b}");
        assert_eq!(template.render_pairs(&[("a", "x")]), "x {b}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let template = TextTemplate::new("{content} / {path}");
        assert_eq!(
            template.render_pairs(&[("content", "{path}"), ("path", "a.rs")]),
            "{path} / a.rs"
        );
    }

    #[test]
    fn test_placeholders() {
        let template = TextTemplate::new("File {path}:\n{content}\n{path} {not valid}");
        assert_eq!(template.placeholders(), vec!["path", "content"]);
    }
}
