// file: src/llm/prompts.rs
// description: prompt construction for unit summaries and repository-level prose

use crate::config::LlmConfig;
use crate::llm::provider::{CompletionRequest, PromptKind};
use crate::llm::tokens::truncate_to_tokens;
use crate::models::SummarizationUnit;
use crate::utils::TextTemplate;
use lazy_static::lazy_static;

const SYSTEM_PROMPT: &str = "You are a senior software engineer writing concise, factual \
repository documentation. Answer with plain prose only: no markdown headings, no lists, no \
code fences.";

lazy_static! {
    static ref UNIT_TEMPLATE: TextTemplate = TextTemplate::new(
        "Project: {project}\nFile: {path}{window}\n\nSummarize what this code does in at most \
two sentences of under 40 words. Start with a verb, do not mention the file name.\n\n\
```{language}\n{content}\n```"
    );
    static ref INTRO_TEMPLATE: TextTemplate = TextTemplate::new(
        "Project: {project}\n\nFile summaries:\n{digest}\n\nWrite one catchy sentence of under \
20 words introducing this project to a new user. Do not repeat the project name."
    );
    static ref OVERVIEW_TEMPLATE: TextTemplate = TextTemplate::new(
        "Project: {project}\n\nFile summaries:\n{digest}\n\nWrite one paragraph of under 120 \
words describing what this project does, its main components and who it is for. Do not \
list individual files."
    );
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    project: String,
    fingerprint: String,
    max_input_tokens: usize,
    digest_max_tokens: usize,
    max_output_tokens: u32,
}

/// Concatenated per-unit summaries fed to the repository-level prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub text: String,
    pub truncated: bool,
}

impl PromptBuilder {
    pub fn new(project: impl Into<String>, config: &LlmConfig) -> Self {
        Self {
            project: project.into(),
            fingerprint: unit_prompt_fingerprint(config.max_input_tokens),
            max_input_tokens: config.max_input_tokens,
            digest_max_tokens: config.digest_max_tokens,
            max_output_tokens: config.max_output_tokens,
        }
    }

    /// Identifies the unit prompt wording and content budget. Cached unit summaries
    /// are only reused under the same fingerprint.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Builds the request for one unit; the flag reports whether its content was cut.
    pub fn unit_request(&self, unit: &SummarizationUnit) -> (CompletionRequest, bool) {
        let text = unit.text();
        let (content, truncated) = truncate_to_tokens(&text, self.max_input_tokens);
        let window = if unit.is_window() {
            format!(
                " (bytes {}..{} of {})",
                unit.id.offset,
                unit.end(),
                unit.file_size
            )
        } else {
            String::new()
        };
        let path = unit.id.path.display().to_string();
        let language = unit
            .language
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        let prompt = UNIT_TEMPLATE.render_pairs(&[
            ("project", &self.project),
            ("path", &path),
            ("window", &window),
            ("language", &language),
            ("content", content),
        ]);

        (self.request(PromptKind::UnitSummary, prompt), truncated)
    }

    pub fn digest(&self, entries: &[(String, String)]) -> Digest {
        let joined = entries
            .iter()
            .map(|(path, summary)| format!("- {}: {}", path, summary))
            .collect::<Vec<_>>()
            .join("\n");
        let (text, truncated) = truncate_to_tokens(&joined, self.digest_max_tokens);
        Digest {
            text: text.to_string(),
            truncated,
        }
    }

    pub fn intro_request(&self, digest: &Digest) -> CompletionRequest {
        let prompt =
            INTRO_TEMPLATE.render_pairs(&[("project", &self.project), ("digest", &digest.text)]);
        let mut request = self.request(PromptKind::Introduction, prompt);
        request.max_tokens = request.max_tokens.min(60);
        request
    }

    pub fn overview_request(&self, digest: &Digest) -> CompletionRequest {
        let prompt =
            OVERVIEW_TEMPLATE.render_pairs(&[("project", &self.project), ("digest", &digest.text)]);
        self.request(PromptKind::Overview, prompt)
    }

    fn request(&self, kind: PromptKind, prompt: String) -> CompletionRequest {
        CompletionRequest {
            kind,
            system: SYSTEM_PROMPT.to_string(),
            prompt,
            max_tokens: self.max_output_tokens,
        }
    }
}

fn unit_prompt_fingerprint(max_input_tokens: usize) -> String {
    format!(
        "{}\0{}\0{}",
        SYSTEM_PROMPT,
        UNIT_TEMPLATE.source(),
        max_input_tokens
    )
}
