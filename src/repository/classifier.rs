// file: src/repository/classifier.rs
// description: language ranking and dependency detection over an ingested tree
// reference: extension and manifest based classification

use crate::models::{DependencyRecord, Ecosystem, RepositoryTree};
use crate::repository::manifest::{manifest_ecosystem, parse_manifest};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

const EXTENSION_LANGUAGES: &[(&str, &str)] = &[
    ("rs", "Rust"),
    ("py", "Python"),
    ("pyi", "Python"),
    ("ipynb", "Jupyter Notebook"),
    ("js", "JavaScript"),
    ("mjs", "JavaScript"),
    ("cjs", "JavaScript"),
    ("jsx", "JavaScript"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("go", "Go"),
    ("rb", "Ruby"),
    ("java", "Java"),
    ("kt", "Kotlin"),
    ("kts", "Kotlin"),
    ("scala", "Scala"),
    ("swift", "Swift"),
    ("c", "C"),
    ("h", "C"),
    ("cc", "C++"),
    ("cpp", "C++"),
    ("cxx", "C++"),
    ("hpp", "C++"),
    ("cs", "C#"),
    ("php", "PHP"),
    ("lua", "Lua"),
    ("r", "R"),
    ("jl", "Julia"),
    ("dart", "Dart"),
    ("ex", "Elixir"),
    ("exs", "Elixir"),
    ("erl", "Erlang"),
    ("hs", "Haskell"),
    ("ml", "OCaml"),
    ("zig", "Zig"),
    ("sh", "Shell"),
    ("bash", "Shell"),
    ("zsh", "Shell"),
    ("ps1", "PowerShell"),
    ("sql", "SQL"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("scss", "SCSS"),
    ("vue", "Vue"),
    ("svelte", "Svelte"),
    ("md", "Markdown"),
    ("toml", "TOML"),
    ("yaml", "YAML"),
    ("yml", "YAML"),
    ("json", "JSON"),
    ("proto", "Protocol Buffers"),
];

/// Language for a path, by extension (or well-known file name).
pub fn language_for_path(path: &Path) -> Option<&'static str> {
    let file_name = path.file_name()?.to_str()?;
    match file_name {
        "Dockerfile" => return Some("Dockerfile"),
        "Makefile" => return Some("Makefile"),
        "Gemfile" | "Rakefile" => return Some("Ruby"),
        _ => {}
    }

    let extension = path.extension()?.to_str()?.to_lowercase();
    EXTENSION_LANGUAGES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, lang)| *lang)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageStat {
    pub name: String,
    pub files: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Classification {
    /// Ranked by file count, then bytes, then name.
    pub languages: Vec<LanguageStat>,
    /// Deduplicated by (name, ecosystem), in detection order.
    pub dependencies: Vec<DependencyRecord>,
    /// Ecosystems in the order their first manifest was found.
    pub ecosystems: Vec<Ecosystem>,
    pub manifests: Vec<PathBuf>,
}

impl Classification {
    pub fn primary_language(&self) -> Option<&str> {
        self.languages.first().map(|l| l.name.as_str())
    }

    pub fn language_names(&self) -> Vec<&str> {
        self.languages.iter().map(|l| l.name.as_str()).collect()
    }
}

#[derive(Debug, Default)]
pub struct FileClassifier;

impl FileClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, tree: &RepositoryTree) -> Classification {
        let mut stats: HashMap<String, LanguageStat> = HashMap::new();
        let mut seen = HashSet::new();
        let mut classification = Classification::default();

        for file in tree.files() {
            if let Some(language) = &file.language {
                let entry = stats.entry(language.clone()).or_insert_with(|| LanguageStat {
                    name: language.clone(),
                    files: 0,
                    bytes: 0,
                });
                entry.files += 1;
                entry.bytes += file.size;
            }

            let file_name = file.name();
            let Some(ecosystem) = manifest_ecosystem(&file_name) else {
                continue;
            };
            if !file.is_summarizable() {
                continue;
            }

            debug!("Reading manifest {}", file.path.display());
            classification.manifests.push(file.path.clone());
            if !classification.ecosystems.contains(&ecosystem) {
                classification.ecosystems.push(ecosystem);
            }

            for record in parse_manifest(&file_name, &file.text()) {
                if !classification.ecosystems.contains(&record.ecosystem) {
                    classification.ecosystems.push(record.ecosystem);
                }
                if seen.insert(record.key()) {
                    classification.dependencies.push(record);
                }
            }
        }

        let mut languages: Vec<LanguageStat> = stats.into_values().collect();
        languages.sort_by(|a, b| {
            b.files
                .cmp(&a.files)
                .then(b.bytes.cmp(&a.bytes))
                .then(a.name.cmp(&b.name))
        });
        classification.languages = languages;

        classification
    }
}
