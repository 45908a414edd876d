// file: src/document/badges.rs
// description: dependency and ecosystem badges rendered as shields.io images
// reference: https://shields.io/badges/static-badge

use crate::models::{Badge, DependencyRecord, Ecosystem};
use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

/// Display label, background color and simple-icons logo slug.
#[derive(Debug, Clone, Copy)]
struct BadgeSpec {
    label: &'static str,
    color: &'static str,
    logo: &'static str,
}

const fn spec(label: &'static str, color: &'static str, logo: &'static str) -> BadgeSpec {
    BadgeSpec { label, color, logo }
}

lazy_static! {
    static ref DEPENDENCY_BADGES: HashMap<&'static str, BadgeSpec> = HashMap::from([
        ("tokio", spec("Tokio", "000000", "rust")),
        ("serde", spec("Serde", "DEA584", "rust")),
        ("reqwest", spec("Reqwest", "DEA584", "rust")),
        ("clap", spec("Clap", "DEA584", "rust")),
        ("axum", spec("Axum", "000000", "rust")),
        ("actix-web", spec("Actix", "000000", "actix")),
        ("react", spec("React", "61DAFB", "react")),
        ("vue", spec("Vue.js", "4FC08D", "vuedotjs")),
        ("express", spec("Express", "000000", "express")),
        ("next", spec("Next.js", "000000", "nextdotjs")),
        ("typescript", spec("TypeScript", "3178C6", "typescript")),
        ("jest", spec("Jest", "C21325", "jest")),
        ("eslint", spec("ESLint", "4B32C3", "eslint")),
        ("webpack", spec("Webpack", "8DD6F9", "webpack")),
        ("vite", spec("Vite", "646CFF", "vite")),
        ("django", spec("Django", "092E20", "django")),
        ("flask", spec("Flask", "000000", "flask")),
        ("fastapi", spec("FastAPI", "009688", "fastapi")),
        ("numpy", spec("NumPy", "013243", "numpy")),
        ("pandas", spec("pandas", "150458", "pandas")),
        ("pytest", spec("Pytest", "0A9EDC", "pytest")),
        ("scikit-learn", spec("scikit-learn", "F7931E", "scikitlearn")),
        ("torch", spec("PyTorch", "EE4C2C", "pytorch")),
        ("tensorflow", spec("TensorFlow", "FF6F00", "tensorflow")),
        ("openai", spec("OpenAI", "412991", "openai")),
        ("pydantic", spec("Pydantic", "E92063", "pydantic")),
        ("github.com/gin-gonic/gin", spec("Gin", "008ECF", "go")),
        ("github.com/spf13/cobra", spec("Cobra", "00ADD8", "go")),
        ("rails", spec("Rails", "CC0000", "rubyonrails")),
        ("rspec", spec("RSpec", "CC342D", "ruby")),
    ]);
}

fn ecosystem_spec(ecosystem: Ecosystem) -> BadgeSpec {
    match ecosystem {
        Ecosystem::Cargo => spec("Rust", "000000", "rust"),
        Ecosystem::Npm => spec("npm", "CB3837", "npm"),
        Ecosystem::PyPi => spec("Python", "3776AB", "python"),
        Ecosystem::Go => spec("Go", "00ADD8", "go"),
        Ecosystem::RubyGems => spec("Ruby", "CC342D", "ruby"),
        Ecosystem::Conda => spec("Anaconda", "44A833", "anaconda"),
    }
}

pub struct BadgeSelector {
    style: String,
}

impl BadgeSelector {
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
        }
    }

    /// Ecosystem badges first, then recognized dependencies, each in detection order.
    /// A label appears at most once.
    pub fn select(&self, ecosystems: &[Ecosystem], dependencies: &[DependencyRecord]) -> Vec<Badge> {
        let mut seen = HashSet::new();
        let specs = ecosystems.iter().map(|e| ecosystem_spec(*e)).chain(
            dependencies
                .iter()
                .filter_map(|d| DEPENDENCY_BADGES.get(d.name.to_lowercase().as_str()).copied()),
        );

        specs
            .filter(|s| seen.insert(s.label))
            .map(|s| self.badge(s))
            .collect()
    }

    fn badge(&self, spec: BadgeSpec) -> Badge {
        Badge {
            label: spec.label.to_string(),
            image_url: format!(
                "https://img.shields.io/badge/{}-{}.svg?style={}&logo={}&logoColor=white",
                escape_label(spec.label),
                spec.color,
                self.style,
                spec.logo
            ),
        }
    }
}

/// Shields.io path escaping: `-` and `_` are doubled, spaces become `%20`.
fn escape_label(label: &str) -> String {
    label
        .replace('-', "--")
        .replace('_', "__")
        .replace(' ', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(name: &str, ecosystem: Ecosystem) -> DependencyRecord {
        DependencyRecord::new(name, ecosystem, None)
    }

    #[test]
    fn test_detection_order_and_dedup() {
        let selector = BadgeSelector::new("flat");
        let badges = selector.select(
            &[Ecosystem::PyPi, Ecosystem::Npm],
            &[
                dep("Flask", Ecosystem::PyPi),
                dep("unknown-lib", Ecosystem::PyPi),
                dep("react", Ecosystem::Npm),
                dep("flask", Ecosystem::Conda),
            ],
        );
        let labels: Vec<_> = badges.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Python", "npm", "Flask", "React"]);
    }

    #[test]
    fn test_badge_url() {
        let badges = BadgeSelector::new("for-the-badge").select(&[], &[dep("scikit-learn", Ecosystem::PyPi)]);
        assert_eq!(
            badges[0].image_url,
            "https://img.shields.io/badge/scikit--learn-F7931E.svg?style=for-the-badge&logo=scikitlearn&logoColor=white"
        );
    }

    #[test]
    fn test_no_detection_no_badges() {
        assert!(BadgeSelector::new("flat").select(&[], &[]).is_empty());
    }
}
