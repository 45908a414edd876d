// file: src/models/dependency.rs
// description: declared dependency records and package ecosystems
// reference: internal data structures

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ecosystem {
    Cargo,
    Npm,
    PyPi,
    Go,
    RubyGems,
    Conda,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Cargo => "cargo",
            Ecosystem::Npm => "npm",
            Ecosystem::PyPi => "pypi",
            Ecosystem::Go => "go",
            Ecosystem::RubyGems => "rubygems",
            Ecosystem::Conda => "conda",
        }
    }

    /// Language the ecosystem primarily serves.
    pub fn language(&self) -> &'static str {
        match self {
            Ecosystem::Cargo => "Rust",
            Ecosystem::Npm => "JavaScript",
            Ecosystem::PyPi | Ecosystem::Conda => "Python",
            Ecosystem::Go => "Go",
            Ecosystem::RubyGems => "Ruby",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub name: String,
    pub ecosystem: Ecosystem,
    pub version: Option<String>,
}

impl DependencyRecord {
    pub fn new(name: impl Into<String>, ecosystem: Ecosystem, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            ecosystem,
            version: version.filter(|v| !v.trim().is_empty()),
        }
    }

    /// Deduplication key.
    pub fn key(&self) -> (String, Ecosystem) {
        (self.name.to_lowercase(), self.ecosystem)
    }
}
