// file: src/repository/manifest.rs
// description: dependency extraction from well-known package manifests
// reference: https://docs.rs/toml, https://docs.rs/yaml-rust

use crate::models::{DependencyRecord, Ecosystem};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;
use yaml_rust::{Yaml, YamlLoader};

lazy_static! {
    static ref GEM_LINE: Regex =
        Regex::new(r#"^\s*gem\s+['"]([^'"]+)['"](?:\s*,\s*['"]([^'"]+)['"])?"#)
            .expect("valid gem regex");
}

/// Ecosystem for a manifest file name, if it is one we can read.
pub fn manifest_ecosystem(file_name: &str) -> Option<Ecosystem> {
    match file_name {
        "Cargo.toml" => Some(Ecosystem::Cargo),
        "package.json" => Some(Ecosystem::Npm),
        "pyproject.toml" => Some(Ecosystem::PyPi),
        "go.mod" => Some(Ecosystem::Go),
        "Gemfile" => Some(Ecosystem::RubyGems),
        "environment.yml" | "environment.yaml" => Some(Ecosystem::Conda),
        name if name.starts_with("requirements") && name.ends_with(".txt") => {
            Some(Ecosystem::PyPi)
        }
        _ => None,
    }
}

/// Parses a manifest. Unreadable manifests yield no records.
pub fn parse_manifest(file_name: &str, content: &str) -> Vec<DependencyRecord> {
    let parsed = match file_name {
        "Cargo.toml" => parse_cargo(content),
        "package.json" => parse_package_json(content),
        "pyproject.toml" => parse_pyproject(content),
        "go.mod" => Ok(parse_go_mod(content)),
        "Gemfile" => Ok(parse_gemfile(content)),
        "environment.yml" | "environment.yaml" => parse_conda(content),
        name if manifest_ecosystem(name) == Some(Ecosystem::PyPi) => {
            Ok(parse_requirements(content))
        }
        _ => Ok(Vec::new()),
    };

    parsed.unwrap_or_else(|e| {
        warn!("Ignoring unreadable manifest {}: {}", file_name, e);
        Vec::new()
    })
}

fn parse_cargo(content: &str) -> Result<Vec<DependencyRecord>, String> {
    let value: toml::Value = content.parse().map_err(|e: toml::de::Error| e.to_string())?;
    let mut records = Vec::new();

    let mut tables = Vec::new();
    for key in ["dependencies", "dev-dependencies", "build-dependencies"] {
        tables.push(value.get(key));
    }
    tables.push(value.get("workspace").and_then(|w| w.get("dependencies")));

    for table in tables.into_iter().flatten() {
        let Some(table) = table.as_table() else {
            continue;
        };
        for (name, spec) in table {
            let version = match spec {
                toml::Value::String(v) => Some(v.clone()),
                toml::Value::Table(t) => t
                    .get("version")
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
                _ => None,
            };
            records.push(DependencyRecord::new(name, Ecosystem::Cargo, version));
        }
    }

    Ok(records)
}

fn parse_package_json(content: &str) -> Result<Vec<DependencyRecord>, String> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    let mut records = Vec::new();

    for key in ["dependencies", "devDependencies", "peerDependencies"] {
        if let Some(deps) = value.get(key).and_then(|d| d.as_object()) {
            for (name, version) in deps {
                records.push(DependencyRecord::new(
                    name,
                    Ecosystem::Npm,
                    version.as_str().map(str::to_string),
                ));
            }
        }
    }

    Ok(records)
}

fn parse_pyproject(content: &str) -> Result<Vec<DependencyRecord>, String> {
    let value: toml::Value = content.parse().map_err(|e: toml::de::Error| e.to_string())?;
    let mut records = Vec::new();

    if let Some(deps) = value
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
    {
        records.extend(
            deps.iter()
                .filter_map(|d| d.as_str())
                .filter_map(parse_requirement),
        );
    }

    if let Some(deps) = value
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_table())
    {
        for (name, spec) in deps {
            if name == "python" {
                continue;
            }
            let version = match spec {
                toml::Value::String(v) => Some(v.clone()),
                toml::Value::Table(t) => t
                    .get("version")
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
                _ => None,
            };
            records.push(DependencyRecord::new(name, Ecosystem::PyPi, version));
        }
    }

    Ok(records)
}

fn parse_requirements(content: &str) -> Vec<DependencyRecord> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty() && !line.starts_with('-'))
        .filter_map(parse_requirement)
        .collect()
}

/// PEP 508 style requirement: `name[extras] (op version) ; markers`.
fn parse_requirement(line: &str) -> Option<DependencyRecord> {
    let line = line.split(';').next().unwrap_or("").trim();
    let split_at = line
        .find(|c: char| "=<>!~[ (".contains(c))
        .unwrap_or(line.len());
    let name = line[..split_at].trim();
    if name.is_empty() {
        return None;
    }

    let rest = &line[split_at..];
    let rest = match rest.find(']') {
        Some(end) if rest.starts_with('[') => &rest[end + 1..],
        _ => rest,
    };
    let version = rest
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .to_string();

    Some(DependencyRecord::new(name, Ecosystem::PyPi, Some(version)))
}

fn parse_go_mod(content: &str) -> Vec<DependencyRecord> {
    let mut records = Vec::new();
    let mut in_block = false;

    for line in content.lines() {
        let line = line.split("//").next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let spec = if in_block {
            if line == ")" {
                in_block = false;
                continue;
            }
            line
        } else if line == "require (" {
            in_block = true;
            continue;
        } else if let Some(rest) = line.strip_prefix("require ") {
            rest.trim()
        } else {
            continue;
        };

        let mut parts = spec.split_whitespace();
        if let Some(module) = parts.next() {
            records.push(DependencyRecord::new(
                module,
                Ecosystem::Go,
                parts.next().map(str::to_string),
            ));
        }
    }

    records
}

fn parse_gemfile(content: &str) -> Vec<DependencyRecord> {
    content
        .lines()
        .filter_map(|line| GEM_LINE.captures(line))
        .map(|caps| {
            DependencyRecord::new(
                &caps[1],
                Ecosystem::RubyGems,
                caps.get(2).map(|m| m.as_str().to_string()),
            )
        })
        .collect()
}

fn parse_conda(content: &str) -> Result<Vec<DependencyRecord>, String> {
    let docs = YamlLoader::load_from_str(content).map_err(|e| e.to_string())?;
    let mut records = Vec::new();

    let Some(doc) = docs.first() else {
        return Ok(records);
    };

    if let Some(deps) = doc["dependencies"].as_vec() {
        for dep in deps {
            match dep {
                Yaml::String(spec) => {
                    if let Some(record) = split_conda_spec(spec) {
                        records.push(record);
                    }
                }
                Yaml::Hash(_) => {
                    if let Some(pip) = dep["pip"].as_vec() {
                        records.extend(
                            pip.iter()
                                .filter_map(|p| p.as_str())
                                .filter_map(parse_requirement),
                        );
                    }
                }
                _ => {}
            }
        }
    }

    Ok(records)
}

fn split_conda_spec(spec: &str) -> Option<DependencyRecord> {
    let split_at = spec
        .find(|c: char| "=<>! ".contains(c))
        .unwrap_or(spec.len());
    let name = spec[..split_at].trim();
    if name.is_empty() {
        return None;
    }
    let version = spec[split_at..].trim_start_matches('=').trim().to_string();
    Some(DependencyRecord::new(name, Ecosystem::Conda, Some(version)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(records: &[DependencyRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_cargo_manifest() {
        let content = r#"
[package]
name = "demo"

[dependencies]
serde = { version = "1.0", features = ["derive"] }
tokio = "1.48"
local = { path = "../local" }

[dev-dependencies]
tempfile = "3"
"#;
        let records = parse_manifest("Cargo.toml", content);
        assert_eq!(names(&records), vec!["local", "serde", "tokio", "tempfile"]);
        assert_eq!(records[1].version.as_deref(), Some("1.0"));
        assert_eq!(records[0].version, None);
        assert!(records.iter().all(|r| r.ecosystem == Ecosystem::Cargo));
    }

    #[test]
    fn test_package_json() {
        let content = r#"{"dependencies": {"react": "^18.2.0"}, "devDependencies": {"vite": "5.0.0"}}"#;
        let records = parse_manifest("package.json", content);
        assert_eq!(names(&records), vec!["react", "vite"]);
        assert_eq!(records[0].version.as_deref(), Some("^18.2.0"));
    }

    #[test]
    fn test_requirements() {
        let content = "# comment\nrequests>=2.31\nnumpy==1.26.0 ; python_version > '3.8'\n-r other.txt\nuvicorn[standard]\n";
        let records = parse_manifest("requirements.txt", content);
        assert_eq!(names(&records), vec!["requests", "numpy", "uvicorn"]);
        assert_eq!(records[0].version.as_deref(), Some(">=2.31"));
        assert_eq!(records[1].version.as_deref(), Some("==1.26.0"));
        assert_eq!(records[2].version, None);
    }

    #[test]
    fn test_pyproject() {
        let content = r#"
[project]
dependencies = ["httpx>=0.27", "rich"]

[tool.poetry.dependencies]
python = "^3.11"
click = "^8.1"
"#;
        let records = parse_manifest("pyproject.toml", content);
        assert_eq!(names(&records), vec!["httpx", "rich", "click"]);
    }

    #[test]
    fn test_go_mod() {
        let content = "module example.com/app\n\ngo 1.22\n\nrequire github.com/spf13/cobra v1.8.0\n\nrequire (\n\tgolang.org/x/sync v0.6.0 // indirect\n\tgithub.com/stretchr/testify v1.9.0\n)\n";
        let records = parse_manifest("go.mod", content);
        assert_eq!(
            names(&records),
            vec![
                "github.com/spf13/cobra",
                "golang.org/x/sync",
                "github.com/stretchr/testify"
            ]
        );
        assert_eq!(records[1].version.as_deref(), Some("v0.6.0"));
    }

    #[test]
    fn test_gemfile() {
        let content = "source 'https://rubygems.org'\ngem 'rails', '~> 7.1'\ngem \"puma\"\n";
        let records = parse_manifest("Gemfile", content);
        assert_eq!(names(&records), vec!["rails", "puma"]);
        assert_eq!(records[0].version.as_deref(), Some("~> 7.1"));
    }

    #[test]
    fn test_conda_environment() {
        let content = "name: demo\ndependencies:\n  - python=3.11\n  - numpy\n  - pip:\n      - torch==2.2.0\n";
        let records = parse_manifest("environment.yml", content);
        assert_eq!(names(&records), vec!["python", "numpy", "torch"]);
        assert_eq!(records[2].ecosystem, Ecosystem::PyPi);
        assert_eq!(records[0].version.as_deref(), Some("3.11"));
    }

    #[test]
    fn test_malformed_manifest_is_empty() {
        assert!(parse_manifest("package.json", "{not json").is_empty());
        assert!(parse_manifest("Cargo.toml", "[[[").is_empty());
    }

    #[test]
    fn test_manifest_ecosystem() {
        assert_eq!(manifest_ecosystem("requirements-dev.txt"), Some(Ecosystem::PyPi));
        assert_eq!(manifest_ecosystem("README.md"), None);
    }
}
