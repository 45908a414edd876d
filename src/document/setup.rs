// file: src/document/setup.rs
// description: install, usage and test instructions templated per ecosystem
// reference: Internal code standards

use crate::models::Ecosystem;
use crate::utils::TextTemplate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupGuide {
    pub prerequisites: Vec<String>,
    pub install: String,
    pub usage: String,
    pub test: String,
}

struct SetupTemplate {
    prerequisites: &'static [&'static str],
    install: &'static str,
    usage: &'static str,
    test: &'static str,
}

const CARGO: SetupTemplate = SetupTemplate {
    prerequisites: &["Rust toolchain (rustup, cargo)"],
    install: "git clone {repository}\ncd {name}\ncargo build --release",
    usage: "cargo run --release",
    test: "cargo test",
};

const NPM: SetupTemplate = SetupTemplate {
    prerequisites: &["Node.js", "npm"],
    install: "git clone {repository}\ncd {name}\nnpm install",
    usage: "npm start",
    test: "npm test",
};

const PYPI: SetupTemplate = SetupTemplate {
    prerequisites: &["Python 3", "pip"],
    install: "git clone {repository}\ncd {name}\npip install -r requirements.txt",
    usage: "python main.py",
    test: "pytest",
};

const CONDA: SetupTemplate = SetupTemplate {
    prerequisites: &["Conda"],
    install: "git clone {repository}\ncd {name}\nconda env create -f environment.yml\nconda activate {name}",
    usage: "python main.py",
    test: "pytest",
};

const GO: SetupTemplate = SetupTemplate {
    prerequisites: &["Go toolchain"],
    install: "git clone {repository}\ncd {name}\ngo build ./...",
    usage: "go run .",
    test: "go test ./...",
};

const RUBYGEMS: SetupTemplate = SetupTemplate {
    prerequisites: &["Ruby", "Bundler"],
    install: "git clone {repository}\ncd {name}\nbundle install",
    usage: "bundle exec ruby main.rb",
    test: "bundle exec rspec",
};

const GENERIC: SetupTemplate = SetupTemplate {
    prerequisites: &["Git"],
    install: "git clone {repository}\ncd {name}",
    usage: "# no entry point detected",
    test: "# no test command detected",
};

fn template_for_ecosystem(ecosystem: Ecosystem) -> &'static SetupTemplate {
    match ecosystem {
        Ecosystem::Cargo => &CARGO,
        Ecosystem::Npm => &NPM,
        Ecosystem::PyPi => &PYPI,
        Ecosystem::Conda => &CONDA,
        Ecosystem::Go => &GO,
        Ecosystem::RubyGems => &RUBYGEMS,
    }
}

fn template_for_language(language: &str) -> Option<&'static SetupTemplate> {
    match language {
        "Rust" => Some(&CARGO),
        "JavaScript" | "TypeScript" => Some(&NPM),
        "Python" => Some(&PYPI),
        "Go" => Some(&GO),
        "Ruby" => Some(&RUBYGEMS),
        _ => None,
    }
}

/// Picks the template of the first detected ecosystem, then of the primary language,
/// then a generic one.
pub fn setup_guide(
    name: &str,
    repository: &str,
    ecosystems: &[Ecosystem],
    primary_language: Option<&str>,
) -> SetupGuide {
    let template = ecosystems
        .first()
        .map(|e| template_for_ecosystem(*e))
        .or_else(|| primary_language.and_then(template_for_language))
        .unwrap_or(&GENERIC);

    let render = |text: &str| {
        TextTemplate::new(text).render_pairs(&[("name", name), ("repository", repository)])
    };

    SetupGuide {
        prerequisites: template.prerequisites.iter().map(|p| p.to_string()).collect(),
        install: render(template.install),
        usage: render(template.usage),
        test: render(template.test),
    }
}
