// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use git_readme::document::render_tree;
use git_readme::utils::logging::{format_error, format_step, format_success, format_warning};
use git_readme::{
    Config, DocumentWriter, FileClassifier, RepositoryIngestor, RepositoryReference,
    RepositorySync, RunStatus,
};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "git_readme")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Generate a README for a repository with an LLM", long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a repository and write the document
    Generate {
        /// Local path or remote git URL
        #[arg(short, long)]
        repository: String,

        /// Destination; the extension selects markdown (.md) or json (.json)
        #[arg(short, long, default_value = "README.md")]
        output: PathBuf,

        #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        #[arg(long)]
        model: Option<String>,

        /// Never contact the completion service
        #[arg(long)]
        offline: bool,

        #[arg(long)]
        no_cache: bool,
    },

    /// Print the tree, languages and dependencies without summarizing
    Inspect {
        #[arg(short, long)]
        repository: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    git_readme::utils::logging::init_logger(cli.color, cli.verbose);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let result = match cli.command {
        Commands::Generate {
            repository,
            output,
            api_key,
            model,
            offline,
            no_cache,
        } => {
            if api_key.is_some() {
                config.llm.api_key = api_key;
            }
            if let Some(model) = model {
                config.llm.model = model;
            }
            config.llm.offline |= offline;
            if no_cache {
                config.cache.enabled = false;
            }
            cmd_generate(&config, &repository, output).await
        }
        Commands::Inspect { repository } => cmd_inspect(&config, &repository).await,
    };

    if let Err(e) = result {
        eprintln!("{}", format_error(&format!("{:#}", e)));
        std::process::exit(1);
    }
    Ok(())
}

async fn cmd_generate(config: &Config, repository: &str, output: PathBuf) -> Result<()> {
    println!("{}", format_step(1, 3, "Resolving repository"));
    let reference = RepositoryReference::parse(repository)?;
    let writer = DocumentWriter::new(&output).context("Invalid output path")?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            signal_token.cancel();
        }
    });

    println!("{}", format_step(2, 3, "Summarizing repository"));
    let report = git_readme::run(&reference, config, cancel)
        .await
        .context("README generation failed")?;

    println!("{}", format_step(3, 3, "Writing document"));
    let path = writer
        .write(&report.document)
        .context("Failed to write document")?;

    let stats = &report.stats;
    info!(
        "Files: {} | Units: {} | Cached: {} | Failed: {} | Duration: {}s",
        stats.files_scanned,
        stats.units_total,
        stats.units_cached,
        stats.units_failed,
        stats.duration_secs
    );
    for metrics in &report.metrics {
        info!("{}", metrics.format());
    }

    match report.status {
        RunStatus::Success => {
            println!("{}", format_success(&format!("Wrote {}", path.display())));
        }
        RunStatus::SuccessWithWarnings => {
            println!(
                "{}",
                format_warning(&format!(
                    "Wrote {} with {} unsummarized units and {} missing digest sections",
                    path.display(),
                    report.failed_units.len(),
                    report.digest_failures.len()
                ))
            );
        }
    }

    Ok(())
}

async fn cmd_inspect(config: &Config, repository: &str) -> Result<()> {
    let reference = RepositoryReference::parse(repository)?;
    let sync = RepositorySync::new(config.repository.clone());
    let working_copy = sync
        .acquire(&reference, &CancellationToken::new())
        .await
        .context("Repository unavailable")?;

    let tree = RepositoryIngestor::new(config.repository.clone())
        .ingest_blocking(
            working_copy.root().to_path_buf(),
            working_copy.name().to_string(),
        )
        .await?;
    let classification = FileClassifier::new().classify(&tree);

    println!("{}\n", render_tree(&tree, config.document.tree_max_depth));

    println!("Languages:");
    for language in &classification.languages {
        println!(
            "  {:<16} {:>5} files {:>10} bytes",
            language.name, language.files, language.bytes
        );
    }

    println!("\nDependencies:");
    for dependency in &classification.dependencies {
        println!(
            "  {:<32} {:<10} {}",
            dependency.name,
            dependency.ecosystem,
            dependency.version.as_deref().unwrap_or("*")
        );
    }

    println!(
        "\n{}",
        format_success(&format!(
            "{} files, {} bytes",
            tree.file_count(),
            tree.total_bytes()
        ))
    );
    Ok(())
}
