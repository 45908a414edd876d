// file: tests/pipeline.rs
// description: end-to-end pipeline scenarios against a scripted completion provider

mod common;

use common::{ScriptedProvider, repository, test_config, two_file_repository, write_file};
use git_readme::document::Outline;
use git_readme::llm::PromptBuilder;
use git_readme::models::{Fragment, SectionKey, UnitId};
use git_readme::pipeline::{WindowLimits, partition};
use git_readme::{
    AssembledDocument, CompletionCache, CompletionError, Config, DocumentWriter, FileCache,
    MemoryCache, Pipeline, PipelineError, RepositoryIngestor, RepositoryReference, RunStatus,
    to_markdown,
};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

fn module_tables(document: &AssembledDocument) -> Vec<(String, Vec<Vec<String>>)> {
    let section = document.section(SectionKey::Modules).unwrap();
    let mut tables = Vec::new();
    let mut label = String::new();
    for fragment in &section.fragments {
        match fragment {
            Fragment::Subheading(text) => label = text.clone(),
            Fragment::Table { rows, .. } => tables.push((label.clone(), rows.clone())),
            _ => {}
        }
    }
    tables
}

fn row(file: &str, summary: &str) -> Vec<String> {
    vec![file.to_string(), summary.to_string()]
}

async fn run_with(
    root: &Path,
    provider: Arc<ScriptedProvider>,
) -> git_readme::Result<git_readme::RunReport> {
    Pipeline::new(test_config(), provider, Arc::new(MemoryCache::new()))
        .run(&RepositoryReference::Local(root.to_path_buf()))
        .await
}

#[tokio::test]
async fn test_two_file_repository_end_to_end() {
    let repo = two_file_repository();
    let provider = Arc::new(
        ScriptedProvider::new()
            .reply("a.py", "Defines a utility function.")
            .reply("b.py", "Defines a data class."),
    );

    let report = run_with(repo.path(), provider.clone()).await.unwrap();

    assert_eq!(report.status, RunStatus::Success);
    assert_eq!(
        module_tables(&report.document),
        vec![(
            "__root__".to_string(),
            vec![
                row("a.py", "Defines a utility function."),
                row("b.py", "Defines a data class."),
            ]
        )]
    );
    assert_eq!(report.document.keys(), SectionKey::ALL.to_vec());
    assert_eq!(provider.unit_calls(), 2);
    assert_eq!(provider.digest_calls(), 2);

    let out = tempdir().unwrap();
    let path = out.path().join("README.md");
    DocumentWriter::new(&path)
        .unwrap()
        .write(&report.document)
        .unwrap();
    let markdown = std::fs::read_to_string(&path).unwrap();
    assert!(markdown.contains("| a.py | Defines a utility function. |"));
    assert!(markdown.contains("Turns code into documentation."));
}

#[tokio::test]
async fn test_unresolvable_repository_aborts_without_output() {
    let out = tempdir().unwrap();
    let path = out.path().join("README.md");
    let provider = Arc::new(ScriptedProvider::new());

    let result = run_with(Path::new("/definitely/not/a/repository"), provider.clone()).await;

    assert!(matches!(
        result,
        Err(PipelineError::RepositoryUnavailable(_))
    ));
    assert!(!path.exists());
    assert_eq!(provider.unit_calls(), 0);
}

#[tokio::test]
async fn test_second_run_is_served_from_cache() {
    let repo = two_file_repository();
    let cache_dir = tempdir().unwrap();
    let cache_path = cache_dir.path().join("cache.json");

    let first = Arc::new(ScriptedProvider::new());
    let cache = Arc::new(FileCache::open(&cache_path).await.unwrap());
    let reference = RepositoryReference::Local(repo.path().to_path_buf());
    let first_report = Pipeline::new(test_config(), first.clone(), cache)
        .run(&reference)
        .await
        .unwrap();
    assert_eq!(first.unit_calls(), 2);

    let second = Arc::new(ScriptedProvider::new());
    let cache = Arc::new(FileCache::open(&cache_path).await.unwrap());
    let second_report = Pipeline::new(test_config(), second.clone(), cache)
        .run(&reference)
        .await
        .unwrap();

    assert_eq!(second.unit_calls(), 0);
    assert_eq!(second_report.stats.units_cached, 2);
    assert_eq!(
        module_tables(&first_report.document),
        module_tables(&second_report.document)
    );
}

#[tokio::test]
async fn test_changed_content_misses_cache() {
    let repo = two_file_repository();
    let cache = Arc::new(MemoryCache::new());
    let reference = RepositoryReference::Local(repo.path().to_path_buf());

    let first = Arc::new(ScriptedProvider::new());
    Pipeline::new(test_config(), first, cache.clone())
        .run(&reference)
        .await
        .unwrap();

    write_file(repo.path(), "b.py", "class Record:\n    name: str\n    age: int\n");
    let second = Arc::new(ScriptedProvider::new());
    Pipeline::new(test_config(), second.clone(), cache.clone())
        .run(&reference)
        .await
        .unwrap();

    assert_eq!(second.unit_calls(), 1);
    assert_eq!(second.calls_for("b.py"), 1);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn test_changed_prompt_budget_misses_cache() {
    let repo = two_file_repository();
    let cache = Arc::new(MemoryCache::new());
    let reference = RepositoryReference::Local(repo.path().to_path_buf());

    Pipeline::new(test_config(), Arc::new(ScriptedProvider::new()), cache.clone())
        .run(&reference)
        .await
        .unwrap();

    let mut config = test_config();
    config.llm.max_input_tokens = 2000;
    let second = Arc::new(ScriptedProvider::new());
    Pipeline::new(config, second.clone(), cache)
        .run(&reference)
        .await
        .unwrap();

    assert_eq!(second.unit_calls(), 2);
}

#[tokio::test]
async fn test_completion_order_does_not_change_document() {
    let repo = repository(&[
        ("a.py", "def a(): pass\n"),
        ("b.py", "def b(): pass\n"),
        ("pkg/c.py", "def c(): pass\n"),
        ("pkg/d.py", "def d(): pass\n"),
    ]);

    let slow_first = Arc::new(
        ScriptedProvider::new()
            .delay("a.py", Duration::from_millis(60))
            .delay("pkg/c.py", Duration::from_millis(30)),
    );
    let slow_last = Arc::new(
        ScriptedProvider::new()
            .delay("pkg/d.py", Duration::from_millis(60))
            .delay("b.py", Duration::from_millis(30)),
    );

    let first = run_with(repo.path(), slow_first).await.unwrap();
    let second = run_with(repo.path(), slow_last).await.unwrap();

    assert_eq!(to_markdown(&first.document), to_markdown(&second.document));
}

#[tokio::test]
async fn test_transient_failures_are_retried_exactly_max_attempts() {
    let repo = two_file_repository();
    let provider = Arc::new(
        ScriptedProvider::new().fail("a.py", CompletionError::Transient("429".into())),
    );

    let report = run_with(repo.path(), provider.clone()).await.unwrap();

    assert_eq!(
        provider.calls_for("a.py"),
        test_config().pipeline.max_attempts
    );
    assert_eq!(provider.calls_for("b.py"), 1);
    assert_eq!(report.failed_units, vec![UnitId::new("a.py", 0)]);
    assert_eq!(report.status, RunStatus::SuccessWithWarnings);
}

#[tokio::test]
async fn test_single_permanent_failure_renders_placeholder() {
    let repo = two_file_repository();
    let provider = Arc::new(
        ScriptedProvider::new()
            .reply("a.py", "Defines a utility function.")
            .fail("b.py", CompletionError::Fatal("content policy".into())),
    );

    let report = run_with(repo.path(), provider.clone()).await.unwrap();

    assert_eq!(provider.calls_for("b.py"), 1);
    assert_eq!(report.status, RunStatus::SuccessWithWarnings);
    assert_eq!(
        module_tables(&report.document),
        vec![(
            "__root__".to_string(),
            vec![
                row("a.py", "Defines a utility function."),
                row("b.py", "_Summary unavailable._"),
            ]
        )]
    );
}

#[tokio::test]
async fn test_authentication_failure_aborts_run() {
    let repo = two_file_repository();
    let provider = Arc::new(
        ScriptedProvider::new().fail("a.py", CompletionError::Auth("401 invalid key".into())),
    );

    let result = run_with(repo.path(), provider).await;

    assert!(matches!(result, Err(PipelineError::ProviderAuth(_))));
}

#[tokio::test]
async fn test_cancellation_stops_run() {
    let repo = two_file_repository();
    let provider = Arc::new(
        ScriptedProvider::new()
            .delay("a.py", Duration::from_secs(2))
            .delay("b.py", Duration::from_secs(2)),
    );
    let cancel = CancellationToken::new();
    let pipeline = Pipeline::new(test_config(), provider, Arc::new(MemoryCache::new()))
        .with_cancellation(cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let result = pipeline
        .run(&RepositoryReference::Local(repo.path().to_path_buf()))
        .await;

    assert!(matches!(result, Err(PipelineError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_units_cover_every_included_byte() {
    let repo = repository(&[
        ("small.py", "x = 1\n"),
        ("empty.txt", ""),
        ("src/big.rs", &"// données de test\n".repeat(200)),
        ("target/debug/skip.rs", "fn skipped() {}"),
    ]);
    write_file(repo.path(), "huge.txt", &"z".repeat(10 * 1024));

    let mut config = test_config();
    config.repository.max_file_size_kb = 8;
    let tree = RepositoryIngestor::new(config.repository.clone())
        .ingest(repo.path(), "demo")
        .unwrap();
    let units = partition(&tree, WindowLimits::new(256, usize::MAX));

    let included: Vec<_> = tree.files().into_iter().filter(|f| f.is_summarizable()).collect();
    assert_eq!(included.len(), 3);
    assert!(tree.file(Path::new("huge.txt")).is_some());
    assert!(tree.file(Path::new("target/debug/skip.rs")).is_none());

    for file in included {
        let mut rebuilt = Vec::new();
        let mut offset = 0;
        for unit in units.iter().filter(|u| u.id.path == file.path) {
            assert_eq!(unit.id.offset, offset);
            assert!(unit.len() <= 256);
            offset += unit.len();
            rebuilt.extend_from_slice(&unit.content);
        }
        assert_eq!(rebuilt, file.content, "coverage of {}", file.path.display());
    }
    assert!(units.iter().filter(|u| u.id.path == Path::new("src/big.rs")).count() > 1);
}

#[tokio::test]
async fn test_small_token_budget_splits_instead_of_truncating() {
    let repo = repository(&[("long.py", &"value = 1\n".repeat(100))]);
    let mut config = test_config();
    config.llm.max_input_tokens = 40;
    let provider = Arc::new(ScriptedProvider::new().reply("long.py", "Assigns values."));

    let report = Pipeline::new(config, provider.clone(), Arc::new(MemoryCache::new()))
        .run(&RepositoryReference::Local(repo.path().to_path_buf()))
        .await
        .unwrap();

    assert!(provider.calls_for("long.py") > 1);
    let summary = &module_tables(&report.document)[0].1[0][1];
    assert!(summary.starts_with("Assigns values. Assigns values."));
    assert!(!summary.contains("(partial)"));
    assert_eq!(report.status, RunStatus::Success);
}

#[test]
fn test_default_windows_fit_prompt_budget() {
    let source = "def handler(event, context):\n    return {'status': 200, 'body': event}\n";
    let repo = repository(&[("big.py", &source.repeat(44_000 / source.len() + 1))]);
    let config = Config::default_config();

    let tree = RepositoryIngestor::new(config.repository.clone())
        .ingest(repo.path(), "demo")
        .unwrap();
    let units = partition(
        &tree,
        WindowLimits::new(
            config.pipeline.split_threshold_bytes,
            config.llm.max_input_tokens,
        ),
    );
    let prompts = PromptBuilder::new("demo", &config.llm);

    assert!(units.len() > 1);
    for unit in &units {
        let (_, truncated) = prompts.unit_request(unit);
        assert!(!truncated, "window at {} was truncated", unit.id.offset);
    }
}

#[tokio::test]
async fn test_markdown_in_overview_still_writes_document() {
    let repo = two_file_repository();
    let provider = Arc::new(
        ScriptedProvider::new().overview("Intro.\n\n## Features\nFast.\n\n```rust\nfn main() {}"),
    );

    let report = run_with(repo.path(), provider).await.unwrap();
    let overview = report.document.section(SectionKey::Overview).unwrap();
    assert_eq!(
        overview.fragments,
        vec![Fragment::Paragraph(
            "Intro.\n\nFeatures Fast.\n\nfn main() {}".to_string()
        )]
    );

    let out = tempdir().unwrap();
    let path = out.path().join("README.md");
    DocumentWriter::new(&path)
        .unwrap()
        .write(&report.document)
        .unwrap();

    let markdown = std::fs::read_to_string(&path).unwrap();
    let expected: Vec<&str> = SectionKey::ALL.iter().filter_map(|k| k.heading()).collect();
    assert_eq!(Outline::parse(&markdown).headings_at(2), expected);
}

#[tokio::test]
async fn test_in_flight_requests_stay_within_bound() {
    let files: Vec<(String, String)> = (0..20)
        .map(|i| (format!("mod_{:02}.py", i), format!("def f{}(): pass\n", i)))
        .collect();
    let refs: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
    let repo = repository(&refs);

    let mut config = test_config();
    config.pipeline.max_in_flight = 3;
    let provider = Arc::new(ScriptedProvider::new().default_delay(Duration::from_millis(15)));

    let report = Pipeline::new(config, provider.clone(), Arc::new(MemoryCache::new()))
        .run(&RepositoryReference::Local(repo.path().to_path_buf()))
        .await
        .unwrap();

    assert_eq!(provider.unit_calls(), 20);
    assert!(provider.peak_in_flight() <= 3);
    assert!(provider.peak_in_flight() > 1);
    assert_eq!(report.status, RunStatus::Success);
}

#[tokio::test]
async fn test_deadline_cancels_and_still_flushes_cache() {
    let repo = two_file_repository();
    let cache_dir = tempdir().unwrap();
    let cache_path = cache_dir.path().join("cache.json");

    let mut config = test_config();
    config.pipeline.run_deadline_secs = 1;
    config.pipeline.request_timeout_secs = 30;
    let provider = Arc::new(ScriptedProvider::new().delay("b.py", Duration::from_secs(30)));
    let cache = Arc::new(FileCache::open(&cache_path).await.unwrap());

    let started = std::time::Instant::now();
    let result = Pipeline::new(config, provider, cache)
        .run(&RepositoryReference::Local(repo.path().to_path_buf()))
        .await;

    assert!(matches!(result, Err(PipelineError::Timeout(_))));
    assert!(started.elapsed() < Duration::from_secs(5));

    let reopened = FileCache::open(&cache_path).await.unwrap();
    assert_eq!(reopened.len(), 1);
}

#[tokio::test]
async fn test_offline_provider_yields_templated_document() {
    let repo = two_file_repository();
    let report = Pipeline::new(
        test_config(),
        Arc::new(git_readme::OfflineProvider),
        Arc::new(MemoryCache::new()),
    )
    .run(&RepositoryReference::Local(repo.path().to_path_buf()))
    .await
    .unwrap();

    assert_eq!(report.status, RunStatus::SuccessWithWarnings);
    let header = report.document.section(SectionKey::Header).unwrap();
    let name = repo
        .path()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .to_string();
    assert_eq!(
        header.fragments[1],
        Fragment::Paragraph(format!("{} is a Python project.", name))
    );
    assert_eq!(report.failed_units.len(), 2);
    assert_eq!(
        module_tables(&report.document)[0].1[0],
        row("a.py", "_Summary unavailable._")
    );
}
