//! Batch command - classify many documents against many patterns.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use dissect_core::models::{Document, Pattern, ProcessingResults};
use dissect_core::{Catalog, PatternEvaluator};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob matching pattern JSON files
    #[arg(short, long, required = true)]
    patterns: String,

    /// Glob matching document JSON files
    #[arg(short, long, required = true)]
    documents: String,

    /// Catalog JSON file with custom field data types
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Number of parallel workers (default: from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Write the results as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Continue when a document file cannot be read
    #[arg(long)]
    continue_on_error: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;
    let jobs = args.jobs.unwrap_or(config.processing.jobs).max(1);

    let pattern_files = expand(&args.patterns)?;
    let document_files = expand(&args.documents)?;

    let mut patterns: Vec<Pattern> = Vec::with_capacity(pattern_files.len());
    for path in &pattern_files {
        patterns.push(super::read_json(path)?);
    }

    println!(
        "{} Found {} patterns and {} documents",
        style("ℹ").blue(),
        patterns.len(),
        document_files.len()
    );

    let mut evaluator = PatternEvaluator::new().with_config(config);
    if let Some(path) = &args.catalog {
        let catalog: Catalog = super::read_json(path)?;
        evaluator = evaluator.with_lookup(Arc::new(catalog));
    }

    let evaluator = Arc::new(evaluator);
    let patterns = Arc::new(patterns);
    let semaphore = Arc::new(Semaphore::new(jobs));

    let pb = ProgressBar::new(document_files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut tasks = Vec::with_capacity(document_files.len());
    for path in document_files {
        let permit = semaphore.clone().acquire_owned().await?;
        let evaluator = evaluator.clone();
        let patterns = patterns.clone();

        tasks.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            classify_file(&path, &evaluator, &patterns).map_err(|e| (path, e))
        }));
    }

    let mut results = ProcessingResults::new();
    let mut skipped = 0usize;
    let mut failed: Vec<(PathBuf, String)> = Vec::new();

    for task in tasks {
        match task.await? {
            Ok(Some(document_results)) => results.merge(document_results),
            Ok(None) => skipped += 1,
            Err((path, e)) => {
                if args.continue_on_error {
                    warn!("Failed to read {}: {}", path.display(), e);
                    failed.push((path, e.to_string()));
                } else {
                    error!("Failed to read {}: {}", path.display(), e);
                    pb.abandon();
                    anyhow::bail!("Processing failed for {}: {}", path.display(), e);
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if let Some(output_path) = &args.output {
        fs::write(output_path, serde_json::to_string_pretty(&results)?)?;
        println!(
            "{} Results written to {}",
            style("✓").green(),
            output_path.display()
        );
    }

    print_summary(&results, skipped, &failed, start);

    Ok(())
}

/// Expand a glob, keeping only JSON files.
fn expand(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", pattern);
    }
    Ok(files)
}

/// Classify one document file. Returns `None` when the document is not eligible.
fn classify_file(
    path: &Path,
    evaluator: &PatternEvaluator,
    patterns: &[Pattern],
) -> anyhow::Result<Option<ProcessingResults>> {
    let document: Document = super::read_json(path)?;

    if !evaluator.accepts(&document) {
        debug!("Skipping document {}: missing required tags", document.id);
        return Ok(None);
    }

    Ok(Some(evaluator.classify(patterns, &document)))
}

fn print_summary(
    results: &ProcessingResults,
    skipped: usize,
    failed: &[(PathBuf, String)],
    start: Instant,
) {
    println!();
    println!(
        "{} Classified {} documents in {:?}",
        style("✓").green(),
        results.matched.len() + results.unmatched.len(),
        start.elapsed()
    );
    println!(
        "   {} matched, {} unmatched, {} pattern errors, {} skipped",
        style(results.matched.len()).green(),
        style(results.unmatched.len()).yellow(),
        style(results.errors.len()).red(),
        skipped
    );

    let multi = results.multi_matched();
    if !multi.is_empty() {
        println!();
        println!("{}", style("Matched by more than one pattern:").yellow());
        for id in multi {
            println!("  - {}: {}", id, results.matched[&id].join(", "));
        }
    }

    if !results.errors.is_empty() {
        println!();
        println!("{}", style("Pattern errors:").red());
        for e in &results.errors {
            println!(
                "  - {} ({}) / {}: {}",
                e.document.title, e.document.id, e.pattern_name, e.error
            );
        }
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (path, error) in failed {
            println!("  - {}: {}", path.display(), error);
        }
    }
}
