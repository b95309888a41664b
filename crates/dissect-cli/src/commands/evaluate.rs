//! Evaluate command - run one pattern against one document.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;
use tracing::info;

use dissect_core::lookup::unknown_names;
use dissect_core::models::{Check, Document, Pattern, PatternEvaluationResult};
use dissect_core::{Catalog, CheckResult, PatternEvaluator};

/// Arguments for the evaluate command.
#[derive(Args)]
pub struct EvaluateArgs {
    /// Pattern JSON file
    #[arg(short, long)]
    pattern: PathBuf,

    /// Document JSON file
    #[arg(short, long)]
    document: PathBuf,

    /// Catalog JSON file with tags, correspondents, and custom fields
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: EvaluateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let pattern: Pattern = super::read_json(&args.pattern)?;
    let document: Document = super::read_json(&args.document)?;

    info!("Evaluating pattern {:?} on document {}", pattern.name, document.id);

    let mut evaluator = PatternEvaluator::new().with_config(config);
    if let Some(path) = &args.catalog {
        let catalog: Catalog = super::read_json(path)?;
        for unknown in unknown_names(&pattern, &catalog) {
            eprintln!(
                "{} Unknown {} name: {}",
                style("⚠").yellow(),
                unknown.category,
                unknown.name
            );
        }
        evaluator = evaluator.with_lookup(Arc::new(catalog));
    }

    let result = evaluator.evaluate_pattern(&pattern, &document);

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&result)?,
        OutputFormat::Text => format_text(&pattern, &result),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn format_text(pattern: &Pattern, result: &PatternEvaluationResult) -> String {
    let mut lines = Vec::new();

    let verdict = if result.matches() {
        style("MATCH").green().bold()
    } else {
        style("NO MATCH").red().bold()
    };
    lines.push(format!("Pattern: {} - {}", pattern.name, verdict));

    if !pattern.checks.is_empty() {
        lines.push(String::new());
        lines.push("Checks:".to_string());
        for (check, check_result) in pattern.checks.iter().zip(&result.checks) {
            format_check(check, check_result, 1, &mut lines);
        }
    }

    if !result.regions.is_empty() {
        lines.push(String::new());
        lines.push("Regions:".to_string());
        for (index, retained) in result.retained().into_iter().enumerate() {
            let summary = match retained {
                Some(r) if r.error.is_some() => {
                    format!("error: {}", r.error.as_deref().unwrap_or_default())
                }
                Some(r) => match &r.group_values {
                    Some(values) if !values.is_empty() => values
                        .iter()
                        .map(|(k, v)| format!("{}={:?}", k, v))
                        .collect::<Vec<_>>()
                        .join(", "),
                    Some(_) => "matched".to_string(),
                    None => "no match".to_string(),
                },
                None => "nothing retained".to_string(),
            };
            lines.push(format!("  [{}] {}", index, summary));
        }
    }

    if !pattern.fields.is_empty() {
        lines.push(String::new());
        lines.push("Fields:".to_string());
        for (field, field_result) in pattern.fields.iter().zip(&result.fields) {
            let summary = match field_result {
                None => "-".to_string(),
                Some(r) => {
                    let mut s = r.value.clone().unwrap_or_default();
                    if let Some(data_type) = &r.data_type {
                        s.push_str(&format!(" ({})", data_type));
                    }
                    if let Some(error) = &r.error {
                        s.push_str(&format!(" {}", style(error).red()));
                    }
                    s
                }
            };
            lines.push(format!("  {}: {}", field.name, summary));
        }
    }

    lines.join("\n")
}

fn format_check(check: &Check, result: &CheckResult, depth: usize, lines: &mut Vec<String>) {
    let mark = if result.passed {
        style("✓").green()
    } else {
        style("✗").red()
    };
    let mut line = format!("{}{} {}", "  ".repeat(depth), mark, describe(check));
    if let Some(error) = &result.error {
        line.push_str(&format!(" - {}", style(error).red()));
    }
    lines.push(line);

    let children: Vec<&Check> = match check {
        Check::And { checks } | Check::Or { checks } => checks.iter().collect(),
        Check::Not { check: Some(child) } => vec![&**child],
        _ => Vec::new(),
    };
    for (child, child_result) in children.into_iter().zip(&result.children) {
        format_check(child, child_result, depth + 1, lines);
    }
}

fn describe(check: &Check) -> String {
    match check {
        Check::NumPages { num_pages } => format!("num_pages = {}", num_pages),
        Check::RegionPredicate(region) => {
            format!("region {:?} ({:?})", region.expr.active().source(), region.page)
        }
        Check::Title { regex } => format!("title ~ /{}/", regex),
        Check::Correspondent { name } => format!("correspondent = {:?}", name),
        Check::DocumentType { name } => format!("document_type = {:?}", name),
        Check::StoragePath { name } => format!("storage_path = {:?}", name),
        Check::Tags { includes, excludes } => {
            format!("tags +{:?} -{:?}", includes, excludes)
        }
        Check::DateCreated { before, after, year } => {
            format!("date_created before={:?} after={:?} year={:?}", before, after, year)
        }
        Check::And { .. } => "and".to_string(),
        Check::Or { .. } => "or".to_string(),
        Check::Not { .. } => "not".to_string(),
    }
}
