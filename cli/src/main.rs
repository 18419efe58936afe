use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use topicguard_kernel::adapters::snapshot::SnapshotDocument;
use topicguard_kernel::check::{check_file, FileReport, TopicReport};
use topicguard_kernel::config::PolicyConfig;
use topicguard_kernel::fix::apply_fixes;
use topicguard_kernel::rules::RuleSet;

/// Topicguard CLI
#[derive(Parser, Debug)]
#[command(name = "topicguard")]
#[command(about = "Kafka topic configuration policy checks", long_about = None)]
struct Cli {
    /// Path to the parser snapshot JSON (one file or a list of files)
    #[arg(long)]
    snapshot: PathBuf,

    /// Path to policy config JSON
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Apply proposed fixes to the source files named in the snapshot
    #[arg(long)]
    fix: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

/// Wrapper for JSON output
#[derive(Debug, Serialize)]
struct CliOutput {
    files: Vec<FileOutput>,
    issues: usize,
    unfixed: usize,
}

#[derive(Debug, Serialize)]
struct FileOutput {
    filename: String,
    topics: Vec<TopicReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
    fixed: bool,
}

fn initialize_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the report
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}

fn load_policy(path: Option<&Path>) -> Result<PolicyConfig> {
    let Some(path) = path else {
        return Ok(PolicyConfig::default_policy());
    };
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading policy {}", path.display()))?;
    PolicyConfig::from_json(&data).with_context(|| format!("loading policy {}", path.display()))
}

/// Rewrite the source file behind `report` with all its fixes applied.
fn fix_file(base: &Path, report: &FileReport) -> Result<bool> {
    if report.fixes().next().is_none() {
        return Ok(false);
    }

    let path = base.join(&report.filename);
    let source = fs::read_to_string(&path)
        .with_context(|| format!("reading source {}", path.display()))?;
    let fixed = apply_fixes(&source, report.fixes())
        .with_context(|| format!("fixing {}", path.display()))?;
    fs::write(&path, fixed).with_context(|| format!("writing {}", path.display()))?;

    tracing::info!(file = %path.display(), "fixes applied");
    Ok(true)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    initialize_tracing(cli.log_json);

    // ----------------------------
    // Load Policy
    // ----------------------------
    let policy = load_policy(cli.policy.as_deref())?;
    let rules = RuleSet::standard(&policy);
    tracing::debug!(rules = ?rules.names(), "rule set ready");

    // ----------------------------
    // Load snapshot
    // ----------------------------
    let snapshot = fs::read_to_string(&cli.snapshot)
        .with_context(|| format!("reading snapshot {}", cli.snapshot.display()))?;
    let files = SnapshotDocument::from_json(&snapshot)?.into_source_files()?;

    // source paths are relative to the snapshot
    let base = cli
        .snapshot
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    // ----------------------------
    // Check (and fix)
    // ----------------------------
    let mut output = CliOutput {
        files: Vec::with_capacity(files.len()),
        issues: 0,
        unfixed: 0,
    };

    for file in &files {
        let report = check_file(file, &rules, &policy);
        let fixed = cli.fix && fix_file(&base, &report)?;

        let unfixable = report
            .topics
            .iter()
            .flat_map(|topic| &topic.issues)
            .filter(|issue| !fixed || issue.fix.is_none())
            .count();

        output.issues += report.issue_count();
        output.unfixed += unfixable + report.errors.len();
        output.files.push(FileOutput {
            filename: report.filename,
            topics: report.topics,
            errors: report.errors.iter().map(ToString::to_string).collect(),
            fixed,
        });
    }

    // ----------------------------
    // Output
    // ----------------------------
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(if output.unfixed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
