//! CLI entry point replaying a pipeline-emitted artifact report through the
//! rewrite pipeline.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use fingerprint_rewriter::config::ProjectConfig;
use fingerprint_rewriter::models::EmittedArtifact;
use fingerprint_rewriter::{FingerprintRewriter, TOOL_NAME};

/// Rewrite fingerprinted asset references emitted by a build pipeline.
#[derive(Debug, Parser)]
#[command(name = "fingerprint-rewriter", version, about)]
struct Cli {
    /// Build output directory containing the emitted files.
    #[arg(long)]
    output_dir: PathBuf,

    /// JSON report of emitted artifacts and rendered pages.
    #[arg(long)]
    report: PathBuf,

    /// Project configuration file; discovered inside the output directory when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit diagnostic lines while processing.
    #[arg(long)]
    verbose: bool,
}

/// Report handed over by the build pipeline after all files were emitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EmittedReport {
    /// Public path configured in the pipeline, used when the config leaves it unset.
    public_path: Option<String>,
    /// Every emitted artifact, fingerprinted or not.
    artifacts: Vec<ArtifactRecord>,
    /// Rendered HTML outputs, relative to the output directory.
    pages: Vec<String>,
}

/// One artifact line of the emitted report.
#[derive(Debug, Deserialize)]
struct ArtifactRecord {
    name: String,
    #[serde(default)]
    content_hash: Option<String>,
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ProjectConfig::from_path(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => ProjectConfig::discover(&cli.output_dir),
    };

    let mut options = config.into_options()?;
    if cli.verbose {
        options.verbose = true;
    }

    let report_text = fs::read_to_string(&cli.report)
        .with_context(|| format!("failed to read {}", cli.report.display()))?;
    let report: EmittedReport = serde_json::from_str(&report_text)
        .with_context(|| format!("failed to parse {}", cli.report.display()))?;

    let mut rewriter =
        FingerprintRewriter::new(options, &cli.output_dir, report.public_path.as_deref())?;

    for page in &report.pages {
        rewriter.record_page(page);
    }
    for record in report.artifacts {
        let output_path = cli.output_dir.join(&record.name);
        rewriter.record_artifact(&EmittedArtifact {
            name: record.name,
            content_hash: record.content_hash,
            output_path,
        });
    }

    let summary = rewriter.finish()?;
    println!(
        "[{TOOL_NAME}] {} manifest entries, {} files rewritten, {} excluded files restored",
        summary.manifest.len(),
        summary.rewritten,
        summary.restored
    );

    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
