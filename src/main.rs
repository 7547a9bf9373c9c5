//! dirmanifest - directory-tree manifests with validated rollups.
//!
//! Usage:
//!   dirmanifest [PATH]                 Scan, roll up, validate, write JSON or YAML
//!   dirmanifest scan [PATH]            Same as above
//!   dirmanifest rollup NODES           Build rollups for a JSON node list
//!   dirmanifest validate MANIFEST      Check a manifest against its capabilities
//!   dirmanifest --help                 Show help

mod config;

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use dirmanifest_check::{CapabilityRegistry, Validator, report};
use dirmanifest_core::{Manifest, Node};
use dirmanifest_rollup::RollupAggregator;
use dirmanifest_scan::{ManifestScanner, verify_skip_isolation};

use crate::config::{AppConfig, OutputFormat, OutputSettings};

#[derive(Parser)]
#[command(
    name = "dirmanifest",
    version,
    about = "Directory-tree manifests with rollup statistics",
    long_about = "dirmanifest walks a directory tree, attaches per-directory rollup \
                  statistics, proves the declared statistics are consistent and \
                  writes the result as a JSON or YAML manifest."
)]
struct Cli {
    /// Directory to scan (overrides the config file)
    path: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Skip capability validation
    #[arg(long, global = true)]
    no_validate: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory and write its manifest
    Scan {
        /// Directory to scan
        path: Option<PathBuf>,
    },

    /// Aggregate a JSON node list into a manifest
    Rollup {
        /// JSON array of nodes
        nodes: PathBuf,
    },

    /// Validate a manifest against its declared capabilities
    Validate {
        /// Manifest JSON file
        manifest: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(output) = cli.output {
        config.output.file = Some(output);
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if cli.no_validate {
        config.validate.enabled = false;
    }

    match cli.command {
        Some(Command::Scan { path }) => run_scan(config, path.or(cli.path)),
        Some(Command::Rollup { nodes }) => run_rollup(config, &nodes),
        Some(Command::Validate { manifest }) => run_validate(&manifest),
        None => run_scan(config, cli.path),
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Scan, roll up, validate and write a manifest.
fn run_scan(mut config: AppConfig, path: Option<PathBuf>) -> Result<()> {
    if let Some(path) = path {
        config.scanner.root = path;
    }

    let output = ManifestScanner::new()
        .scan(&config.scanner)
        .wrap_err_with(|| format!("Scan of {} failed", config.scanner.root.display()))?;

    if !output.skipped.is_empty() {
        tracing::info!(count = output.skipped.len(), "entries skipped");
        verify_skip_isolation(&output.nodes, &output.skipped)
            .wrap_err("Skipped entries leaked into the manifest")?;
    }

    let mut manifest = output.into_manifest();
    finish(&config, &mut manifest)
}

/// Build a manifest from a node list produced elsewhere.
fn run_rollup(config: AppConfig, nodes_path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(nodes_path)
        .wrap_err_with(|| format!("Failed to read {}", nodes_path.display()))?;
    let nodes: Vec<Node> = serde_json::from_str(&content)
        .wrap_err_with(|| format!("Invalid node list {}", nodes_path.display()))?;

    let root = nodes_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    let mut manifest = Manifest::new(root, nodes, Vec::new());
    finish(&config, &mut manifest)
}

/// Validate an existing manifest file.
fn run_validate(manifest_path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(manifest_path)
        .wrap_err_with(|| format!("Failed to read {}", manifest_path.display()))?;
    let manifest: Manifest = serde_json::from_str(&content)
        .wrap_err_with(|| format!("Invalid manifest {}", manifest_path.display()))?;

    check(&manifest)?;
    tracing::info!(
        path = %manifest_path.display(),
        directories = manifest.dir_count(),
        "manifest is consistent with its capabilities"
    );
    Ok(())
}

/// Shared tail of `scan` and `rollup`: aggregate, validate, write.
fn finish(config: &AppConfig, manifest: &mut Manifest) -> Result<()> {
    if config.rollup.enabled {
        let aggregator = RollupAggregator::new(config.rollup_options());
        let rolled = aggregator
            .apply(manifest)
            .wrap_err("Failed to build rollups")?;
        tracing::debug!(directories = rolled, "rollups attached");

        if config.validate.enabled {
            check(manifest)?;
        }
    }

    log_totals(manifest);
    write_manifest(manifest, &config.output)
}

/// Run the standard registry over a manifest and log the outcome.
fn check(manifest: &Manifest) -> Result<()> {
    let registry = CapabilityRegistry::standard();
    let report = Validator::new(&registry).validate_manifest(manifest);
    report::log_report(&report);

    report
        .into_result()
        .wrap_err("Manifest failed capability validation")?;
    Ok(())
}

fn log_totals(manifest: &Manifest) {
    let total_bytes = manifest
        .find(dirmanifest_core::path::ROOT)
        .and_then(|root| root.rollup.as_ref())
        .and_then(|rollup| rollup.size.as_ref())
        .map(|size| size.total);

    tracing::info!(
        files = manifest.file_count(),
        directories = manifest.dir_count(),
        skipped = manifest.skipped.len(),
        total = total_bytes.map(format_size).as_deref().unwrap_or("-"),
        "manifest built"
    );
}

fn write_manifest(manifest: &Manifest, output: &OutputSettings) -> Result<()> {
    let text = match output.format {
        OutputFormat::Json if output.pretty => serde_json::to_string_pretty(manifest)?,
        OutputFormat::Json => serde_json::to_string(manifest)?,
        OutputFormat::Yaml => serde_yaml::to_string(manifest)?,
    };

    match output.file.as_deref() {
        Some(path) => {
            std::fs::write(path, text)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "manifest written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
