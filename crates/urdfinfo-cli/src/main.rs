//! urdfinfo - Print chain, joint limit, and segment information from a URDF file
//!
//! Reports go to stdout in the order chain, limits, segments, summary.
//! Logs and errors go to stderr.

mod config;

use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;
use urdfinfo_core::{urdf, ReportKind};

#[derive(Parser, Debug)]
#[command(name = "urdfinfo")]
#[command(about = "Print chain, joint limit, and segment information from a URDF file")]
#[command(version)]
struct Args {
    /// Path to URDF file to parse
    #[arg(short, long)]
    file: PathBuf,

    /// Print joint chain information
    #[arg(short, long)]
    chain: bool,

    /// Print joint limit information
    #[arg(short, long)]
    limits: bool,

    /// Print segment (link) names
    #[arg(short, long)]
    segments: bool,

    /// Print every link and joint name
    #[arg(long)]
    summary: bool,

    /// Path to configuration file
    #[arg(long, default_value = "urdfinfo.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// Reports selected on the command line, in declaration order
    fn requested_reports(&self) -> Vec<ReportKind> {
        [
            (self.chain, ReportKind::Chain),
            (self.limits, ReportKind::Limits),
            (self.segments, ReportKind::Segments),
            (self.summary, ReportKind::Summary),
        ]
        .into_iter()
        .filter_map(|(on, kind)| on.then_some(kind))
        .collect()
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = config::load_config(&args.config)?;
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match &config.source {
        Some(path) => info!(path = %path.display(), "Loaded configuration"),
        None => info!(
            path = %args.config.display(),
            "Configuration file not found, using defaults"
        ),
    }

    let mut reports = args.requested_reports();
    if reports.is_empty() {
        reports = config.output.default_reports.clone();
    }
    debug!(?reports, file = %args.file.display(), "Reports requested");

    let stdout = std::io::stdout();
    run(&args.file, &reports, &mut stdout.lock())
}

/// Load `file` and write each requested report to `out`
///
/// Nothing is written unless the document loads successfully.
fn run<W: Write>(file: &Path, reports: &[ReportKind], out: &mut W) -> Result<()> {
    let document = urdf::load(file).map_err(|e| {
        let action = if e.is_document_error() { "parse" } else { "read" };
        anyhow::Error::new(e).context(format!("Failed to {} URDF {}", action, file.display()))
    })?;

    for (i, kind) in reports.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        for line in kind.render(&document) {
            writeln!(out, "{}", line)?;
        }
    }
    out.flush()?;
    Ok(())
}
