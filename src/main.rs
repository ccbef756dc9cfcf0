//! Webmirror main entry point
//!
//! This is the command-line interface for the webmirror site mirror.

use anyhow::Context;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use webmirror::config::{load_config, MirrorConfig, RateLimit};
use webmirror::output::print_summary;
use webmirror::progress::{PlainRenderer, ProgressRenderer, ProgressReporter, TerminalRenderer};
use webmirror::{mirror, MirrorError};
use tracing_subscriber::EnvFilter;

/// Webmirror: an offline website mirror
///
/// Webmirror downloads every same-origin resource reachable from a seed URL
/// and writes it to a local tree, optionally rewriting links so the copy can
/// be browsed offline.
#[derive(Parser, Debug)]
#[command(name = "webmirror")]
#[command(version = "1.0.0")]
#[command(about = "Mirror a website for offline browsing", long_about = None)]
struct Cli {
    /// URL to start mirroring from
    #[arg(value_name = "URL")]
    url: String,

    /// Directory the mirrored tree is written under
    #[arg(short = 'P', long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Per-download bandwidth cap, e.g. 200k or 1m
    #[arg(long, value_name = "RATE")]
    rate_limit: Option<RateLimit>,

    /// Rewrite links so the mirror can be browsed offline
    #[arg(short = 'k', long)]
    convert_links: bool,

    /// Keep absolute links even if the config file enables conversion
    #[arg(long, conflicts_with = "convert_links")]
    no_convert_links: bool,

    /// Comma-separated file names or extensions to fetch but not save
    #[arg(short = 'R', long, value_delimiter = ',', value_name = "LIST")]
    reject: Vec<String>,

    /// Comma-separated path prefixes to never fetch
    #[arg(short = 'X', long, value_delimiter = ',', value_name = "LIST")]
    exclude: Vec<String>,

    /// Maximum number of link hops from the seed
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Maximum number of simultaneous downloads
    #[arg(long, value_name = "N")]
    max_concurrent: Option<usize>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Disable the live progress display
    #[arg(long)]
    no_progress: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Builds the run configuration: file values first, then flags on top
    fn into_config(self) -> anyhow::Result<(String, MirrorConfig)> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                load_config(path)
                    .with_context(|| format!("Failed to load configuration from {}", path.display()))?
            }
            None => MirrorConfig::default(),
        };

        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if self.rate_limit.is_some() {
            config.rate_limit = self.rate_limit;
        }
        if self.convert_links {
            config.convert_links = true;
        } else if self.no_convert_links {
            config.convert_links = false;
        }
        config.reject.extend(self.reject);
        config.exclude.extend(self.exclude);
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(max) = self.max_concurrent {
            config.max_concurrent = max;
        }

        Ok((self.url, config))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let interactive = !cli.no_progress && !cli.quiet && std::io::stdout().is_terminal();
    let quiet = cli.quiet;
    let (seed, config) = cli.into_config()?;

    let renderer: Box<dyn ProgressRenderer> = if interactive {
        Box::new(TerminalRenderer::stdout())
    } else {
        Box::new(PlainRenderer)
    };
    let reporter = Arc::new(ProgressReporter::new(renderer));

    tracing::info!(
        "Mirroring {} into {} (max depth {}, {} concurrent{})",
        seed,
        config.output_dir.display(),
        config.max_depth,
        config.max_concurrent,
        config
            .rate_limit
            .map(|limit| format!(", limited to {}", limit))
            .unwrap_or_default()
    );

    let outcome = tokio::select! {
        result = mirror(&seed, config, Arc::clone(&reporter)) => result,
        _ = tokio::signal::ctrl_c() => {
            reporter.finish();
            Err(MirrorError::Interrupted)
        }
    };

    match outcome {
        Ok(summary) => {
            if !quiet {
                print_summary(&summary);
            }
            if summary.failed > 0 {
                tracing::warn!("{} resources could not be mirrored", summary.failed);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Mirror failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webmirror=info,warn"),
            1 => EnvFilter::new("webmirror=debug,info"),
            2 => EnvFilter::new("webmirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}
