//! Mirror coordinator - main crawl orchestration logic
//!
//! This module contains the main loop that coordinates a mirror run:
//! - Validating the seed and preparing the output directory
//! - Draining the frontier with a bounded number of concurrent workers
//! - Fetching, rewriting, and saving each resource
//! - Feeding discovered references back into the frontier
//! - Collecting run statistics

use crate::config::{validate, MirrorConfig};
use crate::crawler::scheduler::{Frontier, ScheduledFetch, Scheduler};
use crate::crawler::{build_http_client, fetch_resource};
use crate::output::{save_resource, MirrorStats, MirrorSummary};
use crate::progress::ProgressReporter;
use crate::rewrite::{rewrite_payload, LinkContext, PayloadKind};
use crate::state::{Claim, CrawlState};
use crate::url::{parse_seed, FilterVerdict, ResourceFilter};
use crate::{MirrorError, Result, UrlError};
use chrono::Local;
use reqwest::Client;
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// Main mirror coordinator structure
pub struct Coordinator {
    seed: Url,
    scheduler: Scheduler,
    frontier: Arc<Frontier>,
    worker: Arc<Worker>,
}

/// Everything a worker needs to process one resource
struct Worker {
    config: MirrorConfig,
    client: Client,
    state: CrawlState,
    reporter: Arc<ProgressReporter>,
    stats: MirrorStats,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `seed` - The URL to start mirroring from
    /// * `config` - The mirror configuration
    /// * `reporter` - Progress reporter shared by every worker of the run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(MirrorError)` - Invalid configuration or seed, the output
    ///   directory could not be created, or the HTTP client failed to build
    pub fn new(seed: &str, config: MirrorConfig, reporter: Arc<ProgressReporter>) -> Result<Self> {
        validate(&config)?;
        let seed = parse_seed(seed)?;

        std::fs::create_dir_all(&config.output_dir).map_err(|source| MirrorError::OutputDir {
            path: config.output_dir.clone(),
            source,
        })?;

        let client = build_http_client(&config)?;
        let filter = ResourceFilter::new(&config.reject, &config.exclude);
        let state =
            CrawlState::new(&seed, config.max_depth, filter).ok_or(UrlError::MissingHost)?;
        let (scheduler, frontier) = Scheduler::new(config.max_concurrent);

        Ok(Self {
            seed,
            scheduler,
            frontier,
            worker: Arc::new(Worker {
                config,
                client,
                state,
                reporter,
                stats: MirrorStats::new(),
            }),
        })
    }

    /// Runs the mirror until no resource is queued or in flight
    ///
    /// Per-resource failures are logged and counted; they never end the run.
    pub async fn run(mut self) -> Result<MirrorSummary> {
        let started_at = Local::now();
        let worker = Arc::clone(&self.worker);

        tracing::info!("Starting mirror run of {}", self.seed);
        worker.reporter.log(format!("Starting mirror of {}", self.seed));
        worker.reporter.log(format!(
            "Output directory: {}",
            worker.config.output_dir.display()
        ));

        match worker.state.try_claim(&self.seed, 0) {
            Claim::Accepted(task) => {
                self.frontier.push(task);
            }
            other => worker.skip(&self.seed, &other),
        }

        let mut tasks = JoinSet::new();
        while let Some(fetch) = self.scheduler.next().await {
            let worker = Arc::clone(&worker);
            let frontier = Arc::clone(&self.frontier);
            tasks.spawn(async move { worker.process(fetch, &frontier).await });

            while let Some(joined) = tasks.try_join_next() {
                log_join_failure(joined);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            log_join_failure(joined);
        }

        let finished_at = Local::now();
        let summary = worker.stats.summarize(
            self.seed.as_str(),
            worker.config.output_dir.clone(),
            started_at,
            finished_at,
        );

        worker.reporter.log(format!(
            "Finished mirror of {}: {} fetched, {} saved, {} failed",
            self.seed, summary.fetched, summary.saved, summary.failed
        ));
        worker.reporter.finish();
        tracing::info!(
            "Mirror run complete: {} resources claimed in {:.1}s",
            worker.state.visited_count(),
            summary.duration.as_secs_f64()
        );

        Ok(summary)
    }
}

fn log_join_failure(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!("Mirror worker failed: {}", e);
    }
}

impl Worker {
    /// Processes one resource from fetch to disk
    ///
    /// Holding `fetch` until the end keeps the concurrency permit and marks the
    /// resource in flight until its children are queued.
    async fn process(&self, fetch: ScheduledFetch, frontier: &Frontier) {
        let task = &fetch.task;
        let Some(_depth) = self.state.enter(task.depth) else {
            tracing::debug!("Not entering {} beyond max depth", task.url);
            return;
        };

        self.reporter.log(format!("Downloading {}", task.url));

        let fetched = match fetch_resource(
            &self.client,
            &task.url,
            &self.reporter,
            self.config.rate_limit,
        )
        .await
        {
            Ok(fetched) => fetched,
            Err(e) => {
                self.stats.record_failed();
                self.reporter.warn(format!("Skipping {}", e));
                return;
            }
        };
        self.stats.record_fetched(fetched.body.len() as u64);

        let mut body = fetched.body;
        if let Some(kind) = PayloadKind::from_content_type(&fetched.content_type) {
            let ctx = LinkContext {
                source: &task.url,
                base_host: self.state.base_host(),
                convert_links: self.config.convert_links,
            };

            match rewrite_payload(kind, &body, &ctx) {
                Ok(rewritten) => {
                    for warning in &rewritten.warnings {
                        self.reporter.warn(warning.as_str());
                    }
                    self.enqueue(&rewritten.references, task.depth + 1, frontier);
                    body = rewritten.body;
                }
                Err(source) => {
                    let e = MirrorError::Rewrite {
                        url: task.url.to_string(),
                        source,
                    };
                    self.reporter.warn(format!("{}; keeping original bytes", e));
                }
            }
        }

        if !task.save {
            self.stats.record_not_saved();
            tracing::debug!("Not saving rejected resource {}", task.url);
            return;
        }

        match save_resource(&self.config.output_dir, &task.url, &body).await {
            Ok(path) => {
                self.stats.record_saved();
                tracing::debug!("Saved {} to {}", task.url, path.display());
            }
            Err(e) => {
                self.stats.record_failed();
                self.reporter.warn(e.to_string());
            }
        }
    }

    /// Claims and queues the references found in one document
    fn enqueue(&self, references: &[Url], depth: u32, frontier: &Frontier) {
        for reference in references {
            match self.state.try_claim(reference, depth) {
                Claim::Accepted(task) => {
                    if !frontier.push(task) {
                        tracing::debug!("Frontier closed; dropping {}", reference);
                    }
                }
                other => self.skip(reference, &other),
            }
        }
    }

    /// Records why a reference was not queued
    fn skip(&self, url: &Url, claim: &Claim) {
        match claim {
            Claim::Filtered(FilterVerdict::Script) => {
                self.stats.record_skipped();
                tracing::debug!("Skipping script path {}", url);
            }
            Claim::Filtered(verdict) => {
                self.stats.record_skipped();
                tracing::debug!("Skipping filtered {} ({:?})", url, verdict);
            }
            Claim::TooDeep => {
                tracing::debug!("Skipping {}: beyond max depth {}", url, self.state.max_depth())
            }
            Claim::External => tracing::debug!("Skipping external {}", url),
            Claim::AlreadyVisited | Claim::Accepted(_) => {}
        }
    }
}

/// Mirrors the site at `seed` into `config.output_dir`
///
/// This is the main entry point for a mirror run. It will:
/// 1. Validate the configuration and the seed URL
/// 2. Create the output directory
/// 3. Build the HTTP client
/// 4. Fetch, rewrite, and store every reachable same-origin resource
/// 5. Return the run statistics
///
/// # Arguments
///
/// * `seed` - The URL to start from
/// * `config` - The mirror configuration
/// * `reporter` - Progress reporter for the run
///
/// # Returns
///
/// * `Ok(MirrorSummary)` - The run finished (individual resources may have failed)
/// * `Err(MirrorError)` - The run could not start
pub async fn mirror(
    seed: &str,
    config: MirrorConfig,
    reporter: Arc<ProgressReporter>,
) -> Result<MirrorSummary> {
    Coordinator::new(seed, config, reporter)?.run().await
}
