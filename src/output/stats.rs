//! Run statistics
//!
//! This module collects counters while a mirror runs and turns them into a
//! printable summary once it finishes.

use super::format_bytes;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters shared by every task of a run
#[derive(Debug, Default)]
pub struct MirrorStats {
    fetched: AtomicU64,
    saved: AtomicU64,
    not_saved: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    bytes: AtomicU64,
}

impl MirrorStats {
    /// Creates zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful fetch of `bytes` bytes
    pub fn record_fetched(&self, bytes: u64) {
        self.fetched.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records a resource written to disk
    pub fn record_saved(&self) {
        self.saved.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a fetched resource that the reject list kept off disk
    pub fn record_not_saved(&self) {
        self.not_saved.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a reference that was never fetched (excluded or script path)
    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a resource that failed to fetch or save
    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Freezes the counters into a summary
    pub fn summarize(
        &self,
        seed: &str,
        output_dir: PathBuf,
        started_at: DateTime<Local>,
        finished_at: DateTime<Local>,
    ) -> MirrorSummary {
        let duration = (finished_at - started_at).to_std().unwrap_or_default();

        MirrorSummary {
            seed: seed.to_string(),
            output_dir,
            started_at,
            finished_at,
            duration,
            fetched: self.fetched.load(Ordering::Relaxed),
            saved: self.saved.load(Ordering::Relaxed),
            not_saved: self.not_saved.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
        }
    }
}

/// Outcome of a finished mirror run
#[derive(Debug, Clone)]
pub struct MirrorSummary {
    /// Seed URL the run started from
    pub seed: String,

    /// Root of the mirrored tree
    pub output_dir: PathBuf,

    /// When the run started
    pub started_at: DateTime<Local>,

    /// When the run finished
    pub finished_at: DateTime<Local>,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Resources fetched successfully
    pub fetched: u64,

    /// Resources written to disk
    pub saved: u64,

    /// Resources fetched but kept off disk by the reject list
    pub not_saved: u64,

    /// References skipped before fetching (exclude list, script paths)
    pub skipped: u64,

    /// Resources that failed to fetch or save
    pub failed: u64,

    /// Total body bytes received
    pub bytes: u64,
}

impl MirrorSummary {
    /// Average throughput over the run in bytes per second
    pub fn average_speed(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints a summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &MirrorSummary) {
    println!("=== Mirror Summary ===\n");

    println!("Overview:");
    println!("  Seed: {}", summary.seed);
    println!("  Output: {}", summary.output_dir.display());
    println!(
        "  Started: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "  Finished: {}",
        summary.finished_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("  Duration: {:.1}s", summary.duration.as_secs_f64());
    println!();

    println!("Resources:");
    println!("  Fetched: {}", summary.fetched);
    println!("  Saved: {}", summary.saved);
    if summary.not_saved > 0 {
        println!("  Rejected (not saved): {}", summary.not_saved);
    }
    if summary.skipped > 0 {
        println!("  Skipped: {}", summary.skipped);
    }
    if summary.failed > 0 {
        println!("  Failed: {}", summary.failed);
    }
    println!();

    println!(
        "Downloaded {} ({}/s)",
        format_bytes(summary.bytes),
        format_bytes(summary.average_speed() as u64)
    );
}
