use super::info::ProgressInfo;
use super::traits::{ProgressEvent, ProgressRenderer, ProgressView, Transfer};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Number of run log lines kept for display
pub const MAX_LOG_LINES: usize = 8;

/// Minimum time between two draws of the same download
pub const REDRAW_INTERVAL: Duration = Duration::from_millis(200);

struct ReporterState {
    transfers: Vec<Transfer>,
    logs: VecDeque<String>,
    renderer: Box<dyn ProgressRenderer>,
}

impl ReporterState {
    fn position(&self, key: &str) -> Option<usize> {
        self.transfers.iter().position(|t| t.key == key)
    }

    fn emit(&mut self, event: ProgressEvent) {
        let view = ProgressView {
            logs: &self.logs,
            transfers: &self.transfers,
        };
        self.renderer.render(&event, view);
    }
}

/// Tracks every in-flight download of a run and drives a renderer
///
/// One reporter is built per run and shared by reference with every task that
/// downloads or logs. All state sits behind a single lock, so renderer output
/// from concurrent downloads never interleaves.
///
/// # Example
///
/// ```
/// use webmirror::progress::{ProgressReporter, SilentRenderer};
///
/// let reporter = ProgressReporter::new(Box::new(SilentRenderer));
/// reporter.register("https://example.com/a.png", Some(2048));
/// reporter.update("https://example.com/a.png", 1024);
/// assert_eq!(reporter.in_flight(), 1);
/// reporter.complete("https://example.com/a.png");
/// assert_eq!(reporter.in_flight(), 0);
/// ```
pub struct ProgressReporter {
    state: Mutex<ReporterState>,
}

impl ProgressReporter {
    /// Creates a reporter drawing through `renderer`
    pub fn new(renderer: Box<dyn ProgressRenderer>) -> Self {
        Self {
            state: Mutex::new(ReporterState {
                transfers: Vec::new(),
                logs: VecDeque::with_capacity(MAX_LOG_LINES),
                renderer,
            }),
        }
    }

    /// Starts tracking a download of `total` bytes (None if unknown)
    ///
    /// Registering a key that is already tracked restarts it.
    pub fn register(&self, key: &str, total: Option<u64>) {
        let mut state = self.lock();
        let info = ProgressInfo::new(total);
        let total = info.total;

        match state.position(key) {
            Some(index) => state.transfers[index].info = info,
            None => state.transfers.push(Transfer {
                key: key.to_string(),
                info,
            }),
        }

        state.emit(ProgressEvent::Started {
            key: key.to_string(),
            total,
        });
    }

    /// Records that `downloaded` bytes of `key` have arrived so far
    ///
    /// The draw is skipped when the same download was drawn less than
    /// [`REDRAW_INTERVAL`] ago, unless it is the only one in flight or it just
    /// reached its total.
    pub fn update(&self, key: &str, downloaded: u64) {
        let mut state = self.lock();
        let Some(index) = state.position(key) else {
            tracing::trace!("Progress update for untracked download {}", key);
            return;
        };

        let sole = state.transfers.len() == 1;
        let now = Instant::now();
        let info = &mut state.transfers[index].info;
        info.record(downloaded, now);

        let recently_drawn = now.saturating_duration_since(info.last_updated) < REDRAW_INTERVAL;
        if recently_drawn && !sole && !info.is_complete() {
            return;
        }
        info.last_updated = now;
        let total = info.total;

        state.emit(ProgressEvent::Advanced {
            key: key.to_string(),
            downloaded,
            total,
        });
    }

    /// Stops tracking `key`
    pub fn complete(&self, key: &str) {
        let mut state = self.lock();
        let Some(index) = state.position(key) else {
            return;
        };

        let transfer = state.transfers.remove(index);
        state.emit(ProgressEvent::Finished {
            key: transfer.key,
            downloaded: transfer.info.downloaded,
            elapsed: transfer.info.elapsed(),
        });
    }

    /// Appends a line to the run log
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        self.push_log(message.clone(), ProgressEvent::Log(message));
    }

    /// Appends a warning to the run log
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        self.push_log(format!("Warning: {}", message), ProgressEvent::Warning(message));
    }

    /// Number of downloads currently tracked
    pub fn in_flight(&self) -> usize {
        self.lock().transfers.len()
    }

    /// Copy of the retained log lines, oldest first
    pub fn recent_logs(&self) -> Vec<String> {
        self.lock().logs.iter().cloned().collect()
    }

    /// Lets the renderer release the display
    pub fn finish(&self) {
        self.lock().renderer.finish();
    }

    fn push_log(&self, line: String, event: ProgressEvent) {
        let mut state = self.lock();
        if state.logs.len() == MAX_LOG_LINES {
            state.logs.pop_front();
        }
        state.logs.push_back(line);
        state.emit(event);
    }

    fn lock(&self) -> MutexGuard<'_, ReporterState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
