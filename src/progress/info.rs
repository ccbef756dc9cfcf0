use std::time::{Duration, Instant};

/// Download state of one in-flight resource
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Expected size from Content-Length, if the server sent one
    pub total: Option<u64>,

    /// Bytes received so far
    pub downloaded: u64,

    /// Average throughput since the start, in bytes per second
    pub speed: f64,

    /// When the download was registered
    pub start_time: Instant,

    /// When the download was last drawn
    pub last_updated: Instant,
}

impl ProgressInfo {
    /// Creates the state for a download that has just started
    pub fn new(total: Option<u64>) -> Self {
        let now = Instant::now();
        Self {
            total: total.filter(|t| *t > 0),
            downloaded: 0,
            speed: 0.0,
            start_time: now,
            last_updated: now,
        }
    }

    /// Records the cumulative byte count and refreshes the average speed
    pub fn record(&mut self, downloaded: u64, now: Instant) {
        self.downloaded = downloaded;
        let elapsed = now.saturating_duration_since(self.start_time).as_secs_f64();
        self.speed = if elapsed > 0.0 {
            downloaded as f64 / elapsed
        } else {
            0.0
        };
    }

    /// Fraction complete in percent, if the total is known
    pub fn percent(&self) -> Option<f64> {
        self.total
            .map(|total| (self.downloaded as f64 / total as f64 * 100.0).min(100.0))
    }

    /// Returns true once every expected byte has arrived
    pub fn is_complete(&self) -> bool {
        self.total.is_some_and(|total| self.downloaded >= total)
    }

    /// Linear extrapolation of the time left at the current average speed
    ///
    /// Undefined until the total is known and some bytes have arrived.
    pub fn remaining(&self) -> Option<Duration> {
        let total = self.total?;
        if self.downloaded == 0 || self.speed <= 0.0 {
            return None;
        }
        let left = total.saturating_sub(self.downloaded) as f64;
        Some(Duration::from_secs_f64(left / self.speed))
    }

    /// Time since the download was registered
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
