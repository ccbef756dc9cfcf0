use super::info::ProgressInfo;
use std::collections::VecDeque;
use std::time::Duration;

/// A change in reporter state, handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A download started
    Started { key: String, total: Option<u64> },

    /// A download received more bytes
    Advanced {
        key: String,
        downloaded: u64,
        total: Option<u64>,
    },

    /// A download finished and left the in-flight set
    Finished {
        key: String,
        downloaded: u64,
        elapsed: Duration,
    },

    /// A run log line
    Log(String),

    /// A run log line about a resource that was skipped or failed
    Warning(String),
}

/// One in-flight download as seen by a renderer
#[derive(Debug, Clone)]
pub struct Transfer {
    /// Resource key (the requested URL)
    pub key: String,

    /// Current download state
    pub info: ProgressInfo,
}

/// Snapshot of the reporter state at the time of an event
#[derive(Debug, Clone, Copy)]
pub struct ProgressView<'a> {
    /// Most recent log lines, oldest first
    pub logs: &'a VecDeque<String>,

    /// In-flight downloads in registration order
    pub transfers: &'a [Transfer],
}

/// Presentation of reporter events
///
/// The reporter serializes calls, so implementations never see two events at
/// once.
pub trait ProgressRenderer: Send {
    /// Presents one event together with the state it produced
    fn render(&mut self, event: &ProgressEvent, view: ProgressView<'_>);

    /// Releases the display at the end of a run
    fn finish(&mut self) {}
}
