//! Download progress reporting
//!
//! This module handles:
//! - Per-download state (size, bytes received, speed, time left)
//! - A bounded log of recent run messages
//! - Redraw throttling under many concurrent downloads
//! - Pluggable presentation through [`ProgressRenderer`]
//!
//! A single [`ProgressReporter`] is created per run and passed to every task.
//! Which renderer it drives is chosen by the caller: the live
//! [`TerminalRenderer`], the line-oriented [`PlainRenderer`], the no-op
//! [`SilentRenderer`], or any other implementation.

pub mod format;
mod info;
mod plain;
mod reporter;
mod terminal;
mod traits;

pub use info::ProgressInfo;
pub use plain::{PlainRenderer, SilentRenderer};
pub use reporter::{ProgressReporter, MAX_LOG_LINES, REDRAW_INTERVAL};
pub use terminal::TerminalRenderer;
pub use traits::{ProgressEvent, ProgressRenderer, ProgressView, Transfer};
