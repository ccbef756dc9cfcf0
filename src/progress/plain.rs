use super::traits::{ProgressEvent, ProgressRenderer, ProgressView};
use crate::output::format_bytes;

/// Renderer for non-interactive output
///
/// Log lines become `tracing` events; byte-level progress is only reported when
/// a download finishes.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainRenderer;

impl ProgressRenderer for PlainRenderer {
    fn render(&mut self, event: &ProgressEvent, _view: ProgressView<'_>) {
        match event {
            ProgressEvent::Log(message) => tracing::info!("{}", message),
            ProgressEvent::Warning(message) => tracing::warn!("{}", message),
            ProgressEvent::Started { key, total } => match total {
                Some(total) => tracing::debug!("Receiving {} ({})", key, format_bytes(*total)),
                None => tracing::debug!("Receiving {} (size unknown)", key),
            },
            ProgressEvent::Finished {
                key,
                downloaded,
                elapsed,
            } => tracing::debug!(
                "Received {} ({} in {:.2}s)",
                key,
                format_bytes(*downloaded),
                elapsed.as_secs_f64()
            ),
            ProgressEvent::Advanced { .. } => {}
        }
    }
}

/// Renderer that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentRenderer;

impl ProgressRenderer for SilentRenderer {
    fn render(&mut self, _event: &ProgressEvent, _view: ProgressView<'_>) {}
}
