use crate::progress::ProgressReporter;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

/// Wraps an `AsyncWrite` and reports the running byte count of one download
pub struct ProgressWriter<W> {
    inner: W,
    reporter: Arc<ProgressReporter>,
    key: String,
    written: u64,
}

impl<W> ProgressWriter<W> {
    /// Creates a writer reporting under `key`
    ///
    /// The key must already be registered with the reporter.
    pub fn new(inner: W, reporter: Arc<ProgressReporter>, key: impl Into<String>) -> Self {
        Self {
            inner,
            reporter,
            key: key.into(),
            written: 0,
        }
    }

    /// Bytes written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Returns a reference to the wrapped writer
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Returns a mutable reference to the wrapped writer
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consumes the writer and returns the wrapped one
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: AsyncWrite + Unpin> AsyncWrite for ProgressWriter<W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_write(cx, buf);

        if let Poll::Ready(Ok(n)) = poll {
            if n > 0 {
                this.written += n as u64;
                this.reporter.update(&this.key, this.written);
            }
        }
        poll
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
