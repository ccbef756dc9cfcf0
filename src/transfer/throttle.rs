//! Bandwidth-limited writer
//!
//! Each write of `n` bytes is followed by a sleep of
//! `max(0, n / bandwidth - elapsed)`, so the long-run average converges to the
//! configured rate. Instances pace independently; there is no bucket shared
//! between concurrent downloads.

use crate::config::RateLimit;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::AsyncWrite;
use tokio::time::{Instant, Sleep};

/// Write accepted by the inner writer but still being paced
struct Pacing {
    sleep: Pin<Box<Sleep>>,
    written: usize,
}

/// Wraps an `AsyncWrite` and throttles it to a fixed bandwidth
///
/// A write that has reached the inner writer but is still sleeping reports
/// `Poll::Pending`; the caller must poll again with the same buffer, which is
/// what `AsyncWriteExt::write_all` does.
///
/// # Example
///
/// ```no_run
/// use tokio::io::AsyncWriteExt;
/// use webmirror::config::RateLimit;
/// use webmirror::transfer::RateLimitedWriter;
///
/// # async fn run() -> std::io::Result<()> {
/// let limit: RateLimit = "10k".parse().unwrap();
/// let mut writer = RateLimitedWriter::new(Vec::new(), limit);
/// writer.write_all(&[0u8; 20 * 1024]).await?; // takes about two seconds
/// # Ok(())
/// # }
/// ```
pub struct RateLimitedWriter<W> {
    inner: W,
    bytes_per_sec: u64,
    write_started: Option<Instant>,
    pacing: Option<Pacing>,
}

impl<W> RateLimitedWriter<W> {
    /// Creates a writer limited to `limit`
    pub fn new(inner: W, limit: RateLimit) -> Self {
        Self {
            inner,
            bytes_per_sec: limit.bytes_per_sec(),
            write_started: None,
            pacing: None,
        }
    }

    /// Returns the configured bandwidth in bytes per second
    pub fn bytes_per_sec(&self) -> u64 {
        self.bytes_per_sec
    }

    /// Returns a reference to the wrapped writer
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Consumes the limiter and returns the wrapped writer
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Time a write of `n` bytes should take at the configured bandwidth
    fn expected_duration(&self, n: usize) -> Duration {
        Duration::from_secs_f64(n as f64 / self.bytes_per_sec as f64)
    }
}

impl<W: AsyncWrite + Unpin> AsyncWrite for RateLimitedWriter<W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();

        if let Some(pacing) = this.pacing.as_mut() {
            if pacing.sleep.as_mut().poll(cx).is_pending() {
                return Poll::Pending;
            }
            let written = pacing.written;
            this.pacing = None;
            return Poll::Ready(Ok(written));
        }

        let started = *this.write_started.get_or_insert_with(Instant::now);

        let written = match Pin::new(&mut this.inner).poll_write(cx, buf) {
            Poll::Ready(Ok(n)) => n,
            other => {
                if other.is_ready() {
                    this.write_started = None;
                }
                return other;
            }
        };
        this.write_started = None;

        let expected = this.expected_duration(written);
        if started.elapsed() >= expected {
            return Poll::Ready(Ok(written));
        }

        let mut sleep = Box::pin(tokio::time::sleep_until(started + expected));
        if sleep.as_mut().poll(cx).is_ready() {
            return Poll::Ready(Ok(written));
        }
        this.pacing = Some(Pacing { sleep, written });
        Poll::Pending
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
