//! Writer chain used while receiving a resource body
//!
//! Bytes flow through a [`ProgressWriter`] (reports the running count to the
//! run's reporter) into an optional [`RateLimitedWriter`] (paces throughput)
//! and finally into the in-memory body buffer.

mod progress_writer;
mod throttle;

pub use progress_writer::ProgressWriter;
pub use throttle::RateLimitedWriter;
