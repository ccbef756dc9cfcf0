//! Output module for the mirror tree and run reports
//!
//! This module handles:
//! - Writing fetched resources to their mapped local paths
//! - Recording run statistics and printing the final summary
//! - Human-readable byte sizes

pub mod stats;
mod storage;

pub use stats::{print_summary, MirrorStats, MirrorSummary};
pub use storage::{save_resource, target_path};

/// Formats a byte count with binary units
///
/// # Example
///
/// ```
/// use webmirror::output::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1536), "1.50 KiB");
/// assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const PREFIXES: &[char] = &['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{} B", bytes);
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!("{:.2} {}iB", bytes as f64 / div as f64, PREFIXES[exp])
}
