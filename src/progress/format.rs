//! Text layout of progress lines
//!
//! Everything here is a pure function of its inputs so the layout can be tested
//! without a terminal.

use super::info::ProgressInfo;
use std::time::Duration;

/// Terminal width used when the real width cannot be determined
pub const FALLBACK_WIDTH: usize = 50;

/// Below this width a known-size download is drawn on two lines
pub const NARROW_WIDTH: usize = 55;

/// Bar width used when the total size is unknown
const UNKNOWN_BAR_WIDTH: usize = 25;

/// Smallest bar drawn for a known-size download
const MIN_BAR_WIDTH: usize = 3;

/// Sliding marker of the indeterminate bar
const MARKER: &str = "<=>";

/// Longest resource label shown in front of a progress line
const MAX_LABEL: usize = 24;

/// Width of the progress bar for a terminal `term_width` columns wide
pub fn bar_width(term_width: usize, total_known: bool) -> usize {
    if total_known {
        (term_width / 5).max(MIN_BAR_WIDTH)
    } else {
        UNKNOWN_BAR_WIDTH.min(term_width / 3)
    }
}

/// Draws a determinate bar filled to `fraction` (clamped to `0.0..=1.0`)
///
/// # Example
///
/// ```
/// use webmirror::progress::format::render_bar;
///
/// assert_eq!(render_bar(0.5, 10), "====>     ");
/// assert_eq!(render_bar(1.0, 4), "====");
/// ```
pub fn render_bar(fraction: f64, width: usize) -> String {
    let completed = ((width as f64) * fraction.clamp(0.0, 1.0)) as usize;
    let completed = completed.min(width);

    if completed > 0 && completed < width {
        format!(
            "{}>{}",
            "=".repeat(completed - 1),
            " ".repeat(width - completed)
        )
    } else {
        format!("{}{}", "=".repeat(completed), " ".repeat(width - completed))
    }
}

/// Draws an indeterminate bar whose marker bounces with `tick`
pub fn indeterminate_bar(width: usize, tick: u64) -> String {
    if width <= MARKER.len() {
        return "=".repeat(width);
    }

    let span = (width - MARKER.len()) as u64;
    let phase = tick % (2 * span);
    let offset = (if phase <= span { phase } else { 2 * span - phase }) as usize;

    format!(
        "{}{}{}",
        " ".repeat(offset),
        MARKER,
        " ".repeat(width - MARKER.len() - offset)
    )
}

/// Formats an estimated time left
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use webmirror::progress::format::format_remaining;
///
/// assert_eq!(format_remaining(None), "??s");
/// assert_eq!(format_remaining(Some(Duration::from_millis(300))), "0s");
/// assert_eq!(format_remaining(Some(Duration::from_secs(90))), "1.5m");
/// ```
pub fn format_remaining(remaining: Option<Duration>) -> String {
    let Some(remaining) = remaining else {
        return "??s".to_string();
    };

    let secs = remaining.as_secs_f64();
    if secs < 1.0 {
        "0s".to_string()
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else if secs < 3600.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}h", secs / 3600.0)
    }
}

/// Formats a throughput in MiB/s
pub fn format_speed(bytes_per_sec: f64) -> String {
    format!("{:.2} MiB/s", bytes_per_sec / (1024.0 * 1024.0))
}

/// Formats a byte count in KiB
pub fn format_kib(bytes: u64) -> String {
    format!("{:.2} KiB", bytes as f64 / 1024.0)
}

/// Short name for a resource key: its last path segment, or its host
pub fn display_label(key: &str) -> String {
    let trimmed = key
        .split(['?', '#'])
        .next()
        .unwrap_or(key)
        .trim_end_matches('/');
    let name = trimmed.rsplit('/').next().unwrap_or(trimmed);

    if name.chars().count() <= MAX_LABEL {
        name.to_string()
    } else {
        let head: String = name.chars().take(MAX_LABEL - 1).collect();
        format!("{}~", head)
    }
}

/// Lays out the progress of one resource for a terminal `term_width` wide
///
/// Returns one line, or two when the terminal is narrower than
/// [`NARROW_WIDTH`] and the total size is known.
pub fn progress_lines(label: &str, info: &ProgressInfo, term_width: usize) -> Vec<String> {
    let speed = format_speed(info.speed);
    let remaining = format_remaining(info.remaining());
    let downloaded = format_kib(info.downloaded);

    let (Some(total), Some(percent)) = (info.total, info.percent()) else {
        let width = bar_width(term_width, false);
        let tick = info.elapsed().as_millis() as u64 / 100;
        return vec![format!(
            "{} {} [{}] Downloading... {} {}",
            label,
            downloaded,
            indeterminate_bar(width, tick),
            speed,
            remaining
        )];
    };

    let width = bar_width(term_width, true);
    let bar = render_bar(percent / 100.0, width);
    let total = format_kib(total);

    if term_width < NARROW_WIDTH {
        vec![
            format!("{} {} / {}", label, downloaded, total),
            format!(" [{}] {:.2}% {} {}", bar, percent, speed, remaining),
        ]
    } else {
        vec![format!(
            "{} {} / {} [{}] {:.2}% {} {}",
            label, downloaded, total, bar, percent, speed, remaining
        )]
    }
}

/// Cuts a line to at most `width` characters
pub fn truncate_line(line: &str, width: usize) -> String {
    line.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_bar_width_known_total() {
        assert_eq!(bar_width(100, true), 20);
        assert_eq!(bar_width(10, true), 3);
        assert_eq!(bar_width(0, true), 3);
    }

    #[test]
    fn test_bar_width_unknown_total() {
        assert_eq!(bar_width(120, false), 25);
        assert_eq!(bar_width(30, false), 10);
    }

    #[test]
    fn test_render_bar_states() {
        assert_eq!(render_bar(0.0, 5), "     ");
        assert_eq!(render_bar(0.4, 5), "=>   ");
        assert_eq!(render_bar(1.0, 5), "=====");
        assert_eq!(render_bar(7.0, 5), "=====");
        assert_eq!(render_bar(-1.0, 5), "     ");
    }

    #[test]
    fn test_indeterminate_bar_bounces() {
        assert_eq!(indeterminate_bar(6, 0), "<=>   ");
        assert_eq!(indeterminate_bar(6, 3), "   <=>");
        assert_eq!(indeterminate_bar(6, 4), "  <=> ");
        assert_eq!(indeterminate_bar(6, 6), "<=>   ");
        assert_eq!(indeterminate_bar(2, 9), "==");
        for tick in 0..20 {
            assert_eq!(indeterminate_bar(10, tick).len(), 10);
        }
    }

    #[test]
    fn test_format_remaining_units() {
        assert_eq!(format_remaining(None), "??s");
        assert_eq!(format_remaining(Some(Duration::ZERO)), "0s");
        assert_eq!(format_remaining(Some(Duration::from_secs(12))), "12.0s");
        assert_eq!(format_remaining(Some(Duration::from_secs(150))), "2.5m");
        assert_eq!(format_remaining(Some(Duration::from_secs(5400))), "1.5h");
    }

    #[test]
    fn test_format_speed_and_size() {
        assert_eq!(format_speed(1024.0 * 1024.0 * 2.5), "2.50 MiB/s");
        assert_eq!(format_kib(1536), "1.50 KiB");
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("https://example.com/css/site.css"), "site.css");
        assert_eq!(display_label("https://example.com/about/"), "about");
        assert_eq!(display_label("https://example.com/"), "example.com");
        assert_eq!(display_label("https://example.com/a?x=1"), "a");
        let long = display_label("https://example.com/a-really-long-file-name-for-testing.html");
        assert_eq!(long.chars().count(), 24);
        assert!(long.ends_with('~'));
    }

    fn info(total: Option<u64>, downloaded: u64) -> ProgressInfo {
        let mut info = ProgressInfo::new(total);
        info.record(downloaded, info.start_time + Duration::from_secs(1));
        info
    }

    #[test]
    fn test_wide_layout_single_line() {
        let lines = progress_lines("a.png", &info(Some(2048), 1024), 100);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("a.png 1.00 KiB / 2.00 KiB ["));
        assert!(lines[0].contains("50.00%"));
        assert!(lines[0].contains("MiB/s"));
        assert!(lines[0].ends_with("1.0s"));
    }

    #[test]
    fn test_narrow_layout_two_lines() {
        let lines = progress_lines("a.png", &info(Some(2048), 1024), 40);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "a.png 1.00 KiB / 2.00 KiB");
        assert!(lines[1].starts_with(" [===>    ] 50.00%"));
    }

    #[test]
    fn test_unknown_total_layout() {
        let lines = progress_lines("feed", &info(None, 4096), 40);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Downloading..."));
        assert!(lines[0].ends_with("??s"));
        assert!(!lines[0].contains('%'));
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("abcdef", 3), "abc");
        assert_eq!(truncate_line("ab", 3), "ab");
    }
}
