use super::format::{display_label, progress_lines, truncate_line, FALLBACK_WIDTH};
use super::traits::{ProgressEvent, ProgressRenderer, ProgressView};
use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Stdout, Write};

/// Live view that repaints the log tail and every in-flight download
///
/// Each event clears the previously drawn block and draws it again, reading
/// the terminal width every time so the layout follows resizes.
pub struct TerminalRenderer<W: Write + Send = Stdout> {
    out: W,
    drawn_lines: u16,
    fixed_width: Option<usize>,
}

impl TerminalRenderer<Stdout> {
    /// Creates a renderer drawing on stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    /// Creates a renderer drawing on `out`
    pub fn new(out: W) -> Self {
        Self {
            out,
            drawn_lines: 0,
            fixed_width: None,
        }
    }

    /// Pins the layout width instead of querying the terminal
    pub fn with_width(mut self, width: usize) -> Self {
        self.fixed_width = Some(width);
        self
    }

    /// Returns the writer the renderer draws on
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn width(&self) -> usize {
        self.fixed_width.unwrap_or_else(|| {
            crossterm::terminal::size()
                .map(|(cols, _)| cols as usize)
                .ok()
                .filter(|cols| *cols > 0)
                .unwrap_or(FALLBACK_WIDTH)
        })
    }

    fn repaint(&mut self, view: ProgressView<'_>) -> io::Result<()> {
        let width = self.width();

        let mut lines: Vec<String> = view.logs.iter().cloned().collect();
        for transfer in view.transfers {
            let label = display_label(&transfer.key);
            lines.extend(progress_lines(&label, &transfer.info, width));
        }

        queue!(self.out, MoveToColumn(0))?;
        if self.drawn_lines > 0 {
            queue!(self.out, MoveUp(self.drawn_lines))?;
        }
        queue!(self.out, Clear(ClearType::FromCursorDown))?;

        for line in &lines {
            writeln!(self.out, "{}", truncate_line(line, width))?;
        }
        self.out.flush()?;

        self.drawn_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        Ok(())
    }
}

impl<W: Write + Send> ProgressRenderer for TerminalRenderer<W> {
    fn render(&mut self, _event: &ProgressEvent, view: ProgressView<'_>) {
        if let Err(e) = self.repaint(view) {
            tracing::debug!("Failed to draw progress: {}", e);
        }
    }

    fn finish(&mut self) {
        // Leave the final frame on screen
        self.drawn_lines = 0;
        let _ = self.out.flush();
    }
}
