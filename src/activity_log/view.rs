use crate::activity_log::types::LogEntry;
use std::io::{self, Write};

/// Renders the joined panel text. Called with the buffer locked, so an
/// implementation must not append to the log it is rendering.
pub trait LogView: Send + Sync {
    fn render(&self, joined: &str, entries: &[LogEntry]);
}

/// Discards every render
pub struct NullView;

impl LogView for NullView {
    fn render(&self, _joined: &str, _entries: &[LogEntry]) {}
}

/// Redraws the panel on stdout, newest entry at the bottom
pub struct TerminalView {
    title: String,
}

impl TerminalView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    fn draw(&self, joined: &str, count: usize) -> io::Result<()> {
        let mut out = io::stdout().lock();
        // clear screen, cursor home
        write!(out, "\x1b[2J\x1b[H")?;
        writeln!(out, "== {} ({}) ==", self.title, count)?;
        writeln!(out, "{}", joined)?;
        out.flush()
    }
}

impl LogView for TerminalView {
    fn render(&self, joined: &str, entries: &[LogEntry]) {
        if let Err(e) = self.draw(joined, entries.len()) {
            log::warn!("failed to draw activity panel: {}", e);
        }
    }
}
