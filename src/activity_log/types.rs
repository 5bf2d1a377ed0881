use chrono::{DateTime, Local};
use log::Level;
use std::fmt;

/// Presentation category of an entry: Info, Success, Error, Plain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    Info,
    Success,
    Error,
    #[default]
    Plain,
}

impl Category {
    /// Level used when the entry is mirrored to the `log` facade
    pub fn level(self) -> Level {
        match self {
            Category::Error => Level::Error,
            Category::Info | Category::Success => Level::Info,
            Category::Plain => Level::Debug,
        }
    }
}

/// A piece of a message. Emphasised fragments carry their own category
/// so a view can highlight ids, prices and the like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Emphasis(String, Category),
}

impl Fragment {
    pub fn as_str(&self) -> &str {
        match self {
            Fragment::Text(s) | Fragment::Emphasis(s, _) => s.as_str(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogMessage {
    fragments: Vec<Fragment>,
}

impl LogMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.fragments.push(Fragment::Text(text.into()));
        self
    }

    pub fn emphasis(mut self, text: impl fmt::Display, category: Category) -> Self {
        self.fragments
            .push(Fragment::Emphasis(text.to_string(), category));
        self
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }
}

impl From<&str> for LogMessage {
    fn from(text: &str) -> Self {
        LogMessage::new().text(text)
    }
}

impl From<String> for LogMessage {
    fn from(text: String) -> Self {
        LogMessage::new().text(text)
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.fragments {
            f.write_str(fragment.as_str())?;
        }
        Ok(())
    }
}

/// One line of the activity panel, stamped when it was appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: LogMessage,
    pub category: Category,
}

impl LogEntry {
    pub fn new(message: LogMessage, category: Category) -> Self {
        Self {
            timestamp: Local::now(),
            message,
            category,
        }
    }

    /// Short local time, e.g. `14:03:27`
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    pub fn text(&self) -> String {
        self.message.to_string()
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.time_label(), self.message)
    }
}
