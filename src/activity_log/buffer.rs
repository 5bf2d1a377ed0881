use crate::activity_log::types::{Category, LogEntry, LogMessage};

/// Shared sink every producer reports into: the row-change handler and
/// each in-flight lookup.
pub trait ActivitySink: Send + Sync {
    /// Never fails. Safe to call from overlapping lookups.
    fn append(&self, message: LogMessage, category: Category);
    /// Current entries, oldest first
    fn snapshot(&self) -> Vec<LogEntry>;
    /// Stop accepting entries; later appends are dropped
    fn close(&self) {}
} // isolates side effects for unit testing
