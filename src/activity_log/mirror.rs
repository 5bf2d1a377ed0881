use crate::activity_log::types::LogEntry;

pub const MIRROR_TARGET: &str = "activity";

/// Copies an entry to the `log` facade at the level its category maps to.
/// Whatever the logger does with it has no effect on the buffer.
pub fn mirror(entry: &LogEntry) {
    log::log!(target: MIRROR_TARGET, entry.category.level(), "{}", entry);
}

/// Appends refused after the log was closed only show up at debug level
pub fn mirror_dropped(entry: &LogEntry) {
    log::debug!(target: MIRROR_TARGET, "dropped after close: {}", entry);
}
