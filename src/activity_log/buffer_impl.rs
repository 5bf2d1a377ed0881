use crate::activity_log::mirror::{mirror, mirror_dropped};
use crate::activity_log::types::{Category, LogEntry, LogMessage};
use crate::activity_log::view::{LogView, NullView};
use crate::activity_log::ActivitySink;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub const DEFAULT_CAPACITY: usize = 25;

/// Fixed-capacity activity panel. Keeps the most recent `capacity` entries
/// in arrival order and evicts the oldest one first.
pub struct BoundedActivityLog {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
    closed: AtomicBool,
    view: Box<dyn LogView>,
}

impl BoundedActivityLog {
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Arc<Self> {
        Self::with_view(capacity, NullView)
    }

    pub fn with_view(capacity: usize, view: impl LogView + 'static) -> Arc<Self> {
        assert!(capacity > 0, "activity log capacity must be at least 1");
        Arc::new(Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            closed: AtomicBool::new(false),
            view: Box::new(view),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// The panel text: one `[time] message` line per entry
    pub fn render(&self) -> String {
        join(&self.lock())
    }

    // A panicking view must not take the panel down with it.
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn join(entries: &VecDeque<LogEntry>) -> String {
    entries
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl ActivitySink for BoundedActivityLog {
    fn append(&self, message: LogMessage, category: Category) {
        let mut buf = self.lock();
        // stamped under the lock so timestamps follow buffer order
        let entry = LogEntry::new(message, category);
        if self.is_closed() {
            drop(buf);
            mirror_dropped(&entry);
            return;
        }

        if buf.len() == self.capacity {
            buf.pop_front();
        }
        buf.push_back(entry);
        let joined = join(&buf);
        self.view.render(&joined, buf.make_contiguous());
        let stored = buf.back().cloned();
        drop(buf);

        // the buffer is already updated; a failing logger cannot undo it
        if let Some(entry) = stored {
            mirror(&entry);
        }
    }

    fn snapshot(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    fn close(&self) {
        let _buf = self.lock();
        self.closed.store(true, Ordering::Release);
    }
}
