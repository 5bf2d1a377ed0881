use product_row_monitor::activity_log::{
    ActivitySink, BoundedActivityLog, Category, DEFAULT_CAPACITY, Fragment, LogEntry, LogMessage,
    LogView,
};
use std::sync::{Arc, Mutex};

fn texts(log: &BoundedActivityLog) -> Vec<String> {
    log.snapshot().iter().map(LogEntry::text).collect()
}

/// Records how many entries each render saw
#[derive(Clone, Default)]
struct RecordingView {
    renders: Arc<Mutex<Vec<(String, usize)>>>,
}

impl LogView for RecordingView {
    fn render(&self, joined: &str, entries: &[LogEntry]) {
        self.renders
            .lock()
            .unwrap()
            .push((joined.to_string(), entries.len()));
    }
}

#[test]
fn length_never_exceeds_capacity() {
    let log = BoundedActivityLog::new(5);
    assert_eq!(log.capacity(), 5);
    for i in 0..12 {
        let before = log.len();
        log.append(format!("entry {}", i).into(), Category::Plain);
        assert!(log.len() <= 5);
        if before == 5 {
            // full: one in, one (the oldest) out
            assert_eq!(log.len(), 5);
            assert_eq!(texts(&log)[0], format!("entry {}", i - 4));
        }
    }
}

#[test]
fn thirty_appends_keep_the_last_twenty_five() {
    let log = BoundedActivityLog::new(DEFAULT_CAPACITY);
    for i in 1..=30 {
        log.append(format!("#{}", i).into(), Category::Info);
    }
    let expected: Vec<String> = (6..=30).map(|i| format!("#{}", i)).collect();
    assert_eq!(texts(&log), expected);
}

#[test]
fn eviction_ignores_category() {
    let log = BoundedActivityLog::new(3);
    log.append("err".into(), Category::Error);
    log.append("a".into(), Category::Plain);
    log.append("b".into(), Category::Plain);
    log.append("c".into(), Category::Success);
    assert_eq!(texts(&log), vec!["a", "b", "c"]);
}

#[test]
fn empty_log_renders_nothing() {
    let log = BoundedActivityLog::new(4);
    assert!(log.is_empty());
    assert_eq!(log.render(), "");
    assert!(log.snapshot().is_empty());
}

#[test]
fn render_joins_timestamped_lines() {
    let log = BoundedActivityLog::new(4);
    log.append("first".into(), Category::Info);
    log.append("second".into(), Category::Error);
    let rendered = log.render();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with('[') && lines[0].ends_with("] first"));
    assert!(lines[1].ends_with("] second"));
    // [HH:MM:SS]
    assert_eq!(lines[0].find(']'), Some(9));
}

#[test]
fn every_append_rerenders_the_full_view() {
    let view = RecordingView::default();
    let log = BoundedActivityLog::with_view(2, view.clone());
    log.append("a".into(), Category::Plain);
    log.append("b".into(), Category::Plain);
    log.append("c".into(), Category::Plain);

    let renders = view.renders.lock().unwrap();
    let counts: Vec<usize> = renders.iter().map(|(_, n)| *n).collect();
    assert_eq!(counts, vec![1, 2, 2]);
    assert_eq!(renders[2].0, log.render());
    assert!(renders[2].0.ends_with("] c"));
}

#[test]
fn appends_after_close_are_dropped() {
    let view = RecordingView::default();
    let log = BoundedActivityLog::with_view(3, view.clone());
    log.append("kept".into(), Category::Success);
    log.close();
    assert!(log.is_closed());
    log.append("late".into(), Category::Error);

    assert_eq!(texts(&log), vec!["kept"]);
    assert_eq!(view.renders.lock().unwrap().len(), 1);
}

#[test]
fn emphasis_is_kept_as_fragments() {
    let msg = LogMessage::new()
        .text("Price: ")
        .emphasis(12.5, Category::Success)
        .text(" EUR");
    assert_eq!(msg.to_string(), "Price: 12.5 EUR");
    assert_eq!(
        msg.fragments()[1],
        Fragment::Emphasis("12.5".into(), Category::Success)
    );
}

#[test]
fn categories_map_to_log_levels() {
    assert_eq!(Category::Error.level(), log::Level::Error);
    assert_eq!(Category::Success.level(), log::Level::Info);
    assert_eq!(Category::Info.level(), log::Level::Info);
    assert_eq!(Category::Plain.level(), log::Level::Debug);
}

#[test]
#[should_panic]
fn zero_capacity_is_rejected() {
    let _ = BoundedActivityLog::new(0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_producers_do_not_corrupt_the_buffer() {
    let log = BoundedActivityLog::new(DEFAULT_CAPACITY);
    let mut tasks = Vec::new();
    for producer in 0..8 {
        let log = log.clone();
        tasks.push(tokio::spawn(async move {
            for seq in 0..50 {
                log.append(format!("{}:{}", producer, seq).into(), Category::Info);
                tokio::task::yield_now().await;
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let entries = texts(&log);
    assert_eq!(entries.len(), DEFAULT_CAPACITY);
    // each producer's surviving entries are still in its own order
    for producer in 0..8 {
        let seqs: Vec<u32> = entries
            .iter()
            .filter_map(|e| e.split_once(':'))
            .filter(|(p, _)| p.parse::<u32>().unwrap() == producer)
            .map(|(_, s)| s.parse().unwrap())
            .collect();
        assert!(seqs.windows(2).all(|w| w[0] < w[1]));
    }
    // buffer order is also stamp order
    let stamps: Vec<_> = log.snapshot().iter().map(|e| e.timestamp).collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
}
