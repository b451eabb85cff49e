//! Log events emitted by a deletion run
//!
//! A capturing logger is installed once per test binary. Lines are kept per
//! thread so tests running in parallel do not see each other's events.

use std::cell::RefCell;
use std::sync::Once;

use log::{LevelFilter, Log, Metadata, Record};
use purge::{DeletionSummary, InMemoryMailbox, MessageRef, delete_matching};

thread_local! {
    static LINES: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with("purge")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            LINES.with(|lines| lines.borrow_mut().push(record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

/// Install the logger and clear anything this thread captured so far
fn capture() {
    INSTALL.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
    LINES.with(|lines| lines.borrow_mut().clear());
}

fn captured() -> Vec<String> {
    LINES.with(|lines| lines.borrow_mut().drain(..).collect())
}

fn make_refs(ids: &[&str]) -> Vec<MessageRef> {
    ids.iter()
        .map(|id| MessageRef::new(*id, format!("thread-{}", id)))
        .collect()
}

#[test]
fn test_zero_matches_logs_one_no_match_event() {
    capture();
    let mailbox = InMemoryMailbox::new();

    let summary = delete_matching(&mailbox, "from:nobody", "me").unwrap();
    let lines = captured();

    assert_eq!(summary, DeletionSummary::NoMatches);
    let no_match: Vec<&String> = lines
        .iter()
        .filter(|l| l.as_str() == "There was no message matching the query.")
        .collect();
    assert_eq!(no_match.len(), 1);
    assert!(!lines.iter().any(|l| l.contains("deleted successfully")));
}

#[test]
fn test_each_delete_logs_its_id_in_order() {
    capture();
    let mailbox =
        InMemoryMailbox::with_pages(vec![make_refs(&["m1", "m2"]), make_refs(&["m3"])]);

    let summary = delete_matching(&mailbox, "subject:OTP older_than:1d", "me").unwrap();
    let lines = captured();

    assert_eq!(summary, DeletionSummary::Deleted { count: 3 });
    let deleted: Vec<&str> = lines
        .iter()
        .filter(|l| l.ends_with("deleted successfully."))
        .map(String::as_str)
        .collect();
    assert_eq!(
        deleted,
        vec![
            "Message with id: m1 deleted successfully.",
            "Message with id: m2 deleted successfully.",
            "Message with id: m3 deleted successfully.",
        ]
    );
    assert!(
        !lines
            .iter()
            .any(|l| l == "There was no message matching the query.")
    );
}
