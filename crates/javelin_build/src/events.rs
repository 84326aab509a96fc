//! Per-file notifications emitted during a build pass.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use javelin_common::SourceId;

/// Something observable that happened to one file, or to the cache, during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// Records of deleted source files were removed before compiling.
    Pruned {
        /// Number of records removed.
        count: usize,
    },
    /// The file is unchanged since its last successful compile.
    Skipped(SourceId),
    /// The file is stale and is being handed to the compiler.
    Compiling(SourceId),
    /// The compiler accepted the file.
    Compiled(SourceId),
    /// The file could not be compiled; its cache record was left untouched.
    Failed {
        /// The file.
        id: SourceId,
        /// Rendered error.
        message: String,
    },
    /// The file compiled but its new fingerprint could not be recorded, so it
    /// will be compiled again next pass.
    CacheWriteFailed {
        /// The file.
        id: SourceId,
        /// Rendered error.
        message: String,
    },
}

/// Receives build events. Called concurrently from compile workers.
pub trait EventSink: Send + Sync {
    /// Handles one event.
    fn emit(&self, event: BuildEvent);
}

/// A thread-safe sink that keeps every event, for tests and summaries.
pub struct EventLog {
    events: Mutex<Vec<BuildEvent>>,
    failures: AtomicUsize,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            failures: AtomicUsize::new(0),
        }
    }

    /// Returns a snapshot of all events in arrival order.
    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the identities that were skipped, sorted.
    pub fn skipped(&self) -> Vec<SourceId> {
        self.collect(|e| match e {
            BuildEvent::Skipped(id) => Some(id.clone()),
            _ => None,
        })
    }

    /// Returns the identities the compiler accepted, sorted.
    pub fn compiled(&self) -> Vec<SourceId> {
        self.collect(|e| match e {
            BuildEvent::Compiled(id) => Some(id.clone()),
            _ => None,
        })
    }

    /// Returns the number of `Failed` events seen so far.
    pub fn failure_count(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    fn collect(&self, pick: impl Fn(&BuildEvent) -> Option<SourceId>) -> Vec<SourceId> {
        let mut ids: Vec<SourceId> = self.events.lock().unwrap().iter().filter_map(pick).collect();
        ids.sort();
        ids
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: BuildEvent) {
        if matches!(event, BuildEvent::Failed { .. }) {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> SourceId {
        SourceId::parse(s).unwrap()
    }

    #[test]
    fn empty_log() {
        let log = EventLog::new();
        assert!(log.events().is_empty());
        assert_eq!(log.failure_count(), 0);
    }

    #[test]
    fn filters_by_kind() {
        let log = EventLog::new();
        log.emit(BuildEvent::Compiling(id("B.java")));
        log.emit(BuildEvent::Compiled(id("B.java")));
        log.emit(BuildEvent::Skipped(id("A.java")));
        log.emit(BuildEvent::Failed {
            id: id("C.java"),
            message: "boom".to_string(),
        });

        assert_eq!(log.skipped(), vec![id("A.java")]);
        assert_eq!(log.compiled(), vec![id("B.java")]);
        assert_eq!(log.failure_count(), 1);
        assert_eq!(log.events().len(), 4);
    }

    #[test]
    fn thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let log = Arc::new(EventLog::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..50 {
                        let id = SourceId::parse(&format!("t{t}/F{i}.java")).unwrap();
                        log.emit(BuildEvent::Skipped(id));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(log.skipped().len(), 400);
    }
}
