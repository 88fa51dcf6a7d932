use crate::LogEntry;
use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

/// Session-scoped record of attempted exchanges, most recent first.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Mutex<VecDeque<LogEntry>>,
}

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp an entry and put it in front of the log.
    pub fn record(&self, label: impl Into<String>, detail: impl Into<String>) -> LogEntry {
        let entry = LogEntry {
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            label: label.into(),
            detail: detail.into(),
        };

        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_front(entry.clone());
        entry
    }

    /// All entries, newest first.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread};

    fn labels(log: &AuditLog) -> Vec<String> {
        log.entries().into_iter().map(|entry| entry.label).collect()
    }

    #[test]
    fn entries_are_newest_first() {
        let log = AuditLog::new();
        log.record("A", "a");
        log.record("B", "b");
        log.record("C", "c");

        assert_eq!(labels(&log), vec!["C", "B", "A"]);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn concurrent_records_stay_whole() {
        let log = Arc::new(AuditLog::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = log.clone();
                thread::spawn(move || {
                    for j in 0..50 {
                        log.record(format!("{i}-{j}"), format!("detail {i}-{j}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let entries = log.entries();
        assert_eq!(entries.len(), 400);
        for entry in entries {
            assert_eq!(entry.detail, format!("detail {}", entry.label));
        }
    }
}
