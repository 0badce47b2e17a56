use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::models::CommandHistoryEntry;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Decides whether a recorded pmon response counts as a success.
pub trait ResponseClassifier: Send + Sync {
    /// Returns `(success, error_reason)`.
    fn classify(&self, response: &str) -> (bool, Option<String>);
}

/// `OK` is a success, `ERROR...` a failure with the rest as reason, and
/// anything else is a success, including truncated or garbled text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PermissiveClassifier;

impl ResponseClassifier for PermissiveClassifier {
    fn classify(&self, response: &str) -> (bool, Option<String>) {
        let trimmed = response.trim();
        if trimmed == "OK" {
            return (true, None);
        }
        if let Some(reason) = trimmed.strip_prefix("ERROR") {
            let reason = reason.trim_start_matches(':').trim();
            let reason = if reason.is_empty() {
                "Unknown error".to_string()
            } else {
                reason.to_string()
            };
            return (false, Some(reason));
        }
        (true, None)
    }
}

/// Bounded, newest-first log of executed commands.
pub struct CommandHistory {
    entries: Mutex<VecDeque<CommandHistoryEntry>>,
    capacity: usize,
    classifier: Arc<dyn ResponseClassifier>,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        Self::with_classifier(capacity, Arc::new(PermissiveClassifier))
    }

    pub fn with_classifier(capacity: usize, classifier: Arc<dyn ResponseClassifier>) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            classifier,
        }
    }

    pub async fn record(
        &self,
        project: &str,
        command: &str,
        response: &str,
    ) -> CommandHistoryEntry {
        let (success, error_reason) = self.classifier.classify(response);
        let entry = CommandHistoryEntry {
            timestamp: Utc::now(),
            project: project.to_string(),
            command: command.to_string(),
            response: response.to_string(),
            success,
            error_reason,
        };

        let mut entries = self.entries.lock().await;
        entries.push_front(entry.clone());
        entries.truncate(self.capacity);
        entry
    }

    /// Snapshot, newest first.
    pub async fn entries(&self) -> Vec<CommandHistoryEntry> {
        self.entries.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissive_classification() {
        let c = PermissiveClassifier;
        assert_eq!(c.classify(" OK \n"), (true, None));
        assert_eq!(
            c.classify("ERROR: manager 3 not found"),
            (false, Some("manager 3 not found".to_string()))
        );
        assert_eq!(c.classify("ERROR"), (false, Some("Unknown error".to_string())));
        assert_eq!(c.classify("LIST:0\n;"), (true, None));
        assert_eq!(c.classify(""), (true, None));
    }

    #[tokio::test]
    async fn keeps_only_the_most_recent_entries() {
        let history = CommandHistory::new(100);
        for i in 0..150 {
            history.record("plant", &format!("cmd {}", i), "OK").await;
        }

        let entries = history.entries().await;
        assert_eq!(entries.len(), 100);
        assert_eq!(entries[0].command, "cmd 149");
        assert_eq!(entries[99].command, "cmd 50");
    }

    #[tokio::test]
    async fn failure_reason_is_recorded() {
        let history = CommandHistory::default();
        let entry = history
            .record("plant", "-proj plant -command STOP_ALL:", "ERROR: exit code 1")
            .await;
        assert!(!entry.success);
        assert_eq!(entry.error_reason.as_deref(), Some("exit code 1"));
        assert_eq!(history.len().await, 1);

        history.clear().await;
        assert_eq!(history.len().await, 0);
    }

    struct Strict;

    impl ResponseClassifier for Strict {
        fn classify(&self, response: &str) -> (bool, Option<String>) {
            if response.trim() == "OK" {
                (true, None)
            } else {
                (false, Some(response.to_string()))
            }
        }
    }

    #[tokio::test]
    async fn classifier_can_be_replaced() {
        let history = CommandHistory::with_classifier(10, Arc::new(Strict));
        let entry = history.record("plant", "x", "garbled").await;
        assert!(!entry.success);
    }
}
