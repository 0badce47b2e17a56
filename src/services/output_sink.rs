use crate::models::{OutputLine, OutputStream};
use std::sync::Mutex;
use tracing::{error, info, warn};

/// Receives the live transcript of every pmon invocation.
pub trait OutputSink: Send + Sync {
    fn append(&self, line: &OutputLine);
}

/// Default sink: one `tracing` event per transcript line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn append(&self, line: &OutputLine) {
        let project = line.project_name.as_deref().unwrap_or("-");
        match line.stream {
            OutputStream::Stderr => warn!(
                target: "pmon",
                invocation = %line.invocation_id,
                project,
                "[stderr] {}",
                line.message
            ),
            _ => info!(
                target: "pmon",
                invocation = %line.invocation_id,
                project,
                "[{:?}] {}",
                line.stream,
                line.message
            ),
        }
    }
}

/// Keeps transcript lines in memory, e.g. for an output panel.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<OutputLine>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<OutputLine> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl OutputSink for MemorySink {
    fn append(&self, line: &OutputLine) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line.clone()),
            Err(poisoned) => poisoned.into_inner().push(line.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Error,
}

/// User-facing success/failure messages. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotifyLevel, message: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        match level {
            NotifyLevel::Info => info!("{}", message),
            NotifyLevel::Error => error!("{}", message),
        }
    }
}
