use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an encoded pmon command must be executed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Caller awaits the exit code and captured output.
    Waited,
    /// Fire-and-forget; resolves once the child has been spawned.
    Detached,
}

/// Outcome of a waited invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionResult {
    pub invocation_id: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    /// stderr followed by stdout, used as failure detail.
    pub fn combined_output(&self) -> String {
        let mut text = String::new();
        if !self.stderr.trim().is_empty() {
            text.push_str(self.stderr.trim_end());
        }
        if !self.stdout.trim().is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(self.stdout.trim_end());
        }
        text
    }

    /// Text recorded in the command history. A silent process is recorded as
    /// `OK` when its exit code was `accepted` by the command's exit rule.
    pub fn response_text(&self, accepted: bool) -> String {
        let mut text = String::new();
        text.push_str(&self.stdout);
        text.push_str(&self.stderr);
        let text = text.trim();

        if !text.is_empty() {
            text.to_string()
        } else if accepted {
            "OK".to_string()
        } else {
            format!("ERROR: exit code {}", self.exit_code)
        }
    }
}

/// Handle returned for a detached invocation. The child is not tracked after
/// this point; there is no way to query or stop it through the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetachedLaunch {
    pub invocation_id: String,
    pub pid: Option<u32>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Command,
    Stdout,
    Stderr,
    Exit,
}

/// One transcript line sent to the diagnostic sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputLine {
    pub invocation_id: String,
    pub project_name: Option<String>,
    pub stream: OutputStream,
    pub message: String,
}
