//! Error types for the pmon client

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // Discovery
    #[error("{}", missing_executable_message(.version))]
    ExecutableNotFound { version: Option<String> },

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    // Spawn
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} terminated without an exit code")]
    Terminated { program: String },

    // Protocol
    #[error("Unexpected exit code {code} from {operation}: {output}")]
    UnexpectedExitCode {
        operation: String,
        code: i32,
        output: String,
    },

    #[error("Command '{command}' failed with exit code {code}: {detail}")]
    CommandFailed {
        command: String,
        code: i32,
        detail: String,
    },

    #[error("Could not read a version from pmon output: {output}")]
    VersionUnparseable { output: String },

    // Configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn missing_executable_message(version: &Option<String>) -> String {
    match version {
        Some(version) => format!("No pmon executable found for version {}", version),
        None => "No installed pmon executable found".to_string(),
    }
}

impl Error {
    /// Discovery failures are expected outcomes (e.g. an uninstalled
    /// version) rather than defects.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ExecutableNotFound { .. } | Error::ProjectNotFound(_)
        )
    }

    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Error::UnexpectedExitCode { .. })
    }
}
