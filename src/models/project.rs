use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One entry of the project inventory.
///
/// The client never owns the project lifecycle; it only reads these fields to
/// build argument vectors and to pick a pmon executable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub name: String,
    pub install_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<String>, // e.g. "3.20"
    #[serde(default)]
    pub is_runnable: bool,
    #[serde(default)]
    pub is_system_installation: bool,
}

impl Project {
    pub fn new(name: impl Into<String>, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            install_dir: install_dir.into(),
            version: None,
            is_runnable: true,
            is_system_installation: false,
        }
    }

    /// An installed runtime version rather than a user project.
    pub fn system(version: impl Into<String>, install_dir: impl Into<PathBuf>) -> Self {
        let version = version.into();
        Self {
            name: format!("runtime-{}", version),
            install_dir: install_dir.into(),
            version: Some(version),
            is_runnable: false,
            is_system_installation: true,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Tri-state answer of the `-status` query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RunningStatus {
    Running,
    NotRunning,
    Unknown,
}

impl RunningStatus {
    /// Maps the exit code of `-status`. Any code outside {0, 3, 4} is a
    /// protocol violation and yields `None`.
    pub fn from_exit_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(RunningStatus::Running),
            3 => Some(RunningStatus::NotRunning),
            4 => Some(RunningStatus::Unknown),
            _ => None,
        }
    }
}

/// One row of a bulk status refresh. Failures are kept per project as
/// `Unknown` with the captured error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectStatusReport {
    pub project: String,
    pub status: RunningStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}
