use crate::models::{Manager, RunningStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProjectStatus {
    Unknown,
    Down,
    Starting,
    Monitoring,
    Stopping,
    Restarting,
}

impl ProjectStatus {
    /// Code 4 has no meaning on the pmon side and maps to `Unknown` like every
    /// other unmapped value.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ProjectStatus::Down,
            1 => ProjectStatus::Starting,
            2 => ProjectStatus::Monitoring,
            3 => ProjectStatus::Stopping,
            5 => ProjectStatus::Restarting,
            _ => ProjectStatus::Unknown,
        }
    }
}

/// Whole-project lifecycle state reported at the end of `MGRLIST:STATI`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectState {
    pub status: ProjectStatus,
    pub text: String,
    pub emergency: bool,
    pub demo: bool,
}

/// Decoded `MGRLIST:STATI` output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ManagerStatusReport {
    pub managers: Vec<Manager>,
    pub project_state: Option<ProjectState>,
}

/// Everything known about a project at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComprehensiveStatus {
    pub running_status: RunningStatus,
    pub managers: Vec<Manager>,
    pub project_state: Option<ProjectState>,
    pub timestamp: DateTime<Utc>,
}
