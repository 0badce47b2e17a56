use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// pid reported for a manager that failed fatally during startup.
pub const FATAL_PID: i32 = -2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    #[default]
    Manual,
    Once,
    Always,
}

impl StartMode {
    /// Unrecognized codes fall back to `Manual`.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" => StartMode::Once,
            "2" => StartMode::Always,
            _ => StartMode::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunningState {
    Stopped,
    Init,
    Running,
    Blocked,
}

impl RunningState {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(RunningState::Stopped),
            "1" => Some(RunningState::Init),
            "2" => Some(RunningState::Running),
            "3" => Some(RunningState::Blocked),
            _ => None,
        }
    }
}

/// One manager slot of a project.
///
/// `MGRLIST:LIST` fills the configuration half (name, start mode, kill and
/// restart settings, args); `MGRLIST:STATI` fills the runtime half (state, pid,
/// start time, manager number). Both address rows by `index`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Manager {
    pub index: usize,
    pub name: String,
    pub start_mode: StartMode,
    /// Negative means the manager is not stopped on project restart.
    pub sec_kill: i32,
    pub restart_count: i32,
    pub reset_min: i32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub args: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub running_state: Option<RunningState>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pid: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub manager_number: Option<i32>,
}

impl Manager {
    pub fn is_fatal(&self) -> bool {
        self.pid == Some(FATAL_PID)
    }

    pub fn is_running(&self) -> bool {
        !self.is_fatal() && self.running_state == Some(RunningState::Running)
    }

    pub fn uptime(&self, now: NaiveDateTime) -> Option<Duration> {
        self.start_time.map(|started| now - started)
    }
}

/// Combines the list view and the status view of the same project by index.
pub fn merge_manager_views(list: &[Manager], status: &[Manager]) -> Vec<Manager> {
    let mut merged: Vec<Manager> = list.to_vec();

    for runtime in status {
        match merged.iter_mut().find(|m| m.index == runtime.index) {
            Some(manager) => {
                manager.running_state = runtime.running_state;
                manager.pid = runtime.pid;
                manager.start_time = runtime.start_time;
                manager.manager_number = runtime.manager_number;
                if runtime.start_mode != StartMode::Manual {
                    manager.start_mode = runtime.start_mode;
                }
            }
            None => merged.push(runtime.clone()),
        }
    }

    merged
}
