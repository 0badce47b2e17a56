use crate::models::{ExecutionMode, Project};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ManagerAction {
    Start,
    Stop,
    Kill,
    Remove,
}

impl ManagerAction {
    fn keyword(&self) -> &'static str {
        match self {
            ManagerAction::Start => "START",
            ManagerAction::Stop => "STOP",
            ManagerAction::Kill => "KILL",
            ManagerAction::Remove => "DEL",
        }
    }
}

/// Every operation the client can ask of pmon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PmonCommand {
    Status,
    StartPmonOnly,
    /// Project start when no pmon is running yet: launches pmon itself.
    StartProjectWithPmon,
    /// Project start through an already running pmon.
    StartAll,
    StopAll,
    StopProjectAndPmon,
    RestartAll,
    WaitMode,
    ManagerList,
    ManagerStatus,
    SingleManager { action: ManagerAction, index: usize },
    Version,
    RegisterRunnable { config_path: PathBuf },
    RegisterSubProject,
    Unregister,
}

/// How the exit code of a waited command is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitRule {
    /// 0 / 3 / 4 are status values; anything else is a protocol violation.
    StatusQuery,
    Zero,
    /// Registration of a runnable project reports success with 3.
    Three,
    /// The version banner comes with exit code 0 or 1.
    ZeroOrOne,
}

impl ExitRule {
    pub fn accepts(&self, code: i32) -> bool {
        match self {
            ExitRule::StatusQuery => matches!(code, 0 | 3 | 4),
            ExitRule::Zero => code == 0,
            ExitRule::Three => code == 3,
            ExitRule::ZeroOrOne => matches!(code, 0 | 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedCommand {
    pub args: Vec<String>,
    pub mode: ExecutionMode,
    pub exit_rule: ExitRule,
    pub cwd: Option<PathBuf>,
}

impl EncodedCommand {
    pub fn command_text(&self) -> String {
        self.args.join(" ")
    }
}

impl fmt::Display for PmonCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PmonCommand::Status => "status check",
            PmonCommand::StartPmonOnly => "start pmon",
            PmonCommand::StartProjectWithPmon | PmonCommand::StartAll => "start project",
            PmonCommand::StopAll => "stop project",
            PmonCommand::StopProjectAndPmon => "stop project and pmon",
            PmonCommand::RestartAll => "restart project",
            PmonCommand::WaitMode => "set wait mode",
            PmonCommand::ManagerList => "manager list query",
            PmonCommand::ManagerStatus => "manager status query",
            PmonCommand::SingleManager { action, .. } => match action {
                ManagerAction::Start => "start manager",
                ManagerAction::Stop => "stop manager",
                ManagerAction::Kill => "kill manager",
                ManagerAction::Remove => "remove manager",
            },
            PmonCommand::Version => "version query",
            PmonCommand::RegisterRunnable { .. } => "register project",
            PmonCommand::RegisterSubProject => "register sub-project",
            PmonCommand::Unregister => "unregister project",
        };
        f.write_str(name)
    }
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

/// Maps an operation to its argument vector and execution policy.
///
/// Only `StartPmonOnly` and `StartProjectWithPmon` are detached: they leave a
/// long-lived pmon behind.
pub fn encode(command: &PmonCommand, project: &Project) -> EncodedCommand {
    let name = project.name.as_str();
    let proj = |rest: &[&str]| {
        let mut args = strings(&["-proj", name]);
        args.extend(strings(rest));
        args
    };
    let pmon_command = |cmd: &str| proj(&["-command", cmd]);

    let (args, mode, exit_rule) = match command {
        PmonCommand::Status => (proj(&["-status"]), ExecutionMode::Waited, ExitRule::StatusQuery),
        PmonCommand::StartPmonOnly => (
            proj(&["-log", "+stderr", "-noAutoStart"]),
            ExecutionMode::Detached,
            ExitRule::Zero,
        ),
        PmonCommand::StartProjectWithPmon => (proj(&[]), ExecutionMode::Detached, ExitRule::Zero),
        PmonCommand::StartAll => {
            (pmon_command("START_ALL:"), ExecutionMode::Waited, ExitRule::Zero)
        }
        PmonCommand::StopAll => (pmon_command("STOP_ALL:"), ExecutionMode::Waited, ExitRule::Zero),
        PmonCommand::StopProjectAndPmon => {
            (proj(&["-stopWait"]), ExecutionMode::Waited, ExitRule::Zero)
        }
        PmonCommand::RestartAll => {
            (pmon_command("RESTART_ALL:"), ExecutionMode::Waited, ExitRule::Zero)
        }
        PmonCommand::WaitMode => {
            (pmon_command("WAIT_MODE:"), ExecutionMode::Waited, ExitRule::Zero)
        }
        PmonCommand::ManagerList => (
            proj(&["-command", "MGRLIST:LIST", "-log", "+stdout"]),
            ExecutionMode::Waited,
            ExitRule::Zero,
        ),
        PmonCommand::ManagerStatus => (
            proj(&["-command", "MGRLIST:STATI", "-log", "+stdout"]),
            ExecutionMode::Waited,
            ExitRule::Zero,
        ),
        PmonCommand::SingleManager { action, index } => (
            pmon_command(&format!("SINGLE_MGR:{} {}", action.keyword(), index)),
            ExecutionMode::Waited,
            ExitRule::Zero,
        ),
        PmonCommand::Version => {
            return EncodedCommand {
                args: strings(&["-version"]),
                mode: ExecutionMode::Waited,
                exit_rule: ExitRule::ZeroOrOne,
                cwd: None,
            };
        }
        PmonCommand::RegisterRunnable { config_path } => (
            vec![
                "-config".to_string(),
                config_path.display().to_string(),
                "-status".to_string(),
                "-log".to_string(),
                "+stderr".to_string(),
                "-autofreg".to_string(),
            ],
            ExecutionMode::Waited,
            ExitRule::Three,
        ),
        PmonCommand::RegisterSubProject => (
            vec![
                "-regsubf".to_string(),
                "-proj".to_string(),
                project.install_dir.display().to_string(),
                "-log".to_string(),
                "+stderr".to_string(),
            ],
            ExecutionMode::Waited,
            ExitRule::Zero,
        ),
        PmonCommand::Unregister => (
            strings(&["-unreg", name, "-log", "+stderr"]),
            ExecutionMode::Waited,
            ExitRule::Zero,
        ),
    };

    EncodedCommand {
        args,
        mode,
        exit_rule,
        cwd: Some(project.install_dir.clone()),
    }
}
