use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{
    merge_manager_views, CommandHistoryEntry, ComprehensiveStatus, DetachedLaunch, ExecutionMode,
    ExecutionResult, HealthScore, Manager, ManagerStatusReport, Project, ProjectStatusReport,
    RunningStatus, VersionInfo,
};
use crate::services::command_encoder::{encode, EncodedCommand, ManagerAction, PmonCommand};
use crate::services::command_history::CommandHistory;
use crate::services::executable_locator::{ExecutableLocator, SystemInstallation};
use crate::services::health_engine::compute_health;
use crate::services::output_sink::{
    Notifier, NotifyLevel, OutputSink, TracingNotifier, TracingSink,
};
use crate::services::process_executor::ProcessExecutor;
use crate::utils::{parse_manager_list, parse_manager_status, parse_version_banner};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Entry point for every pmon operation.
///
/// Holds the inventory, the executable locator, the diagnostic sink and the
/// command history. Commands against the same project are not serialized;
/// concurrent calls race against the same pmon instance.
pub struct PmonClient {
    projects: Vec<Project>,
    locator: ExecutableLocator,
    executor: ProcessExecutor,
    history: CommandHistory,
    notifier: Arc<dyn Notifier>,
}

impl PmonClient {
    pub fn new(
        config: &ClientConfig,
        sink: Arc<dyn OutputSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            projects: config.projects.clone(),
            locator: ExecutableLocator::from_inventory(&config.tool_name, &config.projects),
            executor: ProcessExecutor::new(sink),
            history: CommandHistory::new(config.history_capacity),
            notifier,
        }
    }

    /// Transcripts and notifications go to `tracing`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config, Arc::new(TracingSink), Arc::new(TracingNotifier))
    }

    /// Replaces the history ledger, e.g. to use another `ResponseClassifier`.
    pub fn with_history(mut self, history: CommandHistory) -> Self {
        self.history = history;
        self
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn find_project(&self, name: &str) -> Result<&Project> {
        self.projects
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::ProjectNotFound(name.to_string()))
    }

    pub fn system_installations(&self) -> Vec<SystemInstallation> {
        self.locator.installations_newest_first()
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Newest first.
    pub async fn get_command_history(&self) -> Vec<CommandHistoryEntry> {
        self.history.entries().await
    }

    async fn executable_for(
        &self,
        project: &Project,
        encoded: &EncodedCommand,
    ) -> Result<PathBuf> {
        match self.locator.locate(project.version.as_deref()) {
            Some(path) => Ok(path),
            None => {
                let error = Error::ExecutableNotFound {
                    version: project.version.clone(),
                };
                Err(self.not_started(project, encoded, error).await)
            }
        }
    }

    /// Writes a failure that happened before spawning to the sink and the
    /// history, and hands it back.
    async fn not_started(
        &self,
        project: &Project,
        encoded: &EncodedCommand,
        error: Error,
    ) -> Error {
        warn!("{} for {}: {}", encoded.command_text(), project.name, error);
        self.executor
            .report_unstarted(&encoded.args, Some(&project.name), &error);
        self.history
            .record(
                &project.name,
                &encoded.command_text(),
                &format!("ERROR: {}", error),
            )
            .await;
        error
    }

    async fn run_encoded(
        &self,
        program: &Path,
        project: &Project,
        encoded: &EncodedCommand,
    ) -> Result<ExecutionResult> {
        let outcome = self
            .executor
            .run(
                program,
                &encoded.args,
                encoded.cwd.as_deref(),
                Some(&project.name),
            )
            .await;

        let response = match &outcome {
            Ok(result) => {
                result.response_text(encoded.exit_rule.accepts(result.exit_code))
            }
            Err(e) => format!("ERROR: {}", e),
        };
        self.history
            .record(&project.name, &encoded.command_text(), &response)
            .await;

        outcome
    }

    /// Runs a waited project command and returns its raw result.
    async fn execute(
        &self,
        project: &Project,
        command: &PmonCommand,
    ) -> Result<(EncodedCommand, ExecutionResult)> {
        let encoded = encode(command, project);
        debug_assert_eq!(encoded.mode, ExecutionMode::Waited);
        let program = self.executable_for(project, &encoded).await?;
        let result = self.run_encoded(&program, project, &encoded).await?;
        Ok((encoded, result))
    }

    /// Runs a waited command and enforces its exit rule.
    async fn execute_checked(
        &self,
        project: &Project,
        command: &PmonCommand,
    ) -> Result<ExecutionResult> {
        let (encoded, result) = self.execute(project, command).await?;

        if encoded.exit_rule.accepts(result.exit_code) {
            Ok(result)
        } else {
            warn!(
                "{} for {} failed with exit code {}",
                command, project.name, result.exit_code
            );
            Err(Error::CommandFailed {
                command: encoded.command_text(),
                code: result.exit_code,
                detail: result.combined_output(),
            })
        }
    }

    /// Lifecycle commands additionally notify the user of the outcome.
    async fn execute_notified(&self, project: &Project, command: PmonCommand) -> Result<()> {
        match self.execute_checked(project, &command).await {
            Ok(_) => {
                self.notifier.notify(
                    NotifyLevel::Info,
                    &format!("{}: {} succeeded", project.name, command),
                );
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(
                    NotifyLevel::Error,
                    &format!("{}: {} failed: {}", project.name, command, e),
                );
                Err(e)
            }
        }
    }

    async fn launch(&self, project: &Project, command: PmonCommand) -> Result<DetachedLaunch> {
        let encoded = encode(&command, project);
        debug_assert_eq!(encoded.mode, ExecutionMode::Detached);
        let program = self.executable_for(project, &encoded).await?;

        let outcome = self
            .executor
            .spawn_detached(
                &program,
                &encoded.args,
                encoded.cwd.as_deref(),
                Some(&project.name),
            )
            .await;

        let response = match &outcome {
            Ok(_) => "OK".to_string(),
            Err(e) => format!("ERROR: {}", e),
        };
        self.history
            .record(&project.name, &encoded.command_text(), &response)
            .await;

        match &outcome {
            Ok(launch) => self.notifier.notify(
                NotifyLevel::Info,
                &format!(
                    "{}: {} launched (pid {})",
                    project.name,
                    command,
                    launch
                        .pid
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "?".to_string())
                ),
            ),
            Err(e) => self.notifier.notify(
                NotifyLevel::Error,
                &format!("{}: {} failed: {}", project.name, command, e),
            ),
        }

        outcome
    }

    /// 0 → running, 3 → not running, 4 → unknown. Any other code is an error.
    pub async fn check_status(&self, project: &Project) -> Result<RunningStatus> {
        let (_, result) = self.execute(project, &PmonCommand::Status).await?;

        RunningStatus::from_exit_code(result.exit_code).ok_or_else(|| {
            warn!(
                "Unexpected status exit code {} for {}",
                result.exit_code, project.name
            );
            Error::UnexpectedExitCode {
                operation: PmonCommand::Status.to_string(),
                code: result.exit_code,
                output: result.combined_output(),
            }
        })
    }

    /// Starts pmon without starting any manager.
    pub async fn start_pmon(&self, project: &Project) -> Result<DetachedLaunch> {
        self.launch(project, PmonCommand::StartPmonOnly).await
    }

    /// Launches pmon when it is not running, otherwise asks the running pmon
    /// to start all managers.
    pub async fn start_project(&self, project: &Project) -> Result<()> {
        match self.check_status(project).await? {
            RunningStatus::Running => self.execute_notified(project, PmonCommand::StartAll).await,
            RunningStatus::NotRunning | RunningStatus::Unknown => {
                info!("pmon not running for {}, launching it", project.name);
                self.launch(project, PmonCommand::StartProjectWithPmon)
                    .await
                    .map(|_| ())
            }
        }
    }

    pub async fn stop_project(&self, project: &Project) -> Result<()> {
        self.execute_notified(project, PmonCommand::StopAll).await
    }

    pub async fn stop_project_and_pmon(&self, project: &Project) -> Result<()> {
        self.execute_notified(project, PmonCommand::StopProjectAndPmon)
            .await
    }

    pub async fn restart_project(&self, project: &Project) -> Result<()> {
        self.execute_notified(project, PmonCommand::RestartAll).await
    }

    pub async fn set_wait_mode(&self, project: &Project) -> Result<()> {
        self.execute_notified(project, PmonCommand::WaitMode).await
    }

    pub async fn manager_action(
        &self,
        project: &Project,
        action: ManagerAction,
        index: usize,
    ) -> Result<()> {
        self.execute_notified(project, PmonCommand::SingleManager { action, index })
            .await
    }

    pub async fn start_manager(&self, project: &Project, index: usize) -> Result<()> {
        self.manager_action(project, ManagerAction::Start, index)
            .await
    }

    pub async fn stop_manager(&self, project: &Project, index: usize) -> Result<()> {
        self.manager_action(project, ManagerAction::Stop, index).await
    }

    pub async fn kill_manager(&self, project: &Project, index: usize) -> Result<()> {
        self.manager_action(project, ManagerAction::Kill, index).await
    }

    pub async fn remove_manager(&self, project: &Project, index: usize) -> Result<()> {
        self.manager_action(project, ManagerAction::Remove, index)
            .await
    }

    pub async fn get_manager_list(&self, project: &Project) -> Result<Vec<Manager>> {
        let result = self
            .execute_checked(project, &PmonCommand::ManagerList)
            .await?;
        Ok(parse_manager_list(&query_text(&result)))
    }

    pub async fn get_manager_status(&self, project: &Project) -> Result<ManagerStatusReport> {
        let result = self
            .execute_checked(project, &PmonCommand::ManagerStatus)
            .await?;
        Ok(parse_manager_status(&query_text(&result)))
    }

    /// Status check, then (only if pmon runs) both manager queries merged.
    pub async fn get_comprehensive_status(&self, project: &Project) -> Result<ComprehensiveStatus> {
        let running_status = self.check_status(project).await?;

        let (managers, project_state) = if running_status == RunningStatus::Running {
            let list = self.get_manager_list(project).await?;
            let status = self.get_manager_status(project).await?;
            (
                merge_manager_views(&list, &status.managers),
                status.project_state,
            )
        } else {
            (Vec::new(), None)
        };

        Ok(ComprehensiveStatus {
            running_status,
            managers,
            project_state,
            timestamp: Utc::now(),
        })
    }

    pub async fn get_health(&self, project: &Project) -> Result<HealthScore> {
        let status = self.get_comprehensive_status(project).await?;
        Ok(compute_health(
            &status.managers,
            status.project_state.as_ref(),
        ))
    }

    /// Version banner of a system installation's own pmon executable.
    pub async fn get_version_info(&self, system_project: &Project) -> Result<VersionInfo> {
        let program = self.locator.executable_path(&system_project.install_dir);
        let encoded = encode(&PmonCommand::Version, system_project);
        if !program.exists() {
            let error = Error::ExecutableNotFound {
                version: system_project.version.clone(),
            };
            return Err(self.not_started(system_project, &encoded, error).await);
        }

        let result = self.run_encoded(&program, system_project, &encoded).await?;
        if !encoded.exit_rule.accepts(result.exit_code) {
            return Err(Error::CommandFailed {
                command: encoded.command_text(),
                code: result.exit_code,
                detail: result.combined_output(),
            });
        }

        let text = query_text(&result);
        parse_version_banner(&text, &program).ok_or(Error::VersionUnparseable { output: text })
    }

    /// Succeeds only on exit code 3.
    pub async fn register_runnable_project(
        &self,
        project: &Project,
        config_path: &Path,
    ) -> Result<()> {
        self.execute_notified(
            project,
            PmonCommand::RegisterRunnable {
                config_path: config_path.to_path_buf(),
            },
        )
        .await
    }

    pub async fn register_sub_project(&self, project: &Project) -> Result<()> {
        self.execute_notified(project, PmonCommand::RegisterSubProject)
            .await
    }

    pub async fn unregister_project(&self, project: &Project) -> Result<()> {
        self.execute_notified(project, PmonCommand::Unregister).await
    }

    /// Checks every runnable project concurrently. One failing project does
    /// not fail the batch.
    pub async fn refresh_all_status(&self) -> Vec<ProjectStatusReport> {
        let checks = self
            .projects
            .iter()
            .filter(|p| p.is_runnable && !p.is_system_installation)
            .map(|project| async move {
                match self.check_status(project).await {
                    Ok(status) => ProjectStatusReport {
                        project: project.name.clone(),
                        status,
                        error: None,
                    },
                    Err(e) => {
                        warn!("Status check for {} failed: {}", project.name, e);
                        ProjectStatusReport {
                            project: project.name.clone(),
                            status: RunningStatus::Unknown,
                            error: Some(e.to_string()),
                        }
                    }
                }
            });

        futures::future::join_all(checks).await
    }
}

fn query_text(result: &ExecutionResult) -> String {
    if result.stderr.trim().is_empty() {
        result.stdout.clone()
    } else {
        format!("{}\n{}", result.stdout, result.stderr)
    }
}
