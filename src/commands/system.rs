use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{CommandHistoryEntry, Project, VersionInfo};
use crate::services::{PmonClient, SystemInstallation};
use crate::state::AppState;
use std::path::PathBuf;
use tracing::info;

use super::transcript;

pub fn get_installations(state: &AppState) -> Vec<SystemInstallation> {
    state.client.system_installations()
}

/// Version banner of the given installation, or of the newest one.
pub async fn get_version(state: &AppState, version: Option<&str>) -> Result<VersionInfo> {
    let installations = state.client.system_installations();
    let installation = match version {
        Some(version) => installations.into_iter().find(|i| i.version == version),
        None => installations.into_iter().next(),
    }
    .ok_or_else(|| Error::ExecutableNotFound {
        version: version.map(str::to_string),
    })?;

    let system = Project::system(installation.version, installation.install_dir);
    state.client.get_version_info(&system).await
}

/// Registers a runnable project with pmon and adds it to the inventory.
///
/// `config_file` defaults to `<dir>/config/config`.
pub async fn register_project(
    state: &mut AppState,
    name: &str,
    dir: PathBuf,
    version: Option<String>,
    config_file: Option<PathBuf>,
) -> Result<Vec<CommandHistoryEntry>> {
    let existing = state.client.find_project(name).ok().cloned();
    let project = match existing {
        Some(project) => project,
        None => {
            let mut project = Project::new(name, dir);
            project.version = version;
            project
        }
    };
    let config_file =
        config_file.unwrap_or_else(|| project.install_dir.join("config").join("config"));

    state
        .client
        .register_runnable_project(&project, &config_file)
        .await?;
    let entries = transcript(state).await;

    if state.client.find_project(name).is_err() {
        let path = ClientConfig::resolve_path(state.config_path.as_deref())?;
        state.config.projects.push(project);
        state.config.save(&path)?;
        state.client = PmonClient::from_config(&state.config);
        info!("Added {} to inventory at {}", name, path.display());
    }

    Ok(entries)
}

pub async fn register_sub_project(
    state: &AppState,
    name: &str,
) -> Result<Vec<CommandHistoryEntry>> {
    let project = state.project(name)?;
    state.client.register_sub_project(project).await?;
    Ok(transcript(state).await)
}

pub async fn unregister_project(state: &AppState, name: &str) -> Result<Vec<CommandHistoryEntry>> {
    let project = state.project(name)?;
    state.client.unregister_project(project).await?;
    Ok(transcript(state).await)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn write_pmon(runtime_dir: &std::path::Path, script: &str) {
        fs::create_dir_all(runtime_dir.join("bin")).unwrap();
        let exe = runtime_dir.join("bin").join("WCCILpmon");
        fs::write(&exe, format!("#!/bin/sh\n{}\n", script)).unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn state_with_runtime(root: &std::path::Path, script: &str) -> AppState {
        let runtime_dir = root.join("runtime");
        write_pmon(&runtime_dir, script);
        fs::create_dir_all(root.join("plant")).unwrap();
        let config = ClientConfig {
            projects: vec![Project::system("3.20", &runtime_dir)],
            ..Default::default()
        };
        AppState::new(config, Some(root.join("config.json")))
    }

    #[tokio::test]
    async fn register_adds_project_to_saved_inventory() {
        let root = tempfile::tempdir().unwrap();
        let mut state = state_with_runtime(root.path(), "exit 3");

        let entries = register_project(
            &mut state,
            "plant",
            root.path().join("plant"),
            Some("3.20".to_string()),
            None,
        )
        .await
        .unwrap();

        assert_eq!(entries.len(), 1);
        assert!(entries[0].command.ends_with("-autofreg"));
        assert!(state.project("plant").is_ok());

        let saved = ClientConfig::load_file(&root.path().join("config.json")).unwrap();
        assert_eq!(saved.projects.len(), 2);
        assert_eq!(saved.projects[1].version.as_deref(), Some("3.20"));
    }

    #[tokio::test]
    async fn failed_registration_leaves_inventory_alone() {
        let root = tempfile::tempdir().unwrap();
        let mut state = state_with_runtime(root.path(), "exit 0");

        let result = register_project(
            &mut state,
            "plant",
            root.path().join("plant"),
            Some("3.20".to_string()),
            None,
        )
        .await;

        assert!(matches!(result, Err(Error::CommandFailed { code: 0, .. })));
        assert!(state.project("plant").is_err());
        assert!(!root.path().join("config.json").exists());
    }

    #[tokio::test]
    async fn version_of_unknown_installation() {
        let root = tempfile::tempdir().unwrap();
        let state = state_with_runtime(root.path(), "exit 0");
        let err = get_version(&state, Some("4.0")).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
