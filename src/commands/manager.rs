use crate::error::Result;
use crate::models::{CommandHistoryEntry, Manager, ManagerStatusReport};
use crate::services::ManagerAction;
use crate::state::AppState;

use super::transcript;

pub async fn get_managers(state: &AppState, name: &str) -> Result<Vec<Manager>> {
    let project = state.project(name)?;
    state.client.get_manager_list(project).await
}

pub async fn get_manager_status(state: &AppState, name: &str) -> Result<ManagerStatusReport> {
    let project = state.project(name)?;
    state.client.get_manager_status(project).await
}

pub async fn manager_action(
    state: &AppState,
    name: &str,
    action: ManagerAction,
    index: usize,
) -> Result<Vec<CommandHistoryEntry>> {
    let project = state.project(name)?;
    state.client.manager_action(project, action, index).await?;
    Ok(transcript(state).await)
}
