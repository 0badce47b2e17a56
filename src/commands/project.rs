use crate::error::Result;
use crate::models::{
    CommandHistoryEntry, ComprehensiveStatus, HealthScore, ProjectStatusReport, RunningStatus,
};
use crate::state::AppState;

use super::transcript;

pub async fn check_status(state: &AppState, name: &str) -> Result<RunningStatus> {
    let project = state.project(name)?;
    state.client.check_status(project).await
}

pub async fn start_project(state: &AppState, name: &str) -> Result<Vec<CommandHistoryEntry>> {
    let project = state.project(name)?;
    state.client.start_project(project).await?;
    Ok(transcript(state).await)
}

pub async fn start_pmon(state: &AppState, name: &str) -> Result<Vec<CommandHistoryEntry>> {
    let project = state.project(name)?;
    state.client.start_pmon(project).await?;
    Ok(transcript(state).await)
}

pub async fn stop_project(state: &AppState, name: &str) -> Result<Vec<CommandHistoryEntry>> {
    let project = state.project(name)?;
    state.client.stop_project(project).await?;
    Ok(transcript(state).await)
}

pub async fn stop_project_and_pmon(
    state: &AppState,
    name: &str,
) -> Result<Vec<CommandHistoryEntry>> {
    let project = state.project(name)?;
    state.client.stop_project_and_pmon(project).await?;
    Ok(transcript(state).await)
}

pub async fn restart_project(state: &AppState, name: &str) -> Result<Vec<CommandHistoryEntry>> {
    let project = state.project(name)?;
    state.client.restart_project(project).await?;
    Ok(transcript(state).await)
}

pub async fn set_wait_mode(state: &AppState, name: &str) -> Result<Vec<CommandHistoryEntry>> {
    let project = state.project(name)?;
    state.client.set_wait_mode(project).await?;
    Ok(transcript(state).await)
}

pub async fn get_overview(state: &AppState, name: &str) -> Result<ComprehensiveStatus> {
    let project = state.project(name)?;
    state.client.get_comprehensive_status(project).await
}

pub async fn get_health(state: &AppState, name: &str) -> Result<HealthScore> {
    let project = state.project(name)?;
    state.client.get_health(project).await
}

pub async fn refresh_all(state: &AppState) -> Result<Vec<ProjectStatusReport>> {
    Ok(state.client.refresh_all_status().await)
}
