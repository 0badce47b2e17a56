use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::Project;
use crate::services::PmonClient;
use std::path::PathBuf;

/// Shared state handed to every command handler.
pub struct AppState {
    pub config: ClientConfig,
    pub config_path: Option<PathBuf>,
    pub client: PmonClient,
}

impl AppState {
    pub fn new(config: ClientConfig, config_path: Option<PathBuf>) -> Self {
        let client = PmonClient::from_config(&config);
        Self {
            config,
            config_path,
            client,
        }
    }

    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config = ClientConfig::load(config_path.as_deref())?;
        Ok(Self::new(config, config_path))
    }

    pub fn project(&self, name: &str) -> Result<&Project> {
        self.client.find_project(name)
    }
}
