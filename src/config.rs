//! Client configuration

use crate::error::{Error, Result};
use crate::models::Project;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_TOOL_NAME: &str = "WCCILpmon";
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// File name of the pmon companion executable, without `.exe`
    #[serde(default = "default_tool_name")]
    pub tool_name: String,

    /// Maximum number of command history entries kept in memory
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Project inventory, including system installations
    #[serde(default)]
    pub projects: Vec<Project>,
}

fn default_tool_name() -> String {
    DEFAULT_TOOL_NAME.to_string()
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tool_name: default_tool_name(),
            history_capacity: default_history_capacity(),
            projects: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// `<home>/.pmon-client/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| Error::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".pmon-client").join("config.json"))
    }

    /// `path`, else `PMON_CLIENT_CONFIG`, else the default location.
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => match std::env::var("PMON_CLIENT_CONFIG") {
                Ok(val) if !val.trim().is_empty() => Ok(PathBuf::from(val)),
                _ => Self::default_path(),
            },
        }
    }

    /// Loads from the resolved location, then applies environment overrides.
    /// A missing file gives the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        let mut config = Self::load_file(&path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        debug!(
            "Loaded config from {} ({} projects)",
            path.display(),
            config.projects.len()
        );
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PMON_TOOL_NAME") {
            if !val.trim().is_empty() {
                self.tool_name = val.trim().to_string();
            }
        }
        if let Ok(val) = std::env::var("PMON_HISTORY_CAPACITY") {
            match val.parse() {
                Ok(capacity) => self.history_capacity = capacity,
                Err(_) => warn!("Ignoring invalid PMON_HISTORY_CAPACITY={}", val),
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn find_project(&self, name: &str) -> Result<&Project> {
        self.projects
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::ProjectNotFound(name.to_string()))
    }
}
