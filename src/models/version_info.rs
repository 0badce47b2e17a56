use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const UNKNOWN_FIELD: &str = "Unknown";

/// Decoded `-version` banner of a pmon executable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionInfo {
    pub version: String,
    pub platform: String,
    pub architecture: String,
    pub build_date: String,
    pub commit_hash: String,
    pub raw_output: String,
    pub executable_path: PathBuf,
}
