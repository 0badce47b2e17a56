use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub project: String,
    pub command: String,
    pub response: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_reason: Option<String>,
}
