pub mod manager;
pub mod project;
pub mod system;

pub use manager::*;
pub use project::*;
pub use system::*;

use crate::models::CommandHistoryEntry;
use crate::state::AppState;

/// Lifecycle handlers answer with the commands they issued, oldest first.
async fn transcript(state: &AppState) -> Vec<CommandHistoryEntry> {
    let mut entries = state.client.get_command_history().await;
    entries.reverse();
    entries
}
