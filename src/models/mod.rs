pub mod health;
pub mod history;
pub mod manager;
pub mod process_info;
pub mod project;
pub mod project_state;
pub mod version_info;

pub use health::*;
pub use history::*;
pub use manager::*;
pub use process_info::*;
pub use project::*;
pub use project_state::*;
pub use version_info::*;
