pub mod mgr_list_parser;
pub mod mgr_status_parser;
pub mod version_banner;
pub mod version_number;

pub use mgr_list_parser::*;
pub use mgr_status_parser::*;
pub use version_banner::*;
pub use version_number::*;
