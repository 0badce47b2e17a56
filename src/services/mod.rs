pub mod command_encoder;
pub mod command_history;
pub mod executable_locator;
pub mod health_engine;
pub mod output_sink;
pub mod pmon_client;
pub mod process_executor;

pub use command_encoder::*;
pub use command_history::*;
pub use executable_locator::*;
pub use health_engine::*;
pub use output_sink::*;
pub use pmon_client::*;
pub use process_executor::*;
