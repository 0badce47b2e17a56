//! Client library for the pmon process monitor.
//!
//! Every operation spawns the pmon executable of a matching runtime
//! installation, decodes its exit code and text output, and records the
//! exchange in a bounded command history.

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use error::{Error, Result};
