//! HTTP API module.
//!
//! This module provides the HTTP server, the log broadcaster and the API
//! types for the Tableport engine.

pub mod logs;
pub mod server;
pub mod types;

pub use server::start_server;
pub use types::*;
