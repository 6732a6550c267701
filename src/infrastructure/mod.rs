//! Infrastructure layer module
//!
//! Adapters for everything outside the engine:
//! - HTTP generation backend client
//! - Configuration management
//! - Logging initialization
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod backend;
pub mod config;
pub mod logging;
