//! Tether CLI Library
//!
//! Command-line host for the Tether sync agent: loads configuration,
//! wires the remote store, local cache and connectivity together, and
//! implements the `save` / `load` / `status` / `flush` / `watch` commands.
//!
//! This library exposes the components for testing purposes.

pub mod commands;
pub mod config;
pub mod error;
pub mod host;

// Re-export commonly used types for convenience
pub use config::TetherConfig;
pub use error::{CliError, Result};
pub use host::{build_agent, spawn_connectivity_probe, Host};
