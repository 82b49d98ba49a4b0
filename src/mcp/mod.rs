//! MCP SLURM module providing SSH-backed cluster management tools.
//!
//! This module is organized into the following submodules:
//!
//! - `types`: Serializable response types for MCP tools
//! - `config`: Connection configuration loaded from the environment
//! - `error`: Typed error kinds surfaced to the MCP layer
//! - `slurm`: SLURM command-line construction with shell quoting
//! - `auth`: SSH authentication strategies
//! - `connection`: The single persistent SSH session and its lifecycle
//! - `commands`: MCP tool implementations

pub(crate) mod auth;
pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod slurm;
pub mod types;

pub use commands::SlurmTools;
pub use config::ClusterConfig;
pub use connection::ConnectionManager;
pub use error::McpError;
