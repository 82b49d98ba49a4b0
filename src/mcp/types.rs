//! Serializable response types for the SLURM MCP tools.
//!
//! All types implement `Serialize`, `Deserialize`, and `JsonSchema` for
//! proper MCP protocol compatibility.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output of a remote SLURM command.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CommandOutput {
    /// The exact command line executed on the login node
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    /// Whether the command timed out (partial output may be available)
    #[serde(default)]
    pub timed_out: bool,
}

/// Connection state as reported by `get_connection_status`.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ConnectionStatusResponse {
    pub connected: bool,
    pub host: String,
    pub username: String,
    pub port: u16,
    /// When the current session was established (RFC3339 format)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<String>,
}

/// Result of a `disconnect` call.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DisconnectResponse {
    /// Whether a live session was actually closed (false when already disconnected)
    pub disconnected: bool,
    pub message: String,
}
