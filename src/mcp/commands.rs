//! MCP SLURM tool implementations.
//!
//! This module provides the MCP tools for cluster management:
//!
//! - `squeue`: Query the job queue
//! - `sinfo`: Query partition and node status
//! - `sacct`: Query job accounting information
//! - `scontrol_show_job`: Show details for one job
//! - `scontrol_show_node`: Show details for one node, or all nodes
//! - `scancel`: Cancel a job
//! - `get_connection_status`: Report the SSH connection state
//! - `disconnect`: Close the SSH session
//!
//! Each command tool formats a command line, delegates execution to the
//! [`ConnectionManager`], and shapes the result: exit status 0 becomes a
//! structured success, anything else a structured failure carrying the
//! error kind and the remote stderr.

use std::sync::Arc;

use poem_mcpserver::{Tools, tool::StructuredContent};
use tracing::{info, warn};

use super::connection::ConnectionManager;
use super::error::McpError;
use super::slurm;
use super::types::{CommandOutput, ConnectionStatusResponse, DisconnectResponse};

/// MCP SLURM tools backed by one shared connection manager.
pub struct SlurmTools {
    manager: Arc<ConnectionManager>,
}

impl SlurmTools {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    /// Execute a built command and shape the outcome.
    ///
    /// A non-zero exit status becomes an execution error quoting the
    /// command and the remote stderr; a timed-out command returns its
    /// partial output instead (the `timed_out` flag tells the caller).
    async fn dispatch(&self, command: String) -> Result<StructuredContent<CommandOutput>, String> {
        info!("Dispatching `{}`", command);

        let output = self
            .manager
            .execute(&command)
            .await
            .map_err(|e| e.to_string())?;

        if output.exit_code != 0 && !output.timed_out {
            warn!(
                "`{}` exited with status {}: {}",
                command,
                output.exit_code,
                output.stderr.trim()
            );
            let detail = if output.stderr.trim().is_empty() {
                format!("`{}` exited with status {}", command, output.exit_code)
            } else {
                format!(
                    "`{}` exited with status {}: {}",
                    command,
                    output.exit_code,
                    output.stderr.trim()
                )
            };
            return Err(McpError::Execution(detail).to_string());
        }

        Ok(StructuredContent(output))
    }
}

#[Tools]
impl SlurmTools {
    /// Query the SLURM job queue to see running and pending jobs.
    async fn squeue(
        &self,
        /// Filter jobs by username
        user: Option<String>,
        /// Show a specific job by ID
        job_id: Option<String>,
        /// Filter jobs by partition/queue name
        partition: Option<String>,
        /// Custom squeue format string (advanced users)
        format_str: Option<String>,
    ) -> Result<StructuredContent<CommandOutput>, String> {
        let command = slurm::squeue(
            user.as_deref(),
            job_id.as_deref(),
            partition.as_deref(),
            format_str.as_deref(),
        );
        self.dispatch(command).await
    }

    /// Query SLURM cluster information including partitions and node status.
    async fn sinfo(
        &self,
        /// Show information for a specific partition
        partition: Option<String>,
        /// Show information for specific nodes (comma-separated)
        nodes: Option<String>,
        /// Custom sinfo format string (advanced users)
        format_str: Option<String>,
    ) -> Result<StructuredContent<CommandOutput>, String> {
        let command = slurm::sinfo(partition.as_deref(), nodes.as_deref(), format_str.as_deref());
        self.dispatch(command).await
    }

    /// Query SLURM job accounting information for completed jobs.
    async fn sacct(
        &self,
        /// Show accounting info for a specific job ID
        job_id: Option<String>,
        /// Filter jobs by username
        user: Option<String>,
        /// Start of the query window (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
        start_time: Option<String>,
        /// End of the query window (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
        end_time: Option<String>,
        /// Custom sacct format string (advanced users)
        format_str: Option<String>,
    ) -> Result<StructuredContent<CommandOutput>, String> {
        let command = slurm::sacct(
            job_id.as_deref(),
            user.as_deref(),
            start_time.as_deref(),
            end_time.as_deref(),
            format_str.as_deref(),
        );
        self.dispatch(command).await
    }

    /// Show detailed information about a specific SLURM job.
    async fn scontrol_show_job(
        &self,
        /// Job ID to show details for
        job_id: String,
    ) -> Result<StructuredContent<CommandOutput>, String> {
        let command = slurm::scontrol_show_job(&job_id).map_err(|e| e.to_string())?;
        self.dispatch(command).await
    }

    /// Show detailed information about SLURM nodes.
    async fn scontrol_show_node(
        &self,
        /// Specific node name to show (omit to show all nodes)
        node_name: Option<String>,
    ) -> Result<StructuredContent<CommandOutput>, String> {
        let command = slurm::scontrol_show_node(node_name.as_deref());
        self.dispatch(command).await
    }

    /// Cancel a SLURM job.
    async fn scancel(
        &self,
        /// Job ID to cancel
        job_id: String,
    ) -> Result<StructuredContent<CommandOutput>, String> {
        let command = slurm::scancel(&job_id).map_err(|e| e.to_string())?;
        let output = self.dispatch(command).await?;
        info!("Cancelled job {}", job_id);
        Ok(output)
    }

    /// Check the status of the SSH connection to the SLURM cluster.
    async fn get_connection_status(&self) -> StructuredContent<ConnectionStatusResponse> {
        StructuredContent(self.manager.status().await)
    }

    /// Disconnect from the SLURM cluster. The next command reconnects on
    /// demand.
    async fn disconnect(&self) -> StructuredContent<DisconnectResponse> {
        let disconnected = self.manager.disconnect().await;
        let message = if disconnected {
            "Disconnected from SLURM cluster".to_string()
        } else {
            "No active session".to_string()
        };
        StructuredContent(DisconnectResponse {
            disconnected,
            message,
        })
    }
}
