//! Typed errors surfaced to the MCP layer.
//!
//! Every failure a tool can report falls into one of four kinds:
//!
//! 1. **Configuration**: Missing or invalid connection parameters at startup
//!    (unset credentials, unparsable port).
//!
//! 2. **Connection**: SSH handshake or authentication failure, network
//!    unreachable. Never retried; each call fails fast and the next call
//!    attempts a fresh connection.
//!
//! 3. **Execution**: The remote command exited non-zero, or the transport
//!    failed mid-command. A transport failure clears the stored session so
//!    the next call reconnects.
//!
//! 4. **Validation**: A required tool parameter is missing or empty.
//!
//! The `Display` form is `<kind> error: <message>`, so failures crossing the
//! tool boundary as strings still carry both kind and message.

use thiserror::Error;

/// Error type for all SLURM MCP tool failures.
#[derive(Debug, Error)]
pub enum McpError {
    /// Missing or invalid connection parameters.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// SSH handshake, authentication, or network failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// Remote command failed: non-zero exit or transport error mid-command.
    #[error("execution error: {0}")]
    Execution(String),

    /// Missing or empty required tool parameter.
    #[error("validation error: {0}")]
    Validation(String),
}

impl McpError {
    /// Stable kind identifier for structured error reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            McpError::Configuration(_) => "configuration",
            McpError::Connection(_) => "connection",
            McpError::Execution(_) => "execution",
            McpError::Validation(_) => "validation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod kinds {
        use super::*;

        #[test]
        fn test_kind_strings() {
            assert_eq!(McpError::Configuration("x".into()).kind(), "configuration");
            assert_eq!(McpError::Connection("x".into()).kind(), "connection");
            assert_eq!(McpError::Execution("x".into()).kind(), "execution");
            assert_eq!(McpError::Validation("x".into()).kind(), "validation");
        }
    }

    mod display {
        use super::*;

        #[test]
        fn test_display_carries_kind_and_message() {
            let err = McpError::Connection("handshake failed".into());
            assert_eq!(err.to_string(), "connection error: handshake failed");
        }

        #[test]
        fn test_validation_display() {
            let err = McpError::Validation("job_id is required".into());
            assert_eq!(err.to_string(), "validation error: job_id is required");
        }

        #[test]
        fn test_display_starts_with_kind() {
            let err = McpError::Execution("scancel exited with status 1".into());
            assert!(err.to_string().starts_with(err.kind()));
        }
    }
}
