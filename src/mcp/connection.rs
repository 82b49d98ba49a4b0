//! The single persistent SSH session to the cluster login node.
//!
//! [`ConnectionManager`] owns the one session this process is allowed to
//! hold and serializes every operation against it:
//!
//! 1. **Lazy connect**: the session is opened on the first `execute` call
//!    (or after a disconnect), never at startup. Key authentication is
//!    tried before password when both are configured.
//!
//! 2. **Serialized execution**: the session slot lives behind an async
//!    mutex held for the full remote call, so concurrent tool invocations
//!    cannot interleave commands on the one session.
//!
//! 3. **Fail fast**: connection and authentication failures are never
//!    retried. A transport failure mid-command clears the slot, and the
//!    next call performs exactly one fresh connection attempt.
//!
//! 4. **Bounded execution**: each remote command runs under the configured
//!    command timeout; on expiry the channel is closed and the partial
//!    output is returned with `timed_out: true`, keeping the session alive.

use std::sync::Arc;
use std::time::Duration;

use russh::{ChannelMsg, Disconnect, client, keys};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::mcp::auth::{AuthChain, AuthStrategy};
use crate::mcp::config::ClusterConfig;
use crate::mcp::error::McpError;
use crate::mcp::types::{CommandOutput, ConnectionStatusResponse};

/// Client handler that accepts all host keys.
///
/// Equivalent to `StrictHostKeyChecking=no` in OpenSSH configuration. In
/// production environments this should be extended to verify against a
/// known_hosts store to prevent man-in-the-middle attacks.
pub struct AcceptingHandler;

impl client::Handler for AcceptingHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Build the russh client configuration for the persistent session.
///
/// The inactivity timeout is disabled so the session survives idle gaps
/// between tool calls; a 30 second keepalive (max 3 missed) detects dead
/// peers instead.
pub(crate) fn build_client_config() -> Arc<client::Config> {
    Arc::new(client::Config {
        inactivity_timeout: None,
        keepalive_interval: Some(Duration::from_secs(30)),
        keepalive_max: 3,
        ..Default::default()
    })
}

/// One live SSH session.
struct Session {
    handle: Arc<client::Handle<AcceptingHandler>>,
    connected_at: String,
}

/// Owner of the single SSH session to the configured cluster.
///
/// At most one underlying session exists per manager; all operations reuse
/// it until an explicit `disconnect` or a transport failure.
pub struct ConnectionManager {
    config: Arc<ClusterConfig>,
    session: Mutex<Option<Session>>,
}

impl ConnectionManager {
    pub fn new(config: Arc<ClusterConfig>) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    /// Run a command on the cluster login node, connecting first if needed.
    ///
    /// Holds the session lock for the duration of the remote call. The
    /// exit code is passed through uninterpreted; a transport failure
    /// clears the stored session so the next call reconnects.
    pub async fn execute(&self, command: &str) -> Result<CommandOutput, McpError> {
        let mut slot = self.session.lock().await;

        let reusable = slot
            .as_ref()
            .filter(|s| !s.handle.is_closed())
            .map(|s| s.handle.clone());

        let handle = match reusable {
            Some(handle) => handle,
            None => {
                if slot.take().is_some() {
                    warn!("Stored session is closed, reconnecting");
                }
                let session = self.connect().await?;
                let handle = session.handle.clone();
                *slot = Some(session);
                handle
            }
        };

        match run_remote(&handle, command, self.config.command_timeout).await {
            Ok(output) => Ok(output),
            Err(e) => {
                // Transport-level failure: drop the session so the next
                // call re-establishes it
                *slot = None;
                warn!("Transport failure running `{}`: {}", command, e);
                Err(McpError::Execution(format!(
                    "transport failure running `{}`: {}",
                    command, e
                )))
            }
        }
    }

    /// Report the current connection state. Pure read, no probe commands.
    pub async fn status(&self) -> ConnectionStatusResponse {
        let slot = self.session.lock().await;
        let live = slot.as_ref().filter(|s| !s.handle.is_closed());

        ConnectionStatusResponse {
            connected: live.is_some(),
            host: self.config.host.clone(),
            username: self.config.username.clone(),
            port: self.config.port,
            connected_at: live.map(|s| s.connected_at.clone()),
        }
    }

    /// Close the session if one is open. Idempotent; returns whether a
    /// live session was actually closed. Subsequent commands reconnect on
    /// demand.
    pub async fn disconnect(&self) -> bool {
        let mut slot = self.session.lock().await;

        match slot.take() {
            Some(session) => {
                if let Err(e) = session
                    .handle
                    .disconnect(Disconnect::ByApplication, "Session closed by user", "en")
                    .await
                {
                    warn!("Error during disconnect: {}", e);
                }
                info!("Disconnected from {}", self.config.host);
                true
            }
            None => false,
        }
    }

    /// Open and authenticate a fresh session. Single attempt, no retries.
    async fn connect(&self) -> Result<Session, McpError> {
        let config = &self.config;

        info!(
            "Connecting to {}@{}:{}",
            config.username, config.host, config.port
        );

        let connect_future = client::connect(
            build_client_config(),
            (config.host.as_str(), config.port),
            AcceptingHandler,
        );

        let mut handle = tokio::time::timeout(config.connect_timeout, connect_future)
            .await
            .map_err(|_| {
                McpError::Connection(format!(
                    "connection to {}:{} timed out after {:?}",
                    config.host, config.port, config.connect_timeout
                ))
            })?
            .map_err(|e| {
                McpError::Connection(format!(
                    "failed to connect to {}:{}: {}",
                    config.host, config.port, e
                ))
            })?;

        let chain = AuthChain::from_method(&config.auth);
        if chain.is_empty() {
            return Err(McpError::Configuration(
                "no credentials configured".to_string(),
            ));
        }

        let authenticated = chain
            .authenticate(&mut handle, &config.username)
            .await
            .map_err(McpError::Connection)?;

        if !authenticated {
            return Err(McpError::Connection(
                "authentication rejected by server".to_string(),
            ));
        }

        info!("Connected to {}@{}", config.username, config.host);

        Ok(Session {
            handle: Arc::new(handle),
            connected_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

/// Execute a command on an open session and collect its output.
///
/// Opens a session channel, runs the command, and gathers stdout, stderr,
/// and the exit status. On timeout the partial output collected so far is
/// returned with `timed_out: true` and `exit_code: -1`; the channel is
/// closed gracefully so the session stays usable.
///
/// Errors are transport-level only (channel open or exec failure), never
/// remote command failures.
async fn run_remote(
    handle: &Arc<client::Handle<AcceptingHandler>>,
    command: &str,
    timeout: Duration,
) -> Result<CommandOutput, String> {
    let mut channel = handle
        .channel_open_session()
        .await
        .map_err(|e| format!("Failed to open channel: {}", e))?;

    channel
        .exec(true, command)
        .await
        .map_err(|e| format!("Failed to execute command: {}", e))?;

    let mut stdout = Vec::with_capacity(4096);
    let mut stderr = Vec::with_capacity(1024);
    let mut exit_code: Option<u32> = None;
    let mut timed_out = false;

    let result = tokio::time::timeout(timeout, async {
        loop {
            match channel.wait().await {
                Some(ChannelMsg::Data { data }) => {
                    stdout.extend_from_slice(&data);
                }
                Some(ChannelMsg::ExtendedData { data, ext }) => {
                    // ext == 1 is stderr in SSH protocol
                    if ext == 1 {
                        stderr.extend_from_slice(&data);
                    }
                }
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    exit_code = Some(exit_status);
                }
                Some(ChannelMsg::Eof) => {
                    // Continue to wait for exit status if not received yet
                    if exit_code.is_some() {
                        break;
                    }
                }
                Some(ChannelMsg::Close) => {
                    break;
                }
                Some(_) => {
                    // Ignore other message types
                }
                None => {
                    // Channel closed
                    break;
                }
            }
        }
    })
    .await;

    if result.is_err() {
        timed_out = true;
        warn!(
            "Command `{}` timed out after {:?}, returning partial output ({} bytes stdout, {} bytes stderr)",
            command,
            timeout,
            stdout.len(),
            stderr.len()
        );
    }

    // Always close the channel gracefully to keep the session alive
    let _ = channel.close().await;

    Ok(CommandOutput {
        command: command.to_string(),
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code: exit_code.map(|c| c as i32).unwrap_or(-1),
        timed_out,
    })
}
