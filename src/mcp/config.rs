//! Connection configuration for the SLURM MCP server.
//!
//! All connection parameters are read from the environment once at process
//! start and frozen into a [`ClusterConfig`]; the components that need them
//! receive the struct by reference instead of consulting the environment
//! themselves.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SLURM_HOST` | `localhost` | Cluster login host |
//! | `SLURM_PORT` | 22 | SSH port |
//! | `SLURM_USER` | `$USER` | SSH username |
//! | `SLURM_KEY_FILE` | - | Path to a private key (tried first) |
//! | `SLURM_PASSWORD` | - | Password (tried after the key, or alone) |
//! | `SLURM_CONNECT_TIMEOUT` | 30s | SSH connection timeout in seconds |
//! | `SLURM_COMMAND_TIMEOUT` | 180s | Remote command execution timeout in seconds |
//!
//! At least one of `SLURM_KEY_FILE` / `SLURM_PASSWORD` must be set. Invalid
//! timeout values fall back to the defaults; an invalid `SLURM_PORT` is a
//! configuration error.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::mcp::error::McpError;

/// Default SSH port
pub(crate) const DEFAULT_PORT: u16 = 22;

/// Default SSH connection timeout in seconds
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default remote command execution timeout in seconds
pub(crate) const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 180;

/// Environment variable name for the cluster login host
pub(crate) const HOST_ENV_VAR: &str = "SLURM_HOST";

/// Environment variable name for the SSH port
pub(crate) const PORT_ENV_VAR: &str = "SLURM_PORT";

/// Environment variable name for the SSH username
pub(crate) const USER_ENV_VAR: &str = "SLURM_USER";

/// Environment variable name for the SSH password
pub(crate) const PASSWORD_ENV_VAR: &str = "SLURM_PASSWORD";

/// Environment variable name for the private key path
pub(crate) const KEY_FILE_ENV_VAR: &str = "SLURM_KEY_FILE";

/// Environment variable name for the SSH connection timeout
pub(crate) const CONNECT_TIMEOUT_ENV_VAR: &str = "SLURM_CONNECT_TIMEOUT";

/// Environment variable name for the command execution timeout
pub(crate) const COMMAND_TIMEOUT_ENV_VAR: &str = "SLURM_COMMAND_TIMEOUT";

/// Credentials for authenticating the SSH session.
///
/// Key and password are not mutually exclusive: when both are configured
/// the key is tried first and the password is kept as a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthMethod {
    /// Private key path, tried first when present
    pub key_path: Option<PathBuf>,
    /// Password, tried after the key (or alone)
    pub password: Option<String>,
}

/// Immutable connection parameters for the one SLURM cluster this process
/// talks to. Loaded once at startup via [`ClusterConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth: AuthMethod,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
}

impl ClusterConfig {
    /// Load the configuration from the process environment.
    ///
    /// Fails with a configuration error when the port is unparsable, no
    /// username can be determined, or neither key nor password is set.
    pub fn from_env() -> Result<Self, McpError> {
        let host = env::var(HOST_ENV_VAR).unwrap_or_else(|_| "localhost".to_string());

        let port = match env::var(PORT_ENV_VAR) {
            Ok(raw) => raw.parse::<u16>().map_err(|e| {
                McpError::Configuration(format!("invalid {}: {}", PORT_ENV_VAR, e))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let username = env::var(USER_ENV_VAR)
            .or_else(|_| env::var("USER"))
            .map_err(|_| {
                McpError::Configuration(format!(
                    "no username: set {} (or USER)",
                    USER_ENV_VAR
                ))
            })?;

        let key_path = env::var(KEY_FILE_ENV_VAR).ok().map(PathBuf::from);
        let password = env::var(PASSWORD_ENV_VAR).ok();

        if key_path.is_none() && password.is_none() {
            return Err(McpError::Configuration(format!(
                "no credentials: set {} or {}",
                KEY_FILE_ENV_VAR, PASSWORD_ENV_VAR
            )));
        }

        Ok(Self {
            host,
            port,
            username,
            auth: AuthMethod { key_path, password },
            connect_timeout: Duration::from_secs(resolve_timeout_secs(
                CONNECT_TIMEOUT_ENV_VAR,
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            command_timeout: Duration::from_secs(resolve_timeout_secs(
                COMMAND_TIMEOUT_ENV_VAR,
                DEFAULT_COMMAND_TIMEOUT_SECS,
            )),
        })
    }
}

/// Resolve a timeout from an environment variable, falling back to the
/// default on missing or unparsable values.
pub(crate) fn resolve_timeout_secs(var: &str, default: u64) -> u64 {
    if let Ok(raw) = env::var(var)
        && let Ok(secs) = raw.parse::<u64>()
    {
        return secs;
    }

    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    // Use a mutex to serialize env var tests to avoid race conditions
    // SAFETY: Tests are serialized via ENV_TEST_MUTEX to prevent data races
    static ENV_TEST_MUTEX: once_cell::sync::Lazy<StdMutex<()>> =
        once_cell::sync::Lazy::new(|| StdMutex::new(()));

    /// Helper to set an environment variable safely within tests.
    /// SAFETY: Must be called while holding ENV_TEST_MUTEX to prevent data races.
    unsafe fn set_env(key: &str, value: &str) {
        // SAFETY: Caller ensures ENV_TEST_MUTEX is held
        unsafe { env::set_var(key, value) };
    }

    /// Helper to remove an environment variable safely within tests.
    /// SAFETY: Must be called while holding ENV_TEST_MUTEX to prevent data races.
    unsafe fn remove_env(key: &str) {
        // SAFETY: Caller ensures ENV_TEST_MUTEX is held
        unsafe { env::remove_var(key) };
    }

    /// Clear every SLURM_* variable so each test starts from a known state.
    /// SAFETY: Must be called while holding ENV_TEST_MUTEX to prevent data races.
    unsafe fn clear_slurm_env() {
        for var in [
            HOST_ENV_VAR,
            PORT_ENV_VAR,
            USER_ENV_VAR,
            PASSWORD_ENV_VAR,
            KEY_FILE_ENV_VAR,
            CONNECT_TIMEOUT_ENV_VAR,
            COMMAND_TIMEOUT_ENV_VAR,
        ] {
            // SAFETY: Caller ensures ENV_TEST_MUTEX is held
            unsafe { remove_env(var) };
        }
    }

    mod from_env {
        use super::*;

        #[test]
        fn test_full_configuration() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
                set_env(HOST_ENV_VAR, "cluster.example.com");
                set_env(PORT_ENV_VAR, "2222");
                set_env(USER_ENV_VAR, "alice");
                set_env(PASSWORD_ENV_VAR, "secret");
            }
            let config = ClusterConfig::from_env().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
            }

            assert_eq!(config.host, "cluster.example.com");
            assert_eq!(config.port, 2222);
            assert_eq!(config.username, "alice");
            assert_eq!(config.auth.password, Some("secret".to_string()));
            assert_eq!(config.auth.key_path, None);
        }

        #[test]
        fn test_host_defaults_to_localhost() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
                set_env(USER_ENV_VAR, "alice");
                set_env(PASSWORD_ENV_VAR, "secret");
            }
            let config = ClusterConfig::from_env().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
            }

            assert_eq!(config.host, "localhost");
            assert_eq!(config.port, DEFAULT_PORT);
        }

        #[test]
        fn test_key_file_alone_is_sufficient() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
                set_env(USER_ENV_VAR, "alice");
                set_env(KEY_FILE_ENV_VAR, "/home/alice/.ssh/id_ed25519");
            }
            let config = ClusterConfig::from_env().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
            }

            assert_eq!(
                config.auth.key_path,
                Some(PathBuf::from("/home/alice/.ssh/id_ed25519"))
            );
            assert_eq!(config.auth.password, None);
        }

        #[test]
        fn test_key_and_password_both_kept() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
                set_env(USER_ENV_VAR, "alice");
                set_env(KEY_FILE_ENV_VAR, "/key");
                set_env(PASSWORD_ENV_VAR, "secret");
            }
            let config = ClusterConfig::from_env().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
            }

            assert!(config.auth.key_path.is_some());
            assert!(config.auth.password.is_some());
        }

        #[test]
        fn test_missing_credentials_is_configuration_error() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
                set_env(USER_ENV_VAR, "alice");
            }
            let result = ClusterConfig::from_env();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
            }

            match result {
                Err(McpError::Configuration(msg)) => {
                    assert!(msg.contains(KEY_FILE_ENV_VAR));
                    assert!(msg.contains(PASSWORD_ENV_VAR));
                }
                other => panic!("expected configuration error, got {:?}", other),
            }
        }

        #[test]
        fn test_invalid_port_is_configuration_error() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
                set_env(USER_ENV_VAR, "alice");
                set_env(PASSWORD_ENV_VAR, "secret");
                set_env(PORT_ENV_VAR, "not-a-port");
            }
            let result = ClusterConfig::from_env();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
            }

            assert!(matches!(result, Err(McpError::Configuration(_))));
        }

        #[test]
        fn test_port_out_of_range_is_configuration_error() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
                set_env(USER_ENV_VAR, "alice");
                set_env(PASSWORD_ENV_VAR, "secret");
                set_env(PORT_ENV_VAR, "99999");
            }
            let result = ClusterConfig::from_env();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
            }

            assert!(matches!(result, Err(McpError::Configuration(_))));
        }

        #[test]
        fn test_username_falls_back_to_user_env() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
                set_env("USER", "fallback-user");
                set_env(PASSWORD_ENV_VAR, "secret");
            }
            let config = ClusterConfig::from_env().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
            }

            assert_eq!(config.username, "fallback-user");
        }

        #[test]
        fn test_slurm_user_takes_priority_over_user() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
                set_env(USER_ENV_VAR, "cluster-user");
                set_env("USER", "local-user");
                set_env(PASSWORD_ENV_VAR, "secret");
            }
            let config = ClusterConfig::from_env().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                clear_slurm_env();
            }

            assert_eq!(config.username, "cluster-user");
        }
    }

    mod timeout_resolution {
        use super::*;

        #[test]
        fn test_uses_env_var_when_set() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                set_env(COMMAND_TIMEOUT_ENV_VAR, "240");
            }
            let result = resolve_timeout_secs(COMMAND_TIMEOUT_ENV_VAR, DEFAULT_COMMAND_TIMEOUT_SECS);
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(COMMAND_TIMEOUT_ENV_VAR);
            }
            assert_eq!(result, 240);
        }

        #[test]
        fn test_uses_default_when_unset() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(CONNECT_TIMEOUT_ENV_VAR);
            }
            let result = resolve_timeout_secs(CONNECT_TIMEOUT_ENV_VAR, DEFAULT_CONNECT_TIMEOUT_SECS);
            assert_eq!(result, DEFAULT_CONNECT_TIMEOUT_SECS);
        }

        #[test]
        fn test_ignores_invalid_env_var() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                set_env(CONNECT_TIMEOUT_ENV_VAR, "soon");
            }
            let result = resolve_timeout_secs(CONNECT_TIMEOUT_ENV_VAR, DEFAULT_CONNECT_TIMEOUT_SECS);
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(CONNECT_TIMEOUT_ENV_VAR);
            }
            assert_eq!(result, DEFAULT_CONNECT_TIMEOUT_SECS);
        }

        #[test]
        fn test_ignores_negative_env_var() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                set_env(COMMAND_TIMEOUT_ENV_VAR, "-5");
            }
            let result = resolve_timeout_secs(COMMAND_TIMEOUT_ENV_VAR, DEFAULT_COMMAND_TIMEOUT_SECS);
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(COMMAND_TIMEOUT_ENV_VAR);
            }
            // Parsing fails for negative u64, so default is used
            assert_eq!(result, DEFAULT_COMMAND_TIMEOUT_SECS);
        }
    }

    mod defaults {
        use super::*;

        #[test]
        fn test_default_values() {
            assert_eq!(DEFAULT_PORT, 22);
            assert_eq!(DEFAULT_CONNECT_TIMEOUT_SECS, 30);
            assert_eq!(DEFAULT_COMMAND_TIMEOUT_SECS, 180);
        }
    }
}
