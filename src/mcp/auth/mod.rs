//! Authentication strategies for the cluster SSH session.
//!
//! A trait-based authentication system: each method (password, private key)
//! is a strategy, and [`AuthChain`] tries the configured strategies in
//! order. The chain is built once from [`crate::mcp::config::AuthMethod`],
//! key first when a key path is configured, password after.

mod chain;
mod key;
mod password;
mod traits;

pub use chain::AuthChain;
pub use key::KeyAuth;
pub use password::PasswordAuth;
pub use traits::AuthStrategy;
