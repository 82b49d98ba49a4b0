//! SLURM command-line construction.
//!
//! Each operation is a pure formatting function producing the exact command
//! string to run on the login node. Optional parameters contribute their
//! flag only when provided, in a stable order; required parameters are
//! validated before any command is built.
//!
//! Every interpolated value goes through [`quote`], so no parameter value
//! can alter the argument boundaries of the generated command. Values made
//! of known-safe characters are emitted bare; everything else is wrapped in
//! POSIX single quotes with embedded quotes escaped.

use crate::mcp::error::McpError;

/// Characters that never need quoting on a POSIX command line.
///
/// Covers SLURM identifiers (job ids, usernames, partition and node names,
/// comma-separated node lists) and `sacct` date arguments.
fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ',' | ':' | '@' | '/' | '=' | '+')
}

/// Quote a value for safe interpolation into a remote shell command.
///
/// Values consisting solely of safe characters are returned as-is so the
/// common case (`squeue -u alice`) stays byte-identical to the bare
/// command. Anything else is wrapped in single quotes, with embedded
/// single quotes rewritten to `'"'"'`.
pub(crate) fn quote(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_safe_char) {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\"'\"'"))
    }
}

/// Validate a required parameter: present and non-blank.
fn require<'a>(name: &str, value: &'a str) -> Result<&'a str, McpError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(McpError::Validation(format!("{} is required", name)));
    }
    Ok(trimmed)
}

/// Append `flag value` to the command when the parameter is provided.
fn push_opt(parts: &mut Vec<String>, flag: &str, value: Option<&str>) {
    if let Some(value) = value {
        parts.push(flag.to_string());
        parts.push(quote(value));
    }
}

/// Build a `squeue` command with optional `-u`, `-j`, `-p`, `-o` flags.
pub fn squeue(
    user: Option<&str>,
    job_id: Option<&str>,
    partition: Option<&str>,
    format_str: Option<&str>,
) -> String {
    let mut parts = vec!["squeue".to_string()];
    push_opt(&mut parts, "-u", user);
    push_opt(&mut parts, "-j", job_id);
    push_opt(&mut parts, "-p", partition);
    push_opt(&mut parts, "-o", format_str);
    parts.join(" ")
}

/// Build a `sinfo` command with optional `-p`, `-n`, `-o` flags.
pub fn sinfo(partition: Option<&str>, nodes: Option<&str>, format_str: Option<&str>) -> String {
    let mut parts = vec!["sinfo".to_string()];
    push_opt(&mut parts, "-p", partition);
    push_opt(&mut parts, "-n", nodes);
    push_opt(&mut parts, "-o", format_str);
    parts.join(" ")
}

/// Build a `sacct` command with optional `-j`, `-u`, `-S`, `-E`, `-o` flags.
///
/// Date arguments are passed through as literal strings; the remote `sacct`
/// does its own parsing.
pub fn sacct(
    job_id: Option<&str>,
    user: Option<&str>,
    start_time: Option<&str>,
    end_time: Option<&str>,
    format_str: Option<&str>,
) -> String {
    let mut parts = vec!["sacct".to_string()];
    push_opt(&mut parts, "-j", job_id);
    push_opt(&mut parts, "-u", user);
    push_opt(&mut parts, "-S", start_time);
    push_opt(&mut parts, "-E", end_time);
    push_opt(&mut parts, "-o", format_str);
    parts.join(" ")
}

/// Build a `scontrol show job <job_id>` command. The job id is required.
pub fn scontrol_show_job(job_id: &str) -> Result<String, McpError> {
    let job_id = require("job_id", job_id)?;
    Ok(format!("scontrol show job {}", quote(job_id)))
}

/// Build a `scontrol show node [<node_name>]` command. Without a node name
/// the command reports all nodes.
pub fn scontrol_show_node(node_name: Option<&str>) -> String {
    match node_name {
        Some(name) => format!("scontrol show node {}", quote(name)),
        None => "scontrol show node".to_string(),
    }
}

/// Build a `scancel <job_id>` command. The job id is required.
pub fn scancel(job_id: &str) -> Result<String, McpError> {
    let job_id = require("job_id", job_id)?;
    Ok(format!("scancel {}", quote(job_id)))
}
