//! Error types for netvisor-ztp.
//!
//! One crate-wide error enum covers parameter validation, the Netvisor cli
//! boundary, and configuration loading. A command that writes to stderr is
//! terminal for the whole run; the raw stderr is carried verbatim so the
//! caller sees exactly what the switch reported.

use thiserror::Error;

/// Result type alias for netvisor-ztp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for netvisor-ztp.
#[derive(Error, Debug)]
pub enum Error {
    /// Module not found in the registry.
    #[error("Module '{0}' not found")]
    ModuleNotFound(String),

    /// A required module parameter is missing.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// A module parameter has the wrong type or an out-of-range value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The cli binary could not be spawned.
    #[error("Failed to execute '{command}': {source}")]
    Spawn {
        /// The full command line that was attempted
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The switch rejected a command: stderr was non-empty.
    #[error("Operation Failed: {command}")]
    CommandRejected {
        /// The full command line that was run
        command: String,
        /// Raw stderr from the cli binary, trimmed
        stderr: String,
    },

    /// A show command returned output the decoder could not make sense of.
    #[error("Unexpected output from '{command}': {reason}")]
    MalformedOutput {
        /// The show command that produced the output
        command: String,
        /// What the decoder expected
        reason: String,
    },

    /// An IP range or interface address could not be parsed.
    #[error("Invalid address '{0}'")]
    AddressParse(String),

    /// Error loading settings.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Error reading a parameters file.
    #[error("Failed to read params file '{path}': {message}")]
    ParamsFile {
        /// Path to the params file
        path: String,
        /// Parse or IO error message
        message: String,
    },

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The stderr text to surface in a failure payload, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Error::CommandRejected { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    /// The command line associated with the failure, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            Error::Spawn { command, .. }
            | Error::CommandRejected { command, .. }
            | Error::MalformedOutput { command, .. } => Some(command),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_command_carries_stderr() {
        let err = Error::CommandRejected {
            command: "/usr/bin/cli --quiet vlan-create id 2".to_string(),
            stderr: "vlan-create: scope is required".to_string(),
        };
        assert_eq!(err.stderr(), Some("vlan-create: scope is required"));
        assert!(err.command().unwrap().contains("vlan-create"));
        assert!(err.to_string().starts_with("Operation Failed:"));
    }

    #[test]
    fn parameter_errors_have_no_stderr() {
        let err = Error::MissingParameter("pn_vlagname".to_string());
        assert!(err.stderr().is_none());
        assert!(err.command().is_none());
    }
}
