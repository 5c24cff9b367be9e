//! Building and running Netvisor cli commands.
//!
//! A [`CliSession`] owns the authentication prefix and the transport used to
//! execute commands. Commands are assembled as plain strings, tokenized with
//! shell-words, and run synchronously; the reply is classified from the
//! captured streams:
//!
//! - non-empty stdout: the reply text (show output or an acknowledgement)
//! - non-empty stderr: terminal failure, surfaced verbatim
//! - both empty: acknowledged, reported as `Success`
//!
//! There is no retry and no timeout; a rejected command aborts the whole run.

use crate::error::{Error, Result};
use crate::netvisor::show::ShowOutput;
use std::process::Command;
use std::sync::Arc;
use tracing::debug;

/// Acknowledgement token the cli prints for commands with no tabular output.
pub const ACK: &str = "Success";

/// Captured streams from one cli invocation.
#[derive(Debug, Clone, Default)]
pub struct RawOutput {
    pub stdout: String,
    pub stderr: String,
}

impl RawOutput {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stdout: text.into(),
            stderr: String::new(),
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: text.into(),
        }
    }

    /// Empty stdout and stderr: the command was acknowledged silently.
    pub fn ack() -> Self {
        Self::default()
    }
}

/// Executes an argv on behalf of a session.
///
/// The production implementation spawns the cli binary; tests substitute a
/// scripted fake so module behavior can be exercised without a switch.
pub trait CliTransport: Send + Sync {
    fn exec(&self, argv: &[String]) -> std::io::Result<RawOutput>;
}

/// Transport that spawns the cli binary as a child process and blocks until
/// it exits.
pub struct Subprocess;

impl CliTransport for Subprocess {
    fn exec(&self, argv: &[String]) -> std::io::Result<RawOutput> {
        let output = Command::new(&argv[0]).args(&argv[1..]).output()?;
        Ok(RawOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// One successfully classified cli reply.
#[derive(Debug, Clone)]
pub struct CliReply {
    text: String,
}

impl CliReply {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The raw reply text. `Success` for silently acknowledged commands.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the switch acknowledged the command.
    pub fn is_ack(&self) -> bool {
        self.text.contains(ACK)
    }

    /// Decode the reply as tabular show output.
    pub fn show(self) -> ShowOutput {
        ShowOutput::decode(&self.text)
    }
}

/// A logical session against one switch's cli binary.
///
/// Holds the fixed invocation prefix (binary path, quiet flag, credentials,
/// optional switch scope) and the transport. Cheap to clone the pieces of;
/// every command re-states the full prefix, as the cli itself is stateless.
pub struct CliSession {
    transport: Arc<dyn CliTransport>,
    prefix: String,
}

impl CliSession {
    /// Build a session prefix from credentials and the quiet flag.
    ///
    /// With credentials the prefix is `<cli> --quiet --user <u>:<p> `;
    /// without, the user clause is omitted.
    pub fn new(
        transport: Arc<dyn CliTransport>,
        cli_path: &str,
        username: Option<&str>,
        password: Option<&str>,
        quiet: bool,
    ) -> Self {
        let mut prefix = cli_path.to_string();
        if quiet {
            prefix.push_str(" --quiet");
        }
        if let (Some(user), Some(pass)) = (username, password) {
            prefix.push_str(&format!(" --user {}:{}", user, pass));
        }
        prefix.push(' ');
        Self { transport, prefix }
    }

    /// A session whose commands are scoped to a named switch, as the vlan
    /// module does with `switch <name>` / `switch-local`.
    pub fn scoped_to(&self, switch: &str) -> Self {
        let scope = if switch == "local" {
            "switch-local ".to_string()
        } else {
            format!("switch {} ", switch)
        };
        Self {
            transport: Arc::clone(&self.transport),
            prefix: format!("{}{}", self.prefix, scope),
        }
    }

    /// The invocation prefix, mainly echoed back in payloads.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Run `prefix + tail` and classify the result.
    pub fn run(&self, tail: &str) -> Result<CliReply> {
        let command = format!("{}{}", self.prefix, tail.trim());
        debug!(command = %command, "running cli command");

        let argv = shell_words::split(&command)
            .map_err(|e| Error::InvalidParameter(format!("unparsable command '{}': {}", command, e)))?;
        if argv.is_empty() {
            return Err(Error::InvalidParameter("empty command".to_string()));
        }

        let raw = self
            .transport
            .exec(&argv)
            .map_err(|source| Error::Spawn {
                command: command.clone(),
                source,
            })?;

        if !raw.stdout.is_empty() {
            return Ok(CliReply::new(raw.stdout));
        }
        if !raw.stderr.is_empty() {
            return Err(Error::CommandRejected {
                command,
                stderr: raw.stderr.trim().to_string(),
            });
        }
        Ok(CliReply::new(ACK))
    }

    /// Run a show command and decode its tabular output.
    pub fn show(&self, tail: &str) -> Result<ShowOutput> {
        Ok(self.run(tail)?.show())
    }
}
