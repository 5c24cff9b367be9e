//! Scripted cli transport for driving modules without a switch.

use netvisor_ztp::netvisor::{CliTransport, RawOutput};
use std::sync::Mutex;

/// Replies are picked by the first rule whose pattern is a substring of the
/// issued command; anything unmatched is silently acknowledged, which is
/// what the real cli does for accepted configuration commands and for show
/// commands with no matching rows.
#[derive(Default)]
pub struct ScriptedCli {
    rules: Vec<(String, RawOutput)>,
    commands: Mutex<Vec<String>>,
}

impl ScriptedCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to matching commands with the given stdout.
    pub fn on(mut self, pattern: &str, stdout: &str) -> Self {
        self.rules
            .push((pattern.to_string(), RawOutput::stdout(stdout)));
        self
    }

    /// Pin matching commands to an empty acknowledgement, shadowing later
    /// broader rules.
    pub fn ack(mut self, pattern: &str) -> Self {
        self.rules.push((pattern.to_string(), RawOutput::ack()));
        self
    }

    /// Reject matching commands with the given stderr.
    pub fn reject(mut self, pattern: &str, stderr: &str) -> Self {
        self.rules
            .push((pattern.to_string(), RawOutput::stderr(stderr)));
        self
    }

    /// Every command issued so far, in order.
    pub fn issued(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    /// Whether some issued command contains the pattern.
    pub fn saw(&self, pattern: &str) -> bool {
        self.issued().iter().any(|cmd| cmd.contains(pattern))
    }

    /// How many issued commands contain the pattern.
    pub fn count(&self, pattern: &str) -> usize {
        self.issued()
            .iter()
            .filter(|cmd| cmd.contains(pattern))
            .count()
    }
}

impl CliTransport for ScriptedCli {
    fn exec(&self, argv: &[String]) -> std::io::Result<RawOutput> {
        let command = argv.join(" ");
        self.commands.lock().unwrap().push(command.clone());
        for (pattern, reply) in &self.rules {
            if command.contains(pattern) {
                return Ok(reply.clone());
            }
        }
        Ok(RawOutput::ack())
    }
}
