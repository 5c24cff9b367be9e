//! Exit payload and status reporting.
//!
//! Every run ends in one JSON payload with the `msg`/`stdout`/`stderr`/
//! `changed`/`failed` fields the original Ansible modules emitted, plus a
//! colored one-line status for humans.

use crate::error::Error;
use crate::modules::ModuleOutput;
use colored::Colorize;
use serde::Serialize;
use std::collections::HashMap;

/// The JSON structure printed at the end of a run.
#[derive(Debug, Serialize)]
pub struct ExitPayload {
    pub msg: String,
    pub changed: bool,
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(flatten, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, serde_json::Value>,
}

impl ExitPayload {
    pub fn from_result(result: Result<ModuleOutput, Error>) -> Self {
        match result {
            Ok(output) => Self {
                msg: output.msg,
                changed: output.changed,
                failed: output.failed,
                stdout: output.stdout,
                stderr: None,
                command: output.command,
                data: output.data,
            },
            Err(err) => Self {
                msg: err.to_string(),
                changed: false,
                failed: true,
                stdout: None,
                stderr: err.stderr().map(str::to_string),
                command: err.command().map(str::to_string),
                data: HashMap::new(),
            },
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.failed {
            1
        } else {
            0
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(
                "{{\"msg\": \"payload serialization failed: {}\", \"failed\": true}}",
                e
            )
        })
    }
}

/// Print a colored one-line status for the run, playbook-recap style.
pub fn status_line(module: &str, payload: &ExitPayload) {
    if payload.failed {
        eprintln!(
            "{}: [{}] => {}",
            "failed".red().bold(),
            module.bright_white().bold(),
            payload.msg
        );
    } else if payload.changed {
        eprintln!("{}: [{}]", "changed".yellow(), module.bright_white().bold());
    } else {
        eprintln!("{}: [{}]", "ok".green(), module.bright_white().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn success_payload_mirrors_module_output() {
        let output = ModuleOutput::changed("eBGP setup completed successfully.")
            .with_stdout("Added BGP_AS to spine01-vrouter!");
        let payload = ExitPayload::from_result(Ok(output));
        assert!(payload.changed);
        assert!(!payload.failed);
        assert_eq!(payload.exit_code(), 0);
        assert_eq!(
            payload.stdout.as_deref(),
            Some("Added BGP_AS to spine01-vrouter!")
        );
    }

    #[test]
    fn failure_payload_surfaces_raw_stderr() {
        let err = Error::CommandRejected {
            command: "/usr/bin/cli --quiet vrouter-modify name x bgp-as 0".to_string(),
            stderr: "bgp-as: out of range".to_string(),
        };
        let payload = ExitPayload::from_result(Err(err));
        assert!(payload.failed);
        assert!(!payload.changed);
        assert_eq!(payload.exit_code(), 1);
        assert_eq!(payload.stderr.as_deref(), Some("bgp-as: out of range"));
        let json = payload.to_json();
        assert!(json.contains("\"failed\": true"));
        assert!(json.contains("bgp-as: out of range"));
    }
}
